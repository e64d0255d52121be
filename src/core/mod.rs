//! Core geometry for fragment measurement.
//!
//! - [`Point2D`] / [`GeoPoint`]: planar meters and WGS84 degrees
//! - [`Bounds`]: axis-aligned boxes for the spatial indexes
//! - [`geodesy`]: local tangent-plane projection ([`LocalFrame`])
//! - [`hull`] and [`rect`]: convex hull and minimum-area oriented rectangle
//! - [`segment`]: exact shape-to-shape distances
//! - [`math`]: robust sample statistics (median, MAD)

mod bounds;
mod point;

pub mod geodesy;
pub mod hull;
pub mod math;
pub mod rect;
pub mod segment;

pub use bounds::Bounds;
pub use geodesy::{CoordinateSystem, LocalFrame};
pub use point::{GeoPoint, Point2D};
pub use rect::{OrientedRect, min_area_rect};
pub use segment::{PartKind, PlanarShape};
