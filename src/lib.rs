//! # Ousposer: Street-Furniture Detection Core
//!
//! Turns the raw fragments of a city's street-furniture export (bench
//! slats, legs, frames and backrests digitized as separate outlines) into
//! classified objects.
//!
//! ## Features
//!
//! - **Geodesic envelopes**: oriented minimum-area rectangles measured in
//!   a local WGS84 tangent plane
//! - **Proximity clustering**: connected components of a fragment
//!   proximity graph, over a swappable spatial index (R-tree or hash grid)
//! - **Calibrated matching**: templates whose canonical sides are medians
//!   of labeled single-fragment examples, matched within a relative tolerance
//! - **Zone-parallel batches**: per-zone phase barrier, bounded worker
//!   pool, run deadline and a complete run summary
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ousposer::config::DetectionConfig;
//! use ousposer::envelope::GeometryEnvelopeProvider;
//! use ousposer::io::load_fragments;
//! use ousposer::pipeline::BatchRunner;
//! use std::path::Path;
//!
//! # fn main() -> ousposer::Result<()> {
//! let config = DetectionConfig::load(Path::new("configs/detection.toml"))?;
//! let (store, _) = load_fragments(Path::new("fragments.json"), config.input.coordinate_system)?;
//!
//! let provider = GeometryEnvelopeProvider::new(&store);
//! let output = BatchRunner::new(&config, &provider)?.run(&store);
//! for (category, count) in &output.summary.per_category {
//!     println!("{category}: {count}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Data Flow
//!
//! ```text
//!   labeled examples ──► calibration ──► CalibrationReport ──► templates (TOML)
//!                                                                  │
//!   fragments ──► clustering (per zone) ──► candidates ──► classification ──► results
//!                        ▲                                      ▲
//!                   SpatialIndex                         EnvelopeProvider
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: planar/geographic points, projection, hull and rectangle
//! - [`fragment`]: fragment records and the in-memory store
//! - [`envelope`]: envelope providers (in-process, external service)
//! - [`index`]: spatial indexes for neighbor search
//! - [`clustering`]: proximity-graph clustering into candidates
//! - [`classification`]: templates and deviation matching
//! - [`calibration`]: template derivation from labeled examples
//! - [`pipeline`]: zone-parallel batch runs
//! - [`validation`]: precision/recall against labels
//! - [`config`], [`io`], [`error`]

pub mod calibration;
pub mod classification;
pub mod clustering;
pub mod config;
pub mod core;
pub mod envelope;
pub mod error;
pub mod fragment;
pub mod index;
pub mod io;
pub mod pipeline;
pub mod validation;

// Re-export main types at crate root
pub use calibration::{CalibrationOptions, CalibrationReport, Calibrator, LabeledExample, calibrate};
pub use classification::{
    CanonicalTemplate, Category, ClassificationResult, Classifier, ComponentRule, classify,
};
pub use clustering::{CandidateId, CandidateObject, ClusteringEngine, cluster_zone};
pub use config::DetectionConfig;
pub use envelope::{Envelope, EnvelopeProvider, GeometryEnvelopeProvider};
pub use error::{CalibrationError, ConfigurationError, Error, GeometryError, Result};
pub use fragment::{Fragment, FragmentId, FragmentStore, Geometry, Zone};
pub use pipeline::{BatchRunner, DetectionOutput, RunSummary};
pub use validation::{ValidationReport, validate};
