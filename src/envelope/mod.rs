//! Oriented envelopes of fragments and fragment unions.
//!
//! The envelope is the (short, long) side pair of the minimum-area
//! rectangle enclosing a geometry, regardless of orientation. It is the
//! only geometric signature calibration and classification look at.
//!
//! Envelopes come from an [`EnvelopeProvider`]:
//! - [`GeometryEnvelopeProvider`]: computed in-process from a [`FragmentStore`]
//! - [`QueryServiceProvider`]: delegated to an external geometry-query
//!   service through a bounded [`ConnectionPool`]
//!
//! [`FragmentStore`]: crate::fragment::FragmentStore

mod local;
mod service;

pub use local::GeometryEnvelopeProvider;
pub use service::{ConnectionPool, GeometryQueryService, PoolPermit, QueryServiceProvider};

use serde::{Deserialize, Serialize};

use crate::error::GeometryError;
use crate::fragment::FragmentId;

/// Sides at or below this length (meters) are treated as zero.
pub const MIN_SIDE_LENGTH: f64 = 1e-6;

/// Oriented minimum-bounding rectangle dimensions in meters.
///
/// Invariant: `short <= long`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Shorter side length.
    pub short: f64,
    /// Longer side length.
    pub long: f64,
}

impl Envelope {
    /// Create an envelope from two side lengths in any order.
    #[inline]
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            Self { short: a, long: b }
        } else {
            Self { short: b, long: a }
        }
    }

    /// Reduce the four side lengths of a rectangle to (short, long).
    ///
    /// Opposite sides (0/2 and 1/3) are averaged, which absorbs the small
    /// asymmetry a projected or service-measured rectangle may carry.
    ///
    /// # Errors
    /// - [`GeometryError::Malformed`] if a side is negative or non-finite
    /// - [`GeometryError::Degenerate`] if the rectangle has zero area
    pub fn from_sides(sides: [f64; 4]) -> Result<Self, GeometryError> {
        if let Some(bad) = sides.iter().find(|s| !s.is_finite() || **s < 0.0) {
            return Err(GeometryError::Malformed(format!("invalid side length {bad}")));
        }

        let envelope = Self::new((sides[0] + sides[2]) * 0.5, (sides[1] + sides[3]) * 0.5);
        if envelope.short <= MIN_SIDE_LENGTH {
            return Err(GeometryError::Degenerate);
        }
        Ok(envelope)
    }

    /// Long / short ratio.
    #[inline]
    pub fn aspect_ratio(&self) -> f64 {
        self.long / self.short
    }

    /// Rectangle area in square meters.
    #[inline]
    pub fn area(&self) -> f64 {
        self.long * self.short
    }
}

/// Capability to measure the oriented envelope of a set of fragments.
///
/// Implementations must be safe to share between worker threads. They may
/// perform I/O, but must not mutate any state visible to the caller.
pub trait EnvelopeProvider: Send + Sync {
    /// Envelope of the union of the given fragments.
    ///
    /// # Errors
    /// [`GeometryError::Empty`] for an empty id list; other variants as
    /// reported by the geometry source.
    fn envelope(&self, ids: &[FragmentId]) -> Result<Envelope, GeometryError>;
}

impl<P: EnvelopeProvider + ?Sized> EnvelopeProvider for &P {
    fn envelope(&self, ids: &[FragmentId]) -> Result<Envelope, GeometryError> {
        (**self).envelope(ids)
    }
}

impl<P: EnvelopeProvider + ?Sized> EnvelopeProvider for Box<P> {
    fn envelope(&self, ids: &[FragmentId]) -> Result<Envelope, GeometryError> {
        (**self).envelope(ids)
    }
}
