//! In-process envelope computation over a fragment store.

use super::{Envelope, EnvelopeProvider};
use crate::core::{GeoPoint, LocalFrame, min_area_rect};
use crate::error::GeometryError;
use crate::fragment::{FragmentId, FragmentStore};

/// Envelope provider computing rectangles from stored geometry.
///
/// All vertices of the requested fragments are projected into a tangent
/// plane centered on their mean, and the minimum-area rectangle is found
/// with rotating calipers over the convex hull.
///
/// # Example
/// ```rust,ignore
/// let provider = GeometryEnvelopeProvider::new(&store);
/// let envelope = provider.envelope(&[FragmentId(42)])?;
/// println!("{:.2} x {:.2} m", envelope.long, envelope.short);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct GeometryEnvelopeProvider<'a> {
    store: &'a FragmentStore,
}

impl<'a> GeometryEnvelopeProvider<'a> {
    /// Create a provider over a store.
    pub fn new(store: &'a FragmentStore) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &'a FragmentStore {
        self.store
    }
}

impl EnvelopeProvider for GeometryEnvelopeProvider<'_> {
    fn envelope(&self, ids: &[FragmentId]) -> Result<Envelope, GeometryError> {
        if ids.is_empty() {
            return Err(GeometryError::Empty);
        }

        let system = self.store.coordinate_system();
        let mut points: Vec<GeoPoint> = Vec::new();
        for &id in ids {
            let fragment = self
                .store
                .get(id)
                .ok_or(GeometryError::UnknownFragment(id))?;
            fragment.geometry.validate(system)?;
            points.extend(fragment.geometry.points());
        }

        let frame = LocalFrame::centered_on(&points, system).ok_or(GeometryError::Empty)?;
        let planar = frame.project_all(&points);
        let rect = min_area_rect(&planar).ok_or(GeometryError::Degenerate)?;

        Envelope::from_sides(rect.side_lengths())
    }
}
