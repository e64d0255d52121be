//! Candidate furniture objects produced by clustering.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GeometryError;
use crate::fragment::{FragmentId, Zone};

/// Candidate identifier.
///
/// Equal to the smallest fragment id in the candidate. Seeds are taken in
/// ascending id, so the seed is always the candidate's minimum and ids are
/// unique across zones without coordination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(pub u64);

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

impl From<FragmentId> for CandidateId {
    fn from(id: FragmentId) -> Self {
        CandidateId(id.0)
    }
}

/// A group of spatially adjacent fragments hypothesized to be one object.
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateObject {
    /// Identifier (smallest member fragment id).
    pub id: CandidateId,
    /// Zone the candidate was clustered in.
    pub zone: Zone,
    /// Member fragments, ascending. Never empty.
    pub fragments: Vec<FragmentId>,
    /// Total number of vertices over all members.
    pub vertex_count: usize,
    /// Set when the (singleton) member could not be projected; such
    /// candidates are skipped by classification.
    pub defect: Option<GeometryError>,
}

impl CandidateObject {
    /// Number of member fragments.
    #[inline]
    pub fn component_count(&self) -> usize {
        self.fragments.len()
    }

    /// True if classification should skip this candidate.
    #[inline]
    pub fn is_defective(&self) -> bool {
        self.defect.is_some()
    }
}
