//! Run accounting.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::classification::{Category, ClassificationResult};
use crate::clustering::CandidateId;
use crate::fragment::{FragmentId, Zone};

/// A candidate that could not be classified because its envelope failed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkippedCandidate {
    pub candidate: CandidateId,
    pub zone: Zone,
    pub fragments: Vec<FragmentId>,
    /// Geometry error message.
    pub reason: String,
}

/// Counts reported by every completed run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Zones that were clustered and classified.
    pub zones_processed: usize,
    /// Zones not started before the deadline.
    pub zones_aborted: Vec<Zone>,
    /// Fragments in processed zones.
    pub fragments: usize,
    /// Candidates produced by clustering.
    pub candidates: usize,
    /// Candidates with an envelope (classified or unclassified).
    pub processed: usize,
    /// Candidates skipped on geometry errors.
    pub skipped: usize,
    /// Processed candidates that matched no template.
    pub unclassified: usize,
    /// Matches per template name.
    pub per_category: BTreeMap<String, usize>,
    /// Wall time of the run in milliseconds.
    pub elapsed_ms: u64,
}

impl RunSummary {
    /// Count one zone's results into the summary.
    pub fn record_zone(
        &mut self,
        fragments: usize,
        results: &[ClassificationResult],
        skipped: &[SkippedCandidate],
    ) {
        self.zones_processed += 1;
        self.fragments += fragments;
        self.candidates += results.len() + skipped.len();
        self.processed += results.len();
        self.skipped += skipped.len();
        for result in results {
            match &result.category {
                Category::Template(name) => *self.per_category.entry(name.clone()).or_default() += 1,
                Category::Unclassified => self.unclassified += 1,
            }
        }
    }

    /// True if any zone was aborted.
    #[inline]
    pub fn is_partial(&self) -> bool {
        !self.zones_aborted.is_empty()
    }
}
