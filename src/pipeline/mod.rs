//! Batch detection over a fragment store.

mod batch;
mod summary;

pub use batch::BatchRunner;
pub use summary::{RunSummary, SkippedCandidate};

use serde::{Deserialize, Serialize};

use crate::classification::ClassificationResult;

/// Everything a detection run produces.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionOutput {
    /// Classified and unclassified candidates, ascending candidate id.
    pub results: Vec<ClassificationResult>,
    /// Candidates skipped on geometry errors, ascending candidate id.
    pub skipped: Vec<SkippedCandidate>,
    /// Counts.
    pub summary: RunSummary,
}
