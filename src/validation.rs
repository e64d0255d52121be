//! Comparison of detections against labeled examples.
//!
//! Overlap is measured on fragments: a labeled fragment is a true positive
//! when it belongs to any candidate that matched a template, whatever the
//! exact grouping. Fragments of unclassified candidates count as not detected.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::calibration::LabeledExample;
use crate::classification::ClassificationResult;
use crate::fragment::{FragmentId, Zone};

/// Precision/recall of a detection run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Labeled examples compared.
    pub labeled_examples: usize,
    /// Distinct labeled fragments.
    pub labeled_fragments: usize,
    /// Candidates that matched a template.
    pub detected_candidates: usize,
    /// Distinct fragments of those candidates.
    pub detected_fragments: usize,
    /// Fragments both labeled and detected.
    pub true_positives: usize,
    /// Labeled but not detected.
    pub false_negatives: usize,
    /// Detected but not labeled.
    pub potential_false_positives: usize,
    /// `true_positives / detected_fragments` (0 when nothing was detected).
    pub precision: f64,
    /// `true_positives / labeled_fragments` (0 when nothing was labeled).
    pub recall: f64,
    /// Labeled examples per component count.
    pub by_component_count: BTreeMap<usize, usize>,
    /// Labeled examples per zone.
    pub by_zone: BTreeMap<Zone, usize>,
}

/// Compare classified results with labeled examples.
pub fn validate(labeled: &[LabeledExample], results: &[ClassificationResult]) -> ValidationReport {
    let labeled_ids: BTreeSet<FragmentId> = labeled
        .iter()
        .flat_map(|e| e.fragment_ids.iter().copied())
        .collect();

    let detected: Vec<&ClassificationResult> = results
        .iter()
        .filter(|r| r.category.is_classified())
        .collect();
    let detected_ids: BTreeSet<FragmentId> = detected
        .iter()
        .flat_map(|r| r.fragments.iter().copied())
        .collect();

    let true_positives = labeled_ids.intersection(&detected_ids).count();
    let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };

    let mut by_component_count: BTreeMap<usize, usize> = BTreeMap::new();
    let mut by_zone: BTreeMap<Zone, usize> = BTreeMap::new();
    for example in labeled {
        *by_component_count.entry(example.component_count()).or_default() += 1;
        *by_zone
            .entry(example.zone.clone().unwrap_or_else(Zone::unassigned))
            .or_default() += 1;
    }

    let report = ValidationReport {
        labeled_examples: labeled.len(),
        labeled_fragments: labeled_ids.len(),
        detected_candidates: detected.len(),
        detected_fragments: detected_ids.len(),
        true_positives,
        false_negatives: labeled_ids.len() - true_positives,
        potential_false_positives: detected_ids.len() - true_positives,
        precision: ratio(true_positives, detected_ids.len()),
        recall: ratio(true_positives, labeled_ids.len()),
        by_component_count,
        by_zone,
    };

    log::info!(
        "Validation: precision {:.2}%, recall {:.2}% ({} true positives)",
        report.precision * 100.0,
        report.recall * 100.0,
        report.true_positives
    );
    report
}
