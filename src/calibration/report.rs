//! Calibration report and its adoption as a template.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::proximity::ProximitySuggestion;
use crate::classification::CanonicalTemplate;
use crate::core::math::SampleStats;
use crate::error::Result;
use crate::fragment::Zone;

/// Suggested single-component template values.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SuggestedConfig {
    pub canonical_long: f64,
    pub canonical_short: f64,
    pub tolerance_ratio: f64,
}

/// Medians of one vertex-count group.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VertexCountStats {
    pub sample_count: usize,
    pub median_long: f64,
    pub median_short: f64,
}

/// Advisory output of a calibration run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationReport {
    /// Category that was calibrated.
    pub category: String,
    /// Zone filter, if any.
    pub zone: Option<Zone>,
    /// Median envelope long side (meters).
    pub median_long: f64,
    /// Median envelope short side (meters).
    pub median_short: f64,
    /// Examples with a usable envelope.
    pub sample_count: usize,
    /// Qualifying examples whose envelope failed.
    pub skipped: usize,
    /// Labeled examples scanned.
    pub scanned: usize,
    /// Spread of the long side.
    pub long_stats: SampleStats,
    /// Spread of the short side.
    pub short_stats: SampleStats,
    /// Spread of the long / short ratio.
    pub aspect_stats: SampleStats,
    /// Template values to review and adopt.
    pub suggested: SuggestedConfig,
    /// Medians per vertex count (needs fragment geometry).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub by_vertex_count: BTreeMap<usize, VertexCountStats>,
    /// Clustering threshold suggestions from multi-component examples.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub proximity: Vec<ProximitySuggestion>,
}

impl CalibrationReport {
    /// Adopt the suggestion as a single-component template.
    pub fn to_template(&self, name: impl Into<String>) -> CanonicalTemplate {
        CanonicalTemplate::new(
            name,
            self.suggested.canonical_long,
            self.suggested.canonical_short,
            self.suggested.tolerance_ratio,
        )
    }

    /// The suggestion as a `[[templates]]` TOML snippet for review.
    pub fn suggested_config_toml(&self, name: &str) -> Result<String> {
        #[derive(Serialize)]
        struct Snippet {
            templates: Vec<CanonicalTemplate>,
        }

        let snippet = Snippet {
            templates: vec![self.to_template(name)],
        };
        Ok(toml::to_string_pretty(&snippet)?)
    }
}
