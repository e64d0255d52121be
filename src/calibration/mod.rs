//! Calibration of canonical templates from labeled examples.
//!
//! Only single-fragment examples of the calibrated category are measured.
//! The canonical sides are the medians of their envelopes, long and short
//! taken independently, which keeps the result insensitive to a few badly
//! digitized outlines and to the order of the input.
//!
//! # Example
//! ```rust,ignore
//! use ousposer::calibration::{Calibrator, CalibrationOptions};
//! use ousposer::envelope::GeometryEnvelopeProvider;
//!
//! let provider = GeometryEnvelopeProvider::new(&store);
//! let report = Calibrator::new(CalibrationOptions::default())
//!     .with_store(&store)
//!     .run(&examples, &provider)?;
//! println!("{}", report.suggested_config_toml("single-bench")?);
//! ```

mod labels;
mod proximity;
mod report;

pub use labels::{LabeledCorpus, LabeledExample};
pub use proximity::{ProximitySuggestion, suggest_thresholds};
pub use report::{CalibrationReport, SuggestedConfig, VertexCountStats};

use std::collections::BTreeMap;

use crate::config::defaults;
use crate::core::math::{SampleStats, median};
use crate::envelope::{Envelope, EnvelopeProvider};
use crate::error::CalibrationError;
use crate::fragment::{FragmentId, FragmentStore, Zone};

/// Calibration settings.
#[derive(Clone, Debug, PartialEq)]
pub struct CalibrationOptions {
    /// Category label of single-component examples.
    pub category: String,
    /// Only use examples from this zone.
    pub zone: Option<Zone>,
    /// Tolerance written into the suggestion.
    pub tolerance_ratio: f64,
}

impl Default for CalibrationOptions {
    fn default() -> Self {
        Self {
            category: defaults::single_component_category(),
            zone: None,
            tolerance_ratio: defaults::tolerance_ratio(),
        }
    }
}

/// Calibrate with default options.
///
/// # Errors
/// - [`CalibrationError::InsufficientData`] if no example qualifies
/// - [`CalibrationError::EnvelopeComputation`] if none could be measured
pub fn calibrate<P: EnvelopeProvider + ?Sized>(
    examples: &[LabeledExample],
    zone_filter: Option<&Zone>,
    provider: &P,
) -> Result<CalibrationReport, CalibrationError> {
    let options = CalibrationOptions {
        zone: zone_filter.cloned(),
        ..CalibrationOptions::default()
    };
    Calibrator::new(options).run(examples, provider)
}

/// Calibration run with optional access to fragment geometry.
///
/// With a store attached, the report also carries the per-vertex-count
/// breakdown and proximity suggestions.
#[derive(Clone, Debug)]
pub struct Calibrator<'a> {
    options: CalibrationOptions,
    store: Option<&'a FragmentStore>,
}

impl<'a> Calibrator<'a> {
    /// Create a calibrator.
    pub fn new(options: CalibrationOptions) -> Self {
        Self {
            options,
            store: None,
        }
    }

    /// Attach fragment geometry for the supplementary statistics.
    pub fn with_store(mut self, store: &'a FragmentStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Run calibration over `examples`.
    pub fn run<P: EnvelopeProvider + ?Sized>(
        &self,
        examples: &[LabeledExample],
        provider: &P,
    ) -> Result<CalibrationReport, CalibrationError> {
        let category = self.options.category.trim();
        let zone = self.options.zone.as_ref();

        let qualifying: Vec<FragmentId> = examples
            .iter()
            .filter(|e| e.category.trim() == category && e.in_zone(zone))
            .filter(|e| e.component_count() == 1)
            .map(|e| e.fragment_ids[0])
            .collect();

        if qualifying.is_empty() {
            return Err(CalibrationError::InsufficientData {
                category: category.to_string(),
                zone: zone.map(|z| z.to_string()),
                scanned: examples.len(),
            });
        }

        let mut samples: Vec<(FragmentId, f64, f64)> = Vec::with_capacity(qualifying.len());
        let mut last_error = None;
        for &id in &qualifying {
            match provider.envelope(&[id]) {
                Ok(e) => samples.push((id, e.long, e.short)),
                Err(err) => {
                    log::warn!("Calibration: envelope failed for fragment {}: {}", id, err);
                    last_error = Some(err);
                }
            }
        }

        let envelope_failure = || CalibrationError::EnvelopeComputation {
            attempted: qualifying.len(),
            last_error: last_error.clone(),
        };

        // Sorted so every derived statistic is independent of input order
        let mut longs: Vec<f64> = samples.iter().map(|s| s.1).collect();
        let mut shorts: Vec<f64> = samples.iter().map(|s| s.2).collect();
        let mut aspects: Vec<f64> = samples
            .iter()
            .map(|s| Envelope::new(s.1, s.2).aspect_ratio())
            .collect();
        longs.sort_by(f64::total_cmp);
        shorts.sort_by(f64::total_cmp);
        aspects.sort_by(f64::total_cmp);

        let long_stats = SampleStats::from_values(&longs).ok_or_else(envelope_failure)?;
        let short_stats = SampleStats::from_values(&shorts).ok_or_else(envelope_failure)?;
        let aspect_stats = SampleStats::from_values(&aspects).ok_or_else(envelope_failure)?;

        let by_vertex_count = self
            .store
            .map(|store| vertex_count_breakdown(&samples, store))
            .unwrap_or_default();

        let proximity = self
            .store
            .map(|store| {
                suggest_thresholds(examples.iter().filter(|e| e.in_zone(zone)), store)
            })
            .unwrap_or_default();

        let skipped = qualifying.len() - samples.len();
        log::info!(
            "Calibration: {} samples ({} skipped) -> long {:.3} m, short {:.3} m",
            samples.len(),
            skipped,
            long_stats.median,
            short_stats.median
        );

        Ok(CalibrationReport {
            category: category.to_string(),
            zone: zone.cloned(),
            median_long: long_stats.median,
            median_short: short_stats.median,
            sample_count: samples.len(),
            skipped,
            scanned: examples.len(),
            long_stats,
            short_stats,
            aspect_stats,
            suggested: SuggestedConfig {
                canonical_long: long_stats.median,
                canonical_short: short_stats.median,
                tolerance_ratio: self.options.tolerance_ratio,
            },
            by_vertex_count,
            proximity,
        })
    }
}

/// Medians grouped by the vertex count of each sample's fragment.
fn vertex_count_breakdown(
    samples: &[(FragmentId, f64, f64)],
    store: &FragmentStore,
) -> BTreeMap<usize, VertexCountStats> {
    let mut groups: BTreeMap<usize, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for &(id, long, short) in samples {
        if let Some(fragment) = store.get(id) {
            let group = groups.entry(fragment.geometry.vertex_count()).or_default();
            group.0.push(long);
            group.1.push(short);
        }
    }

    groups
        .into_iter()
        .filter_map(|(vertices, (longs, shorts))| {
            Some((
                vertices,
                VertexCountStats {
                    sample_count: longs.len(),
                    median_long: median(&longs)?,
                    median_short: median(&shorts)?,
                },
            ))
        })
        .collect()
}
