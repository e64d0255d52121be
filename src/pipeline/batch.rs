//! Zone-parallel batch execution.
//!
//! ```text
//!            zone queue (ascending)
//!                    │
//!     ┌──────────────┼──────────────┐   zone_parallelism threads
//!     ▼              ▼              ▼
//!  cluster        cluster        cluster     phase 1 (whole zone)
//!     │ barrier      │              │
//!     ▼              ▼              ▼
//!  classify ×N    classify ×N    classify ×N  phase 2, N = max_in_flight
//!     └──────────────┼──────────────┘
//!                    ▼
//!        collect, sort by candidate id
//! ```
//!
//! The deadline is checked when a zone is dequeued. A zone that has
//! started always finishes; zones still queued when it passes are reported
//! as aborted and contribute nothing.

use std::thread;
use std::time::Instant;

use crossbeam_channel::{bounded, unbounded};

use super::DetectionOutput;
use super::summary::{RunSummary, SkippedCandidate};
use crate::classification::{ClassificationResult, Classifier};
use crate::clustering::{CandidateObject, ClusteringEngine};
use crate::config::DetectionConfig;
use crate::envelope::EnvelopeProvider;
use crate::error::{ConfigurationError, GeometryError};
use crate::fragment::{Fragment, FragmentStore, Zone};

/// Output of one zone.
enum ZoneOutcome {
    Done {
        fragments: usize,
        results: Vec<ClassificationResult>,
        skipped: Vec<SkippedCandidate>,
    },
    Aborted(Zone),
}

/// Clustering and classification of a whole fragment store.
///
/// # Example
/// ```rust,ignore
/// let provider = GeometryEnvelopeProvider::new(&store);
/// let runner = BatchRunner::new(&config, &provider)?;
/// let output = runner.run(&store);
/// println!("{} processed, {} skipped", output.summary.processed, output.summary.skipped);
/// ```
pub struct BatchRunner<'a, P: EnvelopeProvider + ?Sized> {
    config: &'a DetectionConfig,
    engine: ClusteringEngine,
    classifier: Classifier,
    provider: &'a P,
}

impl<'a, P: EnvelopeProvider + ?Sized> BatchRunner<'a, P> {
    /// Validate the configuration and prepare a runner.
    ///
    /// # Errors
    /// Any [`ConfigurationError`]; nothing is processed with a bad config.
    pub fn new(config: &'a DetectionConfig, provider: &'a P) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self {
            config,
            engine: ClusteringEngine::new(config.clustering.clone()),
            classifier: Classifier::new(config.templates.clone())?,
            provider,
        })
    }

    /// Run with the configured deadline, counted from now.
    pub fn run(&self, store: &FragmentStore) -> DetectionOutput {
        let deadline = self.config.runtime.timeout().map(|t| Instant::now() + t);
        self.run_until(store, deadline)
    }

    /// Run with an explicit deadline.
    pub fn run_until(&self, store: &FragmentStore, deadline: Option<Instant>) -> DetectionOutput {
        let start = Instant::now();
        let zones = store.by_zone();
        let workers = self.config.runtime.zone_parallelism.min(zones.len()).max(1);
        log::info!(
            "Pipeline: {} fragments in {} zones, {} zone workers",
            store.len(),
            zones.len(),
            workers
        );

        let (zone_tx, zone_rx) = unbounded::<(Zone, Vec<&Fragment>)>();
        for entry in zones {
            zone_tx.send(entry).ok();
        }
        drop(zone_tx);

        let (outcome_tx, outcome_rx) = unbounded::<ZoneOutcome>();
        thread::scope(|s| {
            for _ in 0..workers {
                let zone_rx = zone_rx.clone();
                let outcome_tx = outcome_tx.clone();
                s.spawn(move || {
                    while let Ok((zone, fragments)) = zone_rx.recv() {
                        if deadline.is_some_and(|d| Instant::now() >= d) {
                            log::warn!("Pipeline: deadline passed, zone {} aborted", zone);
                            outcome_tx.send(ZoneOutcome::Aborted(zone)).ok();
                            continue;
                        }
                        let outcome = self.process_zone(&zone, &fragments, store);
                        outcome_tx.send(outcome).ok();
                    }
                });
            }
        });
        drop(outcome_tx);

        let mut summary = RunSummary::default();
        let mut results = Vec::new();
        let mut skipped = Vec::new();
        for outcome in outcome_rx.iter() {
            match outcome {
                ZoneOutcome::Done {
                    fragments,
                    results: zone_results,
                    skipped: zone_skipped,
                } => {
                    summary.record_zone(fragments, &zone_results, &zone_skipped);
                    results.extend(zone_results);
                    skipped.extend(zone_skipped);
                }
                ZoneOutcome::Aborted(zone) => summary.zones_aborted.push(zone),
            }
        }

        results.sort_by_key(|r: &ClassificationResult| r.candidate);
        skipped.sort_by_key(|s: &SkippedCandidate| s.candidate);
        summary.zones_aborted.sort();
        summary.elapsed_ms = start.elapsed().as_millis() as u64;

        log::info!(
            "Pipeline: {} processed, {} skipped, {} unclassified, {} zones aborted ({} ms)",
            summary.processed,
            summary.skipped,
            summary.unclassified,
            summary.zones_aborted.len(),
            summary.elapsed_ms
        );

        DetectionOutput {
            results,
            skipped,
            summary,
        }
    }

    /// Cluster a zone, then classify its candidates on the worker pool.
    fn process_zone(&self, zone: &Zone, fragments: &[&Fragment], store: &FragmentStore) -> ZoneOutcome {
        let clustering = self.engine.cluster(zone, fragments, store);
        let candidates = &clustering.candidates;

        let workers = self.config.runtime.max_in_flight.min(candidates.len());
        let (task_tx, task_rx) = bounded::<&CandidateObject>(self.config.runtime.max_in_flight);
        let (done_tx, done_rx) = unbounded();

        thread::scope(|s| {
            for _ in 0..workers {
                let task_rx = task_rx.clone();
                let done_tx = done_tx.clone();
                s.spawn(move || {
                    while let Ok(candidate) = task_rx.recv() {
                        let result = self.classifier.classify(candidate, self.provider);
                        done_tx.send((candidate, result)).ok();
                    }
                });
            }
            for candidate in candidates {
                task_tx.send(candidate).ok();
            }
            drop(task_tx);
        });
        drop(done_tx);

        let mut results = Vec::with_capacity(candidates.len());
        let mut skipped = Vec::new();
        for (candidate, result) in done_rx.iter() {
            match result {
                Ok(r) => results.push(r),
                Err(err) => skipped.push(skip(candidate, &err)),
            }
        }
        results.sort_by_key(|r| r.candidate);
        skipped.sort_by_key(|s| s.candidate);

        log::info!(
            "Pipeline: zone {} -> {} candidates ({} skipped)",
            zone,
            candidates.len(),
            skipped.len()
        );

        ZoneOutcome::Done {
            fragments: fragments.len(),
            results,
            skipped,
        }
    }
}

fn skip(candidate: &CandidateObject, err: &GeometryError) -> SkippedCandidate {
    log::warn!(
        "Pipeline: candidate {} (fragments {:?}) skipped: {}",
        candidate.id,
        candidate.fragments.iter().map(|f| f.0).collect::<Vec<_>>(),
        err
    );
    SkippedCandidate {
        candidate: candidate.id,
        zone: candidate.zone.clone(),
        fragments: candidate.fragments.clone(),
        reason: err.to_string(),
    }
}
