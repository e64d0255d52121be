//! Ousposer - street-furniture detection from open-data fragments
//!
//! # Usage
//!
//! ```bash
//! # Derive canonical single-bench dimensions from labeled examples
//! ousposer calibrate --labels manual_clusters.json --fragments mobilier.json \
//!     --category benches --output calibration.json
//!
//! # Cluster and classify every zone
//! ousposer detect --config configs/detection.toml --fragments mobilier.json \
//!     --output detections.json
//!
//! # Precision / recall of a detection run
//! ousposer validate --labels manual_clusters.json --detections detections.json
//!
//! # Validate and print the effective configuration
//! ousposer check-config --config configs/detection.toml
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use ousposer::calibration::{CalibrationOptions, Calibrator, LabeledCorpus};
use ousposer::config::{DetectionConfig, defaults};
use ousposer::envelope::GeometryEnvelopeProvider;
use ousposer::io::{load_fragments, write_json};
use ousposer::pipeline::{BatchRunner, DetectionOutput};
use ousposer::{Result, Zone, validate};

#[derive(Parser)]
#[command(name = "ousposer")]
#[command(author, version, about = "Street-furniture clustering, calibration and classification", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive canonical template dimensions from labeled examples
    Calibrate {
        /// Labeled examples (JSON, flat or grouped by zone)
        #[arg(short, long)]
        labels: PathBuf,

        /// Raw fragment export (JSON)
        #[arg(short, long)]
        fragments: PathBuf,

        /// Detection config, for the coordinate system
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Category label of single-component examples
        #[arg(long, default_value_t = defaults::single_component_category())]
        category: String,

        /// Only use examples from this zone
        #[arg(short, long)]
        zone: Option<String>,

        /// Tolerance ratio written into the suggestion
        #[arg(long, default_value_t = defaults::tolerance_ratio())]
        tolerance: f64,

        /// Template name used in the suggested TOML snippet
        #[arg(long, default_value = "single-bench")]
        template_name: String,

        /// Write the report as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Cluster and classify all fragments
    Detect {
        /// Detection config (TOML); defaults are used if omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Raw fragment export (JSON)
        #[arg(short, long)]
        fragments: PathBuf,

        /// Output file (JSON)
        #[arg(short, long, default_value = "output/detections.json")]
        output: PathBuf,
    },

    /// Compare a detection run against labeled examples
    Validate {
        /// Labeled examples (JSON)
        #[arg(short, long)]
        labels: PathBuf,

        /// Output of `detect`
        #[arg(short, long)]
        detections: PathBuf,

        /// Only compare labeled examples of this category
        #[arg(long)]
        category: Option<String>,

        /// Write the report as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a config file and print it with defaults filled in
    CheckConfig {
        /// Detection config (TOML)
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn load_config(path: Option<&Path>) -> Result<DetectionConfig> {
    match path {
        Some(path) => DetectionConfig::load(path),
        None => {
            log::info!("Using default configuration");
            Ok(DetectionConfig::default())
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    match args.command {
        Commands::Calibrate {
            labels,
            fragments,
            config,
            category,
            zone,
            tolerance,
            template_name,
            output,
        } => {
            let config = load_config(config.as_deref())?;
            let examples = LabeledCorpus::load(&labels)?.into_examples();
            let (store, _) = load_fragments(&fragments, config.input.coordinate_system)?;
            let provider = GeometryEnvelopeProvider::new(&store);

            let options = CalibrationOptions {
                category,
                zone: zone.map(Zone::new),
                tolerance_ratio: tolerance,
            };
            let report = Calibrator::new(options)
                .with_store(&store)
                .run(&examples, &provider)?;

            println!(
                "Calibrated {} samples ({} skipped): long {:.3} m, short {:.3} m",
                report.sample_count, report.skipped, report.median_long, report.median_short
            );
            println!(
                "  aspect ratio: median {:.2}, range {:.2}..{:.2}",
                report.aspect_stats.median, report.aspect_stats.min, report.aspect_stats.max
            );
            for (vertices, stats) in &report.by_vertex_count {
                println!(
                    "  {}-vertex: {} samples, {:.3} x {:.3} m",
                    vertices, stats.sample_count, stats.median_long, stats.median_short
                );
            }
            for p in &report.proximity {
                println!(
                    "  {}-component: {} examples, suggested threshold {:.2} m",
                    p.component_count, p.sample_count, p.suggested_threshold_m
                );
            }
            println!("\n{}", report.suggested_config_toml(&template_name)?);

            if let Some(path) = output {
                write_json(&path, &report)?;
            }
        }

        Commands::Detect {
            config,
            fragments,
            output,
        } => {
            let config = load_config(config.as_deref())?;
            let (store, load) = load_fragments(&fragments, config.input.coordinate_system)?;
            let provider = GeometryEnvelopeProvider::new(&store);
            let result = BatchRunner::new(&config, &provider)?.run(&store);

            let summary = &result.summary;
            println!(
                "{} fragments ({} rejected on load), {} candidates",
                summary.fragments, load.rejected, summary.candidates
            );
            println!(
                "processed {}, skipped {}, unclassified {}",
                summary.processed, summary.skipped, summary.unclassified
            );
            for (category, count) in &summary.per_category {
                println!("  {}: {}", category, count);
            }
            if summary.is_partial() {
                log::warn!("Deadline reached: {} zones aborted", summary.zones_aborted.len());
            }

            write_json(&output, &result)?;
        }

        Commands::Validate {
            labels,
            detections,
            category,
            output,
        } => {
            let mut examples = LabeledCorpus::load(&labels)?.into_examples();
            if let Some(category) = &category {
                examples.retain(|e| e.category.trim() == category.trim());
            }
            let content = std::fs::read_to_string(&detections)?;
            let run: DetectionOutput = serde_json::from_str(&content)?;

            let report = validate(&examples, &run.results);
            println!(
                "true positives {}, false negatives {}, potential false positives {}",
                report.true_positives, report.false_negatives, report.potential_false_positives
            );
            println!(
                "precision {:.2}%, recall {:.2}%",
                report.precision * 100.0,
                report.recall * 100.0
            );

            if let Some(path) = output {
                write_json(&path, &report)?;
            }
        }

        Commands::CheckConfig { config } => {
            let config = DetectionConfig::load(&config)?;
            print!("{}", config.to_toml_string()?);
        }
    }

    Ok(())
}
