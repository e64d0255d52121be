//! Detection configuration.
//!
//! Loaded once from a single TOML file, validated, then passed explicitly
//! to clustering and classification. Every field has a default, so an
//! empty file is a valid configuration.
//!
//! ## Example TOML
//!
//! ```toml
//! [input]
//! coordinate_system = "geographic"   # or "projected" (meters)
//!
//! [clustering]
//! proximity_threshold_m = 3.5
//! index = "rtree"                    # or "grid"
//! max_components = 8                 # optional cap
//!
//! [clustering.zone_thresholds]
//! "4" = 3.2                          # per-zone override
//!
//! [runtime]
//! zone_parallelism = 4
//! max_in_flight = 8
//! max_connections = 4
//! timeout_secs = 600                 # optional deadline
//!
//! [[templates]]
//! name = "single-bench"
//! canonical_long = 2.32
//! canonical_short = 1.60
//! tolerance_ratio = 0.02
//! vertex_count = 7
//! ```

pub mod defaults;

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::classification::{CanonicalTemplate, validate_templates};
use crate::clustering::ClusterParams;
use crate::core::CoordinateSystem;
use crate::error::{ConfigurationError, Result};
use crate::fragment::Zone;
use crate::index::IndexKind;

/// Top-level detection configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub clustering: ClusteringConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default = "defaults::templates")]
    pub templates: Vec<CanonicalTemplate>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            input: InputConfig::default(),
            clustering: ClusteringConfig::default(),
            runtime: RuntimeConfig::default(),
            templates: defaults::templates(),
        }
    }
}

/// Input interpretation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// How fragment coordinates are expressed.
    #[serde(default)]
    pub coordinate_system: CoordinateSystem,
}

/// Clustering settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClusteringConfig {
    /// Global adjacency threshold in meters (default: 3.5)
    #[serde(default = "defaults::proximity_threshold_m")]
    pub proximity_threshold_m: f64,

    /// Per-zone threshold overrides, keyed by zone label
    #[serde(default)]
    pub zone_thresholds: BTreeMap<String, f64>,

    /// Maximum fragments per candidate (default: unbounded)
    #[serde(default)]
    pub max_components: Option<usize>,

    /// Spatial index implementation (default: rtree)
    #[serde(default)]
    pub index: IndexKind,

    /// Grid cell size in meters (default: twice the threshold)
    #[serde(default)]
    pub grid_cell_size_m: Option<f64>,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            proximity_threshold_m: defaults::proximity_threshold_m(),
            zone_thresholds: BTreeMap::new(),
            max_components: None,
            index: IndexKind::default(),
            grid_cell_size_m: None,
        }
    }
}

impl ClusteringConfig {
    /// Threshold for a zone, falling back to the global one.
    pub fn threshold_for(&self, zone: &Zone) -> f64 {
        self.zone_thresholds
            .get(zone.as_str())
            .copied()
            .unwrap_or(self.proximity_threshold_m)
    }

    /// Resolved clustering parameters for a zone.
    pub fn params_for(&self, zone: &Zone) -> ClusterParams {
        ClusterParams {
            threshold_m: self.threshold_for(zone),
            max_components: self.max_components,
            index: self.index,
            cell_size_m: self.grid_cell_size_m,
        }
    }

    fn validate(&self) -> std::result::Result<(), ConfigurationError> {
        let check = |field: String, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigurationError::InvalidClustering {
                    field,
                    reason: format!("must be finite and > 0 (got {value})"),
                })
            }
        };

        check("proximity_threshold_m".to_string(), self.proximity_threshold_m)?;
        for (zone, &value) in &self.zone_thresholds {
            check(format!("zone_thresholds.{zone}"), value)?;
        }
        if let Some(size) = self.grid_cell_size_m {
            check("grid_cell_size_m".to_string(), size)?;
        }
        if self.max_components == Some(0) {
            return Err(ConfigurationError::InvalidClustering {
                field: "max_components".to_string(),
                reason: "must be >= 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Batch execution settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Zones processed concurrently (default: 4)
    #[serde(default = "defaults::zone_parallelism")]
    pub zone_parallelism: usize,

    /// Classification workers per zone (default: 8)
    #[serde(default = "defaults::max_in_flight")]
    pub max_in_flight: usize,

    /// Connections to an external geometry service (default: 4)
    #[serde(default = "defaults::max_connections")]
    pub max_connections: usize,

    /// Deadline for the whole run in seconds (default: none)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            zone_parallelism: defaults::zone_parallelism(),
            max_in_flight: defaults::max_in_flight(),
            max_connections: defaults::max_connections(),
            timeout_secs: None,
        }
    }
}

impl RuntimeConfig {
    /// Deadline as a duration.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    fn validate(&self) -> std::result::Result<(), ConfigurationError> {
        for (field, value) in [
            ("zone_parallelism", self.zone_parallelism),
            ("max_in_flight", self.max_in_flight),
            ("max_connections", self.max_connections),
        ] {
            if value == 0 {
                return Err(ConfigurationError::InvalidRuntime {
                    field,
                    reason: "must be >= 1".to_string(),
                });
            }
        }
        Ok(())
    }
}

impl DetectionConfig {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        log::info!(
            "Config: loaded {} ({} templates, threshold {} m)",
            path.display(),
            config.templates.len(),
            config.clustering.proximity_threshold_m
        );
        Ok(config)
    }

    /// Parse and validate a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: DetectionConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section.
    pub fn validate(&self) -> std::result::Result<(), ConfigurationError> {
        self.clustering.validate()?;
        self.runtime.validate()?;
        validate_templates(&self.templates)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::ComponentRule;
    use crate::error::Error;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = DetectionConfig::from_toml_str("").unwrap();
        assert_eq!(config, DetectionConfig::default());
        assert_eq!(config.clustering.proximity_threshold_m, 3.5);
        assert_eq!(config.templates.len(), 2);
        assert_eq!(config.templates[0].canonical_long, 2.32);
    }

    #[test]
    fn test_full_file() {
        let config = DetectionConfig::from_toml_str(
            r#"
            [input]
            coordinate_system = "projected"

            [clustering]
            proximity_threshold_m = 3.0
            index = "grid"
            max_components = 6

            [clustering.zone_thresholds]
            "4" = 2.0

            [runtime]
            zone_parallelism = 2
            timeout_secs = 30

            [[templates]]
            name = "single bench"
            canonical_long = 4.2
            canonical_short = 0.6

            [[templates]]
            name = "multi bench"
            canonical_long = 4.0
            canonical_short = 1.6
            tolerance_ratio = 0.05
            components = { kind = "multi", min = 4, max = 6 }
            "#,
        )
        .unwrap();

        assert_eq!(config.input.coordinate_system, CoordinateSystem::Projected);
        assert_eq!(config.clustering.index, IndexKind::Grid);
        assert_eq!(config.clustering.threshold_for(&Zone::new("4")), 2.0);
        assert_eq!(config.clustering.threshold_for(&Zone::new("5")), 3.0);
        assert_eq!(config.runtime.max_in_flight, 8);
        assert_eq!(config.runtime.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.templates[0].tolerance_ratio, 0.02);
        assert_eq!(
            config.templates[1].components,
            ComponentRule::Multi { min: 4, max: Some(6) }
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        for toml in [
            "[clustering]\nproximity_threshold_m = -1.0",
            "[clustering.zone_thresholds]\n\"7\" = 0.0",
            "[runtime]\nmax_in_flight = 0",
            "templates = []",
            "[[templates]]\nname = \"x\"\ncanonical_long = 2.0\ncanonical_short = 1.0\ntolerance_ratio = 1.5",
        ] {
            let err = DetectionConfig::from_toml_str(toml).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{toml}: {err}");
        }

        let err = DetectionConfig::from_toml_str("[[templates]]\nname = \"x\"").unwrap_err();
        assert!(matches!(err, Error::Toml(_)));
    }

    #[test]
    fn test_toml_roundtrip_of_defaults() {
        let text = DetectionConfig::default().to_toml_string().unwrap();
        let back = DetectionConfig::from_toml_str(&text).unwrap();
        assert_eq!(back, DetectionConfig::default());
    }

    #[test]
    fn test_shipped_config_parses() {
        let config = DetectionConfig::from_toml_str(include_str!("../../configs/detection.toml")).unwrap();
        assert_eq!(config.templates, defaults::templates());
        assert_eq!(config.clustering.threshold_for(&Zone::new("4")), 2.5);
        assert_eq!(config.clustering.threshold_for(&Zone::new("7")), 3.5);
    }
}
