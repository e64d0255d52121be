//! Error types for detection, calibration and configuration.

use thiserror::Error;

use crate::fragment::FragmentId;

/// Failure to measure a geometry or a group of geometries.
///
/// Geometry errors are recoverable: the pipeline logs them, counts the
/// affected candidate as skipped and moves on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// No vertices at all.
    #[error("geometry is empty")]
    Empty,

    /// The minimum enclosing rectangle has zero area (collinear or
    /// coincident vertices).
    #[error("geometry is degenerate: zero-area envelope")]
    Degenerate,

    /// Coordinates out of range, non-finite, or an invalid ring.
    #[error("malformed geometry: {0}")]
    Malformed(String),

    /// A requested fragment is not in the store.
    #[error("unknown fragment {0}")]
    UnknownFragment(FragmentId),

    /// The external geometry service failed or timed out.
    #[error("geometry service error: {0}")]
    Service(String),
}

/// Calibration failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// No labeled example survived the category / zone / component filter.
    #[error(
        "insufficient data: no single-component '{category}' examples{} among {scanned} labeled examples",
        .zone.as_ref().map(|z| format!(" in zone {z}")).unwrap_or_default()
    )]
    InsufficientData {
        /// Category that was filtered on
        category: String,
        /// Zone filter, if any
        zone: Option<String>,
        /// Number of labeled examples scanned
        scanned: usize,
    },

    /// Examples qualified, but none produced a usable envelope.
    #[error("envelope computation failed for all {attempted} qualifying examples")]
    EnvelopeComputation {
        /// Number of qualifying examples
        attempted: usize,
        /// The last geometry error seen
        last_error: Option<GeometryError>,
    },
}

/// Invalid detection configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("no canonical templates defined")]
    NoTemplates,

    #[error("template #{index} has an empty name")]
    EmptyTemplateName { index: usize },

    #[error("duplicate template name '{0}'")]
    DuplicateTemplate(String),

    #[error("template '{name}': {field} must be finite and > 0 (got {value})")]
    NonPositiveLength {
        name: String,
        field: &'static str,
        value: f64,
    },

    #[error("template '{name}': canonical_long ({long}) is shorter than canonical_short ({short})")]
    SwappedLengths { name: String, long: f64, short: f64 },

    #[error("template '{name}': tolerance_ratio must be in (0, 1) (got {value})")]
    ToleranceOutOfRange { name: String, value: f64 },

    #[error("template '{name}': confidence must be in [0, 1] (got {value})")]
    ConfidenceOutOfRange { name: String, value: f64 },

    #[error("template '{name}': invalid component rule: {reason}")]
    InvalidComponentRule { name: String, reason: String },

    #[error("clustering.{field}: {reason}")]
    InvalidClustering { field: String, reason: String },

    #[error("runtime.{field}: {reason}")]
    InvalidRuntime { field: &'static str, reason: String },
}

/// Crate-level error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigurationError),

    #[error("Calibration error: {0}")]
    Calibration(#[from] CalibrationError),

    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Invalid input: {0}")]
    Input(String),
}

/// Result type for crate operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_message() {
        let err = CalibrationError::InsufficientData {
            category: "benches".into(),
            zone: Some("7".into()),
            scanned: 12,
        };
        let msg = err.to_string();
        assert!(msg.contains("'benches'"));
        assert!(msg.contains("in zone 7"));
        assert!(msg.contains("12"));

        let err = CalibrationError::InsufficientData {
            category: "benches".into(),
            zone: None,
            scanned: 0,
        };
        assert!(!err.to_string().contains("zone"));
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = GeometryError::Degenerate.into();
        assert!(matches!(err, Error::Geometry(GeometryError::Degenerate)));
    }
}
