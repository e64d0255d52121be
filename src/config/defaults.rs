//! Default value functions for serde deserialization.
//!
//! Values recorded by the Paris bench analysis: 3.5 m proximity for
//! multi-piece benches, 2% tolerance, 2.32 m x 1.60 m for the common
//! seven-vertex single bench and 2.98 m x 1.69 m for the five-vertex one.

use crate::classification::CanonicalTemplate;

pub fn proximity_threshold_m() -> f64 {
    3.5
}

pub fn tolerance_ratio() -> f64 {
    0.02
}

pub fn template_confidence() -> f64 {
    0.9
}

pub fn multi_min_components() -> usize {
    2
}

pub fn zone_parallelism() -> usize {
    4
}

pub fn max_in_flight() -> usize {
    8
}

pub fn max_connections() -> usize {
    4
}

pub fn single_component_category() -> String {
    "single-component".to_string()
}

/// Templates used when a configuration declares none.
pub fn templates() -> Vec<CanonicalTemplate> {
    vec![
        CanonicalTemplate::new("single-bench", 2.32, 1.60, tolerance_ratio())
            .with_vertex_count(7)
            .with_confidence(0.95),
        CanonicalTemplate::new("single-bench-wide", 2.98, 1.69, tolerance_ratio())
            .with_vertex_count(5)
            .with_confidence(0.95),
    ]
}
