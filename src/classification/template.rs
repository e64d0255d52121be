//! Canonical shape templates.

use serde::{Deserialize, Serialize};

use crate::config::defaults;
use crate::envelope::Envelope;
use crate::error::ConfigurationError;

/// Which component counts a template may be assigned to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ComponentRule {
    /// Exactly one fragment.
    #[default]
    Single,
    /// Between `min` and `max` fragments (inclusive).
    Multi {
        #[serde(default = "defaults::multi_min_components")]
        min: usize,
        #[serde(default)]
        max: Option<usize>,
    },
}

impl ComponentRule {
    /// Check if a candidate with `count` fragments is admissible.
    #[inline]
    pub fn admits(&self, count: usize) -> bool {
        match *self {
            ComponentRule::Single => count == 1,
            ComponentRule::Multi { min, max } => count >= min && max.is_none_or(|m| count <= m),
        }
    }
}

/// Relative deviation of an envelope from a template.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Deviation {
    /// `|long - canonical_long| / canonical_long`
    pub long: f64,
    /// `|short - canonical_short| / canonical_short`
    pub short: f64,
}

impl Deviation {
    /// Combined score used to rank matching templates (lower is better).
    #[inline]
    pub fn score(&self) -> f64 {
        self.long + self.short
    }

    /// True if both deviations are within `tolerance`.
    #[inline]
    pub fn within(&self, tolerance: f64) -> bool {
        self.long <= tolerance && self.short <= tolerance
    }
}

/// A named canonical shape with its matching tolerance.
///
/// ```toml
/// [[templates]]
/// name = "single-bench"
/// canonical_long = 2.32
/// canonical_short = 1.60
/// tolerance_ratio = 0.02
/// vertex_count = 7
/// confidence = 0.95
/// components = { kind = "single" }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanonicalTemplate {
    /// Category label assigned on match.
    pub name: String,
    /// Canonical long side (meters).
    pub canonical_long: f64,
    /// Canonical short side (meters).
    pub canonical_short: f64,
    /// Maximum relative deviation on each side.
    #[serde(default = "defaults::tolerance_ratio")]
    pub tolerance_ratio: f64,
    /// Admissible component counts.
    #[serde(default)]
    pub components: ComponentRule,
    /// Required total vertex count, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertex_count: Option<usize>,
    /// Confidence reported for matches.
    #[serde(default = "defaults::template_confidence")]
    pub confidence: f64,
}

impl CanonicalTemplate {
    /// Single-component template with default confidence.
    pub fn new(name: impl Into<String>, long: f64, short: f64, tolerance_ratio: f64) -> Self {
        Self {
            name: name.into(),
            canonical_long: long,
            canonical_short: short,
            tolerance_ratio,
            components: ComponentRule::Single,
            vertex_count: None,
            confidence: defaults::template_confidence(),
        }
    }

    /// Replace the component rule.
    pub fn with_components(mut self, components: ComponentRule) -> Self {
        self.components = components;
        self
    }

    /// Require an exact total vertex count.
    pub fn with_vertex_count(mut self, vertex_count: usize) -> Self {
        self.vertex_count = Some(vertex_count);
        self
    }

    /// Set the reported confidence.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Check if a candidate's shape counts pass this template's gates.
    #[inline]
    pub fn admits(&self, component_count: usize, vertex_count: usize) -> bool {
        self.components.admits(component_count)
            && self.vertex_count.is_none_or(|v| v == vertex_count)
    }

    /// Relative deviation of `envelope` from the canonical sides.
    #[inline]
    pub fn deviation(&self, envelope: &Envelope) -> Deviation {
        Deviation {
            long: (envelope.long - self.canonical_long).abs() / self.canonical_long,
            short: (envelope.short - self.canonical_short).abs() / self.canonical_short,
        }
    }

    /// Check the template's own invariants.
    ///
    /// `index` is the template's position, used when the name is empty.
    pub fn validate(&self, index: usize) -> Result<(), ConfigurationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ConfigurationError::EmptyTemplateName { index });
        }

        for (field, value) in [
            ("canonical_long", self.canonical_long),
            ("canonical_short", self.canonical_short),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigurationError::NonPositiveLength {
                    name: name.to_string(),
                    field,
                    value,
                });
            }
        }

        if self.canonical_long < self.canonical_short {
            return Err(ConfigurationError::SwappedLengths {
                name: name.to_string(),
                long: self.canonical_long,
                short: self.canonical_short,
            });
        }

        if !(self.tolerance_ratio > 0.0 && self.tolerance_ratio < 1.0) {
            return Err(ConfigurationError::ToleranceOutOfRange {
                name: name.to_string(),
                value: self.tolerance_ratio,
            });
        }

        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(ConfigurationError::ConfidenceOutOfRange {
                name: name.to_string(),
                value: self.confidence,
            });
        }

        if let ComponentRule::Multi { min, max } = self.components {
            let reason = if min < 2 {
                Some(format!("min must be >= 2 (got {min})"))
            } else if let Some(max) = max
                && max < min
            {
                Some(format!("max {max} is below min {min}"))
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(ConfigurationError::InvalidComponentRule {
                    name: name.to_string(),
                    reason,
                });
            }
        }

        if self.vertex_count == Some(0) {
            return Err(ConfigurationError::InvalidComponentRule {
                name: name.to_string(),
                reason: "vertex_count must be > 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Validate a template set: non-empty, each valid, names unique.
pub fn validate_templates(templates: &[CanonicalTemplate]) -> Result<(), ConfigurationError> {
    if templates.is_empty() {
        return Err(ConfigurationError::NoTemplates);
    }

    let mut seen = std::collections::HashSet::new();
    for (i, template) in templates.iter().enumerate() {
        template.validate(i)?;
        if !seen.insert(template.name.trim()) {
            return Err(ConfigurationError::DuplicateTemplate(template.name.trim().to_string()));
        }
    }
    Ok(())
}
