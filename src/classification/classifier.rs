//! Template matching of candidate objects.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::template::{CanonicalTemplate, Deviation, validate_templates};
use crate::clustering::{CandidateId, CandidateObject};
use crate::envelope::{Envelope, EnvelopeProvider};
use crate::error::{ConfigurationError, GeometryError};
use crate::fragment::{FragmentId, Zone};

/// Outcome category of a classification.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Matched the named template.
    Template(String),
    /// No admissible template within tolerance.
    Unclassified,
}

impl Category {
    /// Label used in reports.
    pub fn label(&self) -> &str {
        match self {
            Category::Template(name) => name,
            Category::Unclassified => "unclassified",
        }
    }

    /// True if a template matched.
    #[inline]
    pub fn is_classified(&self) -> bool {
        matches!(self, Category::Template(_))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classification of one candidate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Candidate identifier.
    pub candidate: CandidateId,
    /// Zone of the candidate.
    pub zone: Zone,
    /// Member fragments, ascending.
    pub fragments: Vec<FragmentId>,
    /// Assigned category.
    pub category: Category,
    /// Measured envelope.
    pub envelope: Option<Envelope>,
    /// Deviation from the matched template.
    pub deviation: Option<Deviation>,
    /// Combined deviation score of the match.
    pub score: Option<f64>,
    /// Template confidence on match, 0 otherwise.
    pub confidence: f64,
}

impl ClassificationResult {
    /// Number of member fragments.
    #[inline]
    pub fn component_count(&self) -> usize {
        self.fragments.len()
    }
}

/// Best admissible template for an envelope.
///
/// A template matches when the candidate passes its component and vertex
/// gates and both relative deviations are within its tolerance. Among
/// matches the smallest [`Deviation::score`] wins; exact ties go to the
/// template declared first.
///
/// # Returns
/// Index of the winning template and its deviation, or `None`.
pub fn match_envelope(
    envelope: &Envelope,
    component_count: usize,
    vertex_count: usize,
    templates: &[CanonicalTemplate],
) -> Option<(usize, Deviation)> {
    let mut best: Option<(usize, Deviation)> = None;

    for (i, template) in templates.iter().enumerate() {
        if !template.admits(component_count, vertex_count) {
            continue;
        }
        let deviation = template.deviation(envelope);
        if !deviation.within(template.tolerance_ratio) {
            continue;
        }
        // Strict comparison keeps the earlier template on ties
        if best.is_none_or(|(_, d)| deviation.score() < d.score()) {
            best = Some((i, deviation));
        }
    }

    best
}

/// Classify one candidate.
///
/// # Errors
/// Returns the candidate's defect, or the provider's error, when no
/// envelope can be measured. The caller counts such candidates as skipped.
pub fn classify<P: EnvelopeProvider + ?Sized>(
    candidate: &CandidateObject,
    templates: &[CanonicalTemplate],
    provider: &P,
) -> Result<ClassificationResult, GeometryError> {
    if let Some(defect) = &candidate.defect {
        return Err(defect.clone());
    }

    let envelope = provider.envelope(&candidate.fragments)?;
    let matched = match_envelope(
        &envelope,
        candidate.component_count(),
        candidate.vertex_count,
        templates,
    );

    let (category, deviation, confidence) = match matched {
        Some((i, deviation)) => (
            Category::Template(templates[i].name.clone()),
            Some(deviation),
            templates[i].confidence,
        ),
        None => (Category::Unclassified, None, 0.0),
    };

    Ok(ClassificationResult {
        candidate: candidate.id,
        zone: candidate.zone.clone(),
        fragments: candidate.fragments.clone(),
        category,
        envelope: Some(envelope),
        deviation,
        score: deviation.map(|d| d.score()),
        confidence,
    })
}

/// A validated template set.
#[derive(Clone, Debug)]
pub struct Classifier {
    templates: Vec<CanonicalTemplate>,
}

impl Classifier {
    /// Validate templates and build a classifier.
    ///
    /// # Errors
    /// [`ConfigurationError`] if the set is empty or any template is invalid.
    pub fn new(templates: Vec<CanonicalTemplate>) -> Result<Self, ConfigurationError> {
        validate_templates(&templates)?;
        Ok(Self { templates })
    }

    /// Templates in declaration order.
    pub fn templates(&self) -> &[CanonicalTemplate] {
        &self.templates
    }

    /// Classify one candidate. See [`classify`].
    pub fn classify<P: EnvelopeProvider + ?Sized>(
        &self,
        candidate: &CandidateObject,
        provider: &P,
    ) -> Result<ClassificationResult, GeometryError> {
        classify(candidate, &self.templates, provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::ComponentRule;
    use approx::assert_relative_eq;

    fn bench() -> CanonicalTemplate {
        CanonicalTemplate::new("single bench", 4.2, 0.6, 0.02)
    }

    #[test]
    fn test_match_within_tolerance() {
        let (i, d) = match_envelope(&Envelope::new(4.19, 0.605), 1, 5, &[bench()]).unwrap();
        assert_eq!(i, 0);
        assert_relative_eq!(d.long, 0.01 / 4.2, epsilon = 1e-12);
        assert_relative_eq!(d.short, 0.005 / 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_no_match_outside_tolerance() {
        assert!(match_envelope(&Envelope::new(5.0, 0.6), 1, 5, &[bench()]).is_none());
    }

    #[test]
    fn test_single_template_gated_by_component_count() {
        assert!(match_envelope(&Envelope::new(4.2, 0.6), 2, 10, &[bench()]).is_none());
    }

    #[test]
    fn test_tie_break_smallest_score_then_order() {
        let envelope = Envelope::new(4.2, 0.6);
        let near = CanonicalTemplate::new("near", 4.21, 0.6, 0.05);
        let exact = CanonicalTemplate::new("exact", 4.2, 0.6, 0.05);
        let twin = CanonicalTemplate::new("twin", 4.2, 0.6, 0.05);

        let (i, _) = match_envelope(&envelope, 1, 0, &[near.clone(), exact.clone()]).unwrap();
        assert_eq!(i, 1);
        let (i, _) = match_envelope(&envelope, 1, 0, &[exact, twin, near]).unwrap();
        assert_eq!(i, 0);
    }

    #[test]
    fn test_multi_template() {
        let multi = CanonicalTemplate::new("multi bench", 4.0, 1.6, 0.05)
            .with_components(ComponentRule::Multi { min: 4, max: Some(6) });
        let templates = [bench(), multi];

        let (i, _) = match_envelope(&Envelope::new(4.05, 1.62), 5, 20, &templates).unwrap();
        assert_eq!(i, 1);
        assert!(match_envelope(&Envelope::new(4.05, 1.62), 3, 20, &templates).is_none());
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(Category::Template("a".into()).to_string(), "a");
        assert_eq!(Category::Unclassified.to_string(), "unclassified");
        assert_eq!(
            serde_json::to_string(&Category::Unclassified).unwrap(),
            "\"unclassified\""
        );
    }

    #[test]
    fn test_classifier_rejects_empty_set() {
        assert!(matches!(Classifier::new(vec![]), Err(ConfigurationError::NoTemplates)));
    }
}
