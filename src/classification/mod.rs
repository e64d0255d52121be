//! Classification of candidates against canonical templates.
//!
//! A candidate matches a template when its oriented envelope deviates from
//! the canonical sides by no more than the template's tolerance ratio on
//! both axes, and its component (and optionally vertex) count is admissible:
//!
//! ```text
//! dev_long  = |long  - canonical_long|  / canonical_long   <= tolerance
//! dev_short = |short - canonical_short| / canonical_short  <= tolerance
//! ```
//!
//! Ranking among several matches: smallest `dev_long + dev_short`, then
//! declaration order. Failing to match is not an error; the candidate is
//! reported as [`Category::Unclassified`].

mod classifier;
mod template;

pub use classifier::{
    Category, ClassificationResult, Classifier, classify, match_envelope,
};
pub use template::{CanonicalTemplate, ComponentRule, Deviation, validate_templates};
