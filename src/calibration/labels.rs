//! Manually labeled examples.
//!
//! The labeled export is a list of validated clusters:
//!
//! ```json
//! [{"id": "b-104", "type": "benches", "arrondissement": 7,
//!   "component_ids": [104233], "component_count": 1,
//!   "total_length": 2.31, "confidence": 0.98}]
//! ```
//!
//! Field names from that export are accepted as aliases. The corpus may also
//! be grouped by zone, `{"7": [...], "12": [...]}`, in which case records
//! without an explicit zone take the key.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;
use crate::fragment::{FragmentId, Zone};

/// One labeled cluster.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabeledExample {
    /// Label identifier, if any.
    #[serde(default, deserialize_with = "label_id")]
    pub id: Option<String>,
    /// Category label.
    #[serde(alias = "type")]
    pub category: String,
    /// Zone of the example.
    #[serde(default, alias = "arrondissement")]
    pub zone: Option<Zone>,
    /// Member fragments.
    #[serde(alias = "component_ids")]
    pub fragment_ids: Vec<FragmentId>,
    /// Declared component count (informational; `fragment_ids` is authoritative).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_count: Option<usize>,
    /// Declared total outline length in meters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_length: Option<f64>,
    /// Labeler confidence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl LabeledExample {
    /// Example with the given category and fragments.
    pub fn new(category: impl Into<String>, zone: Option<Zone>, fragment_ids: Vec<FragmentId>) -> Self {
        Self {
            id: None,
            category: category.into(),
            zone,
            fragment_ids,
            component_count: None,
            total_length: None,
            confidence: None,
        }
    }

    /// Number of member fragments.
    #[inline]
    pub fn component_count(&self) -> usize {
        self.fragment_ids.len()
    }

    /// True if the example is in `zone`, or no zone filter is given.
    #[inline]
    pub fn in_zone(&self, zone: Option<&Zone>) -> bool {
        zone.is_none_or(|z| self.zone.as_ref() == Some(z))
    }
}

/// Accept string or integer label ids.
fn label_id<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
    }))
}

/// A labeled corpus as found on disk.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum LabeledCorpus {
    /// Plain list of examples.
    Flat(Vec<LabeledExample>),
    /// Examples grouped by zone key.
    Grouped(BTreeMap<String, Vec<LabeledExample>>),
}

impl LabeledCorpus {
    /// Parse a corpus from JSON text.
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a corpus from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let corpus = Self::from_json_str(&content)?;
        log::info!("Labels: loaded {} ({} examples)", path.display(), corpus.len());
        Ok(corpus)
    }

    /// Number of examples.
    pub fn len(&self) -> usize {
        match self {
            LabeledCorpus::Flat(list) => list.len(),
            LabeledCorpus::Grouped(groups) => groups.values().map(Vec::len).sum(),
        }
    }

    /// Check if the corpus has no examples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten, filling missing zones from group keys.
    pub fn into_examples(self) -> Vec<LabeledExample> {
        match self {
            LabeledCorpus::Flat(list) => list,
            LabeledCorpus::Grouped(groups) => groups
                .into_iter()
                .flat_map(|(key, list)| {
                    list.into_iter().map(move |mut example| {
                        if example.zone.is_none() {
                            example.zone = Some(Zone::new(key.trim()));
                        }
                        example
                    })
                })
                .collect(),
        }
    }
}
