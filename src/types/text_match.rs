//! Match and replacement value types shared by search and replacement strategies

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single occurrence found in a flattened text block.
///
/// Offsets and lengths are counted in chars of the text projection the match
/// was produced from. A match is immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextMatch {
    value: String,
    start_index: usize,
    length: usize,
    match_type: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    metadata: BTreeMap<String, Value>,
}

impl TextMatch {
    /// Build a match whose length is derived from `value`.
    pub fn new(value: impl Into<String>, start_index: usize, match_type: impl Into<String>) -> Self {
        let value = value.into();
        let length = value.chars().count();
        Self {
            value,
            start_index,
            length,
            match_type: match_type.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn start_index(&self) -> usize {
        self.start_index
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Exclusive end offset in chars.
    pub fn end_index(&self) -> usize {
        self.start_index + self.length
    }

    pub fn match_type(&self) -> &str {
        &self.match_type
    }

    pub fn metadata(&self) -> &BTreeMap<String, Value> {
        &self.metadata
    }

    pub fn overlaps(&self, other: &TextMatch) -> bool {
        self.start_index < other.end_index() && other.start_index < self.end_index()
    }

    /// Same position and type, different value. Used by chained replacements.
    pub(crate) fn derive(&self, value: String) -> Self {
        let length = value.chars().count();
        Self {
            value,
            start_index: self.start_index,
            length,
            match_type: self.match_type.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

/// Output of a replacement strategy for one match.
///
/// Codes extracted while computing the replacement are returned alongside the
/// text so the caller decides where they accumulate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Replacement {
    pub text: String,
    pub extracted_codes: Vec<String>,
}

impl Replacement {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            extracted_codes: Vec::new(),
        }
    }

    pub fn with_code(text: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            extracted_codes: vec![code.into()],
        }
    }
}
