//! Processing results produced by handlers and merged up the chain

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata key holding the number of organization codes harvested in pass one.
pub const CODES_REMOVED_KEY: &str = "CodesRemoved";

/// Outcome of one handler, one pass or one whole document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub success: bool,
    pub matches_found: usize,
    pub matches_processed: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub metadata: BTreeMap<String, Value>,
}

impl Default for ProcessingResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingResult {
    /// Successful, empty result.
    pub fn new() -> Self {
        Self {
            success: true,
            matches_found: 0,
            matches_processed: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    /// Document-level failure carrying no partial data.
    pub fn fatal(message: impl Into<String>) -> Self {
        let mut result = Self::new();
        result.success = false;
        result.errors.push(message.into());
        result
    }

    /// Records an error and marks the result failed.
    pub fn add_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.success = false;
        if !self.errors.contains(&message) {
            self.errors.push(message);
        }
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        let message = message.into();
        if !self.warnings.contains(&message) {
            self.warnings.push(message);
        }
    }

    /// Inserts metadata unless the key is already present.
    pub fn insert_metadata(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.metadata.entry(key.into()).or_insert_with(|| value.into());
    }

    /// Inserts metadata, replacing any existing value.
    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// Folds `other` into `self`: counts are summed, error and warning lists
    /// are unioned without duplicates, and metadata keeps the value that was
    /// present first.
    pub fn merge(&mut self, other: ProcessingResult) {
        self.success &= other.success;
        self.matches_found += other.matches_found;
        self.matches_processed += other.matches_processed;
        for error in other.errors {
            if !self.errors.contains(&error) {
                self.errors.push(error);
            }
        }
        for warning in other.warnings {
            self.add_warning(warning);
        }
        for (key, value) in other.metadata {
            self.metadata.entry(key).or_insert(value);
        }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn codes_removed(&self) -> Option<u64> {
        self.metadata.get(CODES_REMOVED_KEY).and_then(Value::as_u64)
    }
}

/// Per-file entry of a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResult {
    pub path: PathBuf,
    pub result: ProcessingResult,
}

/// Aggregate over a batch of independently processed documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchResult {
    pub total_files: usize,
    pub successful_files: usize,
    pub failed_files: usize,
    pub per_file_results: Vec<FileResult>,
}

impl BatchResult {
    pub fn push(&mut self, path: PathBuf, result: ProcessingResult) {
        self.total_files += 1;
        if result.success {
            self.successful_files += 1;
        } else {
            self.failed_files += 1;
        }
        self.per_file_results.push(FileResult { path, result });
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed_files == 0
    }

    pub fn total_matches_processed(&self) -> usize {
        self.per_file_results
            .iter()
            .map(|f| f.result.matches_processed)
            .sum()
    }
}
