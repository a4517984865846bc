//! Error types and handling for the anonymization engine
//! Author: kartik4091

use std::{io, result::Result as StdResult};

use thiserror::Error;

/// Custom result type for anonymization operations
pub type Result<T> = StdResult<T, Error>;

/// Core error type for anonymization operations
#[derive(Error, Debug)]
#[non_exhaustive]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Pattern error: {0}")]
    PatternError(#[from] PatternError),

    #[error("Document error: {0}")]
    DocumentError(#[from] DocumentError),

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Timeout error: {0}")]
    TimeoutError(String),

    #[error("Processing cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    InternalError(String),
}

// -------------------- Sub-Error Categories --------------------

/// Invalid or unusable pattern definitions. Raised while building search
/// strategies, never while matching.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PatternError {
    #[error("Pattern '{name}' has an empty expression")]
    EmptyExpression { name: String },

    #[error("Pattern '{name}' is invalid: {source}")]
    InvalidExpression {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("Pattern '{name}' did not compile within {timeout_ms} ms")]
    CompileTimeout { name: String, timeout_ms: u64 },

    #[error("Unknown built-in pattern: {0}")]
    UnknownBuiltin(String),
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("First pass replacement strategy must extract organization codes")]
    MissingCodeExtraction,

    #[error("Pass '{0}' has no search strategy")]
    NoSearchStrategy(String),

    #[error("Invalid option {option}: {reason}")]
    InvalidOption { option: String, reason: String },

    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Failures reported by the document adapter layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DocumentError {
    /// The whole document cannot be read; aborts the invocation.
    #[error("Document unreadable: {0}")]
    Unreadable(String),

    /// One structural area cannot be accessed; other areas continue.
    #[error("Area '{area}' unavailable: {reason}")]
    AreaUnavailable { area: String, reason: String },

    /// One item inside an area cannot be updated.
    #[error("Cannot update {item}: {reason}")]
    ItemUpdate { item: String, reason: String },
}

impl DocumentError {
    /// Whether this failure must abort the per-document invocation.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DocumentError::Unreadable(_))
    }
}

/// Failure of a single replacement computation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Replacement '{strategy}' failed for '{value}': {reason}")]
pub struct ReplacementError {
    pub strategy: String,
    pub value: String,
    pub reason: String,
}
