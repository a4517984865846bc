//! Main Library File for Document Anonymization
//! Provides a two-pass engine that replaces regulated designations in
//! document text, harvests their organization codes, and sweeps the
//! document again for standalone mentions of those codes.

// Configuration and Core Pipeline
pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

// Matching
pub mod patterns;
pub mod search;

// Replacement and editing
pub mod editor;
pub mod replacement;

// Document access and per-area handlers
pub mod document;
pub mod handlers;

// Observability and reporting
pub mod observer;
pub mod report;

// Shared Utilities
pub mod utils;

// Re-exports for crate consumers
pub use config::{AnonymizerSettings, ProcessingOptions, Validate};
pub use document::{AreaKind, DocumentAccess, InMemoryDocument};
pub use error::{Error, Result};
pub use handlers::{ElementHandler, HandlerChain};
pub use observer::{MetricsObserver, ProcessingEvent, ProcessingObserver, TracingObserver};
pub use pipeline::{
    anonymize_block, BatchProcessor, CancellationFlag, ProcessingConfiguration, TwoPassOrchestrator,
    TwoPassProcessingConfiguration,
};
pub use replacement::{CodeAccumulator, ReplacementStrategy};
pub use report::{BatchReport, ReportError, ReportFormat};
pub use search::SearchStrategy;
pub use types::{BatchResult, ProcessingResult, TextMatch};
pub use utils::{init_logging, Metrics};
