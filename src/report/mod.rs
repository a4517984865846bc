//! Batch report rendering
//! Author: kartik4091

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{BatchResult, ProcessingResult};
use crate::utils::MetricsSnapshot;

/// Report output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(ReportError::FormatError(format!("unknown report format '{other}'"))),
        }
    }
}

/// Report generation errors
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Format error: {0}")]
    FormatError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    pub success: bool,
    pub matches_found: usize,
    pub matches_processed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codes_removed: Option<u64>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl FileEntry {
    fn new(path: &Path, result: &ProcessingResult) -> Self {
        Self {
            path: path.display().to_string(),
            success: result.success,
            matches_found: result.matches_found,
            matches_processed: result.matches_processed,
            codes_removed: result.codes_removed(),
            errors: result.errors.clone(),
            warnings: result.warnings.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_files: usize,
    pub successful_files: usize,
    pub failed_files: usize,
    pub matches_processed: usize,
}

/// Snapshot of one batch run
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub run_id: String,
    pub generated_at: String,
    pub version: String,
    pub summary: ReportSummary,
    pub files: Vec<FileEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricsSnapshot>,
}

impl BatchReport {
    pub fn new(batch: &BatchResult) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            summary: ReportSummary {
                total_files: batch.total_files,
                successful_files: batch.successful_files,
                failed_files: batch.failed_files,
                matches_processed: batch.total_matches_processed(),
            },
            files: batch
                .per_file_results
                .iter()
                .map(|f| FileEntry::new(&f.path, &f.result))
                .collect(),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: MetricsSnapshot) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn render(&self, format: ReportFormat) -> Result<String, ReportError> {
        match format {
            ReportFormat::Text => Ok(self.format_as_text()),
            ReportFormat::Json => Ok(serde_json::to_string_pretty(self)?),
        }
    }

    pub fn write(&self, path: &Path, format: ReportFormat) -> Result<(), ReportError> {
        std::fs::write(path, self.render(format)?)?;
        Ok(())
    }

    fn format_as_text(&self) -> String {
        let mut content = String::new();
        content.push_str("Anonymization Report\n");
        content.push_str("====================\n\n");
        content.push_str(&format!("Run: {}\n", self.run_id));
        content.push_str(&format!("Generated: {}\n", self.generated_at));
        content.push_str(&format!("Version: {}\n\n", self.version));

        content.push_str("Summary:\n");
        content.push_str(&format!("- Files: {}\n", self.summary.total_files));
        content.push_str(&format!("- Succeeded: {}\n", self.summary.successful_files));
        content.push_str(&format!("- Failed: {}\n", self.summary.failed_files));
        content.push_str(&format!("- Matches replaced: {}\n\n", self.summary.matches_processed));

        content.push_str("Files:\n");
        content.push_str("------\n");
        for file in &self.files {
            let status = if file.success { "OK" } else { "FAILED" };
            content.push_str(&format!(
                "[{status}] {} found={} replaced={}",
                file.path, file.matches_found, file.matches_processed
            ));
            if let Some(codes) = file.codes_removed {
                content.push_str(&format!(" codes={codes}"));
            }
            content.push('\n');
            for error in &file.errors {
                content.push_str(&format!("    error: {error}\n"));
            }
            for warning in &file.warnings {
                content.push_str(&format!("    warning: {warning}\n"));
            }
        }

        if let Some(metrics) = &self.metrics {
            content.push_str("\nCounters:\n");
            for (name, value) in &metrics.counters {
                content.push_str(&format!("- {name}: {value}\n"));
            }
        }
        content
    }
}
