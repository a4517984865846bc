//! Batch driver over document files
//! Author: kartik4091
//!
//! Documents are independent: each one gets its own orchestrator and code
//! accumulator built from the shared settings, and one document's failure
//! never affects another.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rayon::prelude::*;
use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tracing::{debug, info, instrument, warn};

use super::TwoPassOrchestrator;
use crate::config::{AnonymizerSettings, Validate};
use crate::document::InMemoryDocument;
use crate::error::{ConfigError, Error, Result};
use crate::observer::ProcessingObserver;
use crate::types::{BatchResult, ProcessingResult};

const DOCUMENT_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// Cooperative cancellation signal, checked before each document starts.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Decides once per document whether its output is written or abandoned.
/// Whichever of `commit` and `abandon` runs first wins; the other fails.
#[derive(Debug, Clone, Default)]
struct OutputGate(Arc<AtomicU8>);

const GATE_OPEN: u8 = 0;
const GATE_COMMITTED: u8 = 1;
const GATE_ABANDONED: u8 = 2;

impl OutputGate {
    fn commit(&self) -> bool {
        self.close(GATE_COMMITTED)
    }

    fn abandon(&self) -> bool {
        self.close(GATE_ABANDONED)
    }

    fn close(&self, state: u8) -> bool {
        self.0
            .compare_exchange(GATE_OPEN, state, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

/// Per-document work shared by both drivers.
#[derive(Debug)]
struct DocumentWorker {
    settings: AnonymizerSettings,
    observer: Option<Arc<dyn ProcessingObserver>>,
    dry_run: bool,
}

impl DocumentWorker {
    /// Loads, anonymizes and writes one document. The output is written only
    /// when `gate` can still be committed.
    fn process_file(&self, input: &Path, output: &Path, gate: &OutputGate) -> ProcessingResult {
        match self.try_process_file(input, output, gate) {
            Ok(result) => result,
            Err(e) => {
                warn!(path = %input.display(), error = %e, "Document failed");
                ProcessingResult::fatal(e.to_string())
            }
        }
    }

    fn try_process_file(
        &self,
        input: &Path,
        output: &Path,
        gate: &OutputGate,
    ) -> Result<ProcessingResult> {
        let mut config = self.settings.build_two_pass()?;
        if let Some(observer) = &self.observer {
            config = config.with_observer(observer.clone());
        }
        let orchestrator = TwoPassOrchestrator::new(config)?;

        let mut document = InMemoryDocument::load(input)?;
        let result = orchestrator.process(&mut document);
        if self.dry_run {
            return Ok(result);
        }
        if !gate.commit() {
            debug!(path = %input.display(), "Document abandoned, output not written");
            return Ok(result);
        }
        document.save(output)?;
        Ok(result)
    }
}

/// Output path inside `out_dir` under the input's file name.
fn output_path(input: &Path, out_dir: &Path) -> Result<PathBuf> {
    let file_name = input
        .file_name()
        .ok_or_else(|| Error::InternalError(format!("{} has no file name", input.display())))?;
    Ok(out_dir.join(file_name))
}

#[derive(Debug)]
pub struct BatchProcessor {
    worker: Arc<DocumentWorker>,
    jobs: usize,
    timeout: Option<Duration>,
    cancellation: CancellationFlag,
}

impl BatchProcessor {
    /// Validates `settings` once up front so a bad configuration fails here
    /// instead of once per document.
    pub fn new(settings: AnonymizerSettings) -> Result<Self> {
        settings.validate()?;
        settings.build_two_pass()?;
        Ok(Self {
            worker: Arc::new(DocumentWorker {
                settings,
                observer: None,
                dry_run: false,
            }),
            jobs: num_cpus::get(),
            timeout: None,
            cancellation: CancellationFlag::new(),
        })
    }

    pub fn with_jobs(mut self, jobs: usize) -> Result<Self> {
        if jobs == 0 {
            return Err(ConfigError::InvalidOption {
                option: "jobs".into(),
                reason: "must be at least 1".into(),
            }
            .into());
        }
        self.jobs = jobs;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn ProcessingObserver>) -> Self {
        self.update_worker(|worker| worker.observer = Some(observer));
        self
    }

    /// Processes documents but writes nothing.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.update_worker(|worker| worker.dry_run = dry_run);
        self
    }

    fn update_worker(&mut self, update: impl FnOnce(&mut DocumentWorker)) {
        let current = &self.worker;
        let mut worker = DocumentWorker {
            settings: current.settings.clone(),
            observer: current.observer.clone(),
            dry_run: current.dry_run,
        };
        update(&mut worker);
        self.worker = Arc::new(worker);
    }

    pub fn cancellation_flag(&self) -> CancellationFlag {
        self.cancellation.clone()
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Document files (`.json`, `.yaml`, `.yml`) directly inside `dir`, sorted.
    pub fn collect_inputs(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut inputs = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let is_document = path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| DOCUMENT_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
                    .unwrap_or(false);
            if is_document {
                inputs.push(path);
            }
        }
        inputs.sort();
        Ok(inputs)
    }

    /// Processes one document synchronously and writes it to `output`.
    pub fn process_file(&self, input: &Path, output: &Path) -> ProcessingResult {
        self.worker.process_file(input, output, &OutputGate::default())
    }

    fn process_into(&self, input: &Path, out_dir: &Path) -> ProcessingResult {
        match output_path(input, out_dir) {
            Ok(output) => self.worker.process_file(input, &output, &OutputGate::default()),
            Err(e) => ProcessingResult::fatal(e.to_string()),
        }
    }

    /// Async driver: at most `jobs` documents at once, each on the blocking
    /// pool, each bounded by the optional timeout.
    #[instrument(skip_all, fields(files = inputs.len(), jobs = self.jobs))]
    pub async fn run(&self, inputs: Vec<PathBuf>, out_dir: &Path) -> Result<BatchResult> {
        if !self.worker.dry_run {
            tokio::fs::create_dir_all(out_dir).await?;
        }
        let semaphore = Arc::new(Semaphore::new(self.jobs));
        let mut tasks = Vec::with_capacity(inputs.len());

        for input in inputs {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| Error::InternalError(e.to_string()))?;
            if self.cancellation.is_cancelled() {
                drop(permit);
                tasks.push((input, Err(ProcessingResult::fatal(Error::Cancelled.to_string()))));
                continue;
            }

            let output = match output_path(&input, out_dir) {
                Ok(output) => output,
                Err(e) => {
                    drop(permit);
                    tasks.push((input, Err(ProcessingResult::fatal(e.to_string()))));
                    continue;
                }
            };
            let worker = self.worker.clone();
            let timeout = self.timeout;
            let path = input.clone();
            let gate = OutputGate::default();
            let worker_gate = gate.clone();
            let task = tokio::spawn(async move {
                // The permit lives as long as the blocking work, not this task.
                let mut blocking = tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    worker.process_file(&path, &output, &worker_gate)
                });
                match timeout {
                    Some(limit) => match tokio::time::timeout(limit, &mut blocking).await {
                        Ok(joined) => joined_result(joined),
                        Err(_) if gate.abandon() => {
                            let message = Error::TimeoutError(format!("document exceeded {limit:?}"));
                            ProcessingResult::fatal(message.to_string())
                        }
                        // Output already being written; that result stands.
                        Err(_) => joined_result(blocking.await),
                    },
                    None => joined_result(blocking.await),
                }
            });
            tasks.push((input, Ok(task)));
        }

        let mut batch = BatchResult::default();
        for (input, task) in tasks {
            // Documents that never started carry their result already.
            let result = match task {
                Ok(task) => joined_result(task.await),
                Err(result) => result,
            };
            batch.push(input, result);
        }
        log_summary(&batch);
        Ok(batch)
    }

    /// Synchronous driver on a rayon pool of `jobs` threads. The timeout does
    /// not apply here.
    #[instrument(skip_all, fields(files = inputs.len(), jobs = self.jobs))]
    pub fn run_parallel(&self, inputs: Vec<PathBuf>, out_dir: &Path) -> Result<BatchResult> {
        if !self.worker.dry_run {
            fs::create_dir_all(out_dir)?;
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| Error::InternalError(e.to_string()))?;

        let results: Vec<ProcessingResult> = pool.install(|| {
            inputs
                .par_iter()
                .map(|input| {
                    if self.cancellation.is_cancelled() {
                        ProcessingResult::fatal(Error::Cancelled.to_string())
                    } else {
                        self.process_into(input, out_dir)
                    }
                })
                .collect()
        });

        let mut batch = BatchResult::default();
        for (input, result) in inputs.into_iter().zip(results) {
            batch.push(input, result);
        }
        log_summary(&batch);
        Ok(batch)
    }
}

fn joined_result(joined: std::result::Result<ProcessingResult, JoinError>) -> ProcessingResult {
    joined.unwrap_or_else(|e| ProcessingResult::fatal(format!("worker failed: {e}")))
}

fn log_summary(batch: &BatchResult) {
    info!(
        total = batch.total_files,
        succeeded = batch.successful_files,
        failed = batch.failed_files,
        "Batch finished"
    );
}
