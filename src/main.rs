//! Document Anonymization Tool - CLI Interface
//! Author: kartik4091
//!
//! Anonymizes one document (`--input`/`--output`) or a directory of
//! documents (`--batch`/`--out-dir`). Exits with status 1 when any document
//! fails.

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{value_parser, Arg, ArgAction, ArgGroup, ArgMatches, Command};
use docanon::{
    init_logging, AnonymizerSettings, BatchProcessor, BatchReport, BatchResult, Metrics, MetricsObserver,
    ProcessingObserver, ReportFormat, TracingObserver,
};
use docanon::observer::ObserverSet;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let matches = build_cli().get_matches();

    let log_level = matches
        .get_one::<String>("verbose")
        .map(String::as_str)
        .unwrap_or("info");
    init_logging(log_level);

    info!("Document Anonymization Tool v{} - Starting...", env!("CARGO_PKG_VERSION"));

    let settings = match matches.get_one::<PathBuf>("config") {
        Some(path) => match AnonymizerSettings::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                error!("Failed to load config file: {}", e);
                process::exit(1);
            }
        },
        None => AnonymizerSettings::default(),
    };

    let metrics = Metrics::new();
    let processor = match build_processor(settings, &matches, &metrics) {
        Ok(processor) => processor,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            process::exit(1);
        }
    };

    let start_time = Instant::now();
    let batch = match run(&processor, &matches).await {
        Ok(batch) => batch,
        Err(e) => {
            error!("Processing failed: {}", e);
            process::exit(1);
        }
    };
    info!(
        "Processed {} document(s) in {:.2?}: {} succeeded, {} failed",
        batch.total_files,
        start_time.elapsed(),
        batch.successful_files,
        batch.failed_files
    );

    if let Some(report_path) = matches.get_one::<PathBuf>("report") {
        let format = matches
            .get_one::<String>("format")
            .and_then(|f| f.parse::<ReportFormat>().ok())
            .unwrap_or_default();
        let report = BatchReport::new(&batch).with_metrics(metrics.snapshot());
        match report.write(report_path, format) {
            Ok(()) => info!("Report generated: {}", report_path.display()),
            Err(e) => error!("Failed to generate report: {}", e),
        }
    }

    if !batch.all_succeeded() {
        for file in batch.per_file_results.iter().filter(|f| !f.result.success) {
            warn!("{}: {}", file.path.display(), file.result.errors.join("; "));
        }
        process::exit(1);
    }
}

fn build_processor(
    settings: AnonymizerSettings,
    matches: &ArgMatches,
    metrics: &Metrics,
) -> docanon::Result<BatchProcessor> {
    let observers: Vec<Arc<dyn ProcessingObserver>> = vec![
        Arc::new(TracingObserver),
        Arc::new(MetricsObserver::new(metrics.clone())),
    ];
    let mut processor = BatchProcessor::new(settings)?
        .with_observer(Arc::new(ObserverSet::new(observers)))
        .dry_run(matches.get_flag("dry-run"));
    if let Some(&jobs) = matches.get_one::<usize>("jobs") {
        processor = processor.with_jobs(jobs)?;
    }
    if let Some(&secs) = matches.get_one::<u64>("timeout") {
        processor = processor.with_timeout(Duration::from_secs(secs));
    }
    Ok(processor)
}

async fn run(processor: &BatchProcessor, matches: &ArgMatches) -> docanon::Result<BatchResult> {
    if let Some(dir) = matches.get_one::<PathBuf>("batch") {
        let out_dir = matches
            .get_one::<PathBuf>("out-dir")
            .cloned()
            .unwrap_or_else(|| dir.join("anonymized"));
        let inputs = BatchProcessor::collect_inputs(dir)?;
        info!("Found {} document(s) in {}", inputs.len(), dir.display());
        return processor.run(inputs, &out_dir).await;
    }

    let input = matches
        .get_one::<PathBuf>("input")
        .cloned()
        .ok_or_else(|| docanon::Error::InternalError("no input given".into()))?;
    let output = matches
        .get_one::<PathBuf>("output")
        .cloned()
        .unwrap_or_else(|| default_output(&input));
    let result = processor.process_file(&input, &output);
    let mut batch = BatchResult::default();
    batch.push(input, result);
    Ok(batch)
}

/// `doc.json` becomes `doc.anonymized.json` next to the input.
fn default_output(input: &Path) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("document");
    let extension = input.extension().and_then(|e| e.to_str()).unwrap_or("json");
    input.with_file_name(format!("{stem}.anonymized.{extension}"))
}

fn build_cli() -> Command {
    Command::new("docanon")
        .version(env!("CARGO_PKG_VERSION"))
        .author("kartik4091")
        .about("Two-pass designation and organization-code anonymizer")
        .long_about("Replaces regulated designations in document text, harvests their organization \
                    codes, and removes standalone mentions of those codes in a second pass.")

        // Input/Output
        .arg(Arg::new("input")
            .short('i')
            .long("input")
            .value_name("FILE")
            .value_parser(value_parser!(PathBuf))
            .help("Input document (JSON/YAML)"))

        .arg(Arg::new("output")
            .short('o')
            .long("output")
            .value_name("FILE")
            .value_parser(value_parser!(PathBuf))
            .requires("input")
            .help("Output document path"))

        .arg(Arg::new("batch")
            .long("batch")
            .value_name("DIR")
            .value_parser(value_parser!(PathBuf))
            .help("Directory of documents to anonymize"))

        .arg(Arg::new("out-dir")
            .long("out-dir")
            .value_name("DIR")
            .value_parser(value_parser!(PathBuf))
            .requires("batch")
            .help("Output directory for batch mode"))

        // Configuration
        .arg(Arg::new("config")
            .short('c')
            .long("config")
            .value_name("FILE")
            .value_parser(value_parser!(PathBuf))
            .help("Configuration file (JSON/YAML)"))

        .arg(Arg::new("jobs")
            .short('j')
            .long("jobs")
            .value_name("N")
            .value_parser(value_parser!(usize))
            .help("Documents processed concurrently (default: CPU count)"))

        .arg(Arg::new("timeout")
            .short('t')
            .long("timeout")
            .value_name("SECS")
            .value_parser(value_parser!(u64))
            .help("Per-document timeout in seconds"))

        // Reporting
        .arg(Arg::new("report")
            .short('r')
            .long("report")
            .value_name("FILE")
            .value_parser(value_parser!(PathBuf))
            .help("Write a processing report"))

        .arg(Arg::new("format")
            .short('f')
            .long("format")
            .value_parser(["text", "json"])
            .default_value("text")
            .help("Report format"))

        .arg(Arg::new("dry-run")
            .long("dry-run")
            .action(ArgAction::SetTrue)
            .help("Process documents without writing output"))

        // Logging
        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .value_parser(["error", "warn", "info", "debug", "trace"])
            .default_value("info")
            .help("Set logging verbosity"))

        .group(ArgGroup::new("source")
            .args(["input", "batch"])
            .required(true))
}
