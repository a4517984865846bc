use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use docanon::document::{AreaKind, Paragraph};
use docanon::{AnonymizerSettings, BatchProcessor, InMemoryDocument, ProcessingEvent, ProcessingObserver};

use crate::fixtures::TestFixtures;
use crate::write_document;

/// Two good documents and one that does not parse.
fn populate(dir: &Path) {
    write_document(dir, "a.json", &InMemoryDocument::from_text(TestFixtures::DRAWING_TEXT));
    write_document(dir, "b.yaml", &TestFixtures::drawing_document());
    std::fs::write(dir.join("c.json"), "not a document {").unwrap();
    std::fs::write(dir.join("notes.txt"), "ignored").unwrap();
}

/// Enough paragraphs that processing outlasts a millisecond limit.
fn large_document() -> InMemoryDocument {
    let mut document = InMemoryDocument::new();
    document.body = (0..5_000)
        .map(|i| Paragraph::from_text(format!("ACME.{i:03}.456 issued by ACME, see ACME.{i:03}.457")))
        .collect();
    document
}

/// Tracks how many documents are between their first and last pass.
#[derive(Debug, Default)]
struct InFlight {
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl ProcessingObserver for InFlight {
    fn on_event(&self, event: &ProcessingEvent<'_>) {
        match *event {
            ProcessingEvent::PassStarted { pass: "first" } => {
                let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
                self.peak.fetch_max(now, Ordering::SeqCst);
            }
            ProcessingEvent::PassCompleted { pass: "second", .. } => {
                self.active.fetch_sub(1, Ordering::SeqCst);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_batch_run_writes_outputs_and_isolates_failures() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        populate(input.path());

        let inputs = BatchProcessor::collect_inputs(input.path()).unwrap();
        assert_eq!(inputs.len(), 3);

        let processor = BatchProcessor::new(AnonymizerSettings::default())
            .unwrap()
            .with_jobs(2)
            .unwrap()
            .with_timeout(Duration::from_secs(30));
        let batch = processor.run(inputs, output.path()).await.unwrap();

        assert_eq!(batch.total_files, 3);
        assert_eq!(batch.successful_files, 2);
        assert_eq!(batch.failed_files, 1);
        assert!(!batch.all_succeeded());

        let a = InMemoryDocument::load(&output.path().join("a.json")).unwrap();
        assert_eq!(a.area_text(AreaKind::Body), TestFixtures::DRAWING_EXPECTED);
        let b = InMemoryDocument::load(&output.path().join("b.yaml")).unwrap();
        assert_eq!(b.property("Company"), Some(""));
        assert!(!output.path().join("c.json").exists());
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let input = tempfile::tempdir().unwrap();
        populate(input.path());
        let out_dir = input.path().join("out");

        let processor = BatchProcessor::new(AnonymizerSettings::default()).unwrap().dry_run(true);
        let inputs = BatchProcessor::collect_inputs(input.path()).unwrap();
        let batch = processor.run(inputs, &out_dir).await.unwrap();

        assert_eq!(batch.successful_files, 2);
        assert!(!out_dir.exists());
    }

    #[tokio::test]
    async fn test_cancelled_batch_processes_nothing() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        populate(input.path());

        let processor = BatchProcessor::new(AnonymizerSettings::default()).unwrap();
        processor.cancellation_flag().cancel();
        let inputs = BatchProcessor::collect_inputs(input.path()).unwrap();
        let batch = processor.run(inputs, output.path()).await.unwrap();

        assert_eq!(batch.failed_files, 3);
        assert!(batch
            .per_file_results
            .iter()
            .all(|f| f.result.errors == vec!["Processing cancelled".to_string()]));
        assert!(!output.path().join("a.json").exists());
    }

    #[test]
    fn test_rayon_driver_matches_async_driver() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        populate(input.path());

        let processor = BatchProcessor::new(TestFixtures::designation_settings())
            .unwrap()
            .with_jobs(3)
            .unwrap();
        let inputs = BatchProcessor::collect_inputs(input.path()).unwrap();
        let parallel = processor.run_parallel(inputs.clone(), output.path()).unwrap();

        let single = processor.with_jobs(1).unwrap();
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let sequential = runtime.block_on(single.run(inputs, output.path())).unwrap();

        let summary = |batch: &docanon::BatchResult| {
            batch
                .per_file_results
                .iter()
                .map(|f| (f.path.clone(), f.result.success, f.result.matches_processed))
                .collect::<Vec<_>>()
        };
        assert_eq!(summary(&parallel), summary(&sequential));
    }

    #[test]
    fn test_single_file_processing() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_document(dir.path(), "doc.json", &TestFixtures::two_company_document());
        let output = dir.path().join("doc.anonymized.json");

        let processor = BatchProcessor::new(TestFixtures::designation_settings()).unwrap();
        let result = processor.process_file(&input, &output);

        assert!(result.success);
        assert_eq!(result.codes_removed(), Some(2));
        let written = InMemoryDocument::load(&output).unwrap();
        assert!(written.area_text(AreaKind::Body).ends_with("not ACMEX"));
        assert!(!processor.process_file(&dir.path().join("missing.json"), &output).success);
    }

    #[tokio::test]
    async fn test_timed_out_document_fails_without_output() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_document(input.path(), "large.json", &large_document());

        let processor = BatchProcessor::new(AnonymizerSettings::default())
            .unwrap()
            .with_timeout(Duration::from_millis(1));
        let inputs = BatchProcessor::collect_inputs(input.path()).unwrap();
        let batch = processor.run(inputs, output.path()).await.unwrap();

        assert_eq!(batch.failed_files, 1);
        let errors = &batch.per_file_results[0].result.errors;
        assert!(errors[0].starts_with("Timeout error"), "{errors:?}");
        assert!(!output.path().join("large.json").exists());
    }

    #[tokio::test]
    async fn test_timed_out_documents_keep_their_job_slot() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_document(input.path(), "one.json", &large_document());
        write_document(input.path(), "two.json", &large_document());

        let in_flight = Arc::new(InFlight::default());
        let processor = BatchProcessor::new(AnonymizerSettings::default())
            .unwrap()
            .with_jobs(1)
            .unwrap()
            .with_timeout(Duration::from_millis(1))
            .with_observer(in_flight.clone());
        let inputs = BatchProcessor::collect_inputs(input.path()).unwrap();
        let batch = processor.run(inputs, output.path()).await.unwrap();

        assert_eq!(batch.failed_files, 2);
        assert_eq!(in_flight.peak.load(Ordering::SeqCst), 1);
        assert!(!output.path().join("one.json").exists());
        assert!(!output.path().join("two.json").exists());
    }
}
