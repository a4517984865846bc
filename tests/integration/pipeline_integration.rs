use std::sync::Arc;

use docanon::config::{PassSettings, ReplacementSpec};
use docanon::document::AreaKind;
use docanon::{
    AnonymizerSettings, DocumentAccess, InMemoryDocument, Metrics, MetricsObserver, ProcessingOptions,
    TwoPassOrchestrator, Validate,
};

use crate::fixtures::TestFixtures;

fn orchestrator(settings: &AnonymizerSettings) -> TwoPassOrchestrator {
    TwoPassOrchestrator::new(settings.build_two_pass().unwrap()).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_on_plain_text() {
        let (text, result) = orchestrator(&AnonymizerSettings::default()).process_text(TestFixtures::DRAWING_TEXT);
        assert_eq!(text, TestFixtures::DRAWING_EXPECTED);
        assert!(result.success);
        assert_eq!(result.matches_found, 3);
        assert_eq!(result.matches_processed, 3);
        assert_eq!(result.codes_removed(), Some(1));
    }

    #[test]
    fn test_every_area_is_swept() {
        let mut document = TestFixtures::drawing_document();
        let result = orchestrator(&AnonymizerSettings::default()).process(&mut document);

        assert!(result.success, "{:?}", result.errors);
        assert_eq!(
            document.area_text(AreaKind::Body),
            "Drawing ****.123456.001 final\nSupplier: , contact ******************"
        );
        assert_eq!(document.body[0].runs.len(), 2);
        assert_eq!(document.area_text(AreaKind::Headers), " confidential");
        assert_eq!(document.area_text(AreaKind::Footers), "Sheet 1 of 2");
        assert_eq!(document.area_text(AreaKind::TextBoxes), "Stamp ****.123456.002");
        assert_eq!(document.property("Title"), Some("****.123456.001"));
        assert_eq!(document.property("Company"), Some(""));
        assert_eq!(document.property("Category"), Some("drawings"));
        assert_eq!(result.matches_found, 7);
        assert_eq!(result.matches_processed, 7);
        assert_eq!(result.codes_removed(), Some(1));
    }

    #[test]
    fn test_several_codes_and_boundaries() {
        let mut document = TestFixtures::two_company_document();
        let result = orchestrator(&TestFixtures::designation_settings()).process(&mut document);

        assert_eq!(
            document.area_text(AreaKind::Body),
            "Parts ****.100200.001 and ****.300400.002\nMade by  with  tooling, not ACMEX"
        );
        assert_eq!(result.codes_removed(), Some(2));
        assert_eq!(result.matches_found, 4);
    }

    #[test]
    fn test_no_codes_means_no_second_pass() {
        let mut document = TestFixtures::clean_document();
        let before = document.clone();
        let result = orchestrator(&AnonymizerSettings::default()).process(&mut document);

        assert!(result.success);
        assert_eq!(result.matches_found, 0);
        assert_eq!(result.codes_removed(), Some(0));
        assert_eq!(document, before);
    }

    #[test]
    fn test_yaml_settings_drive_both_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        std::fs::write(&path, TestFixtures::settings_yaml()).unwrap();
        let settings = AnonymizerSettings::load(&path).unwrap();
        assert!(!settings.options.process_headers);
        assert!(!settings.options.case_sensitive);

        let mut document = InMemoryDocument::from_text("ACME.123456.001, PRJ-42 by acme");
        document.headers.push(docanon::document::Paragraph::from_text("ACME header"));
        let result = orchestrator(&settings).process(&mut document);

        assert!(result.success);
        assert_eq!(document.area_text(AreaKind::Body), "****.123456.001, [project] by [org]");
        assert_eq!(document.area_text(AreaKind::Headers), "ACME header");
    }

    #[test]
    fn test_disabled_areas_untouched() {
        let mut settings = AnonymizerSettings::default();
        settings.options = ProcessingOptions {
            process_properties: false,
            process_text_boxes: false,
            ..ProcessingOptions::default()
        };
        let mut document = TestFixtures::drawing_document();
        orchestrator(&settings).process(&mut document);

        assert_eq!(document.area_text(AreaKind::TextBoxes), "Stamp ACME.123456.002");
        assert_eq!(document.property("Company"), Some("ACME"));
        assert_eq!(document.area_text(AreaKind::Headers), " confidential");
    }

    #[test]
    fn test_unreadable_document_is_fatal() {
        let mut document = TestFixtures::drawing_document();
        document.mark_unreadable();
        let result = orchestrator(&AnonymizerSettings::default()).process(&mut document);

        assert!(!result.success);
        assert_eq!(result.matches_processed, 0);
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn test_locked_area_reported_and_rest_processed() {
        let mut document = TestFixtures::drawing_document();
        document.locked_areas.push(AreaKind::Headers);
        let result = orchestrator(&AnonymizerSettings::default()).process(&mut document);

        assert!(!result.success);
        assert!(result.errors.iter().any(|e| e.contains("Headers")));
        assert_eq!(document.area_text(AreaKind::Headers), "ACME confidential");
        assert_eq!(document.property("Company"), Some(""));
    }

    #[test]
    fn test_first_pass_must_extract_codes() {
        let mut settings = AnonymizerSettings::default();
        settings.first_pass = PassSettings {
            search: settings.first_pass.search.clone(),
            replacement: ReplacementSpec::Mask,
        };
        assert!(settings.validate().is_err());
        assert!(settings.build_two_pass().is_err());
        assert!(docanon::BatchProcessor::new(settings).is_err());
    }

    #[test]
    fn test_observer_counts_without_values() {
        let metrics = Metrics::new();
        let config = AnonymizerSettings::default()
            .build_two_pass()
            .unwrap()
            .with_observer(Arc::new(MetricsObserver::new(metrics.clone())));
        let mut document = TestFixtures::drawing_document();
        TwoPassOrchestrator::new(config).unwrap().process(&mut document as &mut dyn DocumentAccess);

        assert_eq!(metrics.get_counter("matches.replaced"), 7);
        assert_eq!(metrics.get_counter("codes.harvested"), 1);
        assert_eq!(metrics.get_counter("matches.OrganizationCode"), 3);
    }
}
