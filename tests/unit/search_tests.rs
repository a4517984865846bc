use std::sync::Arc;

use docanon::patterns::{database, Pattern, PatternCompiler};
use docanon::search::{CompositeSearchStrategy, FixedCodeSearchStrategy, PatternSearchStrategy};
use docanon::SearchStrategy;

fn designations() -> PatternSearchStrategy {
    PatternSearchStrategy::new(
        "Designations",
        vec![database::builtin(database::DESIGNATION).unwrap()],
        &PatternCompiler::default(),
    )
    .unwrap()
}

fn values(matches: impl Iterator<Item = docanon::TextMatch>) -> Vec<String> {
    matches.map(|m| m.value().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_designation_reported_once() {
        let text = "ACME.123.456, ACME.123.456 and BOLT.123.456";
        let strategy = designations();
        assert_eq!(values(strategy.find_matches(text)), vec!["ACME.123.456", "BOLT.123.456"]);
        assert_eq!(strategy.find_all_matches(text).count(), 3);
    }

    #[test]
    fn test_offsets_count_chars_not_bytes() {
        let found: Vec<_> = designations().find_matches("Чертёж АБВГ.301311.001").collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].start_index(), 7);
        assert_eq!(found[0].length(), 15);
        assert_eq!(found[0].match_type(), "Designation");
    }

    #[test]
    fn test_fixed_code_standalone_only() {
        let strategy = FixedCodeSearchStrategy::new(["ABC"], true).unwrap();
        assert_eq!(values(strategy.find_matches("ABC.123")), vec!["ABC"]);
        assert_eq!(values(strategy.find_matches("(ABC)")), vec!["ABC"]);
        assert!(strategy.find_matches("XABC.123").next().is_none());
        assert!(strategy.find_matches("ABC123").next().is_none());
        assert!(strategy.find_matches("ABCD").next().is_none());
    }

    #[test]
    fn test_fixed_code_positions_and_dedup() {
        let strategy = FixedCodeSearchStrategy::new(["ACME"], true).unwrap();
        let text = "ACME and ACME";
        assert_eq!(strategy.find_matches(text).count(), 1);
        let starts: Vec<_> = strategy.find_all_matches(text).map(|m| m.start_index()).collect();
        assert_eq!(starts, vec![0, 9]);
    }

    #[test]
    fn test_fixed_code_case_insensitive() {
        let strategy = FixedCodeSearchStrategy::new(["ACME"], false).unwrap();
        assert_eq!(values(strategy.find_all_matches("acme and Acme")), vec!["acme", "Acme"]);
    }

    #[test]
    fn test_blank_codes_ignored() {
        let mut strategy = FixedCodeSearchStrategy::new(["", "  "], true).unwrap();
        assert!(strategy.is_empty());
        strategy.add_codes(["ACME", "ACME"]).unwrap();
        assert_eq!(strategy.codes().len(), 1);
    }

    #[test]
    fn test_invalid_patterns_fail_at_construction() {
        let compiler = PatternCompiler::default();
        let unclosed = PatternSearchStrategy::new("Bad", vec![Pattern::new("Bad", "(unclosed", true)], &compiler);
        assert!(unclosed.is_err());
        let empty = PatternSearchStrategy::new("Empty", vec![Pattern::new("Empty", "", true)], &compiler);
        assert!(empty.is_err());
        assert!(database::builtin("NoSuchPattern").is_err());
    }

    #[test]
    fn test_restartable_iteration() {
        let strategy = designations();
        let text = "ACME.123.456";
        assert_eq!(values(strategy.find_matches(text)), values(strategy.find_matches(text)));
    }

    #[test]
    fn test_composite_queries_each_strategy() {
        let composite = CompositeSearchStrategy::new(vec![
            Arc::new(designations()),
            Arc::new(FixedCodeSearchStrategy::new(["BOLT"], true).unwrap()),
        ]);
        let types: Vec<_> = composite
            .find_all_matches("BOLT supplies ACME.123.456")
            .map(|m| m.match_type().to_string())
            .collect();
        assert_eq!(types, vec!["Designation", "OrganizationCode"]);
    }
}
