use docanon::config::{ConditionSpec, ReplacementSpec};
use docanon::replacement::TextTransform;
use docanon::types::Replacement;
use docanon::{CodeAccumulator, TextMatch, Validate};

fn designation(value: &str) -> TextMatch {
    TextMatch::new(value, 0, "Designation")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_first_pass_routes_by_match_type() {
        let strategy = docanon::AnonymizerSettings::default()
            .first_pass
            .replacement
            .build()
            .unwrap();
        assert!(strategy.extracts_codes());

        let out = strategy.replace(&designation("ACME.123456.001")).unwrap();
        assert_eq!(out.text, "****.123456.001");
        assert_eq!(out.extracted_codes, vec!["ACME".to_string()]);

        let out = strategy.replace(&TextMatch::new("a@b.io", 4, "Email")).unwrap();
        assert_eq!(out.text, "******");
        assert!(out.extracted_codes.is_empty());
    }

    #[test]
    fn test_malformed_designation_kept() {
        let strategy = ReplacementSpec::OrganizationCodeRemoval.build().unwrap();
        for value in ["ACME", ".123", "ACME."] {
            let out = strategy.replace(&designation(value)).unwrap();
            assert_eq!(out.text, value);
            assert!(out.extracted_codes.is_empty());
        }
    }

    #[test]
    fn test_chain_strip_then_redact() {
        let spec = ReplacementSpec::Chain {
            steps: vec![
                ReplacementSpec::DecimalDesignationStrip,
                ReplacementSpec::Transform { transform: TextTransform::Redact },
            ],
        };
        assert!(!spec.extracts_codes());
        let out = spec.build().unwrap().replace(&designation("ACME.123.456")).unwrap();
        assert_eq!(out.text, "XXX.XXX");
    }

    #[test]
    fn test_value_condition() {
        let spec = ReplacementSpec::Composite {
            condition: ConditionSpec::ValueMatches { expression: "^[0-9]".into() },
            then: Box::new(ReplacementSpec::Remove),
            otherwise: Box::new(ReplacementSpec::Constant { value: "[x]".into() }),
        };
        let strategy = spec.build().unwrap();
        assert_eq!(strategy.replace(&TextMatch::new("42", 0, "Number")).unwrap().text, "");
        assert_eq!(strategy.replace(&TextMatch::new("A42", 0, "Number")).unwrap().text, "[x]");

        let bad = ReplacementSpec::Composite {
            condition: ConditionSpec::ValueMatches { expression: "(".into() },
            then: Box::new(ReplacementSpec::Remove),
            otherwise: Box::new(ReplacementSpec::Remove),
        };
        assert!(bad.build().is_err());
    }

    #[test]
    fn test_invalid_descriptors_rejected() {
        assert!(ReplacementSpec::Chain { steps: Vec::new() }.validate().is_err());
        let empty_needle = ReplacementSpec::Composite {
            condition: ConditionSpec::MatchTypeContains { needle: String::new() },
            then: Box::new(ReplacementSpec::OrganizationCodeRemoval),
            otherwise: Box::new(ReplacementSpec::Mask),
        };
        assert!(empty_needle.validate().is_err());
        assert!(ReplacementSpec::Mask.validate().is_ok());
    }

    #[test]
    fn test_accumulator_deduplicates() {
        let mut codes = CodeAccumulator::new();
        codes.record_all(&Replacement::with_code("****.1.2", "ACME"));
        codes.record_all(&Replacement::with_code("****.3.4", "ACME"));
        assert!(codes.record("BOLT"));
        assert!(!codes.record("BOLT"));
        assert_eq!(codes.extracted_codes().iter().collect::<Vec<_>>(), vec!["ACME", "BOLT"]);
        codes.clear();
        assert!(codes.is_empty());
    }
}
