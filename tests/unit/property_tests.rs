use proptest::prelude::*;
use proptest::sample::Index;

use docanon::editor::TextRangeEditor;
use docanon::replacement::{
    ConstantStrategy, DecimalDesignationStrip, MaskStrategy, OrganizationCodeRemoval, RemoveStrategy,
};
use docanon::search::FixedCodeSearchStrategy;
use docanon::{ReplacementStrategy, SearchStrategy, TextMatch};

fn splice(text: &str, start: usize, length: usize, replacement: &str) -> String {
    let head: String = text.chars().take(start).collect();
    let tail: String = text.chars().skip(start + length).collect();
    format!("{head}{replacement}{tail}")
}

fn designation_value() -> impl Strategy<Value = (String, String)> {
    ("[A-Z]{2,6}", "[0-9]{2,6}", "[0-9]{2,4}")
        .prop_map(|(code, group, number)| (code.clone(), format!("{code}.{group}.{number}")))
}

proptest! {
    #[test]
    fn mask_preserves_char_length(value in "\\PC{1,24}") {
        let m = TextMatch::new(value, 0, "Any");
        let out = MaskStrategy::default().replace(&m).unwrap();
        prop_assert_eq!(out.text.chars().count(), m.length());
    }

    #[test]
    fn same_match_gives_same_replacement(
        value in prop_oneof![
            designation_value().prop_map(|(_, value)| value),
            "[A-Za-zА-я0-9.@ ]{1,24}",
        ],
        start in 0usize..64,
    ) {
        let strategies: Vec<Box<dyn ReplacementStrategy>> = vec![
            Box::new(RemoveStrategy),
            Box::new(MaskStrategy::default()),
            Box::new(ConstantStrategy::new("[x]")),
            Box::new(DecimalDesignationStrip),
            Box::new(OrganizationCodeRemoval::default()),
        ];
        let m = TextMatch::new(value, start, "Designation");
        for strategy in &strategies {
            let first = strategy.replace(&m).unwrap();
            let second = strategy.replace(&m).unwrap();
            prop_assert_eq!(first, second, "{}", strategy.name());
        }
    }

    #[test]
    fn code_removal_masks_exactly_the_code((code, value) in designation_value()) {
        let out = OrganizationCodeRemoval::default()
            .replace(&TextMatch::new(value.clone(), 0, "Designation"))
            .unwrap();
        prop_assert_eq!(out.extracted_codes, vec![code.clone()]);
        prop_assert_eq!(out.text.chars().count(), value.chars().count());
        prop_assert!(!out.text.contains(code.as_str()));
    }

    #[test]
    fn editor_matches_flat_splice(
        fragments in prop::collection::vec("[a-zа-я ]{1,6}", 1..6),
        start in any::<Index>(),
        length in any::<Index>(),
        replacement in "[A-Z*]{0,5}",
    ) {
        let flat: String = fragments.concat();
        let total = flat.chars().count();
        let start = start.index(total);
        let length = 1 + length.index(total - start);

        let mut editor = TextRangeEditor::new(&fragments);
        editor.replace_range(start, length, &replacement).unwrap();
        prop_assert_eq!(editor.text(), splice(&flat, start, length, &replacement));
        let offsets_consistent = editor
            .elements()
            .iter()
            .filter(|e| !e.removed)
            .all(|e| e.length == e.content.chars().count());
        prop_assert!(offsets_consistent);
    }

    #[test]
    fn fixed_code_hits_are_standalone(text in "[A-Za-z0-9 .,()]{0,40}") {
        let strategy = FixedCodeSearchStrategy::new(["AB"], true).unwrap();
        let chars: Vec<char> = text.chars().collect();
        for m in strategy.find_all_matches(&text) {
            prop_assert_eq!(m.value(), "AB");
            if m.start_index() > 0 {
                prop_assert!(!chars[m.start_index() - 1].is_alphanumeric());
            }
            if let Some(after) = chars.get(m.end_index()) {
                prop_assert!(!after.is_alphanumeric());
            }
        }
    }
}
