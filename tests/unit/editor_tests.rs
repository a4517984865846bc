use docanon::editor::{EditFailure, FragmentInstruction, PendingEdit, TextRangeEditor};

fn edit(start: usize, length: usize, replacement: &str) -> PendingEdit {
    PendingEdit {
        start,
        length,
        replacement: replacement.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_across_three_fragments() {
        let mut editor = TextRangeEditor::new(&["Hello ", "Wor", "ld!"]);
        let summary = editor.replace_range(4, 6, "X").unwrap();
        assert_eq!(summary.affected_fragments, 3);
        assert_eq!(summary.removed_fragments, 1);
        assert_eq!(editor.text(), "HellXd!");
        assert_eq!(
            editor.instructions(),
            vec![
                FragmentInstruction::Update { fragment: 0, content: "HellX".into() },
                FragmentInstruction::Remove { fragment: 1 },
                FragmentInstruction::Update { fragment: 2, content: "d!".into() },
            ]
        );
    }

    #[test]
    fn test_emptied_fragment_is_removed() {
        let mut editor = TextRangeEditor::new(&["A", "BC", "D"]);
        editor.replace_range(1, 2, "").unwrap();
        assert_eq!(editor.text(), "AD");
        assert_eq!(editor.fragment_count(), 2);
        assert_eq!(editor.instructions(), vec![FragmentInstruction::Remove { fragment: 1 }]);
    }

    #[test]
    fn test_failures_leave_editor_unchanged() {
        let mut editor = TextRangeEditor::new(&["abc", "def"]);
        assert!(matches!(
            editor.replace_range(50, 2, "x"),
            Err(EditFailure::NoAffectedFragments { .. })
        ));
        assert!(matches!(
            editor.replace_range(1, 0, "x"),
            Err(EditFailure::NoAffectedFragments { .. })
        ));
        assert!(matches!(
            editor.replace_range(5, 3, "x"),
            Err(EditFailure::OutOfRange { .. })
        ));
        assert_eq!(editor.text(), "abcdef");
        assert!(!editor.is_modified());

        let empty: [&str; 0] = [];
        let mut editor = TextRangeEditor::new(&empty);
        assert_eq!(editor.replace_range(0, 1, "x"), Err(EditFailure::NoFragments));
    }

    #[test]
    fn test_back_to_front_keeps_offsets_valid() {
        let mut editor = TextRangeEditor::new(&["ab cd ", "ef"]);
        let outcomes = editor.apply_back_to_front(vec![edit(0, 2, "X"), edit(6, 2, "YYY")]);
        assert!(outcomes.iter().all(|(_, outcome)| outcome.is_ok()));
        assert_eq!(outcomes[0].0.start, 6);
        assert_eq!(editor.text(), "X cd YYY");
    }

    #[test]
    fn test_multibyte_fragments() {
        let mut editor = TextRangeEditor::new(&["Чертёж АБ", "ВГ.301"]);
        editor.replace_range(7, 4, "****").unwrap();
        assert_eq!(editor.text(), "Чертёж ****.301");
        assert_eq!(editor.elements()[1].content, ".301");
    }
}
