/**
 * Hook Validator Tests
 *
 * Reconciling the positions of several parsers.
 */

#[cfg(test)]
mod tests {
    use dynamic_hooks::hooks::{validate_positions, PositionCandidate};
    use dynamic_hooks::HookPosition;

    fn messages(outcome: &dynamic_hooks::hooks::ValidationOutcome) -> Vec<String> {
        outcome.diagnostics.iter().map(|d| d.message.clone()).collect()
    }

    #[test]
    fn should_sort_candidates_from_several_parsers() {
        let outcome = validate_positions(vec![
            PositionCandidate::new(1, "b", HookPosition::standalone(20, 25)),
            PositionCandidate::new(0, "a", HookPosition::enclosing((0, 5), (10, 16))),
            PositionCandidate::new(1, "b", HookPosition::standalone(6, 9)),
        ]);
        let starts: Vec<usize> = outcome
            .accepted
            .iter()
            .map(|c| c.position.opening_tag_start_index)
            .collect();
        assert_eq!(starts, vec![0, 6, 20]);
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn should_reject_opening_tags_inside_closing_tags() {
        let outcome = validate_positions(vec![
            PositionCandidate::new(0, "a", HookPosition::enclosing((0, 5), (10, 16))),
            PositionCandidate::new(1, "b", HookPosition::standalone(12, 14)),
        ]);
        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(
            messages(&outcome),
            vec![
                "Opening tag overlaps a closing tag. Hook [12..14] found by parser \"b\" conflicts with hook [0..5]..[10..16] found by parser \"a\". Ignoring"
                    .to_string()
            ]
        );
    }

    #[test]
    fn should_reject_incorrect_nesting() {
        let outcome = validate_positions(vec![
            PositionCandidate::new(0, "a", HookPosition::enclosing((0, 5), (20, 26))),
            PositionCandidate::new(1, "b", HookPosition::enclosing((6, 10), (27, 30))),
        ]);
        assert_eq!(outcome.accepted.len(), 1);
        assert!(outcome.diagnostics.has_warning_containing("Incorrect nesting."));
    }

    #[test]
    fn should_reject_overlapping_closing_tags() {
        let outcome = validate_positions(vec![
            PositionCandidate::new(0, "a", HookPosition::enclosing((0, 5), (20, 26))),
            PositionCandidate::new(1, "b", HookPosition::enclosing((6, 10), (22, 28))),
        ]);
        assert_eq!(outcome.accepted.len(), 1);
        assert!(outcome.diagnostics.has_warning_containing("Overlapping closing tags."));
    }

    #[test]
    fn should_keep_the_first_of_duplicate_hooks() {
        let outcome = validate_positions(vec![
            PositionCandidate::new(0, "first", HookPosition::standalone(0, 6)),
            PositionCandidate::new(1, "second", HookPosition::standalone(0, 6)),
        ]);
        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.accepted[0].parser_name, "first");
        assert!(outcome.diagnostics.has_warning_containing("Duplicate hook."));
    }

    #[test]
    fn should_report_malformed_positions() {
        let outcome = validate_positions(vec![PositionCandidate::new(
            0,
            "bad",
            HookPosition::standalone(3, 2),
        )]);
        assert!(outcome.accepted.is_empty());
        assert_eq!(
            messages(&outcome),
            vec!["Parser \"bad\" returned a malformed hook position [3..2]. Ignoring".to_string()]
        );
    }
}
