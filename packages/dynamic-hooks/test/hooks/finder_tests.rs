/**
 * Hook Finder Tests
 *
 * Pairing of opening and closing tag matches.
 */

#[cfg(test)]
mod tests {
    use dynamic_hooks::hooks::{find_enclosing_hooks, find_standalone_hooks};
    use dynamic_hooks::HookPosition;
    use regex::Regex;

    fn box_tags() -> (Regex, Regex) {
        (
            Regex::new(r"\[box(?:\s[^\]]*)?\]").unwrap(),
            Regex::new(r"\[/box\]").unwrap(),
        )
    }

    #[test]
    fn should_skip_empty_matches() {
        let regex = Regex::new(r"x*").unwrap();
        assert!(find_standalone_hooks("abc", &regex).is_empty());
        assert_eq!(
            find_standalone_hooks("axxb", &regex),
            vec![HookPosition::standalone(1, 3)]
        );
    }

    #[test]
    fn should_pair_sibling_hooks() {
        let (opening, closing) = box_tags();
        let outcome = find_enclosing_hooks("[box a]x[/box] [box b]y[/box]", &opening, &closing, true);
        assert_eq!(
            outcome.positions,
            vec![
                HookPosition::enclosing((0, 7), (8, 14)),
                HookPosition::enclosing((15, 22), (23, 29)),
            ]
        );
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn should_order_deeply_nested_hooks_by_opening_tag() {
        let (opening, closing) = box_tags();
        let text = "[box][box][box][/box][/box][/box]";
        let outcome = find_enclosing_hooks(text, &opening, &closing, true);
        let starts: Vec<usize> = outcome.positions.iter().map(|p| p.opening_tag_start_index).collect();
        assert_eq!(starts, vec![0, 5, 10]);
        assert_eq!(outcome.positions[0].closing_tag_end_index, Some(33));
        assert_eq!(outcome.positions[2].closing_tag_start_index, Some(15));
    }

    #[test]
    fn should_consume_closing_tags_of_ignored_nested_hooks() {
        let (opening, closing) = box_tags();
        let text = "[box][box][/box][/box][/box]";
        let outcome = find_enclosing_hooks(text, &opening, &closing, false);
        assert_eq!(outcome.positions, vec![HookPosition::enclosing((0, 5), (16, 22))]);
        assert!(outcome.diagnostics.has_warning_containing("nesting is not allowed"));
        assert!(outcome.diagnostics.has_warning_containing("no matching opening tag"));
    }

    #[test]
    fn should_ignore_tags_overlapping_the_previous_one() {
        let opening = Regex::new(r"<<a").unwrap();
        let closing = Regex::new(r"a>>").unwrap();
        let outcome = find_enclosing_hooks("<<a>>", &opening, &closing, true);
        assert!(outcome.positions.is_empty());
        assert!(outcome.diagnostics.has_warning_containing("overlaps the previous tag"));
        assert!(outcome.diagnostics.has_warning_containing("no closing tag"));
    }
}
