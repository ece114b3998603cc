/**
 * Expression Encoder Tests
 *
 * Placeholder encoding of string literals, call groups and index brackets.
 */

#[cfg(test)]
mod tests {
    use dynamic_hooks::expression::encoder::{PLACEHOLDER_END, PLACEHOLDER_START};
    use dynamic_hooks::expression::{encode, escape_double_quotes, TokenKind, TokenTable};
    use dynamic_hooks::ExpressionError;

    fn assert_round_trip(expression: &str) {
        let encoded = encode(expression).unwrap();
        assert_eq!(encoded.decode(), expression, "round trip of {}", expression);
    }

    #[test]
    fn should_round_trip_nested_expressions() {
        assert_round_trip("context.heroes['luke'].saber");
        assert_round_trip(r#"{name: "Ben \"Obi-Wan\" Kenobi", ranks: ['padawan', "knight"]}"#);
        assert_round_trip("context.fn(context.other(1, 'a)b'), [2, 3])[context.key['x']].y");
        assert_round_trip("[[1, 2], [3, [4, context.list[0][1]]]]");
        assert_round_trip("`template ${literal}` ");
        assert_round_trip("");
    }

    #[test]
    fn should_hide_structural_characters_inside_strings() {
        let encoded = encode("{a: 'x, y: z', b: \"[}\"}").unwrap();
        assert_eq!(encoded.encoded.matches(',').count(), 1);
        assert!(!encoded.encoded.contains('['));
        assert_eq!(encoded.table.fragment(TokenKind::String, 0), Some("'x, y: z'"));
        assert_eq!(encoded.table.fragment(TokenKind::String, 1), Some("\"[}\""));
    }

    #[test]
    fn should_encode_outermost_call_groups_only() {
        let mut table = TokenTable::new();
        let encoded = table.encode_subfunctions("context.a(b(c), d).e(f)").unwrap();
        assert_eq!(table.fragment(TokenKind::Call, 0), Some("(b(c), d)"));
        assert_eq!(table.fragment(TokenKind::Call, 1), Some("(f)"));
        assert!(encoded.starts_with("context.a"));
        assert!(!encoded.contains('('));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn should_keep_array_literals_but_encode_indexing() {
        let mut table = TokenTable::new();
        let encoded = table
            .encode_variable_subbrackets("[1, context.list[0], context.map['k'][2]]")
            .unwrap();
        assert!(encoded.starts_with('['));
        assert!(encoded.ends_with(']'));
        assert_eq!(table.fragment(TokenKind::Bracket, 0), Some("[0]"));
        assert_eq!(table.fragment(TokenKind::Bracket, 1), Some("['k']"));
        assert_eq!(table.fragment(TokenKind::Bracket, 2), Some("[2]"));
        assert_eq!(table.decode(&encoded), "[1, context.list[0], context.map['k'][2]]");
    }

    #[test]
    fn should_report_unterminated_strings() {
        let err = encode("{a: 'open}").unwrap_err();
        assert_eq!(
            err,
            ExpressionError::UnterminatedString {
                expression: "{a: 'open}".to_string(),
                index: 4
            }
        );
    }

    #[test]
    fn should_report_unbalanced_groups() {
        assert!(matches!(
            encode("context.fn(1"),
            Err(ExpressionError::Unbalanced { delimiter: '(', .. })
        ));
        assert!(matches!(
            encode("context.fn)1("),
            Err(ExpressionError::Unbalanced { delimiter: ')', .. })
        ));
        assert!(matches!(
            encode("context.list[0"),
            Err(ExpressionError::Unbalanced { delimiter: '[', .. })
        ));
    }

    #[test]
    fn should_reject_reserved_characters() {
        let input = format!("context.a{}s0{}", PLACEHOLDER_START, PLACEHOLDER_END);
        assert!(matches!(encode(&input), Err(ExpressionError::ReservedCharacters { .. })));
    }

    #[test]
    fn should_escape_unescaped_double_quotes() {
        assert_eq!(escape_double_quotes(r#"say "hi""#), r#"say \"hi\""#);
        assert_eq!(escape_double_quotes(r#"already \"done\""#), r#"already \"done\""#);
        assert_eq!(escape_double_quotes(r#"slash \\"x"#), r#"slash \\\"x"#);
    }
}
