/**
 * Parser Config Tests
 *
 * Resolving JSON parser configs and turning configs into parsers.
 */

#[cfg(test)]
mod tests {
    use dynamic_hooks::parsers::{resolve_parser_config, resolve_parsers, BracketStyle};
    use dynamic_hooks::{
        ComponentDefinition, ComponentRegistry, ConfigError, LazyComponent, ParserCapabilities, ParserEntry,
        SelectorParserConfig,
    };
    use serde_json::json;

    fn registry() -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        registry.register(
            "HeroComponent",
            ComponentDefinition::new("HeroComponent").with_selector("app-hero"),
        );
        registry
    }

    fn error_message(config: serde_json::Value) -> String {
        resolve_parser_config(&config, &registry()).unwrap_err().to_string()
    }

    #[test]
    fn should_resolve_every_field() {
        let config = resolve_parser_config(
            &json!({
                "component": "HeroComponent",
                "name": "heroes",
                "selector": "app-hero, app-jedi",
                "hostElementTag": "hero-host",
                "bracketStyle": {"opening": "[", "closing": "]"},
                "enclosing": false,
                "allowNesting": false,
                "parseWithRegex": true,
                "allowSelfClosing": false,
                "parseInputs": false,
                "unescapeStrings": false,
                "inputsBlacklist": ["secret"],
                "inputsWhitelist": ["name", "side"],
                "outputsBlacklist": [],
                "outputsWhitelist": ["saved"],
                "allowContextInBindings": false,
                "allowContextFunctionCalls": false
            }),
            &registry(),
        )
        .unwrap();

        assert_eq!(config.component.display_name(), "HeroComponent");
        assert_eq!(config.name.as_deref(), Some("heroes"));
        assert_eq!(config.selector.as_deref(), Some("app-hero, app-jedi"));
        assert_eq!(config.host_element_tag.as_deref(), Some("hero-host"));
        assert_eq!(config.bracket_style, BracketStyle::new("[", "]"));
        assert!(!config.enclosing);
        assert!(!config.allow_nesting);
        assert!(config.parse_with_regex);
        assert!(!config.allow_self_closing);
        assert!(!config.parse_inputs);
        assert!(!config.unescape_strings);
        assert_eq!(config.inputs_blacklist, Some(vec!["secret".to_string()]));
        assert_eq!(config.inputs_whitelist.as_ref().map(Vec::len), Some(2));
        assert_eq!(config.outputs_blacklist, Some(Vec::new()));
        assert_eq!(config.outputs_whitelist, Some(vec!["saved".to_string()]));
        assert!(!config.allow_context_in_bindings);
        assert!(!config.allow_context_function_calls);
    }

    #[test]
    fn should_default_omitted_fields() {
        let config = resolve_parser_config(&json!({"component": "HeroComponent"}), &registry()).unwrap();
        assert!(config.name.is_none());
        assert!(config.host_element_tag.is_none());
        assert!(config.enclosing);
        assert!(config.allow_nesting);
        assert!(!config.parse_with_regex);
        assert!(config.allow_self_closing);
        assert!(config.parse_inputs);
        assert!(config.unescape_strings);
        assert!(config.inputs_whitelist.is_none());
        assert!(config.allow_context_in_bindings);
        assert!(config.allow_context_function_calls);
    }

    #[test]
    fn should_reject_non_objects() {
        assert_eq!(error_message(json!([1])), "Parser config must be an object, was array");
        assert_eq!(error_message(json!("app-hero")), "Parser config must be an object, was string");
    }

    #[test]
    fn should_report_unknown_fields_before_missing_ones() {
        assert_eq!(
            resolve_parser_config(&json!({"colour": 1}), &registry()).unwrap_err(),
            ConfigError::UnknownField {
                field: "colour".to_string()
            }
        );
        assert_eq!(
            error_message(json!({"selector": "app-hero"})),
            "Parser config is missing the required \"component\" property"
        );
        assert_eq!(
            error_message(json!({"component": "Villain"})),
            "No component named \"Villain\" is registered"
        );
    }

    #[test]
    fn should_name_the_offending_field_and_types() {
        assert_eq!(
            error_message(json!({"component": "HeroComponent", "selector": true})),
            "The submitted \"selector\" property in your parser config must be of type string, was boolean"
        );
        assert_eq!(
            error_message(json!({"component": "HeroComponent", "inputsBlacklist": "secret"})),
            "The submitted \"inputsBlacklist\" property in your parser config must be of type array, was string"
        );
        assert_eq!(
            error_message(json!({"component": "HeroComponent", "inputsWhitelist": ["name", 1]})),
            "The submitted \"inputsWhitelist\" property in your parser config must be of type array of strings, was number"
        );
        assert_eq!(
            error_message(json!({"component": "HeroComponent", "bracketStyle": "[]"})),
            "The submitted \"bracketStyle\" property in your parser config must be of type object, was string"
        );
        assert_eq!(
            error_message(json!({"component": 7})),
            "The submitted \"component\" property in your parser config must be of type string, was number"
        );
    }

    #[test]
    fn should_resolve_mixed_parser_entries() {
        let records = resolve_parsers(
            vec![
                ParserEntry::from(json!({"component": "HeroComponent", "name": "heroes"})),
                ParserEntry::from(
                    SelectorParserConfig::new(ComponentDefinition::new("Box").with_selector("app-box"))
                        .with_brackets("[", "]"),
                ),
            ],
            &registry(),
        )
        .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "heroes");
        assert!(records[0].finds_elements());
        assert!(!records[0].finds_strings());
        assert_eq!(records[1].name, "app-box");
        assert!(records[1].capabilities.contains(ParserCapabilities::FIND_STRINGS));
    }

    #[test]
    fn should_stop_at_the_first_invalid_entry() {
        let result = resolve_parsers(
            vec![
                ParserEntry::from(json!({"component": "HeroComponent"})),
                ParserEntry::from(json!({"component": "HeroComponent", "bracketStyle": {"closing": "]"}})),
            ],
            &registry(),
        );
        assert!(matches!(result, Err(ConfigError::InvalidBracketStyle { .. })));
    }

    #[test]
    fn should_require_a_selector_for_lazy_components() {
        let (lazy, _resolver) = LazyComponent::new("./hero");
        let mut registry = ComponentRegistry::new();
        registry.register("LazyHero", lazy);

        let missing = resolve_parsers(vec![ParserEntry::from(json!({"component": "LazyHero"}))], &registry);
        assert!(matches!(missing, Err(ConfigError::MissingField { field: "selector" })));

        let records = resolve_parsers(
            vec![ParserEntry::from(json!({"component": "LazyHero", "selector": "app-lazy-hero"}))],
            &registry,
        )
        .unwrap();
        assert_eq!(records[0].name, "app-lazy-hero");
    }
}
