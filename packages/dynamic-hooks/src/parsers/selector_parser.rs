/**
 * Selector Hook Parser
 *
 * The built-in parser. Finds hooks by the selector of their component, either as
 * elements of the document (`<app-hero>` with the default HTML brackets) or as
 * text (`[app-hero ...]`, `{{app-hero}}` or `<app-hero>` with
 * `parse_with_regex`).
 */
use once_cell::sync::Lazy;
use regex::Regex;

use super::attributes::{parse_tag_attributes, AttributeKind, TagAttribute};
use super::config::SelectorParserConfig;
use super::{
    BindingOptions, HookParser, HookValue, LoadedComponent, ParserCapabilities, RawBindings,
    RawInput,
};
use crate::diagnostics::Diagnostics;
use crate::dom::{Document, NodeId, SelectorList};
use crate::error::ConfigError;
use crate::hooks::{find_enclosing_hooks, find_standalone_hooks, HookPosition};
use crate::util::escape_regex;
use crate::value::Value;

/// Selectors usable in text mode: plain tag names
static TEXT_SELECTOR_REGEXP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][\w\-:]*$").unwrap());

/// Regexes for finding hooks in text
#[derive(Debug, Clone)]
struct TextTagRegexes {
    opening: Regex,
    self_closing: Regex,
    closing: Regex,
    /// Strips the brackets and selector from an opening tag, leaving attributes
    opening_parts: Regex,
}

#[derive(Debug, Clone)]
enum FindMode {
    Elements(SelectorList),
    Text(TextTagRegexes),
}

#[derive(Debug, Clone)]
pub struct SelectorHookParser {
    name: String,
    config: SelectorParserConfig,
    mode: FindMode,
}

impl SelectorHookParser {
    pub fn new(config: SelectorParserConfig) -> Result<Self, ConfigError> {
        let selector = match (&config.selector, config.component.definition()) {
            (Some(selector), _) => selector.clone(),
            (None, Some(def)) if def.selector.is_some() => def.selector.clone().unwrap_or_default(),
            _ => return Err(ConfigError::MissingField { field: "selector" }),
        };

        let brackets = &config.bracket_style;
        if brackets.opening.is_empty() || brackets.closing.is_empty() {
            return Err(ConfigError::InvalidBracketStyle {
                message: "opening and closing brackets must not be empty".to_string(),
            });
        }
        if brackets.opening == brackets.closing {
            return Err(ConfigError::InvalidBracketStyle {
                message: format!(
                    "opening and closing brackets must differ, both are \"{}\"",
                    brackets.opening
                ),
            });
        }

        let mode = if brackets.is_html() && !config.parse_with_regex {
            FindMode::Elements(SelectorList::parse(&selector)?)
        } else {
            FindMode::Text(build_text_regexes(&config, &selector)?)
        };

        Ok(SelectorHookParser {
            name: config.name.clone().unwrap_or_else(|| selector.clone()),
            config,
            mode,
        })
    }

    pub fn config(&self) -> &SelectorParserConfig {
        &self.config
    }

    fn raw_bindings(&self, attributes: Vec<TagAttribute>, from_element: bool) -> RawBindings {
        let mut bindings = RawBindings {
            from_element,
            ..Default::default()
        };
        for attr in attributes {
            match attr.kind {
                AttributeKind::Input => {
                    bindings.inputs.insert(
                        attr.name,
                        RawInput {
                            raw: attr.value,
                            parse: self.config.parse_inputs,
                            explicit: true,
                        },
                    );
                }
                AttributeKind::Output => {
                    bindings.outputs.insert(attr.name, attr.value);
                }
                AttributeKind::Plain => {
                    bindings.inputs.insert(
                        attr.name,
                        RawInput {
                            raw: attr.value,
                            parse: false,
                            explicit: false,
                        },
                    );
                }
            }
        }
        bindings
    }
}

fn build_text_regexes(config: &SelectorParserConfig, selector: &str) -> Result<TextTagRegexes, ConfigError> {
    let names: Vec<&str> = selector.split(',').map(str::trim).collect();
    if let Some(bad) = names.iter().find(|n| !TEXT_SELECTOR_REGEXP.is_match(n)) {
        return Err(ConfigError::InvalidSelector {
            selector: selector.to_string(),
            message: format!("\"{}\" cannot be used to find hooks in text, only tag names can", bad),
        });
    }

    let opening = &config.bracket_style.opening;
    let closing = &config.bracket_style.closing;
    let open = escape_regex(opening);
    let close = escape_regex(closing);
    let first_open = escape_regex(&opening.chars().next().map(String::from).unwrap_or_default());
    let first_close = escape_regex(&closing.chars().next().map(String::from).unwrap_or_default());
    let sel = format!(
        "(?:{})",
        names.iter().map(|n| escape_regex(n)).collect::<Vec<_>>().join("|")
    );
    // A `/` is attribute text unless only whitespace separates it from the closing bracket
    let plain = format!(r#"[^"'\[\]()/{}{}]"#, first_close, first_open);
    let slash = format!(r#"/+\s*[^\s"'\[\]()/{}{}]"#, first_close, first_open);
    let item = format!(
        r#"(?:"(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'|\[[^\]]*\]|\([^)]*\)|{plain}|{slash})"#
    );

    let compile = |pattern: String| {
        Regex::new(&pattern).map_err(|e| ConfigError::InvalidSelector {
            selector: selector.to_string(),
            message: e.to_string(),
        })
    };

    Ok(TextTagRegexes {
        opening: compile(format!(r"{open}{sel}(?:\s{item}*)?\s*{close}"))?,
        self_closing: compile(format!(r"{open}{sel}(?:\s{item}*)?\s*/\s*{close}"))?,
        closing: compile(format!(r"{open}/{sel}\s*{close}"))?,
        opening_parts: compile(format!(r"(?s)^{open}{sel}(.*?)/?\s*{close}$"))?,
    })
}

impl HookParser for SelectorHookParser {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> ParserCapabilities {
        let finder = match self.mode {
            FindMode::Elements(_) => ParserCapabilities::FIND_ELEMENTS,
            FindMode::Text(_) => ParserCapabilities::FIND_STRINGS,
        };
        finder | ParserCapabilities::LOAD_COMPONENT | ParserCapabilities::BINDINGS
    }

    fn find_hooks(&self, content: &str, _context: &Value, diagnostics: &mut Diagnostics) -> Vec<HookPosition> {
        let regexes = match &self.mode {
            FindMode::Text(regexes) => regexes,
            FindMode::Elements(_) => return Vec::new(),
        };

        let mut positions = if self.config.enclosing {
            let outcome = find_enclosing_hooks(
                content,
                &regexes.opening,
                &regexes.closing,
                self.config.allow_nesting,
            );
            diagnostics.append(outcome.diagnostics);
            outcome.positions
        } else {
            find_standalone_hooks(content, &regexes.opening)
        };

        if self.config.allow_self_closing {
            positions.extend(find_standalone_hooks(content, &regexes.self_closing));
            positions.sort_by_key(|p| p.opening_tag_start_index);
        }
        positions
    }

    fn find_hook_elements(&self, doc: &Document, root: NodeId, _context: &Value) -> Vec<NodeId> {
        match &self.mode {
            FindMode::Elements(selector) => selector.query_all(doc, root),
            FindMode::Text(_) => Vec::new(),
        }
    }

    fn load_component(&self, _hook_id: usize, _value: &HookValue, _context: &Value) -> LoadedComponent {
        LoadedComponent {
            host_element_tag: self.config.host_element_tag.clone(),
            ..LoadedComponent::new(self.config.component.clone())
        }
    }

    fn get_bindings(&self, _hook_id: usize, value: &HookValue, _context: &Value) -> RawBindings {
        match value {
            HookValue::Element(element) => {
                let attributes = element
                    .attrs
                    .iter()
                    .map(|a| TagAttribute::from_raw(&a.name, a.value.clone()))
                    .collect();
                self.raw_bindings(attributes, true)
            }
            HookValue::Text { opening_tag, .. } => {
                let attribute_text = match &self.mode {
                    FindMode::Text(regexes) => regexes
                        .opening_parts
                        .captures(opening_tag)
                        .and_then(|c| c.get(1))
                        .map(|m| m.as_str())
                        .unwrap_or_default(),
                    FindMode::Elements(_) => "",
                };
                self.raw_bindings(parse_tag_attributes(attribute_text), false)
            }
        }
    }

    fn binding_options(&self) -> BindingOptions {
        BindingOptions {
            unescape_strings: self.config.unescape_strings,
            allow_context_in_bindings: self.config.allow_context_in_bindings,
            allow_context_function_calls: self.config.allow_context_function_calls,
            inputs_blacklist: self.config.inputs_blacklist.clone(),
            inputs_whitelist: self.config.inputs_whitelist.clone(),
            outputs_blacklist: self.config.outputs_blacklist.clone(),
            outputs_whitelist: self.config.outputs_whitelist.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentDefinition;

    fn hero() -> ComponentDefinition {
        ComponentDefinition::new("Hero").with_selector("app-hero")
    }

    #[test]
    fn test_mode_follows_brackets() {
        let element = SelectorHookParser::new(SelectorParserConfig::new(hero())).unwrap();
        assert_eq!(
            element.capabilities(),
            ParserCapabilities::FIND_ELEMENTS | ParserCapabilities::LOAD_COMPONENT | ParserCapabilities::BINDINGS
        );
        assert_eq!(element.name(), "app-hero");

        let text = SelectorHookParser::new(SelectorParserConfig::new(hero()).with_brackets("[", "]")).unwrap();
        assert!(text.capabilities().contains(ParserCapabilities::FIND_STRINGS));
    }

    #[test]
    fn test_text_finder_with_self_closing() {
        let parser = SelectorHookParser::new(SelectorParserConfig::new(hero()).with_brackets("[", "]")).unwrap();
        let mut diagnostics = Diagnostics::new();
        let content = "[app-hero [x]=\"1\"]a[/app-hero] [app-hero /] [app-heroes]";
        let positions = parser.find_hooks(content, &Value::Undefined, &mut diagnostics);
        assert_eq!(positions.len(), 2);
        assert!(positions[0].is_enclosing());
        assert_eq!(&content[positions[0].opening_tag_start_index..positions[0].opening_tag_end_index], "[app-hero [x]=\"1\"]");
        assert!(!positions[1].is_enclosing());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_unquoted_values_may_contain_slashes() {
        let parser = SelectorHookParser::new(SelectorParserConfig::new(hero()).with_brackets("[", "]")).unwrap();
        let mut diagnostics = Diagnostics::new();
        let content = "[app-hero link=http://x.io/a]x[/app-hero] [app-hero link=a/b /]";
        let positions = parser.find_hooks(content, &Value::Undefined, &mut diagnostics);
        assert_eq!(positions.len(), 2);
        assert_eq!(
            &content[positions[0].opening_tag_start_index..positions[0].opening_tag_end_index],
            "[app-hero link=http://x.io/a]"
        );
        assert!(positions[0].is_enclosing());
        assert!(!positions[1].is_enclosing());
        assert_eq!(&content[positions[1].opening_tag_start_index..], "[app-hero link=a/b /]");
    }

    #[test]
    fn test_text_bindings() {
        let parser = SelectorHookParser::new(SelectorParserConfig::new(hero()).with_brackets("[", "]")).unwrap();
        let value = HookValue::Text {
            opening_tag: "[app-hero [name]=\"'Luke'\" (saved)=\"context.save($event)\" title=Jedi]".to_string(),
            closing_tag: None,
        };
        let bindings = parser.get_bindings(1, &value, &Value::Undefined);
        assert_eq!(bindings.inputs["name"].raw, "'Luke'");
        assert!(bindings.inputs["name"].parse);
        assert!(!bindings.inputs["title"].parse);
        assert_eq!(bindings.outputs["saved"], "context.save($event)");
        assert!(!bindings.from_element);
    }

    #[test]
    fn test_invalid_configs() {
        let missing_selector = SelectorHookParser::new(SelectorParserConfig::new(ComponentDefinition::new("X")));
        assert!(matches!(missing_selector, Err(ConfigError::MissingField { field: "selector" })));

        let same_brackets = SelectorHookParser::new(SelectorParserConfig::new(hero()).with_brackets("|", "|"));
        assert!(matches!(same_brackets, Err(ConfigError::InvalidBracketStyle { .. })));

        let compound = SelectorHookParser::new(
            SelectorParserConfig::new(hero()).with_selector("app-hero.big").with_brackets("[", "]"),
        );
        assert!(matches!(compound, Err(ConfigError::InvalidSelector { .. })));
    }
}
