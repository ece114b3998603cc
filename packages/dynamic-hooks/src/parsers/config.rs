//! Selector parser configuration
//!
//! A [`SelectorParserConfig`] can be built in code or resolved from JSON. The
//! JSON form is checked field by field so that mistakes are reported with the
//! offending property name.

use serde_json::{Map, Value as Json};

use crate::component::{ComponentRegistry, ComponentSource};
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketStyle {
    pub opening: String,
    pub closing: String,
}

impl Default for BracketStyle {
    fn default() -> Self {
        BracketStyle {
            opening: "<".to_string(),
            closing: ">".to_string(),
        }
    }
}

impl BracketStyle {
    pub fn new(opening: impl Into<String>, closing: impl Into<String>) -> Self {
        BracketStyle {
            opening: opening.into(),
            closing: closing.into(),
        }
    }

    pub fn is_html(&self) -> bool {
        self.opening == "<" && self.closing == ">"
    }
}

#[derive(Debug, Clone)]
pub struct SelectorParserConfig {
    pub component: ComponentSource,
    pub name: Option<String>,
    /// Defaults to the selector of the component definition
    pub selector: Option<String>,
    pub host_element_tag: Option<String>,
    pub bracket_style: BracketStyle,
    pub enclosing: bool,
    /// When disabled, hooks inside an open enclosing hook stay text
    pub allow_nesting: bool,
    /// Find `<tag>` hooks in text instead of as elements
    pub parse_with_regex: bool,
    pub allow_self_closing: bool,
    pub parse_inputs: bool,
    pub unescape_strings: bool,
    pub inputs_blacklist: Option<Vec<String>>,
    pub inputs_whitelist: Option<Vec<String>>,
    pub outputs_blacklist: Option<Vec<String>>,
    pub outputs_whitelist: Option<Vec<String>>,
    pub allow_context_in_bindings: bool,
    pub allow_context_function_calls: bool,
}

impl SelectorParserConfig {
    pub fn new(component: impl Into<ComponentSource>) -> Self {
        SelectorParserConfig {
            component: component.into(),
            name: None,
            selector: None,
            host_element_tag: None,
            bracket_style: BracketStyle::default(),
            enclosing: true,
            allow_nesting: true,
            parse_with_regex: false,
            allow_self_closing: true,
            parse_inputs: true,
            unescape_strings: true,
            inputs_blacklist: None,
            inputs_whitelist: None,
            outputs_blacklist: None,
            outputs_whitelist: None,
            allow_context_in_bindings: true,
            allow_context_function_calls: true,
        }
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_brackets(mut self, opening: impl Into<String>, closing: impl Into<String>) -> Self {
        self.bracket_style = BracketStyle::new(opening, closing);
        self
    }

    pub fn standalone(mut self) -> Self {
        self.enclosing = false;
        self
    }

    pub fn without_nesting(mut self) -> Self {
        self.allow_nesting = false;
        self
    }
}

const KNOWN_FIELDS: &[&str] = &[
    "component",
    "name",
    "selector",
    "hostElementTag",
    "bracketStyle",
    "enclosing",
    "allowNesting",
    "parseWithRegex",
    "allowSelfClosing",
    "parseInputs",
    "unescapeStrings",
    "inputsBlacklist",
    "inputsWhitelist",
    "outputsBlacklist",
    "outputsWhitelist",
    "allowContextInBindings",
    "allowContextFunctionCalls",
];

/// JSON type names used in error messages
fn json_type_name(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

fn invalid_type(field: &str, expected: &'static str, value: &Json) -> ConfigError {
    ConfigError::InvalidType {
        field: field.to_string(),
        expected,
        actual: json_type_name(value),
    }
}

fn string_field(map: &Map<String, Json>, field: &str) -> Result<Option<String>, ConfigError> {
    match map.get(field) {
        None => Ok(None),
        Some(Json::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(invalid_type(field, "string", other)),
    }
}

fn bool_field(map: &Map<String, Json>, field: &str, default: bool) -> Result<bool, ConfigError> {
    match map.get(field) {
        None => Ok(default),
        Some(Json::Bool(b)) => Ok(*b),
        Some(other) => Err(invalid_type(field, "boolean", other)),
    }
}

fn string_list_field(map: &Map<String, Json>, field: &str) -> Result<Option<Vec<String>>, ConfigError> {
    let items = match map.get(field) {
        None => return Ok(None),
        Some(Json::Array(items)) => items,
        Some(other) => return Err(invalid_type(field, "array", other)),
    };
    items
        .iter()
        .map(|item| match item {
            Json::String(s) => Ok(s.clone()),
            other => Err(invalid_type(field, "array of strings", other)),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn bracket_style_field(map: &Map<String, Json>) -> Result<BracketStyle, ConfigError> {
    let style = match map.get("bracketStyle") {
        None => return Ok(BracketStyle::default()),
        Some(Json::Object(style)) => style,
        Some(other) => return Err(invalid_type("bracketStyle", "object", other)),
    };
    let opening = string_field(style, "opening")?;
    let closing = string_field(style, "closing")?;
    match (opening, closing) {
        (Some(opening), Some(closing)) => Ok(BracketStyle { opening, closing }),
        _ => Err(ConfigError::InvalidBracketStyle {
            message: "bracketStyle needs both an \"opening\" and a \"closing\" string".to_string(),
        }),
    }
}

/// Resolves a JSON parser config. `component` names an entry of `registry`.
pub fn resolve_parser_config(
    json: &Json,
    registry: &ComponentRegistry,
) -> Result<SelectorParserConfig, ConfigError> {
    let map = match json {
        Json::Object(map) => map,
        other => {
            return Err(ConfigError::NotAnObject {
                actual: json_type_name(other),
            })
        }
    };

    if let Some(unknown) = map.keys().find(|k| !KNOWN_FIELDS.contains(&k.as_str())) {
        return Err(ConfigError::UnknownField {
            field: unknown.clone(),
        });
    }

    let component_name =
        string_field(map, "component")?.ok_or(ConfigError::MissingField { field: "component" })?;
    let component = registry
        .get(&component_name)
        .cloned()
        .ok_or(ConfigError::UnknownComponent {
            name: component_name,
        })?;

    Ok(SelectorParserConfig {
        component,
        name: string_field(map, "name")?,
        selector: string_field(map, "selector")?,
        host_element_tag: string_field(map, "hostElementTag")?,
        bracket_style: bracket_style_field(map)?,
        enclosing: bool_field(map, "enclosing", true)?,
        allow_nesting: bool_field(map, "allowNesting", true)?,
        parse_with_regex: bool_field(map, "parseWithRegex", false)?,
        allow_self_closing: bool_field(map, "allowSelfClosing", true)?,
        parse_inputs: bool_field(map, "parseInputs", true)?,
        unescape_strings: bool_field(map, "unescapeStrings", true)?,
        inputs_blacklist: string_list_field(map, "inputsBlacklist")?,
        inputs_whitelist: string_list_field(map, "inputsWhitelist")?,
        outputs_blacklist: string_list_field(map, "outputsBlacklist")?,
        outputs_whitelist: string_list_field(map, "outputsWhitelist")?,
        allow_context_in_bindings: bool_field(map, "allowContextInBindings", true)?,
        allow_context_function_calls: bool_field(map, "allowContextFunctionCalls", true)?,
    })
}
