/**
 * Parsers Module
 *
 * A parser finds hooks for one component and extracts their raw bindings.
 * Whatever shape a parser is configured in, it is normalized into a
 * [`ParserRecord`] whose capabilities are checked once, at load time.
 */
pub mod attributes;
pub mod config;
pub mod selector_parser;

use bitflags::bitflags;
use indexmap::IndexMap;
use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::component::{ComponentRegistry, ComponentSource};
use crate::diagnostics::Diagnostics;
use crate::dom::{Document, ElementData, NodeId};
use crate::error::ConfigError;
use crate::hooks::HookPosition;
use crate::value::Value;

pub use config::{resolve_parser_config, BracketStyle, SelectorParserConfig};
pub use selector_parser::SelectorHookParser;

bitflags! {
    /// What a parser implementation provides
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ParserCapabilities: u8 {
        const FIND_STRINGS = 0b0001;
        const FIND_ELEMENTS = 0b0010;
        const LOAD_COMPONENT = 0b0100;
        const BINDINGS = 0b1000;
    }
}

/// The source a hook was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookValue {
    /// Tag text of a string hook
    Text {
        opening_tag: String,
        closing_tag: Option<String>,
    },
    /// Snapshot of an element hook at the time it was found
    Element(ElementData),
}

impl HookValue {
    pub fn describe(&self) -> String {
        match self {
            HookValue::Text { opening_tag, .. } => opening_tag.clone(),
            HookValue::Element(el) => format!("<{}>", el.name),
        }
    }
}

pub struct LoadedComponent {
    pub component: ComponentSource,
    /// Tag name to give the anchor element of string hooks
    pub host_element_tag: Option<String>,
    pub injection_context: Option<Rc<dyn Any>>,
}

impl LoadedComponent {
    pub fn new(component: ComponentSource) -> Self {
        LoadedComponent {
            component,
            host_element_tag: None,
            injection_context: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInput {
    pub raw: String,
    /// Evaluate `raw` as an expression instead of passing it on as a string
    pub parse: bool,
    /// Written in binding syntax (`[name]`) rather than as a plain attribute
    pub explicit: bool,
}

/// Binding names and unevaluated expressions as written in the hook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawBindings {
    pub inputs: IndexMap<String, RawInput>,
    pub outputs: IndexMap<String, String>,
    /// Names come from element attributes, whose casing is unreliable
    pub from_element: bool,
}

/// How the raw bindings of a parser are turned into values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingOptions {
    pub unescape_strings: bool,
    pub allow_context_in_bindings: bool,
    pub allow_context_function_calls: bool,
    pub inputs_blacklist: Option<Vec<String>>,
    pub inputs_whitelist: Option<Vec<String>>,
    pub outputs_blacklist: Option<Vec<String>>,
    pub outputs_whitelist: Option<Vec<String>>,
}

impl Default for BindingOptions {
    fn default() -> Self {
        BindingOptions {
            unescape_strings: true,
            allow_context_in_bindings: true,
            allow_context_function_calls: true,
            inputs_blacklist: None,
            inputs_whitelist: None,
            outputs_blacklist: None,
            outputs_whitelist: None,
        }
    }
}

pub trait HookParser {
    fn name(&self) -> &str;

    fn capabilities(&self) -> ParserCapabilities;

    /// Hook positions inside `content`, a string built from text nodes.
    fn find_hooks(
        &self,
        _content: &str,
        _context: &Value,
        _diagnostics: &mut Diagnostics,
    ) -> Vec<HookPosition> {
        Vec::new()
    }

    /// Elements below `root` that are hooks.
    fn find_hook_elements(&self, _doc: &Document, _root: NodeId, _context: &Value) -> Vec<NodeId> {
        Vec::new()
    }

    fn load_component(&self, hook_id: usize, value: &HookValue, context: &Value) -> LoadedComponent;

    fn get_bindings(&self, hook_id: usize, value: &HookValue, context: &Value) -> RawBindings;

    fn binding_options(&self) -> BindingOptions {
        BindingOptions::default()
    }
}

/// A loaded parser and what it has been checked to provide.
#[derive(Clone)]
pub struct ParserRecord {
    pub name: String,
    pub parser: Rc<dyn HookParser>,
    pub capabilities: ParserCapabilities,
}

impl ParserRecord {
    pub fn new(parser: Rc<dyn HookParser>) -> Result<Self, ConfigError> {
        let name = parser.name().to_string();
        let capabilities = parser.capabilities();

        let mut missing = Vec::new();
        if !capabilities.intersects(ParserCapabilities::FIND_STRINGS | ParserCapabilities::FIND_ELEMENTS) {
            missing.push("find_hooks or find_hook_elements");
        }
        if !capabilities.contains(ParserCapabilities::LOAD_COMPONENT) {
            missing.push("load_component");
        }
        if !capabilities.contains(ParserCapabilities::BINDINGS) {
            missing.push("get_bindings");
        }
        if !missing.is_empty() {
            return Err(ConfigError::MissingCapabilities {
                parser: name,
                missing: missing.join(", "),
            });
        }

        Ok(ParserRecord {
            name,
            parser,
            capabilities,
        })
    }

    pub fn finds_strings(&self) -> bool {
        self.capabilities.contains(ParserCapabilities::FIND_STRINGS)
    }

    pub fn finds_elements(&self) -> bool {
        self.capabilities.contains(ParserCapabilities::FIND_ELEMENTS)
    }
}

impl fmt::Debug for ParserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserRecord")
            .field("name", &self.name)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

/// The forms a parser can be handed to a session in.
pub enum ParserEntry {
    /// Parser config as JSON; the component is looked up by name
    Json(serde_json::Value),
    Selector(SelectorParserConfig),
    Custom(Rc<dyn HookParser>),
}

impl From<SelectorParserConfig> for ParserEntry {
    fn from(config: SelectorParserConfig) -> Self {
        ParserEntry::Selector(config)
    }
}

impl From<serde_json::Value> for ParserEntry {
    fn from(json: serde_json::Value) -> Self {
        ParserEntry::Json(json)
    }
}

/// Loads all parser entries. Fails on the first invalid one.
pub fn resolve_parsers(
    entries: Vec<ParserEntry>,
    registry: &ComponentRegistry,
) -> Result<Vec<ParserRecord>, ConfigError> {
    let mut records: Vec<ParserRecord> = Vec::with_capacity(entries.len());
    for entry in entries {
        let parser: Rc<dyn HookParser> = match entry {
            ParserEntry::Json(json) => {
                let config = resolve_parser_config(&json, registry)?;
                Rc::new(SelectorHookParser::new(config)?)
            }
            ParserEntry::Selector(config) => Rc::new(SelectorHookParser::new(config)?),
            ParserEntry::Custom(parser) => parser,
        };
        let record = ParserRecord::new(parser)?;
        if records.iter().any(|r| r.name == record.name) {
            tracing::warn!(
                "Parser name \"{}\" is used more than once. Hooks of both parsers will be reported under the same name",
                record.name
            );
        }
        records.push(record);
    }
    Ok(records)
}
