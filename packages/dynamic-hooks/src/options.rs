//! Global parse options
//!
//! Apply to every parser of a session. Deserializable from the same camelCase
//! JSON shape hosts already use for their configuration files.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ParseOptions {
    /// Run string content through the installed sanitizer before parsing
    pub sanitize: bool,
    /// Decode HTML entities in the binding text of string hooks
    #[serde(rename = "convertHTMLEntities")]
    pub convert_html_entities: bool,
    /// Remove `<p>` wrappers an editor put around lone hook tags
    pub fix_paragraph_tags: bool,
    /// Only refresh bindings on explicit push triggers
    pub update_on_push_only: bool,
    pub compare_inputs_by_value: bool,
    pub compare_by_value_depth: usize,
    pub ignore_input_aliases: bool,
    pub ignore_output_aliases: bool,
    pub accept_inputs_for_any_property: bool,
    pub accept_outputs_for_any_observable: bool,
    /// Queue a DOM event on the anchor element whenever an output emits
    #[serde(rename = "triggerDOMEvents")]
    pub trigger_dom_events: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            sanitize: true,
            convert_html_entities: true,
            fix_paragraph_tags: true,
            update_on_push_only: false,
            compare_inputs_by_value: false,
            compare_by_value_depth: 5,
            ignore_input_aliases: false,
            ignore_output_aliases: false,
            accept_inputs_for_any_property: false,
            accept_outputs_for_any_observable: false,
            trigger_dom_events: false,
        }
    }
}

impl ParseOptions {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
