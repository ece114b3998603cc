//! Utility Functions
//!
//! Name normalization for attribute-sourced bindings and regex escaping for
//! configurable hook delimiters.

use once_cell::sync::Lazy;
use regex::Regex;

/// Regex for dash-case to camelCase conversion
static DASH_CASE_REGEXP: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+([a-zA-Z0-9])").unwrap());

/// Convert dash-case to camelCase
pub fn dash_case_to_camel_case(input: &str) -> String {
    DASH_CASE_REGEXP
        .replace_all(input, |caps: &regex::Captures| caps[1].to_uppercase())
        .to_string()
}

/// Compares a binding name taken from an element attribute against a declared name.
///
/// Attribute names lose their casing in HTML, so the comparison ignores case and
/// accepts the dash-case spelling of a camelCase name.
pub fn attribute_name_matches(attribute_name: &str, declared: &str) -> bool {
    attribute_name.eq_ignore_ascii_case(declared)
        || dash_case_to_camel_case(attribute_name).eq_ignore_ascii_case(declared)
}

/// Escape characters that have special meaning in regular expressions
pub fn escape_regex(s: &str) -> String {
    regex::escape(s)
}
