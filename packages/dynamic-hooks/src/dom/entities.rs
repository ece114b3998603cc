//! HTML entity decoding
//!
//! Text taken from hook bindings may still carry the entities an editor or a
//! sanitizer introduced (`&quot;` inside attribute-like bindings being the common
//! case). Unknown entities are left as they are.

use once_cell::sync::Lazy;
use std::collections::HashMap;

pub static NAMED_ENTITIES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("quot", "\""),
        ("apos", "'"),
        ("amp", "&"),
        ("lt", "<"),
        ("gt", ">"),
        ("nbsp", "\u{00A0}"),
        ("lsquo", "\u{2018}"),
        ("rsquo", "\u{2019}"),
        ("ldquo", "\u{201C}"),
        ("rdquo", "\u{201D}"),
        ("ndash", "\u{2013}"),
        ("mdash", "\u{2014}"),
        ("hellip", "\u{2026}"),
        ("copy", "\u{00A9}"),
    ])
});

/// Decodes named and numeric character references in `text`.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        result.push_str(&rest[..amp]);
        rest = &rest[amp..];
        match read_entity(rest) {
            Some((consumed, decoded)) => {
                result.push_str(&decoded);
                rest = &rest[consumed..];
            }
            None => {
                result.push('&');
                rest = &rest[1..];
            }
        }
    }
    result.push_str(rest);
    result
}

/// Reads one `&...;` reference at the start of `text`. Returns the consumed
/// byte length and the decoded text.
fn read_entity(text: &str) -> Option<(usize, String)> {
    let end = text.find(';')?;
    let body = &text[1..end];
    if body.is_empty() {
        return None;
    }

    let decoded = if let Some(numeric) = body.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse::<u32>().ok()?,
        };
        std::char::from_u32(code).unwrap_or('\u{FFFD}').to_string()
    } else if body.chars().all(|c| c.is_ascii_alphanumeric()) {
        NAMED_ENTITIES.get(body)?.to_string()
    } else {
        return None;
    };

    Some((end + 1, decoded))
}
