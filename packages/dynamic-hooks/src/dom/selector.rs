use once_cell::sync::Lazy;
/**
 * Selector Matching
 *
 * Parses the CSS selector of an element-hook parser and matches it against
 * elements of a [`Document`]. Supports element names, `.class`, `#id`,
 * `[attr]`, `[attr=value]`, `:not(...)` and comma separated lists.
 */
use regex::Regex;

use super::node::{Document, ElementData, NodeId};
use crate::error::ConfigError;

static SELECTOR_REGEXP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(\:not\()|(([\.\#]?)[-\w]+)|(?:\[([-.\w*\\$]+)(?:=(?:"([^"]*)"|'([^']*)'|([^\]]*)))?\])|(\))|(\s*,\s*)"#).unwrap()
});

/// Capture groups of [`SELECTOR_REGEXP`]
#[derive(Debug, Clone, Copy)]
enum SelectorGroup {
    Not = 1,
    Tag = 2,
    Prefix = 3,
    Attribute = 4,
    ValueDouble = 5,
    ValueSingle = 6,
    ValueUnquoted = 7,
    NotEnd = 8,
    Separator = 9,
}

/// A single compound selector, e.g. `div.card[data-x]:not(.hidden)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CssSelector {
    pub element: Option<String>,
    pub class_names: Vec<String>,
    /// (name, lowercased value); an empty value only requires presence
    pub attrs: Vec<(String, String)>,
    pub not_selectors: Vec<CssSelector>,
}

impl CssSelector {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_empty(&self) -> bool {
        self.element.is_none() && self.class_names.is_empty() && self.attrs.is_empty()
    }

    fn add_attribute(&mut self, name: &str, value: &str) {
        self.attrs.push((name.to_string(), value.to_lowercase()));
    }

    fn add_class_name(&mut self, name: &str) {
        self.class_names.push(name.to_lowercase());
    }

    /// Checks this compound selector against one element.
    pub fn matches(&self, element: &ElementData) -> bool {
        if let Some(name) = &self.element {
            if name != "*" && !name.eq_ignore_ascii_case(&element.name) {
                return false;
            }
        }

        let classes: Vec<String> = element.class_names().map(|c| c.to_lowercase()).collect();
        if !self.class_names.iter().all(|c| classes.contains(c)) {
            return false;
        }

        let attrs_match = self.attrs.iter().all(|(name, value)| {
            match element.get_attribute(name) {
                Some(actual) => value.is_empty() || actual.to_lowercase() == *value,
                None => false,
            }
        });
        if !attrs_match {
            return false;
        }

        !self.not_selectors.iter().any(|not| not.matches(element))
    }
}

/// Comma separated list of selectors; matches if any member does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    source: String,
    selectors: Vec<CssSelector>,
}

impl SelectorList {
    pub fn parse(selector: &str) -> Result<Self, ConfigError> {
        let invalid = |message: &str| ConfigError::InvalidSelector {
            selector: selector.to_string(),
            message: message.to_string(),
        };

        if selector.trim().is_empty() {
            return Err(invalid("selector is empty"));
        }

        let mut selectors = Vec::new();
        let mut current = CssSelector::new();
        let mut in_not = false;

        for cap in SELECTOR_REGEXP.captures_iter(selector) {
            if cap.get(SelectorGroup::Not as usize).is_some() {
                if in_not {
                    return Err(invalid("nesting :not in a selector is not allowed"));
                }
                in_not = true;
                current.not_selectors.push(CssSelector::new());
            }

            let target = if in_not && !current.not_selectors.is_empty() {
                let last = current.not_selectors.len() - 1;
                &mut current.not_selectors[last]
            } else {
                &mut current
            };

            if let Some(tag) = cap.get(SelectorGroup::Tag as usize) {
                let tag = tag.as_str();
                match cap.get(SelectorGroup::Prefix as usize).map(|m| m.as_str()) {
                    Some("#") => target.add_attribute("id", &tag[1..]),
                    Some(".") => target.add_class_name(&tag[1..]),
                    _ => target.element = Some(tag.to_string()),
                }
            }

            if let Some(attr) = cap.get(SelectorGroup::Attribute as usize) {
                let value = [
                    SelectorGroup::ValueDouble,
                    SelectorGroup::ValueSingle,
                    SelectorGroup::ValueUnquoted,
                ]
                .iter()
                .find_map(|g| cap.get(*g as usize))
                .map(|m| m.as_str())
                .unwrap_or("");
                target.add_attribute(&attr.as_str().replace('\\', ""), value);
            }

            if cap.get(SelectorGroup::NotEnd as usize).is_some() {
                in_not = false;
            }

            if cap.get(SelectorGroup::Separator as usize).is_some() {
                if in_not {
                    return Err(invalid("multiple selectors in :not are not supported"));
                }
                Self::push_selector(&mut selectors, std::mem::take(&mut current));
            }
        }

        Self::push_selector(&mut selectors, current);
        if selectors.iter().all(|s| s.is_empty() && s.not_selectors.is_empty()) {
            return Err(invalid("selector matches nothing"));
        }

        Ok(SelectorList {
            source: selector.to_string(),
            selectors,
        })
    }

    fn push_selector(selectors: &mut Vec<CssSelector>, mut selector: CssSelector) {
        if !selector.not_selectors.is_empty() && selector.is_empty() {
            selector.element = Some("*".to_string());
        }
        selectors.push(selector);
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn selectors(&self) -> &[CssSelector] {
        &self.selectors
    }

    pub fn matches(&self, element: &ElementData) -> bool {
        self.selectors
            .iter()
            .filter(|s| !s.is_empty())
            .any(|s| s.matches(element))
    }

    /// Elements below `root` matching this list, in document order.
    pub fn query_all(&self, doc: &Document, root: NodeId) -> Vec<NodeId> {
        doc.descendants(root)
            .into_iter()
            .filter(|id| doc.element(*id).is_some_and(|el| self.matches(el)))
            .collect()
    }
}
