//! Element hook finder
//!
//! Collects the elements each element parser reports and drops the ones that
//! cannot become new hooks.

use std::collections::{HashMap, HashSet};

use crate::diagnostics::Diagnostics;
use crate::dom::{Document, NodeId, ANCHOR_TAG};

/// An element claimed by a parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementMatch {
    pub parser_index: usize,
    pub node: NodeId,
}

/// Filters element candidates, given as `(parser index, parser name, elements)`.
///
/// Skips anchors, elements that already host a hook, elements outside `root`
/// or excluded by `is_skipped`, and elements already claimed by an earlier
/// parser. The result is in document order.
pub fn filter_element_hooks<'a>(
    doc: &Document,
    root: NodeId,
    candidates: impl IntoIterator<Item = (usize, &'a str, Vec<NodeId>)>,
    existing_hosts: &HashSet<NodeId>,
    is_skipped: impl Fn(NodeId) -> bool,
    diagnostics: &mut Diagnostics,
) -> Vec<ElementMatch> {
    let mut claimed: HashSet<NodeId> = HashSet::new();
    let mut matches = Vec::new();

    for (parser_index, parser_name, nodes) in candidates {
        for node in nodes {
            let Some(element) = doc.element(node) else {
                continue;
            };
            if element.name.eq_ignore_ascii_case(ANCHOR_TAG)
                || existing_hosts.contains(&node)
                || !doc.is_ancestor(root, node)
                || is_skipped(node)
            {
                continue;
            }
            if !claimed.insert(node) {
                diagnostics.warn(format!(
                    "The element <{}> was also found by parser \"{}\", but is already a hook of another parser. Ignoring",
                    element.name, parser_name
                ));
                continue;
            }
            matches.push(ElementMatch { parser_index, node });
        }
    }

    let order: HashMap<NodeId, usize> = doc
        .descendants(root)
        .into_iter()
        .enumerate()
        .map(|(index, node)| (node, index))
        .collect();
    matches.sort_by_key(|m| order.get(&m.node).copied().unwrap_or(usize::MAX));
    matches
}
