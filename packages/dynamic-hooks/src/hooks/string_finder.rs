//! String Hook Finder
//!
//! Runs the text-based parsers over the text of a subtree and replaces every
//! accepted hook with an anchor element.
//!
//! The text nodes below the root are concatenated into one string. Parsers
//! report positions in that string; after validation, text nodes are split at
//! every tag boundary so that each tag maps onto whole text nodes, which are then
//! removed. Content between an opening and a closing tag is moved into the
//! anchor.

use super::position::HookPosition;
use super::validator::{validate_positions, PositionCandidate};
use crate::diagnostics::Diagnostics;
use crate::dom::{Document, ElementData, NodeData, NodeId, ANCHOR_TAG};

/// A string hook that has been replaced with an anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringHookMatch {
    pub parser_index: usize,
    pub parser_name: String,
    pub anchor: NodeId,
    pub position: HookPosition,
    pub opening_tag: String,
    pub closing_tag: Option<String>,
}

#[derive(Debug, Default)]
pub struct StringFinderOutcome {
    /// In document order
    pub hooks: Vec<StringHookMatch>,
    pub diagnostics: Diagnostics,
}

/// A text node and the range it occupies in the concatenated content.
#[derive(Debug, Clone, Copy)]
struct TextSegment {
    node: NodeId,
    start: usize,
    end: usize,
}

/// Concatenated text of a subtree.
#[derive(Debug, Default)]
pub struct TextContent {
    pub content: String,
    segments: Vec<TextSegment>,
}

/// Collects the text below `root` in document order. Anchors and subtrees for
/// which `is_skipped` holds are left out.
pub fn collect_text(doc: &Document, root: NodeId, is_skipped: impl Fn(NodeId) -> bool) -> TextContent {
    let mut text = TextContent::default();
    let mut stack: Vec<NodeId> = doc.children(root).iter().rev().copied().collect();

    while let Some(node) = stack.pop() {
        if is_skipped(node) {
            continue;
        }
        match doc.data(node) {
            NodeData::Text(value) => {
                let start = text.content.len();
                text.content.push_str(value);
                text.segments.push(TextSegment {
                    node,
                    start,
                    end: text.content.len(),
                });
            }
            NodeData::Element(el) if el.name.eq_ignore_ascii_case(ANCHOR_TAG) => {}
            _ => stack.extend(doc.children(node).iter().rev().copied()),
        }
    }

    text
}

/// Finds and replaces string hooks below `root`.
///
/// `find` receives the concatenated text and returns the candidate positions of
/// all string parsers.
pub fn find_string_hooks<F>(
    doc: &mut Document,
    root: NodeId,
    mut find: F,
    is_skipped: impl Fn(NodeId) -> bool,
) -> StringFinderOutcome
where
    F: FnMut(&str, &mut Diagnostics) -> Vec<PositionCandidate>,
{
    let mut outcome = StringFinderOutcome::default();
    let mut text = collect_text(doc, root, is_skipped);
    if text.content.is_empty() {
        return outcome;
    }

    let candidates = find(&text.content, &mut outcome.diagnostics);
    let validation = validate_positions(candidates);
    outcome.diagnostics.append(validation.diagnostics);
    if validation.accepted.is_empty() {
        return outcome;
    }

    let mut boundaries: Vec<usize> = validation
        .accepted
        .iter()
        .flat_map(|c| {
            let p = c.position;
            [
                Some(p.opening_tag_start_index),
                Some(p.opening_tag_end_index),
                p.closing_tag_start_index,
                p.closing_tag_end_index,
            ]
        })
        .flatten()
        .collect();
    boundaries.sort_unstable();
    boundaries.dedup();
    split_at_boundaries(doc, &mut text.segments, &boundaries);

    for candidate in validation.accepted {
        let position = candidate.position;
        let opening = pieces_for(&text.segments, position.opening_tag_start_index, position.opening_tag_end_index);
        let closing = match (position.closing_tag_start_index, position.closing_tag_end_index) {
            (Some(start), Some(end)) => Some(pieces_for(&text.segments, start, end)),
            _ => None,
        };

        match replace_with_anchor(doc, &opening, closing.as_ref()) {
            Ok(anchor) => outcome.hooks.push(StringHookMatch {
                parser_index: candidate.parser_index,
                parser_name: candidate.parser_name,
                anchor,
                position,
                opening_tag: text.content[position.opening_tag_start_index..position.opening_tag_end_index]
                    .to_string(),
                closing_tag: position
                    .closing_tag_start_index
                    .zip(position.closing_tag_end_index)
                    .map(|(start, end)| text.content[start..end].to_string()),
            }),
            Err(reason) => outcome.diagnostics.warn(format!(
                "The hook \"{}\" found by parser \"{}\" could not be replaced: {}. It is left as text",
                &text.content[position.opening_tag_start_index..position.opening_tag_end_index],
                candidate.parser_name,
                reason
            )),
        }
    }

    outcome
}

fn split_at_boundaries(doc: &mut Document, segments: &mut Vec<TextSegment>, boundaries: &[usize]) {
    for &boundary in boundaries {
        let Some(index) = segments
            .iter()
            .position(|s| s.start < boundary && boundary < s.end)
        else {
            continue;
        };
        let segment = segments[index];
        if let Some(tail) = doc.split_text(segment.node, boundary - segment.start) {
            segments[index].end = boundary;
            segments.insert(
                index + 1,
                TextSegment {
                    node: tail,
                    start: boundary,
                    end: segment.end,
                },
            );
        }
    }
}

/// The text nodes exactly covering `start..end`, or `None` if they do not.
fn pieces_for(segments: &[TextSegment], start: usize, end: usize) -> Option<Vec<NodeId>> {
    let pieces: Vec<&TextSegment> = segments
        .iter()
        .filter(|s| s.start >= start && s.end <= end && s.end > s.start)
        .collect();
    let covered: usize = pieces.iter().map(|s| s.end - s.start).sum();
    if pieces.is_empty() || covered != end - start {
        return None;
    }
    Some(pieces.into_iter().map(|s| s.node).collect())
}

fn replace_with_anchor(
    doc: &mut Document,
    opening: &Option<Vec<NodeId>>,
    closing: Option<&Option<Vec<NodeId>>>,
) -> Result<NodeId, &'static str> {
    let opening = opening.as_deref().ok_or("its opening tag does not line up with the text")?;
    let closing = match closing {
        Some(pieces) => Some(pieces.as_deref().ok_or("its closing tag does not line up with the text")?),
        None => None,
    };

    let parent = doc
        .parent(opening[0])
        .ok_or("its opening tag is no longer in the document")?;
    let all_pieces = opening.iter().chain(closing.unwrap_or_default());
    if all_pieces.clone().any(|piece| doc.parent(*piece) != Some(parent)) {
        return Err("its tags are not all located directly inside the same element");
    }

    let content: Vec<NodeId> = match closing {
        Some(closing) => {
            let children = doc.children(parent);
            let after_opening = opening
                .iter()
                .filter_map(|p| children.iter().position(|c| c == p))
                .max()
                .ok_or("its opening tag is no longer in the document")?;
            let before_closing = closing
                .iter()
                .filter_map(|p| children.iter().position(|c| c == p))
                .min()
                .ok_or("its closing tag is no longer in the document")?;
            if before_closing <= after_opening {
                return Err("its closing tag comes before its opening tag");
            }
            children[after_opening + 1..before_closing].to_vec()
        }
        None => Vec::new(),
    };

    let anchor = doc.create_element(ElementData::new(ANCHOR_TAG));
    doc.insert_before(parent, anchor, opening[0]);
    for node in content {
        doc.append_child(anchor, node);
    }
    for piece in all_pieces {
        doc.detach(*piece);
    }
    Ok(anchor)
}
