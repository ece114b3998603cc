//! Generic Hook Finder
//!
//! Turns regex matches for opening and closing tags into [`HookPosition`]s.

use regex::Regex;

use super::position::HookPosition;
use crate::diagnostics::Diagnostics;

#[derive(Debug, Default)]
pub struct FinderOutcome {
    pub positions: Vec<HookPosition>,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
    Opening,
    Closing,
}

#[derive(Debug, Clone, Copy)]
struct TagMatch {
    kind: TagKind,
    start: usize,
    end: usize,
}

/// One standalone position per (non-empty) match of `regex`.
pub fn find_standalone_hooks(text: &str, regex: &Regex) -> Vec<HookPosition> {
    regex
        .find_iter(text)
        .filter(|m| !m.is_empty())
        .map(|m| HookPosition::standalone(m.start(), m.end()))
        .collect()
}

/// Pairs opening and closing tag matches into enclosing positions.
///
/// Each closing tag closes the most recent opening tag that is still open. With
/// `allow_nesting` disabled, opening tags found while another one is open are
/// ignored, and so is the closing tag that would have matched them.
pub fn find_enclosing_hooks(
    text: &str,
    opening: &Regex,
    closing: &Regex,
    allow_nesting: bool,
) -> FinderOutcome {
    let mut outcome = FinderOutcome::default();
    let tags = collect_tags(text, opening, closing);

    let mut open: Vec<TagMatch> = Vec::new();
    let mut skipped_nested = 0usize;
    let mut previous_end = 0usize;

    for tag in tags {
        let snippet = &text[tag.start..tag.end];
        if tag.start < previous_end {
            outcome.diagnostics.warn(format!(
                "Syntax error: the tag \"{}\" at index {} overlaps the previous tag and is ignored",
                snippet, tag.start
            ));
            continue;
        }
        previous_end = tag.end;

        match tag.kind {
            TagKind::Opening => {
                if !allow_nesting && !open.is_empty() {
                    skipped_nested += 1;
                    outcome.diagnostics.warn(format!(
                        "The opening tag \"{}\" at index {} is nested inside another hook, but nesting is not allowed for this parser. It is treated as text",
                        snippet, tag.start
                    ));
                    continue;
                }
                open.push(tag);
            }
            TagKind::Closing => {
                if skipped_nested > 0 {
                    skipped_nested -= 1;
                    outcome.diagnostics.debug(format!(
                        "Closing tag \"{}\" at index {} belongs to an ignored nested hook",
                        snippet, tag.start
                    ));
                    continue;
                }
                match open.pop() {
                    Some(opening_tag) => outcome.positions.push(HookPosition::enclosing(
                        (opening_tag.start, opening_tag.end),
                        (tag.start, tag.end),
                    )),
                    None => outcome.diagnostics.warn(format!(
                        "Syntax error: the closing tag \"{}\" at index {} has no matching opening tag and is ignored",
                        snippet, tag.start
                    )),
                }
            }
        }
    }

    for unclosed in open {
        outcome.diagnostics.warn(format!(
            "The opening tag \"{}\" at index {} has no closing tag and is ignored",
            &text[unclosed.start..unclosed.end],
            unclosed.start
        ));
    }

    outcome
        .positions
        .sort_by_key(|p| p.opening_tag_start_index);
    outcome
}

fn collect_tags(text: &str, opening: &Regex, closing: &Regex) -> Vec<TagMatch> {
    let openings = opening.find_iter(text).map(|m| TagMatch {
        kind: TagKind::Opening,
        start: m.start(),
        end: m.end(),
    });
    let closings = closing.find_iter(text).map(|m| TagMatch {
        kind: TagKind::Closing,
        start: m.start(),
        end: m.end(),
    });

    let mut tags: Vec<TagMatch> = openings
        .chain(closings)
        .filter(|t| t.end > t.start)
        .collect();
    // stable: an opening and a closing at the same index keep opening first
    tags.sort_by_key(|t| t.start);
    tags
}
