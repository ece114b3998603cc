//! Hook Position Validator
//!
//! Reconciles the positions found by all string parsers so that the surviving
//! set never overlaps and nests correctly.

use super::position::HookPosition;
use crate::diagnostics::Diagnostics;

/// A position together with the parser that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionCandidate {
    pub parser_index: usize,
    pub parser_name: String,
    pub position: HookPosition,
}

impl PositionCandidate {
    pub fn new(parser_index: usize, parser_name: impl Into<String>, position: HookPosition) -> Self {
        PositionCandidate {
            parser_index,
            parser_name: parser_name.into(),
            position,
        }
    }
}

#[derive(Debug, Default)]
pub struct ValidationOutcome {
    /// Accepted candidates, ordered by opening tag start
    pub accepted: Vec<PositionCandidate>,
    pub diagnostics: Diagnostics,
}

/// Filters `candidates` down to a consistent set.
///
/// Candidates are considered in order of their opening tag. Each one is checked
/// against every candidate accepted so far and dropped with a warning if it
/// duplicates, overlaps or incorrectly nests with one of them.
pub fn validate_positions(mut candidates: Vec<PositionCandidate>) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::default();
    candidates.sort_by_key(|c| c.position.opening_tag_start_index);

    'candidates: for candidate in candidates {
        let pos = &candidate.position;
        if !pos.is_well_formed() {
            outcome.diagnostics.warn(format!(
                "Parser \"{}\" returned a malformed hook position {}. Ignoring",
                candidate.parser_name, pos
            ));
            continue;
        }

        for accepted in &outcome.accepted {
            if let Some(reason) = conflict(&accepted.position, pos) {
                outcome.diagnostics.warn(format!(
                    "{} Hook {} found by parser \"{}\" conflicts with hook {} found by parser \"{}\". Ignoring",
                    reason, pos, candidate.parser_name, accepted.position, accepted.parser_name
                ));
                continue 'candidates;
            }
        }

        outcome.accepted.push(candidate);
    }

    outcome
}

/// Why `next` cannot be accepted next to `accepted`, if at all. Assumes
/// `accepted` does not start after `next`.
fn conflict(accepted: &HookPosition, next: &HookPosition) -> Option<&'static str> {
    if accepted.opening_tag_start_index == next.opening_tag_start_index
        && accepted.opening_tag_end_index == next.opening_tag_end_index
    {
        return Some("Duplicate hook.");
    }

    if next.opening_tag_start_index < accepted.opening_tag_end_index {
        return Some("Overlapping opening tags.");
    }

    if let (Some(closing_start), Some(closing_end)) =
        (accepted.closing_tag_start_index, accepted.closing_tag_end_index)
    {
        if next.opening_tag_start_index < closing_end && next.opening_tag_end_index > closing_start {
            return Some("Opening tag overlaps a closing tag.");
        }

        if let (Some(next_closing_start), Some(next_closing_end)) =
            (next.closing_tag_start_index, next.closing_tag_end_index)
        {
            if next_closing_start < closing_end && next_closing_end > closing_start {
                return Some("Overlapping closing tags.");
            }
        }

        let starts_inside = next.opening_tag_start_index >= accepted.opening_tag_end_index
            && next.opening_tag_start_index < closing_start;
        if starts_inside && next.end() > closing_start {
            return Some("Incorrect nesting.");
        }
    }

    None
}
