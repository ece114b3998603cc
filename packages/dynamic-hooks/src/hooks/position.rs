use serde::{Deserialize, Serialize};
use std::fmt;

/// Location of a hook inside a searched string, as byte offsets.
///
/// Standalone hooks only have an opening tag; enclosing hooks also carry the
/// span of their closing tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookPosition {
    pub opening_tag_start_index: usize,
    pub opening_tag_end_index: usize,
    pub closing_tag_start_index: Option<usize>,
    pub closing_tag_end_index: Option<usize>,
}

impl HookPosition {
    pub fn standalone(start: usize, end: usize) -> Self {
        HookPosition {
            opening_tag_start_index: start,
            opening_tag_end_index: end,
            closing_tag_start_index: None,
            closing_tag_end_index: None,
        }
    }

    pub fn enclosing(opening: (usize, usize), closing: (usize, usize)) -> Self {
        HookPosition {
            opening_tag_start_index: opening.0,
            opening_tag_end_index: opening.1,
            closing_tag_start_index: Some(closing.0),
            closing_tag_end_index: Some(closing.1),
        }
    }

    pub fn is_enclosing(&self) -> bool {
        self.closing_tag_start_index.is_some()
    }

    /// Offset where the whole hook ends.
    pub fn end(&self) -> usize {
        self.closing_tag_end_index
            .unwrap_or(self.opening_tag_end_index)
    }

    /// Checks the ordering invariants of the four indices.
    pub fn is_well_formed(&self) -> bool {
        if self.opening_tag_start_index >= self.opening_tag_end_index {
            return false;
        }
        match (self.closing_tag_start_index, self.closing_tag_end_index) {
            (None, None) => true,
            (Some(start), Some(end)) => start >= self.opening_tag_end_index && end > start,
            _ => false,
        }
    }
}

impl fmt::Display for HookPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.closing_tag_start_index, self.closing_tag_end_index) {
            (Some(start), Some(end)) => write!(
                f,
                "[{}..{}]..[{}..{}]",
                self.opening_tag_start_index, self.opening_tag_end_index, start, end
            ),
            _ => write!(
                f,
                "[{}..{}]",
                self.opening_tag_start_index, self.opening_tag_end_index
            ),
        }
    }
}
