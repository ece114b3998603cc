/**
 * Hooks Module
 *
 * Finding hook positions in text and elements, reconciling them, and replacing
 * string hooks with anchor elements.
 */
pub mod finder;
pub mod position;
pub mod string_finder;
pub mod tag_finder;
pub mod validator;

pub use finder::{find_enclosing_hooks, find_standalone_hooks, FinderOutcome};
pub use position::HookPosition;
pub use string_finder::{collect_text, find_string_hooks, StringFinderOutcome, StringHookMatch};
pub use tag_finder::{filter_element_hooks, ElementMatch};
pub use validator::{validate_positions, PositionCandidate, ValidationOutcome};
