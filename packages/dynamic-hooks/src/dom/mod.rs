/**
 * DOM Module
 *
 * The minimal document model the hook finders walk and mutate.
 */
pub mod entities;
pub mod html_parser;
pub mod node;
pub mod selector;
pub mod serializer;

pub use entities::decode_entities;
pub use node::{Attribute, Document, ElementData, NodeData, NodeId};
pub use selector::{CssSelector, SelectorList};

/// Tag name of the elements string hooks are replaced with
pub const ANCHOR_TAG: &str = "dynamic-component-anchor";
pub const HOOK_ID_ATTRIBUTE: &str = "data-hook-id";
pub const PARSE_TOKEN_ATTRIBUTE: &str = "data-parse-token";
