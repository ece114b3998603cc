//! Re-entrancy guard
//!
//! Parsing mutates the document, and a host that reacts to document changes by
//! parsing again would otherwise loop. Nodes are marked while they are being
//! parsed; parse requests for a marked node or anything inside it are skipped.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::dom::{Document, NodeId};

/// Shared set of the nodes currently being parsed.
#[derive(Debug, Clone, Default)]
pub struct ParsingRegistry {
    active: Rc<RefCell<HashSet<NodeId>>>,
}

impl ParsingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `node` until the returned guard is dropped. Returns `None` if the
    /// node is already marked.
    pub fn mark(&self, node: NodeId) -> Option<ParsingGuard> {
        if !self.active.borrow_mut().insert(node) {
            return None;
        }
        Some(ParsingGuard {
            registry: self.clone(),
            node,
        })
    }

    pub fn is_marked(&self, node: NodeId) -> bool {
        self.active.borrow().contains(&node)
    }

    /// True if `node` or one of its ancestors is marked.
    pub fn is_within_marked(&self, doc: &Document, node: NodeId) -> bool {
        let active = self.active.borrow();
        active.contains(&node) || doc.ancestors(node).any(|a| active.contains(&a))
    }

    pub fn is_empty(&self) -> bool {
        self.active.borrow().is_empty()
    }
}

/// Unmarks its node when dropped.
#[derive(Debug)]
pub struct ParsingGuard {
    registry: ParsingRegistry,
    node: NodeId,
}

impl ParsingGuard {
    pub fn node(&self) -> NodeId {
        self.node
    }
}

impl Drop for ParsingGuard {
    fn drop(&mut self) {
        self.registry.active.borrow_mut().remove(&self.node);
    }
}
