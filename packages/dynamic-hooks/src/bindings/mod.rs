/**
 * Bindings Module
 *
 * Resolving the raw bindings of a hook into values, and deciding on every
 * refresh which of them actually changed.
 */
pub mod resolver;
pub mod updater;

use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

use crate::dom::NodeId;
use crate::value::Value;

pub use resolver::{resolve_bindings, BindingEnvironment};
pub use updater::{update_bindings, BindingUpdate};

/// One input or output of a hook.
#[derive(Debug, Clone)]
pub struct BindingDescriptor {
    pub raw: String,
    pub value: Value,
    pub bound_context_variables: IndexMap<String, Value>,
}

impl BindingDescriptor {
    pub fn new(raw: impl Into<String>, value: Value) -> Self {
        BindingDescriptor {
            raw: raw.into(),
            value,
            bound_context_variables: IndexMap::new(),
        }
    }
}

/// All bindings of a hook, keyed by the component's property names.
#[derive(Debug, Clone, Default)]
pub struct HookBindings {
    pub inputs: IndexMap<String, BindingDescriptor>,
    pub outputs: IndexMap<String, BindingDescriptor>,
    pub(crate) output_states: IndexMap<String, Rc<RefCell<resolver::OutputState>>>,
}

/// Snapshot of the bindings of the previous pass
pub type PreviousHookBindings = HookBindings;

impl HookBindings {
    pub fn input_values(&self) -> IndexMap<String, Value> {
        self.inputs
            .iter()
            .map(|(name, descriptor)| (name.clone(), descriptor.value.clone()))
            .collect()
    }
}

/// An output emission forwarded as a DOM event on the hook's host node.
#[derive(Debug, Clone)]
pub struct DomEvent {
    pub hook_id: usize,
    pub host_node: NodeId,
    pub name: String,
    pub detail: Value,
}

pub type DomEventQueue = Rc<RefCell<Vec<DomEvent>>>;
