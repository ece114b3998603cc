//! Components and host collaborators
//!
//! The engine decides *which* component goes *where* and with *which* bindings;
//! creating and rendering component instances is up to the [`ComponentHost`].

use indexmap::IndexMap;
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::dom::{Document, NodeId};
use crate::value::Value;

/// A declared input, optionally exposed under an alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDeclaration {
    pub property: String,
    pub alias: Option<String>,
}

pub type OutputDeclaration = InputDeclaration;

impl InputDeclaration {
    pub fn new(property: impl Into<String>) -> Self {
        InputDeclaration {
            property: property.into(),
            alias: None,
        }
    }

    pub fn aliased(property: impl Into<String>, alias: impl Into<String>) -> Self {
        InputDeclaration {
            property: property.into(),
            alias: Some(alias.into()),
        }
    }
}

/// What the engine needs to know about a component class.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComponentDefinition {
    pub name: String,
    /// Default selector used when a parser config does not give one
    pub selector: Option<String>,
    pub inputs: Vec<InputDeclaration>,
    pub outputs: Vec<OutputDeclaration>,
}

impl ComponentDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        ComponentDefinition {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    pub fn with_input(mut self, input: InputDeclaration) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn with_output(mut self, output: OutputDeclaration) -> Self {
        self.outputs.push(output);
        self
    }
}

#[derive(Debug, Clone)]
enum LazyState {
    Pending,
    Resolved(Rc<ComponentDefinition>),
    Failed(String),
}

/// Settlement state of a [`LazyComponent`].
#[derive(Debug, Clone)]
pub enum LazyStatus {
    Pending,
    Resolved(Rc<ComponentDefinition>),
    Failed(String),
}

/// A component that becomes available later, e.g. once a bundle is loaded.
#[derive(Clone)]
pub struct LazyComponent {
    import_name: Rc<str>,
    state: Rc<RefCell<LazyState>>,
}

/// Settles the [`LazyComponent`] it was created with.
pub struct LazyResolver {
    state: Rc<RefCell<LazyState>>,
}

impl LazyComponent {
    pub fn new(import_name: &str) -> (LazyComponent, LazyResolver) {
        let state = Rc::new(RefCell::new(LazyState::Pending));
        (
            LazyComponent {
                import_name: Rc::from(import_name),
                state: state.clone(),
            },
            LazyResolver { state },
        )
    }

    pub fn import_name(&self) -> &str {
        &self.import_name
    }

    pub fn status(&self) -> LazyStatus {
        match &*self.state.borrow() {
            LazyState::Pending => LazyStatus::Pending,
            LazyState::Resolved(def) => LazyStatus::Resolved(def.clone()),
            LazyState::Failed(msg) => LazyStatus::Failed(msg.clone()),
        }
    }

    pub fn is_settled(&self) -> bool {
        !matches!(&*self.state.borrow(), LazyState::Pending)
    }
}

impl fmt::Debug for LazyComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyComponent")
            .field("import_name", &self.import_name)
            .field("state", &*self.state.borrow())
            .finish()
    }
}

impl LazyResolver {
    pub fn resolve(self, definition: ComponentDefinition) {
        *self.state.borrow_mut() = LazyState::Resolved(Rc::new(definition));
    }

    pub fn reject(self, message: impl Into<String>) {
        *self.state.borrow_mut() = LazyState::Failed(message.into());
    }
}

#[derive(Debug, Clone)]
pub enum ComponentSource {
    Resolved(Rc<ComponentDefinition>),
    Lazy(LazyComponent),
}

impl ComponentSource {
    /// The definition, if it is available now.
    pub fn definition(&self) -> Option<Rc<ComponentDefinition>> {
        match self {
            ComponentSource::Resolved(def) => Some(def.clone()),
            ComponentSource::Lazy(lazy) => match lazy.status() {
                LazyStatus::Resolved(def) => Some(def),
                _ => None,
            },
        }
    }

    /// Component name for messages.
    pub fn display_name(&self) -> String {
        match self {
            ComponentSource::Resolved(def) => def.name.clone(),
            ComponentSource::Lazy(lazy) => match lazy.status() {
                LazyStatus::Resolved(def) => def.name.clone(),
                _ => lazy.import_name().to_string(),
            },
        }
    }
}

impl From<ComponentDefinition> for ComponentSource {
    fn from(definition: ComponentDefinition) -> Self {
        ComponentSource::Resolved(Rc::new(definition))
    }
}

impl From<LazyComponent> for ComponentSource {
    fn from(lazy: LazyComponent) -> Self {
        ComponentSource::Lazy(lazy)
    }
}

/// Components that JSON parser configs can refer to by name.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    components: IndexMap<String, ComponentSource>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, source: impl Into<ComponentSource>) {
        self.components.insert(name.into(), source.into());
    }

    pub fn get(&self, name: &str) -> Option<&ComponentSource> {
        self.components.get(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(pub u64);

/// Invoked by the host whenever a subscribed output emits.
pub type OutputCallback = Rc<dyn Fn(&Value)>;

pub struct MountRequest<'a> {
    pub hook_id: usize,
    pub component: Rc<ComponentDefinition>,
    /// Element the component is rendered into
    pub anchor: NodeId,
    pub document: &'a Document,
    pub inputs: IndexMap<String, Value>,
    /// Ids of the hooks directly inside this one
    pub content_children: Vec<usize>,
    pub injection_context: Option<Rc<dyn Any>>,
}

/// A changed input, delivered to the host after a refresh.
#[derive(Debug, Clone)]
pub struct InputChange {
    pub name: String,
    pub previous: Option<Value>,
    pub current: Value,
    pub first_change: bool,
}

pub trait ComponentHost {
    fn mount(&mut self, request: MountRequest<'_>) -> anyhow::Result<InstanceHandle>;

    fn apply_binding_changes(
        &mut self,
        instance: InstanceHandle,
        changes: &[InputChange],
    ) -> anyhow::Result<()>;

    fn subscribe_output(
        &mut self,
        instance: InstanceHandle,
        name: &str,
        callback: OutputCallback,
    ) -> anyhow::Result<SubscriptionHandle>;

    fn unsubscribe(&mut self, subscription: SubscriptionHandle);

    fn destroy(&mut self, instance: InstanceHandle);
}

pub trait Sanitizer {
    fn sanitize(&self, html: &str) -> String;
}

/// Leaves content untouched. Installed when no sanitizer is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughSanitizer;

impl Sanitizer for PassthroughSanitizer {
    fn sanitize(&self, html: &str) -> String {
        html.to_string()
    }
}
