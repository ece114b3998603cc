//! Test utilities
//!
//! A component host that records every call it receives, and shortcuts for
//! building sessions.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use dynamic_hooks::{
    ComponentDefinition, ComponentHost, ComponentRegistry, InputChange, InputDeclaration,
    InstanceHandle, MountRequest, NodeId, OutputCallback, ParseOptions, ParseSession,
    ParserEntry, SubscriptionHandle, Value,
};

/// A mount as the host saw it.
#[derive(Debug, Clone)]
pub struct MountRecord {
    pub hook_id: usize,
    pub component: String,
    pub instance: InstanceHandle,
    pub anchor: NodeId,
    pub inputs: IndexMap<String, Value>,
    pub content_children: Vec<usize>,
}

pub struct OutputSubscription {
    pub instance: InstanceHandle,
    pub name: String,
    pub handle: SubscriptionHandle,
    pub callback: OutputCallback,
}

#[derive(Default)]
pub struct HostLog {
    next_handle: u64,
    pub mounts: Vec<MountRecord>,
    pub changes: Vec<(InstanceHandle, Vec<InputChange>)>,
    pub subscriptions: Vec<OutputSubscription>,
    pub unsubscribed: Vec<SubscriptionHandle>,
    pub destroyed: Vec<InstanceHandle>,
    /// Mounting a component with this name fails
    pub failing_component: Option<String>,
}

impl HostLog {
    fn next(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    pub fn mount_of(&self, hook_id: usize) -> Option<&MountRecord> {
        self.mounts.iter().find(|m| m.hook_id == hook_id)
    }

    /// Input changes delivered to `instance`, flattened.
    pub fn changes_for(&self, instance: InstanceHandle) -> Vec<InputChange> {
        self.changes
            .iter()
            .filter(|(i, _)| *i == instance)
            .flat_map(|(_, changes)| changes.clone())
            .collect()
    }

    pub fn callback(&self, instance: InstanceHandle, name: &str) -> Option<OutputCallback> {
        self.subscriptions
            .iter()
            .rev()
            .find(|s| s.instance == instance && s.name == name && !self.unsubscribed.contains(&s.handle))
            .map(|s| s.callback.clone())
    }
}

pub type SharedHostLog = Rc<RefCell<HostLog>>;

pub struct RecordingHost {
    log: SharedHostLog,
}

impl ComponentHost for RecordingHost {
    fn mount(&mut self, request: MountRequest<'_>) -> anyhow::Result<InstanceHandle> {
        let mut log = self.log.borrow_mut();
        if log.failing_component.as_deref() == Some(request.component.name.as_str()) {
            anyhow::bail!("constructor of {} threw", request.component.name);
        }
        let instance = InstanceHandle(log.next());
        log.mounts.push(MountRecord {
            hook_id: request.hook_id,
            component: request.component.name.clone(),
            instance,
            anchor: request.anchor,
            inputs: request.inputs,
            content_children: request.content_children,
        });
        Ok(instance)
    }

    fn apply_binding_changes(&mut self, instance: InstanceHandle, changes: &[InputChange]) -> anyhow::Result<()> {
        self.log.borrow_mut().changes.push((instance, changes.to_vec()));
        Ok(())
    }

    fn subscribe_output(
        &mut self,
        instance: InstanceHandle,
        name: &str,
        callback: OutputCallback,
    ) -> anyhow::Result<SubscriptionHandle> {
        let mut log = self.log.borrow_mut();
        let handle = SubscriptionHandle(log.next());
        log.subscriptions.push(OutputSubscription {
            instance,
            name: name.to_string(),
            handle,
            callback,
        });
        Ok(handle)
    }

    fn unsubscribe(&mut self, subscription: SubscriptionHandle) {
        self.log.borrow_mut().unsubscribed.push(subscription);
    }

    fn destroy(&mut self, instance: InstanceHandle) {
        self.log.borrow_mut().destroyed.push(instance);
    }
}

pub fn recording_host() -> (Box<dyn ComponentHost>, SharedHostLog) {
    let log = SharedHostLog::default();
    (Box::new(RecordingHost { log: log.clone() }), log)
}

/// Emits `event` on an output of a mounted instance. Returns false if nothing
/// is subscribed.
pub fn emit(log: &SharedHostLog, instance: InstanceHandle, output: &str, event: Value) -> bool {
    let callback = log.borrow().callback(instance, output);
    match callback {
        Some(callback) => {
            callback(&event);
            true
        }
        None => false,
    }
}

pub fn hero_component() -> ComponentDefinition {
    ComponentDefinition::new("HeroComponent")
        .with_selector("app-hero")
        .with_input(InputDeclaration::new("name"))
        .with_input(InputDeclaration::new("items"))
        .with_input(InputDeclaration::aliased("sideOfTheForce", "side"))
        .with_output(InputDeclaration::new("saved"))
}

pub fn box_component() -> ComponentDefinition {
    ComponentDefinition::new("BoxComponent")
        .with_selector("app-box")
        .with_input(InputDeclaration::new("title"))
}

pub fn session_with(entries: Vec<ParserEntry>, options: ParseOptions) -> (ParseSession, SharedHostLog) {
    let (host, log) = recording_host();
    let session = ParseSession::new(entries, &ComponentRegistry::new(), options, host)
        .expect("parser configuration is valid");
    (session, log)
}
