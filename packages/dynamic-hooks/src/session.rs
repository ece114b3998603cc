/**
 * Parse Session
 *
 * Owns a document, the loaded parsers and every hook found in the document.
 * A pass finds string hooks and element hooks below a node, assigns ids in
 * document order, resolves bindings and mounts the components through the
 * host. Refreshing re-resolves the bindings of mounted hooks and forwards the
 * inputs that actually changed.
 */
use indexmap::IndexMap;
use regex::{NoExpand, Regex};
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::bindings::{
    resolve_bindings, update_bindings, BindingEnvironment, DomEvent, DomEventQueue, HookBindings,
    PreviousHookBindings,
};
use crate::component::{
    ComponentHost, ComponentRegistry, ComponentSource, InputChange, InstanceHandle, LazyStatus,
    MountRequest, OutputCallback, PassthroughSanitizer, Sanitizer, SubscriptionHandle,
};
use crate::diagnostics::Diagnostics;
use crate::dom::{decode_entities, Document, NodeId, HOOK_ID_ATTRIBUTE, PARSE_TOKEN_ATTRIBUTE};
use crate::error::{ConfigError, HooksError, Result};
use crate::guard::ParsingRegistry;
use crate::hooks::{filter_element_hooks, find_string_hooks, PositionCandidate};
use crate::options::ParseOptions;
use crate::parsers::{resolve_parsers, HookValue, ParserEntry, ParserRecord};
use crate::util::escape_regex;
use crate::value::Value;

static NEXT_PARSE_TOKEN: AtomicU64 = AtomicU64::new(1);

fn next_parse_token() -> String {
    format!("{:08x}", NEXT_PARSE_TOKEN.fetch_add(1, Ordering::Relaxed))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountState {
    /// Waiting for a lazy component
    Pending,
    Mounted,
}

pub struct Hook {
    pub id: usize,
    pub parser: String,
    pub parser_index: usize,
    pub component: ComponentSource,
    pub value: HookValue,
    pub bindings: HookBindings,
    pub previous_bindings: Option<PreviousHookBindings>,
    pub instance: Option<InstanceHandle>,
    /// Anchor element of a string hook, or the element of an element hook
    pub host_node: NodeId,
    pub parent: Option<usize>,
    pub content_children: Vec<usize>,
    pub state: MountState,
    pub subscriptions: IndexMap<String, SubscriptionHandle>,
    pub injection_context: Option<Rc<dyn Any>>,
}

impl Hook {
    pub fn is_mounted(&self) -> bool {
        self.state == MountState::Mounted
    }
}

impl std::fmt::Debug for Hook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hook")
            .field("id", &self.id)
            .field("parser", &self.parser)
            .field("component", &self.component.display_name())
            .field("host_node", &self.host_node)
            .field("parent", &self.parent)
            .field("content_children", &self.content_children)
            .field("state", &self.state)
            .finish()
    }
}

/// The hooks of a session by id, in the order they were found.
#[derive(Debug, Default)]
pub struct HookIndex {
    hooks: IndexMap<usize, Hook>,
}

impl HookIndex {
    pub fn get(&self, id: usize) -> Option<&Hook> {
        self.hooks.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: usize) -> Option<&mut Hook> {
        self.hooks.get_mut(&id)
    }

    pub fn contains(&self, id: usize) -> bool {
        self.hooks.contains_key(&id)
    }

    pub fn ids(&self) -> Vec<usize> {
        self.hooks.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hook> {
        self.hooks.values()
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// The hook hosted by `node`.
    pub fn by_host(&self, node: NodeId) -> Option<&Hook> {
        self.hooks.values().find(|h| h.host_node == node)
    }

    fn insert(&mut self, hook: Hook) {
        self.hooks.insert(hook.id, hook);
    }

    fn remove(&mut self, id: usize) -> Option<Hook> {
        self.hooks.shift_remove(&id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookEvent {
    Mounted { id: usize },
    Destroyed { id: usize },
}

/// What caused a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    /// A regular change detection cycle of the host
    ChangeDetection,
    /// An explicit push, e.g. new context data
    Push,
}

#[derive(Debug, Default)]
pub struct ParseResult {
    pub hooks_added: Vec<usize>,
    pub hooks_removed: Vec<usize>,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Default)]
pub struct RefreshResult {
    /// Hooks whose inputs changed
    pub updated: Vec<usize>,
    pub changes: IndexMap<usize, Vec<InputChange>>,
    pub diagnostics: Diagnostics,
}

/// A hook found during a pass, before it has an id.
struct FoundHook {
    parser_index: usize,
    host_node: NodeId,
    value: HookValue,
    is_anchor: bool,
}

type Observer = Box<dyn FnMut(&HookEvent)>;

pub struct ParseSession {
    parsers: Vec<ParserRecord>,
    options: ParseOptions,
    host: Box<dyn ComponentHost>,
    sanitizer: Box<dyn Sanitizer>,
    context: Value,
    injection_context: Option<Rc<dyn Any>>,
    document: Document,
    hooks: HookIndex,
    next_hook_id: usize,
    parse_token: String,
    parsing: ParsingRegistry,
    dom_events: DomEventQueue,
    observers: Vec<Observer>,
}

impl ParseSession {
    pub fn new(
        entries: Vec<ParserEntry>,
        registry: &ComponentRegistry,
        options: ParseOptions,
        host: Box<dyn ComponentHost>,
    ) -> std::result::Result<Self, ConfigError> {
        let parsers = resolve_parsers(entries, registry)?;
        Ok(ParseSession {
            parsers,
            options,
            host,
            sanitizer: Box::new(PassthroughSanitizer),
            context: Value::Undefined,
            injection_context: None,
            document: Document::new(),
            hooks: HookIndex::default(),
            next_hook_id: 1,
            parse_token: next_parse_token(),
            parsing: ParsingRegistry::new(),
            dom_events: DomEventQueue::default(),
            observers: Vec::new(),
        })
    }

    pub fn with_sanitizer(mut self, sanitizer: impl Sanitizer + 'static) -> Self {
        self.sanitizer = Box::new(sanitizer);
        self
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = context;
        self
    }

    /// Handed to every mounted component whose parser does not provide its own.
    pub fn with_injection_context(mut self, injection_context: Rc<dyn Any>) -> Self {
        self.injection_context = Some(injection_context);
        self
    }

    /// Replaces the context. Takes effect on the next refresh or pass.
    pub fn set_context(&mut self, context: Value) {
        self.context = context;
    }

    pub fn context(&self) -> &Value {
        &self.context
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn parsers(&self) -> &[ParserRecord] {
        &self.parsers
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn root(&self) -> NodeId {
        self.document.root()
    }

    pub fn hook_index(&self) -> &HookIndex {
        &self.hooks
    }

    pub fn hook(&self, id: usize) -> Option<&Hook> {
        self.hooks.get(id)
    }

    /// Token written to the anchors of the current document
    pub fn parse_token(&self) -> &str {
        &self.parse_token
    }

    /// Shared with hosts that need to know which nodes are being parsed.
    pub fn parsing_registry(&self) -> ParsingRegistry {
        self.parsing.clone()
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&HookEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Drains the DOM events queued by output emissions.
    pub fn take_dom_events(&mut self) -> Vec<DomEvent> {
        std::mem::take(&mut *self.dom_events.borrow_mut())
    }

    /// Replaces the document with `content` and parses it. All existing hooks
    /// are destroyed first.
    pub fn parse(&mut self, content: &str) -> ParseResult {
        let hooks_removed = self.destroy();

        let mut html = if self.options.sanitize {
            self.sanitizer.sanitize(content)
        } else {
            content.to_string()
        };
        if self.options.fix_paragraph_tags {
            html = self.fix_paragraph_tags(&html);
        }

        self.reset_document(Document::parse(&html));
        let mut result = self.guarded_pass(self.document.root());
        result.hooks_removed = hooks_removed;
        result
    }

    /// Like [`ParseSession::parse`], for a document the caller built. Content is
    /// not sanitized.
    pub fn parse_document(&mut self, document: Document) -> ParseResult {
        let hooks_removed = self.destroy();
        self.reset_document(document);
        let mut result = self.guarded_pass(self.document.root());
        result.hooks_removed = hooks_removed;
        result
    }

    /// Parses the whole document again, keeping the hooks whose host is still
    /// attached.
    pub fn reparse(&mut self) -> Result<ParseResult> {
        self.reparse_node(self.document.root())
    }

    /// Parses the subtree of `node` again. Hooks whose host node was removed
    /// from the document are destroyed, new hooks are added.
    pub fn reparse_node(&mut self, node: NodeId) -> Result<ParseResult> {
        if !self.document.is_attached(node) {
            return Err(HooksError::Dom {
                message: format!("node {} is not attached to the document", node),
            });
        }

        if self.parsing.is_within_marked(&self.document, node) {
            let mut result = ParseResult::default();
            result
                .diagnostics
                .debug(format!("Node {} is already being parsed. Skipping", node));
            return Ok(result);
        }

        let detached: Vec<usize> = self
            .hooks
            .iter()
            .filter(|h| !self.document.is_attached(h.host_node))
            .map(|h| h.id)
            .collect();
        for id in detached.iter().rev() {
            self.destroy_hook(*id);
        }

        let mut result = self.guarded_pass(node);
        result.hooks_removed = detached;
        Ok(result)
    }

    /// Mounts the hooks whose lazy component has settled since the last pass.
    /// Hooks whose component failed to load are removed.
    pub fn settle_lazy_components(&mut self) -> ParseResult {
        let mut result = ParseResult::default();
        let pending: Vec<(usize, LazyStatus)> = self
            .hooks
            .iter()
            .filter(|h| h.state == MountState::Pending)
            .filter_map(|h| match &h.component {
                ComponentSource::Lazy(lazy) => Some((h.id, lazy.status())),
                ComponentSource::Resolved(_) => None,
            })
            .collect();

        for (id, status) in pending {
            match status {
                LazyStatus::Pending => {}
                LazyStatus::Resolved(_) => {
                    if self.mount_hook(id, &mut result.diagnostics) {
                        result.hooks_added.push(id);
                    } else {
                        result.hooks_removed.push(id);
                    }
                }
                LazyStatus::Failed(message) => {
                    let name = self.hooks.get(id).map(|h| h.component.display_name()).unwrap_or_default();
                    result.diagnostics.error(format!(
                        "Lazy component {} of hook {} failed to load: {}. The hook is removed",
                        name, id, message
                    ));
                    self.remove_failed_hook(id);
                    result.hooks_removed.push(id);
                }
            }
        }
        result
    }

    /// Re-resolves the bindings of every mounted hook and forwards changed
    /// inputs to the host.
    pub fn refresh(&mut self, trigger: RefreshTrigger) -> RefreshResult {
        let mut result = RefreshResult::default();
        if trigger == RefreshTrigger::ChangeDetection && self.options.update_on_push_only {
            return result;
        }

        for id in self.hooks.ids() {
            let Some(hook) = self.hooks.get(id) else {
                continue;
            };
            let (Some(instance), Some(definition)) = (hook.instance, hook.component.definition()) else {
                continue;
            };

            let record = &self.parsers[hook.parser_index];
            let raw = record.parser.get_bindings(id, &hook.value, &self.context);
            let env = BindingEnvironment {
                hook_id: id,
                host_node: hook.host_node,
                context: &self.context,
                options: &self.options,
                dom_events: &self.dom_events,
            };
            let fresh = resolve_bindings(
                &raw,
                &record.parser.binding_options(),
                &definition,
                &env,
                &mut result.diagnostics,
            );

            let Some(hook) = self.hooks.get_mut(id) else {
                continue;
            };
            hook.previous_bindings = Some(hook.bindings.clone());
            let update = update_bindings(
                &mut hook.bindings,
                fresh,
                &self.options,
                &definition.name,
                &mut result.diagnostics,
            );

            for name in &update.removed_outputs {
                if let Some(subscription) = hook.subscriptions.shift_remove(name) {
                    self.host.unsubscribe(subscription);
                }
            }
            subscribe_outputs(
                self.host.as_mut(),
                instance,
                hook,
                &update.added_outputs,
                &mut result.diagnostics,
            );

            if !update.changed_inputs.is_empty() {
                if let Err(err) = self.host.apply_binding_changes(instance, &update.changed_inputs) {
                    result.diagnostics.error(format!(
                        "Applying input changes to component {} of hook {} failed: {}",
                        definition.name, id, err
                    ));
                }
                result.updated.push(id);
                result.changes.insert(id, update.changed_inputs);
            }
        }
        result
    }

    /// Destroys every hook. Returns the ids of the destroyed hooks.
    pub fn destroy(&mut self) -> Vec<usize> {
        let ids = self.hooks.ids();
        for id in ids.iter().rev() {
            self.destroy_hook(*id);
        }
        ids
    }

    fn reset_document(&mut self, document: Document) {
        self.document = document;
        self.parse_token = next_parse_token();
        self.dom_events.borrow_mut().clear();
    }

    fn destroy_hook(&mut self, id: usize) {
        let Some(hook) = self.hooks.remove(id) else {
            return;
        };
        for (_, subscription) in hook.subscriptions {
            self.host.unsubscribe(subscription);
        }
        if let Some(instance) = hook.instance {
            self.host.destroy(instance);
        }
        if let Some(parent) = hook.parent.and_then(|p| self.hooks.get_mut(p)) {
            parent.content_children.retain(|c| *c != id);
        }
        tracing::debug!("Destroyed hook {} ({})", id, hook.component.display_name());
        self.emit(HookEvent::Destroyed { id });
    }

    fn emit(&mut self, event: HookEvent) {
        for observer in &mut self.observers {
            observer(&event);
        }
    }

    /// Removes `<p>` elements whose only content is a string hook tag.
    fn fix_paragraph_tags(&self, html: &str) -> String {
        let mut scratch = Diagnostics::new();
        let mut tags: Vec<&str> = Vec::new();
        for record in self.parsers.iter().filter(|r| r.finds_strings()) {
            for position in record.parser.find_hooks(html, &self.context, &mut scratch) {
                tags.push(&html[position.opening_tag_start_index..position.opening_tag_end_index]);
                if let (Some(start), Some(end)) = (position.closing_tag_start_index, position.closing_tag_end_index) {
                    tags.push(&html[start..end]);
                }
            }
        }
        tags.sort_unstable();
        tags.dedup();

        let mut fixed = html.to_string();
        for tag in tags {
            let pattern = format!(r"(?i)<p(?:\s[^>]*)?>\s*{}\s*</p\s*>", escape_regex(tag));
            match Regex::new(&pattern) {
                Ok(regex) => fixed = regex.replace_all(&fixed, NoExpand(tag)).into_owned(),
                Err(err) => tracing::debug!("Could not remove paragraph around \"{}\": {}", tag, err),
            }
        }
        fixed
    }

    fn guarded_pass(&mut self, root: NodeId) -> ParseResult {
        let Some(_guard) = self.parsing.mark(root) else {
            let mut result = ParseResult::default();
            result
                .diagnostics
                .debug(format!("Node {} is already being parsed. Skipping", root));
            return result;
        };
        self.run_pass(root)
    }

    fn run_pass(&mut self, root: NodeId) -> ParseResult {
        let mut result = ParseResult::default();
        let found = self.find_hooks(root, &mut result.diagnostics);
        let new_ids = self.register_hooks(found, &mut result.diagnostics);

        for id in new_ids {
            let Some(hook) = self.hooks.get(id) else {
                continue;
            };
            match &hook.component {
                ComponentSource::Lazy(lazy) => match lazy.status() {
                    LazyStatus::Pending => {
                        result
                            .diagnostics
                            .debug(format!("Hook {} waits for lazy component {}", id, lazy.import_name()));
                        result.hooks_added.push(id);
                        continue;
                    }
                    LazyStatus::Failed(message) => {
                        result.diagnostics.error(format!(
                            "Lazy component {} of hook {} failed to load: {}. The hook is removed",
                            lazy.import_name(),
                            id,
                            message
                        ));
                        self.remove_failed_hook(id);
                        continue;
                    }
                    LazyStatus::Resolved(_) => {}
                },
                ComponentSource::Resolved(_) => {}
            }
            if self.mount_hook(id, &mut result.diagnostics) {
                result.hooks_added.push(id);
            }
        }
        result
    }

    /// String hooks and element hooks below `root`, in document order.
    fn find_hooks(&mut self, root: NodeId, diagnostics: &mut Diagnostics) -> Vec<FoundHook> {
        let parsers = self.parsers.clone();
        let context = self.context.clone();
        let parsing = self.parsing.clone();
        let is_marked = |node: NodeId| node != root && parsing.is_marked(node);

        let strings = find_string_hooks(
            &mut self.document,
            root,
            |content, diagnostics| {
                let mut candidates = Vec::new();
                for (index, record) in parsers.iter().enumerate().filter(|(_, r)| r.finds_strings()) {
                    for position in record.parser.find_hooks(content, &context, diagnostics) {
                        candidates.push(PositionCandidate::new(index, record.name.clone(), position));
                    }
                }
                candidates
            },
            &is_marked,
        );
        diagnostics.append(strings.diagnostics);

        let mut found: Vec<FoundHook> = strings
            .hooks
            .into_iter()
            .map(|hook| FoundHook {
                parser_index: hook.parser_index,
                host_node: hook.anchor,
                value: HookValue::Text {
                    opening_tag: hook.opening_tag,
                    closing_tag: hook.closing_tag,
                },
                is_anchor: true,
            })
            .collect();

        let doc = &self.document;
        let hosts: HashSet<NodeId> = self.hooks.iter().map(|h| h.host_node).collect();
        let in_marked_subtree = |node: NodeId| {
            is_marked(node)
                || doc
                    .ancestors(node)
                    .take_while(|a| *a != root)
                    .any(|a| parsing.is_marked(a))
        };
        let candidates: Vec<(usize, &str, Vec<NodeId>)> = parsers
            .iter()
            .enumerate()
            .filter(|(_, r)| r.finds_elements())
            .map(|(index, r)| (index, r.name.as_str(), r.parser.find_hook_elements(doc, root, &context)))
            .collect();
        let elements = filter_element_hooks(doc, root, candidates, &hosts, in_marked_subtree, diagnostics);
        for element in elements {
            if let Some(data) = doc.element(element.node) {
                found.push(FoundHook {
                    parser_index: element.parser_index,
                    host_node: element.node,
                    value: HookValue::Element(data.clone()),
                    is_anchor: false,
                });
            }
        }

        let order: HashMap<NodeId, usize> = doc
            .descendants(root)
            .into_iter()
            .enumerate()
            .map(|(i, n)| (n, i))
            .collect();
        found.sort_by_key(|f| order.get(&f.host_node).copied().unwrap_or(usize::MAX));
        found
    }

    /// Gives every found hook an id, loads its component and links it into the
    /// hook tree. Returns the new ids in document order.
    fn register_hooks(&mut self, found: Vec<FoundHook>, diagnostics: &mut Diagnostics) -> Vec<usize> {
        let mut new_ids = Vec::with_capacity(found.len());

        for hook in found {
            let id = self.next_hook_id;
            self.next_hook_id += 1;

            let record = &self.parsers[hook.parser_index];
            let value = match hook.value {
                HookValue::Text { opening_tag, closing_tag } if self.options.convert_html_entities => HookValue::Text {
                    opening_tag: decode_entities(&opening_tag),
                    closing_tag: closing_tag.map(|t| decode_entities(&t)),
                },
                other => other,
            };
            let loaded = record.parser.load_component(id, &value, &self.context);

            if hook.is_anchor {
                let token = self.parse_token.clone();
                if let Some(anchor) = self.document.element_mut(hook.host_node) {
                    anchor.set_attribute(HOOK_ID_ATTRIBUTE, &id.to_string());
                    anchor.set_attribute(PARSE_TOKEN_ATTRIBUTE, &token);
                    if let Some(tag) = &loaded.host_element_tag {
                        anchor.name = tag.clone();
                    }
                }
            }

            diagnostics.debug(format!(
                "Found hook {} ({}) for component {} with parser \"{}\"",
                id,
                value.describe(),
                loaded.component.display_name(),
                record.name
            ));

            self.hooks.insert(Hook {
                id,
                parser: record.name.clone(),
                parser_index: hook.parser_index,
                component: loaded.component,
                value,
                bindings: HookBindings::default(),
                previous_bindings: None,
                instance: None,
                host_node: hook.host_node,
                parent: None,
                content_children: Vec::new(),
                state: MountState::Pending,
                subscriptions: IndexMap::new(),
                injection_context: loaded.injection_context.or_else(|| self.injection_context.clone()),
            });
            new_ids.push(id);
        }

        let hosts: HashMap<NodeId, usize> = self.hooks.iter().map(|h| (h.host_node, h.id)).collect();
        for id in &new_ids {
            let Some(host_node) = self.hooks.get(*id).map(|h| h.host_node) else {
                continue;
            };
            let parent = self.document.ancestors(host_node).find_map(|a| hosts.get(&a).copied());
            if let Some(hook) = self.hooks.get_mut(*id) {
                hook.parent = parent;
            }
            if let Some(parent) = parent.and_then(|p| self.hooks.get_mut(p)) {
                parent.content_children.push(*id);
            }
        }
        new_ids
    }

    /// Resolves the bindings of a hook and mounts its component. On failure the
    /// hook is removed and `false` returned.
    fn mount_hook(&mut self, id: usize, diagnostics: &mut Diagnostics) -> bool {
        let Some(hook) = self.hooks.get(id) else {
            return false;
        };
        let Some(definition) = hook.component.definition() else {
            return false;
        };

        let record = &self.parsers[hook.parser_index];
        let raw = record.parser.get_bindings(id, &hook.value, &self.context);
        let env = BindingEnvironment {
            hook_id: id,
            host_node: hook.host_node,
            context: &self.context,
            options: &self.options,
            dom_events: &self.dom_events,
        };
        let bindings = resolve_bindings(&raw, &record.parser.binding_options(), &definition, &env, diagnostics);

        let request = MountRequest {
            hook_id: id,
            component: definition.clone(),
            anchor: hook.host_node,
            document: &self.document,
            inputs: bindings.input_values(),
            content_children: hook.content_children.clone(),
            injection_context: hook.injection_context.clone(),
        };
        let instance = match self.host.mount(request) {
            Ok(instance) => instance,
            Err(source) => {
                let err = HooksError::Mount {
                    hook_id: id,
                    component: definition.name.clone(),
                    source,
                };
                diagnostics.error(format!("{}. The hook is removed", err));
                self.remove_failed_hook(id);
                return false;
            }
        };

        let Some(hook) = self.hooks.get_mut(id) else {
            return false;
        };
        let outputs: Vec<String> = bindings.outputs.keys().cloned().collect();
        hook.bindings = bindings;
        hook.instance = Some(instance);
        hook.state = MountState::Mounted;
        subscribe_outputs(self.host.as_mut(), instance, hook, &outputs, diagnostics);

        tracing::debug!("Mounted component {} for hook {}", definition.name, id);
        self.emit(HookEvent::Mounted { id });
        true
    }

    /// Drops a hook that could not be mounted. Its child hooks move up to its
    /// parent; the anchor stays in the document without hook attributes.
    fn remove_failed_hook(&mut self, id: usize) {
        let Some(hook) = self.hooks.remove(id) else {
            return;
        };
        for child in &hook.content_children {
            if let Some(child) = self.hooks.get_mut(*child) {
                child.parent = hook.parent;
            }
        }
        if let Some(parent) = hook.parent.and_then(|p| self.hooks.get_mut(p)) {
            parent.content_children = parent
                .content_children
                .iter()
                .flat_map(|c| if *c == id { hook.content_children.clone() } else { vec![*c] })
                .collect();
        }
        if let Some(anchor) = self.document.element_mut(hook.host_node) {
            anchor.remove_attribute(HOOK_ID_ATTRIBUTE);
            anchor.remove_attribute(PARSE_TOKEN_ATTRIBUTE);
        }
    }
}

fn subscribe_outputs(
    host: &mut dyn ComponentHost,
    instance: InstanceHandle,
    hook: &mut Hook,
    names: &[String],
    diagnostics: &mut Diagnostics,
) {
    for name in names {
        let Some(descriptor) = hook.bindings.outputs.get(name) else {
            continue;
        };
        match host.subscribe_output(instance, name, output_callback(name, descriptor.value.clone())) {
            Ok(subscription) => {
                hook.subscriptions.insert(name.clone(), subscription);
            }
            Err(err) => diagnostics.warn(format!(
                "Could not subscribe to output \"{}\" of hook {}: {}",
                name, hook.id, err
            )),
        }
    }
}

fn output_callback(name: &str, wrapper: Value) -> OutputCallback {
    let name = name.to_string();
    Rc::new(move |event: &Value| {
        if let Some(Err(err)) = wrapper.call(std::slice::from_ref(event)) {
            tracing::error!("Output \"{}\" failed: {}", name, err);
        }
    })
}
