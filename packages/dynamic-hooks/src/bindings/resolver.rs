//! Binding Resolver
//!
//! Maps the raw bindings a parser extracted onto the inputs and outputs the
//! component declares, and evaluates them.

use std::cell::RefCell;
use std::rc::Rc;

use super::{BindingDescriptor, DomEvent, DomEventQueue, HookBindings};
use crate::component::{ComponentDefinition, InputDeclaration};
use crate::diagnostics::Diagnostics;
use crate::dom::NodeId;
use crate::expression::{evaluate, EvaluationOptions, Scope};
use crate::options::ParseOptions;
use crate::parsers::{BindingOptions, RawBindings};
use crate::util::{attribute_name_matches, dash_case_to_camel_case};
use crate::value::Value;

/// Everything resolution needs besides the bindings themselves.
pub struct BindingEnvironment<'a> {
    pub hook_id: usize,
    pub host_node: NodeId,
    pub context: &'a Value,
    pub options: &'a ParseOptions,
    pub dom_events: &'a DomEventQueue,
}

/// State shared with an output wrapper function. Refreshing a hook updates it in
/// place so the wrapper handed to the host never has to change.
#[derive(Debug)]
pub(crate) struct OutputState {
    pub raw: String,
    pub context: Value,
    pub evaluation: EvaluationOptions,
    pub hook_id: usize,
    pub host_node: NodeId,
    pub name: String,
    pub component: String,
    pub trigger_dom_events: bool,
    pub dom_events: DomEventQueue,
}

enum BindingKind {
    Input,
    Output,
}

impl BindingKind {
    fn label(&self) -> &'static str {
        match self {
            BindingKind::Input => "input",
            BindingKind::Output => "output",
        }
    }
}

/// Resolves `raw` against the declarations of `component`.
pub fn resolve_bindings(
    raw: &RawBindings,
    binding_options: &BindingOptions,
    component: &ComponentDefinition,
    env: &BindingEnvironment<'_>,
    diagnostics: &mut Diagnostics,
) -> HookBindings {
    let mut bindings = HookBindings::default();
    let evaluation = EvaluationOptions {
        allow_context_in_bindings: binding_options.allow_context_in_bindings,
        allow_context_function_calls: binding_options.allow_context_function_calls,
        unescape_strings: binding_options.unescape_strings,
    };

    for (name, input) in &raw.inputs {
        if !is_allowed(
            name,
            &binding_options.inputs_blacklist,
            &binding_options.inputs_whitelist,
        ) {
            diagnostics.debug(format!("Input \"{}\" of hook {} is not allowed. Ignoring", name, env.hook_id));
            continue;
        }

        let Some(property) = declared_name(
            name,
            &component.inputs,
            raw.from_element,
            env.options.ignore_input_aliases,
            env.options.accept_inputs_for_any_property,
        ) else {
            report_undeclared(diagnostics, BindingKind::Input, name, component, input.explicit);
            continue;
        };

        if !input.parse {
            bindings.inputs.insert(property, BindingDescriptor::new(&input.raw, Value::string(&input.raw)));
            continue;
        }

        match evaluate(&input.raw, &Scope::new(env.context), &evaluation) {
            Ok(result) => {
                bindings.inputs.insert(
                    property,
                    BindingDescriptor {
                        raw: input.raw.clone(),
                        value: result.value,
                        bound_context_variables: result.bound_context_variables,
                    },
                );
            }
            Err(err) => diagnostics.warn(format!(
                "Hook input parsing error for input \"{}\" of component {}: {}. Input is ignored",
                name, component.name, err
            )),
        }
    }

    for (name, raw_output) in &raw.outputs {
        if !is_allowed(
            name,
            &binding_options.outputs_blacklist,
            &binding_options.outputs_whitelist,
        ) {
            diagnostics.debug(format!("Output \"{}\" of hook {} is not allowed. Ignoring", name, env.hook_id));
            continue;
        }

        let Some(property) = declared_name(
            name,
            &component.outputs,
            raw.from_element,
            env.options.ignore_output_aliases,
            env.options.accept_outputs_for_any_observable,
        ) else {
            report_undeclared(diagnostics, BindingKind::Output, name, component, true);
            continue;
        };

        let state = Rc::new(RefCell::new(OutputState {
            raw: raw_output.clone(),
            context: env.context.clone(),
            evaluation,
            hook_id: env.hook_id,
            host_node: env.host_node,
            name: property.clone(),
            component: component.name.clone(),
            trigger_dom_events: env.options.trigger_dom_events,
            dom_events: env.dom_events.clone(),
        }));
        let wrapper = output_wrapper(state.clone());
        bindings
            .outputs
            .insert(property.clone(), BindingDescriptor::new(raw_output, wrapper));
        bindings.output_states.insert(property, state);
    }

    bindings
}

fn is_allowed(name: &str, blacklist: &Option<Vec<String>>, whitelist: &Option<Vec<String>>) -> bool {
    if blacklist.as_ref().is_some_and(|list| list.iter().any(|n| n == name)) {
        return false;
    }
    whitelist
        .as_ref()
        .map_or(true, |list| list.iter().any(|n| n == name))
}

/// The property a binding name refers to. Aliases are tried first unless they
/// are ignored.
fn declared_name(
    name: &str,
    declarations: &[InputDeclaration],
    from_element: bool,
    ignore_aliases: bool,
    accept_any: bool,
) -> Option<String> {
    let matches = |candidate: &str| {
        if from_element {
            attribute_name_matches(name, candidate)
        } else {
            name == candidate
        }
    };

    if !ignore_aliases {
        let by_alias = declarations
            .iter()
            .find(|d| d.alias.as_deref().is_some_and(&matches));
        if let Some(declaration) = by_alias {
            return Some(declaration.property.clone());
        }
    }

    if let Some(declaration) = declarations.iter().find(|d| matches(&d.property)) {
        return Some(declaration.property.clone());
    }

    if accept_any {
        return Some(if from_element {
            dash_case_to_camel_case(name)
        } else {
            name.to_string()
        });
    }
    None
}

fn report_undeclared(
    diagnostics: &mut Diagnostics,
    kind: BindingKind,
    name: &str,
    component: &ComponentDefinition,
    explicit: bool,
) {
    let message = format!(
        "Tried to bind {} \"{}\", but component {} has no such {}. Ignoring",
        kind.label(),
        name,
        component.name,
        kind.label()
    );
    if explicit {
        diagnostics.warn(message);
    } else {
        diagnostics.debug(message);
    }
}

/// Builds the function handed to the host for an output. Calling it evaluates
/// the output's current expression with `$event` bound to the first argument.
pub(crate) fn output_wrapper(state: Rc<RefCell<OutputState>>) -> Value {
    let name = format!("{}Handler", state.borrow().name);
    Value::function(name, move |args| {
        let event = args.first().cloned().unwrap_or_default();
        let (raw, context, evaluation) = {
            let state = state.borrow();
            (state.raw.clone(), state.context.clone(), state.evaluation)
        };

        let result = match evaluate(&raw, &Scope::new(&context).with_event(&event), &evaluation) {
            Ok(result) => result.value,
            Err(err) => {
                let state = state.borrow();
                tracing::error!(
                    "Error while handling output \"{}\" of component {}: {}",
                    state.name,
                    state.component,
                    err
                );
                Value::Undefined
            }
        };

        let state = state.borrow();
        if state.trigger_dom_events {
            state.dom_events.borrow_mut().push(DomEvent {
                hook_id: state.hook_id,
                host_node: state.host_node,
                name: state.name.clone(),
                detail: event,
            });
        }
        Ok(result)
    })
}

/// Points an existing output state at a freshly resolved one.
pub(crate) fn refresh_output_state(target: &Rc<RefCell<OutputState>>, fresh: &Rc<RefCell<OutputState>>) {
    let fresh = fresh.borrow();
    let mut target = target.borrow_mut();
    target.raw = fresh.raw.clone();
    target.context = fresh.context.clone();
    target.evaluation = fresh.evaluation;
    target.trigger_dom_events = fresh.trigger_dom_events;
}
