//! Binding Update Engine
//!
//! Merges freshly resolved bindings into the current ones. A binding keeps its
//! previous value reference unless its expression text changed or a context
//! variable it references now resolves to a different reference. With
//! `compare_inputs_by_value`, differing references are compared by their
//! serialized contents before a new value is adopted.

use indexmap::IndexMap;

use super::resolver::refresh_output_state;
use super::{BindingDescriptor, HookBindings};
use crate::component::InputChange;
use crate::diagnostics::Diagnostics;
use crate::expression::detailed_stringify;
use crate::options::ParseOptions;
use crate::value::Value;

#[derive(Debug, Default)]
pub struct BindingUpdate {
    /// Inputs whose value is no longer the same reference
    pub changed_inputs: Vec<InputChange>,
    /// Outputs that appeared since the previous pass
    pub added_outputs: Vec<String>,
    /// Outputs that are no longer bound
    pub removed_outputs: Vec<String>,
}

impl BindingUpdate {
    pub fn is_empty(&self) -> bool {
        self.changed_inputs.is_empty() && self.added_outputs.is_empty() && self.removed_outputs.is_empty()
    }
}

/// Merges `fresh` into `current`, returning what changed.
pub fn update_bindings(
    current: &mut HookBindings,
    fresh: HookBindings,
    options: &ParseOptions,
    component: &str,
    diagnostics: &mut Diagnostics,
) -> BindingUpdate {
    let mut update = BindingUpdate::default();

    let mut inputs = IndexMap::with_capacity(fresh.inputs.len());
    for (name, new) in fresh.inputs {
        let previous = current.inputs.get(&name);
        let merged = merge_input(&name, previous, new, options, component, diagnostics);

        let changed = previous.map_or(true, |p| !p.value.same(&merged.value));
        if changed {
            update.changed_inputs.push(InputChange {
                name: name.clone(),
                previous: previous.map(|p| p.value.clone()),
                current: merged.value.clone(),
                first_change: previous.is_none(),
            });
        }
        inputs.insert(name, merged);
    }
    current.inputs = inputs;

    let mut outputs = IndexMap::with_capacity(fresh.outputs.len());
    let mut states = IndexMap::with_capacity(fresh.outputs.len());
    for (name, new) in fresh.outputs {
        let fresh_state = fresh.output_states.get(&name).cloned();
        match (current.outputs.get(&name), current.output_states.get(&name)) {
            (Some(existing), Some(state)) => {
                if let Some(fresh_state) = &fresh_state {
                    refresh_output_state(state, fresh_state);
                }
                outputs.insert(
                    name.clone(),
                    BindingDescriptor {
                        raw: new.raw,
                        value: existing.value.clone(),
                        bound_context_variables: new.bound_context_variables,
                    },
                );
                states.insert(name, state.clone());
            }
            _ => {
                update.added_outputs.push(name.clone());
                outputs.insert(name.clone(), new);
                if let Some(fresh_state) = fresh_state {
                    states.insert(name, fresh_state);
                }
            }
        }
    }
    update.removed_outputs = current
        .outputs
        .keys()
        .filter(|name| !outputs.contains_key(*name))
        .cloned()
        .collect();
    current.outputs = outputs;
    current.output_states = states;

    update
}

fn merge_input(
    name: &str,
    previous: Option<&BindingDescriptor>,
    new: BindingDescriptor,
    options: &ParseOptions,
    component: &str,
    diagnostics: &mut Diagnostics,
) -> BindingDescriptor {
    let Some(previous) = previous else {
        return new;
    };

    if previous.raw != new.raw {
        return new;
    }

    let keep_previous = |new: BindingDescriptor| BindingDescriptor {
        value: previous.value.clone(),
        ..new
    };

    if new.bound_context_variables.is_empty() {
        return keep_previous(new);
    }

    let variables_unchanged = new.bound_context_variables.len() == previous.bound_context_variables.len()
        && new.bound_context_variables.iter().all(|(path, value)| {
            previous
                .bound_context_variables
                .get(path)
                .is_some_and(|old| old.same(value))
        });
    if variables_unchanged {
        return keep_previous(new);
    }

    if !options.compare_inputs_by_value {
        return new;
    }

    let depth = options.compare_by_value_depth;
    let old_serialized = match detailed_stringify(&previous.value, depth) {
        Ok(s) => s,
        Err(err) => {
            diagnostics.warn(format!(
                "Could not compare the old value of input \"{}\" of component {} by value ({}). Using the new value",
                name, component, err
            ));
            return new;
        }
    };
    let new_serialized = match detailed_stringify(&new.value, depth) {
        Ok(s) => s,
        Err(err) => {
            diagnostics.warn(format!(
                "Could not compare the new value of input \"{}\" of component {} by value ({}). Using the new value",
                name, component, err
            ));
            return new;
        }
    };

    if old_serialized.serialized != new_serialized.serialized {
        return new;
    }
    if old_serialized.depth_exceeded && new_serialized.depth_exceeded {
        diagnostics.warn(format!(
            "Input \"{}\" of component {} is nested deeper than compareByValueDepth ({}). The values are equal up to that depth, so the old value is kept",
            name, component, depth
        ));
    }
    keep_previous(new)
}
