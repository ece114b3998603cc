/**
 * Binding Update Tests
 *
 * Resolving the bindings of a hook repeatedly and merging them the way a
 * refresh does.
 */

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use dynamic_hooks::bindings::{resolve_bindings, update_bindings, BindingEnvironment};
    use dynamic_hooks::parsers::{BindingOptions, RawInput};
    use dynamic_hooks::{
        ComponentDefinition, Diagnostics, Document, HookBindings, InputDeclaration, ParseOptions,
        RawBindings, Value,
    };
    use serde_json::json;

    fn hero() -> ComponentDefinition {
        ComponentDefinition::new("HeroComponent")
            .with_input(InputDeclaration::new("lightSaberCollection"))
            .with_input(InputDeclaration::new("config"))
            .with_input(InputDeclaration::new("name"))
            .with_output(InputDeclaration::new("saved"))
    }

    fn raw(inputs: &[(&str, &str)], outputs: &[(&str, &str)]) -> RawBindings {
        let mut raw = RawBindings::default();
        for (name, expression) in inputs {
            raw.inputs.insert(
                name.to_string(),
                RawInput {
                    raw: expression.to_string(),
                    parse: true,
                    explicit: true,
                },
            );
        }
        for (name, expression) in outputs {
            raw.outputs.insert(name.to_string(), expression.to_string());
        }
        raw
    }

    fn resolve(raw: &RawBindings, context: &Value, options: &ParseOptions) -> HookBindings {
        let dom_events = Default::default();
        let env = BindingEnvironment {
            hook_id: 1,
            host_node: Document::new().root(),
            context,
            options,
            dom_events: &dom_events,
        };
        resolve_bindings(raw, &BindingOptions::default(), &hero(), &env, &mut Diagnostics::new())
    }

    fn refresh(current: &mut HookBindings, raw: &RawBindings, context: &Value) -> dynamic_hooks::bindings::BindingUpdate {
        let options = ParseOptions::default();
        let fresh = resolve(raw, context, &options);
        update_bindings(current, fresh, &options, "HeroComponent", &mut Diagnostics::new())
    }

    #[test]
    fn should_keep_the_output_wrapper_when_its_expression_changes() {
        let calls = Rc::new(RefCell::new(Vec::<String>::new()));
        let context = Value::empty_object();
        for name in ["funcA", "funcB"] {
            let calls = calls.clone();
            context.set(
                name,
                Value::function(name, move |args: &[Value]| {
                    let detail = args.first().and_then(Value::as_str).unwrap_or_default().to_string();
                    calls.borrow_mut().push(format!("{}:{}", name, detail));
                    Ok(Value::Undefined)
                }),
            );
        }

        let first = raw(&[], &[("saved", "context.funcA($event)")]);
        let mut current = resolve(&first, &context, &ParseOptions::default());
        let wrapper = current.outputs["saved"].value.clone();
        wrapper.call(&[Value::from("one")]).unwrap().unwrap();

        let second = raw(&[], &[("saved", "context.funcB($event)")]);
        let update = refresh(&mut current, &second, &context);
        assert!(update.is_empty());
        assert!(current.outputs["saved"].value.same(&wrapper));
        assert_eq!(current.outputs["saved"].raw, "context.funcB($event)");

        wrapper.call(&[Value::from("two")]).unwrap().unwrap();
        assert_eq!(*calls.borrow(), vec!["funcA:one".to_string(), "funcB:two".to_string()]);
    }

    #[test]
    fn should_only_report_swapped_collections() {
        let context = Value::from(json!({"lightSaberCollection": ["blue", "green"]}));
        let bindings = raw(&[("lightSaberCollection", "context.lightSaberCollection")], &[]);
        let mut current = resolve(&bindings, &context, &ParseOptions::default());
        let original = context.get("lightSaberCollection");

        original.push(Value::from("purple"));
        let update = refresh(&mut current, &bindings, &context);
        assert!(update.changed_inputs.is_empty());
        assert_eq!(current.inputs["lightSaberCollection"].value.len(), Some(3));

        let swapped = Value::from(json!(["red"]));
        context.set("lightSaberCollection", swapped.clone());
        let update = refresh(&mut current, &bindings, &context);
        assert_eq!(update.changed_inputs.len(), 1);
        let change = &update.changed_inputs[0];
        assert_eq!(change.name, "lightSaberCollection");
        assert!(change.previous.as_ref().is_some_and(|p| p.same(&original)));
        assert!(change.current.same(&swapped));
        assert!(!change.first_change);
    }

    #[test]
    fn should_keep_literals_that_embed_unchanged_variables() {
        let context = Value::from(json!({"color": "green"}));
        let bindings = raw(&[("config", "{saber: context.color, size: 2}")], &[]);
        let mut current = resolve(&bindings, &context, &ParseOptions::default());
        let first = current.inputs["config"].value.clone();

        let update = refresh(&mut current, &bindings, &context);
        assert!(update.is_empty());
        assert!(current.inputs["config"].value.same(&first));

        context.set("color", Value::from("red"));
        let update = refresh(&mut current, &bindings, &context);
        assert_eq!(update.changed_inputs.len(), 1);
        assert_eq!(current.inputs["config"].value.get("saber").as_str(), Some("red"));
    }

    #[test]
    fn should_report_added_and_removed_bindings() {
        let context = Value::from(json!({"save": null}));
        let mut current = resolve(
            &raw(&[("name", "'Luke'")], &[("saved", "context.save($event)")]),
            &context,
            &ParseOptions::default(),
        );

        let update = refresh(
            &mut current,
            &raw(&[("name", "'Luke'"), ("config", "{a: 1}")], &[]),
            &context,
        );
        assert_eq!(update.changed_inputs.len(), 1);
        assert_eq!(update.changed_inputs[0].name, "config");
        assert!(update.changed_inputs[0].first_change);
        assert!(update.changed_inputs[0].previous.is_none());
        assert_eq!(update.removed_outputs, vec!["saved".to_string()]);
        assert!(current.outputs.is_empty());

        let update = refresh(
            &mut current,
            &raw(&[("config", "{a: 1}")], &[("saved", "context.save($event)")]),
            &context,
        );
        assert!(update.changed_inputs.is_empty());
        assert!(!current.inputs.contains_key("name"));
        assert_eq!(update.added_outputs, vec!["saved".to_string()]);
    }
}
