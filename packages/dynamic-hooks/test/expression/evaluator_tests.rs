/**
 * Expression Evaluator Tests
 *
 * Literal parsing, context and event references, function calls and the
 * evaluation switches.
 */

#[cfg(test)]
mod tests {
    use dynamic_hooks::expression::{evaluate, Evaluation, EvaluationOptions, Scope};
    use dynamic_hooks::{ExpressionError, Value};
    use serde_json::json;

    fn context() -> Value {
        let context = Value::from(json!({
            "heroes": {"luke": {"saber": "green"}, "vader": {"saber": "red"}},
            "list": [10, 20, 30],
            "key": "luke"
        }));
        context.set(
            "greet",
            Value::function("greet", |args: &[Value]| {
                let name = args.first().and_then(Value::as_str).unwrap_or_default().to_string();
                let n = args.get(1).and_then(Value::as_f64).unwrap_or_default();
                Ok(Value::string(format!("{}:{}", name, n)))
            }),
        );
        context.set(
            "explode",
            Value::function("explode", |_: &[Value]| anyhow::bail!("boom")),
        );
        context
    }

    fn run(raw: &str, context: &Value, options: EvaluationOptions) -> Result<Evaluation, ExpressionError> {
        evaluate(raw, &Scope::new(context), &options)
    }

    fn eval(raw: &str) -> Evaluation {
        run(raw, &context(), EvaluationOptions::default()).unwrap()
    }

    #[test]
    fn should_parse_nested_literals() {
        let evaluation = eval(
            r#"{name: 'Luke', "age": 19, tags: ['a', "b"], nested: {ok: true, nothing: null, later: undefined}}"#,
        );
        assert!(evaluation.bound_context_variables.is_empty());

        let value = evaluation.value;
        assert_eq!(value.get("name").as_str(), Some("Luke"));
        assert_eq!(value.get("age").as_f64(), Some(19.0));
        assert_eq!(value.get("tags"), Value::from(json!(["a", "b"])));
        assert_eq!(value.get("nested").get("ok").as_bool(), Some(true));
        assert_eq!(value.get("nested").get("nothing"), Value::Null);
        assert!(value.get("nested").get("later").is_undefined());
    }

    #[test]
    fn should_parse_empty_and_numeric_literals() {
        assert_eq!(eval("[]").value, Value::array(Vec::new()));
        assert_eq!(eval("{}").value, Value::empty_object());
        assert_eq!(eval("-0.5").value.as_f64(), Some(-0.5));
        assert_eq!(eval("{1: 'one'}").value.get("1").as_str(), Some("one"));
    }

    #[test]
    fn should_resolve_context_paths_and_record_them() {
        let context = context();
        let evaluation = run(
            "context.heroes[context.key].saber",
            &context,
            EvaluationOptions::default(),
        )
        .unwrap();
        assert_eq!(evaluation.value.as_str(), Some("green"));

        let bound: Vec<&str> = evaluation.bound_context_variables.keys().map(String::as_str).collect();
        assert_eq!(bound, vec!["context.key", "context.heroes[context.key].saber"]);
        assert_eq!(evaluation.bound_context_variables["context.key"].as_str(), Some("luke"));

        let list = run("context.list", &context, EvaluationOptions::default()).unwrap();
        assert!(list.value.same(&context.get("list")));
        assert_eq!(eval("context.list[2]").value.as_f64(), Some(30.0));
        assert_eq!(eval("context['heroes'][\"vader\"].saber").value.as_str(), Some("red"));
    }

    #[test]
    fn should_return_undefined_for_missing_paths() {
        let evaluation = eval("context.missing.deeper");
        assert!(evaluation.value.is_undefined());
        assert!(evaluation.bound_context_variables["context.missing.deeper"].is_undefined());
    }

    #[test]
    fn should_call_context_functions() {
        let evaluation = eval("context.greet('Han', context.list[0])");
        assert_eq!(evaluation.value.as_str(), Some("Han:10"));
        assert!(evaluation.bound_context_variables.contains_key("context.list[0]"));
    }

    #[test]
    fn should_resolve_event_without_binding_it() {
        let context = context();
        let event = Value::from(json!({"detail": 5}));
        let scope = Scope::new(&context).with_event(&event);
        let evaluation = evaluate(
            "{value: $event.detail, source: context.key, whole: $event}",
            &scope,
            &EvaluationOptions::default(),
        )
        .unwrap();
        assert_eq!(evaluation.value.get("value").as_f64(), Some(5.0));
        assert!(evaluation.value.get("whole").same(&event));
        let bound: Vec<&str> = evaluation.bound_context_variables.keys().map(String::as_str).collect();
        assert_eq!(bound, vec!["context.key"]);
    }

    #[test]
    fn should_honor_the_evaluation_switches() {
        let context = context();

        let no_context = EvaluationOptions {
            allow_context_in_bindings: false,
            ..Default::default()
        };
        assert_eq!(
            run("{a: context.key}", &context, no_context).unwrap_err(),
            ExpressionError::ContextDisabled {
                path: "context.key".to_string()
            }
        );
        assert!(run("'plain'", &context, no_context).is_ok());

        let no_calls = EvaluationOptions {
            allow_context_function_calls: false,
            ..Default::default()
        };
        assert!(matches!(
            run("context.greet('Han', 1)", &context, no_calls),
            Err(ExpressionError::FunctionCallsDisabled { .. })
        ));
        assert!(run("context.list[1]", &context, no_calls).is_ok());

        let raw_strings = EvaluationOptions {
            unescape_strings: false,
            ..Default::default()
        };
        let value = run(r"'it\'s'", &context, raw_strings).unwrap().value;
        assert_eq!(value.as_str(), Some(r"it\'s"));
        let value = run(r"'it\'s'", &context, EvaluationOptions::default()).unwrap().value;
        assert_eq!(value.as_str(), Some("it's"));
    }

    #[test]
    fn should_report_call_errors() {
        let context = context();
        assert_eq!(
            run("context.key()", &context, EvaluationOptions::default()).unwrap_err(),
            ExpressionError::NotCallable {
                path: "context.key()".to_string()
            }
        );
        match run("context.explode()", &context, EvaluationOptions::default()) {
            Err(ExpressionError::CallFailed { path, message }) => {
                assert_eq!(path, "context.explode()");
                assert_eq!(message, "boom");
            }
            other => panic!("expected a failed call, got {:?}", other.map(|e| e.value)),
        }
    }

    #[test]
    fn should_read_plain_words_as_strings() {
        assert_eq!(eval("hello world").value.as_str(), Some("hello world"));
        assert_eq!(eval("well-known.name").value.as_str(), Some("well-known.name"));
        assert!(matches!(
            run("a + b", &context(), EvaluationOptions::default()),
            Err(ExpressionError::Unrecognized { segment }) if segment == "a + b"
        ));
        assert!(matches!(
            run("{a b}", &context(), EvaluationOptions::default()),
            Err(ExpressionError::Unrecognized { .. })
        ));
    }
}
