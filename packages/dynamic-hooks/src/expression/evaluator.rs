/**
 * Expression Evaluator
 *
 * Evaluates the restricted literal grammar hooks may use in their bindings:
 * object and array literals, strings, numbers, booleans, null, undefined and
 * references into the context (`context.a.b`, `context['a'][0]`,
 * `context.fn(1, context.x).y`) or the emitted event (`$event.detail`).
 *
 * Every context reference is recorded with its resolved value, which is what the
 * update engine later compares to decide whether a binding changed.
 */
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use smallvec::SmallVec;

use super::encoder::{
    as_single_placeholder, encode, read_placeholder, unescape_string_body, TokenKind,
    TokenTable, PLACEHOLDER_START,
};
use crate::chars;
use crate::error::ExpressionError;
use crate::value::Value;

static NUMBER_REGEXP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?$").unwrap());

/// Name of the root through which context variables are referenced.
pub const CONTEXT_ROOT: &str = "context";
/// Name of the root through which an output's emitted value is referenced.
pub const EVENT_ROOT: &str = "$event";

/// Switches controlling what an expression may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationOptions {
    pub allow_context_in_bindings: bool,
    pub allow_context_function_calls: bool,
    pub unescape_strings: bool,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        EvaluationOptions {
            allow_context_in_bindings: true,
            allow_context_function_calls: true,
            unescape_strings: true,
        }
    }
}

/// The values an expression can reference.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub context: &'a Value,
    pub event: Option<&'a Value>,
}

impl<'a> Scope<'a> {
    pub fn new(context: &'a Value) -> Self {
        Scope {
            context,
            event: None,
        }
    }

    pub fn with_event(mut self, event: &'a Value) -> Self {
        self.event = Some(event);
        self
    }
}

/// Result of evaluating one raw expression.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub value: Value,
    /// Every context path referenced, mapped to the value it resolved to.
    pub bound_context_variables: IndexMap<String, Value>,
}

/// Evaluates `raw` against `scope`.
pub fn evaluate(
    raw: &str,
    scope: &Scope<'_>,
    options: &EvaluationOptions,
) -> Result<Evaluation, ExpressionError> {
    let encoded = encode(raw)?;
    let mut evaluator = Evaluator {
        table: encoded.table,
        scope,
        options,
        bound: IndexMap::new(),
    };
    let value = evaluator.eval_segment(&encoded.encoded)?;

    Ok(Evaluation {
        value,
        bound_context_variables: evaluator.bound,
    })
}

#[derive(Debug, Clone)]
enum PathSegment {
    Property(String),
    /// Encoded key expression between the brackets
    Index(String),
    /// Encoded argument list between the parentheses
    Call(String),
}

struct Evaluator<'s, 'a> {
    table: TokenTable,
    scope: &'s Scope<'a>,
    options: &'s EvaluationOptions,
    bound: IndexMap<String, Value>,
}

impl<'s, 'a> Evaluator<'s, 'a> {
    /// Encodes the call and bracket groups of a nested fragment, then evaluates it.
    fn eval_nested(&mut self, text: &str) -> Result<Value, ExpressionError> {
        let text = self.table.encode_subfunctions(text)?;
        let text = self.table.encode_variable_subbrackets(&text)?;
        self.eval_segment(&text)
    }

    fn eval_segment(&mut self, text: &str) -> Result<Value, ExpressionError> {
        let segment = text.trim();

        if let Some(placeholder) = as_single_placeholder(segment) {
            if placeholder.kind == TokenKind::String {
                return Ok(Value::string(self.string_literal(placeholder.index)));
            }
            return Err(self.unrecognized(segment));
        }

        if segment.starts_with(chars::LBRACE) && segment.ends_with(chars::RBRACE) {
            return self.eval_object(&segment[1..segment.len() - 1]);
        }

        if segment.starts_with(chars::LBRACKET) && segment.ends_with(chars::RBRACKET) {
            return self.eval_array(&segment[1..segment.len() - 1]);
        }

        match segment {
            "true" => return Ok(Value::Bool(true)),
            "false" => return Ok(Value::Bool(false)),
            "null" => return Ok(Value::Null),
            "undefined" => return Ok(Value::Undefined),
            _ => {}
        }

        if NUMBER_REGEXP.is_match(segment) {
            if let Ok(n) = segment.parse::<f64>() {
                return Ok(Value::Number(n));
            }
        }

        if let Some(root) = variable_root(segment) {
            return self.eval_variable(segment, root);
        }

        if !segment.is_empty() && segment.chars().all(chars::is_plain_word_char) {
            return Ok(Value::string(segment));
        }

        Err(self.unrecognized(segment))
    }

    fn eval_object(&mut self, inner: &str) -> Result<Value, ExpressionError> {
        let object = Value::empty_object();
        for entry in split_top_level(inner, chars::COMMA) {
            if entry.trim().is_empty() {
                continue;
            }
            let Some(colon) = find_top_level(entry, chars::COLON) else {
                return Err(self.unrecognized(entry));
            };
            let key = self.object_key(&entry[..colon])?;
            let value = self.eval_segment(&entry[colon + 1..])?;
            object.set(&key, value);
        }
        Ok(object)
    }

    fn object_key(&self, raw_key: &str) -> Result<String, ExpressionError> {
        let key = raw_key.trim();
        if let Some(placeholder) = as_single_placeholder(key) {
            if placeholder.kind == TokenKind::String {
                return Ok(self.string_literal(placeholder.index));
            }
        }
        let is_identifier = key.chars().next().map_or(false, chars::is_identifier_start)
            && key.chars().all(chars::is_identifier_part);
        if is_identifier || NUMBER_REGEXP.is_match(key) {
            return Ok(key.to_string());
        }
        Err(self.unrecognized(key))
    }

    fn eval_array(&mut self, inner: &str) -> Result<Value, ExpressionError> {
        let mut items = Vec::new();
        if inner.trim().is_empty() {
            return Ok(Value::array(items));
        }
        for item in split_top_level(inner, chars::COMMA) {
            items.push(self.eval_segment(item)?);
        }
        Ok(Value::array(items))
    }

    fn eval_variable(&mut self, segment: &str, root: &str) -> Result<Value, ExpressionError> {
        let is_context = root == CONTEXT_ROOT;
        if is_context && !self.options.allow_context_in_bindings {
            return Err(ExpressionError::ContextDisabled {
                path: self.table.decode(segment),
            });
        }

        let segments = self.parse_path(segment, root.len())?;
        let mut current = if is_context {
            self.scope.context.clone()
        } else {
            self.scope.event.cloned().unwrap_or_default()
        };

        for path_segment in segments {
            current = match path_segment {
                PathSegment::Property(name) => current.get(&name),
                PathSegment::Index(key_expr) => {
                    let key = self.eval_nested(&key_expr)?;
                    current.get(&property_key(&key))
                }
                PathSegment::Call(args_expr) => {
                    if !self.options.allow_context_function_calls {
                        return Err(ExpressionError::FunctionCallsDisabled {
                            path: self.table.decode(segment),
                        });
                    }
                    let args = self.eval_arguments(&args_expr)?;
                    match current.call(&args) {
                        Some(Ok(result)) => result,
                        Some(Err(err)) => {
                            return Err(ExpressionError::CallFailed {
                                path: self.table.decode(segment),
                                message: err.to_string(),
                            })
                        }
                        None => {
                            return Err(ExpressionError::NotCallable {
                                path: self.table.decode(segment),
                            })
                        }
                    }
                }
            };
        }

        if is_context {
            self.bound.insert(self.table.decode(segment), current.clone());
        }
        Ok(current)
    }

    fn eval_arguments(&mut self, args_expr: &str) -> Result<Vec<Value>, ExpressionError> {
        if args_expr.trim().is_empty() {
            return Ok(Vec::new());
        }
        let encoded = self.table.encode_subfunctions(args_expr)?;
        let encoded = self.table.encode_variable_subbrackets(&encoded)?;
        split_top_level(&encoded, chars::COMMA)
            .into_iter()
            .map(|arg| self.eval_segment(arg))
            .collect()
    }

    /// Splits `root.a[b](c)` into its segments, starting after the root.
    fn parse_path(
        &self,
        segment: &str,
        mut pos: usize,
    ) -> Result<SmallVec<[PathSegment; 4]>, ExpressionError> {
        let mut segments = SmallVec::new();

        while pos < segment.len() {
            if let Some(placeholder) = read_placeholder(segment, pos) {
                let fragment = self
                    .table
                    .fragment(placeholder.kind, placeholder.index)
                    .unwrap_or_default();
                // Strip the surrounding brackets or parentheses
                let inner = fragment
                    .get(1..fragment.len().saturating_sub(1))
                    .unwrap_or_default()
                    .to_string();
                match placeholder.kind {
                    TokenKind::Bracket => segments.push(PathSegment::Index(inner)),
                    TokenKind::Call => segments.push(PathSegment::Call(inner)),
                    TokenKind::String => return Err(self.unrecognized(segment)),
                }
                pos = placeholder.end;
                continue;
            }

            let rest = &segment[pos..];
            if let Some(after_dot) = rest.strip_prefix(chars::PERIOD) {
                let name_len = after_dot
                    .char_indices()
                    .find(|(_, c)| !chars::is_identifier_part(*c))
                    .map(|(i, _)| i)
                    .unwrap_or(after_dot.len());
                if name_len == 0 {
                    return Err(self.unrecognized(segment));
                }
                segments.push(PathSegment::Property(after_dot[..name_len].to_string()));
                pos += 1 + name_len;
                continue;
            }

            return Err(self.unrecognized(segment));
        }

        Ok(segments)
    }

    fn string_literal(&self, index: usize) -> String {
        let literal = self
            .table
            .fragment(TokenKind::String, index)
            .unwrap_or_default();
        let body = literal.get(1..literal.len().saturating_sub(1)).unwrap_or_default();
        if self.options.unescape_strings {
            unescape_string_body(body)
        } else {
            body.to_string()
        }
    }

    fn unrecognized(&self, segment: &str) -> ExpressionError {
        ExpressionError::Unrecognized {
            segment: self.table.decode(segment.trim()),
        }
    }
}

/// Returns the root name if `segment` is a variable reference.
fn variable_root(segment: &str) -> Option<&'static str> {
    [CONTEXT_ROOT, EVENT_ROOT].into_iter().find(|root| {
        segment.strip_prefix(root).map_or(false, |rest| {
            rest.is_empty()
                || rest.starts_with(chars::PERIOD)
                || rest.starts_with(PLACEHOLDER_START)
        })
    })
}

/// The property name a value stands for when used as `obj[value]`.
/// Integers beyond this lose precision as `f64`
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

fn property_key(key: &Value) -> String {
    match key {
        Value::String(s) => s.to_string(),
        Value::Number(n) if n.fract() == 0.0 && n.abs() < MAX_SAFE_INTEGER => format!("{}", *n as i64),
        Value::Number(n) if n.is_infinite() => if *n > 0.0 { "Infinity" } else { "-Infinity" }.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => "undefined".to_string(),
    }
}

/// Splits on `separator` where it is not nested in `{}` or `[]`.
fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, ch) in text.char_indices() {
        match ch {
            chars::LBRACE | chars::LBRACKET => depth += 1,
            chars::RBRACE | chars::RBRACKET => depth -= 1,
            _ if ch == separator && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + ch.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

fn find_top_level(text: &str, needle: char) -> Option<usize> {
    let mut depth = 0i32;
    for (i, ch) in text.char_indices() {
        match ch {
            chars::LBRACE | chars::LBRACKET => depth += 1,
            chars::RBRACE | chars::RBRACKET => depth -= 1,
            _ if ch == needle && depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}
