//! Depth-limited serialization for comparing bindings by value.
//!
//! Follows `JSON.stringify` conventions (functions and `undefined` are dropped
//! from objects and become `null` in arrays, non-finite numbers become `null`),
//! with two additions: a compound value that is already being serialized further
//! up the current path is written as `null` instead of recursing forever, and
//! values nested deeper than the limit are written as `null` and reported.

use serde_json::{Map, Number};

use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stringified {
    pub serialized: String,
    /// True if some value was cut off because it was nested too deeply.
    pub depth_exceeded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct StringifyError {
    pub message: String,
}

/// Serializes `value`, descending at most `max_depth` levels into nested values.
pub fn detailed_stringify(value: &Value, max_depth: usize) -> Result<Stringified, StringifyError> {
    let mut state = StringifyState {
        path: Vec::new(),
        max_depth,
        depth_exceeded: false,
    };

    let serialized = match value {
        Value::Undefined | Value::Function(_) => "undefined".to_string(),
        _ => {
            let json = state.convert(value, 0)?.unwrap_or(serde_json::Value::Null);
            serde_json::to_string(&json).map_err(|e| StringifyError {
                message: e.to_string(),
            })?
        }
    };

    Ok(Stringified {
        serialized,
        depth_exceeded: state.depth_exceeded,
    })
}

struct StringifyState {
    /// Identities of the compound values on the current path
    path: Vec<usize>,
    max_depth: usize,
    depth_exceeded: bool,
}

impl StringifyState {
    /// `Ok(None)` means "omit", which arrays turn into `null`.
    fn convert(
        &mut self,
        value: &Value,
        depth: usize,
    ) -> Result<Option<serde_json::Value>, StringifyError> {
        let json = match value {
            Value::Undefined | Value::Function(_) => return Ok(None),
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => number_to_json(*n),
            Value::String(s) => serde_json::Value::String(s.to_string()),
            Value::Opaque(_) => {
                return Err(StringifyError {
                    message: "opaque host values cannot be serialized".to_string(),
                })
            }
            Value::Array(_) | Value::Object(_) => return self.convert_compound(value, depth),
        };
        Ok(Some(json))
    }

    fn convert_compound(
        &mut self,
        value: &Value,
        depth: usize,
    ) -> Result<Option<serde_json::Value>, StringifyError> {
        let identity = value.identity().unwrap_or_default();
        if self.path.contains(&identity) {
            return Ok(Some(serde_json::Value::Null));
        }
        if depth > self.max_depth {
            self.depth_exceeded = true;
            return Ok(Some(serde_json::Value::Null));
        }

        self.path.push(identity);
        let result = match value {
            Value::Array(items) => {
                let items = items.borrow();
                let mut out = Vec::with_capacity(items.len());
                for item in items.iter() {
                    out.push(self.convert(item, depth + 1)?.unwrap_or(serde_json::Value::Null));
                }
                serde_json::Value::Array(out)
            }
            Value::Object(map) => {
                let map = map.borrow();
                let mut out = Map::new();
                for (key, item) in map.iter() {
                    if let Some(json) = self.convert(item, depth + 1)? {
                        out.insert(key.clone(), json);
                    }
                }
                serde_json::Value::Object(out)
            }
            _ => serde_json::Value::Null,
        };
        self.path.pop();

        Ok(Some(result))
    }
}

/// Integral numbers are written without a fraction, like JavaScript does.
fn number_to_json(n: f64) -> serde_json::Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return serde_json::Value::Number(Number::from(n as i64));
    }
    Number::from_f64(n)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}
