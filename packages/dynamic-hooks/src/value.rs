//! Dynamic values
//!
//! Context data, evaluated bindings and function results all share this type.
//! Compound values are reference counted and interior-mutable so that a host can
//! mutate a context array in place and the engine can still tell "same
//! reference" from "new reference with equal contents", mirroring JavaScript `===`.

use indexmap::IndexMap;
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Signature of a callable stored in a context or produced as an output wrapper.
pub type NativeFn = dyn Fn(&[Value]) -> anyhow::Result<Value>;

/// A named native function.
pub struct NativeFunction {
    pub name: String,
    call: Box<NativeFn>,
}

impl NativeFunction {
    pub fn call(&self, args: &[Value]) -> anyhow::Result<Value> {
        (self.call)(args)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Function {}]", self.name)
    }
}

pub type ArrayRef = Rc<RefCell<Vec<Value>>>;
pub type ObjectRef = Rc<RefCell<IndexMap<String, Value>>>;

#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Array(ArrayRef),
    Object(ObjectRef),
    Function(Rc<NativeFunction>),
    /// Host handle the engine passes through but cannot inspect or serialize.
    Opaque(Rc<dyn Any>),
}

impl Value {
    pub fn string(s: impl AsRef<str>) -> Value {
        Value::String(Rc::from(s.as_ref()))
    }

    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn object<K, I>(entries: I) -> Value
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let map = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Value::Object(Rc::new(RefCell::new(map)))
    }

    pub fn empty_object() -> Value {
        Value::Object(Rc::new(RefCell::new(IndexMap::new())))
    }

    pub fn function<F>(name: impl Into<String>, f: F) -> Value
    where
        F: Fn(&[Value]) -> anyhow::Result<Value> + 'static,
    {
        Value::Function(Rc::new(NativeFunction {
            name: name.into(),
            call: Box::new(f),
        }))
    }

    pub fn opaque<T: Any>(handle: T) -> Value {
        Value::Opaque(Rc::new(handle))
    }

    /// Identity comparison with JavaScript `===` semantics.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Opaque(a), Value::Opaque(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Property access as `value[key]` would do it. Anything missing is `Undefined`.
    pub fn get(&self, key: &str) -> Value {
        match self {
            Value::Object(map) => map.borrow().get(key).cloned().unwrap_or_default(),
            Value::Array(items) => {
                let items = items.borrow();
                if key == "length" {
                    return Value::Number(items.len() as f64);
                }
                key.parse::<usize>()
                    .ok()
                    .and_then(|i| items.get(i).cloned())
                    .unwrap_or_default()
            }
            Value::String(s) => {
                if key == "length" {
                    return Value::Number(s.chars().count() as f64);
                }
                key.parse::<usize>()
                    .ok()
                    .and_then(|i| s.chars().nth(i))
                    .map(|c| Value::string(c.to_string()))
                    .unwrap_or_default()
            }
            _ => Value::Undefined,
        }
    }

    /// Sets a property on an object or an index on an array. Other values are left alone.
    pub fn set(&self, key: &str, value: Value) {
        match self {
            Value::Object(map) => {
                map.borrow_mut().insert(key.to_string(), value);
            }
            Value::Array(items) => {
                if let Ok(i) = key.parse::<usize>() {
                    let mut items = items.borrow_mut();
                    if i >= items.len() {
                        items.resize(i + 1, Value::Undefined);
                    }
                    items[i] = value;
                }
            }
            _ => {}
        }
    }

    pub fn push(&self, value: Value) {
        if let Value::Array(items) = self {
            items.borrow_mut().push(value);
        }
    }

    pub fn call(&self, args: &[Value]) -> Option<anyhow::Result<Value>> {
        match self {
            Value::Function(f) => Some(f.call(args)),
            _ => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_compound(&self) -> bool {
        matches!(
            self,
            Value::Array(_) | Value::Object(_) | Value::Function(_) | Value::Opaque(_)
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Number of elements of an array value.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Array(items) => Some(items.borrow().len()),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
            Value::Opaque(_) => "opaque",
        }
    }

    /// Pointer identity of a compound value, used for cycle detection.
    pub(crate) fn identity(&self) -> Option<usize> {
        match self {
            Value::Array(a) => Some(Rc::as_ptr(a) as *const () as usize),
            Value::Object(o) => Some(Rc::as_ptr(o) as *const () as usize),
            Value::Function(f) => Some(Rc::as_ptr(f) as *const () as usize),
            Value::Opaque(o) => Some(Rc::as_ptr(o) as *const () as usize),
            _ => None,
        }
    }

    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::string(s),
            serde_json::Value::Array(items) => {
                Value::array(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => {
                Value::object(map.iter().map(|(k, v)| (k.clone(), Value::from_json(v))))
            }
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Array(items) => match items.try_borrow() {
                Ok(items) => f.debug_list().entries(items.iter()).finish(),
                Err(_) => write!(f, "[<borrowed>]"),
            },
            Value::Object(map) => match map.try_borrow() {
                Ok(map) => f.debug_map().entries(map.iter()).finish(),
                Err(_) => write!(f, "{{<borrowed>}}"),
            },
            Value::Function(func) => write!(f, "{:?}", func),
            Value::Opaque(_) => write!(f, "[Opaque]"),
        }
    }
}

/// Structural equality. Use [`Value::same`] for reference identity.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Array(a), Value::Array(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            (Value::Object(a), Value::Object(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            _ => self.same(other),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::array(items)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::from_json(&json)
    }
}
