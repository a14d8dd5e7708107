//! Dynamic values held in component props and state.
//!
//! Composite nodes (`List`, `Map`) are shared handles: cloning a [`Value`]
//! copies the handle, not the contents, so two clones observe each other's
//! mutations. Use [`deep_clone`] when an independent copy is needed.

mod clone;
mod json;
mod mapping;

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
pub use serde_json::Number;

pub use clone::deep_clone;
pub use mapping::Mapping;

/// Shared, interior-mutable node used for composite values.
pub type Shared<T> = Arc<RwLock<T>>;

/// A reference-counted callable leaf.
///
/// Functions are never copied by [`deep_clone`]; clones share identity.
#[derive(Clone)]
pub struct Function(Arc<dyn Fn(Vec<Value>) -> Value + Send + Sync>);

impl Function {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Value + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, args: Vec<Value>) -> Value {
        (self.0)(args)
    }

    /// True when both handles point at the same callable.
    pub fn ptr_eq(&self, other: &Function) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({:p})", Arc::as_ptr(&self.0))
    }
}

/// An application-defined value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Shared<Vec<Value>>),
    Map(Shared<Mapping>),
    Function(Function),
}

impl Value {
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Arc::new(RwLock::new(items)))
    }

    pub fn map(mapping: Mapping) -> Self {
        Value::Map(Arc::new(RwLock::new(mapping)))
    }

    pub fn function<F>(f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Value + Send + Sync + 'static,
    {
        Value::Function(Function::new(f))
    }

    /// Short name of the variant, used in log fields and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Function(_) => "function",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Looks up `key` in a map value. The returned value aliases the child.
    pub fn get(&self, key: &str) -> Option<Value> {
        match self {
            Value::Map(map) => map.read().get(key).cloned(),
            _ => None,
        }
    }

    /// Returns the element at `index` of a list value (aliasing the child).
    pub fn at(&self, index: usize) -> Option<Value> {
        match self {
            Value::List(items) => items.read().get(index).cloned(),
            _ => None,
        }
    }

    /// Inserts into a map value in place. Returns false for non-map values.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> bool {
        match self {
            Value::Map(map) => {
                map.write().insert(key, value);
                true
            }
            _ => false,
        }
    }

    /// Appends to a list value in place. Returns false for non-list values.
    pub fn push(&self, value: impl Into<Value>) -> bool {
        match self {
            Value::List(items) => {
                items.write().push(value.into());
                true
            }
            _ => false,
        }
    }

    /// Number of entries in a map or list, `None` for leaves.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::List(items) => Some(items.read().len()),
            Value::Map(map) => Some(map.read().len()),
            _ => None,
        }
    }

    /// Shallow snapshot of a map value: the entries are aliased, the
    /// container is new.
    pub fn to_mapping(&self) -> Option<Mapping> {
        match self {
            Value::Map(map) => Some(map.read().clone()),
            _ => None,
        }
    }

    /// Identity comparison: the same shared node, the same callable, or
    /// equal scalars.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::List(a), Value::List(b)) => Arc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => Arc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::List(_) | Value::Map(_) | Value::Function(_), _)
            | (_, Value::List(_) | Value::Map(_) | Value::Function(_)) => false,
            (a, b) => a == b,
        }
    }

    pub fn deep_clone(&self) -> Value {
        deep_clone(self)
    }
}

/// Structural equality. Maps compare by key set regardless of order,
/// functions compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
                (Some(a), Some(b)) => a == b,
                _ => a.as_f64() == b.as_f64(),
            },
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                Arc::ptr_eq(a, b) || *a.read_recursive() == *b.read_recursive()
            }
            (Value::Map(a), Value::Map(b)) => {
                Arc::ptr_eq(a, b) || *a.read_recursive() == *b.read_recursive()
            }
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value.into())
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value.into())
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Number(value.into())
    }
}

impl From<f64> for Value {
    /// Non-finite floats have no numeric representation and become `Null`.
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(Value::Null, Value::Number)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Mapping> for Value {
    fn from(value: Mapping) -> Self {
        Value::map(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::list(value)
    }
}

impl From<Function> for Value {
    fn from(value: Function) -> Self {
        Value::Function(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
