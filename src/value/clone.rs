//! Recursive deep copy for shared composite values.

use super::{Mapping, Value};

/// Produces a structurally independent copy of `value`.
///
/// Lists and maps are rebuilt element by element. Scalars and functions are
/// returned as-is, so a cloned function keeps its identity.
///
/// There is no cycle detection: a map or list that (transitively) contains
/// itself recurses until the stack is exhausted.
pub fn deep_clone(value: &Value) -> Value {
    match value {
        Value::List(items) => {
            let items = items.read_recursive();
            Value::list(items.iter().map(deep_clone).collect())
        }
        Value::Map(map) => Value::map(map.read_recursive().deep_clone()),
        leaf => leaf.clone(),
    }
}

impl Mapping {
    /// Deep copy of every entry, see [`deep_clone`].
    pub fn deep_clone(&self) -> Mapping {
        self.iter()
            .map(|(key, value)| (key, deep_clone(value)))
            .collect()
    }
}
