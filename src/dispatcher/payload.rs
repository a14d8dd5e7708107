//! Action payloads and the persist capability.

use std::fmt;
use std::sync::Arc;

use crate::value::Value;

/// Capability of payloads whose backing object would otherwise be recycled
/// by the host before an asynchronous handler gets to read it (pooled UI
/// events, for instance).
pub trait Persistable: Send + Sync {
    fn persist(&self);
}

/// Argument passed along with a dispatched action name.
#[derive(Clone, Default)]
pub struct Payload {
    value: Value,
    persistable: Option<Arc<dyn Persistable>>,
}

impl Payload {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            persistable: None,
        }
    }

    /// Attaches a persist capability, invoked once right before the handler runs.
    pub fn with_persist(mut self, persistable: Arc<dyn Persistable>) -> Self {
        self.persistable = Some(persistable);
        self
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Shortcut for `payload.value().get(key)`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.value.get(key)
    }

    /// Capability query for [`Persistable`].
    pub fn persistable(&self) -> Option<&dyn Persistable> {
        self.persistable.as_deref()
    }

    pub fn into_value(self) -> Value {
        self.value
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payload")
            .field("value", &self.value)
            .field("persistable", &self.persistable.is_some())
            .finish()
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::new(value)
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        Payload::new(value)
    }
}

impl From<()> for Payload {
    fn from(_: ()) -> Self {
        Payload::default()
    }
}
