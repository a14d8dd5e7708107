//! Seeding state on attach.

use std::fmt;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::value::{Mapping, Value};

type Initializer = dyn Fn(&Mapping, Option<&Mapping>) -> Mapping + Send + Sync;

/// Where a freshly attached host gets its state from.
#[derive(Clone)]
pub enum InitialState {
    /// A stored default, deep-copied on every attach so no two attachments
    /// share nodes.
    Value(Mapping),
    /// Called per attach with `(props, previous state)`.
    Initializer(Arc<Initializer>),
}

impl InitialState {
    pub fn initializer<F>(f: F) -> Self
    where
        F: Fn(&Mapping, Option<&Mapping>) -> Mapping + Send + Sync + 'static,
    {
        InitialState::Initializer(Arc::new(f))
    }

    pub(crate) fn resolve(&self, props: &Mapping, prev_state: Option<&Mapping>) -> Mapping {
        match self {
            InitialState::Value(state) => state.deep_clone(),
            InitialState::Initializer(f) => f(props, prev_state),
        }
    }

    /// Decouples a stored default from references the caller still holds.
    pub(crate) fn detached_copy(self) -> Self {
        match self {
            InitialState::Value(state) => InitialState::Value(state.deep_clone()),
            initializer => initializer,
        }
    }
}

impl fmt::Debug for InitialState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitialState::Value(state) => f.debug_tuple("Value").field(state).finish(),
            InitialState::Initializer(_) => f.write_str("Initializer(..)"),
        }
    }
}

impl From<Mapping> for InitialState {
    fn from(state: Mapping) -> Self {
        InitialState::Value(state)
    }
}

/// Accepts a map, or a function value called with `[props, prev | null]`.
impl TryFrom<Value> for InitialState {
    type Error = ConfigError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Map(map) => Ok(InitialState::Value(map.read().clone())),
            Value::Function(function) => Ok(InitialState::initializer(move |props, prev| {
                let prev = prev.map_or(Value::Null, |p| Value::map(p.clone()));
                let result = function.call(vec![Value::map(props.clone()), prev]);
                result.to_mapping().unwrap_or_else(|| {
                    tracing::warn!(
                        kind = result.kind(),
                        "Initializer returned a non-map; using empty state"
                    );
                    Mapping::new()
                })
            })),
            _ => Err(ConfigError::InvalidInitialState),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_value_is_recopied_each_time() {
        let initial = InitialState::from(
            Mapping::new().with("nested", Value::map(Mapping::new().with("n", 1))),
        );
        let first = initial.resolve(&Mapping::new(), None);
        first.get("nested").unwrap().set("n", 2);
        let second = initial.resolve(&Mapping::new(), None);
        assert_eq!(second.get("nested").unwrap().get("n"), Some(Value::from(1)));
    }

    #[test]
    fn initializer_receives_props_and_prev() {
        let initial = InitialState::initializer(|props, prev| {
            let start = prev
                .and_then(|p| p.get("count").and_then(Value::as_i64))
                .or_else(|| props.get("start").and_then(Value::as_i64))
                .unwrap_or(0);
            Mapping::new().with("count", start)
        });
        let props = Mapping::new().with("start", 7);
        assert_eq!(
            initial.resolve(&props, None).get("count"),
            Some(&Value::from(7))
        );
        let prev = Mapping::new().with("count", 3);
        assert_eq!(
            initial.resolve(&props, Some(&prev)).get("count"),
            Some(&Value::from(3))
        );
    }

    #[test]
    fn function_values_become_initializers() {
        let initial = InitialState::try_from(Value::function(|args| {
            let start = args[0].get("start").unwrap_or_default();
            Value::map(Mapping::new().with("count", start).with("had_prev", !args[1].is_null()))
        }))
        .unwrap();
        let state = initial.resolve(&Mapping::new().with("start", 4), None);
        assert_eq!(state.get("count"), Some(&Value::from(4)));
        assert_eq!(state.get("had_prev"), Some(&Value::from(false)));
    }

    #[test]
    fn scalars_are_rejected() {
        assert!(matches!(
            InitialState::try_from(Value::from(3)),
            Err(ConfigError::InvalidInitialState)
        ));
        assert!(matches!(
            InitialState::try_from(Value::list(Vec::new())),
            Err(ConfigError::InvalidInitialState)
        ));
    }
}
