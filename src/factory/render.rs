use std::sync::Arc;

use crate::dispatcher::DispatchHandle;
use crate::value::{Mapping, Value};

/// The presentation component: turns props plus provided state into output.
pub type Consumer = Arc<dyn Fn(&RenderProps) -> Value + Send + Sync>;

/// Wraps a closure as a [`Consumer`].
pub fn consumer<F>(render: F) -> Consumer
where
    F: Fn(&RenderProps) -> Value + Send + Sync + 'static,
{
    Arc::new(render)
}

/// What the wrapper injects into the consumer under the provided key.
#[derive(Debug, Clone)]
pub struct Provided {
    pub state: Mapping,
    pub dispatch: DispatchHandle,
}

/// Props passed to the consumer on every render.
#[derive(Debug, Clone)]
pub struct RenderProps {
    /// User props as given to `mount`.
    pub props: Mapping,
    pub provided_key: String,
    pub provided: Provided,
}

impl RenderProps {
    /// Merged props as a value: the user props with `{state}` under the
    /// provided key. `dispatch` has no value form and is left out.
    pub fn to_value(&self) -> Value {
        let provided = Mapping::new().with("state", self.provided.state.clone());
        Value::map(
            self.props
                .clone()
                .with(self.provided_key.clone(), provided),
        )
    }

    /// State entry at `key`, `Null` when absent.
    pub fn state(&self, key: &str) -> Value {
        self.provided.state.get(key).cloned().unwrap_or_default()
    }

    /// User prop at `key`, `Null` when absent.
    pub fn prop(&self, key: &str) -> Value {
        self.props.get(key).cloned().unwrap_or_default()
    }
}
