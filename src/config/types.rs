use serde::{Deserialize, Serialize};

/// Prop name under which `{state, dispatch}` is injected by default.
pub const DEFAULT_PROVIDED_KEY: &str = "provided";

/// Options accepted by [`Factory::build`](crate::factory::Factory::build).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryOptions {
    /// Share one dispatcher across every mount of the wrapper and expose
    /// `dispatch` on the wrapper itself (default: false).
    #[serde(default)]
    pub singleton: bool,
    /// Prop name the consumer receives the provided state under.
    #[serde(default = "default_provided_key")]
    pub provided_key: String,
}

fn default_provided_key() -> String {
    DEFAULT_PROVIDED_KEY.to_string()
}

impl Default for FactoryOptions {
    fn default() -> Self {
        Self {
            singleton: false,
            provided_key: default_provided_key(),
        }
    }
}

impl FactoryOptions {
    pub fn singleton() -> Self {
        Self {
            singleton: true,
            ..Self::default()
        }
    }

    pub fn with_provided_key(mut self, key: impl Into<String>) -> Self {
        self.provided_key = key.into();
        self
    }
}
