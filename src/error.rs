//! Error taxonomy.
//!
//! Construction problems are returned synchronously as [`ConfigError`].
//! Everything that can go wrong during a dispatch travels through the
//! rejection channel of the returned deferred as a [`DispatchError`].

use std::path::PathBuf;

use thiserror::Error;

/// Malformed factory arguments or an unreadable options file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("initialState must be object or function")]
    InvalidInitialState,

    #[error("actions must be object or array")]
    InvalidActions,

    #[error("Consumer is required")]
    MissingConsumer,

    #[error("{name} is not function")]
    ActionNotCallable { name: String },

    #[error("Failed to read options file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse options file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Options validation failed: {message}")]
    ValidationError { message: String },
}

/// Operation attempted against the wrong side of the attach/detach cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// A second host tried to attach while one is still live.
    #[error("dispatcher duplicated in tree")]
    Duplicated,

    /// An accessor was used after its host detached.
    #[error("still unmounted")]
    Unmounted,
}

/// Failure raised by user action code.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an arbitrary error, keeping it as the source.
    pub fn from_source<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Builds an error from a caught panic payload.
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let detail = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Self::new(format!("action panicked: {}", detail))
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<anyhow::Error> for HandlerError {
    fn from(err: anyhow::Error) -> Self {
        Self {
            message: err.to_string(),
            source: Some(err.into()),
        }
    }
}

/// Rejection reason carried by every dispatch and accessor deferred.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// Action error: `name` is absent from the action table. Always
    /// delivered through the returned deferred, whether attached or not.
    #[error("{name} is not registered as action")]
    UnknownAction { name: String },

    #[error(transparent)]
    Handler(#[from] HandlerError),
}

impl DispatchError {
    /// Stable tag for log fields.
    pub fn error_type(&self) -> &'static str {
        match self {
            DispatchError::Lifecycle(LifecycleError::Duplicated) => "duplicated",
            DispatchError::Lifecycle(LifecycleError::Unmounted) => "unmounted",
            DispatchError::UnknownAction { .. } => "unknown_action",
            DispatchError::Handler(_) => "handler_error",
        }
    }

    pub fn is_unmounted(&self) -> bool {
        matches!(self, DispatchError::Lifecycle(LifecycleError::Unmounted))
    }
}
