//! Action handlers and the table that names them.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use super::accessors::ActionContext;
use super::deferred::{Completion, Deferred};
use crate::error::{DispatchError, HandlerError};
use crate::value::{Function, Value};

/// What a handler returns: a completion, or a failure raised by user code.
pub type ActionResult = Result<Completion, HandlerError>;

type Handler = dyn Fn(ActionContext) -> ActionResult + Send + Sync;

/// A named unit of application logic invoked through `dispatch`.
#[derive(Clone)]
pub struct Action(Arc<Handler>);

impl Action {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(ActionContext) -> ActionResult + Send + Sync + 'static,
    {
        Self(Arc::new(handler))
    }

    /// Wraps an async handler. The future is awaited by whoever awaits the
    /// dispatch result.
    pub fn from_async<F, Fut>(handler: F) -> Self
    where
        F: Fn(ActionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, DispatchError>> + Send + 'static,
    {
        Self::new(move |ctx| Ok(Completion::Deferred(Deferred::from_future(handler(ctx)))))
    }

    /// Uses a plain function value as an action. It is called with the
    /// payload as its only argument and cannot reach the accessors.
    pub fn from_function(function: Function) -> Self {
        Self::new(move |ctx| {
            let payload = ctx.payload.into_value();
            Ok(Completion::Value(function.call(vec![payload])))
        })
    }

    pub(crate) fn invoke(&self, ctx: ActionContext) -> ActionResult {
        (self.0)(ctx)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Action({:p})", Arc::as_ptr(&self.0))
    }
}

/// Immutable name → action mapping owned by a dispatcher.
#[derive(Debug, Clone, Default)]
pub struct ActionTable {
    actions: Arc<HashMap<String, Action>>,
}

impl ActionTable {
    pub fn get(&self, name: &str) -> Option<&Action> {
        self.actions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Later entries overwrite earlier ones with the same name.
impl<K: Into<String>> FromIterator<(K, Action)> for ActionTable {
    fn from_iter<I: IntoIterator<Item = (K, Action)>>(iter: I) -> Self {
        let actions = iter
            .into_iter()
            .map(|(name, action)| (name.into(), action))
            .collect();
        Self {
            actions: Arc::new(actions),
        }
    }
}
