//! Uniformly awaitable results for dispatches and accessors.

use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::error::{DispatchError, HandlerError};
use crate::value::Value;

/// A pending result that resolves to `T` or rejects with a [`DispatchError`].
///
/// Every dispatch and every accessor call returns one of these, so callers
/// handle success and failure through a single `.await`.
pub struct Deferred<T = Value> {
    inner: BoxFuture<'static, Result<T, DispatchError>>,
}

impl<T: Send + 'static> Deferred<T> {
    pub fn resolved(value: T) -> Self {
        Self::from_future(futures::future::ready(Ok(value)))
    }

    pub fn rejected(err: impl Into<DispatchError>) -> Self {
        let err = err.into();
        Self::from_future(futures::future::ready(Err(err)))
    }

    pub fn from_future<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, DispatchError>> + Send + 'static,
    {
        Self {
            inner: future.boxed(),
        }
    }
}

impl Deferred<Value> {
    /// Normalizes what a handler produced into one deferred.
    ///
    /// An error becomes a rejection, a plain value resolves immediately and
    /// a returned deferred is flattened. A panic while polling the returned
    /// deferred is reported as a [`HandlerError`].
    pub fn settle(result: Result<Completion, HandlerError>) -> Self {
        match result {
            Ok(Completion::Value(value)) => Self::resolved(value),
            Ok(Completion::Deferred(deferred)) => {
                Self::from_future(AssertUnwindSafe(deferred).catch_unwind().map(|outcome| {
                    outcome.unwrap_or_else(|payload| Err(HandlerError::from_panic(payload).into()))
                }))
            }
            Err(err) => Self::rejected(err),
        }
    }
}

impl<T> Future for Deferred<T> {
    type Output = Result<T, DispatchError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

impl<T> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred").finish_non_exhaustive()
    }
}

/// Successful return of an action handler: a value now, or a value later.
#[derive(Debug)]
pub enum Completion {
    Value(Value),
    Deferred(Deferred),
}

impl From<Value> for Completion {
    fn from(value: Value) -> Self {
        Completion::Value(value)
    }
}

impl From<()> for Completion {
    fn from(_: ()) -> Self {
        Completion::Value(Value::Null)
    }
}

impl From<Deferred> for Completion {
    fn from(deferred: Deferred) -> Self {
        Completion::Deferred(deferred)
    }
}

impl From<Deferred<()>> for Completion {
    fn from(deferred: Deferred<()>) -> Self {
        Completion::Deferred(Deferred::from_future(deferred.map(|r| r.map(|()| Value::Null))))
    }
}
