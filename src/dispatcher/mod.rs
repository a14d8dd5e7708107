//! The dispatcher: one state slot, a table of actions, and the
//! attach/detach protocol that guards both.
//!
//! # Lifecycle
//!
//! ```text
//! Detached ──attach(host)──→ Attached ──detach()──→ Detached
//!     │                          │
//!     └── dispatch(..) ──────────┴── dispatch(..)
//! ```
//!
//! - **attach**: seeds the host's state and binds fresh accessors to it.
//!   A second attach while attached fails with `Duplicated`.
//! - **detach**: releases the host. Accessors from that attachment reject
//!   with `Unmounted` from then on. In singleton mode the final state is
//!   kept and handed to the next attachment's initializer.
//! - **dispatch**: runs the handler right away and drives whatever it
//!   returns on the tokio runtime, so dropping the [`Deferred`] does not
//!   cancel the action. Every failure, including panics in handler code,
//!   arrives through its rejection.

mod accessors;
mod action;
mod deferred;
mod initial;
mod payload;

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::TryFutureExt;
use parking_lot::Mutex;
use tokio::sync::oneshot;

pub use accessors::{Accessors, ActionContext};
pub use action::{Action, ActionResult, ActionTable};
pub use deferred::{Completion, Deferred};
pub use initial::InitialState;
pub use payload::{Payload, Persistable};

use accessors::Binding;
use crate::error::{DispatchError, HandlerError, LifecycleError};
use crate::host::Host;
use crate::value::Mapping;

/// Whether one dispatcher serves every mount or each mount gets its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    PerInstance,
    Singleton,
}

enum Phase {
    Detached,
    /// Reserved by an attach that is still seeding state.
    Attaching,
    Attached(Arc<Binding>),
}

struct Slot {
    phase: Phase,
    prev_state: Option<Mapping>,
    generation: u64,
}

struct Inner {
    initial_state: InitialState,
    actions: ActionTable,
    mode: Mode,
    slot: Mutex<Slot>,
}

/// Shared handle to a dispatcher. Clones refer to the same dispatcher.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

impl Dispatcher {
    pub fn new(initial_state: InitialState, actions: ActionTable, mode: Mode) -> Self {
        Self {
            inner: Arc::new(Inner {
                initial_state,
                actions,
                mode,
                slot: Mutex::new(Slot {
                    phase: Phase::Detached,
                    prev_state: None,
                    generation: 0,
                }),
            }),
        }
    }

    pub fn mode(&self) -> Mode {
        self.inner.mode
    }

    pub fn is_attached(&self) -> bool {
        matches!(self.inner.slot.lock().phase, Phase::Attached(_))
    }

    /// State captured by the last detach (singleton mode only).
    pub fn prev_state(&self) -> Option<Mapping> {
        self.inner.slot.lock().prev_state.clone()
    }

    pub fn action_names(&self) -> Vec<&str> {
        self.inner.actions.names()
    }

    /// Binds this dispatcher to `host`.
    ///
    /// Resolves the initial state (calling the initializer with the host's
    /// props and any remembered state), writes it into the host, and
    /// creates the accessors for this attachment.
    ///
    /// # Errors
    /// [`LifecycleError::Duplicated`] if another host is attached.
    pub fn attach(&self, host: Arc<dyn Host>) -> Result<(), LifecycleError> {
        let (prev_state, generation) = {
            let mut slot = self.inner.slot.lock();
            if !matches!(slot.phase, Phase::Detached) {
                tracing::warn!(mode = ?self.inner.mode, "Dispatcher duplicated in tree");
                return Err(LifecycleError::Duplicated);
            }
            slot.phase = Phase::Attaching;
            slot.generation += 1;
            (slot.prev_state.clone(), slot.generation)
        };

        // A panicking initializer must not leave the slot reserved.
        let _reservation = scopeguard::guard_on_unwind(&self.inner.slot, |slot| {
            slot.lock().phase = Phase::Detached;
            tracing::warn!("Attach unwound, dispatcher released");
        });

        // User initializers run without the slot lock held.
        let state = self
            .inner
            .initial_state
            .resolve(&host.props(), prev_state.as_ref());
        host.replace_state(state);

        self.inner.slot.lock().phase = Phase::Attached(Binding::new(host, generation));
        tracing::debug!(generation, mode = ?self.inner.mode, "Dispatcher attached");
        Ok(())
    }

    /// Unbinds the current host. A no-op when nothing is attached.
    pub fn detach(&self) {
        let binding = {
            let mut slot = self.inner.slot.lock();
            match std::mem::replace(&mut slot.phase, Phase::Detached) {
                Phase::Attached(binding) => binding,
                other => {
                    slot.phase = other;
                    tracing::debug!("Detach ignored, dispatcher not attached");
                    return;
                }
            }
        };

        let host = binding.release();
        if self.inner.mode == Mode::Singleton {
            if let Some(host) = host {
                let snapshot = host.state();
                self.inner.slot.lock().prev_state = Some(snapshot);
            }
        }
        tracing::debug!(generation = binding.generation(), "Dispatcher detached");
    }

    /// Narrow handle exposing only [`dispatch`](Self::dispatch).
    pub fn handle(&self) -> DispatchHandle {
        DispatchHandle {
            dispatcher: self.clone(),
        }
    }

    /// Accessors bound to the current attachment, or dead ones when detached.
    pub fn accessors(&self) -> Accessors {
        let slot = self.inner.slot.lock();
        match &slot.phase {
            Phase::Attached(binding) => Accessors::new(Some(Arc::clone(binding))),
            Phase::Detached | Phase::Attaching => Accessors::new(None),
        }
    }

    /// Runs the action registered as `name`.
    ///
    /// The handler is invoked synchronously. If the payload can persist,
    /// it is persisted first. Whatever the handler returns is settled on a
    /// spawned task, so the action completes even if the returned deferred
    /// is dropped. Outside a tokio runtime it is settled lazily instead.
    /// Unregistered names, handler errors and handler panics all reject
    /// the returned deferred.
    pub fn dispatch(&self, name: &str, payload: impl Into<Payload>) -> Deferred {
        let payload = payload.into();
        let Some(action) = self.inner.actions.get(name).cloned() else {
            tracing::warn!(action = %name, "Action not registered");
            return Deferred::rejected(DispatchError::UnknownAction {
                name: name.to_string(),
            });
        };

        if let Some(persistable) = payload.persistable() {
            persistable.persist();
        }

        tracing::debug!(action = %name, "Dispatching action");
        let ctx = ActionContext::new(payload, self.handle(), self.accessors());
        let result = std::panic::catch_unwind(AssertUnwindSafe(|| action.invoke(ctx)))
            .unwrap_or_else(|panic| Err(HandlerError::from_panic(panic)));

        let action_name = name.to_string();
        let settled = Deferred::settle(result).inspect_err(move |err| {
            tracing::warn!(
                action = %action_name,
                error_type = err.error_type(),
                error = %err,
                "Action rejected"
            );
        });

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::debug!(action = %name, "No runtime, action settles when awaited");
            return Deferred::from_future(settled);
        };
        let (respond_to, response) = oneshot::channel();
        runtime.spawn(async move {
            // The caller may have dropped its deferred already.
            let _ = respond_to.send(settled.await);
        });
        Deferred::from_future(async move {
            response.await.unwrap_or_else(|_| {
                Err(HandlerError::new("action task ended before settling").into())
            })
        })
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("mode", &self.inner.mode)
            .field("actions", &self.inner.actions.names())
            .field("attached", &self.is_attached())
            .finish()
    }
}

/// Cloneable entry point for dispatching without access to the lifecycle.
#[derive(Clone)]
pub struct DispatchHandle {
    dispatcher: Dispatcher,
}

impl DispatchHandle {
    pub fn dispatch(&self, name: &str, payload: impl Into<Payload>) -> Deferred {
        self.dispatcher.dispatch(name, payload)
    }
}

impl std::fmt::Debug for DispatchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("DispatchHandle").field(&self.dispatcher).finish()
    }
}
