//! Accessors handed to action handlers.
//!
//! Each attachment creates a new [`Binding`]. Detaching releases the host
//! from the binding, after which every accessor built on it rejects with
//! [`LifecycleError::Unmounted`], including copies a handler kept around.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::oneshot;

use super::deferred::Deferred;
use super::payload::Payload;
use super::DispatchHandle;
use crate::error::LifecycleError;
use crate::host::{Host, StateUpdate};
use crate::value::{deep_clone, Value};

/// Link between a dispatcher and one attached host.
pub(crate) struct Binding {
    host: RwLock<Option<Arc<dyn Host>>>,
    generation: u64,
}

impl Binding {
    pub(crate) fn new(host: Arc<dyn Host>, generation: u64) -> Arc<Self> {
        Arc::new(Self {
            host: RwLock::new(Some(host)),
            generation,
        })
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    fn host(&self) -> Result<Arc<dyn Host>, LifecycleError> {
        self.host.read().clone().ok_or(LifecycleError::Unmounted)
    }

    /// Severs the binding, returning the host it pointed at.
    pub(crate) fn release(&self) -> Option<Arc<dyn Host>> {
        self.host.write().take()
    }
}

/// The four lifecycle-guarded accessors.
#[derive(Clone)]
pub struct Accessors {
    binding: Option<Arc<Binding>>,
}

impl Accessors {
    pub(crate) fn new(binding: Option<Arc<Binding>>) -> Self {
        Self { binding }
    }

    /// Whether calls would currently reach a live host.
    pub fn is_live(&self) -> bool {
        self.host().is_ok()
    }

    fn host(&self) -> Result<Arc<dyn Host>, LifecycleError> {
        self.binding
            .as_ref()
            .ok_or(LifecycleError::Unmounted)
            .and_then(|binding| binding.host())
    }

    fn read(&self, key: &str, clone: bool, from_state: bool) -> Deferred {
        let host = match self.host() {
            Ok(host) => host,
            Err(err) => return Deferred::rejected(err),
        };
        let value = if from_state {
            host.state_entry(key)
        } else {
            host.prop(key)
        }
        .unwrap_or_default();
        Deferred::resolved(if clone { deep_clone(&value) } else { value })
    }

    /// Current prop at `key` (`Null` when absent). Composite values alias the host's.
    pub fn props(&self, key: &str) -> Deferred {
        self.read(key, false, false)
    }

    /// Like [`props`](Self::props) but returns an independent deep copy.
    pub fn props_cloned(&self, key: &str) -> Deferred {
        self.read(key, true, false)
    }

    /// Current state entry at `key` (`Null` when absent).
    pub fn state(&self, key: &str) -> Deferred {
        self.read(key, false, true)
    }

    pub fn state_cloned(&self, key: &str) -> Deferred {
        self.read(key, true, true)
    }

    /// Asks the host to merge `update`; resolves after the re-render.
    pub fn set_state(&self, update: impl Into<StateUpdate>) -> Deferred<()> {
        self.set_state_with(update, || {})
    }

    /// Like [`set_state`](Self::set_state), running `callback` once the host
    /// has re-rendered and before the deferred resolves.
    pub fn set_state_with<F>(&self, update: impl Into<StateUpdate>, callback: F) -> Deferred<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let host = match self.host() {
            Ok(host) => host,
            Err(err) => return Deferred::rejected(err),
        };
        let (respond_to, rendered) = oneshot::channel();
        host.set_state(
            update.into(),
            Box::new(move || {
                callback();
                let _ = respond_to.send(());
            }),
        );
        await_render(rendered)
    }

    /// Asks the host to re-render; resolves once it has.
    pub fn force_update(&self) -> Deferred<()> {
        self.force_update_with(|| {})
    }

    pub fn force_update_with<F>(&self, callback: F) -> Deferred<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let host = match self.host() {
            Ok(host) => host,
            Err(err) => return Deferred::rejected(err),
        };
        let (respond_to, rendered) = oneshot::channel();
        host.force_update(Box::new(move || {
            callback();
            let _ = respond_to.send(());
        }));
        await_render(rendered)
    }
}

/// A host that drops the render callback unfired has been torn down.
fn await_render(rendered: oneshot::Receiver<()>) -> Deferred<()> {
    Deferred::from_future(async move {
        rendered
            .await
            .map_err(|_| LifecycleError::Unmounted.into())
    })
}

/// Everything an action handler receives.
pub struct ActionContext {
    pub payload: Payload,
    /// Re-enters the dispatcher that invoked this handler.
    pub dispatch: DispatchHandle,
    accessors: Accessors,
}

impl ActionContext {
    pub(crate) fn new(payload: Payload, dispatch: DispatchHandle, accessors: Accessors) -> Self {
        Self {
            payload,
            dispatch,
            accessors,
        }
    }

    /// The accessors as a standalone, cloneable value.
    pub fn accessors(&self) -> &Accessors {
        &self.accessors
    }

    pub fn props(&self, key: &str) -> Deferred {
        self.accessors.props(key)
    }

    pub fn props_cloned(&self, key: &str) -> Deferred {
        self.accessors.props_cloned(key)
    }

    pub fn state(&self, key: &str) -> Deferred {
        self.accessors.state(key)
    }

    pub fn state_cloned(&self, key: &str) -> Deferred {
        self.accessors.state_cloned(key)
    }

    pub fn set_state(&self, update: impl Into<StateUpdate>) -> Deferred<()> {
        self.accessors.set_state(update)
    }

    pub fn set_state_with<F>(&self, update: impl Into<StateUpdate>, callback: F) -> Deferred<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.accessors.set_state_with(update, callback)
    }

    pub fn force_update(&self) -> Deferred<()> {
        self.accessors.force_update()
    }

    pub fn force_update_with<F>(&self, callback: F) -> Deferred<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.accessors.force_update_with(callback)
    }

    /// Payload value at `key`, `Null` when absent.
    pub fn arg(&self, key: &str) -> Value {
        self.payload.get(key).unwrap_or_default()
    }
}
