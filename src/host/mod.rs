//! Contract between a dispatcher and the component instance it is bound to.
//!
//! The host owns the authoritative state slot. A dispatcher never keeps a
//! working copy: every read and write is delegated to the attached host.

use std::fmt;
use std::sync::Arc;

use crate::value::{Mapping, Value};

/// Fired by the host once a state change or forced update has re-rendered.
pub type RenderCallback = Box<dyn FnOnce() + Send>;

type Updater = dyn Fn(&Mapping, &Mapping) -> Option<Mapping> + Send + Sync;

/// A requested state change.
#[derive(Clone)]
pub enum StateUpdate {
    /// Entries merged shallowly into the current state.
    Partial(Mapping),
    /// Computes the partial from `(state, props)`. `None` skips the merge.
    Updater(Arc<Updater>),
}

impl StateUpdate {
    pub fn updater<F>(f: F) -> Self
    where
        F: Fn(&Mapping, &Mapping) -> Option<Mapping> + Send + Sync + 'static,
    {
        StateUpdate::Updater(Arc::new(f))
    }

    /// The partial to merge given the current state and props.
    pub fn resolve(&self, state: &Mapping, props: &Mapping) -> Option<Mapping> {
        match self {
            StateUpdate::Partial(partial) => Some(partial.clone()),
            StateUpdate::Updater(f) => f(state, props),
        }
    }
}

impl fmt::Debug for StateUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateUpdate::Partial(partial) => f.debug_tuple("Partial").field(partial).finish(),
            StateUpdate::Updater(_) => f.write_str("Updater(..)"),
        }
    }
}

impl From<Mapping> for StateUpdate {
    fn from(partial: Mapping) -> Self {
        StateUpdate::Partial(partial)
    }
}

impl From<serde_json::Value> for StateUpdate {
    fn from(partial: serde_json::Value) -> Self {
        StateUpdate::Partial(partial.into())
    }
}

/// A live component instance a dispatcher can attach to.
///
/// Implementations call the render callback after the change is visible;
/// dropping it without calling means the instance was torn down.
pub trait Host: Send + Sync {
    /// Snapshot of the current props.
    fn props(&self) -> Mapping;

    /// Snapshot of the current state.
    fn state(&self) -> Mapping;

    /// Overwrites the state slot. Used once per attachment to seed it.
    fn replace_state(&self, state: Mapping);

    /// Merges `update` into state, re-renders, then fires `on_render`.
    fn set_state(&self, update: StateUpdate, on_render: RenderCallback);

    /// Re-renders unconditionally, then fires `on_render`.
    fn force_update(&self, on_render: RenderCallback);

    fn prop(&self, key: &str) -> Option<Value> {
        self.props().get(key).cloned()
    }

    fn state_entry(&self, key: &str) -> Option<Value> {
        self.state().get(key).cloned()
    }
}
