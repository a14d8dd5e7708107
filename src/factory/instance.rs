//! The provider component: a [`Host`] that owns props, state and the
//! consumer it renders.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use super::render::{Consumer, Provided, RenderProps};
use crate::dispatcher::DispatchHandle;
use crate::host::{Host, RenderCallback, StateUpdate};
use crate::value::{Mapping, Value};

pub(crate) struct Instance {
    props: Mapping,
    state: RwLock<Mapping>,
    consumer: Consumer,
    provided_key: String,
    dispatch: DispatchHandle,
    rendered: RwLock<Value>,
    renders: AtomicU64,
}

impl Instance {
    pub(crate) fn new(
        props: Mapping,
        consumer: Consumer,
        provided_key: String,
        dispatch: DispatchHandle,
    ) -> Self {
        Self {
            props,
            state: RwLock::new(Mapping::new()),
            consumer,
            provided_key,
            dispatch,
            rendered: RwLock::new(Value::Null),
            renders: AtomicU64::new(0),
        }
    }

    /// Calls the consumer with the current props and state and keeps the output.
    pub(crate) fn render(&self) -> Value {
        let props = RenderProps {
            props: self.props.clone(),
            provided_key: self.provided_key.clone(),
            provided: Provided {
                state: self.state.read().clone(),
                dispatch: self.dispatch.clone(),
            },
        };
        let output = (self.consumer)(&props);
        *self.rendered.write() = output.clone();
        let count = self.renders.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::trace!(renders = count, "Rendered");
        output
    }

    pub(crate) fn rendered(&self) -> Value {
        self.rendered.read().clone()
    }

    pub(crate) fn render_count(&self) -> u64 {
        self.renders.load(Ordering::SeqCst)
    }

    pub(crate) fn props_ref(&self) -> &Mapping {
        &self.props
    }
}

impl Host for Instance {
    fn props(&self) -> Mapping {
        self.props.clone()
    }

    fn state(&self) -> Mapping {
        self.state.read().clone()
    }

    fn replace_state(&self, state: Mapping) {
        *self.state.write() = state;
    }

    /// Last write wins: the partial is computed from a snapshot and merged
    /// without holding the lock across user code.
    fn set_state(&self, update: StateUpdate, on_render: RenderCallback) {
        let snapshot = self.state.read().clone();
        if let Some(partial) = update.resolve(&snapshot, &self.props) {
            self.state.write().merge(partial);
            self.render();
        }
        on_render();
    }

    fn force_update(&self, on_render: RenderCallback) {
        self.render();
        on_render();
    }

    fn prop(&self, key: &str) -> Option<Value> {
        self.props.get(key).cloned()
    }

    fn state_entry(&self, key: &str) -> Option<Value> {
        self.state.read().get(key).cloned()
    }
}
