//! In-memory host for driving a dispatcher without the provider component.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::{Mutex, RwLock};
use statehost::{Host, Mapping, RenderCallback, StateUpdate};

/// Host that records renders and can hold back render callbacks.
#[derive(Default)]
pub struct MockHost {
    props: Mapping,
    state: RwLock<Mapping>,
    renders: AtomicUsize,
    touched_after_teardown: AtomicBool,
    torn_down: AtomicBool,
    defer_callbacks: AtomicBool,
    pending: Mutex<Vec<RenderCallback>>,
}

impl MockHost {
    pub fn with_props(props: Mapping) -> Self {
        Self {
            props,
            ..Self::default()
        }
    }

    pub fn renders(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    /// Keep render callbacks queued until `flush` or `tear_down`.
    pub fn defer_callbacks(&self) {
        self.defer_callbacks.store(true, Ordering::SeqCst);
    }

    /// Fire every queued render callback.
    pub fn flush(&self) {
        let pending: Vec<RenderCallback> = std::mem::take(&mut *self.pending.lock());
        for callback in pending {
            callback();
        }
    }

    /// Drop queued callbacks unfired and flag any later use.
    pub fn tear_down(&self) {
        self.torn_down.store(true, Ordering::SeqCst);
        self.pending.lock().clear();
    }

    /// True if anything reached this host after `tear_down`.
    pub fn touched_after_teardown(&self) -> bool {
        self.touched_after_teardown.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        if self.torn_down.load(Ordering::SeqCst) {
            self.touched_after_teardown.store(true, Ordering::SeqCst);
        }
    }

    fn finish(&self, on_render: RenderCallback) {
        self.renders.fetch_add(1, Ordering::SeqCst);
        if self.defer_callbacks.load(Ordering::SeqCst) {
            self.pending.lock().push(on_render);
        } else {
            on_render();
        }
    }
}

impl Host for MockHost {
    fn props(&self) -> Mapping {
        self.touch();
        self.props.clone()
    }

    fn state(&self) -> Mapping {
        self.touch();
        self.state.read().clone()
    }

    fn replace_state(&self, state: Mapping) {
        self.touch();
        *self.state.write() = state;
    }

    fn set_state(&self, update: StateUpdate, on_render: RenderCallback) {
        self.touch();
        let snapshot = self.state.read().clone();
        if let Some(partial) = update.resolve(&snapshot, &self.props) {
            self.state.write().merge(partial);
        }
        self.finish(on_render);
    }

    fn force_update(&self, on_render: RenderCallback) {
        self.touch();
        self.finish(on_render);
    }
}
