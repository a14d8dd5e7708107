//! Shared test utilities and mock infrastructure.

#![allow(dead_code, unused_imports)]

pub mod mock_host;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use statehost::{
    consumer, Action, ActionTableDraft, ComponentWrapper, Consumer, Factory, FactoryOptions,
    Mapping, Persistable, Value,
};

/// Persistable that counts how often it was persisted.
#[derive(Default)]
pub struct PersistSpy {
    calls: AtomicUsize,
}

impl PersistSpy {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Persistable for PersistSpy {
    fn persist(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// Consumer that renders its merged props as a value.
pub fn echo_consumer() -> Consumer {
    consumer(|props| props.to_value())
}

/// `INCR` adds `payload.amount` to `state.count` and resolves with the new count.
pub fn incr_action() -> Action {
    Action::from_async(|ctx| async move {
        let amount = ctx.arg("amount").as_i64().unwrap_or(1);
        let count = ctx.state("count").await?.as_i64().unwrap_or(0);
        ctx.set_state(Mapping::new().with("count", count + amount))
            .await?;
        ctx.state("count").await
    })
}

/// Counter component starting at `{count: 0}`.
pub fn counter(options: FactoryOptions) -> ComponentWrapper {
    Factory::build(
        Mapping::new().with("count", 0),
        ActionTableDraft::new().on("INCR", incr_action()),
        Some(echo_consumer()),
        options,
    )
    .expect("counter component should build")
}
