//! Binds a mutable state slot and a table of named asynchronous actions to
//! a component, exposing lifecycle-guarded accessors to action handlers.
//!
//! ```text
//! Factory::build ──→ ComponentWrapper ──mount──→ Mounted (host)
//!                          │                        │
//!                          └──── Dispatcher ←─attach/detach
//!                                   │
//!                    dispatch(name, payload) ──→ Deferred
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod factory;
pub mod host;
pub mod logging;
pub mod value;

pub use config::FactoryOptions;
pub use dispatcher::{
    Accessors, Action, ActionContext, ActionTable, Completion, Deferred, DispatchHandle,
    Dispatcher, InitialState, Mode, Payload, Persistable,
};
pub use error::{ConfigError, DispatchError, HandlerError, LifecycleError};
pub use factory::{consumer, ActionTableDraft, ComponentWrapper, Consumer, Factory, Mounted};
pub use host::{Host, RenderCallback, StateUpdate};
pub use value::{deep_clone, Mapping, Value};
