//! Building components: input validation, action normalization, and the
//! wrapper that mounts consumers behind a dispatcher.

mod actions;
mod instance;
mod render;

use std::sync::Arc;

pub use actions::{ActionEntry, ActionTableDraft, ActionsInput};
pub use render::{consumer, Consumer, Provided, RenderProps};

use crate::config::FactoryOptions;
use crate::dispatcher::{
    ActionTable, DispatchHandle, Deferred, Dispatcher, InitialState, Mode, Payload,
};
use crate::error::{ConfigError, LifecycleError};
use crate::host::Host;
use crate::value::{Mapping, Value};
use instance::Instance;

/// The shapes `initial_state` may take when building a component.
#[derive(Debug, Clone)]
pub enum InitialStateInput {
    State(InitialState),
    /// Must be a map or a function value.
    Dynamic(Value),
}

impl From<InitialState> for InitialStateInput {
    fn from(state: InitialState) -> Self {
        InitialStateInput::State(state)
    }
}

impl From<Mapping> for InitialStateInput {
    fn from(state: Mapping) -> Self {
        InitialStateInput::State(InitialState::Value(state))
    }
}

impl From<Value> for InitialStateInput {
    fn from(value: Value) -> Self {
        InitialStateInput::Dynamic(value)
    }
}

impl From<serde_json::Value> for InitialStateInput {
    fn from(value: serde_json::Value) -> Self {
        InitialStateInput::Dynamic(value.into())
    }
}

impl InitialStateInput {
    fn validate(self) -> Result<InitialState, ConfigError> {
        let state = match self {
            InitialStateInput::State(state) => state,
            InitialStateInput::Dynamic(value) => InitialState::try_from(value)?,
        };
        Ok(state.detached_copy())
    }
}

pub struct Factory;

impl Factory {
    /// Validates the inputs and produces a component wrapper.
    ///
    /// Checks run in order: initial state, actions shape, consumer, each
    /// action entry, then the options. The first failure is returned and
    /// nothing is built.
    pub fn build(
        initial_state: impl Into<InitialStateInput>,
        actions: impl Into<ActionsInput>,
        consumer: Option<Consumer>,
        options: FactoryOptions,
    ) -> Result<ComponentWrapper, ConfigError> {
        let initial_state = initial_state.into().validate()?;
        let drafts = actions.into().into_drafts()?;
        let consumer = consumer.ok_or(ConfigError::MissingConsumer)?;
        let actions = ActionTable::merge(drafts)?;
        options.validate()?;

        let shared = options.singleton.then(|| {
            Dispatcher::new(initial_state.clone(), actions.clone(), Mode::Singleton)
        });

        tracing::debug!(
            actions = actions.len(),
            singleton = options.singleton,
            provided_key = %options.provided_key,
            "Component built"
        );

        Ok(ComponentWrapper {
            initial_state,
            actions,
            consumer,
            options,
            shared,
        })
    }
}

/// A buildable, mountable component.
pub struct ComponentWrapper {
    initial_state: InitialState,
    actions: ActionTable,
    consumer: Consumer,
    options: FactoryOptions,
    shared: Option<Dispatcher>,
}

impl ComponentWrapper {
    pub fn options(&self) -> &FactoryOptions {
        &self.options
    }

    pub fn is_singleton(&self) -> bool {
        self.shared.is_some()
    }

    /// Dispatch entry point for callers outside the tree. Singleton mode only.
    pub fn dispatch(&self) -> Option<DispatchHandle> {
        self.shared.as_ref().map(Dispatcher::handle)
    }

    /// Mounts a new instance with `props` and renders it once.
    ///
    /// # Errors
    /// [`LifecycleError::Duplicated`] when the singleton dispatcher is
    /// already attached to another live mount.
    pub fn mount(&self, props: impl Into<Mapping>) -> Result<Mounted, LifecycleError> {
        let dispatcher = match &self.shared {
            Some(shared) => shared.clone(),
            None => Dispatcher::new(
                self.initial_state.clone(),
                self.actions.clone(),
                Mode::PerInstance,
            ),
        };
        let instance = Arc::new(Instance::new(
            props.into(),
            Arc::clone(&self.consumer),
            self.options.provided_key.clone(),
            dispatcher.handle(),
        ));
        dispatcher.attach(instance.clone())?;
        instance.render();

        Ok(Mounted {
            dispatcher,
            instance,
            mounted: true,
        })
    }
}

impl std::fmt::Debug for ComponentWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentWrapper")
            .field("actions", &self.actions.names())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// A live mount. Dropping it unmounts.
pub struct Mounted {
    dispatcher: Dispatcher,
    instance: Arc<Instance>,
    mounted: bool,
}

impl Mounted {
    /// Re-renders and returns the consumer's output.
    pub fn render(&self) -> Value {
        self.instance.render()
    }

    /// Output of the most recent render.
    pub fn rendered(&self) -> Value {
        self.instance.rendered()
    }

    pub fn render_count(&self) -> u64 {
        self.instance.render_count()
    }

    pub fn props(&self) -> &Mapping {
        self.instance.props_ref()
    }

    pub fn state(&self) -> Mapping {
        self.instance.state()
    }

    /// Same entry point the consumer receives as `provided.dispatch`.
    pub fn dispatch(&self, name: &str, payload: impl Into<Payload>) -> Deferred {
        self.dispatcher.dispatch(name, payload)
    }

    pub fn dispatch_handle(&self) -> DispatchHandle {
        self.dispatcher.handle()
    }

    pub fn unmount(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if std::mem::take(&mut self.mounted) {
            self.dispatcher.detach();
        }
    }
}

impl Drop for Mounted {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for Mounted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mounted")
            .field("mounted", &self.mounted)
            .field("renders", &self.render_count())
            .finish()
    }
}
