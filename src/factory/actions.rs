//! Normalizing user-supplied action tables into one [`ActionTable`].

use crate::dispatcher::{Action, ActionTable};
use crate::error::ConfigError;
use crate::value::Value;

/// One entry of an action table as supplied by the caller.
#[derive(Debug, Clone)]
pub enum ActionEntry {
    Action(Action),
    /// Anything that isn't an action. Rejected during normalization unless
    /// it is a function value.
    Value(Value),
}

impl From<Action> for ActionEntry {
    fn from(action: Action) -> Self {
        ActionEntry::Action(action)
    }
}

impl From<Value> for ActionEntry {
    fn from(value: Value) -> Self {
        ActionEntry::Value(value)
    }
}

/// Ordered list of named entries, one table's worth.
#[derive(Debug, Clone, Default)]
pub struct ActionTableDraft {
    entries: Vec<(String, ActionEntry)>,
}

impl ActionTableDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry. A repeated name is kept and overwritten at merge time.
    pub fn on(mut self, name: impl Into<String>, entry: impl Into<ActionEntry>) -> Self {
        self.entries.push((name.into(), entry.into()));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, E: Into<ActionEntry>> FromIterator<(K, E)> for ActionTableDraft {
    fn from_iter<I: IntoIterator<Item = (K, E)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, entry)| (name.into(), entry.into()))
                .collect(),
        }
    }
}

/// The shapes `actions` may take when building a component.
#[derive(Debug, Clone)]
pub enum ActionsInput {
    Table(ActionTableDraft),
    /// Merged left to right.
    Tables(Vec<ActionTableDraft>),
    /// A map, or a list of maps, whose leaves should be function values.
    Dynamic(Value),
}

impl From<ActionTableDraft> for ActionsInput {
    fn from(draft: ActionTableDraft) -> Self {
        ActionsInput::Table(draft)
    }
}

impl From<Vec<ActionTableDraft>> for ActionsInput {
    fn from(drafts: Vec<ActionTableDraft>) -> Self {
        ActionsInput::Tables(drafts)
    }
}

impl From<Value> for ActionsInput {
    fn from(value: Value) -> Self {
        ActionsInput::Dynamic(value)
    }
}

impl From<serde_json::Value> for ActionsInput {
    fn from(value: serde_json::Value) -> Self {
        ActionsInput::Dynamic(value.into())
    }
}

impl ActionsInput {
    /// Checks the overall shape and flattens into drafts.
    pub(crate) fn into_drafts(self) -> Result<Vec<ActionTableDraft>, ConfigError> {
        match self {
            ActionsInput::Table(draft) => Ok(vec![draft]),
            ActionsInput::Tables(drafts) => Ok(drafts),
            ActionsInput::Dynamic(Value::Map(map)) => {
                let map = map.read().clone();
                Ok(vec![map.into_iter().collect()])
            }
            ActionsInput::Dynamic(Value::List(items)) => {
                let items = items.read().clone();
                items
                    .into_iter()
                    .map(|item| match item.to_mapping() {
                        Some(map) => Ok(map.into_iter().collect()),
                        None => Err(ConfigError::InvalidActions),
                    })
                    .collect()
            }
            ActionsInput::Dynamic(_) => Err(ConfigError::InvalidActions),
        }
    }
}

impl ActionTable {
    /// Merges drafts left to right into an immutable table.
    ///
    /// # Errors
    /// [`ConfigError::ActionNotCallable`] naming the first entry that is
    /// neither an action nor a function value.
    pub fn merge(drafts: Vec<ActionTableDraft>) -> Result<Self, ConfigError> {
        let mut merged: Vec<(String, Action)> = Vec::new();
        for draft in drafts {
            for (name, entry) in draft.entries {
                let action = match entry {
                    ActionEntry::Action(action) => action,
                    ActionEntry::Value(Value::Function(function)) => Action::from_function(function),
                    ActionEntry::Value(_) => return Err(ConfigError::ActionNotCallable { name }),
                };
                merged.push((name, action));
            }
        }
        Ok(merged.into_iter().collect())
    }

    /// Shape check plus merge in one step.
    pub fn normalize(input: impl Into<ActionsInput>) -> Result<Self, ConfigError> {
        Self::merge(input.into().into_drafts()?)
    }
}
