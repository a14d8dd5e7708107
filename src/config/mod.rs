//! Factory options and their on-disk form.

mod loader;
mod types;

pub use types::{FactoryOptions, DEFAULT_PROVIDED_KEY};
