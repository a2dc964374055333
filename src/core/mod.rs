//! Core configuration management types.

mod builder;
mod context;
mod manager;
mod validation;

pub use builder::ManagerBuilder;
pub use context::{Interrupted, LoadContext};
pub use manager::{DEFAULT_LOAD_TIMEOUT, Manager};
pub use validation::Validate;
