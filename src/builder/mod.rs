//! Machine construction.
//!
//! Machines come from the fluent [`MachineBuilder`] or from a
//! [`MachineConfig`] document. Either way the definition is checked as a
//! whole before a machine exists, so a bad definition reports every problem
//! at once.

mod config;
mod error;
mod machine;
mod macros;
mod validate;

pub use config::{MachineConfig, OrderedMap};
pub use error::{BuildError, ConfigError};
pub use machine::MachineBuilder;
pub use validate::DefinitionIssue;
