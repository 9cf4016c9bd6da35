//! Misuse errors raised by a machine.

use thiserror::Error;

/// Errors that indicate a mistake in how the machine is used.
///
/// Ordinary outcomes (unknown transition, no edge from the current state,
/// denied role, failed save) are `false`/`None` results, not errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MachineError {
    #[error("The transition '{transition}' requires a role")]
    RoleRequired { transition: String },

    #[error("A method named '{name}' is already registered")]
    DuplicateMethod { name: String },
}
