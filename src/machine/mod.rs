//! The transition executor and query API.

mod error;
mod executor;
mod persistence;

pub use error::MachineError;
pub use executor::{Machine, TransitionOptions};
pub use persistence::{Persistence, SaveError, SaveOptions};
