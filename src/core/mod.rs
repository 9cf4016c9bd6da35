//! Core data model of the engine.
//!
//! This module holds the pure parts of a machine:
//! - The transition table and its lookup rules
//! - The entity state fields and the trait used to reach them
//! - Records of committed transitions
//! - Name inflection shared by lookups and display
//!
//! Nothing in here performs I/O or calls back into user code.

pub mod inflect;

mod history;
mod state;
mod table;

pub use history::{TransitionHistory, TransitionRecord};
pub use state::{EntityState, StatefulEntity, TransitionEvent};
pub use table::{Source, Transition, TransitionTable, ALL};
