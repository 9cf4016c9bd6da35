//! Machinist: a finite state machine engine for persisted entities
//!
//! A machine is declared once per entity type and then drives any number of
//! entities. Each entity carries four state fields (current state, previous
//! state, last transition, last role) and the machine moves them along a
//! declarative transition table, saving through a [`machine::Persistence`]
//! backend after every move.
//!
//! # Core Concepts
//!
//! - **Transition table**: named transitions mapping source states to
//!   destinations, with an `all` wildcard source
//! - **Rules**: role lists and dependent predicates that guard transitions
//! - **Listeners**: closures and entity hooks fired before and after a
//!   transition and on entering a state
//! - **Graphs**: Graphviz output for the whole table or per role
//!
//! # Example
//!
//! ```rust
//! use machinist::builder::MachineBuilder;
//! use machinist::core::EntityState;
//! use machinist::guard::TransitionRule;
//! use machinist::store::MemoryStore;
//!
//! let machine = MachineBuilder::<EntityState>::new("vehicle")
//!     .initial("parked")
//!     .transition("ignite", [("parked", "idling")])
//!     .transition("turn_off", [("all", "parked")])
//!     .rule("ignite", TransitionRule::new(["driver"]))
//!     .build()
//!     .unwrap();
//!
//! let mut store = MemoryStore::new();
//! let mut vehicle = EntityState::default();
//! machine.create(&mut vehicle, &mut store).unwrap();
//!
//! assert!(machine.can(&vehicle, "ignite", Some("driver")));
//! assert!(!machine.can(&vehicle, "ignite", Some("thief")));
//! assert_eq!(machine.transition(&mut vehicle, &mut store, "ignite", Some("driver")), Ok(true));
//!
//! assert_eq!(vehicle.current, "idling");
//! assert_eq!(vehicle.previous.as_deref(), Some("parked"));
//! assert_eq!(vehicle.last_role.as_deref(), Some("driver"));
//! ```

pub mod builder;
pub mod core;
pub mod dot;
pub mod guard;
pub mod listeners;
pub mod machine;
pub mod snapshot;
pub mod store;

// Re-export commonly used types
pub use builder::{BuildError, MachineBuilder, MachineConfig};
pub use core::{EntityState, StatefulEntity, TransitionEvent, TransitionRecord};
pub use guard::{RolePredicates, TransitionRule};
pub use listeners::{LifecycleHooks, Phase, Scope};
pub use machine::{Machine, MachineError, Persistence, SaveError, SaveOptions};
pub use store::MemoryStore;
