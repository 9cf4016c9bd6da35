//! Entity state fields and the accessor trait the engine reads them through.

use serde::{Deserialize, Serialize};

/// The four state fields a machine-managed entity persists.
///
/// Only the executor mutates them, and always as one unit: a failed or
/// guarded-out transition leaves every field untouched.
///
/// # Example
///
/// ```rust
/// use machinist::core::EntityState;
///
/// let state = EntityState::new("parked");
/// assert_eq!(state.current, "parked");
/// assert!(state.previous.is_none());
/// assert!(state.last_transition.is_none());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityState {
    /// The state the entity is in
    pub current: String,
    /// The state before the last committed transition
    pub previous: Option<String>,
    /// Name of the last committed transition
    pub last_transition: Option<String>,
    /// Role that performed the last committed transition
    pub last_role: Option<String>,
}

impl EntityState {
    /// Fresh state for an entity that has never transitioned.
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            current: initial.into(),
            previous: None,
            last_transition: None,
            last_role: None,
        }
    }

    /// Whether the entity has committed at least one transition.
    pub fn has_transitioned(&self) -> bool {
        self.last_transition.is_some()
    }
}

/// Read/write access to the state fields of an entity.
///
/// This is the only thing the engine needs to know about the entity's
/// storage layout.
pub trait StatefulEntity {
    fn state(&self) -> &EntityState;

    fn state_mut(&mut self) -> &mut EntityState;

    /// Shortcut for `self.state().current`.
    fn current_state(&self) -> &str {
        &self.state().current
    }
}

impl StatefulEntity for EntityState {
    fn state(&self) -> &EntityState {
        self
    }

    fn state_mut(&mut self) -> &mut EntityState {
        self
    }
}

/// What a transition listener is told.
///
/// Before the state changes, `current_state` is the pre-transition state and
/// `previous_state` is whatever preceded it. After the change, `current_state`
/// is the destination and `previous_state` the state just left.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionEvent {
    pub current_state: String,
    pub previous_state: Option<String>,
    pub transition: String,
}

impl TransitionEvent {
    pub(crate) fn capture(state: &EntityState, transition: &str) -> Self {
        Self {
            current_state: state.current.clone(),
            previous_state: state.previous.clone(),
            transition: transition.to_string(),
        }
    }
}
