//! Lifecycle hooks an entity type opts into without registering listeners.

use std::collections::HashMap;
use std::fmt;

use super::registry::Phase;
use crate::core::{EntityState, TransitionEvent, TransitionTable};

pub type TransitionHook<E> = fn(&mut E, &TransitionEvent);
pub type StateHook<E> = fn(&mut E, &str);

/// Hooks an entity type can expose.
///
/// Every lookup defaults to "not defined". The machine asks once, when it
/// is built, for every transition and state in its table, and keeps the
/// answers.
///
/// Transition hooks run after the registered listeners of the same phase,
/// the generic one before the transition-specific one. State hooks run after
/// the registered state listeners, the state-specific one before the generic
/// state-change hook.
///
/// # Example
///
/// ```rust
/// use machinist::core::TransitionEvent;
/// use machinist::listeners::{LifecycleHooks, Phase, TransitionHook};
///
/// #[derive(Default)]
/// struct Vehicle {
///     ignitions: usize,
/// }
///
/// impl Vehicle {
///     fn before_ignite(&mut self, _event: &TransitionEvent) {
///         self.ignitions += 1;
///     }
/// }
///
/// impl LifecycleHooks for Vehicle {
///     fn named_transition_hook(phase: Phase, transition: &str) -> Option<TransitionHook<Self>> {
///         match (phase, transition) {
///             (Phase::Before, "ignite") => Some(Vehicle::before_ignite),
///             _ => None,
///         }
///     }
/// }
///
/// assert!(Vehicle::named_transition_hook(Phase::Before, "ignite").is_some());
/// assert!(Vehicle::state_change_hook().is_none());
/// ```
pub trait LifecycleHooks: Sized {
    /// Runs for every transition in `phase`.
    fn transition_hook(_phase: Phase) -> Option<TransitionHook<Self>> {
        None
    }

    /// Runs for the named transition in `phase`.
    fn named_transition_hook(_phase: Phase, _transition: &str) -> Option<TransitionHook<Self>> {
        None
    }

    /// Runs when the entity enters `state`.
    fn state_hook(_state: &str) -> Option<StateHook<Self>> {
        None
    }

    /// Runs whenever the entity enters any state.
    fn state_change_hook() -> Option<StateHook<Self>> {
        None
    }
}

impl LifecycleHooks for EntityState {}

/// Hooks of `E` resolved against a transition table.
pub(crate) struct ResolvedHooks<E> {
    transitions: HashMap<(String, Phase), Vec<TransitionHook<E>>>,
    states: HashMap<String, Vec<StateHook<E>>>,
}

impl<E: LifecycleHooks> ResolvedHooks<E> {
    pub(crate) fn resolve(table: &TransitionTable) -> Self {
        let mut transitions = HashMap::new();
        for name in table.names() {
            for phase in [Phase::Before, Phase::After] {
                let hooks: Vec<TransitionHook<E>> = E::transition_hook(phase)
                    .into_iter()
                    .chain(E::named_transition_hook(phase, name))
                    .collect();
                if !hooks.is_empty() {
                    transitions.insert((name.to_string(), phase), hooks);
                }
            }
        }

        let mut states = HashMap::new();
        for state in table.states() {
            let hooks: Vec<StateHook<E>> = E::state_hook(state)
                .into_iter()
                .chain(E::state_change_hook())
                .collect();
            if !hooks.is_empty() {
                states.insert(state.clone(), hooks);
            }
        }

        Self {
            transitions,
            states,
        }
    }
}

impl<E> ResolvedHooks<E> {
    pub(crate) fn transition(&self, transition: &str, phase: Phase) -> &[TransitionHook<E>] {
        self.transitions
            .get(&(transition.to_string(), phase))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(crate) fn state(&self, state: &str) -> &[StateHook<E>] {
        self.states
            .get(state)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn len(&self) -> usize {
        self.transitions.values().map(Vec::len).sum::<usize>()
            + self.states.values().map(Vec::len).sum::<usize>()
    }
}

impl<E> Clone for ResolvedHooks<E> {
    fn clone(&self) -> Self {
        Self {
            transitions: self.transitions.clone(),
            states: self.states.clone(),
        }
    }
}

impl<E> fmt::Debug for ResolvedHooks<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedHooks")
            .field("hooks", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Source, Transition};

    #[derive(Default)]
    struct Probe {
        calls: Vec<String>,
    }

    impl Probe {
        fn before_any(&mut self, event: &TransitionEvent) {
            self.calls.push(format!("before:{}", event.transition));
        }

        fn before_ignite(&mut self, _event: &TransitionEvent) {
            self.calls.push("before_ignite".to_string());
        }

        fn on_idling(&mut self, state: &str) {
            self.calls.push(format!("state:{state}"));
        }

        fn on_change(&mut self, state: &str) {
            self.calls.push(format!("change:{state}"));
        }
    }

    impl LifecycleHooks for Probe {
        fn transition_hook(phase: Phase) -> Option<TransitionHook<Self>> {
            (phase == Phase::Before).then_some(Probe::before_any as TransitionHook<Self>)
        }

        fn named_transition_hook(phase: Phase, transition: &str) -> Option<TransitionHook<Self>> {
            match (phase, transition) {
                (Phase::Before, "ignite") => Some(Probe::before_ignite),
                _ => None,
            }
        }

        fn state_hook(state: &str) -> Option<StateHook<Self>> {
            (state == "idling").then_some(Probe::on_idling as StateHook<Self>)
        }

        fn state_change_hook() -> Option<StateHook<Self>> {
            Some(Probe::on_change)
        }
    }

    fn table() -> TransitionTable {
        TransitionTable::from_validated(vec![
            Transition::new("ignite", vec![(Source::from("parked"), "idling".to_string())]),
            Transition::new("park", vec![(Source::from("idling"), "parked".to_string())]),
        ])
    }

    #[test]
    fn generic_hook_precedes_specific_hook() {
        let hooks = ResolvedHooks::<Probe>::resolve(&table());
        let mut probe = Probe::default();
        let event = TransitionEvent {
            current_state: "parked".to_string(),
            previous_state: None,
            transition: "ignite".to_string(),
        };

        for hook in hooks.transition("ignite", Phase::Before) {
            hook(&mut probe, &event);
        }

        assert_eq!(probe.calls, ["before:ignite", "before_ignite"]);
        assert!(hooks.transition("ignite", Phase::After).is_empty());
        assert_eq!(hooks.transition("park", Phase::Before).len(), 1);
    }

    #[test]
    fn state_hooks_resolve_per_state() {
        let hooks = ResolvedHooks::<Probe>::resolve(&table());
        let mut probe = Probe::default();

        for hook in hooks.state("idling") {
            hook(&mut probe, "idling");
        }

        assert_eq!(probe.calls, ["state:idling", "change:idling"]);
        assert_eq!(hooks.state("parked").len(), 1);
        assert!(hooks.state("towed").is_empty());
    }

    #[test]
    fn entity_state_defines_no_hooks() {
        let hooks = ResolvedHooks::<EntityState>::resolve(&table());
        assert_eq!(hooks.len(), 0);
    }
}
