//! Storage for transition and state listeners.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::core::inflect::underscore;
use crate::core::TransitionEvent;

/// When a transition listener fires relative to the state change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Before,
    After,
}

/// Which transitions a listener is attached to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Every transition of the machine
    AllTransitions,
    /// One transition, by name
    Transition(String),
}

impl Scope {
    /// Scope for one transition; the name is stored underscored.
    pub fn transition(name: &str) -> Self {
        Self::Transition(underscore(name))
    }
}

pub type TransitionCallback = Arc<dyn Fn(&TransitionEvent) + Send + Sync>;
pub type StateCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// A transition listener and whether dispatch continues after it.
#[derive(Clone)]
pub struct TransitionListener {
    pub callback: TransitionCallback,
    pub bubble: bool,
}

impl fmt::Debug for TransitionListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionListener")
            .field("bubble", &self.bubble)
            .finish_non_exhaustive()
    }
}

/// Listeners of one machine.
///
/// Registration happens while the machine is being set up; dispatch only
/// reads. Within a group, listeners keep registration order.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    global: HashMap<Phase, Vec<TransitionListener>>,
    specific: HashMap<(String, Phase), Vec<TransitionListener>>,
    states: HashMap<String, Vec<StateCallback>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a transition listener.
    pub fn register<F>(&mut self, scope: Scope, phase: Phase, callback: F, bubble: bool)
    where
        F: Fn(&TransitionEvent) + Send + Sync + 'static,
    {
        let listener = TransitionListener {
            callback: Arc::new(callback),
            bubble,
        };
        match scope {
            Scope::AllTransitions => self.global.entry(phase).or_default().push(listener),
            Scope::Transition(name) => self
                .specific
                .entry((underscore(&name), phase))
                .or_default()
                .push(listener),
        }
    }

    /// Attach a listener for entering `state`.
    pub fn register_state<F>(&mut self, state: &str, callback: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.states
            .entry(underscore(state))
            .or_default()
            .push(Arc::new(callback));
    }

    /// Listeners for `transition` in `phase`: the ones attached to that
    /// transition first, then the ones attached to every transition.
    pub fn transition_listeners<'a>(
        &'a self,
        transition: &str,
        phase: Phase,
    ) -> impl Iterator<Item = &'a TransitionListener> + 'a {
        let specific = self
            .specific
            .get(&(transition.to_string(), phase))
            .map(Vec::as_slice)
            .unwrap_or_default();
        let global = self
            .global
            .get(&phase)
            .map(Vec::as_slice)
            .unwrap_or_default();

        specific.iter().chain(global.iter())
    }

    /// Listeners for entering `state`, in registration order.
    pub fn state_listeners(&self, state: &str) -> &[StateCallback] {
        self.states
            .get(state)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Total number of registered listeners.
    pub fn len(&self) -> usize {
        self.global.values().map(Vec::len).sum::<usize>()
            + self.specific.values().map(Vec::len).sum::<usize>()
            + self.states.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    type Log = Arc<Mutex<Vec<&'static str>>>;

    fn tagged(log: &Log, tag: &'static str) -> impl Fn(&TransitionEvent) + Send + Sync + 'static {
        let log = Arc::clone(log);
        move |_| log.lock().unwrap().push(tag)
    }

    fn fire(registry: &ListenerRegistry, transition: &str, phase: Phase) {
        let event = TransitionEvent {
            current_state: "parked".to_string(),
            previous_state: None,
            transition: transition.to_string(),
        };
        for listener in registry.transition_listeners(transition, phase) {
            (listener.callback)(&event);
        }
    }

    #[test]
    fn specific_listeners_come_before_global_ones() {
        let log = Log::default();
        let mut registry = ListenerRegistry::new();

        registry.register(Scope::AllTransitions, Phase::Before, tagged(&log, "global"), true);
        registry.register(Scope::transition("ignite"), Phase::Before, tagged(&log, "first"), true);
        registry.register(Scope::transition("Ignite"), Phase::Before, tagged(&log, "second"), true);

        fire(&registry, "ignite", Phase::Before);

        assert_eq!(*log.lock().unwrap(), ["first", "second", "global"]);
    }

    #[test]
    fn phases_are_kept_apart() {
        let log = Log::default();
        let mut registry = ListenerRegistry::new();

        registry.register(Scope::transition("ignite"), Phase::After, tagged(&log, "after"), true);

        fire(&registry, "ignite", Phase::Before);
        assert!(log.lock().unwrap().is_empty());

        fire(&registry, "ignite", Phase::After);
        assert_eq!(*log.lock().unwrap(), ["after"]);
    }

    #[test]
    fn other_transitions_only_see_global_listeners() {
        let log = Log::default();
        let mut registry = ListenerRegistry::new();

        registry.register(Scope::transition("ignite"), Phase::Before, tagged(&log, "ignite"), true);
        registry.register(Scope::AllTransitions, Phase::Before, tagged(&log, "global"), true);

        fire(&registry, "park", Phase::Before);

        assert_eq!(*log.lock().unwrap(), ["global"]);
    }

    #[test]
    fn state_listeners_are_keyed_by_underscored_state() {
        let mut registry = ListenerRegistry::new();
        registry.register_state("FirstGear", |_| {});
        registry.register_state("first_gear", |_| {});

        assert_eq!(registry.state_listeners("first_gear").len(), 2);
        assert!(registry.state_listeners("parked").is_empty());
        assert_eq!(registry.len(), 2);
    }
}
