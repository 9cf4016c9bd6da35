//! Builder for constructing machines.

use serde_json::Value;
use std::collections::HashMap;
use std::marker::PhantomData;
use stillwater::validation::Validation;

use crate::builder::error::BuildError;
use crate::builder::validate::{issues, validate_definition, DefinitionIssue};
use crate::core::inflect::underscore;
use crate::core::{Source, StatefulEntity, Transition, TransitionEvent, TransitionTable};
use crate::guard::{MethodRegistry, RolePredicates, TransitionRule};
use crate::listeners::{LifecycleHooks, ListenerRegistry, Phase, Scope};
use crate::machine::{Machine, MachineError};

type PendingMethod = (
    String,
    Box<dyn FnOnce(&mut MethodRegistry) -> Result<(), MachineError>>,
);

/// Builder for constructing machines with a fluent API.
///
/// Transition names are stored underscored. State keys are kept exactly as
/// written. Nothing is checked until [`build`](Self::build), which reports
/// every definition issue at once.
///
/// # Example
///
/// ```rust
/// use machinist::builder::MachineBuilder;
/// use machinist::core::EntityState;
/// use machinist::guard::TransitionRule;
///
/// let machine = MachineBuilder::<EntityState>::new("vehicle")
///     .initial("parked")
///     .transition("ignite", [("parked", "idling")])
///     .transition("turn_off", [("all", "parked")])
///     .rule("ignite", TransitionRule::new(["driver"]))
///     .build()
///     .unwrap();
///
/// let vehicle = EntityState::new("parked");
/// assert!(machine.can(&vehicle, "ignite", Some("driver")));
/// assert!(!machine.can(&vehicle, "ignite", Some("thief")));
/// ```
pub struct MachineBuilder<E> {
    name: String,
    initial: Option<String>,
    transitions: Vec<Transition>,
    rules: HashMap<String, TransitionRule>,
    listeners: ListenerRegistry,
    methods: Vec<PendingMethod>,
    _entity: PhantomData<fn(E)>,
}

impl<E> MachineBuilder<E> {
    /// Create a new builder for a machine called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            initial: None,
            transitions: Vec::new(),
            rules: HashMap::new(),
            listeners: ListenerRegistry::new(),
            methods: Vec::new(),
            _entity: PhantomData,
        }
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: impl Into<String>) -> Self {
        self.initial = Some(state.into());
        self
    }

    /// Add a transition with its `from -> to` pairs, in order.
    ///
    /// A `from` of `"all"` matches any current state.
    pub fn transition<I, F, T>(mut self, name: &str, edges: I) -> Self
    where
        I: IntoIterator<Item = (F, T)>,
        F: Into<String>,
        T: Into<String>,
    {
        let edges = edges
            .into_iter()
            .map(|(from, to)| {
                let from: String = from.into();
                (Source::from(from), to.into())
            })
            .collect();
        self.transitions.push(Transition::new(underscore(name), edges));
        self
    }

    /// Add a pre-built transition. Its name is stored in underscored form.
    pub fn add_transition(mut self, transition: Transition) -> Self {
        let name = underscore(transition.name());
        self.transitions
            .push(Transition::new(name, transition.edges().to_vec()));
        self
    }

    /// Guard `transition` with `rule`.
    pub fn rule(mut self, transition: &str, rule: TransitionRule) -> Self {
        self.rules.insert(underscore(transition), rule);
        self
    }

    /// Attach a transition listener.
    pub fn on<F>(mut self, scope: Scope, phase: Phase, callback: F, bubble: bool) -> Self
    where
        F: Fn(&TransitionEvent) + Send + Sync + 'static,
    {
        self.listeners.register(scope, phase, callback, bubble);
        self
    }

    /// Attach a listener for entering `state`.
    pub fn when<F>(mut self, state: &str, callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.listeners.register_state(state, callback);
        self
    }

    /// Register an ad-hoc method.
    pub fn method<F>(mut self, name: &str, method: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        let key = name.to_string();
        self.methods.push((
            key.clone(),
            Box::new(move |registry: &mut MethodRegistry| registry.add(&key, method)),
        ));
        self
    }

    /// Register a role predicate as an ad-hoc method.
    pub fn predicate<F>(self, name: &str, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.method(name, move |args: &[Value]| {
            let role = args.first().and_then(Value::as_str).unwrap_or_default();
            Value::Bool(predicate(role))
        })
    }
}

impl<E> MachineBuilder<E>
where
    E: StatefulEntity + LifecycleHooks + RolePredicates,
{
    /// Build the machine.
    ///
    /// Fails fast on a missing initial state or an empty table, then runs
    /// every definition check and reports all issues found.
    pub fn build(self) -> Result<Machine<E>, BuildError> {
        let initial = self
            .initial
            .filter(|state| !state.is_empty())
            .ok_or(BuildError::MissingInitialState)?;

        if self.transitions.is_empty() {
            return Err(BuildError::NoTransitions);
        }

        if let Validation::Failure(errors) =
            validate_definition(&self.name, &initial, &self.transitions, &self.rules)
        {
            return Err(BuildError::Invalid {
                issues: issues(&errors),
            });
        }

        let table = TransitionTable::from_validated(self.transitions);
        let mut machine = Machine::assemble(
            self.name,
            initial,
            table,
            self.rules,
            self.listeners,
            MethodRegistry::new(),
        );

        let mut duplicates = Vec::new();
        for (name, register) in self.methods {
            if register(machine.methods_mut()).is_err() {
                duplicates.push(DefinitionIssue::DuplicateMethod { name });
            }
        }
        if !duplicates.is_empty() {
            return Err(BuildError::Invalid { issues: duplicates });
        }

        tracing::debug!(
            machine = machine.name(),
            transitions = machine.table().len(),
            states = machine.table().states().len(),
            "machine built"
        );

        Ok(machine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EntityState;

    fn vehicle() -> MachineBuilder<EntityState> {
        MachineBuilder::new("vehicle")
            .initial("parked")
            .transition("ignite", [("parked", "idling"), ("stalled", "stalled")])
            .transition("turn_off", [("all", "parked")])
    }

    #[test]
    fn builder_validates_required_fields() {
        let result = MachineBuilder::<EntityState>::new("vehicle").build();

        assert!(matches!(result, Err(BuildError::MissingInitialState)));
    }

    #[test]
    fn builder_requires_transitions() {
        let result = MachineBuilder::<EntityState>::new("vehicle")
            .initial("parked")
            .build();

        assert!(matches!(result, Err(BuildError::NoTransitions)));
    }

    #[test]
    fn fluent_api_builds_machine() {
        let machine = vehicle().build().unwrap();

        assert_eq!(machine.name(), "vehicle");
        assert_eq!(machine.initial_state(), "parked");
        assert_eq!(machine.transition_names(), ["ignite", "turn_off"]);
    }

    #[test]
    fn transition_names_are_underscored() {
        let machine = vehicle()
            .transition("shiftUp", [("idling", "first_gear")])
            .build()
            .unwrap();

        assert_eq!(machine.transition_names(), ["ignite", "turn_off", "shift_up"]);
        assert!(machine.can(&EntityState::new("idling"), "ShiftUp", None));
    }

    #[test]
    fn definition_issues_are_collected() {
        let result = vehicle()
            .transition("ignite", [("idling", "idling")])
            .rule("fly", TransitionRule::new(["pilot"]))
            .build();

        match result {
            Err(BuildError::Invalid { issues }) => assert_eq!(issues.len(), 2),
            other => panic!("Expected invalid definition, got {other:?}"),
        }
    }

    #[test]
    fn method_names_must_be_free() {
        let result = vehicle()
            .method("honk", |_| Value::Null)
            .method("is_parked", |_| Value::Null)
            .predicate("hasKey", |role| role == "driver")
            .predicate("has_key", |_| true)
            .build();

        match result {
            Err(BuildError::Invalid { issues }) => assert_eq!(
                issues,
                [
                    DefinitionIssue::DuplicateMethod {
                        name: "is_parked".to_string()
                    },
                    DefinitionIssue::DuplicateMethod {
                        name: "has_key".to_string()
                    },
                ]
            ),
            other => panic!("Expected duplicate methods, got {other:?}"),
        }
    }

    #[test]
    fn prebuilt_transitions_are_reachable_by_any_spelling() {
        let machine = vehicle()
            .add_transition(Transition::new(
                "ShiftUp",
                vec![(Source::from("idling"), "first_gear".to_string())],
            ))
            .rule("ShiftUp", TransitionRule::new(["driver"]))
            .build()
            .unwrap();
        let idling = EntityState::new("idling");

        assert_eq!(machine.transition_names(), ["ignite", "turn_off", "shift_up"]);
        assert!(machine.can(&idling, "ShiftUp", Some("driver")));
        assert!(machine.can(&idling, "shift_up", Some("driver")));
        assert!(!machine.can(&idling, "shift_up", Some("thief")));
    }
}
