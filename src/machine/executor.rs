//! The machine: queries over a transition table and the transition executor.

use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

use super::error::MachineError;
use super::persistence::{Persistence, SaveError, SaveOptions};
use crate::core::inflect::underscore;
use crate::core::{EntityState, StatefulEntity, TransitionEvent, TransitionRecord, TransitionTable};
use crate::dot::{self, DotOptions, RoleStyles};
use crate::guard::{self, MethodOutcome, MethodRegistry, RolePredicates, TransitionRule};
use crate::listeners::{LifecycleHooks, ListenerRegistry, Phase, ResolvedHooks, Scope};

/// Per-call options for [`Machine::execute`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionOptions {
    /// Role acting on the entity
    pub role: Option<String>,
    /// Ask the store to validate the entity before saving
    pub validate: bool,
}

impl TransitionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn without_validation(mut self) -> Self {
        self.validate = false;
        self
    }
}

impl Default for TransitionOptions {
    fn default() -> Self {
        Self {
            role: None,
            validate: true,
        }
    }
}

/// A finite state machine for entities of type `E`.
///
/// The machine holds configuration only. Entity state lives on the entity
/// and is read and written through [`StatefulEntity`]; saving goes through
/// a [`Persistence`] collaborator passed to each transition.
///
/// Build one with [`MachineBuilder`](crate::builder::MachineBuilder).
pub struct Machine<E> {
    name: String,
    initial: String,
    table: TransitionTable,
    rules: HashMap<String, TransitionRule>,
    listeners: ListenerRegistry,
    hooks: ResolvedHooks<E>,
    methods: MethodRegistry,
}

impl<E> Machine<E>
where
    E: StatefulEntity + LifecycleHooks + RolePredicates,
{
    /// Put the parts together. Hooks are resolved here, once, and the
    /// accessor names the table implies are reserved in the method registry.
    pub(crate) fn assemble(
        name: String,
        initial: String,
        table: TransitionTable,
        rules: HashMap<String, TransitionRule>,
        listeners: ListenerRegistry,
        mut methods: MethodRegistry,
    ) -> Self {
        for state in table.states() {
            methods.reserve(&format!("is_{}", underscore(state)));
        }
        for transition in table.names() {
            methods.reserve(&format!("can_{transition}"));
            methods.reserve(transition);
        }

        let hooks = ResolvedHooks::resolve(&table);

        Self {
            name,
            initial,
            table,
            rules,
            listeners,
            hooks,
            methods,
        }
    }

    /// Reset the entity's state fields to the initial state.
    pub fn initialize(&self, entity: &mut E) {
        *entity.state_mut() = EntityState::new(self.initial.clone());
    }

    /// Initialize the entity and persist it.
    pub fn create<P>(&self, entity: &mut E, store: &mut P) -> Result<(), SaveError>
    where
        P: Persistence<E>,
    {
        self.initialize(entity);
        store.save(entity, SaveOptions::default())?;
        tracing::debug!(machine = %self.name, state = %self.initial, "entity created");
        Ok(())
    }

    /// Whether the entity is currently in `state`.
    pub fn is(&self, entity: &E, state: &str) -> bool {
        entity.current_state() == underscore(state)
    }

    /// Whether `role` could fire `transition` on the entity right now.
    ///
    /// A transition that needs a role and gets none is reported as `false`
    /// here; [`Machine::transition`] reports it as an error.
    pub fn can(&self, entity: &E, transition: &str, role: Option<&str>) -> bool {
        let transition = underscore(transition);
        if self.get_states(entity, &transition).is_none() {
            return false;
        }

        match guard::authorize(
            self.rules.get(&transition),
            &transition,
            role,
            entity,
            &self.methods,
        ) {
            Ok(authorization) => authorization.is_allowed(),
            Err(err) => {
                tracing::debug!(error = %err, "transition check without a role");
                false
            }
        }
    }

    /// Destination of `transition` from the entity's current state.
    pub fn get_states(&self, entity: &E, transition: &str) -> Option<&str> {
        self.table
            .lookup(&underscore(transition), entity.current_state())
    }

    /// Every transition name, in declaration order.
    pub fn transition_names(&self) -> Vec<&str> {
        self.table.names().collect()
    }

    /// Every state, humanized, in the order first seen in the table.
    pub fn available_states(&self) -> Vec<String> {
        self.table.display_states()
    }

    /// Transitions `role` could fire on the entity right now.
    pub fn available_transitions(&self, entity: &E, role: Option<&str>) -> Vec<&str> {
        self.table
            .names()
            .filter(|name| self.can(entity, name, role))
            .collect()
    }

    /// Attach a transition listener.
    pub fn on<F>(&mut self, scope: Scope, phase: Phase, callback: F, bubble: bool)
    where
        F: Fn(&TransitionEvent) + Send + Sync + 'static,
    {
        self.listeners.register(scope, phase, callback, bubble);
    }

    /// Attach a listener for entering `state`.
    pub fn when<F>(&mut self, state: &str, callback: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.listeners.register_state(state, callback);
    }

    /// Register an ad-hoc method, usable as a rule predicate.
    pub fn add_method<F>(&mut self, name: &str, method: F) -> Result<(), MachineError>
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        self.methods.add(name, method)
    }

    /// Register a role predicate as an ad-hoc method.
    pub fn add_predicate<F>(&mut self, name: &str, predicate: F) -> Result<(), MachineError>
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.methods.add(name, move |args: &[Value]| {
            let role = args.first().and_then(Value::as_str).unwrap_or_default();
            Value::Bool(predicate(role))
        })
    }

    pub fn call_method(&self, name: &str, args: &[Value]) -> MethodOutcome {
        self.methods.call(name, args)
    }

    /// Fire `transition` as `role` and save with validation.
    ///
    /// `Ok(false)` covers every ordinary refusal: unknown transition, no
    /// edge from the current state, denied role or predicate, failed save.
    pub fn transition<P>(
        &self,
        entity: &mut E,
        store: &mut P,
        transition: &str,
        role: Option<&str>,
    ) -> Result<bool, MachineError>
    where
        P: Persistence<E>,
    {
        let options = TransitionOptions {
            role: role.map(str::to_string),
            ..TransitionOptions::default()
        };
        self.execute(entity, store, transition, &options)
            .map(|record| record.is_some())
    }

    /// Fire a transition and return what happened.
    ///
    /// The entity's state fields change only when the store accepts the
    /// save. If it refuses, they are put back as they were and neither the
    /// "after" nor the state-entry listeners run.
    pub fn execute<P>(
        &self,
        entity: &mut E,
        store: &mut P,
        transition: &str,
        options: &TransitionOptions,
    ) -> Result<Option<TransitionRecord>, MachineError>
    where
        P: Persistence<E>,
    {
        let transition = underscore(transition);
        let role = options.role.as_deref();

        let Some(destination) = self.get_states(entity, &transition).map(str::to_string) else {
            tracing::debug!(
                machine = %self.name,
                transition = %transition,
                state = entity.current_state(),
                "transition is not possible from the current state"
            );
            return Ok(None);
        };

        let authorization = guard::authorize(
            self.rules.get(&transition),
            &transition,
            role,
            entity,
            &self.methods,
        )?;
        if !authorization.is_allowed() {
            return Ok(None);
        }

        let snapshot = entity.state().clone();
        self.dispatch_transition(entity, &transition, Phase::Before);

        {
            let state = entity.state_mut();
            state.previous = Some(snapshot.current.clone());
            state.last_transition = Some(transition.clone());
            state.last_role = role.map(str::to_string);
            state.current = destination.clone();
        }

        let save = SaveOptions {
            validate: options.validate,
        };
        if let Err(err) = store.save(entity, save) {
            tracing::warn!(
                machine = %self.name,
                transition = %transition,
                error = %err,
                "save failed, state restored"
            );
            *entity.state_mut() = snapshot;
            return Ok(None);
        }

        tracing::debug!(
            machine = %self.name,
            transition = %transition,
            from = %snapshot.current,
            to = %destination,
            "transition committed"
        );

        self.dispatch_transition(entity, &transition, Phase::After);
        self.dispatch_state_entry(entity, &destination);

        Ok(Some(TransitionRecord {
            transition,
            from: snapshot.current,
            to: destination,
            role: role.map(str::to_string),
            timestamp: Utc::now(),
        }))
    }

    fn dispatch_transition(&self, entity: &mut E, transition: &str, phase: Phase) {
        let event = TransitionEvent::capture(entity.state(), transition);

        for listener in self.listeners.transition_listeners(transition, phase) {
            (listener.callback)(&event);
            if !listener.bubble {
                tracing::trace!(transition, ?phase, "listener stopped dispatch");
                return;
            }
        }

        for hook in self.hooks.transition(transition, phase) {
            hook(entity, &event);
        }
    }

    fn dispatch_state_entry(&self, entity: &mut E, state: &str) {
        for listener in self.listeners.state_listeners(&underscore(state)) {
            listener(state);
        }
        for hook in self.hooks.state(state) {
            hook(entity, state);
        }
    }

    /// The full table as a Graphviz digraph.
    pub fn to_dot(&self) -> String {
        dot::to_dot(&self.table)
    }

    /// A role view of the table as a Graphviz digraph.
    pub fn to_dot_for_roles(&self, roles: &RoleStyles, options: &DotOptions) -> String {
        dot::to_dot_for_roles(self, roles, options)
    }
}

impl<E> Machine<E> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn initial_state(&self) -> &str {
        &self.initial
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    pub fn rule(&self, transition: &str) -> Option<&TransitionRule> {
        self.rules.get(&underscore(transition))
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn methods(&self) -> &MethodRegistry {
        &self.methods
    }

    pub(crate) fn methods_mut(&mut self) -> &mut MethodRegistry {
        &mut self.methods
    }
}

impl<E> fmt::Debug for Machine<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("name", &self.name)
            .field("initial", &self.initial)
            .field("table", &self.table)
            .field("rules", &self.rules)
            .field("listeners", &self.listeners)
            .field("hooks", &self.hooks)
            .field("methods", &self.methods)
            .finish()
    }
}
