//! The transition table: named transitions and their `from -> to` pairs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::inflect::humanize;

/// Source key that matches any current state.
pub const ALL: &str = "all";

/// Where a transition edge starts.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Source {
    /// Matches whatever state the entity is in
    All,
    /// Matches exactly this state
    State(String),
}

impl Source {
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => ALL,
            Self::State(state) => state.as_str(),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl From<String> for Source {
    fn from(key: String) -> Self {
        if key == ALL {
            Self::All
        } else {
            Self::State(key)
        }
    }
}

impl From<&str> for Source {
    fn from(key: &str) -> Self {
        Self::from(key.to_string())
    }
}

impl From<Source> for String {
    fn from(source: Source) -> Self {
        source.as_str().to_string()
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named transition with its edges in declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    name: String,
    edges: Vec<(Source, String)>,
}

impl Transition {
    pub fn new(name: impl Into<String>, edges: Vec<(Source, String)>) -> Self {
        Self {
            name: name.into(),
            edges,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn edges(&self) -> &[(Source, String)] {
        &self.edges
    }

    /// Destination from `current`: an exact source match wins over `all`.
    pub fn destination(&self, current: &str) -> Option<&str> {
        let mut fallback = None;
        for (source, to) in &self.edges {
            match source {
                Source::State(from) if from == current => return Some(to.as_str()),
                Source::All => fallback = Some(to.as_str()),
                Source::State(_) => {}
            }
        }
        fallback
    }
}

/// Every transition of a machine, indexed by name.
///
/// States are not declared separately; they are the union of every source
/// and destination in the table, in the order they are first encountered.
#[derive(Clone, Debug, Default)]
pub struct TransitionTable {
    transitions: Vec<Transition>,
    index: HashMap<String, usize>,
    states: Vec<String>,
}

impl TransitionTable {
    /// Build a table from transitions whose names are already known to be
    /// unique.
    pub(crate) fn from_validated(transitions: Vec<Transition>) -> Self {
        let mut index = HashMap::with_capacity(transitions.len());
        let mut states: Vec<String> = Vec::new();

        for (position, transition) in transitions.iter().enumerate() {
            index.insert(transition.name.clone(), position);
            for (source, to) in &transition.edges {
                if let Source::State(from) = source {
                    push_unique(&mut states, from);
                }
                push_unique(&mut states, to);
            }
        }

        Self {
            transitions,
            index,
            states,
        }
    }

    /// Resolve where `transition` leads from `current`.
    ///
    /// `None` means the transition is unknown or has no edge from here. It
    /// is the ordinary "not allowed from this state" answer, not an error.
    pub fn lookup(&self, transition: &str, current: &str) -> Option<&str> {
        self.get(transition)?.destination(current)
    }

    pub fn get(&self, transition: &str) -> Option<&Transition> {
        self.index.get(transition).map(|&i| &self.transitions[i])
    }

    pub fn contains(&self, transition: &str) -> bool {
        self.index.contains_key(transition)
    }

    /// Transition names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.transitions.iter().map(|t| t.name.as_str())
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Every state key as declared, without the `all` sentinel.
    pub fn states(&self) -> &[String] {
        &self.states
    }

    pub fn has_state(&self, state: &str) -> bool {
        self.states.iter().any(|s| s == state)
    }

    /// States in display form (`first_gear` -> `First Gear`).
    pub fn display_states(&self) -> Vec<String> {
        self.states.iter().map(|s| humanize(s)).collect()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}

fn push_unique(states: &mut Vec<String>, state: &str) {
    if state != ALL && !states.iter().any(|s| s == state) {
        states.push(state.to_string());
    }
}
