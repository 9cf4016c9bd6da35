//! Graphviz rendering of a transition table.

use serde::{Deserialize, Serialize};
use std::fmt::Write;

use super::edges::{DotEdge, EdgeSet};
use crate::core::inflect::humanize;
use crate::core::TransitionTable;
use crate::machine::Machine;

/// How one role is drawn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleStyle {
    pub color: String,
}

impl RoleStyle {
    pub fn new(color: impl Into<String>) -> Self {
        Self {
            color: color.into(),
        }
    }
}

/// Roles to draw a graph for, in the order given.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoleStyles {
    roles: Vec<(String, RoleStyle)>,
}

impl RoleStyles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `role` drawn in `color`. A role added twice keeps its first place.
    pub fn role(mut self, role: impl Into<String>, color: impl Into<String>) -> Self {
        self.insert(role.into(), RoleStyle::new(color));
        self
    }

    pub fn insert(&mut self, role: String, style: RoleStyle) {
        match self.roles.iter_mut().find(|(name, _)| *name == role) {
            Some((_, existing)) => *existing = style,
            None => self.roles.push((role, style)),
        }
    }

    pub fn get(&self, role: &str) -> Option<&RoleStyle> {
        self.roles
            .iter()
            .find(|(name, _)| name == role)
            .map(|(_, style)| style)
    }

    pub fn contains(&self, role: &str) -> bool {
        self.get(role).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RoleStyle)> {
        self.roles.iter().map(|(name, style)| (name.as_str(), style))
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// The first `len` roles.
    pub fn prefix(&self, len: usize) -> Self {
        Self {
            roles: self.roles.iter().take(len).cloned().collect(),
        }
    }
}

impl FromIterator<(String, RoleStyle)> for RoleStyles {
    fn from_iter<I: IntoIterator<Item = (String, RoleStyle)>>(iter: I) -> Self {
        let mut styles = Self::new();
        for (role, style) in iter {
            styles.insert(role, style);
        }
        styles
    }
}

/// Node styling for a role graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DotOptions {
    /// Fill color of every node
    pub color: String,
    /// Color of the highlighted node
    #[serde(alias = "activeColor")]
    pub active_color: String,
    /// State to highlight; the initial state when unset
    #[serde(alias = "activeState", skip_serializing_if = "Option::is_none")]
    pub active_state: Option<String>,
}

impl Default for DotOptions {
    fn default() -> Self {
        Self {
            color: "lightgrey".to_string(),
            active_color: "green".to_string(),
            active_state: None,
        }
    }
}

/// The whole table, one edge per `from -> to` pair, keys as declared.
///
/// # Example
///
/// ```rust
/// use machinist::builder::MachineBuilder;
/// use machinist::core::EntityState;
///
/// let machine = MachineBuilder::<EntityState>::new("door")
///     .initial("closed")
///     .transition("open", [("closed", "opened")])
///     .build()
///     .unwrap();
///
/// assert_eq!(
///     machine.to_dot(),
///     "digraph finite_state_machine {\n\trankdir=LR\n\tfontsize=12\n\tnode [shape = circle];\n\tclosed -> opened [ label = \"open\" ];\n}"
/// );
/// ```
pub fn to_dot(table: &TransitionTable) -> String {
    let mut dot =
        String::from("digraph finite_state_machine {\n\trankdir=LR\n\tfontsize=12\n\tnode [shape = circle];\n");

    for transition in table.transitions() {
        for (from, to) in transition.edges() {
            let _ = writeln!(dot, "\t{from} -> {to} [ label = \"{}\" ];", transition.name());
        }
    }

    dot.push('}');
    dot
}

/// Edges of the role view of `machine` for `roles`.
///
/// A transition is drawn when it has no rule or its rule admits at least one
/// of `roles`. Each edge carries the roles among `roles` its rule admits.
pub fn role_edges<E>(machine: &Machine<E>, roles: &RoleStyles) -> EdgeSet {
    let mut edges = EdgeSet::new();

    for transition in machine.table().transitions() {
        let rule = machine.rule(transition.name());
        if rule.is_some_and(|rule| !rule.allows_any(roles.names())) {
            continue;
        }

        for role in roles.names() {
            for (from, to) in transition.edges() {
                let mut edge = DotEdge::new(from.as_str(), to.as_str(), transition.name());
                if let Some(rule) = rule {
                    if rule.allows(role) {
                        edge = edge.with_role(role);
                    }
                    if let Some(depends) = &rule.depends {
                        edge = edge.with_depends(depends.as_str());
                    }
                }
                edges.insert(edge);
            }
        }
    }

    edges
}

/// The role view of `machine`, styled per role.
pub fn to_dot_for_roles<E>(machine: &Machine<E>, roles: &RoleStyles, options: &DotOptions) -> String {
    let edges = role_edges(machine, roles);

    let role_list = roles.names().collect::<Vec<_>>().join(", ");
    let active = options
        .active_state
        .as_deref()
        .unwrap_or(machine.initial_state());

    let mut dot = String::from("digraph finite_state_machine {\n\tfontsize=12;\n");
    let _ = writeln!(
        dot,
        "\tnode [shape = oval, style=filled, color = \"{}\"];",
        options.color
    );
    dot.push_str("\tstyle=filled;\n");
    let _ = writeln!(
        dot,
        "\tlabel=\"Statemachine for {} role(s) : {}\"",
        humanize(machine.name()),
        humanize(&role_list)
    );
    let _ = writeln!(
        dot,
        "\t\"{}\" [ color = {} ];",
        humanize(active),
        options.active_color
    );

    for edge in edges.iter() {
        let _ = writeln!(
            dot,
            "\t\"{}\" -> \"{}\" [ style = bold, fontsize = 9, arrowType = normal, label = \"{} {}{}\" {}];",
            humanize(&edge.from),
            humanize(&edge.to),
            humanize(&edge.transition),
            performed_by(edge, roles),
            edge.depends
                .as_deref()
                .map(|depends| format!("\nif {}", humanize(depends)))
                .unwrap_or_default(),
            edge_color(edge, roles),
        );
    }

    dot.push_str("}\n");
    dot
}

fn performed_by(edge: &DotEdge, roles: &RoleStyles) -> String {
    match &edge.roles {
        Some(edge_roles) if roles.len() == 1 || !roles.names().all(|r| edge_roles.iter().any(|e| e == r)) => {
            let names: Vec<String> = edge_roles.iter().map(|role| humanize(role)).collect();
            format!("by ({})", names.join(" or "))
        }
        _ => "by All".to_string(),
    }
}

fn edge_color(edge: &DotEdge, roles: &RoleStyles) -> String {
    match edge.roles.as_deref() {
        Some([role]) => {
            let color = roles.get(role).map(|style| style.color.as_str()).unwrap_or_default();
            format!("color = \"{color}\"")
        }
        _ => String::new(),
    }
}
