//! Edges of a role graph and the rule that merges them.

use serde::{Deserialize, Serialize};

/// One edge of a role graph, before rendering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DotEdge {
    pub from: String,
    pub to: String,
    pub transition: String,
    /// Roles the edge is drawn for; `None` when the transition is open to all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends: Option<String>,
}

impl DotEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>, transition: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            transition: transition.into(),
            roles: None,
            depends: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.get_or_insert_with(Vec::new).push(role.into());
        self
    }

    pub fn with_depends(mut self, depends: impl Into<String>) -> Self {
        self.depends = Some(depends.into());
        self
    }

    /// Same drawn route: endpoints, transition and predicate all match.
    fn same_route(&self, other: &DotEdge) -> bool {
        self.from == other.from
            && self.to == other.to
            && self.transition == other.transition
            && self.depends == other.depends
    }
}

/// Edges in insertion order, with routes deduplicated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EdgeSet {
    edges: Vec<DotEdge>,
}

impl EdgeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `edge`, or fold its roles into an existing edge on the same route.
    ///
    /// Merged roles keep first-seen order and are never repeated.
    pub fn insert(&mut self, edge: DotEdge) {
        let Some(existing) = self.edges.iter_mut().find(|e| e.same_route(&edge)) else {
            self.edges.push(edge);
            return;
        };

        if let Some(roles) = edge.roles {
            let merged = existing.roles.get_or_insert_with(Vec::new);
            for role in roles {
                if !merged.contains(&role) {
                    merged.push(role);
                }
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &DotEdge> {
        self.edges.iter()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn into_vec(self) -> Vec<DotEdge> {
        self.edges
    }
}

impl FromIterator<DotEdge> for EdgeSet {
    fn from_iter<I: IntoIterator<Item = DotEdge>>(iter: I) -> Self {
        let mut set = Self::new();
        for edge in iter {
            set.insert(edge);
        }
        set
    }
}
