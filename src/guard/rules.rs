//! Per-transition rules: who may fire a transition and what it depends on.

use serde::{Deserialize, Serialize};

/// Roles allowed to fire a transition, and an optional predicate that must
/// also hold for the acting role.
///
/// The predicate is only consulted after the role is found in `roles`.
///
/// # Example
///
/// ```rust
/// use machinist::guard::TransitionRule;
///
/// let rule = TransitionRule::new(["driver"]).depends_on("has_key");
///
/// assert!(rule.allows("driver"));
/// assert!(!rule.allows("thief"));
/// assert_eq!(rule.depends.as_deref(), Some("has_key"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRule {
    #[serde(alias = "role")]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends: Option<String>,
}

impl TransitionRule {
    pub fn new<I, R>(roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
            depends: None,
        }
    }

    /// Require the named predicate to hold for the acting role.
    pub fn depends_on(mut self, predicate: impl Into<String>) -> Self {
        self.depends = Some(predicate.into());
        self
    }

    pub fn allows(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// True when at least one of `candidates` is allowed.
    pub fn allows_any<'a, I>(&self, candidates: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        candidates.into_iter().any(|role| self.allows(role))
    }
}

/// Outcome of a guard check that did not fail outright.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Authorization {
    Allowed,
    Denied,
}

impl Authorization {
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }
}

impl From<bool> for Authorization {
    fn from(allowed: bool) -> Self {
        if allowed {
            Self::Allowed
        } else {
            Self::Denied
        }
    }
}
