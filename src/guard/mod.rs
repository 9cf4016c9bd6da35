//! Role guards for transitions.
//!
//! A transition without a [`TransitionRule`] is open to everyone. A rule
//! names the roles allowed to fire it and, optionally, a predicate that must
//! also hold for the acting role. Checking goes in two stages:
//!
//! 1. role membership, always first
//! 2. the dependent predicate, only for a role that passed stage 1
//!
//! Predicates resolve to a method registered on the machine first, then to
//! a predicate the entity type exposes through [`RolePredicates`].

mod methods;
mod rules;

pub use methods::{Method, MethodOutcome, MethodRegistry};
pub use rules::{Authorization, TransitionRule};

use crate::core::inflect::underscore;
use crate::core::EntityState;
use crate::machine::MachineError;

/// A named predicate implemented by the entity type.
pub type Predicate<E> = fn(&E, &str) -> bool;

/// Predicates an entity type offers to dependent transition rules.
///
/// The default implementation offers none.
///
/// # Example
///
/// ```rust
/// use machinist::guard::{Predicate, RolePredicates};
///
/// struct Vehicle;
///
/// impl Vehicle {
///     fn has_key(&self, role: &str) -> bool {
///         role == "driver"
///     }
/// }
///
/// impl RolePredicates for Vehicle {
///     fn predicate(name: &str) -> Option<Predicate<Self>> {
///         match name {
///             "has_key" => Some(Vehicle::has_key),
///             _ => None,
///         }
///     }
/// }
///
/// let has_key = Vehicle::predicate("has_key").unwrap();
/// assert!(has_key(&Vehicle, "driver"));
/// ```
pub trait RolePredicates: Sized {
    /// Look up a predicate by its underscored name.
    fn predicate(_name: &str) -> Option<Predicate<Self>> {
        None
    }
}

impl RolePredicates for EntityState {}

/// Decide whether `role` may fire `transition` on `entity`.
///
/// Returns [`MachineError::RoleRequired`] when the transition has a rule and
/// no role was given.
pub(crate) fn authorize<E: RolePredicates>(
    rule: Option<&TransitionRule>,
    transition: &str,
    role: Option<&str>,
    entity: &E,
    methods: &MethodRegistry,
) -> Result<Authorization, MachineError> {
    let Some(rule) = rule else {
        return Ok(Authorization::Allowed);
    };

    let Some(role) = role.filter(|r| !r.is_empty()) else {
        return Err(MachineError::RoleRequired {
            transition: transition.to_string(),
        });
    };

    if !rule.allows(role) {
        tracing::debug!(transition, role, "role is not allowed by the transition rule");
        return Ok(Authorization::Denied);
    }

    let Some(depends) = rule.depends.as_deref() else {
        return Ok(Authorization::Allowed);
    };

    let verdict = match methods.predicate(depends, role) {
        Some(result) => result,
        None => match E::predicate(&underscore(depends)) {
            Some(predicate) => predicate(entity, role),
            None => {
                tracing::debug!(transition, predicate = depends, "dependent predicate is not defined");
                false
            }
        },
    };

    if !verdict {
        tracing::debug!(transition, role, predicate = depends, "dependent predicate denied the transition");
    }

    Ok(Authorization::from(verdict))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Vehicle {
        keys: Vec<&'static str>,
    }

    impl Vehicle {
        fn has_key(&self, role: &str) -> bool {
            self.keys.iter().any(|k| *k == role)
        }

        fn available_parking(&self, role: &str) -> bool {
            role == "thief"
        }
    }

    impl RolePredicates for Vehicle {
        fn predicate(name: &str) -> Option<Predicate<Self>> {
            match name {
                "has_key" => Some(Vehicle::has_key),
                "available_parking" => Some(Vehicle::available_parking),
                _ => None,
            }
        }
    }

    fn vehicle() -> Vehicle {
        Vehicle {
            keys: vec!["driver"],
        }
    }

    #[test]
    fn no_rule_allows_any_role() {
        let methods = MethodRegistry::new();

        for role in [None, Some("driver"), Some("")] {
            let verdict = authorize(None, "shift_up", role, &vehicle(), &methods).unwrap();
            assert_eq!(verdict, Authorization::Allowed);
        }
    }

    #[test]
    fn rule_without_role_is_an_error() {
        let rule = TransitionRule::new(["driver"]);
        let methods = MethodRegistry::new();

        let result = authorize(Some(&rule), "ignite", None, &vehicle(), &methods);
        assert!(matches!(
            result,
            Err(MachineError::RoleRequired { transition }) if transition == "ignite"
        ));
    }

    #[test]
    fn unlisted_role_is_denied_before_predicate_runs() {
        let rule = TransitionRule::new(["driver"]).depends_on("probe");
        let mut methods = MethodRegistry::new();
        methods
            .add("probe", |_| panic!("predicate must not run for an unlisted role"))
            .unwrap();

        let verdict = authorize(Some(&rule), "ignite", Some("thief"), &vehicle(), &methods).unwrap();
        assert_eq!(verdict, Authorization::Denied);
    }

    #[test]
    fn entity_predicate_decides() {
        let rule = TransitionRule::new(["driver", "thief"]).depends_on("available_parking");
        let methods = MethodRegistry::new();

        let driver = authorize(Some(&rule), "park", Some("driver"), &vehicle(), &methods).unwrap();
        let thief = authorize(Some(&rule), "park", Some("thief"), &vehicle(), &methods).unwrap();

        assert_eq!(driver, Authorization::Denied);
        assert_eq!(thief, Authorization::Allowed);
    }

    #[test]
    fn registered_method_overrides_entity_predicate() {
        let rule = TransitionRule::new(["driver"]).depends_on("has_key");
        let mut methods = MethodRegistry::new();
        methods.add("hasKey", |_| json!(false)).unwrap();

        let verdict = authorize(Some(&rule), "ignite", Some("driver"), &vehicle(), &methods).unwrap();
        assert_eq!(verdict, Authorization::Denied);
    }

    #[test]
    fn missing_predicate_denies() {
        let rule = TransitionRule::new(["mechanic"]).depends_on("has_tools");
        let methods = MethodRegistry::new();

        let verdict =
            authorize(Some(&rule), "repair", Some("mechanic"), &vehicle(), &methods).unwrap();
        assert_eq!(verdict, Authorization::Denied);
    }
}
