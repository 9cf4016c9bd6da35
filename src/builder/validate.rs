//! Definition checks run before a machine is assembled.
//!
//! Every check contributes its own `Validation`, and the results are folded
//! with `all_vec`, so a definition with several mistakes reports all of them.

use std::collections::{HashMap, HashSet};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

use crate::core::{Source, Transition};
use crate::guard::TransitionRule;

/// One mistake in a machine definition.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DefinitionIssue {
    #[error("Machine name is empty")]
    EmptyName,

    #[error("A transition has an empty name")]
    EmptyTransitionName,

    #[error("Transition '{name}' is declared more than once")]
    DuplicateTransition { name: String },

    #[error("Transition '{transition}' declares the source state '{state}' more than once")]
    DuplicateSource { transition: String, state: String },

    #[error("Transition '{transition}' has an edge with an empty state")]
    EmptyState { transition: String },

    #[error("A rule refers to the unknown transition '{transition}'")]
    UnknownRuleTransition { transition: String },

    #[error("The rule for '{transition}' allows no roles")]
    EmptyRoleSet { transition: String },

    #[error("Initial state '{state}' does not appear in any transition")]
    UnknownInitialState { state: String },

    #[error("A method named '{name}' is already registered")]
    DuplicateMethod { name: String },
}

type Check = Validation<(), NonEmptyVec<DefinitionIssue>>;

fn check(ok: bool, issue: impl FnOnce() -> DefinitionIssue) -> Check {
    if ok {
        Validation::success(())
    } else {
        Validation::fail(issue())
    }
}

/// Check a definition: names, edges, rules and the initial state.
pub(crate) fn validate_definition(
    name: &str,
    initial: &str,
    transitions: &[Transition],
    rules: &HashMap<String, TransitionRule>,
) -> Check {
    let mut checks: Vec<Check> = vec![check(!name.trim().is_empty(), || DefinitionIssue::EmptyName)];

    let mut seen = HashSet::new();
    for transition in transitions {
        checks.extend(transition_checks(transition, &mut seen));
    }

    let mut ruled: Vec<_> = rules.iter().collect();
    ruled.sort_by(|a, b| a.0.cmp(b.0));
    for (transition, rule) in ruled {
        checks.push(check(seen.contains(transition.as_str()), || {
            DefinitionIssue::UnknownRuleTransition {
                transition: transition.clone(),
            }
        }));
        checks.push(check(!rule.roles.is_empty(), || DefinitionIssue::EmptyRoleSet {
            transition: transition.clone(),
        }));
    }

    let declared = transitions
        .iter()
        .flat_map(|t| t.edges())
        .any(|(source, to)| to == initial || (!source.is_all() && source.as_str() == initial));
    checks.push(check(declared, || DefinitionIssue::UnknownInitialState {
        state: initial.to_string(),
    }));

    Validation::all_vec(checks).map(|_| ())
}

fn transition_checks<'a>(transition: &'a Transition, seen: &mut HashSet<&'a str>) -> Vec<Check> {
    let name = transition.name();
    if name.trim().is_empty() {
        return vec![Validation::fail(DefinitionIssue::EmptyTransitionName)];
    }

    let mut checks = vec![check(seen.insert(name), || DefinitionIssue::DuplicateTransition {
        name: name.to_string(),
    })];

    let mut sources: HashSet<&Source> = HashSet::new();
    for (source, to) in transition.edges() {
        checks.push(check(sources.insert(source), || DefinitionIssue::DuplicateSource {
            transition: name.to_string(),
            state: source.to_string(),
        }));
        checks.push(check(!source.as_str().is_empty() && !to.is_empty(), || {
            DefinitionIssue::EmptyState {
                transition: name.to_string(),
            }
        }));
    }

    checks
}

/// Flatten a failed validation into its issues.
pub(crate) fn issues(errors: &NonEmptyVec<DefinitionIssue>) -> Vec<DefinitionIssue> {
    errors.iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(from: &str, to: &str) -> (Source, String) {
        (Source::from(from), to.to_string())
    }

    fn vehicle() -> Vec<Transition> {
        vec![
            Transition::new("ignite", vec![edge("parked", "idling")]),
            Transition::new("turn_off", vec![edge("all", "parked")]),
            Transition::new("baz", vec![]),
        ]
    }

    #[test]
    fn valid_definition_passes() {
        let mut rules = HashMap::new();
        rules.insert("ignite".to_string(), TransitionRule::new(["driver"]));

        let result = validate_definition("vehicle", "parked", &vehicle(), &rules);

        assert!(result.is_success());
    }

    #[test]
    fn all_issues_are_reported_together() {
        let mut transitions = vehicle();
        transitions.push(Transition::new("ignite", vec![edge("stalled", "stalled")]));
        transitions.push(Transition::new(
            "park",
            vec![edge("idling", "parked"), edge("idling", "towed")],
        ));

        let mut rules = HashMap::new();
        rules.insert("fly".to_string(), TransitionRule::new(["pilot"]));
        rules.insert("park".to_string(), TransitionRule::new(Vec::<String>::new()));

        let result = validate_definition("", "garage", &transitions, &rules);

        match result {
            Validation::Failure(errors) => {
                let found = issues(&errors);
                assert_eq!(found.len(), 6);
                assert!(found.contains(&DefinitionIssue::EmptyName));
                assert!(found.contains(&DefinitionIssue::DuplicateTransition {
                    name: "ignite".to_string()
                }));
                assert!(found.contains(&DefinitionIssue::DuplicateSource {
                    transition: "park".to_string(),
                    state: "idling".to_string()
                }));
                assert!(found.contains(&DefinitionIssue::UnknownRuleTransition {
                    transition: "fly".to_string()
                }));
                assert!(found.contains(&DefinitionIssue::EmptyRoleSet {
                    transition: "park".to_string()
                }));
                assert!(found.contains(&DefinitionIssue::UnknownInitialState {
                    state: "garage".to_string()
                }));
            }
            Validation::Success(_) => panic!("Expected failures, got success"),
        }
    }

    #[test]
    fn empty_transition_name_is_reported() {
        let transitions = vec![Transition::new(" ", vec![edge("parked", "idling")])];

        let result = validate_definition("vehicle", "parked", &transitions, &HashMap::new());

        if let Validation::Failure(errors) = result {
            assert_eq!(issues(&errors), [DefinitionIssue::EmptyTransitionName]);
        } else {
            panic!("Expected failure");
        }
    }

    #[test]
    fn all_is_not_a_state() {
        let transitions = vec![Transition::new("turn_off", vec![edge("all", "parked")])];

        let result = validate_definition("vehicle", "all", &transitions, &HashMap::new());

        assert!(result.is_failure());
    }
}
