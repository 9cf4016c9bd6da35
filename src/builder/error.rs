//! Build errors for machine builders and configuration.

use thiserror::Error;

use super::validate::DefinitionIssue;

/// Errors that can occur when building a machine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("No transitions defined. Add at least one transition")]
    NoTransitions,

    #[error("Invalid machine definition: {}", describe(.issues))]
    Invalid { issues: Vec<DefinitionIssue> },
}

fn describe(issues: &[DefinitionIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors that can occur when loading a machine from a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Build(#[from] BuildError),
}
