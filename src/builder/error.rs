//! Build errors for machine and transition builders.

use crate::core::DictionaryViolation;
use thiserror::Error;

/// Errors that can occur when building machines and transitions.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Host context not specified. Call .context(value) before .build()")]
    MissingContext,

    #[error("No transitions or states defined. Call .transitions(dict) or .states(list)")]
    MissingBlueprint,

    #[error("Transition origin states not specified. Call .from(state) or .from_any(states)")]
    MissingOrigins,

    #[error("Transition destination not specified. Call .to(state)")]
    MissingDestination,

    #[error("Current state '{state}' is not one of the machine's known states")]
    UnknownInitialState { state: String },

    #[error("Transition dictionary is invalid ({} violation(s)): {}", .0.len(), list(.0))]
    InvalidDictionary(Vec<DictionaryViolation>),

    #[error("Transition dictionary could not be parsed: {0}")]
    Json(#[from] serde_json::Error),
}

fn list(violations: &[DictionaryViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
