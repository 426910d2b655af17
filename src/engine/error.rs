//! Failure taxonomy for trigger and jump calls.

use super::result::TransitionResult;
use crate::core::State;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Debug;
use thiserror::Error;

/// Why a `trigger` or `to` call failed. Exactly one per failing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// The machine was built from a state list and has no dictionary.
    TransitionsUndefined,
    /// The trigger has no candidate transitions.
    TriggerUndefined,
    /// The current state is not an origin of any candidate.
    OriginDisallowed,
    /// A named condition is not registered.
    ConditionUndefined,
    /// A condition evaluated false and no later candidate remained.
    ConditionValue,
    /// A named effect is not registered.
    EffectUndefined,
    /// An effect returned an error.
    EffectError,
    /// The target of a direct jump is not a known state.
    DestinationInvalid,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TransitionsUndefined => "TransitionsUndefined",
            Self::TriggerUndefined => "TriggerUndefined",
            Self::OriginDisallowed => "OriginDisallowed",
            Self::ConditionUndefined => "ConditionUndefined",
            Self::ConditionValue => "ConditionValue",
            Self::EffectUndefined => "EffectUndefined",
            Self::EffectError => "EffectError",
            Self::DestinationInvalid => "DestinationInvalid",
        }
    }

    /// Failures caused by a name that does not resolve.
    ///
    /// These point at a misconfigured machine rather than a runtime
    /// condition.
    pub fn is_undefined(&self) -> bool {
        matches!(
            self,
            Self::TransitionsUndefined
                | Self::TriggerUndefined
                | Self::ConditionUndefined
                | Self::EffectUndefined
        )
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure details recorded on a result or an attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionFailure {
    pub kind: FailureKind,
    /// Trigger being evaluated, `None` for direct jumps
    pub trigger: Option<String>,
    /// Condition or effect name involved, if any
    pub method: Option<String>,
}

impl TransitionFailure {
    pub fn new(kind: FailureKind, trigger: Option<&str>, method: Option<&str>) -> Self {
        Self {
            kind,
            trigger: trigger.map(str::to_string),
            method: method.map(str::to_string),
        }
    }

    pub fn is_undefined(&self) -> bool {
        self.kind.is_undefined()
    }
}

/// Error returned when a failure is delivered as an `Err`.
///
/// Trigger failures carry the full, partially built result so the attempt
/// trail is available either way. Direct jumps carry no result.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct TransitionError<S: State, C: Debug> {
    pub kind: FailureKind,
    pub message: String,
    pub result: Option<Box<TransitionResult<S, C>>>,
}

impl<S: State, C: Debug> TransitionError<S, C> {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            result: None,
        }
    }

    pub fn with_result(mut self, result: TransitionResult<S, C>) -> Self {
        self.result = Some(Box::new(result));
        self
    }

    /// Take the attached result, if any.
    pub fn into_result(self) -> Option<TransitionResult<S, C>> {
        self.result.map(|result| *result)
    }
}
