//! Decision records produced by the engine.
//!
//! Every snapshot stored here is an owned clone of the host taken at the
//! moment the record was created, so later mutation of the live host never
//! shows up in a result.

use super::error::{FailureKind, TransitionFailure};
use crate::core::{State, Transition};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One condition or effect evaluation inside an attempt.
#[derive(Clone, Debug, Serialize)]
#[serde(bound(serialize = "C: Serialize"))]
pub struct MethodAttempt<C> {
    pub name: String,
    pub success: bool,
    /// Host snapshot taken just before evaluation
    pub context: C,
    /// Error text from a failing guard or effect
    pub error: Option<String>,
}

impl<C> MethodAttempt<C> {
    pub(crate) fn new(name: &str, context: C) -> Self {
        Self {
            name: name.to_string(),
            success: false,
            context,
            error: None,
        }
    }
}

/// Trace of one candidate transition tried during a trigger call.
#[derive(Clone, Debug, Serialize)]
#[serde(bound(serialize = "C: Serialize"))]
pub struct TransitionAttempt<S: State, C> {
    pub trigger: String,
    pub transition: Transition<S>,
    pub success: bool,
    pub failure: Option<TransitionFailure>,
    pub conditions: Vec<MethodAttempt<C>>,
    pub effects: Vec<MethodAttempt<C>>,
    /// Host snapshot taken when the attempt started
    pub context: C,
}

impl<S: State, C> TransitionAttempt<S, C> {
    pub(crate) fn new(trigger: &str, transition: Transition<S>, context: C) -> Self {
        Self {
            trigger: trigger.to_string(),
            transition,
            success: false,
            failure: None,
            conditions: Vec::new(),
            effects: Vec::new(),
            context,
        }
    }

    /// Kind of the failure recorded on this attempt, if any.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.failure.as_ref().map(|f| f.kind)
    }
}

/// Outcome of one trigger call.
///
/// Returned as-is when the machine does not raise, and attached to
/// [`super::TransitionError`] when it does.
#[derive(Clone, Debug, Serialize)]
#[serde(bound(serialize = "C: Serialize"))]
pub struct TransitionResult<S: State, C> {
    pub id: Uuid,
    pub trigger: String,
    pub success: bool,
    pub failure: Option<TransitionFailure>,
    /// State when the call started
    pub initial_state: S,
    /// State when the call returned
    pub current_state: S,
    /// Every candidate tried, in order
    pub attempts: Vec<TransitionAttempt<S, C>>,
    /// Host snapshot before any evaluation
    pub precontext: C,
    /// Host snapshot at return
    pub postcontext: C,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl<S: State, C> TransitionResult<S, C> {
    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.failure.as_ref().map(|f| f.kind)
    }

    /// The attempt that committed, if the call succeeded.
    pub fn winning_attempt(&self) -> Option<&TransitionAttempt<S, C>> {
        self.attempts.iter().find(|attempt| attempt.success)
    }

    /// Whether the call moved the host to a different state.
    pub fn changed_state(&self) -> bool {
        self.initial_state != self.current_state
    }

    /// Render the whole record as pretty JSON for audit logs.
    pub fn to_json(&self) -> Result<String, serde_json::Error>
    where
        C: Serialize,
    {
        serde_json::to_string_pretty(self)
    }
}

/// Snapshot data captured at trigger entry, before the outcome is known.
pub(crate) struct PendingResult<S, C> {
    pub(crate) id: Uuid,
    pub(crate) trigger: String,
    pub(crate) initial_state: S,
    pub(crate) precontext: C,
    pub(crate) started_at: DateTime<Utc>,
}

impl<S: State, C> PendingResult<S, C> {
    pub(crate) fn new(trigger: &str, initial_state: S, precontext: C) -> Self {
        Self {
            id: Uuid::new_v4(),
            trigger: trigger.to_string(),
            initial_state,
            precontext,
            started_at: Utc::now(),
        }
    }

    pub(crate) fn finish(
        self,
        attempts: Vec<TransitionAttempt<S, C>>,
        failure: Option<TransitionFailure>,
        current_state: S,
        postcontext: C,
    ) -> TransitionResult<S, C> {
        TransitionResult {
            id: self.id,
            trigger: self.trigger,
            success: failure.is_none(),
            failure,
            initial_state: self.initial_state,
            current_state,
            attempts,
            precontext: self.precontext,
            postcontext,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}

/// A transition that leaves the current state, as reported by
/// [`super::Machine::available_transitions`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(bound = "")]
pub struct AvailableTransition<S: State> {
    pub trigger: String,
    pub origins: Vec<S>,
    pub destination: S,
    /// All conditions currently hold
    pub satisfied: bool,
    pub conditions: Vec<ConditionStatus>,
    pub effects: Vec<String>,
}

/// Current value of one condition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConditionStatus {
    pub name: String,
    pub satisfied: bool,
}
