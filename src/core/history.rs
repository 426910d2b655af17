//! Committed state-change history.
//!
//! Only transitions that actually changed the host's state field are kept
//! here. Failed or partial attempts live in [`crate::engine::TransitionResult`].

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single committed state change.
///
/// # Example
///
/// ```rust
/// use soteria::core::{State, StateTransition};
/// use serde::{Deserialize, Serialize};
/// use chrono::Utc;
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Gait {
///     Stopped,
///     Walking,
/// }
///
/// impl State for Gait {
///     fn name(&self) -> &str {
///         match self {
///             Self::Stopped => "Stopped",
///             Self::Walking => "Walking",
///         }
///     }
/// }
///
/// let transition = StateTransition {
///     from: Gait::Stopped,
///     to: Gait::Walking,
///     trigger: Some("walk".to_string()),
///     timestamp: Utc::now(),
/// };
/// assert!(!transition.is_direct());
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: State> {
    /// The state being transitioned from
    pub from: S,
    /// The state being transitioned to
    pub to: S,
    /// Trigger that caused the change, `None` for a direct `to` jump
    pub trigger: Option<String>,
    /// When the change was committed
    pub timestamp: DateTime<Utc>,
}

impl<S: State> StateTransition<S> {
    /// Whether this change came from a direct jump rather than a trigger.
    pub fn is_direct(&self) -> bool {
        self.trigger.is_none()
    }
}

/// Ordered history of committed state changes.
///
/// `record` returns a new history and leaves the receiver untouched. The
/// engine appends in place through `push`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    transitions: Vec<StateTransition<S>>,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    pub fn record(&self, transition: StateTransition<S>) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// Append a transition in place.
    pub(crate) fn push(&mut self, transition: StateTransition<S>) {
        self.transitions.push(transition);
    }

    /// Get the path of states traversed.
    ///
    /// Returns the first `from` state followed by the `to` state of each
    /// recorded change.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Time elapsed between the first and last recorded change.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// Changes caused by the given trigger, in order.
    pub fn by_trigger<'a>(&'a self, trigger: &'a str) -> impl Iterator<Item = &'a StateTransition<S>> {
        self.transitions
            .iter()
            .filter(move |t| t.trigger.as_deref() == Some(trigger))
    }

    /// Get all transitions.
    pub fn transitions(&self) -> &[StateTransition<S>] {
        &self.transitions
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
