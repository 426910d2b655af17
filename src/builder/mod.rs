//! Builder API for ergonomic machine construction.
//!
//! This module provides fluent builders and macros for declaring transitions
//! and attaching machines to host values with minimal boilerplate.

pub mod error;
pub mod machine;
pub mod macros;
pub mod transition;

pub use error::BuildError;
pub use machine::MachineBuilder;
pub use transition::TransitionBuilder;

use crate::core::{State, Transition};

/// Create an unconditional transition without effects.
///
/// # Example
///
/// ```
/// use soteria::builder::transition;
/// use soteria::state_enum;
///
/// state_enum! {
///     enum Matter {
///         Liquid,
///         Gas,
///     }
/// }
///
/// let evaporate = transition(Matter::Liquid, Matter::Gas);
/// assert!(evaporate.conditions.is_empty());
/// ```
pub fn transition<S: State>(from: S, to: S) -> Transition<S> {
    Transition::new([from], to)
}

/// Create a transition guarded by a single named condition.
///
/// # Example
///
/// ```
/// use soteria::builder::guarded_transition;
/// use soteria::state_enum;
///
/// state_enum! {
///     enum Mode {
///         Idle,
///         Sleeping,
///     }
/// }
///
/// let nap = guarded_transition(Mode::Idle, Mode::Sleeping, "tired");
/// assert_eq!(nap.conditions, vec!["tired".to_string()]);
/// ```
pub fn guarded_transition<S: State>(from: S, to: S, condition: impl Into<String>) -> Transition<S> {
    let mut transition = Transition::new([from], to);
    transition.conditions.push(condition.into());
    transition
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::state_enum! {
        enum TestState {
            Idle,
            Sleeping,
        }
    }

    #[test]
    fn transition_has_single_origin() {
        let t = transition(TestState::Idle, TestState::Sleeping);

        assert_eq!(t.origins, vec![TestState::Idle]);
        assert_eq!(t.destination, TestState::Sleeping);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn guarded_transition_names_condition() {
        let t = guarded_transition(TestState::Idle, TestState::Sleeping, "tired");

        assert!(t.allows_origin(&TestState::Idle));
        assert!(!t.allows_origin(&TestState::Sleeping));
        assert_eq!(t.conditions, vec!["tired".to_string()]);
    }
}
