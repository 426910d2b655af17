//! State values and the host-context contract.
//!
//! A machine never owns a copy of the current state. The host value keeps it,
//! and the machine reads and writes it through [`Stateful`].

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for state machine states.
///
/// States are opaque, equality-comparable labels. The engine only ever
/// compares and clones them; `name` is used for log lines and error messages.
///
/// # Required Traits
///
/// - `Clone`: states are copied into attempt records and history
/// - `PartialEq`: origin checks and known-state lookups
/// - `Debug`: diagnostics
/// - `Serialize` + `Deserialize`: transition dictionaries load from JSON
///
/// # Example
///
/// ```rust
/// use soteria::core::State;
/// use serde::{Deserialize, Serialize};
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
/// assert_eq!(Gait::Walking.name(), "Walking");
/// ```
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Get the state's name for display/logging.
    fn name(&self) -> &str;
}

/// Host values that carry a current-state field.
///
/// This is the whole interface a host has to provide. Guards and effects are
/// registered separately by name, see [`crate::engine::Capabilities`].
///
/// # Example
///
/// ```rust
/// use soteria::core::{State, Stateful};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Door { Open, Closed }
///
/// impl State for Door {
///     fn name(&self) -> &str {
///         match self {
///             Self::Open => "Open",
///             Self::Closed => "Closed",
///         }
///     }
/// }
///
/// #[derive(Clone, Debug)]
/// struct Room {
///     door: Door,
/// }
///
/// impl Stateful<Door> for Room {
///     fn state(&self) -> &Door {
///         &self.door
///     }
///
///     fn set_state(&mut self, state: Door) {
///         self.door = state;
///     }
/// }
///
/// let mut room = Room { door: Door::Closed };
/// room.set_state(Door::Open);
/// assert_eq!(room.state(), &Door::Open);
/// ```
pub trait Stateful<S: State> {
    /// Read the current state.
    fn state(&self) -> &S;

    /// Overwrite the current state.
    fn set_state(&mut self, state: S);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum Phase {
        Solid,
        Liquid,
        Gas,
    }

    impl State for Phase {
        fn name(&self) -> &str {
            match self {
                Self::Solid => "Solid",
                Self::Liquid => "Liquid",
                Self::Gas => "Gas",
            }
        }
    }

    #[derive(Clone, Debug)]
    struct Sample {
        phase: Phase,
        mass: u32,
    }

    impl Stateful<Phase> for Sample {
        fn state(&self) -> &Phase {
            &self.phase
        }

        fn set_state(&mut self, state: Phase) {
            self.phase = state;
        }
    }

    #[test]
    fn state_name_returns_correct_value() {
        assert_eq!(Phase::Solid.name(), "Solid");
        assert_eq!(Phase::Liquid.name(), "Liquid");
        assert_eq!(Phase::Gas.name(), "Gas");
    }

    #[test]
    fn state_serializes_correctly() {
        let json = serde_json::to_string(&Phase::Liquid).unwrap();
        let deserialized: Phase = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, Phase::Liquid);
    }

    #[test]
    fn stateful_set_state_only_touches_state_field() {
        let mut sample = Sample {
            phase: Phase::Solid,
            mass: 12,
        };

        sample.set_state(Phase::Gas);

        assert_eq!(sample.state(), &Phase::Gas);
        assert_eq!(sample.mass, 12);
    }
}
