//! Core state machine types.
//!
//! This module holds the declarative side of a machine:
//! - States and the host contract via `State` and `Stateful`
//! - Transition descriptors and the trigger dictionary
//! - Guard predicates over a host context
//! - Committed state-change history
//!
//! Nothing here mutates a host. Evaluation lives in [`crate::engine`].

mod dictionary;
mod guard;
mod history;
mod state;

pub use dictionary::{Blueprint, DictionaryViolation, Transition, TransitionDict};
pub use guard::{BoxError, Guard};
pub use history::{StateHistory, StateTransition};
pub use state::{State, Stateful};
