//! Trigger evaluation over a host context.
//!
//! A [`Machine`] owns a host value and a transition dictionary. Firing a
//! trigger walks the trigger's candidates in declaration order:
//!
//! - the current state must be an origin of at least one candidate
//! - each candidate's conditions run in order; a false condition moves on
//!   to the next candidate
//! - effects of the first passing candidate run in order, then the host's
//!   state is set to the destination
//!
//! Every call produces a [`TransitionResult`] with host snapshots taken at
//! each step. Failures are delivered either as an unsuccessful result or as
//! a [`TransitionError`] carrying that result, depending on
//! [`MachineOptions::throw_exceptions`].

mod capabilities;
mod effect;
mod error;
mod machine;
mod options;
mod result;

pub use capabilities::Capabilities;
pub use effect::Effect;
pub use error::{FailureKind, TransitionError, TransitionFailure};
pub use machine::{Machine, TransitionOutcome};
pub use options::{ErrorHandler, MachineOptions, TransitionOptions, TriggerArgs};
pub use result::{
    AvailableTransition, ConditionStatus, MethodAttempt, TransitionAttempt, TransitionResult,
};
