//! Reactive triggering.
//!
//! Dependencies notify listeners when they change; a [`ReactiveMachine`]
//! turns those notifications into queued trigger names and fires them on
//! [`ReactiveMachine::process`]. [`Signal`] is a minimal dependency; anything
//! implementing [`Dependency`] can be watched.

mod machine;
mod signal;

pub use machine::ReactiveMachine;
pub use signal::{Dependency, Listener, Signal, Subscription};
