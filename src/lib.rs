//! Soteria: declarative state machines attached to host values
//!
//! A host value keeps its own current state. Soteria attaches a machine to
//! it: a trigger dictionary names, for each trigger, an ordered list of
//! candidate transitions with guard and effect names. Firing a trigger tries
//! the candidates in order and commits the first one whose guards pass,
//! returning a full record of what was tried.
//!
//! # Core Concepts
//!
//! - **State**: Equality-comparable labels via the `State` trait
//! - **Host**: Any `Clone + Debug` value implementing `Stateful`
//! - **Dictionary**: Ordered trigger → candidate transitions, loadable from JSON
//! - **Capabilities**: Guards and effects registered by name
//! - **Results**: Attempt trails with host snapshots at every step
//!
//! # Example
//!
//! ```rust
//! use soteria::builder::{guarded_transition, transition, MachineBuilder};
//! use soteria::core::TransitionDict;
//! use soteria::engine::FailureKind;
//! use soteria::{state_enum, stateful};
//!
//! state_enum! {
//!     enum Gait {
//!         Stopped as "stopped",
//!         Walking as "walking",
//!     }
//! }
//!
//! #[derive(Clone, Debug)]
//! struct Walker {
//!     state: Gait,
//!     speed: u32,
//!     energy: u32,
//! }
//!
//! stateful!(Walker, state: Gait);
//!
//! let mut walk = guarded_transition(Gait::Stopped, Gait::Walking, "hasEnergy");
//! walk.effects.push("speedUp".into());
//!
//! let mut walker = MachineBuilder::new()
//!     .context(Walker { state: Gait::Stopped, speed: 0, energy: 1 })
//!     .transitions(
//!         TransitionDict::new()
//!             .on("walk", walk)
//!             .on("stop", transition(Gait::Walking, Gait::Stopped)),
//!     )
//!     .guard("hasEnergy", |w: &Walker| w.energy > 0)
//!     .effect("speedUp", |w: &mut Walker, _: &()| {
//!         w.speed = 1;
//!         w.energy -= 1;
//!     })
//!     .build()
//!     .unwrap();
//!
//! walker.trigger("walk").unwrap();
//! assert_eq!(walker.state(), &Gait::Walking);
//! assert_eq!((walker.speed, walker.energy), (1, 0));
//!
//! walker.trigger("stop").unwrap();
//! let err = walker.trigger("walk").unwrap_err();
//! assert_eq!(err.kind, FailureKind::ConditionValue);
//! ```

pub mod builder;
pub mod core;
pub mod engine;
pub mod reactive;

// Re-export commonly used types
pub use builder::{BuildError, MachineBuilder, TransitionBuilder};
pub use core::{State, StateHistory, StateTransition, Stateful, Transition, TransitionDict};
pub use engine::{
    Capabilities, FailureKind, Machine, MachineOptions, TransitionError, TransitionOptions,
    TransitionResult,
};
