//! Registry of guards and effects, looked up by name at trigger time.

use super::effect::Effect;
use crate::core::{BoxError, Guard};
use std::collections::HashMap;
use std::fmt;

/// Named guards and effects available to a machine.
///
/// Transition dictionaries refer to guards and effects by name only. A name
/// missing from this registry is reported as `ConditionUndefined` or
/// `EffectUndefined` when a trigger reaches it, not when the machine is built.
///
/// # Example
///
/// ```rust
/// use soteria::engine::Capabilities;
///
/// #[derive(Clone, Debug)]
/// struct Walker {
///     energy: u32,
/// }
///
/// let caps: Capabilities<Walker> = Capabilities::new()
///     .guard("hasEnergy", |w: &Walker| w.energy > 0)
///     .effect("speedUp", |w: &mut Walker, _: &()| w.energy -= 1);
///
/// assert!(caps.has_guard("hasEnergy"));
/// assert!(caps.has_effect("speedUp"));
/// assert!(!caps.has_effect("slowDown"));
/// ```
pub struct Capabilities<C, P = ()> {
    guards: HashMap<String, Guard<C>>,
    effects: HashMap<String, Effect<C, P>>,
}

impl<C, P> Capabilities<C, P> {
    pub fn new() -> Self {
        Self {
            guards: HashMap::new(),
            effects: HashMap::new(),
        }
    }

    /// Register an infallible guard.
    pub fn guard<F>(self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        self.with_guard(name, Guard::new(predicate))
    }

    /// Register a guard whose evaluation can fail.
    pub fn try_guard<F, E>(self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&C) -> Result<bool, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.with_guard(name, Guard::fallible(predicate))
    }

    /// Register a prebuilt guard. Replaces any guard with the same name.
    pub fn with_guard(mut self, name: impl Into<String>, guard: Guard<C>) -> Self {
        self.guards.insert(name.into(), guard);
        self
    }

    /// Register an infallible effect.
    pub fn effect<F>(self, name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&mut C, &P) + Send + Sync + 'static,
    {
        self.with_effect(name, Effect::new(action))
    }

    /// Register an effect that can fail.
    pub fn try_effect<F, E>(self, name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&mut C, &P) -> Result<(), E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.with_effect(name, Effect::fallible(action))
    }

    /// Register a prebuilt effect. Replaces any effect with the same name.
    pub fn with_effect(mut self, name: impl Into<String>, effect: Effect<C, P>) -> Self {
        self.effects.insert(name.into(), effect);
        self
    }

    pub fn get_guard(&self, name: &str) -> Option<&Guard<C>> {
        self.guards.get(name)
    }

    pub fn get_effect(&self, name: &str) -> Option<&Effect<C, P>> {
        self.effects.get(name)
    }

    pub fn has_guard(&self, name: &str) -> bool {
        self.guards.contains_key(name)
    }

    pub fn has_effect(&self, name: &str) -> bool {
        self.effects.contains_key(name)
    }
}

impl<C, P> Default for Capabilities<C, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, P> fmt::Debug for Capabilities<C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut guards: Vec<&str> = self.guards.keys().map(String::as_str).collect();
        let mut effects: Vec<&str> = self.effects.keys().map(String::as_str).collect();
        guards.sort_unstable();
        effects.sort_unstable();
        f.debug_struct("Capabilities")
            .field("guards", &guards)
            .field("effects", &effects)
            .finish()
    }
}
