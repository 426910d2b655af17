//! Builder for constructing transition descriptors.

use crate::builder::error::BuildError;
use crate::core::{State, Transition};

/// Builder for constructing transitions with a fluent API.
///
/// ```rust
/// use soteria::builder::TransitionBuilder;
/// use soteria::state_enum;
///
/// state_enum! {
///     enum Matter {
///         Solid,
///         Liquid,
///     }
/// }
///
/// let melt = TransitionBuilder::new()
///     .from(Matter::Solid)
///     .to(Matter::Liquid)
///     .then("setEnvironment")
///     .build()
///     .unwrap();
///
/// assert_eq!(melt.effects, vec!["setEnvironment".to_string()]);
/// ```
pub struct TransitionBuilder<S: State> {
    origins: Vec<S>,
    destination: Option<S>,
    conditions: Vec<String>,
    effects: Vec<String>,
}

impl<S: State> TransitionBuilder<S> {
    pub fn new() -> Self {
        Self {
            origins: Vec::new(),
            destination: None,
            conditions: Vec::new(),
            effects: Vec::new(),
        }
    }

    /// Add an origin state. May be called more than once.
    pub fn from(mut self, state: S) -> Self {
        if !self.origins.contains(&state) {
            self.origins.push(state);
        }
        self
    }

    /// Add several origin states.
    pub fn from_any(self, states: impl IntoIterator<Item = S>) -> Self {
        states.into_iter().fold(self, |builder, state| builder.from(state))
    }

    /// Set the destination state (required).
    pub fn to(mut self, state: S) -> Self {
        self.destination = Some(state);
        self
    }

    /// Append a named condition. Conditions run in the order added.
    pub fn when(mut self, condition: impl Into<String>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    /// Append a named effect. Effects run in the order added.
    pub fn then(mut self, effect: impl Into<String>) -> Self {
        self.effects.push(effect.into());
        self
    }

    /// Build the transition.
    /// Returns an error if origins or destination are missing.
    pub fn build(self) -> Result<Transition<S>, BuildError> {
        if self.origins.is_empty() {
            return Err(BuildError::MissingOrigins);
        }
        let destination = self.destination.ok_or(BuildError::MissingDestination)?;

        Ok(Transition {
            origins: self.origins,
            destination,
            conditions: self.conditions,
            effects: self.effects,
        })
    }
}

impl<S: State> Default for TransitionBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}
