//! Builder for constructing machines.

use crate::builder::error::BuildError;
use crate::core::{Blueprint, BoxError, Guard, State, Stateful, TransitionDict};
use crate::engine::{Capabilities, Effect, Machine, MachineOptions};
use std::fmt::Debug;

/// Builder for constructing machines with a fluent API.
///
/// ```rust
/// use soteria::builder::{MachineBuilder, TransitionBuilder};
/// use soteria::core::TransitionDict;
/// use soteria::{state_enum, stateful};
///
/// state_enum! {
///     enum Mode {
///         Idle,
///         Sleeping,
///     }
/// }
///
/// #[derive(Clone, Debug)]
/// struct Hero {
///     mode: Mode,
///     energy: u32,
/// }
///
/// stateful!(Hero, mode: Mode);
///
/// let sleep = TransitionBuilder::new()
///     .from(Mode::Idle)
///     .to(Mode::Sleeping)
///     .when("tired")
///     .build()
///     .unwrap();
///
/// let mut hero = MachineBuilder::new()
///     .context(Hero { mode: Mode::Idle, energy: 0 })
///     .transitions(TransitionDict::new().on("sleep", sleep))
///     .guard("tired", |h: &Hero| h.energy == 0)
///     .build()
///     .unwrap();
///
/// hero.trigger("sleep").unwrap();
/// assert_eq!(hero.state(), &Mode::Sleeping);
/// ```
pub struct MachineBuilder<S: State, C, P = ()> {
    context: Option<C>,
    blueprint: Option<Blueprint<S>>,
    capabilities: Capabilities<C, P>,
    options: MachineOptions,
}

impl<S, C> MachineBuilder<S, C>
where
    S: State,
    C: Stateful<S> + Clone + Debug,
{
    /// Create a new builder for effects that take no props.
    pub fn new() -> Self {
        Self::with_props()
    }
}

impl<S, C, P> MachineBuilder<S, C, P>
where
    S: State,
    C: Stateful<S> + Clone + Debug,
{
    /// Create a new builder whose effects receive props of type `P`.
    pub fn with_props() -> Self {
        Self {
            context: None,
            blueprint: None,
            capabilities: Capabilities::new(),
            options: MachineOptions::default(),
        }
    }

    /// Set the host value (required).
    pub fn context(mut self, context: C) -> Self {
        self.context = Some(context);
        self
    }

    /// Use a transition dictionary. Replaces any earlier blueprint.
    pub fn transitions(mut self, dict: TransitionDict<S>) -> Self {
        self.blueprint = Some(Blueprint::Transitions(dict));
        self
    }

    /// Parse and use a JSON transition dictionary.
    pub fn transitions_json(self, json: &str) -> Result<Self, BuildError> {
        let dict = TransitionDict::from_json(json)?;
        Ok(self.transitions(dict))
    }

    /// Use a plain state list; only direct jumps will be available.
    pub fn states(mut self, states: impl IntoIterator<Item = S>) -> Self {
        self.blueprint = Some(Blueprint::States(states.into_iter().collect()));
        self
    }

    pub fn guard<F>(mut self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        self.capabilities = self.capabilities.with_guard(name, Guard::new(predicate));
        self
    }

    pub fn try_guard<F, E>(mut self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&C) -> Result<bool, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.capabilities = self.capabilities.with_guard(name, Guard::fallible(predicate));
        self
    }

    pub fn effect<F>(mut self, name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&mut C, &P) + Send + Sync + 'static,
    {
        self.capabilities = self.capabilities.with_effect(name, Effect::new(action));
        self
    }

    pub fn try_effect<F, E>(mut self, name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&mut C, &P) -> Result<(), E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.capabilities = self.capabilities.with_effect(name, Effect::fallible(action));
        self
    }

    /// Replace the whole registry.
    pub fn capabilities(mut self, capabilities: Capabilities<C, P>) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn options(mut self, options: MachineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn verbosity(mut self, verbosity: bool) -> Self {
        self.options.verbosity = verbosity;
        self
    }

    pub fn throw_exceptions(mut self, throw_exceptions: bool) -> Self {
        self.options.throw_exceptions = throw_exceptions;
        self
    }

    pub fn strict_origins(mut self, strict_origins: bool) -> Self {
        self.options.strict_origins = strict_origins;
        self
    }

    /// Build the machine.
    /// Returns an error if required fields are missing or the blueprint is
    /// rejected by [`Machine::new`].
    pub fn build(self) -> Result<Machine<S, C, P>, BuildError> {
        let context = self.context.ok_or(BuildError::MissingContext)?;
        let blueprint = self.blueprint.ok_or(BuildError::MissingBlueprint)?;

        Machine::new(context, blueprint, self.capabilities, self.options)
    }
}

impl<S, C, P> Default for MachineBuilder<S, C, P>
where
    S: State,
    C: Stateful<S> + Clone + Debug,
{
    fn default() -> Self {
        Self::with_props()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TransitionBuilder;
    use crate::engine::FailureKind;

    crate::state_enum! {
        enum TestState {
            Solid as "solid",
            Liquid as "liquid",
            Plasma as "plasma",
        }
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Sample {
        state: TestState,
        temperature: f64,
    }

    crate::stateful!(Sample, state: TestState);

    fn sample() -> Sample {
        Sample {
            state: TestState::Solid,
            temperature: 0.0,
        }
    }

    #[test]
    fn builder_requires_context() {
        let result = MachineBuilder::<TestState, Sample>::new()
            .states(TestState::ALL.to_vec())
            .build();

        assert!(matches!(result, Err(BuildError::MissingContext)));
    }

    #[test]
    fn builder_requires_blueprint() {
        let result = MachineBuilder::<TestState, Sample>::new()
            .context(sample())
            .build();

        assert!(matches!(result, Err(BuildError::MissingBlueprint)));
    }

    #[test]
    fn state_list_machine_only_jumps() {
        let mut machine = MachineBuilder::new()
            .context(sample())
            .states([TestState::Solid, TestState::Liquid])
            .build()
            .unwrap();

        machine.to(TestState::Liquid).unwrap();
        assert_eq!(machine.state(), &TestState::Liquid);

        let err = machine.to(TestState::Plasma).unwrap_err();
        assert_eq!(err.kind, FailureKind::DestinationInvalid);
        assert_eq!(machine.state(), &TestState::Liquid);
    }

    #[test]
    fn fluent_api_builds_machine() {
        let melt = TransitionBuilder::new()
            .from(TestState::Solid)
            .to(TestState::Liquid)
            .when("warm")
            .then("heat")
            .build()
            .unwrap();

        let mut machine = MachineBuilder::new()
            .context(sample())
            .transitions(TransitionDict::new().on("melt", melt))
            .guard("warm", |_: &Sample| true)
            .effect("heat", |s: &mut Sample, _: &()| s.temperature += 10.0)
            .throw_exceptions(false)
            .build()
            .unwrap();

        let result = machine.trigger("melt").unwrap();

        assert!(result.success);
        assert_eq!(machine.temperature, 10.0);
        assert!(!machine.options().throw_exceptions);
    }

    #[test]
    fn json_dictionary_loads() {
        let json = r#"{
            "melt": { "origins": "solid", "destination": "liquid" },
            "freeze": [{ "origins": ["liquid"], "destination": "solid" }]
        }"#;

        let mut machine = MachineBuilder::new()
            .context(sample())
            .transitions_json(json)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(machine.triggers(), vec!["melt", "freeze"]);
        machine.trigger("melt").unwrap();
        assert_eq!(machine.state(), &TestState::Liquid);
    }

    #[test]
    fn malformed_json_is_reported() {
        let result = MachineBuilder::<TestState, Sample>::new().transitions_json("{ nope");

        assert!(matches!(result, Err(BuildError::Json(_))));
    }

    #[test]
    fn fallible_capabilities_register() {
        let mut machine = MachineBuilder::new()
            .context(sample())
            .transitions(TransitionDict::new().on(
                "melt",
                TransitionBuilder::new()
                    .from(TestState::Solid)
                    .to(TestState::Liquid)
                    .then("boom")
                    .build()
                    .unwrap(),
            ))
            .try_guard("never", |_: &Sample| Ok::<_, BoxError>(false))
            .try_effect("boom", |_: &mut Sample, _: &()| Err("boom"))
            .build()
            .unwrap();

        assert!(machine.capabilities().has_guard("never"));
        let err = machine.trigger("melt").unwrap_err();
        assert_eq!(err.kind, FailureKind::EffectError);
    }
}
