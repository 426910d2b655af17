//! The transition engine.

use super::capabilities::Capabilities;
use super::error::{FailureKind, TransitionError, TransitionFailure};
use super::options::{MachineOptions, TransitionOptions, TriggerArgs};
use super::result::{
    AvailableTransition, ConditionStatus, MethodAttempt, PendingResult, TransitionAttempt,
    TransitionResult,
};
use crate::builder::BuildError;
use crate::core::{
    Blueprint, State, StateHistory, StateTransition, Stateful, Transition, TransitionDict,
};
use chrono::Utc;
use std::fmt;
use std::fmt::Debug;
use std::ops::Deref;
use stillwater::validation::Validation;

/// What a trigger call returns: the decision record, or an error carrying it.
pub type TransitionOutcome<S, C> = Result<TransitionResult<S, C>, TransitionError<S, C>>;

enum ConditionOutcome {
    Passed,
    Undefined(String),
    Falsy(String),
}

/// A host value with state machine behavior attached.
///
/// The machine owns the host and dereferences to it, so host fields and
/// methods stay reachable. Engine operations (`trigger`, `to`, `state`, ...)
/// are inherent methods and take precedence over host methods of the same
/// name.
///
/// The host's state field is the only record of the current state.
///
/// # Example
///
/// ```rust
/// use soteria::core::{State, Stateful, Transition, TransitionDict};
/// use soteria::engine::{Capabilities, Machine, MachineOptions};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Gait { Stopped, Walking }
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
/// #[derive(Clone, Debug)]
/// struct Walker { state: Gait, energy: u32 }
///
/// impl Stateful<Gait> for Walker {
///     fn state(&self) -> &Gait { &self.state }
///     fn set_state(&mut self, state: Gait) { self.state = state; }
/// }
///
/// let mut walk = Transition::new([Gait::Stopped], Gait::Walking);
/// walk.conditions.push("hasEnergy".into());
/// walk.effects.push("speedUp".into());
///
/// let caps = Capabilities::new()
///     .guard("hasEnergy", |w: &Walker| w.energy > 0)
///     .effect("speedUp", |w: &mut Walker, _: &()| w.energy -= 1);
///
/// let mut machine = Machine::new(
///     Walker { state: Gait::Stopped, energy: 1 },
///     TransitionDict::new().on("walk", walk),
///     caps,
///     MachineOptions::default(),
/// )
/// .unwrap();
///
/// let result = machine.trigger("walk").unwrap();
/// assert!(result.success);
/// assert_eq!(machine.state(), &Gait::Walking);
/// assert_eq!(machine.energy, 0);
/// ```
pub struct Machine<S: State, C, P = ()> {
    context: C,
    transitions: Option<TransitionDict<S>>,
    states: Vec<S>,
    capabilities: Capabilities<C, P>,
    options: MachineOptions,
    history: StateHistory<S>,
}

impl<S, C, P> Machine<S, C, P>
where
    S: State,
    C: Stateful<S> + Clone + Debug,
{
    /// Attach a machine to `context`.
    ///
    /// With a dictionary the known states are every origin and destination
    /// it mentions. With a plain state list only [`Machine::to`] is usable.
    /// Fails if the dictionary is malformed or the host's current state is
    /// not a known state.
    pub fn new(
        context: C,
        blueprint: impl Into<Blueprint<S>>,
        capabilities: Capabilities<C, P>,
        options: MachineOptions,
    ) -> Result<Self, BuildError> {
        let (transitions, states) = match blueprint.into() {
            Blueprint::Transitions(dict) => {
                if let Validation::Failure(errors) = dict.validate() {
                    return Err(BuildError::InvalidDictionary(
                        errors.iter().cloned().collect(),
                    ));
                }
                let states = dict.states();
                (Some(dict), states)
            }
            Blueprint::States(list) => {
                let mut states: Vec<S> = Vec::with_capacity(list.len());
                for state in list {
                    if !states.contains(&state) {
                        states.push(state);
                    }
                }
                (None, states)
            }
        };

        if !states.contains(context.state()) {
            return Err(BuildError::UnknownInitialState {
                state: context.state().name().to_string(),
            });
        }

        Ok(Self {
            context,
            transitions,
            states,
            capabilities,
            options,
            history: StateHistory::new(),
        })
    }

    /// Current state, read from the host.
    pub fn state(&self) -> &S {
        self.context.state()
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    /// Mutable access to the host.
    ///
    /// Changing the state field through this bypasses known-state checks;
    /// prefer [`Machine::to`].
    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    /// Detach the machine and hand back the host.
    pub fn into_inner(self) -> C {
        self.context
    }

    /// Independent copy of the host as it is right now.
    pub fn snapshot(&self) -> C {
        self.context.clone()
    }

    /// Known states, in first-seen order.
    pub fn states(&self) -> &[S] {
        &self.states
    }

    pub fn transitions(&self) -> Option<&TransitionDict<S>> {
        self.transitions.as_ref()
    }

    /// Trigger names in declaration order; empty without a dictionary.
    pub fn triggers(&self) -> Vec<&str> {
        self.transitions
            .as_ref()
            .map(|dict| dict.triggers().collect())
            .unwrap_or_default()
    }

    pub fn options(&self) -> &MachineOptions {
        &self.options
    }

    pub fn capabilities(&self) -> &Capabilities<C, P> {
        &self.capabilities
    }

    /// Committed state changes since the machine was attached.
    pub fn history(&self) -> &StateHistory<S> {
        &self.history
    }

    /// Jump straight to `state`.
    ///
    /// No guards, effects or origin checks run. An unknown state is always
    /// returned as `Err(DestinationInvalid)`, whatever `throw_exceptions`
    /// says, and leaves the host untouched.
    pub fn to(&mut self, state: S) -> Result<(), TransitionError<S, C>> {
        if !self.states.contains(&state) {
            let message = format!(
                "Destination {} is not included in the list of existing states",
                state.name()
            );
            return Err(TransitionError::new(FailureKind::DestinationInvalid, message));
        }

        self.commit(state, None);
        if self.options.verbosity {
            tracing::info!("State changed to {}", self.state().name());
        }
        Ok(())
    }

    /// Replace the live host with `snapshot`, typically a result's
    /// `precontext` after an effect failed halfway.
    ///
    /// The snapshot's state must be a known state.
    pub fn restore(&mut self, snapshot: C) -> Result<(), TransitionError<S, C>> {
        if !self.states.contains(snapshot.state()) {
            let message = format!(
                "Snapshot state {} is not included in the list of existing states",
                snapshot.state().name()
            );
            return Err(TransitionError::new(FailureKind::DestinationInvalid, message));
        }

        tracing::debug!(state = snapshot.state().name(), "Host restored from snapshot");
        self.context = snapshot;
        Ok(())
    }

    /// Fire `trigger` with default props and machine-wide options.
    pub fn trigger(&mut self, trigger: &str) -> TransitionOutcome<S, C>
    where
        P: Default,
    {
        self.evaluate(trigger, &P::default(), TransitionOptions::default())
    }

    /// Fire `trigger`, forwarding `props` to every effect it runs.
    pub fn trigger_with_props(&mut self, trigger: &str, props: &P) -> TransitionOutcome<S, C> {
        self.evaluate(trigger, props, TransitionOptions::default())
    }

    /// Fire `trigger` with per-call options.
    ///
    /// Accepts either `TransitionOptions` or `(props, TransitionOptions)`.
    /// Props types without `Default` go through
    /// [`Machine::trigger_with_props_and_options`].
    pub fn trigger_with_options<'a, A>(&mut self, trigger: &str, args: A) -> TransitionOutcome<S, C>
    where
        A: Into<TriggerArgs<'a, C, P>>,
        P: Default,
    {
        let TriggerArgs { props, options } = args.into();
        let props = props.unwrap_or_default();
        self.evaluate(trigger, &props, options)
    }

    /// Fire `trigger` with borrowed props and per-call options.
    pub fn trigger_with_props_and_options(
        &mut self,
        trigger: &str,
        props: &P,
        options: TransitionOptions<'_, C>,
    ) -> TransitionOutcome<S, C> {
        self.evaluate(trigger, props, options)
    }

    fn evaluate(
        &mut self,
        trigger: &str,
        props: &P,
        options: TransitionOptions<'_, C>,
    ) -> TransitionOutcome<S, C> {
        let TransitionOptions {
            mut on_error,
            throw_exceptions,
        } = options;
        let should_throw = throw_exceptions.unwrap_or(self.options.throw_exceptions);

        let pending = PendingResult::new(trigger, self.state().clone(), self.snapshot());
        tracing::debug!(
            id = %pending.id,
            trigger,
            state = self.state().name(),
            "Trigger received"
        );

        let Some(dict) = &self.transitions else {
            let failure = TransitionFailure::new(FailureKind::TransitionsUndefined, Some(trigger), None);
            let message =
                format!("trigger(\"{trigger}\") called, but machine does not have transitions defined.");
            return self.reject(pending, Vec::new(), failure, message, should_throw);
        };

        let candidates: Vec<Transition<S>> = dict.candidates(trigger).to_vec();
        if candidates.is_empty() {
            let failure = TransitionFailure::new(FailureKind::TriggerUndefined, Some(trigger), None);
            let message = format!("Trigger \"{trigger}\" is not defined in the machine.");
            return self.reject(pending, Vec::new(), failure, message, should_throw);
        }

        // Origins are checked across all candidates at once; individual
        // candidates are not filtered by origin afterwards.
        let current = self.state().clone();
        if !candidates.iter().any(|t| t.allows_origin(&current)) {
            let failure = TransitionFailure::new(FailureKind::OriginDisallowed, Some(trigger), None);
            let message = format!(
                "Invalid transition from {} using trigger {trigger}",
                current.name()
            );
            let raise = should_throw || self.options.strict_origins;
            return self.reject(pending, Vec::new(), failure, message, raise);
        }

        let last = candidates.len() - 1;
        let mut attempts = Vec::with_capacity(candidates.len());

        for (index, transition) in candidates.into_iter().enumerate() {
            let mut attempt = TransitionAttempt::new(trigger, transition.clone(), self.snapshot());

            match self.check_conditions(&transition, &mut attempt) {
                ConditionOutcome::Passed => {}
                ConditionOutcome::Undefined(name) => {
                    let failure = TransitionFailure::new(
                        FailureKind::ConditionUndefined,
                        Some(trigger),
                        Some(&name),
                    );
                    attempt.failure = Some(failure.clone());
                    attempts.push(attempt);
                    let message = format!("Condition {name} is not defined in the machine.");
                    return self.reject(pending, attempts, failure, message, should_throw);
                }
                ConditionOutcome::Falsy(name) => {
                    let failure =
                        TransitionFailure::new(FailureKind::ConditionValue, Some(trigger), Some(&name));
                    attempt.failure = Some(failure);
                    attempts.push(attempt);
                    if index < last && self.options.verbosity {
                        tracing::info!("Condition {name} false, transition aborted.");
                    }
                    continue;
                }
            }

            for name in &transition.effects {
                let mut effect_attempt = MethodAttempt::new(name, self.snapshot());

                let Some(effect) = self.capabilities.get_effect(name) else {
                    attempt.effects.push(effect_attempt);
                    let failure =
                        TransitionFailure::new(FailureKind::EffectUndefined, Some(trigger), Some(name));
                    attempt.failure = Some(failure.clone());
                    attempts.push(attempt);
                    let message = format!("Effect {name} is not defined in the machine.");
                    return self.reject(pending, attempts, failure, message, should_throw);
                };

                tracing::trace!(trigger, effect = %name, "Running effect");
                if let Err(err) = effect.apply(&mut self.context, props) {
                    effect_attempt.error = Some(err.to_string());
                    attempt.effects.push(effect_attempt);
                    let failure =
                        TransitionFailure::new(FailureKind::EffectError, Some(trigger), Some(name));
                    attempt.failure = Some(failure.clone());
                    attempts.push(attempt);

                    let message = format!("Effect {name} caused an error.");
                    let result = self.finish(pending, attempts, Some(failure));
                    if let Some(handler) = on_error.take() {
                        handler(&result.precontext, &result.postcontext);
                    }
                    return self.deliver(result, FailureKind::EffectError, message, should_throw);
                }

                effect_attempt.success = true;
                attempt.effects.push(effect_attempt);
            }

            self.commit(transition.destination.clone(), Some(trigger));
            if self.options.verbosity {
                tracing::info!("State changed to {}", self.state().name());
            }

            attempt.success = true;
            attempts.push(attempt);
            return Ok(self.finish(pending, attempts, None));
        }

        // Every candidate had a false condition; the last one decides the failure.
        let failure = attempts
            .last()
            .and_then(|attempt| attempt.failure.clone())
            .unwrap_or_else(|| TransitionFailure::new(FailureKind::ConditionValue, Some(trigger), None));
        let message = format!(
            "Condition {} false, transition aborted.",
            failure.method.as_deref().unwrap_or_default()
        );
        self.reject(pending, attempts, failure, message, should_throw)
    }

    fn check_conditions(
        &self,
        transition: &Transition<S>,
        attempt: &mut TransitionAttempt<S, C>,
    ) -> ConditionOutcome {
        for name in &transition.conditions {
            let mut condition_attempt = MethodAttempt::new(name, self.snapshot());

            let Some(guard) = self.capabilities.get_guard(name) else {
                attempt.conditions.push(condition_attempt);
                return ConditionOutcome::Undefined(name.clone());
            };

            let passed = match guard.check(&self.context) {
                Ok(passed) => passed,
                Err(err) => {
                    tracing::warn!(condition = %name, error = %err, "Condition failed to evaluate");
                    condition_attempt.error = Some(err.to_string());
                    false
                }
            };
            tracing::trace!(condition = %name, passed, "Condition evaluated");

            if !passed {
                attempt.conditions.push(condition_attempt);
                return ConditionOutcome::Falsy(name.clone());
            }

            condition_attempt.success = true;
            attempt.conditions.push(condition_attempt);
        }

        ConditionOutcome::Passed
    }

    fn commit(&mut self, destination: S, trigger: Option<&str>) {
        let from = self.context.state().clone();
        tracing::debug!(
            from = from.name(),
            to = destination.name(),
            trigger,
            "State transition"
        );

        self.context.set_state(destination.clone());
        self.history.push(StateTransition {
            from,
            to: destination,
            trigger: trigger.map(str::to_string),
            timestamp: Utc::now(),
        });
    }

    fn finish(
        &self,
        pending: PendingResult<S, C>,
        attempts: Vec<TransitionAttempt<S, C>>,
        failure: Option<TransitionFailure>,
    ) -> TransitionResult<S, C> {
        pending.finish(attempts, failure, self.state().clone(), self.snapshot())
    }

    fn reject(
        &self,
        pending: PendingResult<S, C>,
        attempts: Vec<TransitionAttempt<S, C>>,
        failure: TransitionFailure,
        message: String,
        should_throw: bool,
    ) -> TransitionOutcome<S, C> {
        let kind = failure.kind;
        let result = self.finish(pending, attempts, Some(failure));
        self.deliver(result, kind, message, should_throw)
    }

    fn deliver(
        &self,
        result: TransitionResult<S, C>,
        kind: FailureKind,
        message: String,
        should_throw: bool,
    ) -> TransitionOutcome<S, C> {
        if should_throw {
            return Err(TransitionError::new(kind, message).with_result(result));
        }
        if self.options.verbosity {
            tracing::info!("{message}");
        }
        Ok(result)
    }

    /// Transitions leaving the current state, across every trigger.
    ///
    /// Conditions are evaluated but nothing is mutated. A condition that is
    /// not registered or fails to evaluate is logged and reported as not
    /// satisfied. Errors only when the machine has no dictionary.
    pub fn available_transitions(
        &self,
    ) -> Result<Vec<AvailableTransition<S>>, TransitionError<S, C>> {
        let Some(dict) = &self.transitions else {
            return Err(TransitionError::new(
                FailureKind::TransitionsUndefined,
                "No transitions defined in the state machine",
            ));
        };

        let current = self.state();
        let mut available = Vec::new();

        for (trigger, candidates) in dict.iter() {
            for transition in candidates.iter().filter(|t| t.allows_origin(current)) {
                let conditions: Vec<ConditionStatus> = transition
                    .conditions
                    .iter()
                    .map(|name| ConditionStatus {
                        name: name.clone(),
                        satisfied: self.probe(name),
                    })
                    .collect();

                available.push(AvailableTransition {
                    trigger: trigger.to_string(),
                    origins: transition.origins.clone(),
                    destination: transition.destination.clone(),
                    satisfied: conditions.iter().all(|c| c.satisfied),
                    conditions,
                    effects: transition.effects.clone(),
                });
            }
        }

        Ok(available)
    }

    fn probe(&self, name: &str) -> bool {
        let Some(guard) = self.capabilities.get_guard(name) else {
            tracing::error!(condition = name, "Condition \"{name}\" is not registered");
            return false;
        };

        match guard.check(&self.context) {
            Ok(satisfied) => satisfied,
            Err(err) => {
                tracing::error!(condition = name, error = %err, "Error running condition \"{name}\"");
                false
            }
        }
    }
}

impl<S: State, C, P> Deref for Machine<S, C, P> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.context
    }
}

impl<S: State, C: Debug, P> fmt::Debug for Machine<S, C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("context", &self.context)
            .field("states", &self.states)
            .field("transitions", &self.transitions)
            .field("capabilities", &self.capabilities)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
