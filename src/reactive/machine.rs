//! Machine driven by dependency notifications.

use super::signal::{Dependency, Subscription};
use crate::core::{State, Stateful};
use crate::engine::{Machine, TransitionError, TransitionOptions, TransitionOutcome, TransitionResult};
use std::collections::HashMap;
use std::fmt;
use std::fmt::Debug;
use std::ops::Deref;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

/// A [`Machine`] that fires triggers when watched dependencies change.
///
/// Guards are bound to dependencies with [`ReactiveMachine::watch`]. While in
/// a state, the machine subscribes to the dependencies of every guard on the
/// transitions leaving that state. A notification queues the trigger name;
/// [`ReactiveMachine::process`] drains the queue and fires each queued
/// trigger whose guards currently hold. On every state change the old
/// subscriptions are dropped and new ones are made for the new state.
///
/// Triggers fired from the queue never raise; their failures come back as
/// unsuccessful results.
///
/// # Example
///
/// ```rust
/// use soteria::core::{Transition, TransitionDict};
/// use soteria::engine::{Capabilities, Machine, MachineOptions};
/// use soteria::reactive::{ReactiveMachine, Signal};
/// use soteria::{state_enum, stateful};
///
/// state_enum! {
///     enum Phase {
///         Solid,
///         Liquid,
///     }
/// }
///
/// #[derive(Clone, Debug)]
/// struct Ice {
///     phase: Phase,
/// }
///
/// stateful!(Ice, phase: Phase);
///
/// let temperature = Signal::new(-5.0_f64);
/// let reading = temperature.clone();
///
/// let mut melt = Transition::new([Phase::Solid], Phase::Liquid);
/// melt.conditions.push("aboveFreezing".into());
///
/// let machine: Machine<Phase, Ice> = Machine::new(
///     Ice { phase: Phase::Solid },
///     TransitionDict::new().on("melt", melt),
///     Capabilities::new().guard("aboveFreezing", move |_: &Ice| reading.get() > 0.0),
///     MachineOptions::default(),
/// )
/// .unwrap();
///
/// let mut ice = ReactiveMachine::new(machine).watch("aboveFreezing", temperature.clone());
///
/// temperature.set(20.0);
/// ice.process();
/// assert_eq!(ice.state(), &Phase::Liquid);
/// ```
pub struct ReactiveMachine<S: State, C, P = ()> {
    machine: Machine<S, C, P>,
    watches: HashMap<String, Vec<Arc<dyn Dependency>>>,
    sender: Sender<String>,
    receiver: Receiver<String>,
    subscriptions: Vec<Subscription>,
}

impl<S, C, P> ReactiveMachine<S, C, P>
where
    S: State,
    C: Stateful<S> + Clone + Debug,
    P: Default,
{
    pub fn new(machine: Machine<S, C, P>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            machine,
            watches: HashMap::new(),
            sender,
            receiver,
            subscriptions: Vec::new(),
        }
    }

    /// Re-evaluate `guard` whenever `dependency` changes.
    ///
    /// A guard may be bound to several dependencies.
    pub fn watch(mut self, guard: impl Into<String>, dependency: impl Dependency + 'static) -> Self {
        self.watches
            .entry(guard.into())
            .or_default()
            .push(Arc::new(dependency));
        self.resubscribe();
        self
    }

    pub fn machine(&self) -> &Machine<S, C, P> {
        &self.machine
    }

    /// Stop watching and hand back the machine.
    pub fn into_machine(self) -> Machine<S, C, P> {
        self.machine
    }

    /// Number of live subscriptions for the current state.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Fire every queued trigger whose guards hold from the current state.
    ///
    /// Returns the result of each trigger actually fired, in queue order.
    pub fn process(&mut self) -> Vec<TransitionResult<S, C>> {
        let queued: Vec<String> = self.receiver.try_iter().collect();
        let mut fired = Vec::new();

        for trigger in queued {
            if !self.ready(&trigger) {
                tracing::trace!(trigger = %trigger, "Queued trigger not ready");
                continue;
            }

            let options = TransitionOptions::new().throw_exceptions(false);
            let outcome = self.machine.trigger_with_options(&trigger, options);
            match outcome {
                Ok(result) => {
                    if result.changed_state() {
                        self.resubscribe();
                    }
                    fired.push(result);
                }
                Err(err) => {
                    // Only strict_origins can still raise here.
                    tracing::warn!(trigger = %trigger, error = %err, "Reactive trigger failed");
                    if let Some(result) = err.into_result() {
                        fired.push(result);
                    }
                }
            }
        }

        fired
    }

    /// Fire `trigger` directly, resubscribing if the state changes.
    pub fn trigger(&mut self, trigger: &str) -> TransitionOutcome<S, C> {
        let result = self.machine.trigger(trigger)?;
        if result.changed_state() {
            self.resubscribe();
        }
        Ok(result)
    }

    /// Jump to `state`, resubscribing on success.
    pub fn to(&mut self, state: S) -> Result<(), TransitionError<S, C>> {
        self.machine.to(state)?;
        self.resubscribe();
        Ok(())
    }

    fn ready(&self, trigger: &str) -> bool {
        self.machine
            .available_transitions()
            .map(|available| {
                available
                    .iter()
                    .any(|transition| transition.trigger == trigger && transition.satisfied)
            })
            .unwrap_or(false)
    }

    fn resubscribe(&mut self) {
        self.subscriptions.clear();

        let Some(dict) = self.machine.transitions() else {
            return;
        };
        let current = self.machine.state();

        for (trigger, candidates) in dict.iter() {
            let guards = candidates
                .iter()
                .filter(|transition| transition.allows_origin(current))
                .flat_map(|transition| transition.conditions.iter());

            for guard in guards {
                let Some(dependencies) = self.watches.get(guard) else {
                    continue;
                };
                for dependency in dependencies {
                    let sender = self.sender.clone();
                    let trigger = trigger.to_string();
                    self.subscriptions.push(dependency.subscribe(Arc::new(move || {
                        // The receiver lives as long as the machine.
                        let _ = sender.send(trigger.clone());
                    })));
                }
            }
        }

        tracing::debug!(
            state = current.name(),
            subscriptions = self.subscriptions.len(),
            "Watching outgoing transitions"
        );
    }
}

impl<S: State, C, P> Deref for ReactiveMachine<S, C, P> {
    type Target = Machine<S, C, P>;

    fn deref(&self) -> &Machine<S, C, P> {
        &self.machine
    }
}

impl<S: State, C: Debug, P> fmt::Debug for ReactiveMachine<S, C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut watched: Vec<&str> = self.watches.keys().map(String::as_str).collect();
        watched.sort_unstable();
        f.debug_struct("ReactiveMachine")
            .field("machine", &self.machine)
            .field("watched", &watched)
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Transition, TransitionDict};
    use crate::engine::{Capabilities, MachineOptions};
    use crate::reactive::Signal;

    crate::state_enum! {
        enum Phase {
            Solid as "solid",
            Liquid as "liquid",
            Gas as "gas",
        }
    }

    #[derive(Clone, Debug)]
    struct Matter {
        state: Phase,
        melted: u32,
    }

    crate::stateful!(Matter, state: Phase);

    fn guarded(from: Phase, to: Phase, guard: &str) -> Transition<Phase> {
        let mut transition = Transition::new([from], to);
        transition.conditions.push(guard.to_string());
        transition
    }

    fn matter(temperature: &Signal<f64>) -> ReactiveMachine<Phase, Matter> {
        let hot = temperature.clone();
        let boiling = temperature.clone();
        let dict = TransitionDict::new()
            .on("melt", {
                let mut melt = guarded(Phase::Solid, Phase::Liquid, "aboveMelting");
                melt.effects.push("count".into());
                melt
            })
            .on("evaporate", guarded(Phase::Liquid, Phase::Gas, "aboveBoiling"));
        let caps = Capabilities::new()
            .guard("aboveMelting", move |_: &Matter| hot.get() > 0.0)
            .guard("aboveBoiling", move |_: &Matter| boiling.get() > 100.0)
            .effect("count", |m: &mut Matter, _: &()| m.melted += 1);

        let machine = Machine::new(
            Matter {
                state: Phase::Solid,
                melted: 0,
            },
            dict,
            caps,
            MachineOptions::default(),
        )
        .unwrap();

        ReactiveMachine::new(machine)
            .watch("aboveMelting", temperature.clone())
            .watch("aboveBoiling", temperature.clone())
    }

    #[test]
    fn change_fires_satisfied_trigger() {
        let temperature = Signal::new(-10.0);
        let mut rm = matter(&temperature);

        temperature.set(50.0);
        let fired = rm.process();

        assert_eq!(fired.len(), 1);
        assert!(fired[0].success);
        assert_eq!(rm.state(), &Phase::Liquid);
        assert_eq!(rm.melted, 1);
    }

    #[test]
    fn unsatisfied_change_fires_nothing() {
        let temperature = Signal::new(-10.0);
        let mut rm = matter(&temperature);

        temperature.set(-5.0);

        assert!(rm.process().is_empty());
        assert_eq!(rm.state(), &Phase::Solid);
    }

    #[test]
    fn subscriptions_follow_current_state() {
        let temperature = Signal::new(-10.0);
        let mut rm = matter(&temperature);
        assert_eq!(rm.subscription_count(), 1);
        assert_eq!(temperature.listener_count(), 1);

        temperature.set(50.0);
        rm.process();
        assert_eq!(rm.subscription_count(), 1);

        temperature.set(150.0);
        rm.process();
        assert_eq!(rm.state(), &Phase::Gas);
        assert_eq!(rm.subscription_count(), 0);
        assert_eq!(temperature.listener_count(), 0);

        temperature.set(-50.0);
        assert!(rm.process().is_empty());
    }

    #[test]
    fn direct_jump_resubscribes() {
        let temperature = Signal::new(-10.0);
        let mut rm = matter(&temperature);

        rm.to(Phase::Gas).unwrap();

        assert_eq!(rm.subscription_count(), 0);
        assert_eq!(temperature.listener_count(), 0);
    }

    #[test]
    fn into_machine_drops_subscriptions() {
        let temperature = Signal::new(-10.0);
        let rm = matter(&temperature);

        let machine = rm.into_machine();

        assert_eq!(temperature.listener_count(), 0);
        assert_eq!(machine.state(), &Phase::Solid);
    }
}
