//! Transition descriptors and the trigger dictionary.
//!
//! A dictionary maps each trigger name to an ordered list of candidate
//! transitions. Order matters: the engine tries candidates front to back and
//! stops at the first one whose guards all pass.

use super::state::State;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// A declared rule: where it may start, where it leads, what must hold and
/// what it does.
///
/// Conditions and effects are names, resolved against the machine's
/// [`crate::engine::Capabilities`] when a trigger runs.
///
/// In JSON, `origins`, `conditions` and `effects` accept either a single
/// value or an array.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Transition<S: State> {
    #[serde(deserialize_with = "one_or_many")]
    pub origins: Vec<S>,
    pub destination: S,
    #[serde(default, deserialize_with = "one_or_many")]
    pub conditions: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub effects: Vec<String>,
}

impl<S: State> Transition<S> {
    /// Unconditional transition without effects.
    pub fn new(origins: impl IntoIterator<Item = S>, destination: S) -> Self {
        Self {
            origins: origins.into_iter().collect(),
            destination,
            conditions: Vec::new(),
            effects: Vec::new(),
        }
    }

    /// Whether `state` is one of this transition's origins.
    pub fn allows_origin(&self, state: &S) -> bool {
        self.origins.contains(state)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![item],
        }
    }
}

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    OneOrMany::deserialize(deserializer).map(OneOrMany::into_vec)
}

/// Structural problems found by [`TransitionDict::validate`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DictionaryViolation {
    #[error("Trigger name must not be blank")]
    BlankTrigger,

    #[error("Trigger '{trigger}' has no candidate transitions")]
    NoCandidates { trigger: String },

    #[error("Transition {index} of trigger '{trigger}' has no origins")]
    NoOrigins { trigger: String, index: usize },

    #[error("Transition {index} of trigger '{trigger}' names a blank condition or effect")]
    BlankMethod { trigger: String, index: usize },
}

/// Ordered mapping from trigger name to candidate transitions.
///
/// # Example
///
/// ```rust
/// use soteria::core::{State, Transition, TransitionDict};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Mode { Idle, Sleeping }
///
/// impl State for Mode {
///     fn name(&self) -> &str {
///         match self {
///             Self::Idle => "Idle",
///             Self::Sleeping => "Sleeping",
///         }
///     }
/// }
///
/// let dict = TransitionDict::new()
///     .on("sleep", Transition::new([Mode::Idle], Mode::Sleeping))
///     .on("wake", Transition::new([Mode::Sleeping], Mode::Idle));
///
/// assert_eq!(dict.candidates("sleep").len(), 1);
/// assert_eq!(dict.states(), vec![Mode::Sleeping, Mode::Idle]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionDict<S: State> {
    entries: Vec<(String, Vec<Transition<S>>)>,
}

impl<S: State> Default for TransitionDict<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> TransitionDict<S> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a candidate to `trigger`, after any already declared for it.
    pub fn on(mut self, trigger: impl Into<String>, transition: Transition<S>) -> Self {
        self.push(trigger.into(), transition);
        self
    }

    /// Append several candidates to `trigger`, in order.
    pub fn on_each(
        mut self,
        trigger: impl Into<String>,
        transitions: impl IntoIterator<Item = Transition<S>>,
    ) -> Self {
        let trigger = trigger.into();
        let index = self.entry_index(&trigger);
        self.entries[index].1.extend(transitions);
        self
    }

    fn push(&mut self, trigger: String, transition: Transition<S>) {
        let index = self.entry_index(&trigger);
        self.entries[index].1.push(transition);
    }

    fn entry_index(&mut self, trigger: &str) -> usize {
        match self.entries.iter().position(|(name, _)| name == trigger) {
            Some(index) => index,
            None => {
                self.entries.push((trigger.to_string(), Vec::new()));
                self.entries.len() - 1
            }
        }
    }

    /// Candidates declared for `trigger`; empty when the trigger is unknown.
    pub fn candidates(&self, trigger: &str) -> &[Transition<S>] {
        self.entries
            .iter()
            .find(|(name, _)| name == trigger)
            .map(|(_, candidates)| candidates.as_slice())
            .unwrap_or(&[])
    }

    /// Trigger names in declaration order.
    pub fn triggers(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// All `(trigger, candidates)` entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Transition<S>])> {
        self.entries
            .iter()
            .map(|(name, candidates)| (name.as_str(), candidates.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every state mentioned as an origin or destination, first-seen order.
    pub fn states(&self) -> Vec<S> {
        let mut states: Vec<S> = Vec::new();
        for (_, candidates) in &self.entries {
            for transition in candidates {
                for state in std::iter::once(&transition.destination).chain(&transition.origins) {
                    if !states.contains(state) {
                        states.push(state.clone());
                    }
                }
            }
        }
        states
    }

    /// Check the dictionary's structure, accumulating every violation.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<DictionaryViolation>> {
        let mut checks: Vec<Validation<(), NonEmptyVec<DictionaryViolation>>> = Vec::new();

        for (trigger, candidates) in &self.entries {
            if trigger.trim().is_empty() {
                checks.push(Validation::fail(DictionaryViolation::BlankTrigger));
            }

            if candidates.is_empty() {
                checks.push(Validation::fail(DictionaryViolation::NoCandidates {
                    trigger: trigger.clone(),
                }));
            }

            for (index, transition) in candidates.iter().enumerate() {
                if transition.origins.is_empty() {
                    checks.push(Validation::fail(DictionaryViolation::NoOrigins {
                        trigger: trigger.clone(),
                        index,
                    }));
                }

                let blank = transition
                    .conditions
                    .iter()
                    .chain(&transition.effects)
                    .any(|name| name.trim().is_empty());
                if blank {
                    checks.push(Validation::fail(DictionaryViolation::BlankMethod {
                        trigger: trigger.clone(),
                        index,
                    }));
                }
            }
        }

        Validation::all_vec(checks).map(|_| ())
    }

    /// Parse a dictionary from JSON.
    ///
    /// A trigger key that appears twice keeps only its last value, at the
    /// position of its first appearance.
    ///
    /// Only parsing happens here; call [`TransitionDict::validate`] (or hand
    /// the dictionary to a machine) to check its structure.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl<S: State> Serialize for TransitionDict<S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (trigger, candidates) in &self.entries {
            map.serialize_entry(trigger, candidates)?;
        }
        map.end()
    }
}

impl<'de, S: State> Deserialize<'de> for TransitionDict<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DictVisitor<S>(PhantomData<S>);

        impl<'de, S: State> Visitor<'de> for DictVisitor<S> {
            type Value = TransitionDict<S>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of trigger names to one or more transitions")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut dict = TransitionDict::new();
                while let Some((trigger, candidates)) =
                    map.next_entry::<String, OneOrMany<Transition<S>>>()?
                {
                    // A repeated key replaces the earlier candidates, as in a JSON object
                    let index = dict.entry_index(&trigger);
                    dict.entries[index].1 = candidates.into_vec();
                }
                Ok(dict)
            }
        }

        deserializer.deserialize_map(DictVisitor(PhantomData))
    }
}

/// What a machine is built from.
///
/// A dictionary enables triggers; a bare state list only supports direct
/// `to` jumps.
#[derive(Clone, Debug, PartialEq)]
pub enum Blueprint<S: State> {
    Transitions(TransitionDict<S>),
    States(Vec<S>),
}

impl<S: State> From<TransitionDict<S>> for Blueprint<S> {
    fn from(dict: TransitionDict<S>) -> Self {
        Blueprint::Transitions(dict)
    }
}

impl<S: State> From<Vec<S>> for Blueprint<S> {
    fn from(states: Vec<S>) -> Self {
        Blueprint::States(states)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    enum Mode {
        Idle,
        Sleeping,
        Patrolling,
    }

    impl State for Mode {
        fn name(&self) -> &str {
            match self {
                Self::Idle => "idle",
                Self::Sleeping => "sleeping",
                Self::Patrolling => "patrolling",
            }
        }
    }

    #[test]
    fn on_keeps_candidate_order() {
        let dict = TransitionDict::new()
            .on("patrol", Transition::new([Mode::Idle], Mode::Patrolling))
            .on("sleep", Transition::new([Mode::Idle], Mode::Sleeping))
            .on("patrol", Transition::new([Mode::Idle], Mode::Sleeping));

        let patrol = dict.candidates("patrol");
        assert_eq!(patrol.len(), 2);
        assert_eq!(patrol[0].destination, Mode::Patrolling);
        assert_eq!(patrol[1].destination, Mode::Sleeping);
        assert_eq!(dict.triggers().collect::<Vec<_>>(), vec!["patrol", "sleep"]);
    }

    #[test]
    fn unknown_trigger_has_no_candidates() {
        let dict: TransitionDict<Mode> = TransitionDict::new();
        assert!(dict.candidates("fly").is_empty());
    }

    #[test]
    fn states_are_union_of_origins_and_destinations() {
        let dict = TransitionDict::new()
            .on("sleep", Transition::new([Mode::Idle, Mode::Patrolling], Mode::Sleeping))
            .on("wake", Transition::new([Mode::Sleeping], Mode::Idle));

        let states = dict.states();
        assert_eq!(states.len(), 3);
        assert!(states.contains(&Mode::Idle));
        assert!(states.contains(&Mode::Sleeping));
        assert!(states.contains(&Mode::Patrolling));
    }

    #[test]
    fn json_accepts_single_values_and_arrays() {
        let json = r#"{
            "patrol": [
                { "origins": "idle", "destination": "idle", "conditions": "hasEnergy", "effects": ["work"] },
                { "origins": ["idle"], "destination": "sleeping" }
            ],
            "wake": { "origins": "sleeping", "destination": "idle" }
        }"#;

        let dict: TransitionDict<Mode> = TransitionDict::from_json(json).unwrap();

        let patrol = dict.candidates("patrol");
        assert_eq!(patrol.len(), 2);
        assert_eq!(patrol[0].origins, vec![Mode::Idle]);
        assert_eq!(patrol[0].conditions, vec!["hasEnergy".to_string()]);
        assert_eq!(patrol[0].effects, vec!["work".to_string()]);
        assert!(patrol[1].conditions.is_empty());
        assert_eq!(dict.candidates("wake").len(), 1);
        assert_eq!(dict.triggers().collect::<Vec<_>>(), vec!["patrol", "wake"]);
    }

    #[test]
    fn repeated_json_key_keeps_last_value() {
        let json = r#"{
            "patrol": { "origins": "idle", "destination": "patrolling" },
            "wake": { "origins": "sleeping", "destination": "idle" },
            "patrol": { "origins": "idle", "destination": "sleeping" }
        }"#;

        let dict: TransitionDict<Mode> = TransitionDict::from_json(json).unwrap();

        let patrol = dict.candidates("patrol");
        assert_eq!(patrol.len(), 1);
        assert_eq!(patrol[0].destination, Mode::Sleeping);
        assert_eq!(dict.triggers().collect::<Vec<_>>(), vec!["patrol", "wake"]);
    }

    #[test]
    fn json_round_trip_keeps_order() {
        let dict = TransitionDict::new()
            .on("wake", Transition::new([Mode::Sleeping], Mode::Idle))
            .on("sleep", Transition::new([Mode::Idle], Mode::Sleeping));

        let json = serde_json::to_string(&dict).unwrap();
        let parsed: TransitionDict<Mode> = TransitionDict::from_json(&json).unwrap();

        assert_eq!(parsed, dict);
    }

    #[test]
    fn validate_accumulates_all_violations() {
        let mut blank = Transition::new([Mode::Idle], Mode::Sleeping);
        blank.effects.push("  ".to_string());

        let dict = TransitionDict::new()
            .on("", Transition::new([Mode::Idle], Mode::Sleeping))
            .on("nap", Transition::new(Vec::<Mode>::new(), Mode::Sleeping))
            .on("rest", blank)
            .on_each("noop", Vec::new());

        match dict.validate() {
            Validation::Failure(errors) => {
                assert_eq!(errors.len(), 4);
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, DictionaryViolation::BlankTrigger)));
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, DictionaryViolation::NoOrigins { index: 0, .. })));
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, DictionaryViolation::BlankMethod { .. })));
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, DictionaryViolation::NoCandidates { .. })));
            }
            Validation::Success(_) => panic!("Expected violations, got success"),
        }
    }

    #[test]
    fn well_formed_dictionary_validates() {
        let dict = TransitionDict::new().on("sleep", Transition::new([Mode::Idle], Mode::Sleeping));
        assert!(dict.validate().is_success());
    }
}
