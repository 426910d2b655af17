//! Machine-wide configuration and per-call trigger options.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine-wide settings.
///
/// Deserializes from partial input; missing fields take their defaults.
///
/// ```rust
/// use soteria::engine::MachineOptions;
///
/// let options: MachineOptions = serde_json::from_str(r#"{ "verbosity": true }"#).unwrap();
/// assert!(options.verbosity);
/// assert!(options.throw_exceptions);
/// assert!(!options.strict_origins);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineOptions {
    /// Emit informational log lines for fallbacks, soft failures and state changes.
    pub verbosity: bool,
    /// Deliver trigger failures as `Err` instead of an unsuccessful result.
    pub throw_exceptions: bool,
    /// Always deliver `OriginDisallowed` as `Err`, whatever `throw_exceptions` says.
    pub strict_origins: bool,
}

impl Default for MachineOptions {
    fn default() -> Self {
        Self {
            verbosity: false,
            throw_exceptions: true,
            strict_origins: false,
        }
    }
}

impl MachineOptions {
    pub fn with_verbosity(mut self, verbosity: bool) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_throw_exceptions(mut self, throw_exceptions: bool) -> Self {
        self.throw_exceptions = throw_exceptions;
        self
    }

    pub fn with_strict_origins(mut self, strict_origins: bool) -> Self {
        self.strict_origins = strict_origins;
        self
    }
}

/// Callback run once when an effect fails, with the precontext and the
/// partially mutated postcontext snapshots.
pub type ErrorHandler<'a, C> = Box<dyn FnOnce(&C, &C) + 'a>;

/// Overrides for a single trigger call.
pub struct TransitionOptions<'a, C> {
    pub on_error: Option<ErrorHandler<'a, C>>,
    /// Overrides [`MachineOptions::throw_exceptions`] for this call.
    pub throw_exceptions: Option<bool>,
}

impl<'a, C> TransitionOptions<'a, C> {
    pub fn new() -> Self {
        Self {
            on_error: None,
            throw_exceptions: None,
        }
    }

    pub fn on_error<F>(mut self, handler: F) -> Self
    where
        F: FnOnce(&C, &C) + 'a,
    {
        self.on_error = Some(Box::new(handler));
        self
    }

    pub fn throw_exceptions(mut self, throw_exceptions: bool) -> Self {
        self.throw_exceptions = Some(throw_exceptions);
        self
    }
}

impl<C> Default for TransitionOptions<'_, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for TransitionOptions<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionOptions")
            .field("on_error", &self.on_error.is_some())
            .field("throw_exceptions", &self.throw_exceptions)
            .finish()
    }
}

/// Arguments accepted by [`super::Machine::trigger_with_options`]: either
/// options alone, or props together with options.
pub struct TriggerArgs<'a, C, P> {
    pub props: Option<P>,
    pub options: TransitionOptions<'a, C>,
}

impl<'a, C, P> From<TransitionOptions<'a, C>> for TriggerArgs<'a, C, P> {
    fn from(options: TransitionOptions<'a, C>) -> Self {
        Self {
            props: None,
            options,
        }
    }
}

impl<'a, C, P> From<(P, TransitionOptions<'a, C>)> for TriggerArgs<'a, C, P> {
    fn from((props, options): (P, TransitionOptions<'a, C>)) -> Self {
        Self {
            props: Some(props),
            options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_raise_quietly() {
        let options = MachineOptions::default();
        assert!(!options.verbosity);
        assert!(options.throw_exceptions);
        assert!(!options.strict_origins);
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: MachineOptions =
            serde_json::from_str(r#"{ "throw_exceptions": false, "strict_origins": true }"#).unwrap();

        assert_eq!(
            options,
            MachineOptions::default()
                .with_throw_exceptions(false)
                .with_strict_origins(true)
        );
    }

    #[test]
    fn options_alone_carry_no_props() {
        let args: TriggerArgs<'_, (), u8> =
            TransitionOptions::new().throw_exceptions(false).into();

        assert!(args.props.is_none());
        assert_eq!(args.options.throw_exceptions, Some(false));
    }

    #[test]
    fn props_and_options_pair_carries_props() {
        let args: TriggerArgs<'_, (), u8> = (7u8, TransitionOptions::new()).into();

        assert_eq!(args.props, Some(7));
        assert!(args.options.on_error.is_none());
    }
}
