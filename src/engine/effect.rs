//! Named side-effecting operations over a host context.

use crate::core::BoxError;
use std::fmt;

type Action<C, P> = Box<dyn Fn(&mut C, &P) -> Result<(), BoxError> + Send + Sync>;

/// Side effect run when a transition is taken.
///
/// Effects get mutable access to the host and the caller's props for the
/// current trigger call. An `Err` aborts the call with `EffectError`; anything
/// the effect already mutated stays mutated.
///
/// # Example
///
/// ```rust
/// use soteria::engine::Effect;
///
/// struct Walker {
///     energy: u32,
///     speed: u32,
/// }
///
/// let speed_up: Effect<Walker> = Effect::new(|w: &mut Walker, _: &()| {
///     w.speed = 1;
///     w.energy -= 1;
/// });
///
/// let mut walker = Walker { energy: 1, speed: 0 };
/// speed_up.apply(&mut walker, &()).unwrap();
/// assert_eq!((walker.energy, walker.speed), (0, 1));
/// ```
pub struct Effect<C, P = ()> {
    action: Action<C, P>,
}

impl<C, P> Effect<C, P> {
    /// Create an effect that cannot fail.
    pub fn new<F>(action: F) -> Self
    where
        F: Fn(&mut C, &P) + Send + Sync + 'static,
    {
        Effect {
            action: Box::new(move |ctx, props| {
                action(ctx, props);
                Ok(())
            }),
        }
    }

    /// Create an effect that can fail.
    pub fn fallible<F, E>(action: F) -> Self
    where
        F: Fn(&mut C, &P) -> Result<(), E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        Effect {
            action: Box::new(move |ctx, props| action(ctx, props).map_err(Into::into)),
        }
    }

    /// Run the effect against the host.
    pub fn apply(&self, context: &mut C, props: &P) -> Result<(), BoxError> {
        (self.action)(context, props)
    }
}

impl<C, P> fmt::Debug for Effect<C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect").finish_non_exhaustive()
    }
}
