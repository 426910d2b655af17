//! Named guard predicates over a host context.
//!
//! Guards decide whether a candidate transition applies. They may fail
//! outright (for instance when they read an external resource), which is
//! reported separately from a plain `false`.

use std::error::Error;
use std::fmt;

/// Boxed error returned by fallible guards and effects.
pub type BoxError = Box<dyn Error + Send + Sync>;

type Predicate<C> = Box<dyn Fn(&C) -> Result<bool, BoxError> + Send + Sync>;

/// Predicate that determines whether a transition can execute.
///
/// Guards only get shared access to the context. They are evaluated before
/// any effect of the same transition runs.
///
/// # Example
///
/// ```rust
/// use soteria::core::Guard;
///
/// struct Walker {
///     energy: u32,
/// }
///
/// let has_energy = Guard::new(|w: &Walker| w.energy > 0);
///
/// assert!(has_energy.check(&Walker { energy: 1 }).unwrap());
/// assert!(!has_energy.check(&Walker { energy: 0 }).unwrap());
/// ```
pub struct Guard<C> {
    predicate: Predicate<C>,
}

impl<C> Guard<C> {
    /// Create a guard from an infallible predicate.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Box::new(move |ctx| Ok(predicate(ctx))),
        }
    }

    /// Create a guard whose evaluation can fail.
    ///
    /// ```rust
    /// use soteria::core::Guard;
    ///
    /// let parses = Guard::fallible(|raw: &String| raw.parse::<u8>().map(|n| n > 3));
    ///
    /// assert!(parses.check(&"7".to_string()).unwrap());
    /// assert!(parses.check(&"seven".to_string()).is_err());
    /// ```
    pub fn fallible<F, E>(predicate: F) -> Self
    where
        F: Fn(&C) -> Result<bool, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        Guard {
            predicate: Box::new(move |ctx| predicate(ctx).map_err(Into::into)),
        }
    }

    /// Evaluate the guard against the context.
    pub fn check(&self, context: &C) -> Result<bool, BoxError> {
        (self.predicate)(context)
    }
}

impl<C> fmt::Debug for Guard<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug)]
    struct Hero {
        energy: i32,
        armor: Option<u8>,
    }

    #[test]
    fn guard_allows_matching_contexts() {
        let guard = Guard::new(|h: &Hero| h.energy > 0);

        assert!(guard
            .check(&Hero {
                energy: 3,
                armor: None
            })
            .unwrap());
        assert!(!guard
            .check(&Hero {
                energy: 0,
                armor: None
            })
            .unwrap());
    }

    #[test]
    fn guard_is_deterministic() {
        let hero = Hero {
            energy: 2,
            armor: Some(1),
        };
        let guard = Guard::new(|h: &Hero| h.energy > 1);

        assert_eq!(guard.check(&hero).unwrap(), guard.check(&hero).unwrap());
    }

    #[test]
    fn fallible_guard_surfaces_errors() {
        let guard = Guard::fallible(|h: &Hero| match h.armor {
            Some(level) => Ok(level >= 2),
            None => Err("hero has no armor equipped"),
        });

        let unarmored = Hero {
            energy: 1,
            armor: None,
        };
        let err = guard.check(&unarmored).unwrap_err();
        assert_eq!(err.to_string(), "hero has no armor equipped");

        let armored = Hero {
            energy: 1,
            armor: Some(3),
        };
        assert!(guard.check(&armored).unwrap());
    }
}
