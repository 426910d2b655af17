//! Macros for ergonomic machine construction.

/// Generate a `State` implementation for simple enums.
///
/// Also generates an `ALL` constant listing every variant in declaration
/// order, handy as the state list for a machine without transitions.
///
/// A variant may carry a label with `as "label"`; the label becomes both its
/// `name()` and its serialized form, so JSON dictionaries can use it.
///
/// # Example
///
/// ```
/// use soteria::core::State;
/// use soteria::state_enum;
///
/// state_enum! {
///     pub enum Matter {
///         Solid as "solid",
///         Liquid as "liquid",
///         Gas,
///     }
/// }
///
/// assert_eq!(Matter::Solid.name(), "solid");
/// assert_eq!(Matter::Gas.name(), "Gas");
/// assert_eq!(Matter::ALL.len(), 3);
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $(as $label:literal)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $(#[serde(rename = $label)])?
                $variant
            ),*
        }

        impl $name {
            /// Every variant, in declaration order.
            #[allow(dead_code)]
            $vis const ALL: &'static [Self] = &[$(Self::$variant),*];
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => $crate::__state_label!($variant $(, $label)?)),*
                }
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __state_label {
    ($variant:ident) => {
        stringify!($variant)
    };
    ($variant:ident, $label:literal) => {
        $label
    };
}

/// Implement `Stateful` for a host struct by naming its state field.
///
/// # Example
///
/// ```
/// use soteria::core::Stateful;
/// use soteria::{state_enum, stateful};
///
/// state_enum! {
///     enum Gait {
///         Stopped,
///         Walking,
///     }
/// }
///
/// #[derive(Clone, Debug)]
/// struct Walker {
///     gait: Gait,
///     energy: u32,
/// }
///
/// stateful!(Walker, gait: Gait);
///
/// let mut walker = Walker { gait: Gait::Stopped, energy: 1 };
/// walker.set_state(Gait::Walking);
/// assert_eq!(walker.state(), &Gait::Walking);
/// ```
#[macro_export]
macro_rules! stateful {
    ($host:ty, $field:ident : $state:ty) => {
        impl $crate::core::Stateful<$state> for $host {
            fn state(&self) -> &$state {
                &self.$field
            }

            fn set_state(&mut self, state: $state) {
                self.$field = state;
            }
        }
    };
}
