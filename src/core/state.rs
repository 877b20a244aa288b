//! Core State trait for widget phases.
//!
//! Phases of the animation coordinator implement this trait, which
//! provides pure methods for inspecting phase properties without side effects.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for coordinator phases.
///
/// All methods are pure - no side effects. A phase describes which
/// visual sequence the widget is currently running.
///
/// # Required Traits
///
/// - `Clone`: Phases must be cloneable for history tracking
/// - `PartialEq`: Phases must be comparable to detect no-op transitions
/// - `Debug`: Phases must be debuggable for diagnostics
/// - `Serialize` + `Deserialize`: Phases must be serializable for snapshots
///
/// # Example
///
/// ```rust
/// use searchpulse::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Lamp {
///     Off,
///     Pulsing,
///     Broken,
/// }
///
/// impl State for Lamp {
///     fn name(&self) -> &str {
///         match self {
///             Self::Off => "Off",
///             Self::Pulsing => "Pulsing",
///             Self::Broken => "Broken",
///         }
///     }
///
///     fn is_settled(&self) -> bool {
///         matches!(self, Self::Off)
///     }
///
///     fn is_error(&self) -> bool {
///         matches!(self, Self::Broken)
///     }
/// }
/// ```
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Get the phase name for display/logging.
    fn name(&self) -> &str;

    /// Check if this phase is at rest.
    ///
    /// Settled phases have no animation sequence pending; the widget
    /// stays put until the next observation.
    ///
    /// Default implementation returns `false`.
    fn is_settled(&self) -> bool {
        false
    }

    /// Check if this phase surfaces a failure to the user.
    ///
    /// Default implementation returns `false`.
    fn is_error(&self) -> bool {
        false
    }
}
