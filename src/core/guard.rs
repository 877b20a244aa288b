//! Guard predicates gating transitions.
//!
//! A guard is a pure boolean function over the current phase. The
//! coordinator uses one to keep a second retract from starting while the
//! first is still in flight.

use super::state::State;
use std::fmt;
use std::marker::PhantomData;

/// Pure predicate that decides whether a transition may start.
///
/// # Example
///
/// ```rust
/// use searchpulse::core::{Guard, State};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Door {
///     Open,
///     Closing,
/// }
///
/// impl State for Door {
///     fn name(&self) -> &str {
///         match self {
///             Self::Open => "Open",
///             Self::Closing => "Closing",
///         }
///     }
/// }
///
/// let may_close = Guard::new(|d: &Door| !matches!(d, Door::Closing));
///
/// assert!(may_close.check(&Door::Open));
/// assert!(!may_close.check(&Door::Closing));
/// ```
pub struct Guard<S: State> {
    predicate: Box<dyn Fn(&S) -> bool + Send + Sync>,
    _phantom: PhantomData<S>,
}

impl<S: State> Guard<S> {
    /// Create a guard from a pure predicate function.
    ///
    /// The predicate must be deterministic and thread-safe (Send + Sync).
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
            _phantom: PhantomData,
        }
    }

    /// Check if the guard lets a transition start from this phase.
    pub fn check(&self, state: &S) -> bool {
        (self.predicate)(state)
    }
}

impl<S: State> fmt::Debug for Guard<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard").finish_non_exhaustive()
    }
}
