//! Phase transition history.
//!
//! Every phase change the coordinator makes is recorded with a timestamp
//! and the sequence token it started, so a host can replay what the widget
//! did when chasing animation glitches.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Number of transitions a history keeps unless told otherwise.
pub const DEFAULT_HISTORY_CAPACITY: usize = 64;

fn default_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

/// Record of a single phase change.
///
/// # Example
///
/// ```rust
/// use searchpulse::core::{State, StateTransition};
/// use serde::{Deserialize, Serialize};
/// use chrono::Utc;
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Step {
///     Rest,
///     Grow,
/// }
///
/// impl State for Step {
///     fn name(&self) -> &str {
///         match self {
///             Self::Rest => "Rest",
///             Self::Grow => "Grow",
///         }
///     }
/// }
///
/// let transition = StateTransition {
///     from: Step::Rest,
///     to: Step::Grow,
///     timestamp: Utc::now(),
///     token: 1,
/// };
/// assert_eq!(transition.to.name(), "Grow");
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: State> {
    /// The phase being left
    pub from: S,
    /// The phase being entered
    pub to: S,
    /// When the change happened
    pub timestamp: DateTime<Utc>,
    /// Sequence token of the animation sequence the change started
    pub token: u64,
}

/// Ordered history of the most recent phase changes.
///
/// Only the last `capacity` transitions are kept; older ones are dropped
/// as new ones arrive. `record` returns a new history with the transition
/// appended and leaves the receiver untouched; `push` appends in place.
///
/// # Example
///
/// ```rust
/// use searchpulse::core::{State, StateHistory, StateTransition};
/// use serde::{Deserialize, Serialize};
/// use chrono::Utc;
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Step { A, B, C }
///
/// impl State for Step {
///     fn name(&self) -> &str {
///         match self {
///             Self::A => "A",
///             Self::B => "B",
///             Self::C => "C",
///         }
///     }
/// }
///
/// let history = StateHistory::new()
///     .record(StateTransition { from: Step::A, to: Step::B, timestamp: Utc::now(), token: 1 })
///     .record(StateTransition { from: Step::B, to: Step::C, timestamp: Utc::now(), token: 2 });
///
/// assert_eq!(history.get_path(), vec![&Step::A, &Step::B, &Step::C]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    transitions: VecDeque<StateTransition<S>>,
    #[serde(default = "default_capacity")]
    capacity: usize,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    /// Create a new empty history holding up to [`DEFAULT_HISTORY_CAPACITY`]
    /// transitions.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            transitions: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record a transition, returning a new history.
    pub fn record(&self, transition: StateTransition<S>) -> Self {
        let mut next = self.clone();
        next.push(transition);
        next
    }

    /// Append a transition, evicting the oldest once full.
    pub fn push(&mut self, transition: StateTransition<S>) {
        self.transitions.push_back(transition);
        while self.transitions.len() > self.capacity {
            self.transitions.pop_front();
        }
    }

    /// Get the path of phases traversed: the first `from`, then every `to`.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.front() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Time between the first and last recorded transitions.
    ///
    /// Returns `None` when nothing has been recorded.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.front(), self.transitions.back()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// Get all retained transitions, oldest first.
    pub fn transitions(&self) -> &VecDeque<StateTransition<S>> {
        &self.transitions
    }

    /// The most recent transition, if any.
    pub fn last(&self) -> Option<&StateTransition<S>> {
        self.transitions.back()
    }

    /// Count how many times a phase with the given name was entered.
    pub fn entries_of(&self, name: &str) -> usize {
        self.transitions
            .iter()
            .filter(|t| t.to.name() == name)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum TestPhase {
        Idle,
        Breathing,
        Expanded,
    }

    impl State for TestPhase {
        fn name(&self) -> &str {
            match self {
                Self::Idle => "Idle",
                Self::Breathing => "Breathing",
                Self::Expanded => "Expanded",
            }
        }
    }

    fn transition(from: TestPhase, to: TestPhase, token: u64) -> StateTransition<TestPhase> {
        StateTransition {
            from,
            to,
            timestamp: Utc::now(),
            token,
        }
    }

    #[test]
    fn new_history_is_empty() {
        let history: StateHistory<TestPhase> = StateHistory::new();
        assert!(history.transitions().is_empty());
        assert!(history.get_path().is_empty());
        assert!(history.duration().is_none());
        assert!(history.last().is_none());
    }

    #[test]
    fn record_is_immutable() {
        let history = StateHistory::new();
        let next = history.record(transition(TestPhase::Idle, TestPhase::Breathing, 1));

        assert_eq!(history.transitions().len(), 0);
        assert_eq!(next.transitions().len(), 1);
    }

    #[test]
    fn get_path_returns_phase_sequence() {
        let history = StateHistory::new()
            .record(transition(TestPhase::Idle, TestPhase::Breathing, 1))
            .record(transition(TestPhase::Breathing, TestPhase::Expanded, 2));

        let path = history.get_path();
        assert_eq!(
            path,
            vec![&TestPhase::Idle, &TestPhase::Breathing, &TestPhase::Expanded]
        );
        assert_eq!(history.last().map(|t| t.token), Some(2));
    }

    #[test]
    fn entries_of_counts_by_name() {
        let history = StateHistory::new()
            .record(transition(TestPhase::Idle, TestPhase::Breathing, 1))
            .record(transition(TestPhase::Breathing, TestPhase::Idle, 2))
            .record(transition(TestPhase::Idle, TestPhase::Breathing, 3));

        assert_eq!(history.entries_of("Breathing"), 2);
        assert_eq!(history.entries_of("Expanded"), 0);
    }

    #[test]
    fn oldest_transitions_are_evicted_at_capacity() {
        let mut history = StateHistory::with_capacity(3);
        for token in 1..=10 {
            history.push(transition(TestPhase::Idle, TestPhase::Breathing, token));
        }

        assert_eq!(history.transitions().len(), 3);
        let tokens: Vec<_> = history.transitions().iter().map(|t| t.token).collect();
        assert_eq!(tokens, vec![8, 9, 10]);

        let next = history.record(transition(TestPhase::Breathing, TestPhase::Expanded, 11));
        assert_eq!(next.transitions().len(), 3);
        assert_eq!(next.transitions()[0].token, 9);
        assert_eq!(history.last().map(|t| t.token), Some(10));
    }

    #[test]
    fn single_transition_has_zero_duration() {
        let history =
            StateHistory::new().record(transition(TestPhase::Idle, TestPhase::Breathing, 1));
        assert_eq!(history.duration(), Some(Duration::from_secs(0)));
    }

    #[test]
    fn history_serializes_correctly() {
        let history =
            StateHistory::new().record(transition(TestPhase::Idle, TestPhase::Expanded, 7));

        let json = serde_json::to_string(&history).unwrap();
        let back: StateHistory<TestPhase> = serde_json::from_str(&json).unwrap();

        assert_eq!(back.transitions().len(), 1);
        assert_eq!(back.transitions()[0].token, 7);
        assert_eq!(back.capacity(), DEFAULT_HISTORY_CAPACITY);
    }
}
