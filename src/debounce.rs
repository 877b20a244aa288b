//! Debounced input.
//!
//! The raw value follows every keystroke; the committed query only moves
//! once the raw value has been left alone for the quiet period. Clearing
//! the field commits the empty string straight away.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Identifies one scheduled commit. Only the newest one is honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DebounceToken(u64);

/// Snapshot of the input.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchState {
    pub raw_value: String,
    pub committed_query: String,
}

/// What the caller has to do after a keystroke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebounceAction {
    /// Fire `on_quiet_period_elapsed(token)` after `after`.
    Schedule { token: DebounceToken, after: Duration },
    /// The committed query changed right away.
    Commit(String),
    /// Nothing to schedule or commit.
    Nothing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeystrokeOutcome {
    /// Previously scheduled commit that must no longer fire.
    pub cancelled: Option<DebounceToken>,
    pub action: DebounceAction,
}

#[derive(Debug, Clone)]
pub struct DebouncedInput {
    state: SearchState,
    pending: Option<DebounceToken>,
    next_token: u64,
    quiet: Duration,
}

impl DebouncedInput {
    pub fn new(quiet: Duration) -> Self {
        Self {
            state: SearchState::default(),
            pending: None,
            next_token: 0,
            quiet,
        }
    }

    pub fn raw(&self) -> &str {
        &self.state.raw_value
    }

    pub fn committed(&self) -> &str {
        &self.state.committed_query
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn pending(&self) -> Option<DebounceToken> {
        self.pending
    }

    /// Record a keystroke and decide what to schedule.
    pub fn on_keystroke(&mut self, raw: impl Into<String>) -> KeystrokeOutcome {
        self.state.raw_value = raw.into();
        let cancelled = self.pending.take();

        let action = if self.state.raw_value.is_empty() {
            self.commit()
                .map_or(DebounceAction::Nothing, DebounceAction::Commit)
        } else {
            self.next_token += 1;
            let token = DebounceToken(self.next_token);
            self.pending = Some(token);
            DebounceAction::Schedule {
                token,
                after: self.quiet,
            }
        };

        KeystrokeOutcome { cancelled, action }
    }

    /// The quiet period for `token` elapsed. Returns the new committed
    /// query if this settled on a different value.
    pub fn on_quiet_period_elapsed(&mut self, token: DebounceToken) -> Option<String> {
        if self.pending != Some(token) {
            return None;
        }
        self.pending = None;
        self.commit()
    }

    fn commit(&mut self) -> Option<String> {
        if self.state.raw_value == self.state.committed_query {
            return None;
        }
        self.state.committed_query = self.state.raw_value.clone();
        Some(self.state.committed_query.clone())
    }
}
