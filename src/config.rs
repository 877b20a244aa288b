//! Widget configuration.
//!
//! Everything tunable about the widget lives here: timer lengths, the
//! base geometry and where searches are sent. Values deserialize from
//! camelCase JSON and every field has a default, so `{}` is a valid config.

use crate::geometry::Dimensions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// GitHub GraphQL endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "https://api.github.com/graphql";

/// Environment variable holding the GitHub token by default.
pub const DEFAULT_TOKEN_ENV: &str = "GITHUB_AUTH_TOKEN";

/// Top-level widget configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WidgetConfig {
    pub timings: Timings,
    pub dimensions: Dimensions,
    pub search: SearchConfig,
}

impl WidgetConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Timer and animation lengths, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Timings {
    /// Quiet period before a keystroke value is committed as a query.
    pub debounce_ms: u64,
    /// How long an advisory dialog stays up before auto-dismissing.
    pub dialog_ms: u64,
    /// Pause between a dialog closing and the retract that follows it.
    pub grace_ms: u64,
    /// Delay between an avatar loading and it fading in.
    pub avatar_reveal_ms: u64,
    /// One half-cycle of the breathing oscillation.
    pub breathe_ms: u64,
    pub expand_ms: u64,
    pub collapse_ms: u64,
    pub overshoot_ms: u64,
    pub settle_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            debounce_ms: 400,
            dialog_ms: 2750,
            grace_ms: 300,
            avatar_reveal_ms: 300,
            breathe_ms: 900,
            expand_ms: 450,
            collapse_ms: 350,
            overshoot_ms: 120,
            settle_ms: 400,
        }
    }
}

impl Timings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn dialog(&self) -> Duration {
        Duration::from_millis(self.dialog_ms)
    }

    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }

    pub fn avatar_reveal(&self) -> Duration {
        Duration::from_millis(self.avatar_reveal_ms)
    }
}

/// Where and how searches are issued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchConfig {
    pub endpoint: String,
    /// Number of nodes requested per search.
    pub page_size: u32,
    /// Name of the environment variable carrying the bearer token.
    pub token_env: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            page_size: 10,
            token_env: DEFAULT_TOKEN_ENV.to_string(),
        }
    }
}

impl SearchConfig {
    /// `Authorization` header value, if a non-empty token is set.
    pub fn authorization(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .filter(|token| !token.is_empty())
            .map(|token| format!("Bearer {token}"))
    }
}
