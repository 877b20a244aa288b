//! Result filtering.
//!
//! Search nodes arrive loosely typed: a GitHub user search can return
//! organizations or users without a display name. Only complete `User`
//! nodes become rows. Rejections are accumulated with `Validation` so every
//! reason an entry was dropped is known at once.

use serde::{Deserialize, Serialize};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;
use tracing::trace;

/// Discriminator value of nodes that become rows.
pub const USER_KIND: &str = "User";

/// A search node as returned by the API. Every field may be missing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserResultRaw {
    #[serde(rename = "__typename")]
    pub kind: Option<String>,
    pub avatar_url: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    pub login: Option<String>,
    pub repositories: Option<RepositoryConnection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryConnection {
    pub total_count: u64,
}

/// A user row ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResult {
    /// Unique within a result set.
    pub login: String,
    pub display_name: String,
    pub profile_url: String,
    pub avatar_url: String,
    pub repository_count: u64,
}

impl UserResult {
    /// Key used by the presentation layer for enter/exit transitions.
    pub fn row_key(&self, index: usize) -> String {
        format!("{}-{}", self.login, index)
    }
}

impl From<&UserResult> for UserResultRaw {
    fn from(result: &UserResult) -> Self {
        Self {
            kind: Some(USER_KIND.to_string()),
            avatar_url: Some(result.avatar_url.clone()),
            name: Some(result.display_name.clone()),
            url: Some(result.profile_url.clone()),
            login: Some(result.login.clone()),
            repositories: Some(RepositoryConnection {
                total_count: result.repository_count,
            }),
        }
    }
}

/// Why a node did not become a row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("node kind {found:?} is not {USER_KIND}")]
    WrongKind { found: Option<String> },

    #[error("node has no display name")]
    MissingName,

    #[error("node has no login")]
    MissingLogin,
}

fn present(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.trim().is_empty())
}

fn check(ok: bool, rejection: Rejection) -> Validation<(), NonEmptyVec<Rejection>> {
    if ok {
        Validation::success(())
    } else {
        Validation::fail(rejection)
    }
}

/// Validate one node, collecting every rejection reason.
pub fn validate(raw: &UserResultRaw) -> Validation<UserResult, NonEmptyVec<Rejection>> {
    let checks = vec![
        check(
            raw.kind.as_deref() == Some(USER_KIND),
            Rejection::WrongKind {
                found: raw.kind.clone(),
            },
        ),
        check(present(&raw.name), Rejection::MissingName),
        check(present(&raw.login), Rejection::MissingLogin),
    ];

    Validation::all_vec(checks).map(|_| UserResult {
        login: raw.login.clone().unwrap_or_default(),
        display_name: raw.name.clone().unwrap_or_default(),
        profile_url: raw.url.clone().unwrap_or_default(),
        avatar_url: raw.avatar_url.clone().unwrap_or_default(),
        repository_count: raw.repositories.map_or(0, |r| r.total_count),
    })
}

/// Keep the displayable user nodes, in source order.
pub fn filter(raw: &[UserResultRaw]) -> Vec<UserResult> {
    raw.iter()
        .enumerate()
        .filter_map(|(index, node)| match validate(node) {
            Validation::Success(result) => Some(result),
            Validation::Failure(reasons) => {
                trace!(index, reasons = reasons.len(), "dropping search node");
                None
            }
        })
        .collect()
}
