//! Search request boundary.
//!
//! The crate never talks to the network itself. It builds GraphQL request
//! bodies, decodes responses, and tracks which request is current so that
//! a slow response for an abandoned query cannot overwrite newer state.

use crate::config::SearchConfig;
use crate::filter::{filter, UserResult, UserResultRaw};
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;
use tracing::{debug, warn};

const SEARCH_DOCUMENT: &str = "query SearchUsers($query: String!, $first: Int!) { \
search(query: $query, type: USER, first: $first) { userCount nodes { __typename \
... on User { avatarUrl name url login repositories { totalCount } } } } }";

/// Errors produced by a search.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Transport failed: {0}")]
    Transport(String),

    #[error("Search API returned errors: {}", .messages.join("; "))]
    Remote { messages: Vec<String> },

    #[error("Response could not be decoded: {0}")]
    Decode(String),

    #[error("Response carried no search data")]
    MissingData,
}

/// Decoded body of a successful search.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchPayload {
    pub user_count: u64,
    pub nodes: Vec<UserResultRaw>,
}

/// GraphQL request body for a user search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    query: &'static str,
    variables: SearchVariables,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct SearchVariables {
    query: String,
    first: u32,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, first: u32) -> Self {
        Self {
            query: SEARCH_DOCUMENT,
            variables: SearchVariables {
                query: query.into(),
                first,
            },
        }
    }

    /// The user's search text.
    pub fn text(&self) -> &str {
        &self.variables.query
    }

    pub fn first(&self) -> u32 {
        self.variables.first
    }

    pub fn to_body(&self) -> Result<String, FetchError> {
        serde_json::to_string(self).map_err(|e| FetchError::Decode(e.to_string()))
    }

    /// Resolve endpoint, credentials and body for an HTTP transport.
    pub fn to_http(&self, config: &SearchConfig) -> Result<HttpSearch, FetchError> {
        Ok(HttpSearch {
            endpoint: config.endpoint.clone(),
            authorization: config.authorization(),
            body: self.to_body()?,
        })
    }
}

/// A search ready to be POSTed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSearch {
    pub endpoint: String,
    /// `Authorization` header value, when a token is configured.
    pub authorization: Option<String>,
    pub body: String,
}

#[derive(Deserialize)]
struct Envelope {
    data: Option<EnvelopeData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct EnvelopeData {
    search: Option<SearchPayload>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

/// Decode a GraphQL response body.
pub fn parse_response(body: &str) -> Result<SearchPayload, FetchError> {
    let envelope: Envelope =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    if !envelope.errors.is_empty() {
        return Err(FetchError::Remote {
            messages: envelope.errors.into_iter().map(|e| e.message).collect(),
        });
    }

    envelope
        .data
        .and_then(|data| data.search)
        .ok_or(FetchError::MissingData)
}

/// Executes searches on behalf of the widget.
///
/// Implementations usually call [`SearchRequest::to_http`] with the given
/// config and hand the body of the response to [`parse_response`].
pub trait SearchBackend: Send + Sync + 'static {
    fn search(
        &self,
        config: &SearchConfig,
        request: &SearchRequest,
    ) -> impl Future<Output = Result<SearchPayload, FetchError>> + Send;
}

/// Identifies one issued search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticket: FetchTicket,
    pub request: SearchRequest,
}

/// State of the current search.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FetchState {
    pub loading: bool,
    pub results: Vec<UserResult>,
    pub error: bool,
}

#[derive(Debug, Clone)]
pub struct FetchTracker {
    current: Option<FetchTicket>,
    state: FetchState,
    next_ticket: u64,
    page_size: u32,
}

impl FetchTracker {
    pub fn new(page_size: u32) -> Self {
        Self {
            current: None,
            state: FetchState::default(),
            next_ticket: 0,
            page_size,
        }
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    pub fn current(&self) -> Option<FetchTicket> {
        self.current
    }

    /// Start a search for a newly committed query.
    ///
    /// An empty query resets the state and issues nothing; any earlier
    /// request stops being current either way.
    pub fn begin(&mut self, query: &str) -> Option<FetchRequest> {
        if query.is_empty() {
            self.current = None;
            self.state = FetchState::default();
            return None;
        }

        self.next_ticket += 1;
        let ticket = FetchTicket(self.next_ticket);
        self.current = Some(ticket);
        self.state = FetchState {
            loading: true,
            ..FetchState::default()
        };
        debug!(?ticket, query, "search started");

        Some(FetchRequest {
            ticket,
            request: SearchRequest::new(query, self.page_size),
        })
    }

    /// Apply a search outcome. Returns `false` if the ticket is stale.
    pub fn resolve(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<SearchPayload, FetchError>,
    ) -> bool {
        if self.current != Some(ticket) {
            debug!(?ticket, current = ?self.current, "ignoring stale search response");
            return false;
        }

        self.state = match outcome {
            Ok(payload) => FetchState {
                loading: false,
                results: filter(&payload.nodes),
                error: false,
            },
            Err(err) => {
                warn!(?ticket, error = %err, "search failed");
                FetchState {
                    loading: false,
                    results: Vec::new(),
                    error: true,
                }
            }
        };
        true
    }
}
