//! Event source client for stackblame.
//!
//! Exposes the provisioning service's read API behind the [`EventSource`]
//! trait: stack listing and paginated lifecycle-event retrieval. The
//! [`fetch_stack_events`] helper drains pagination to completion and
//! normalizes event order, which is the contract every downstream step
//! relies on.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sb_core::{StackEvent, StackId, normalize_events};

/// Default request timeout for API calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Event source errors.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The provided API token was invalid.
    #[error("invalid API token: {reason}")]
    InvalidToken { reason: &'static str },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// API returned an error response.
    #[error("API error: {message}")]
    Api { message: String },
    /// Failed to parse response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// A stack known to the event source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackSummary {
    /// Opaque identifier assigned by the service.
    pub stack_id: StackId,
    /// The stack's declared name; top-level events carry it as their
    /// logical identifier.
    pub stack_name: String,
}

/// One page of lifecycle events.
#[derive(Debug, Clone, Deserialize)]
pub struct EventPage {
    pub events: Vec<StackEvent>,
    /// Opaque continuation token; absent on the final page.
    pub next_token: Option<String>,
}

/// Read access to the provisioning service.
///
/// Implementations are queried page-at-a-time; completeness and ordering
/// are the caller's concern (see [`fetch_stack_events`]).
#[allow(async_fn_in_trait)] // used generically, never across a spawn boundary
pub trait EventSource {
    /// Lists every stack the source knows about.
    async fn list_stacks(&self) -> Result<Vec<StackSummary>, SourceError>;

    /// Fetches one page of events for a stack, continuing from `next_token`
    /// when given.
    async fn fetch_events(
        &self,
        stack_id: &StackId,
        next_token: Option<&str>,
    ) -> Result<EventPage, SourceError>;
}

/// Fetches the complete, time-ordered event history for one stack.
///
/// Drains pagination until the source stops returning a continuation token;
/// a single page is never assumed sufficient. Any page failure aborts the
/// fetch whole — a partial history must never reach the pairer.
pub async fn fetch_stack_events<S: EventSource>(
    source: &S,
    stack_id: &StackId,
) -> Result<Vec<StackEvent>, SourceError> {
    let mut events = Vec::new();
    let mut next_token: Option<String> = None;

    loop {
        let page = source.fetch_events(stack_id, next_token.as_deref()).await?;
        events.extend(page.events);
        match page.next_token {
            Some(token) => next_token = Some(token),
            None => break,
        }
    }

    tracing::debug!(stack_id = %stack_id, events = events.len(), "fetched event history");
    normalize_events(&mut events);
    Ok(events)
}

/// HTTP client for the event source API.
///
/// # Thread Safety
///
/// The client is safe to clone and share across threads. Each clone shares
/// the underlying HTTP connection pool.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    endpoint: String,
    api_token: String,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("endpoint", &self.endpoint)
            .field("api_token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a new client for the given endpoint and API token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or whitespace-only, or if the
    /// HTTP client fails to build.
    pub fn new(endpoint: impl Into<String>, api_token: impl Into<String>) -> Result<Self, SourceError> {
        let api_token = api_token.into();

        if api_token.is_empty() {
            return Err(SourceError::InvalidToken {
                reason: "API token cannot be empty",
            });
        }
        if api_token.trim().is_empty() {
            return Err(SourceError::InvalidToken {
                reason: "API token cannot be whitespace-only",
            });
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(SourceError::ClientBuild)?;

        Ok(Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_token,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, SourceError> {
        let response = self
            .http
            .get(format!("{}{path}", self.endpoint))
            .bearer_auth(&self.api_token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(parse_api_error(&body).unwrap_or_else(|| SourceError::Api {
                message: format!("status {status}: {body}"),
            }));
        }

        serde_json::from_str(&body).map_err(|err| SourceError::InvalidResponse(err.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct ListStacksResponse {
    stacks: Vec<StackSummary>,
}

impl EventSource for Client {
    async fn list_stacks(&self) -> Result<Vec<StackSummary>, SourceError> {
        let response: ListStacksResponse = self.get_json("/stacks", &[]).await?;
        Ok(response.stacks)
    }

    async fn fetch_events(
        &self,
        stack_id: &StackId,
        next_token: Option<&str>,
    ) -> Result<EventPage, SourceError> {
        let mut query = vec![("stack_id", stack_id.as_str())];
        if let Some(token) = next_token {
            query.push(("next_token", token));
        }
        self.get_json("/events", &query).await
    }
}

fn parse_api_error(body: &str) -> Option<SourceError> {
    #[derive(Deserialize)]
    struct ErrorPayload {
        error: ErrorDetails,
    }

    #[derive(Deserialize)]
    struct ErrorDetails {
        message: String,
    }

    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .map(|payload| SourceError::Api {
            message: payload.error.message,
        })
}
