//! Wikidata `usercontribs` API client.
//!
//! Fetches the contribution history of one participant inside a time
//! window, via `action=query&list=usercontribs` (see
//! <https://www.wikidata.org/w/api.php>).
//!
//! # Paging
//!
//! A single query returns at most [`PAGE_LIMIT`] contributions and this
//! client requests exactly one page, never following the continuation
//! token. Participants with more than 500 edits in one window are
//! therefore truncated; a known limitation kept from the tool this one
//! replaces. Split the window if that matters.
//!
//! # Failure handling
//!
//! The event analysis is a one-shot offline batch with no deadline, so
//! the fetch path treats every transport-level failure (connection
//! refused, non-200 status, unreadable or unparseable body) the same
//! way: log it and try the exact same request again, by default forever.
//! Only a *structurally valid* response that simply lacks the
//! `query.usercontribs` list is treated as "no contributions" rather
//! than as a failure.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::model::{Contribution, ParticipantIdentity, TimeWindow};

/// Base URL of the Wikidata API endpoint.
const WIKIDATA_API_BASE: &str = "https://www.wikidata.org/w/api.php";

/// Hard cap the API places on a single `usercontribs` page.
pub const PAGE_LIMIT: u32 = 500;

/// A fetch attempt that could not produce a well-formed page.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request never produced a response (DNS, connect, read).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with something other than 200.
    #[error("unexpected HTTP status {0}")]
    Status(StatusCode),

    /// The body was not parseable JSON.
    #[error("malformed response body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    /// A bounded [`RetryPolicy`] ran out of attempts.
    #[error("giving up after {attempts} failed attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },
}

/// How [`fetch_with_retry`] reacts to a failed attempt.
///
/// The default is the crude batch-job policy: retry the same request
/// immediately and indefinitely until the network cooperates. Callers
/// that need a bound (tests, politer deployments) inject their own.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryPolicy {
    /// Give up after this many failed attempts; `None` retries forever.
    pub max_attempts: Option<u32>,

    /// Wait this long between attempts; `None` retries immediately.
    pub delay: Option<Duration>,
}

impl RetryPolicy {
    /// A bounded policy with no delay, mostly useful in tests.
    pub fn bounded(max_attempts: u32) -> Self {
        Self {
            max_attempts: Some(max_attempts),
            delay: None,
        }
    }
}

/// Anything that can produce one page of contributions.
///
/// The production implementation is [`WikidataClient`]; tests substitute
/// stubs to exercise the retry loop and the roster orchestration without
/// a network.
pub trait ContributionSource {
    /// Fetch one page of contributions for `identity` inside `window`.
    ///
    /// An `Ok` with an empty vector means the response was well-formed
    /// but listed no contributions; that is a result, not a failure.
    fn fetch_page(
        &self,
        identity: &ParticipantIdentity,
        window: &TimeWindow,
    ) -> impl Future<Output = Result<Vec<Contribution>, FetchError>>;
}

/// Client for querying the Wikidata contribution-listing API.
#[derive(Clone)]
pub struct WikidataClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for WikidataClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WikidataClient {
    /// Create a new client against the public Wikidata endpoint.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: WIKIDATA_API_BASE.to_string(),
        }
    }

    /// Create a client with a custom base URL (for testing).
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.to_string(),
        }
    }

    /// Build the `usercontribs` query URL for one participant.
    ///
    /// The identity kind selects the user parameter: `ucuserprefix` for
    /// IP-prefix participants, `ucuser` otherwise. The window bounds go
    /// in reversed (`ucstart` = later) order per the API's backwards
    /// listing.
    fn contributions_url(&self, identity: &ParticipantIdentity, window: &TimeWindow) -> String {
        let (user_param, user_value) = match identity {
            ParticipantIdentity::User(name) => ("ucuser", name.as_str()),
            ParticipantIdentity::IpPrefix { prefix, .. } => ("ucuserprefix", prefix.as_str()),
        };

        format!(
            "{}?action=query&list=usercontribs&format=json&ucstart={}&ucend={}&{}={}&uclimit={}",
            self.base_url,
            window.uc_start(),
            window.uc_end(),
            user_param,
            urlencoding::encode(user_value),
            PAGE_LIMIT
        )
    }
}

impl ContributionSource for WikidataClient {
    async fn fetch_page(
        &self,
        identity: &ParticipantIdentity,
        window: &TimeWindow,
    ) -> Result<Vec<Contribution>, FetchError> {
        let url = self.contributions_url(identity, window);
        debug!(%url, "requesting contribution page");

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status));
        }

        let body = response.text().await?;
        let envelope: Value = serde_json::from_str(&body)?;

        Ok(extract_contributions(&envelope))
    }
}

/// Pull the contribution list out of a response envelope.
///
/// The expected shape is `{"query": {"usercontribs": [...]}}`. If that
/// path is absent or not an array the page is empty; entries that fail
/// to deserialize are skipped with a warning rather than failing the
/// page.
fn extract_contributions(envelope: &Value) -> Vec<Contribution> {
    let Some(entries) = envelope
        .pointer("/query/usercontribs")
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| match Contribution::deserialize(entry) {
            Ok(contribution) => Some(contribution),
            Err(e) => {
                warn!(error = %e, "skipping malformed contribution entry");
                None
            }
        })
        .collect()
}

/// Fetch one page, retrying failed attempts per `policy`.
///
/// With the default (unbounded) policy this only ever returns `Ok`: a
/// request that keeps failing keeps the run waiting. Each failure is
/// logged before the next attempt.
pub async fn fetch_with_retry<S: ContributionSource>(
    source: &S,
    identity: &ParticipantIdentity,
    window: &TimeWindow,
    policy: &RetryPolicy,
) -> Result<Vec<Contribution>, FetchError> {
    let mut attempts: u32 = 0;

    loop {
        match source.fetch_page(identity, window).await {
            Ok(contributions) => return Ok(contributions),
            Err(e) => {
                attempts += 1;
                warn!(
                    participant = %identity,
                    attempts,
                    error = %e,
                    "contribution fetch failed, retrying"
                );

                if let Some(max) = policy.max_attempts
                    && attempts >= max
                {
                    return Err(FetchError::Exhausted {
                        attempts,
                        last: Box::new(e),
                    });
                }

                if let Some(delay) = policy.delay {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
