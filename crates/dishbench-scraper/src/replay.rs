//! Re-issues a captured search API request outside the browser.

use std::time::Duration;

use dishbench_core::AppConfig;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Url};
use serde_json::Value;

use crate::error::ScraperError;
use crate::retry::retry_with_backoff;
use crate::types::CapturedRequest;

/// Captured headers that are not forwarded: the HTTP client negotiates its
/// own compression and must be able to decode what it asked for.
const DROPPED_HEADERS: &[&str] = &["accept-encoding"];

/// The three query parameters rewritten on every replay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplayOverrides<'a> {
    pub latitude: f64,
    pub longitude: f64,
    pub search: &'a str,
}

/// HTTP client for replaying the captured search API call.
///
/// Non-2xx responses and non-JSON bodies surface as typed errors; a body
/// that fails to parse is [`ScraperError::Deserialize`], never a transport
/// error, so callers can tell the two apart.
pub struct ReplayClient {
    client: Client,
    user_agent: String,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl ReplayClient {
    /// Creates a `ReplayClient` with a request timeout, the desktop
    /// `User-Agent` substituted on every replay, and a retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            user_agent: user_agent.to_owned(),
            max_retries,
            backoff_base_secs,
        })
    }

    /// # Errors
    ///
    /// See [`ReplayClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        Self::new(
            config.replay_timeout_secs,
            &config.replay_user_agent,
            config.replay_max_retries,
            config.replay_backoff_base_secs,
        )
    }

    /// Replays `captured` as a GET with `overrides` applied and returns the
    /// parsed JSON body.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidCapturedUrl`]: the captured URL does not parse.
    /// - [`ScraperError::RateLimited`]: HTTP 429.
    /// - [`ScraperError::UnexpectedStatus`]: any other non-2xx status.
    /// - [`ScraperError::Http`]: network or TLS failure.
    /// - [`ScraperError::Deserialize`]: the body is not valid JSON.
    pub async fn replay(
        &self,
        captured: &CapturedRequest,
        overrides: &ReplayOverrides<'_>,
    ) -> Result<Value, ScraperError> {
        let url = replay_url(&captured.url, overrides)?;
        let headers = self.replay_headers(captured);
        let domain = url.host_str().unwrap_or_default().to_owned();
        let url = url.to_string();

        if !captured.method.eq_ignore_ascii_case("GET") {
            tracing::debug!(
                method = %captured.method,
                "captured request was not a GET; replaying as GET"
            );
        }

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            let headers = headers.clone();
            let domain = domain.clone();
            async move {
                let response = self.client.get(&url).headers(headers).send().await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(ScraperError::RateLimited {
                        domain,
                        retry_after_secs,
                    });
                }

                if !status.is_success() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    });
                }

                let body = response.text().await?;
                serde_json::from_str::<Value>(&body).map_err(|source| ScraperError::Deserialize {
                    context: format!("search payload from {domain}"),
                    source,
                })
            }
        })
        .await
    }

    /// Builds the header set for a replay: the captured headers, minus the
    /// ones in [`DROPPED_HEADERS`], with `User-Agent` replaced.
    fn replay_headers(&self, captured: &CapturedRequest) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in &captured.headers {
            if name.starts_with(':') || DROPPED_HEADERS.contains(&name.as_str()) {
                continue;
            }
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => tracing::debug!(header = %name, "skipping header that cannot be replayed"),
            }
        }
        if let Ok(ua) = HeaderValue::from_str(&self.user_agent) {
            headers.insert(reqwest::header::USER_AGENT, ua);
        }
        headers
    }
}

/// Rewrites `lat`, `lng` and `str` on `captured_url`, keeping every other
/// query parameter and their existing order.
///
/// A parameter that is present keeps its position and loses any later
/// duplicates; an absent one is appended.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidCapturedUrl`] if `captured_url` does not parse.
pub fn replay_url(captured_url: &str, overrides: &ReplayOverrides<'_>) -> Result<Url, ScraperError> {
    let mut url = Url::parse(captured_url).map_err(|e| ScraperError::InvalidCapturedUrl {
        url: captured_url.to_owned(),
        reason: e.to_string(),
    })?;

    let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    set_param(&mut pairs, "lat", &overrides.latitude.to_string());
    set_param(&mut pairs, "lng", &overrides.longitude.to_string());
    set_param(&mut pairs, "str", overrides.search);

    url.query_pairs_mut()
        .clear()
        .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    Ok(url)
}

fn set_param(pairs: &mut Vec<(String, String)>, key: &str, value: &str) {
    match pairs.iter().position(|(k, _)| k == key) {
        Some(idx) => {
            value.clone_into(&mut pairs[idx].1);
            let mut seen = 0usize;
            pairs.retain(|(k, _)| {
                if k != key {
                    return true;
                }
                seen += 1;
                seen == 1
            });
        }
        None => pairs.push((key.to_owned(), value.to_owned())),
    }
}

#[cfg(test)]
#[path = "replay_test.rs"]
mod tests;
