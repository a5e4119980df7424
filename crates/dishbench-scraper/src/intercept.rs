//! Snapshots the search API request out of the page's network traffic.

use serde_json::Value;

use crate::types::CapturedRequest;

/// Watches outgoing requests and remembers the last one whose URL contains
/// the API marker.
///
/// Purely observational: requests are never paused or altered.
#[derive(Debug)]
pub struct RequestInterceptor {
    marker: String,
    captured: Option<CapturedRequest>,
    matches: usize,
}

impl RequestInterceptor {
    #[must_use]
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            captured: None,
            matches: 0,
        }
    }

    /// Records one outgoing request. Returns `true` when it matched the
    /// marker and replaced any earlier snapshot.
    pub fn observe<I, K, V>(&mut self, url: &str, method: &str, headers: I) -> bool
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        if !url.contains(&self.marker) {
            return false;
        }
        self.matches += 1;
        tracing::debug!(url, method, matches = self.matches, "captured search API request");
        self.captured = Some(CapturedRequest::new(url, method, headers));
        true
    }

    /// Number of matching requests seen so far.
    #[must_use]
    pub fn matches(&self) -> usize {
        self.matches
    }

    /// Ends interception and hands back the last match, if any.
    #[must_use]
    pub fn finish(self) -> Option<CapturedRequest> {
        self.captured
    }
}

/// Flattens a CDP `Network.Headers` object into string pairs.
///
/// Non-string values are rendered as JSON text; anything that is not an
/// object yields no headers.
#[must_use]
pub fn header_pairs(headers: &Value) -> Vec<(String, String)> {
    let Some(map) = headers.as_object() else {
        return Vec::new();
    };
    map.iter()
        .map(|(name, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (name.clone(), value)
        })
        .collect()
}
