use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by {domain} (retry after {retry_after_secs}s)")]
    RateLimited {
        domain: String,
        retry_after_secs: u64,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid captured URL \"{url}\": {reason}")]
    InvalidCapturedUrl { url: String, reason: String },

    #[error("invalid search URL \"{url}\": {reason}")]
    InvalidSearchUrl { url: String, reason: String },

    #[error("browser error during {context}: {reason}")]
    Browser { context: String, reason: String },

    #[error("navigation to {url} timed out after {timeout_secs}s")]
    NavigationTimeout { url: String, timeout_secs: u64 },

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },
}

/// Coarse category of a fatal scrape failure, used by callers to tell
/// failures apart without matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Navigation,
    Transport,
    Parse,
    Browser,
}

impl FailureKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Navigation => "navigation_failed",
            FailureKind::Transport => "transport_failure",
            FailureKind::Parse => "parse_failure",
            FailureKind::Browser => "browser_failure",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ScraperError {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            ScraperError::Http(_)
            | ScraperError::RateLimited { .. }
            | ScraperError::UnexpectedStatus { .. }
            | ScraperError::InvalidCapturedUrl { .. } => FailureKind::Transport,
            ScraperError::Deserialize { .. } => FailureKind::Parse,
            ScraperError::NavigationTimeout { .. }
            | ScraperError::Navigation { .. }
            | ScraperError::InvalidSearchUrl { .. } => FailureKind::Navigation,
            ScraperError::Browser { .. } => FailureKind::Browser,
        }
    }

    pub(crate) fn browser(context: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        ScraperError::Browser {
            context: context.into(),
            reason: reason.to_string(),
        }
    }
}
