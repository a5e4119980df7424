use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Search page URL with a `{query}` placeholder for the encoded dish name.
    pub search_url_template: String,
    /// Substring identifying the internal search API request on the page.
    pub api_marker: String,
    pub browser_headless: bool,
    pub browser_no_sandbox: bool,
    pub chrome_path: Option<PathBuf>,
    pub navigation_timeout_secs: u64,
    pub idle_window_ms: u64,
    pub idle_max_inflight: usize,
    pub replay_timeout_secs: u64,
    pub replay_user_agent: String,
    pub replay_max_retries: u32,
    pub replay_backoff_base_secs: u64,
    /// Prefix joined with a card's `imageId` to build its CDN URL.
    pub image_cdn_base: String,
    pub top_n: usize,
    pub rate_limit_per_minute: usize,
}
