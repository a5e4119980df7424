//! Headless Chromium driver that captures the search API request.

mod idle;
mod session;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
};
use chromiumoxide::{Browser, BrowserConfig, Page};
use dishbench_core::AppConfig;
use futures::StreamExt;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Url;
use tempfile::TempDir;
use tokio::task::JoinHandle;

pub use idle::NetworkIdle;
pub use session::{with_session, BrowserSession};

use crate::capture::RequestCapture;
use crate::error::ScraperError;
use crate::intercept::{header_pairs, RequestInterceptor};
use crate::types::CapturedRequest;

/// Characters left unescaped in the search term, matching what browsers do
/// for a URI component.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Launch and wait options for one browser session.
#[derive(Debug, Clone)]
pub struct BrowserSettings {
    pub headless: bool,
    pub no_sandbox: bool,
    pub chrome_path: Option<PathBuf>,
    pub navigation_timeout: Duration,
    pub idle_window: Duration,
    pub idle_max_inflight: usize,
}

impl BrowserSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            headless: config.browser_headless,
            no_sandbox: config.browser_no_sandbox,
            chrome_path: config.chrome_path.clone(),
            navigation_timeout: Duration::from_secs(config.navigation_timeout_secs),
            idle_window: Duration::from_millis(config.idle_window_ms),
            idle_max_inflight: config.idle_max_inflight,
        }
    }
}

/// Builds the search page URL by substituting the percent-encoded `query`
/// for `{query}` in `template`.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidSearchUrl`] if the result is not a valid URL.
pub fn search_url(template: &str, query: &str) -> Result<String, ScraperError> {
    let encoded = utf8_percent_encode(query, QUERY_COMPONENT).to_string();
    let url = template.replace("{query}", &encoded);
    Url::parse(&url).map_err(|e| ScraperError::InvalidSearchUrl {
        url: url.clone(),
        reason: e.to_string(),
    })?;
    Ok(url)
}

/// [`RequestCapture`] backed by a fresh Chromium process per call.
#[derive(Debug, Clone)]
pub struct ChromeCapture {
    settings: BrowserSettings,
    search_url_template: String,
    marker: String,
}

impl ChromeCapture {
    #[must_use]
    pub fn new(
        settings: BrowserSettings,
        search_url_template: impl Into<String>,
        marker: impl Into<String>,
    ) -> Self {
        Self {
            settings,
            search_url_template: search_url_template.into(),
            marker: marker.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            BrowserSettings::from_config(config),
            config.search_url_template.clone(),
            config.api_marker.clone(),
        )
    }
}

#[async_trait]
impl RequestCapture for ChromeCapture {
    async fn capture(&self, query: &str) -> Result<Option<CapturedRequest>, ScraperError> {
        let url = search_url(&self.search_url_template, query)?;
        tracing::info!(query, url = %url, "launching browser for search capture");

        let session = ChromeSession::launch(&self.settings).await?;
        let marker = self.marker.clone();
        let settings = self.settings.clone();

        let captured = with_session(session, move |session| {
            Box::pin(async move {
                let page = session
                    .browser
                    .new_page("about:blank")
                    .await
                    .map_err(|e| ScraperError::browser("open page", e))?;
                let timeout = settings.navigation_timeout;
                let observed =
                    tokio::time::timeout(timeout, observe_search(&page, &url, &marker, &settings))
                        .await;
                match observed {
                    Ok(result) => result,
                    Err(_) => Err(ScraperError::NavigationTimeout {
                        url,
                        timeout_secs: timeout.as_secs(),
                    }),
                }
            })
        })
        .await?;

        match &captured {
            Some(request) => tracing::info!(query, url = %request.url, "search API request captured"),
            None => tracing::info!(query, marker = %self.marker, "no search API request observed"),
        }
        Ok(captured)
    }
}

/// Navigates `page` to `url` and watches its network traffic until the page
/// has loaded and the network has gone idle.
async fn observe_search(
    page: &Page,
    url: &str,
    marker: &str,
    settings: &BrowserSettings,
) -> Result<Option<CapturedRequest>, ScraperError> {
    page.execute(EnableParams::default())
        .await
        .map_err(|e| ScraperError::browser("enable network events", e))?;

    let mut requests = page
        .event_listener::<EventRequestWillBeSent>()
        .await
        .map_err(|e| ScraperError::browser("subscribe to requests", e))?;
    let mut finished = page
        .event_listener::<EventLoadingFinished>()
        .await
        .map_err(|e| ScraperError::browser("subscribe to finished loads", e))?;
    let mut failed = page
        .event_listener::<EventLoadingFailed>()
        .await
        .map_err(|e| ScraperError::browser("subscribe to failed loads", e))?;

    let mut interceptor = RequestInterceptor::new(marker);
    let mut network = NetworkIdle::new(settings.idle_max_inflight, settings.idle_window);
    let mut ticker = tokio::time::interval(IDLE_POLL_INTERVAL);

    let navigation = page.goto(url);
    tokio::pin!(navigation);
    let mut navigating = true;

    loop {
        tokio::select! {
            result = &mut navigation, if navigating => {
                navigating = false;
                result.map_err(|e| ScraperError::Navigation {
                    url: url.to_owned(),
                    reason: e.to_string(),
                })?;
                tracing::debug!(url, inflight = network.inflight(), "page load event fired");
                network.page_loaded(Instant::now());
            }
            Some(event) = requests.next() => {
                network.request_started(event.request_id.inner(), Instant::now());
                interceptor.observe(
                    &event.request.url,
                    &event.request.method,
                    header_pairs(event.request.headers.inner()),
                );
            }
            Some(event) = finished.next() => {
                network.request_finished(event.request_id.inner(), Instant::now());
            }
            Some(event) = failed.next() => {
                network.request_finished(event.request_id.inner(), Instant::now());
            }
            _ = ticker.tick() => {
                if network.is_idle(Instant::now()) {
                    break;
                }
            }
        }
    }

    tracing::debug!(url, matches = interceptor.matches(), "network idle");
    Ok(interceptor.finish())
}

/// A launched Chromium process with its own throwaway profile directory.
struct ChromeSession {
    browser: Browser,
    handler: JoinHandle<()>,
    _profile: TempDir,
}

impl ChromeSession {
    async fn launch(settings: &BrowserSettings) -> Result<Self, ScraperError> {
        let profile = tempfile::Builder::new()
            .prefix("dishbench-chrome-")
            .tempdir()
            .map_err(|e| ScraperError::browser("create profile directory", e))?;

        let mut builder = BrowserConfig::builder()
            .user_data_dir(profile.path())
            .request_timeout(settings.navigation_timeout)
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check");
        if settings.no_sandbox {
            builder = builder.no_sandbox();
        }
        if !settings.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &settings.chrome_path {
            builder = builder.chrome_executable(path);
        }
        let config = builder
            .build()
            .map_err(|e| ScraperError::browser("configure browser", e))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScraperError::browser("launch browser", e))?;

        // The CDP connection only makes progress while the handler is polled.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            browser,
            handler,
            _profile: profile,
        })
    }
}

#[async_trait]
impl BrowserSession for ChromeSession {
    async fn close(&mut self) -> Result<(), ScraperError> {
        let closed = self.browser.close().await;
        if closed.is_ok() {
            if let Err(err) = self.browser.wait().await {
                tracing::debug!(error = %err, "browser process did not exit cleanly");
            }
        }
        self.handler.abort();
        closed
            .map(|_| ())
            .map_err(|e| ScraperError::browser("close browser", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = "https://www.swiggy.com/search?query={query}";

    #[test]
    fn search_url_encodes_query() {
        assert_eq!(
            search_url(TEMPLATE, "Chicken Biryani").unwrap(),
            "https://www.swiggy.com/search?query=Chicken%20Biryani"
        );
        assert_eq!(
            search_url(TEMPLATE, "Mac & Cheese/2").unwrap(),
            "https://www.swiggy.com/search?query=Mac%20%26%20Cheese%2F2"
        );
    }

    #[test]
    fn search_url_keeps_unreserved_characters() {
        assert_eq!(
            search_url(TEMPLATE, "kulfi-falooda_(large)").unwrap(),
            "https://www.swiggy.com/search?query=kulfi-falooda_(large)"
        );
    }

    #[test]
    fn search_url_encodes_non_ascii() {
        assert_eq!(
            search_url(TEMPLATE, "dosa\u{e9}").unwrap(),
            "https://www.swiggy.com/search?query=dosa%C3%A9"
        );
    }

    #[test]
    fn search_url_rejects_invalid_template() {
        let err = search_url("not a url {query}", "Dosa").unwrap_err();
        assert!(matches!(err, ScraperError::InvalidSearchUrl { .. }));
    }
}
