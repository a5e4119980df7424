//! End-to-end scrape: capture, replay, extract, normalize, aggregate.

use async_trait::async_trait;
use dishbench_core::{AnalyticsReport, AnalyticsResult, AppConfig, DishQuery, TopCard};
use serde::Serialize;
use serde_json::Value;

use crate::analytics::{aggregate, top_rated};
use crate::browser::ChromeCapture;
use crate::capture::RequestCapture;
use crate::error::ScraperError;
use crate::extract::extract_cards;
use crate::normalize::{normalize_cards, DropCounts};
use crate::replay::{ReplayClient, ReplayOverrides};

/// Presentation options for the analytics report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSettings {
    /// Maximum number of cards in the top-rated list.
    pub top_n: usize,
    pub image_cdn_base: String,
}

impl ReportSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            top_n: config.top_n,
            image_cdn_base: config.image_cdn_base.clone(),
        }
    }
}

/// Non-fatal result of a scrape. Fatal conditions are a [`ScraperError`].
#[derive(Debug, Clone, PartialEq)]
pub enum ScrapeOutcome {
    Analyzed {
        report: AnalyticsReport,
        drops: DropCounts,
    },
    /// The search page never issued a request matching the API marker.
    NoCapture,
    /// The payload was fetched but no card survived normalization.
    NoCards { drops: DropCounts },
}

impl ScrapeOutcome {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrapeOutcome::Analyzed { .. } => "analyzed",
            ScrapeOutcome::NoCapture => "no_capture",
            ScrapeOutcome::NoCards { .. } => "no_cards",
        }
    }

    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            ScrapeOutcome::Analyzed { .. } => "API response retrieved successfully",
            ScrapeOutcome::NoCapture => "search API request not found",
            ScrapeOutcome::NoCards { .. } => "No valid cards found to process",
        }
    }

    #[must_use]
    pub fn report(&self) -> Option<&AnalyticsReport> {
        match self {
            ScrapeOutcome::Analyzed { report, .. } => Some(report),
            _ => None,
        }
    }

    /// Drop counters, or all zeros when nothing was normalized.
    #[must_use]
    pub fn drops(&self) -> DropCounts {
        match self {
            ScrapeOutcome::Analyzed { drops, .. } | ScrapeOutcome::NoCards { drops } => *drops,
            ScrapeOutcome::NoCapture => DropCounts::default(),
        }
    }
}

/// Flat, serializable view of a [`ScrapeOutcome`], shared by the HTTP and
/// command-line front ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeSummary {
    pub outcome: &'static str,
    pub message: &'static str,
    pub analytics: Option<AnalyticsResult>,
    pub cards: Vec<TopCard>,
    pub dropped: DropCounts,
}

impl From<ScrapeOutcome> for OutcomeSummary {
    fn from(outcome: ScrapeOutcome) -> Self {
        let (name, message, dropped) = (outcome.as_str(), outcome.message(), outcome.drops());
        let (analytics, cards) = match outcome {
            ScrapeOutcome::Analyzed { report, .. } => (Some(report.analytics), report.cards),
            ScrapeOutcome::NoCapture | ScrapeOutcome::NoCards { .. } => (None, Vec::new()),
        };
        Self {
            outcome: name,
            message,
            analytics,
            cards,
            dropped,
        }
    }
}

/// Runs extraction, normalization and analytics over a search API payload.
///
/// Pure and synchronous; used by the live pipeline and for saved payloads.
#[must_use]
pub fn analyze_payload(payload: &Value, settings: &ReportSettings) -> ScrapeOutcome {
    let extraction = extract_cards(payload);
    let batch = normalize_cards(extraction.cards);

    let Some(analytics) = aggregate(&batch.cards) else {
        tracing::info!(
            strategy = extraction.strategy.unwrap_or("none"),
            raw = extraction.cards.len(),
            dropped = batch.drops.total(),
            "no cards left after normalization"
        );
        return ScrapeOutcome::NoCards { drops: batch.drops };
    };

    let cards = top_rated(&batch.cards, settings.top_n, &settings.image_cdn_base);
    tracing::info!(
        kept = batch.cards.len(),
        dropped = batch.drops.total(),
        avg_price = analytics.avg_price,
        "payload analyzed"
    );
    ScrapeOutcome::Analyzed {
        report: AnalyticsReport { analytics, cards },
        drops: batch.drops,
    }
}

/// Anything that can turn a [`DishQuery`] into a [`ScrapeOutcome`].
#[async_trait]
pub trait DishScraper: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`ScraperError`] for navigation, browser, transport and
    /// parse failures.
    async fn scrape(&self, query: &DishQuery) -> Result<ScrapeOutcome, ScraperError>;
}

/// The live pipeline over a [`RequestCapture`] source.
pub struct Pipeline<C> {
    capture: C,
    replay: ReplayClient,
    report: ReportSettings,
}

impl<C: RequestCapture> Pipeline<C> {
    pub fn new(capture: C, replay: ReplayClient, report: ReportSettings) -> Self {
        Self {
            capture,
            replay,
            report,
        }
    }

    /// Captures the search API request for `query.item`, replays it with the
    /// query's coordinates and analyzes the response.
    ///
    /// # Errors
    ///
    /// See [`DishScraper::scrape`].
    pub async fn run(&self, query: &DishQuery) -> Result<ScrapeOutcome, ScraperError> {
        let Some(captured) = self.capture.capture(&query.item).await? else {
            tracing::info!(item = %query.item, "skipping replay: nothing captured");
            return Ok(ScrapeOutcome::NoCapture);
        };

        let overrides = ReplayOverrides {
            latitude: query.latitude,
            longitude: query.longitude,
            search: &query.item,
        };
        let payload = self.replay.replay(&captured, &overrides).await?;
        Ok(analyze_payload(&payload, &self.report))
    }
}

impl Pipeline<ChromeCapture> {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the replay client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        Ok(Self::new(
            ChromeCapture::from_config(config),
            ReplayClient::from_config(config)?,
            ReportSettings::from_config(config),
        ))
    }
}

#[async_trait]
impl<C: RequestCapture> DishScraper for Pipeline<C> {
    async fn scrape(&self, query: &DishQuery) -> Result<ScrapeOutcome, ScraperError> {
        self.run(query).await
    }
}
