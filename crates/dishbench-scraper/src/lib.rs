pub mod analytics;
pub mod browser;
pub mod capture;
pub mod error;
pub mod extract;
pub mod intercept;
pub mod normalize;
pub mod parse;
pub mod pipeline;
pub mod replay;
pub(crate) mod retry;
pub mod types;

pub use browser::{BrowserSettings, ChromeCapture};
pub use capture::RequestCapture;
pub use error::{FailureKind, ScraperError};
pub use normalize::{DropCounts, PartialCard};
pub use pipeline::{
    analyze_payload, DishScraper, OutcomeSummary, Pipeline, ReportSettings, ScrapeOutcome,
};
pub use replay::{ReplayClient, ReplayOverrides};
pub use types::CapturedRequest;
