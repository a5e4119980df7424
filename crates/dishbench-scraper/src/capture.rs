use async_trait::async_trait;

use crate::error::ScraperError;
use crate::types::CapturedRequest;

/// Source of the search API request for a query.
///
/// The live implementation drives a browser
/// ([`crate::browser::ChromeCapture`]); tests and offline tools provide
/// their own.
#[async_trait]
pub trait RequestCapture: Send + Sync {
    /// Returns the captured request, or `None` when the page never issued a
    /// matching call.
    ///
    /// # Errors
    ///
    /// Browser launch, navigation and timeout failures.
    async fn capture(&self, query: &str) -> Result<Option<CapturedRequest>, ScraperError>;
}
