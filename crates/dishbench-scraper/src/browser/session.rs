use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::error::ScraperError;

/// A browser that must be shut down once work on it is done.
#[async_trait]
pub trait BrowserSession: Send {
    /// Shuts the browser down. Called exactly once by [`with_session`].
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Browser`] when the browser does not close
    /// cleanly.
    async fn close(&mut self) -> Result<(), ScraperError>;
}

/// Runs `work` against `session` and closes the session afterwards,
/// whether `work` succeeded or not.
///
/// A close failure is logged at `warn` and never replaces the result of
/// `work`.
///
/// # Errors
///
/// Returns whatever error `work` produced.
pub async fn with_session<S, T, F>(mut session: S, work: F) -> Result<T, ScraperError>
where
    S: BrowserSession,
    F: for<'s> FnOnce(&'s mut S) -> BoxFuture<'s, Result<T, ScraperError>>,
{
    let result = work(&mut session).await;
    if let Err(err) = session.close().await {
        tracing::warn!(error = %err, "failed to close browser session");
    }
    result
}
