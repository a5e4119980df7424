use std::collections::HashSet;
use std::time::{Duration, Instant};

/// Tracks in-flight requests to decide when a page has settled.
///
/// The page counts as idle once its load event has fired and no more than
/// `max_inflight` requests have been outstanding for a full `window`.
#[derive(Debug)]
pub struct NetworkIdle {
    inflight: HashSet<String>,
    max_inflight: usize,
    window: Duration,
    loaded: bool,
    quiet_since: Option<Instant>,
}

impl NetworkIdle {
    #[must_use]
    pub fn new(max_inflight: usize, window: Duration) -> Self {
        Self {
            inflight: HashSet::new(),
            max_inflight,
            window,
            loaded: false,
            quiet_since: None,
        }
    }

    pub fn request_started(&mut self, request_id: &str, now: Instant) {
        self.inflight.insert(request_id.to_owned());
        self.refresh(now);
    }

    /// Marks a request as done, whether it finished or failed. Unknown ids
    /// are ignored.
    pub fn request_finished(&mut self, request_id: &str, now: Instant) {
        self.inflight.remove(request_id);
        self.refresh(now);
    }

    /// Records the page load event. The quiet window restarts here.
    pub fn page_loaded(&mut self, now: Instant) {
        self.loaded = true;
        self.quiet_since = None;
        self.refresh(now);
    }

    #[must_use]
    pub fn inflight(&self) -> usize {
        self.inflight.len()
    }

    #[must_use]
    pub fn is_idle(&self, now: Instant) -> bool {
        self.loaded
            && self
                .quiet_since
                .is_some_and(|since| now.saturating_duration_since(since) >= self.window)
    }

    fn refresh(&mut self, now: Instant) {
        if self.inflight.len() > self.max_inflight {
            self.quiet_since = None;
        } else if self.quiet_since.is_none() {
            self.quiet_since = Some(now);
        }
    }
}
