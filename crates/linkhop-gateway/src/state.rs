use std::sync::Arc;
use std::time::Duration;

use linkhop_core::{Shortener, VisitRepository};
use linkhop_redirector::Redirector;

/// Upper bound on the visit insert that follows a redirect.
pub const DEFAULT_ANALYTICS_TIMEOUT: Duration = Duration::from_millis(300);

#[derive(Clone)]
pub struct AppState {
    shortener: Arc<dyn Shortener>,
    redirector: Arc<dyn Redirector>,
    visits: Arc<dyn VisitRepository>,
    analytics_timeout: Duration,
}

impl AppState {
    pub fn new(
        shortener: Arc<dyn Shortener>,
        redirector: Arc<dyn Redirector>,
        visits: Arc<dyn VisitRepository>,
    ) -> Self {
        Self {
            shortener,
            redirector,
            visits,
            analytics_timeout: DEFAULT_ANALYTICS_TIMEOUT,
        }
    }

    pub fn with_analytics_timeout(mut self, timeout: Duration) -> Self {
        self.analytics_timeout = timeout;
        self
    }

    pub fn shortener(&self) -> &dyn Shortener {
        self.shortener.as_ref()
    }

    pub fn redirector(&self) -> &dyn Redirector {
        self.redirector.as_ref()
    }

    pub fn visits(&self) -> &dyn VisitRepository {
        self.visits.as_ref()
    }

    pub fn analytics_timeout(&self) -> Duration {
        self.analytics_timeout
    }
}
