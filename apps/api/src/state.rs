use std::sync::Arc;

use crate::config::Config;
use crate::contact::mailer::EmailSender;
use crate::contact::rate_limit::RateLimitStore;
use crate::content::ContentStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub content: ContentStore,
    /// Contact form counters. In-process by default, Redis when `REDIS_URL` is set.
    pub rate_limiter: Arc<dyn RateLimitStore>,
    /// `None` when no provider API key is configured.
    pub mailer: Option<Arc<dyn EmailSender>>,
}
