use std::sync::Arc;
use std::time::Duration;

use crate::comparison::comparer::{CareerComparer, ComparisonCache};
use crate::config::Config;
use crate::llm_client::CompletionProvider;
use crate::rate_limiter::RateLimiter;

/// Shared application state injected into all route handlers via Axum extractors.
/// Cache and limiter are constructed once and shared by handle, never global.
#[derive(Clone)]
pub struct AppState {
    pub comparer: Arc<CareerComparer>,
    pub cache: Arc<ComparisonCache>,
    pub limiter: Arc<RateLimiter>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, provider: Arc<dyn CompletionProvider>) -> Self {
        let cache = Arc::new(ComparisonCache::with_ttl_minutes(config.cache_ttl_minutes));
        let limiter = Arc::new(RateLimiter::new(
            config.rate_limit_max_requests,
            Duration::from_secs(config.rate_limit_window_secs),
        ));
        let comparer = Arc::new(CareerComparer::new(
            provider,
            cache.clone(),
            Duration::from_secs(config.fallback_ttl_minutes * 60),
        ));

        Self {
            comparer,
            cache,
            limiter,
            config,
        }
    }
}
