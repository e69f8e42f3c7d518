//! Axum route handlers for the Comparison API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::cache::CacheStats;
use crate::comparison::models::{ComparisonRequest, ComparisonResult};
use crate::errors::AppError;
use crate::rate_limiter::RateLimitStats;
use crate::state::AppState;

/// POST /api/v1/compare
///
/// Validates the request, then returns a comparison. Provider failures never
/// surface here; they come back as a fallback result.
pub async fn handle_compare(
    State(state): State<AppState>,
    payload: Result<Json<ComparisonRequest>, JsonRejection>,
) -> Result<Json<ComparisonResult>, AppError> {
    let Json(request) = payload?;
    request.validate()?;

    let result = state.comparer.compare(&request).await;

    Ok(Json(result))
}

/// GET /api/v1/stats/rate-limit
pub async fn handle_rate_limit_stats(State(state): State<AppState>) -> Json<RateLimitStats> {
    Json(state.limiter.get_stats())
}

/// GET /api/v1/stats/cache
pub async fn handle_cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.stats())
}

#[derive(Debug, Serialize)]
pub struct ClearCacheResponse {
    pub cleared: usize,
}

/// DELETE /api/v1/cache
///
/// Drops every cached comparison, e.g. after rotating the provider key.
pub async fn handle_clear_cache(State(state): State<AppState>) -> Json<ClearCacheResponse> {
    let cleared = state.cache.size();
    state.cache.clear();
    info!("Cleared {cleared} cached comparisons");
    Json(ClearCacheResponse { cleared })
}
