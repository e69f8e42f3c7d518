pub mod health;

use axum::{
    http::Uri,
    middleware,
    routing::{delete, get, post},
    Router,
};

use crate::comparison::handlers;
use crate::errors::AppError;
use crate::rate_limiter::rate_limit_middleware;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}

pub fn build_router(state: AppState) -> Router {
    // Only the comparison endpoint spends provider quota, so only it is limited.
    let limited = Router::new()
        .route("/api/v1/compare", post(handlers::handle_compare))
        .route_layer(middleware::from_fn_with_state(
            state.limiter.clone(),
            rate_limit_middleware,
        ));

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/stats/rate-limit",
            get(handlers::handle_rate_limit_stats),
        )
        .route("/api/v1/stats/cache", get(handlers::handle_cache_stats))
        .route("/api/v1/cache", delete(handlers::handle_clear_cache))
        .merge(limited)
        .fallback(not_found)
        .with_state(state)
}
