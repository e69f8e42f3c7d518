mod cache;
mod comparison;
mod config;
mod errors;
mod llm_client;
mod rate_limiter;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

/// How often expired cache entries and stale rate-limit windows are swept.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Coach API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::from_config(&config)?;
    if config.openai_api_key.is_some() {
        info!("LLM client initialized (model: {})", llm.model());
    } else {
        warn!("OPENAI_API_KEY not set; comparisons will use the deterministic fallback");
    }

    info!(
        "Cache TTL {}m (fallback {}m), rate limit {} req / {}s",
        config.cache_ttl_minutes,
        config.fallback_ttl_minutes,
        config.rate_limit_max_requests,
        config.rate_limit_window_secs
    );

    let state = AppState::new(config.clone(), Arc::new(llm));
    spawn_sweeper(&state);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the dashboard origin

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Periodically drops expired cache entries and elapsed rate-limit windows.
/// Limiter keys come from request headers, so the window map must not keep
/// every key it has ever seen.
fn spawn_sweeper(state: &AppState) {
    let cache = state.cache.clone();
    let limiter = state.limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = cache.purge_expired();
            if removed > 0 {
                debug!("Swept {removed} expired cache entries");
            }
            let stale = limiter.purge_stale();
            if stale > 0 {
                debug!("Swept {stale} stale rate-limit windows");
            }
        }
    });
}
