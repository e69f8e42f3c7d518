//! Fixed-window rate limiter, exposed as Axum middleware.
//!
//! Each client key gets a counter and a window start. When a request arrives
//! after the window has elapsed the counter restarts; otherwise it increments.
//! A request that pushes the counter past the limit is rejected with 429.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::errors::AppError;

/// Header checked first when identifying a client.
pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Error)]
#[error("rate limit of {limit} requests exceeded for '{key}'")]
pub struct RateLimitExceeded {
    pub key: String,
    pub limit: u32,
    pub retry_after: Duration,
}

#[derive(Debug, Clone)]
struct RateLimitWindow {
    count: u32,
    started: Instant,
    started_at: DateTime<Utc>,
}

impl RateLimitWindow {
    fn starting_at(now: Instant) -> Self {
        Self {
            count: 0,
            started: now,
            started_at: Utc::now(),
        }
    }
}

/// Per-key view of a window.
#[derive(Debug, Clone, Serialize)]
pub struct WindowSnapshot {
    pub count: u32,
    pub window_start: DateTime<Utc>,
}

/// Snapshot returned by `get_stats`.
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitStats {
    pub max_requests: u32,
    pub window_secs: u64,
    pub tracked_keys: usize,
    pub total_requests: u64,
    pub total_rejected: u64,
    pub windows: HashMap<String, WindowSnapshot>,
}

#[derive(Debug, Default)]
struct LimiterInner {
    windows: HashMap<String, RateLimitWindow>,
    total_requests: u64,
    total_rejected: u64,
}

#[derive(Debug)]
pub struct RateLimiter {
    inner: Mutex<LimiterInner>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            inner: Mutex::new(LimiterInner::default()),
            max_requests,
            window,
        }
    }

    /// Records one request for `key`, returning the updated count.
    pub fn check(&self, key: &str) -> Result<u32, RateLimitExceeded> {
        let now = Instant::now();
        let mut guard = self.lock();
        let inner = &mut *guard;
        inner.total_requests += 1;

        let window = inner
            .windows
            .entry(key.to_string())
            .or_insert_with(|| RateLimitWindow::starting_at(now));

        if now.duration_since(window.started) >= self.window {
            *window = RateLimitWindow::starting_at(now);
        }
        window.count += 1;

        if window.count > self.max_requests {
            let retry_after = self.window.saturating_sub(now.duration_since(window.started));
            inner.total_rejected += 1;
            return Err(RateLimitExceeded {
                key: key.to_string(),
                limit: self.max_requests,
                retry_after,
            });
        }

        Ok(window.count)
    }

    /// Drops windows whose period has fully elapsed and returns how many were
    /// removed. A later request from the same key simply opens a new window.
    pub fn purge_stale(&self) -> usize {
        let now = Instant::now();
        let mut inner = self.lock();
        let before = inner.windows.len();
        inner
            .windows
            .retain(|_, w| now.duration_since(w.started) < self.window);
        before - inner.windows.len()
    }

    /// Returns a snapshot of all tracked windows. Does not reset or prune anything.
    pub fn get_stats(&self) -> RateLimitStats {
        let inner = self.lock();
        RateLimitStats {
            max_requests: self.max_requests,
            window_secs: self.window.as_secs(),
            tracked_keys: inner.windows.len(),
            total_requests: inner.total_requests,
            total_rejected: inner.total_rejected,
            windows: inner
                .windows
                .iter()
                .map(|(key, w)| {
                    (
                        key.clone(),
                        WindowSnapshot {
                            count: w.count,
                            window_start: w.started_at,
                        },
                    )
                })
                .collect(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LimiterInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Middleware that counts the request against its client key and rejects it
/// with 429 once the window quota is spent. Rejected requests never reach
/// the inner handler.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = client_key(&request);

    match limiter.check(&key) {
        Ok(count) => {
            debug!(client = %key, count, "Request admitted");
            Ok(next.run(request).await)
        }
        Err(e) => {
            warn!(client = %key, limit = e.limit, "Rate limit exceeded");
            Err(e.into())
        }
    }
}

/// Identifies the caller: API key header, then the first forwarded hop,
/// then the peer address.
fn client_key(request: &Request) -> String {
    let headers = request.headers();

    if let Some(api_key) = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
    {
        return format!("key:{api_key}");
    }

    if let Some(ip) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return format!("ip:{ip}");
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| format!("ip:{}", addr.ip()))
        .unwrap_or_else(|| "anonymous".to_string())
}
