//! Per-caller fixed-window rate limiting.
//!
//! Callers are keyed by peer IP (`unknown` when the connection info is
//! missing). Counters live in memory only and reset on restart.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::Json;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use dashmap::DashMap;
use dashmap::mapref::one::RefMut;
use serde_json::json;

use kawaii_types::config::RateLimitConfig;

use crate::state::AppState;

/// Counters are pruned once this many callers are tracked by one window.
const PRUNE_THRESHOLD: usize = 4096;

/// A request rejected by one of the windows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Throttled {
    pub limit: u32,
    pub window: &'static str,
    /// Seconds until the window resets.
    pub retry_after: u64,
}

impl IntoResponse for Throttled {
    fn into_response(self) -> Response {
        let body = json!({
            "error": format!("Rate limit exceeded: {} per 1 {}", self.limit, self.window),
        });
        let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();

        let headers = response.headers_mut();
        headers.insert("X-RateLimit-Limit", HeaderValue::from(self.limit));
        headers.insert("X-RateLimit-Remaining", HeaderValue::from(0u32));
        headers.insert("Retry-After", HeaderValue::from(self.retry_after));

        response
    }
}

struct WindowCounter {
    started: Instant,
    count: u32,
}

/// One limit, e.g. 10 requests per minute, tracked per caller.
pub struct FixedWindow {
    limit: u32,
    period: Duration,
    name: &'static str,
    counters: DashMap<String, WindowCounter>,
}

impl FixedWindow {
    pub fn new(limit: u32, period: Duration, name: &'static str) -> Self {
        Self {
            limit,
            period,
            name,
            counters: DashMap::new(),
        }
    }

    pub fn per_minute(limit: u32) -> Self {
        Self::new(limit, Duration::from_secs(60), "minute")
    }

    pub fn per_hour(limit: u32) -> Self {
        Self::new(limit, Duration::from_secs(3600), "hour")
    }

    pub fn per_day(limit: u32) -> Self {
        Self::new(limit, Duration::from_secs(86_400), "day")
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Count one request from `key` at `now`. Rejected requests are not
    /// counted. Returns the remaining allowance in this window.
    pub fn check_at(&self, key: &str, now: Instant) -> Result<u32, Throttled> {
        check_all(std::slice::from_ref(self), key, now)
            .map(|state| state.map_or(0, |(_, remaining)| remaining))
    }

    /// Counter for `key`, restarted if its window has expired.
    fn counter(&self, key: &str, now: Instant) -> RefMut<'_, String, WindowCounter> {
        let mut counter = self
            .counters
            .entry(key.to_string())
            .or_insert(WindowCounter {
                started: now,
                count: 0,
            });

        if now.saturating_duration_since(counter.started) >= self.period {
            counter.started = now;
            counter.count = 0;
        }
        counter
    }

    fn throttled(&self, counter: &WindowCounter, now: Instant) -> Throttled {
        let elapsed = now.saturating_duration_since(counter.started);
        Throttled {
            limit: self.limit,
            window: self.name,
            retry_after: self.period.saturating_sub(elapsed).as_secs().max(1),
        }
    }

    /// Forget callers whose window has expired.
    fn prune(&self, now: Instant) {
        self.counters
            .retain(|_, c| now.saturating_duration_since(c.started) < self.period);
    }
}

/// All configured limits. A zero in the config disables that window.
pub struct RateLimits {
    chat: Vec<FixedWindow>,
    api: Vec<FixedWindow>,
}

impl RateLimits {
    pub fn from_config(config: &RateLimitConfig) -> Self {
        let chat = [FixedWindow::per_minute(config.chat_per_minute)]
            .into_iter()
            .filter(|w| w.limit() > 0)
            .collect();
        let api = [
            FixedWindow::per_hour(config.api_per_hour),
            FixedWindow::per_day(config.api_per_day),
        ]
        .into_iter()
        .filter(|w| w.limit() > 0)
        .collect();

        Self { chat, api }
    }

    /// Check the limits on `POST /api/chat`.
    pub fn check_chat(&self, key: &str) -> Result<Option<(u32, u32)>, Throttled> {
        check_all(&self.chat, key, Instant::now())
    }

    /// Check the default limits of the `/api` read routes.
    pub fn check_api(&self, key: &str) -> Result<Option<(u32, u32)>, Throttled> {
        check_all(&self.api, key, Instant::now())
    }
}

/// Count one request against every window, or against none of them.
///
/// Returns `(limit, remaining)` of the tightest window, if any.
fn check_all(
    windows: &[FixedWindow],
    key: &str,
    now: Instant,
) -> Result<Option<(u32, u32)>, Throttled> {
    for window in windows {
        if window.counters.len() > PRUNE_THRESHOLD {
            window.prune(now);
        }
    }

    // Counters are locked in window order and held until every window agrees.
    let mut counters: Vec<_> = windows.iter().map(|w| w.counter(key, now)).collect();

    for (window, counter) in windows.iter().zip(&counters) {
        if counter.count >= window.limit {
            return Err(window.throttled(counter, now));
        }
    }

    let mut tightest: Option<(u32, u32)> = None;
    for (window, counter) in windows.iter().zip(counters.iter_mut()) {
        counter.count += 1;
        let remaining = window.limit - counter.count;
        if tightest.is_none_or(|(_, r)| remaining < r) {
            tightest = Some((window.limit, remaining));
        }
    }
    Ok(tightest)
}

/// Caller identity: peer IP, or `unknown` when no connection info exists.
pub fn caller_key(req: &Request) -> String {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn with_headers(mut response: Response, state: Option<(u32, u32)>) -> Response {
    if let Some((limit, remaining)) = state {
        let headers = response.headers_mut();
        headers.insert("X-RateLimit-Limit", HeaderValue::from(limit));
        headers.insert("X-RateLimit-Remaining", HeaderValue::from(remaining));
    }
    response
}

/// Middleware for the `/api` routes without a limit of their own.
pub async fn api_rate_limit(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let key = caller_key(&req);
    match state.rate_limits.check_api(&key) {
        Ok(_) => next.run(req).await,
        Err(throttled) => {
            tracing::warn!(caller = %key, window = throttled.window, "api rate limit exceeded");
            throttled.into_response()
        }
    }
}

/// Middleware for `POST /api/chat`.
pub async fn chat_rate_limit(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let key = caller_key(&req);
    match state.rate_limits.check_chat(&key) {
        Ok(limit_state) => with_headers(next.run(req).await, limit_state),
        Err(throttled) => {
            tracing::warn!(caller = %key, window = throttled.window, "chat rate limit exceeded");
            throttled.into_response()
        }
    }
}
