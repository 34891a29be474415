use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::AppState;

const MAX_REQUESTS: u32 = 5;
const WINDOW_SECS: u64 = 60;

/// Fixed-window counters keyed by client. Single-process only.
#[derive(Clone, Default)]
pub struct RateLimitState {
    windows: Arc<Mutex<HashMap<String, Window>>>,
}

struct Window {
    count: u32,
    started: Instant,
}

impl RateLimitState {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Ok(remaining)` while under the limit, `Err(retry_after)` once exceeded.
    pub async fn check(&self, key: &str) -> Result<u32, Duration> {
        self.check_with_limits(key, MAX_REQUESTS, WINDOW_SECS).await
    }

    pub async fn check_with_limits(
        &self,
        key: &str,
        max_requests: u32,
        window_secs: u64,
    ) -> Result<u32, Duration> {
        let mut windows = self.windows.lock().await;
        let now = Instant::now();
        let span = Duration::from_secs(window_secs);

        // Drop stale windows so the map stays bounded by active clients.
        windows.retain(|_, w| now.duration_since(w.started) <= span * 2);

        let window = windows.entry(key.to_string()).or_insert(Window {
            count: 0,
            started: now,
        });

        if now.duration_since(window.started) > span {
            window.count = 0;
            window.started = now;
        }

        if window.count >= max_requests {
            return Err(span.saturating_sub(now.duration_since(window.started)));
        }

        window.count += 1;
        Ok(max_requests - window.count)
    }
}

/// Limits signup/login attempts per client IP and path.
pub async fn rate_limit_auth(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = addr.ip().to_string();
    let path = req.uri().path().to_string();
    let key = format!("{}:{}", ip, path);

    match state.rate_limiter.check(&key).await {
        Ok(remaining) => {
            tracing::debug!(ip = %ip, path = %path, remaining, "Rate limit check passed");
            Ok(next.run(req).await)
        }
        Err(retry_after) => {
            tracing::warn!(
                ip = %ip,
                path = %path,
                retry_after_secs = retry_after.as_secs(),
                "Rate limit exceeded"
            );
            Err(AppError::RateLimited)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_allows_under_limit() {
        let limiter = RateLimitState::new();
        for i in 0..MAX_REQUESTS {
            let result = limiter.check("1.2.3.4:/api/auth/login").await;
            assert_eq!(result, Ok(MAX_REQUESTS - i - 1));
        }
    }

    #[tokio::test]
    async fn test_blocks_over_limit() {
        let limiter = RateLimitState::new();
        for _ in 0..MAX_REQUESTS {
            let _ = limiter.check("k").await;
        }
        assert!(limiter.check("k").await.is_err());
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let limiter = RateLimitState::new();
        for _ in 0..MAX_REQUESTS {
            let _ = limiter.check("1.2.3.4:/api/auth/login").await;
        }
        assert!(limiter.check("1.2.3.4:/api/auth/signup").await.is_ok());
    }

    #[tokio::test]
    async fn test_window_resets() {
        let limiter = RateLimitState::new();
        assert!(limiter.check_with_limits("k", 1, 0).await.is_ok());
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(limiter.check_with_limits("k", 1, 0).await.is_ok());
    }
}
