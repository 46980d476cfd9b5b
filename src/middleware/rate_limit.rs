//! Rate limiting middleware
//!
//! Keyed (per client IP) token-bucket limiting for the authentication routes,
//! so credential guessing from one address is throttled.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tracing::warn;
use crate::config::RateLimitConfig;
use crate::state::AppState;
use crate::utils::errors::{EventHubError, Result};

/// Per-IP rate limiter
#[derive(Clone)]
pub struct KeyedRateLimiter {
    limiter: Arc<DefaultKeyedRateLimiter<IpAddr>>,
}

impl KeyedRateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        let per_minute = NonZeroU32::new(config.requests_per_minute).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(config.burst).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_minute(per_minute).allow_burst(burst);

        Self { limiter: Arc::new(RateLimiter::keyed(quota)) }
    }

    /// Take one request from `ip`'s budget
    pub fn check(&self, ip: IpAddr) -> Result<()> {
        self.limiter.check_key(&ip).map_err(|_| {
            warn!(client_ip = %ip, "Rate limit exceeded");
            EventHubError::RateLimitExceeded
        })
    }

    /// Drop buckets of clients that have been idle long enough to be full again
    pub fn cleanup(&self) {
        self.limiter.retain_recent();
    }
}

/// Client address: first `X-Forwarded-For` hop, then `X-Real-IP`, then the socket
pub fn client_ip(headers: &HeaderMap, connect_info: Option<&ConnectInfo<SocketAddr>>) -> IpAddr {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse::<IpAddr>().ok());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<IpAddr>().ok())
    };

    forwarded
        .or_else(real_ip)
        .or_else(|| connect_info.map(|ConnectInfo(addr)| addr.ip()))
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Axum middleware applying the auth limiter
pub async fn limit_auth_requests(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let ip = client_ip(request.headers(), request.extensions().get::<ConnectInfo<SocketAddr>>());

    match state.auth_limiter.check(ip) {
        Ok(()) => next.run(request).await,
        Err(e) => e.into_response(),
    }
}
