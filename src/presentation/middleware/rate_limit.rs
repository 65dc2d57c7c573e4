//! Rate Limiting Middleware
//!
//! Redis-based distributed rate limiting using a sliding window. When rate
//! limiting is disabled there is no Redis connection and every request
//! passes through. Redis failures let the request through and are logged.

use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use once_cell::sync::Lazy;
use redis::aio::ConnectionManager;
use serde::Serialize;

use crate::config::RateLimitSettings;
use crate::infrastructure::cache::keys;
use crate::presentation::middleware::auth::AuthUser;
use crate::shared::error::ErrorResponse;
use crate::startup::AppState;

/// Sliding window over a sorted set scored by request time in milliseconds.
///
/// Returns `{allowed, count, max, retry_after_ms}`.
static SLIDING_WINDOW: Lazy<redis::Script> = Lazy::new(|| {
    redis::Script::new(
        r#"
        local key = KEYS[1]
        local now_ms = tonumber(ARGV[1])
        local window_start = tonumber(ARGV[2])
        local max_requests = tonumber(ARGV[3])
        local window_seconds = tonumber(ARGV[4])

        redis.call('ZREMRANGEBYSCORE', key, '-inf', window_start)
        local current_count = redis.call('ZCARD', key)

        if current_count < max_requests then
            local member = now_ms .. ':' .. math.random(1000000)
            redis.call('ZADD', key, now_ms, member)
            redis.call('EXPIRE', key, window_seconds + 1)
            return {1, current_count + 1, max_requests, 0}
        end

        local oldest = redis.call('ZRANGE', key, 0, 0, 'WITHSCORES')
        local retry_after = 0
        if oldest and #oldest >= 2 then
            retry_after = oldest[2] + (window_seconds * 1000) - now_ms
        end
        return {0, current_count, max_requests, retry_after}
        "#,
    )
});

/// Window size used for every bucket
const WINDOW_SECONDS: u64 = 60;

/// Limits for one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests allowed per window
    pub requests_per_window: u32,
    /// Window duration in seconds
    pub window_seconds: u64,
    /// Extra requests allowed above the base limit
    pub burst_allowance: u32,
}

impl RateLimitConfig {
    pub fn max_requests(&self) -> u32 {
        self.requests_per_window + self.burst_allowance
    }
}

/// Route groups with their own buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointType {
    /// Signup and login. Strict to slow down credential stuffing.
    Auth,
    /// Authenticated API routes, sized from settings
    Api,
    /// Gateway upgrades
    WebSocket,
}

impl EndpointType {
    pub fn config(&self, settings: &RateLimitSettings) -> RateLimitConfig {
        match self {
            EndpointType::Auth => RateLimitConfig {
                requests_per_window: 5,
                window_seconds: WINDOW_SECONDS,
                burst_allowance: 2,
            },
            EndpointType::Api => RateLimitConfig {
                requests_per_window: (settings.requests_per_second * WINDOW_SECONDS as f64) as u32,
                window_seconds: WINDOW_SECONDS,
                burst_allowance: settings.burst_size,
            },
            EndpointType::WebSocket => RateLimitConfig {
                requests_per_window: 10,
                window_seconds: WINDOW_SECONDS,
                burst_allowance: 5,
            },
        }
    }

    fn bucket(&self) -> &'static str {
        match self {
            EndpointType::Auth => "auth",
            EndpointType::Api => "api",
            EndpointType::WebSocket => "ws",
        }
    }
}

/// Rate limit state reported to clients.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RateLimitInfo {
    pub limit: u32,
    pub remaining: u32,
    /// Unix timestamp when the window resets
    pub reset_at: i64,
    /// Seconds until another request would be accepted
    pub retry_after: u64,
}

#[derive(Debug, Serialize)]
struct RateLimitExceededResponse {
    #[serde(flatten)]
    error: ErrorResponse,
    rate_limit: RateLimitInfo,
}

/// Redis sliding-window rate limiter for one bucket.
#[derive(Clone)]
pub struct RateLimiter {
    redis: ConnectionManager,
    config: RateLimitConfig,
    endpoint_type: EndpointType,
}

impl RateLimiter {
    pub fn new(redis: ConnectionManager, endpoint_type: EndpointType, config: RateLimitConfig) -> Self {
        Self {
            redis,
            config,
            endpoint_type,
        }
    }

    /// Count a request against `identifier`.
    ///
    /// `Ok` when the request may proceed, `Err` when the bucket is full.
    pub async fn check(&self, identifier: &str) -> Result<RateLimitInfo, RateLimitInfo> {
        let key = keys::rate_limit(self.endpoint_type.bucket(), identifier);
        let now_ms = chrono::Utc::now().timestamp_millis();
        let window_ms = (self.config.window_seconds * 1000) as i64;
        let max_requests = self.config.max_requests();
        let reset_at = (now_ms / 1000) + self.config.window_seconds as i64;

        let mut conn = self.redis.clone();
        let result: Vec<i64> = match SLIDING_WINDOW
            .key(&key)
            .arg(now_ms)
            .arg(now_ms - window_ms)
            .arg(max_requests as i64)
            .arg(self.config.window_seconds as i64)
            .invoke_async(&mut conn)
            .await
        {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, key = %key, "Rate limiter Redis error, allowing request");
                return Ok(RateLimitInfo {
                    limit: max_requests,
                    remaining: max_requests,
                    reset_at,
                    retry_after: 0,
                });
            }
        };

        let allowed = result.first().copied() == Some(1);
        let current_count = result.get(1).copied().unwrap_or(0).max(0) as u32;
        let retry_ms = result.get(3).copied().unwrap_or(0).max(0);

        let info = RateLimitInfo {
            limit: max_requests,
            remaining: max_requests.saturating_sub(current_count),
            reset_at,
            retry_after: if allowed {
                0
            } else {
                (retry_ms as u64).div_ceil(1000)
            },
        };

        if allowed {
            Ok(info)
        } else {
            Err(info)
        }
    }
}

/// Identify the client a request is counted against.
///
/// Authenticated user first, then proxy headers, then the peer address.
fn extract_identifier(request: &Request, client_ip: Option<IpAddr>) -> String {
    if let Some(auth_user) = request.extensions().get::<AuthUser>() {
        return format!("user:{}", auth_user.user_id);
    }

    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim);
    let real_ip = request
        .headers()
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .map(str::trim);

    for candidate in [forwarded, real_ip].into_iter().flatten() {
        if let Ok(ip) = candidate.parse::<IpAddr>() {
            return format!("ip:{}", ip);
        }
    }

    match client_ip {
        Some(ip) => format!("ip:{}", ip),
        None => {
            tracing::warn!("Could not determine client identifier for rate limiting");
            "ip:unknown".to_string()
        }
    }
}

/// Rate limiting for signup and login.
pub async fn rate_limit_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    rate_limit_inner(state, request, next, EndpointType::Auth).await
}

/// Rate limiting for authenticated API routes.
pub async fn rate_limit_api(State(state): State<AppState>, request: Request, next: Next) -> Response {
    rate_limit_inner(state, request, next, EndpointType::Api).await
}

/// Rate limiting for gateway upgrades.
pub async fn rate_limit_websocket(State(state): State<AppState>, request: Request, next: Next) -> Response {
    rate_limit_inner(state, request, next, EndpointType::WebSocket).await
}

async fn rate_limit_inner(
    state: AppState,
    request: Request,
    next: Next,
    endpoint_type: EndpointType,
) -> Response {
    let Some(redis) = state.redis.clone() else {
        return next.run(request).await;
    };

    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip());
    let identifier = extract_identifier(&request, client_ip);

    let limiter = RateLimiter::new(
        redis,
        endpoint_type,
        endpoint_type.config(&state.settings.rate_limit),
    );

    match limiter.check(&identifier).await {
        Ok(info) => {
            let mut response = next.run(request).await;
            add_rate_limit_headers(response.headers_mut(), &info);
            response
        }
        Err(info) => {
            tracing::warn!(
                identifier = %identifier,
                endpoint_type = ?endpoint_type,
                "Rate limit exceeded"
            );
            create_rate_limit_response(info)
        }
    }
}

fn add_rate_limit_headers(headers: &mut HeaderMap, info: &RateLimitInfo) {
    headers.insert("x-ratelimit-limit", HeaderValue::from(info.limit));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(info.remaining));
    headers.insert("x-ratelimit-reset", HeaderValue::from(info.reset_at));
}

fn create_rate_limit_response(info: RateLimitInfo) -> Response {
    let info = RateLimitInfo { remaining: 0, ..info };
    let (_, code) = crate::shared::error::AppError::RateLimited.status_and_code();

    let body = RateLimitExceededResponse {
        error: ErrorResponse {
            code,
            message: "Too many requests. Please slow down".to_string(),
            errors: None,
        },
        rate_limit: info,
    };

    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(info.retry_after));
    add_rate_limit_headers(response.headers_mut(), &info);

    response
}
