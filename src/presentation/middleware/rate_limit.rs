//! Rate Limiting Middleware
//!
//! Redis-based distributed rate limiting using a sliding window. The
//! shoutbox gets its own relaxed bucket because clients poll it every few
//! seconds; auth endpoints get a strict one.

use std::net::IpAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};

use crate::presentation::middleware::auth::AuthUser;
use crate::shared::error::ErrorResponse;
use crate::startup::AppState;

/// Configuration for rate limiting behavior.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Requests allowed per window
    pub requests_per_window: u32,
    /// Window duration in seconds
    pub window_seconds: u64,
    /// Optional burst allowance above base limit
    pub burst_allowance: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_window: 60,
            window_seconds: 60,
            burst_allowance: 10,
        }
    }
}

/// Predefined rate limit configurations per endpoint group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointType {
    /// Login, register, refresh. Strict to slow down credential stuffing.
    Auth,
    /// Standard API endpoints
    Api,
    /// Shoutbox polling; clients hit this every few seconds
    Shoutbox,
}

impl EndpointType {
    pub fn config(&self) -> RateLimitConfig {
        match self {
            EndpointType::Auth => RateLimitConfig {
                requests_per_window: 5,
                window_seconds: 60,
                burst_allowance: 2,
            },
            EndpointType::Api => RateLimitConfig {
                requests_per_window: 60,
                window_seconds: 60,
                burst_allowance: 20,
            },
            EndpointType::Shoutbox => RateLimitConfig {
                requests_per_window: 120,
                window_seconds: 60,
                burst_allowance: 30,
            },
        }
    }

    fn key_prefix(&self) -> &'static str {
        match self {
            EndpointType::Auth => "rl:auth",
            EndpointType::Api => "rl:api",
            EndpointType::Shoutbox => "rl:shout",
        }
    }
}

/// Rate limit status returned to clients.
#[derive(Debug, Serialize)]
pub struct RateLimitInfo {
    pub limit: u32,
    pub remaining: u32,
    /// Unix timestamp when the window resets
    pub reset_at: i64,
    pub retry_after: u64,
}

#[derive(Debug, Serialize)]
struct RateLimitExceededResponse {
    #[serde(flatten)]
    error: ErrorResponse,
    rate_limit: RateLimitInfo,
}

/// Redis-based sliding window rate limiter.
///
/// A sorted set per identifier holds one member per request, scored by
/// millisecond timestamp. Each check prunes entries older than the window,
/// counts the remainder, and admits or rejects atomically via a Lua script.
#[derive(Clone)]
pub struct RateLimiter {
    redis: ConnectionManager,
    config: RateLimitConfig,
    endpoint_type: EndpointType,
}

impl RateLimiter {
    pub fn new(redis: ConnectionManager, endpoint_type: EndpointType) -> Self {
        Self {
            redis,
            config: endpoint_type.config(),
            endpoint_type,
        }
    }

    /// Check if a request should be allowed.
    ///
    /// Returns `Ok(RateLimitInfo)` if allowed, `Err(RateLimitInfo)` if rate limited.
    pub async fn check(&self, identifier: &str) -> Result<RateLimitInfo, RateLimitInfo> {
        let key = format!("{}:{}", self.endpoint_type.key_prefix(), identifier);
        let now_ms = chrono::Utc::now().timestamp_millis();
        let window_ms = (self.config.window_seconds * 1000) as i64;
        let window_start = now_ms - window_ms;
        let max_requests = self.config.requests_per_window + self.config.burst_allowance;

        let mut conn = self.redis.clone();

        let script = redis::Script::new(
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
                return {1, current_count + 1, max_requests}
            else
                local oldest = redis.call('ZRANGE', key, 0, 0, 'WITHSCORES')
                local retry_after = 0
                if oldest and #oldest >= 2 then
                    retry_after = oldest[2] + (window_seconds * 1000) - now_ms
                end
                return {0, current_count, max_requests, retry_after}
            end
            "#,
        );

        let result: Vec<i64> = script
            .key(&key)
            .arg(now_ms)
            .arg(window_start)
            .arg(max_requests as i64)
            .arg(self.config.window_seconds as i64)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| {
                tracing::error!("Rate limiter Redis error: {}", e);
                // Fail open; a Redis outage must not take the API down with it
                RateLimitInfo {
                    limit: max_requests,
                    remaining: 1,
                    reset_at: (now_ms / 1000) + self.config.window_seconds as i64,
                    retry_after: 0,
                }
            })?;

        let allowed = result[0] == 1;
        let current_count = result[1] as u32;
        let remaining = max_requests.saturating_sub(current_count);
        let reset_at = (now_ms / 1000) + self.config.window_seconds as i64;

        let info = RateLimitInfo {
            limit: max_requests,
            remaining,
            reset_at,
            retry_after: if allowed {
                0
            } else {
                let retry_ms = result.get(3).copied().unwrap_or(0);
                ((retry_ms as f64) / 1000.0).ceil() as u64
            },
        };

        if allowed {
            Ok(info)
        } else {
            Err(info)
        }
    }
}

/// Extract the rate limit identifier from a request.
///
/// Authenticated user id first, then forwarded client IP, then the
/// connection IP.
fn extract_identifier(request: &Request, client_ip: Option<IpAddr>) -> String {
    if let Some(auth_user) = request.extensions().get::<AuthUser>() {
        return format!("user:{}", auth_user.user_id);
    }

    if let Some(forwarded_for) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
    {
        if let Some(first_ip) = forwarded_for.split(',').next() {
            let ip = first_ip.trim();
            if ip.parse::<IpAddr>().is_ok() {
                return format!("ip:{}", ip);
            }
        }
    }

    if let Some(real_ip) = request
        .headers()
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
    {
        if real_ip.parse::<IpAddr>().is_ok() {
            return format!("ip:{}", real_ip);
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

/// Rate limiting middleware for authentication endpoints.
pub async fn rate_limit_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    rate_limit_inner(state, request, next, EndpointType::Auth).await
}

/// Rate limiting middleware for standard API endpoints.
pub async fn rate_limit_api(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    rate_limit_inner(state, request, next, EndpointType::Api).await
}

/// Rate limiting middleware for shoutbox polling.
pub async fn rate_limit_shoutbox(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    rate_limit_inner(state, request, next, EndpointType::Shoutbox).await
}

async fn rate_limit_inner(
    state: AppState,
    request: Request,
    next: Next,
    endpoint_type: EndpointType,
) -> Response {
    // ConnectInfo lives in the request extensions when the server is
    // started with into_make_service_with_connect_info; absent in tests.
    let client_ip = request
        .extensions()
        .get::<ConnectInfo<std::net::SocketAddr>>()
        .map(|ci| ci.0.ip());
    let identifier = extract_identifier(&request, client_ip);

    let limiter = RateLimiter::new(state.redis.clone(), endpoint_type);

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

fn add_rate_limit_headers(headers: &mut header::HeaderMap, info: &RateLimitInfo) {
    if let Ok(v) = header::HeaderValue::from_str(&info.limit.to_string()) {
        headers.insert("X-RateLimit-Limit", v);
    }
    if let Ok(v) = header::HeaderValue::from_str(&info.remaining.to_string()) {
        headers.insert("X-RateLimit-Remaining", v);
    }
    if let Ok(v) = header::HeaderValue::from_str(&info.reset_at.to_string()) {
        headers.insert("X-RateLimit-Reset", v);
    }
}

fn create_rate_limit_response(info: RateLimitInfo) -> Response {
    let body = RateLimitExceededResponse {
        error: ErrorResponse {
            code: 10006,
            message: "You are being rate limited. Please slow down.".to_string(),
            errors: None,
        },
        rate_limit: RateLimitInfo {
            limit: info.limit,
            remaining: 0,
            reset_at: info.reset_at,
            retry_after: info.retry_after,
        },
    };

    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();

    if let Ok(v) = header::HeaderValue::from_str(&info.retry_after.to_string()) {
        response.headers_mut().insert(header::RETRY_AFTER, v);
    }

    add_rate_limit_headers(
        response.headers_mut(),
        &RateLimitInfo {
            limit: info.limit,
            remaining: 0,
            reset_at: info.reset_at,
            retry_after: info.retry_after,
        },
    );

    response
}
