//! # Request Throttling
//!
//! One token bucket shared by every client, refilled at
//! `server.rate_limit` requests per second. A rate of `0` means no limiter
//! is installed at all.

use super::types::ErrorResponse;
use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Server-wide limiter handed to [`throttle`] as router state.
pub type SharedLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Limiter allowing `requests_per_second`, with a burst of the same size.
pub fn limiter_for(requests_per_second: u32) -> Option<SharedLimiter> {
    NonZeroU32::new(requests_per_second)
        .map(|rps| Arc::new(RateLimiter::direct(Quota::per_second(rps))))
}

/// Reject with `429 {error, kind: "rate_limited"}` once the bucket is empty.
pub async fn throttle(
    State(limiter): State<SharedLimiter>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if limiter.check().is_ok() {
        return next.run(request).await;
    }

    tracing::warn!(
        event = "rate_limited",
        path = %request.uri().path(),
        "Request throttled"
    );
    let body = ErrorResponse {
        error: "too many requests".to_string(),
        kind: "rate_limited".to_string(),
    };
    (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response()
}
