//! # API Key Check
//!
//! Off unless `STEMSLOT_API_KEY` holds a non-empty key. When on, every
//! route except `/health` wants the key in `Authorization`, either as
//! `Bearer <key>` or bare; a mismatch gets `401 {error, kind: "unauthorized"}`.

use super::types::ErrorResponse;
use axum::{
    Json,
    body::Body,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "STEMSLOT_API_KEY";

/// Path served without a key.
const OPEN_PATH: &str = "/health";

/// The configured key, if any. Blank counts as unset.
pub fn get_api_key_from_env() -> Option<String> {
    std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty())
}

/// Key from the `Authorization` header, `Bearer ` prefix stripped.
fn presented_key(request: &Request<Body>) -> Option<&str> {
    let value = request.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    Some(value.strip_prefix("Bearer ").unwrap_or(value))
}

/// Equality over zero-padded copies, so the byte comparison runs the same
/// width whatever the provided length.
fn keys_match(provided: &str, expected: &str) -> bool {
    let width = provided.len().max(expected.len());
    let padded = |key: &str| {
        let mut bytes = key.as_bytes().to_vec();
        bytes.resize(width, 0);
        bytes
    };
    let same_bytes: bool = padded(provided).ct_eq(&padded(expected)).into();
    same_bytes && provided.len() == expected.len()
}

fn unauthorized(reason: &'static str) -> Response {
    tracing::warn!(event = "auth_failure", reason, "Rejected request without a valid API key");
    let body = ErrorResponse {
        error: "missing or invalid API key".to_string(),
        kind: "unauthorized".to_string(),
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

/// Middleware enforcing [`API_KEY_ENV`] on every route but `/health`.
pub async fn api_key_auth_middleware(request: Request<Body>, next: Next) -> Response {
    let Some(expected) = get_api_key_from_env() else {
        return next.run(request).await;
    };
    if request.uri().path() == OPEN_PATH {
        return next.run(request).await;
    }

    match presented_key(&request) {
        Some(key) if keys_match(key, &expected) => next.run(request).await,
        Some(_) => unauthorized("invalid_api_key"),
        None => unauthorized("missing_authorization_header"),
    }
}

// =============================================================================
// TESTS
// =============================================================================
