//! # stemslot HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `POST /names` - Plan filenames for a batch (no writes)
//! - `POST /classify` - Classify/filter a planned batch
//! - `POST /scan` - Directory Index of a target directory
//!
//! ## Access control
//!
//! - `STEMSLOT_API_KEY`: bearer key required on everything but `/health`
//! - `STEMSLOT_CORS_ORIGINS`: browser origins, comma-separated or `*`;
//!   unset means the local dev ports only
//! - `server.rate_limit` (config): shared requests-per-second budget
//! - `output` / `subfolder` in a request never leave `output_root`

mod auth;
mod handlers;
mod limit;
mod types;

pub use auth::{API_KEY_ENV, get_api_key_from_env};
pub use handlers::{
    ApiError, classify_handler, health_handler, names_handler, scan_handler, status_for,
};
pub use limit::{SharedLimiter, limiter_for};
pub use types::{
    ClassifyRequest, ClassifyResponse, ErrorResponse, HealthResponse, NamesRequest,
    NamesResponse, OneOrMany, ScanResponse, TargetJson,
};

use crate::config::Config;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use std::sync::Arc;
use stemslot_core::StemslotError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Environment variable holding the allowed CORS origins.
pub const CORS_ORIGINS_ENV: &str = "STEMSLOT_CORS_ORIGINS";

/// Origins trusted when `STEMSLOT_CORS_ORIGINS` is unset or unusable.
const LOCAL_ORIGINS: [&str; 4] = [
    "http://localhost:3000",
    "http://localhost:8080",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:8080",
];

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state.
///
/// Requests carry no cross-request naming state; each one builds its own
/// name cache over a fresh directory listing.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new app state from a loaded config.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

// =============================================================================
// CORS
// =============================================================================

/// Header values for a comma-separated origin list; blanks and unparsable
/// entries are dropped with a warning.
fn parse_origins(list: &str) -> Vec<HeaderValue> {
    list.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin, "Ignoring CORS origin: {}", e);
                None
            }
        })
        .collect()
}

fn cors_for(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

fn cors_layer() -> CorsLayer {
    let configured = std::env::var(CORS_ORIGINS_ENV).ok();
    if configured.as_deref().map(str::trim) == Some("*") {
        tracing::warn!("{}=* lets any site call this server", CORS_ORIGINS_ENV);
        return CorsLayer::permissive();
    }

    let origins = configured.as_deref().map(parse_origins).unwrap_or_default();
    if origins.is_empty() {
        tracing::info!(origins = ?LOCAL_ORIGINS, "CORS limited to local origins");
        return cors_for(parse_origins(&LOCAL_ORIGINS.join(",")));
    }
    tracing::info!(count = origins.len(), "CORS origins from {}", CORS_ORIGINS_ENV);
    cors_for(origins)
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Layers, outermost first: tracing, CORS, body limit, throttle (when
/// `server.rate_limit > 0`), API key check (when a key is set).
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer();

    let has_auth = get_api_key_from_env().is_some();
    if has_auth {
        tracing::info!("API key authentication enabled");
    } else {
        tracing::warn!(
            "API key authentication DISABLED - all endpoints are publicly accessible. \
             Set {} to enable authentication.",
            API_KEY_ENV
        );
    }

    let limiter = limiter_for(state.config.server.rate_limit);
    match limiter {
        Some(_) => tracing::info!(
            rate_limit = state.config.server.rate_limit,
            "Throttling requests per second"
        ),
        None => tracing::info!("Throttling disabled"),
    }

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/names", post(handlers::names_handler))
        .route("/classify", post(handlers::classify_handler))
        .route("/scan", post(handlers::scan_handler));

    if has_auth {
        router = router.layer(axum_middleware::from_fn(auth::api_key_auth_middleware));
    }

    if let Some(limiter) = limiter {
        router = router.layer(axum_middleware::from_fn_with_state(limiter, limit::throttle));
    }

    router
        .layer(axum::extract::DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(addr: &str, config: Config) -> Result<(), StemslotError> {
    let router = create_router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| StemslotError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("stemslot HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| StemslotError::IoError(format!("Server error: {}", e)))
}

// =============================================================================
// TESTS
// =============================================================================
