//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! Every engine error maps to a status by kind:
//! `400` validation, `409` capacity_exceeded / all_filtered, `500` io.

use super::{
    AppState,
    types::{
        ClassifyRequest, ClassifyResponse, ErrorResponse, HealthResponse, NamesRequest,
        NamesResponse, ScanResponse, TargetJson,
    },
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::path::PathBuf;
use stemslot_core::{Classifier, DirectoryIndex, NameCache, StemslotError, next_name};

// =============================================================================
// ERROR MAPPING
// =============================================================================

/// Engine error rendered as `{error, kind}` with a kind-specific status.
#[derive(Debug)]
pub struct ApiError(pub StemslotError);

impl From<StemslotError> for ApiError {
    fn from(e: StemslotError) -> Self {
        Self(e)
    }
}

/// HTTP status for an engine error.
pub fn status_for(e: &StemslotError) -> StatusCode {
    match e {
        StemslotError::Validation(_) => StatusCode::BAD_REQUEST,
        StemslotError::CapacityExceeded { .. } | StemslotError::AllFiltered { .. } => {
            StatusCode::CONFLICT
        }
        StemslotError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            tracing::error!(kind = self.0.kind(), "Request failed: {}", self.0);
        } else {
            tracing::debug!(kind = self.0.kind(), "Request rejected: {}", self.0);
        }
        (status, Json(ErrorResponse::from(&self.0))).into_response()
    }
}

/// The request's target directory, kept under `output_root`. Read-only
/// endpoints never create it; a missing directory reads as empty.
fn target_directory(state: &AppState, target: TargetJson) -> Result<PathBuf, StemslotError> {
    let (output, subfolder) = target.resolve()?;
    state
        .config
        .request_directory(output.as_deref(), subfolder.as_deref())
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// NAMES HANDLER
// =============================================================================

/// Plan one filename per combination. Nothing is written.
pub async fn names_handler(
    State(state): State<AppState>,
    Json(request): Json<NamesRequest>,
) -> Result<Json<NamesResponse>, ApiError> {
    let policy = state.config.collision_policy(request.on_exists.as_deref())?;
    let tags = request.tag_sequences();
    let directory = target_directory(&state, request.target)?;

    let mut cache = NameCache::new();
    let names = tags
        .iter()
        .map(|item| next_name(item, &request.ext, &directory, policy, &mut cache))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!(
        directory = %directory.display(),
        policy = %policy,
        count = names.len(),
        "Planned filenames"
    );

    Ok(Json(NamesResponse {
        directory: directory.display().to_string(),
        names,
    }))
}

// =============================================================================
// CLASSIFY HANDLER
// =============================================================================

/// Reduce a planned batch per the selection policy.
pub async fn classify_handler(
    State(state): State<AppState>,
    Json(request): Json<ClassifyRequest>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    let selection = state.config.selection_policy(request.selection.as_deref())?;
    let batch = request.to_batch()?;
    let directory = target_directory(&state, request.target)?;

    let classifier = match request.seed {
        Some(seed) => Classifier::new(selection).with_seed(seed),
        None => Classifier::new(selection),
    };
    let classification = classifier.classify(batch, &directory)?;
    tracing::info!(directory = %directory.display(), "{}", classification.summary);

    Ok(Json(ClassifyResponse {
        directory: directory.display().to_string(),
        classification,
    }))
}

// =============================================================================
// SCAN HANDLER
// =============================================================================

/// Directory Index of the target directory.
pub async fn scan_handler(
    State(state): State<AppState>,
    Json(target): Json<TargetJson>,
) -> Result<Json<ScanResponse>, ApiError> {
    let directory = target_directory(&state, target)?;
    let index = DirectoryIndex::scan(&directory);

    Ok(Json(ScanResponse {
        directory: directory.display().to_string(),
        stem_count: index.stem_count(),
        file_count: index.file_count(),
        stems: index.to_map(),
    }))
}

// =============================================================================
// TESTS
// =============================================================================
