//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.
//!
//! Host parameters arrive either as scalars or as lists (node graphs batch
//! everything); [`OneOrMany`] accepts both and the adapters below reduce
//! them to what the engine expects.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use stemslot_core::{Classification, Combination, NameOutcome, StemslotError};

// =============================================================================
// BOUNDARY NORMALIZATION
// =============================================================================

/// A value given as a scalar or as a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    /// Flatten into a list.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }

    /// Unwrap a scalar parameter.
    ///
    /// A scalar or a one-element list yields its value; an empty list yields
    /// `None`. Longer lists are a `Validation` error naming `field`.
    pub fn into_single(self, field: &str) -> Result<Option<T>, StemslotError> {
        match self {
            Self::One(value) => Ok(Some(value)),
            Self::Many(values) => {
                let len = values.len();
                let mut values = values.into_iter();
                match (values.next(), len) {
                    (first, 0 | 1) => Ok(first),
                    _ => Err(StemslotError::Validation(format!(
                        "'{}' takes a single value, got a list of {}",
                        field, len
                    ))),
                }
            }
        }
    }
}

/// Unwrap an optional scalar parameter.
fn single(value: Option<OneOrMany<String>>, field: &str) -> Result<Option<String>, StemslotError> {
    Ok(value.map(|v| v.into_single(field)).transpose()?.flatten())
}

// =============================================================================
// TARGET DIRECTORY
// =============================================================================

/// Where a request operates. Both fields fall back to the server config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetJson {
    /// Output root; blank means the configured root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OneOrMany<String>>,
    /// Subfolder under the root; absent means the configured subfolder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subfolder: Option<OneOrMany<String>>,
}

impl TargetJson {
    /// `(output, subfolder)` after scalar unwrapping.
    pub fn resolve(self) -> Result<(Option<String>, Option<String>), StemslotError> {
        Ok((
            single(self.output, "output")?,
            single(self.subfolder, "subfolder")?,
        ))
    }
}

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Body of every non-2xx engine response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    /// An engine error kind, or `rate_limited` from the throttle.
    pub kind: String,
}

impl From<&StemslotError> for ErrorResponse {
    fn from(e: &StemslotError) -> Self {
        Self {
            error: e.to_string(),
            kind: e.kind().to_string(),
        }
    }
}

// =============================================================================
// NAMES REQUEST/RESPONSE
// =============================================================================

/// Plan filenames for a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamesRequest {
    /// One tag sequence per artifact; a bare string is a one-tag sequence.
    pub combinations: Vec<OneOrMany<String>>,
    /// Extension with leading dot, e.g. `.png`.
    pub ext: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_exists: Option<String>,
    #[serde(flatten)]
    pub target: TargetJson,
}

impl NamesRequest {
    /// Tag sequences in batch order.
    pub fn tag_sequences(&self) -> Vec<Vec<String>> {
        self.combinations
            .iter()
            .cloned()
            .map(OneOrMany::into_vec)
            .collect()
    }
}

/// Planned filenames, in batch order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamesResponse {
    pub directory: String,
    pub names: Vec<NameOutcome>,
}

// =============================================================================
// CLASSIFY REQUEST/RESPONSE
// =============================================================================

/// Classify a planned batch against the target directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyRequest {
    pub combinations: Vec<OneOrMany<String>>,
    /// One prompt per combination, or a single prompt for all.
    #[serde(default)]
    pub prompts: OneOrMany<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<String>,
    /// Fixes the `single-random` pick.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(flatten)]
    pub target: TargetJson,
}

impl ClassifyRequest {
    /// Pair combinations with (broadcast) prompts.
    pub fn to_batch(&self) -> Result<Vec<Combination>, StemslotError> {
        let tags = self
            .combinations
            .iter()
            .cloned()
            .map(OneOrMany::into_vec)
            .collect();
        Combination::zip_batch(tags, self.prompts.clone().into_vec())
    }
}

/// Kept combinations plus the directory they were checked against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyResponse {
    pub directory: String,
    #[serde(flatten)]
    pub classification: Classification,
}

// =============================================================================
// SCAN REQUEST/RESPONSE
// =============================================================================

/// Directory Index of the target directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResponse {
    pub directory: String,
    pub stem_count: usize,
    pub file_count: usize,
    /// Stem to sorted indices.
    pub stems: BTreeMap<String, Vec<u64>>,
}
