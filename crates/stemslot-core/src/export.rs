//! # Export Planner
//!
//! Names and persists a batch of artifacts in one pass.
//!
//! Validation happens before any I/O. Every item is named through a single
//! [`NameCache`], so duplicates within the batch enumerate `_01`, `_02`, …
//! The bytes themselves are written by an [`ArtifactSink`] supplied by the
//! host; this module only decides where and whether.

use crate::naming::{NameCache, NameOutcome, next_name, validate_extension};
use crate::types::{CollisionPolicy, StemslotError, broadcast_prompts};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Persists one artifact at a path chosen by the engine.
pub trait ArtifactSink<A: ?Sized> {
    /// Write `artifact` to `path`, replacing any existing file.
    fn persist(&mut self, artifact: &A, path: &Path) -> Result<(), StemslotError>;
}

/// One artifact written by [`export_batch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedFile {
    pub filename: String,
    pub prompt: String,
    pub replaced_existing: bool,
}

/// Summary of an export run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportReport {
    pub saved: Vec<ExportedFile>,
    /// Items omitted under the `skip` policy.
    pub skipped: usize,
    pub policy: CollisionPolicy,
}

impl ExportReport {
    /// Saved filenames in batch order.
    pub fn filenames(&self) -> impl Iterator<Item = &str> {
        self.saved.iter().map(|file| file.filename.as_str())
    }
}

/// Name every artifact and hand it to `sink`.
///
/// `artifacts[i]` is named from `tags[i]`. `prompts` may hold one entry per
/// artifact, a single shared entry, or nothing.
///
/// # Errors
///
/// - `Validation` on length mismatch or a malformed extension (before I/O)
/// - `CapacityExceeded` from naming; items already persisted stay on disk
/// - whatever `sink` returns
pub fn export_batch<A, S>(
    artifacts: &[A],
    tags: &[Vec<String>],
    prompts: &[String],
    ext: &str,
    directory: &Path,
    policy: CollisionPolicy,
    sink: &mut S,
) -> Result<ExportReport, StemslotError>
where
    S: ArtifactSink<A> + ?Sized,
{
    if artifacts.len() != tags.len() {
        return Err(StemslotError::Validation(format!(
            "artifacts and combination ids length mismatch ({} vs {})",
            artifacts.len(),
            tags.len()
        )));
    }
    let prompts = broadcast_prompts(prompts, artifacts.len())?;
    validate_extension(ext)?;

    let mut cache = NameCache::new();
    let mut report = ExportReport {
        saved: Vec::with_capacity(artifacts.len()),
        skipped: 0,
        policy,
    };

    for ((artifact, item_tags), prompt) in artifacts.iter().zip(tags).zip(prompts) {
        match next_name(item_tags, ext, directory, policy, &mut cache)? {
            NameOutcome::Omitted { filename } => {
                tracing::info!(filename = %filename, "export: slot occupied, skipping");
                report.skipped += 1;
            }
            NameOutcome::Assigned(name) => {
                let path = directory.join(&name.filename);
                sink.persist(artifact, &path)?;
                tracing::info!(path = %path.display(), replaced = name.replaces_existing, "export: saved artifact");
                report.saved.push(ExportedFile {
                    filename: name.filename,
                    prompt,
                    replaced_existing: name.replaces_existing,
                });
            }
        }
    }

    Ok(report)
}

// =============================================================================
// TESTS
// =============================================================================
