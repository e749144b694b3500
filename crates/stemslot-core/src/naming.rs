//! # Naming Engine
//!
//! Assigns the final `{stem}_{NN}{ext}` filename for one artifact.
//!
//! ## Collision Policies
//!
//! - `append`: continue after the highest index on disk (or claim a higher
//!   suggested slot), never reusing an occupied name
//! - `overwrite`: index by batch position; an occupied slot is replaced
//! - `skip`: index by batch position; an occupied slot omits the artifact
//!
//! ## Batch State
//!
//! All per-batch state lives in a [`NameCache`] owned by the caller: the
//! directory snapshot (taken once, on first use) and the last index handed
//! out per base stem. Two calls sharing a cache never produce the same name
//! under `append`; two calls with separate caches know nothing of each
//! other beyond what is on disk.

use crate::primitives::MAX_INDEX;
use crate::sanitizer::{sanitize, split_suggested_index};
use crate::scan::DirectoryIndex;
use crate::types::{CollisionPolicy, EnumerationIndex, Stem, StemslotError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// =============================================================================
// OUTCOME
// =============================================================================

/// A filename the caller should write to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedName {
    pub filename: String,
    /// Base stem the index was assigned under.
    pub stem: Stem,
    pub index: EnumerationIndex,
    /// True when the slot was occupied and the write will replace it
    /// (`overwrite` only).
    pub replaces_existing: bool,
}

/// Result of naming one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NameOutcome {
    /// Write the artifact under this name.
    Assigned(AssignedName),
    /// Do not write; the slot is occupied and the policy is `skip`.
    Omitted { filename: String },
}

impl NameOutcome {
    /// The computed filename, whether or not it will be written.
    #[must_use]
    pub fn filename(&self) -> &str {
        match self {
            Self::Assigned(name) => &name.filename,
            Self::Omitted { filename } => filename,
        }
    }

    /// Whether the artifact is omitted.
    #[must_use]
    pub fn is_omitted(&self) -> bool {
        matches!(self, Self::Omitted { .. })
    }
}

// =============================================================================
// BATCH CACHE
// =============================================================================

/// Batch-scoped naming state, one entry per target directory.
#[derive(Debug, Default)]
pub struct NameCache {
    directories: BTreeMap<PathBuf, DirectoryState>,
}

#[derive(Debug, Default)]
struct DirectoryState {
    snapshot: Option<DirectoryIndex>,
    /// `(base, ext) -> last index assigned under append`.
    appended: BTreeMap<(String, String), u64>,
    /// `(base, ext) -> last batch position under overwrite/skip`.
    positions: BTreeMap<(String, String), u64>,
}

impl DirectoryState {
    fn snapshot(&mut self, directory: &Path) -> &DirectoryIndex {
        self.snapshot
            .get_or_insert_with(|| DirectoryIndex::scan(directory))
    }
}

impl NameCache {
    /// Create an empty cache for a new batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&mut self, directory: &Path) -> &mut DirectoryState {
        self.directories
            .entry(directory.to_path_buf())
            .or_default()
    }

    /// Number of directories this cache has seen.
    #[must_use]
    pub fn directory_count(&self) -> usize {
        self.directories.len()
    }
}

// =============================================================================
// NAMING
// =============================================================================

/// Render `{stem}_{NN}{ext}`.
#[must_use]
pub fn render_filename(stem: &Stem, index: EnumerationIndex, ext: &str) -> String {
    format!("{}_{}{}", stem, index, ext)
}

/// Check that `ext` looks like `.png`: a leading dot, no separators.
pub fn validate_extension(ext: &str) -> Result<(), StemslotError> {
    let valid = ext.len() > 1
        && ext.starts_with('.')
        && !ext[1..].contains(['.', '/', '\\'])
        && !ext.chars().any(char::is_whitespace);
    if valid {
        Ok(())
    } else {
        Err(StemslotError::Validation(format!(
            "extension must look like '.png', got '{}'",
            ext
        )))
    }
}

/// Next index after `floor`, or the suggestion if it lies above `floor`.
fn advance(floor: u64, suggested: Option<EnumerationIndex>) -> u64 {
    match suggested {
        Some(s) if s.value() > floor => s.value(),
        _ => floor.saturating_add(1),
    }
}

fn ensure_capacity(base: &Stem, index: u64) -> Result<EnumerationIndex, StemslotError> {
    if index > MAX_INDEX {
        return Err(StemslotError::CapacityExceeded {
            stem: base.to_string(),
            max: MAX_INDEX,
        });
    }
    Ok(EnumerationIndex(index))
}

/// Compute the filename for one artifact.
///
/// `ext` includes the leading dot. The directory is listed at most once per
/// cache; `append` additionally re-checks the chosen path on disk and moves
/// past names that appeared after the snapshot.
///
/// # Errors
///
/// - `Validation` for a malformed extension
/// - `CapacityExceeded` when the index would pass 99
pub fn next_name<S: AsRef<str>>(
    tags: &[S],
    ext: &str,
    directory: &Path,
    policy: CollisionPolicy,
    cache: &mut NameCache,
) -> Result<NameOutcome, StemslotError> {
    validate_extension(ext)?;

    let stem = sanitize(tags);
    let parts = split_suggested_index(&stem);
    let base = parts.base;
    let key = (base.as_str().to_string(), ext.to_string());
    let state = cache.state(directory);

    let outcome = match policy {
        CollisionPolicy::Append => {
            let floor = match state.appended.get(&key) {
                Some(&last) => last,
                None => state.snapshot(directory).max_index(base.as_str(), ext),
            };
            let mut index = advance(floor, parts.suggested);
            while index <= MAX_INDEX
                && directory
                    .join(render_filename(&base, EnumerationIndex(index), ext))
                    .exists()
            {
                index += 1;
            }
            let index = ensure_capacity(&base, index)?;
            if let Some(suggested) = parts.suggested.filter(|s| *s != index) {
                tracing::info!(
                    stem = %base,
                    suggested = suggested.value(),
                    assigned = index.value(),
                    "next_name: suggested slot taken, enumerating past it"
                );
            }
            state.appended.insert(key, index.value());

            NameOutcome::Assigned(AssignedName {
                filename: render_filename(&base, index, ext),
                stem: base,
                index,
                replaces_existing: false,
            })
        }
        CollisionPolicy::Overwrite | CollisionPolicy::Skip => {
            let previous = state.positions.get(&key).copied().unwrap_or(0);
            let index = ensure_capacity(&base, advance(previous, parts.suggested))?;
            state.positions.insert(key, index.value());

            let filename = render_filename(&base, index, ext);
            let occupied = directory.join(&filename).exists();
            if occupied && policy == CollisionPolicy::Skip {
                NameOutcome::Omitted { filename }
            } else {
                NameOutcome::Assigned(AssignedName {
                    filename,
                    stem: base,
                    index,
                    replaces_existing: occupied,
                })
            }
        }
    };

    tracing::debug!(
        stem = %stem,
        policy = %policy,
        filename = outcome.filename(),
        omitted = outcome.is_omitted(),
        "next_name"
    );
    Ok(outcome)
}

// =============================================================================
// TESTS
// =============================================================================
