//! # Core Type Definitions
//!
//! This module contains the shared types of the naming engine:
//! - Naming identifiers (`Stem`, `EnumerationIndex`)
//! - Batch elements (`Combination`)
//! - Policies (`CollisionPolicy`, `SelectionPolicy`)
//! - Error types (`StemslotError`)

use crate::primitives::INDEX_WIDTH;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// NAMING IDENTIFIERS
// =============================================================================

/// A sanitized, filesystem-safe stem derived from a tag sequence.
///
/// Only produced by [`crate::sanitize`] (or by splitting a sanitized stem),
/// so it always matches `[A-Za-z0-9_.]+` without leading or trailing `_`/`.`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Stem(pub(crate) String);

impl Stem {
    /// Get the stem as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the stem, returning the inner string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Stem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Numeric suffix disambiguating artifacts that share a stem.
///
/// Rendered zero-padded to at least two digits.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct EnumerationIndex(pub u64);

impl EnumerationIndex {
    /// Get the raw index value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EnumerationIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$}", self.0, width = INDEX_WIDTH)
    }
}

// =============================================================================
// COMBINATION
// =============================================================================

/// One planned artifact: its tag sequence and the prompt that produces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combination {
    /// Ordered tags; order determines stem composition.
    pub tags: Vec<String>,
    /// Prompt associated with this combination. Carried through untouched.
    #[serde(default)]
    pub prompt: String,
}

impl Combination {
    /// Create a new combination.
    #[must_use]
    pub fn new<S: Into<String>>(tags: impl IntoIterator<Item = S>, prompt: impl Into<String>) -> Self {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
            prompt: prompt.into(),
        }
    }

    /// Pair tag sequences with prompts, broadcasting a single prompt.
    ///
    /// See [`broadcast_prompts`] for the accepted prompt list lengths.
    pub fn zip_batch(
        tags: Vec<Vec<String>>,
        prompts: Vec<String>,
    ) -> Result<Vec<Self>, StemslotError> {
        let prompts = broadcast_prompts(&prompts, tags.len())?;
        Ok(tags
            .into_iter()
            .zip(prompts)
            .map(|(tags, prompt)| Self { tags, prompt })
            .collect())
    }
}

/// Expand a prompt list to exactly `len` entries.
///
/// - `len` prompts: used as given
/// - one prompt: repeated for every item
/// - no prompts: every item gets an empty prompt
///
/// Any other length is a `Validation` error.
pub fn broadcast_prompts(prompts: &[String], len: usize) -> Result<Vec<String>, StemslotError> {
    match prompts {
        p if p.len() == len => Ok(p.to_vec()),
        [] => Ok(vec![String::new(); len]),
        [single] => Ok(vec![single.clone(); len]),
        p => Err(StemslotError::Validation(format!(
            "prompt and combination lists must have the same length or 1 prompt (got {} prompts for {} combinations)",
            p.len(),
            len
        ))),
    }
}

// =============================================================================
// POLICIES
// =============================================================================

/// How to handle an already-occupied filename slot for one artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// Always find a fresh index.
    #[default]
    Append,
    /// Reuse the batch-position index, replacing any existing file.
    Overwrite,
    /// Reuse the batch-position index, omitting the artifact if occupied.
    Skip,
}

impl CollisionPolicy {
    /// Wire name of the policy.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Append => "append",
            Self::Overwrite => "overwrite",
            Self::Skip => "skip",
        }
    }
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollisionPolicy {
    type Err = StemslotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "append" => Ok(Self::Append),
            "overwrite" => Ok(Self::Overwrite),
            "skip" => Ok(Self::Skip),
            other => Err(StemslotError::Validation(format!(
                "invalid on_exists option: '{}' (expected append, overwrite or skip)",
                other
            ))),
        }
    }
}

/// Batch-level rule for reducing planned combinations against the disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionPolicy {
    /// Keep every combination.
    All,
    /// Keep only combinations without an artifact on disk.
    #[default]
    NewOnly,
    /// Keep exactly one: the first new combination.
    SingleFirst,
    /// Keep exactly one: the last new combination.
    SingleLast,
    /// Keep exactly one: a uniformly random new combination.
    SingleRandom,
}

impl SelectionPolicy {
    /// Wire name of the policy.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::NewOnly => "new-only",
            Self::SingleFirst => "single-first",
            Self::SingleLast => "single-last",
            Self::SingleRandom => "single-random",
        }
    }

    /// Whether this policy reduces the batch to a single item.
    #[must_use]
    pub const fn is_single(self) -> bool {
        matches!(
            self,
            Self::SingleFirst | Self::SingleLast | Self::SingleRandom
        )
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionPolicy {
    type Err = StemslotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "all" => Ok(Self::All),
            "new-only" => Ok(Self::NewOnly),
            "single-first" => Ok(Self::SingleFirst),
            "single-last" => Ok(Self::SingleLast),
            "single-random" => Ok(Self::SingleRandom),
            other => Err(StemslotError::Validation(format!(
                "invalid selection option: '{}' (expected all, new-only, single-first, single-last or single-random)",
                other
            ))),
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors surfaced by the naming engine.
///
/// Every variant is returned synchronously to the immediate caller and is
/// never retried internally.
#[derive(Debug, Error)]
pub enum StemslotError {
    /// Malformed input: mismatched batch lengths, unknown policy, bad extension.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The enumeration for a stem would exceed the assignable maximum.
    #[error("Capacity exceeded: no free index for stem '{stem}' within 1..={max}")]
    CapacityExceeded { stem: String, max: u64 },

    /// A `new-only` selection removed every combination.
    #[error("All {total} combinations were filtered out, nothing to generate")]
    AllFiltered { total: usize },

    /// An I/O error outside directory scanning (creation, persisting).
    #[error("I/O error: {0}")]
    IoError(String),
}

impl StemslotError {
    /// Stable machine-readable kind of this error.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::CapacityExceeded { .. } => "capacity_exceeded",
            Self::AllFiltered { .. } => "all_filtered",
            Self::IoError(_) => "io",
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumeration_index_renders_zero_padded() {
        assert_eq!(EnumerationIndex(1).to_string(), "01");
        assert_eq!(EnumerationIndex(42).to_string(), "42");
        assert_eq!(EnumerationIndex(123).to_string(), "123");
    }

    #[test]
    fn collision_policy_parses_known_values() {
        assert_eq!("append".parse::<CollisionPolicy>().ok(), Some(CollisionPolicy::Append));
        assert_eq!(" skip ".parse::<CollisionPolicy>().ok(), Some(CollisionPolicy::Skip));
        assert!(matches!(
            "replace".parse::<CollisionPolicy>(),
            Err(StemslotError::Validation(_))
        ));
    }

    #[test]
    fn selection_policy_round_trips_through_display() {
        for policy in [
            SelectionPolicy::All,
            SelectionPolicy::NewOnly,
            SelectionPolicy::SingleFirst,
            SelectionPolicy::SingleLast,
            SelectionPolicy::SingleRandom,
        ] {
            assert_eq!(policy.to_string().parse::<SelectionPolicy>().ok(), Some(policy));
        }
        assert!("newest".parse::<SelectionPolicy>().is_err());
    }

    #[test]
    fn broadcast_single_prompt() {
        let prompts = broadcast_prompts(&["shared".to_string()], 3).expect("broadcast");
        assert_eq!(prompts, vec!["shared", "shared", "shared"]);
    }

    #[test]
    fn broadcast_rejects_length_mismatch() {
        let prompts = vec!["p1".to_string(), "p2".to_string()];
        assert!(matches!(
            broadcast_prompts(&prompts, 3),
            Err(StemslotError::Validation(_))
        ));
    }

    #[test]
    fn broadcast_empty_prompts_fill_with_empty_strings() {
        assert_eq!(broadcast_prompts(&[], 2).expect("broadcast"), vec!["", ""]);
    }

    #[test]
    fn zip_batch_pairs_in_order() {
        let batch = Combination::zip_batch(
            vec![vec!["A".into()], vec!["B".into()]],
            vec!["pa".into(), "pb".into()],
        )
        .expect("zip");
        assert_eq!(batch[0], Combination::new(["A"], "pa"));
        assert_eq!(batch[1], Combination::new(["B"], "pb"));
    }

    #[test]
    fn error_kinds_are_stable() {
        assert_eq!(StemslotError::AllFiltered { total: 2 }.kind(), "all_filtered");
        assert_eq!(
            StemslotError::CapacityExceeded {
                stem: "A".into(),
                max: 99
            }
            .kind(),
            "capacity_exceeded"
        );
    }
}
