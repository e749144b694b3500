//! # Existence Classifier
//!
//! Decides, before anything is generated, which planned combinations
//! already have an artifact in the target directory, and reduces the batch
//! per a [`SelectionPolicy`].
//!
//! The directory is listed once per call. Classification is read-only.

use crate::sanitizer::{sanitize, split_suggested_index};
use crate::scan::DirectoryIndex;
use crate::types::{Combination, SelectionPolicy, StemslotError};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Outcome of classifying one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Combinations to generate, in batch order.
    pub kept: Vec<Combination>,
    pub kept_count: usize,
    pub skipped_count: usize,
    /// Human-readable one-line summary.
    pub summary: String,
}

/// Whether the combination `tags` already has an artifact in `index`.
///
/// Tags ending in an index (`"Talking5"`) match only that exact slot under
/// the base stem; otherwise any recorded index for the stem counts.
///
/// A suggested slot that `append` could not claim (something at or above it
/// was already on disk) lands at a higher index, and that file is not seen
/// here: the combination stays new until its own slot is filled.
pub fn is_existing<S: AsRef<str>>(index: &DirectoryIndex, tags: &[S]) -> bool {
    let stem = sanitize(tags);
    let parts = split_suggested_index(&stem);
    match parts.suggested {
        Some(suggested) => index.contains(parts.base.as_str(), suggested.value()),
        None => index.has_any(stem.as_str()),
    }
}

/// Batch classifier bound to one selection policy.
#[derive(Debug, Clone, Copy)]
pub struct Classifier {
    selection: SelectionPolicy,
    seed: Option<u64>,
}

impl Classifier {
    /// Create a classifier for `selection`.
    #[must_use]
    pub const fn new(selection: SelectionPolicy) -> Self {
        Self {
            selection,
            seed: None,
        }
    }

    /// Fix the random source used by `single-random`.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Scan `directory` once and classify `batch` against it.
    ///
    /// `all` never touches the disk.
    pub fn classify(
        &self,
        batch: Vec<Combination>,
        directory: &Path,
    ) -> Result<Classification, StemslotError> {
        self.check_batch(&batch)?;
        if self.selection == SelectionPolicy::All {
            return Ok(keep_all(batch));
        }
        let index = DirectoryIndex::scan(directory);
        self.classify_with_index(batch, &index)
    }

    /// Classify `batch` against an existing snapshot.
    pub fn classify_with_index(
        &self,
        batch: Vec<Combination>,
        index: &DirectoryIndex,
    ) -> Result<Classification, StemslotError> {
        self.check_batch(&batch)?;
        let total = batch.len();

        match self.selection {
            SelectionPolicy::All => Ok(keep_all(batch)),
            SelectionPolicy::NewOnly => {
                let (kept, skipped): (Vec<_>, Vec<_>) = batch
                    .into_iter()
                    .partition(|item| !is_existing(index, &item.tags));

                for item in &skipped {
                    tracing::debug!(tags = ?item.tags, stem = %sanitize(&item.tags), "classify: skipping existing combination");
                }
                if kept.is_empty() {
                    return Err(StemslotError::AllFiltered { total });
                }

                let summary = format!("Kept {} of {} combinations.", kept.len(), total);
                tracing::info!(kept = kept.len(), skipped = skipped.len(), "{}", summary);
                Ok(Classification {
                    kept_count: kept.len(),
                    skipped_count: skipped.len(),
                    kept,
                    summary,
                })
            }
            SelectionPolicy::SingleFirst
            | SelectionPolicy::SingleLast
            | SelectionPolicy::SingleRandom => self.select_single(batch, index),
        }
    }

    fn check_batch(&self, batch: &[Combination]) -> Result<(), StemslotError> {
        if self.selection.is_single() && batch.is_empty() {
            return Err(StemslotError::Validation(format!(
                "selection '{}' needs at least one combination",
                self.selection
            )));
        }
        Ok(())
    }

    fn select_single(
        &self,
        batch: Vec<Combination>,
        index: &DirectoryIndex,
    ) -> Result<Classification, StemslotError> {
        let total = batch.len();
        let fresh: Vec<usize> = batch
            .iter()
            .enumerate()
            .filter(|(_, item)| !is_existing(index, &item.tags))
            .map(|(position, _)| position)
            .collect();
        let fell_back = fresh.is_empty();
        let pool = if fell_back {
            (0..total).collect()
        } else {
            fresh
        };

        let picked = match self.selection {
            SelectionPolicy::SingleFirst => pool.first().copied(),
            SelectionPolicy::SingleLast => pool.last().copied(),
            _ => {
                let mut rng = match self.seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                pool.choose(&mut rng).copied()
            }
        };
        let Some(item) = picked.and_then(|position| batch.into_iter().nth(position)) else {
            return Err(StemslotError::Validation(format!(
                "selection '{}' found no candidate",
                self.selection
            )));
        };

        let summary = format!(
            "Selected 1 of {} combinations ({}, {}).",
            total,
            self.selection,
            if fell_back {
                "all exist, picked from full batch"
            } else {
                "new"
            }
        );
        tracing::info!(tags = ?item.tags, fell_back, "{}", summary);
        Ok(Classification {
            kept: vec![item],
            kept_count: 1,
            skipped_count: total - 1,
            summary,
        })
    }
}

fn keep_all(batch: Vec<Combination>) -> Classification {
    let summary = format!("Kept all {} combinations (no filtering).", batch.len());
    Classification {
        kept_count: batch.len(),
        skipped_count: 0,
        kept: batch,
        summary,
    }
}

/// Scan `directory` once and classify `batch` per `selection`.
///
/// `single-random` draws from OS entropy; use [`Classifier::with_seed`] for
/// reproducible picks.
pub fn classify(
    batch: Vec<Combination>,
    directory: &Path,
    selection: SelectionPolicy,
) -> Result<Classification, StemslotError> {
    Classifier::new(selection).classify(batch, directory)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn combo(tags: &[&str]) -> Combination {
        Combination::new(tags.iter().copied(), format!("prompt for {}", tags.join(" ")))
    }

    fn index(names: &[&str]) -> DirectoryIndex {
        DirectoryIndex::from_file_names(names.iter().copied())
    }

    #[test]
    fn existing_by_any_index() {
        let idx = index(&["Neutral_Idle_02.png"]);
        assert!(is_existing(&idx, &["Neutral", "Idle"]));
        assert!(!is_existing(&idx, &["Happy", "Wave"]));
    }

    #[test]
    fn existing_by_exact_suggested_index() {
        let idx = index(&["Talking_05.webp"]);
        assert!(is_existing(&idx, &["Talking5"]));
        assert!(!is_existing(&idx, &["Talking3"]));
    }

    #[test]
    fn higher_index_does_not_fill_a_suggested_slot() {
        let idx = index(&["Talking_06.png", "Talking_07.png"]);
        assert!(!is_existing(&idx, &["Talking5"]));
        assert!(is_existing(&idx, &["Talking"]));
    }

    #[test]
    fn new_only_keeps_prompts_with_their_tags() {
        let idx = index(&["Neutral_Idle_01.png"]);
        let batch = vec![combo(&["Neutral", "Idle"]), combo(&["Happy", "Wave"])];

        let result = Classifier::new(SelectionPolicy::NewOnly)
            .classify_with_index(batch.clone(), &idx)
            .expect("classify");

        assert_eq!(result.kept, vec![batch[1].clone()]);
        assert_eq!(result.kept[0].prompt, "prompt for Happy Wave");
        assert_eq!(result.kept_count, 1);
        assert_eq!(result.skipped_count, 1);
        assert_eq!(result.summary, "Kept 1 of 2 combinations.");
    }

    #[test]
    fn new_only_fails_when_everything_exists() {
        let idx = index(&["Neutral_Idle_01.png", "Happy_Wave_01.png"]);
        let batch = vec![combo(&["Neutral", "Idle"]), combo(&["Happy", "Wave"])];
        let result = Classifier::new(SelectionPolicy::NewOnly).classify_with_index(batch, &idx);
        assert!(matches!(result, Err(StemslotError::AllFiltered { total: 2 })));
    }

    #[test]
    fn all_keeps_everything() {
        let idx = index(&["A_01.png"]);
        let batch = vec![combo(&["A"]), combo(&["B"])];
        let result = Classifier::new(SelectionPolicy::All)
            .classify_with_index(batch.clone(), &idx)
            .expect("classify");
        assert_eq!(result.kept, batch);
        assert_eq!(result.skipped_count, 0);
    }

    #[test]
    fn single_first_prefers_new() {
        let idx = index(&["A_B_01.png"]);
        let batch = vec![combo(&["A", "B"]), combo(&["C"]), combo(&["D"])];
        let result = Classifier::new(SelectionPolicy::SingleFirst)
            .classify_with_index(batch, &idx)
            .expect("classify");
        assert_eq!(result.kept, vec![combo(&["C"])]);
        assert_eq!(result.skipped_count, 2);
    }

    #[test]
    fn single_last_prefers_new() {
        let idx = index(&["D_01.png"]);
        let batch = vec![combo(&["A"]), combo(&["C"]), combo(&["D"])];
        let result = Classifier::new(SelectionPolicy::SingleLast)
            .classify_with_index(batch, &idx)
            .expect("classify");
        assert_eq!(result.kept, vec![combo(&["C"])]);
    }

    #[test]
    fn single_falls_back_to_full_batch() {
        let idx = index(&["A_01.png", "B_01.png"]);
        let batch = vec![combo(&["A"]), combo(&["B"])];
        let result = Classifier::new(SelectionPolicy::SingleLast)
            .classify_with_index(batch, &idx)
            .expect("classify");
        assert_eq!(result.kept, vec![combo(&["B"])]);
        assert!(result.summary.contains("all exist"));
    }

    #[test]
    fn single_random_picks_from_new_pool() {
        let idx = index(&["A_01.png", "C_01.png"]);
        let batch = vec![combo(&["A"]), combo(&["B"]), combo(&["C"]), combo(&["D"])];
        for seed in 0..20 {
            let result = Classifier::new(SelectionPolicy::SingleRandom)
                .with_seed(seed)
                .classify_with_index(batch.clone(), &idx)
                .expect("classify");
            assert_eq!(result.kept_count, 1);
            assert!(
                result.kept[0] == combo(&["B"]) || result.kept[0] == combo(&["D"]),
                "picked an existing combination: {:?}",
                result.kept[0]
            );
        }
    }

    #[test]
    fn single_random_is_reproducible_with_a_seed() {
        let idx = DirectoryIndex::new();
        let batch: Vec<_> = (0..10)
            .map(|i| {
                let tag = format!("Pose{i}x");
                combo(&[tag.as_str()])
            })
            .collect();
        let classifier = Classifier::new(SelectionPolicy::SingleRandom).with_seed(7);
        let a = classifier
            .classify_with_index(batch.clone(), &idx)
            .expect("a");
        let b = classifier.classify_with_index(batch, &idx).expect("b");
        assert_eq!(a.kept, b.kept);
    }

    #[test]
    fn single_rejects_empty_batch() {
        let result = classify(
            Vec::new(),
            Path::new("/nonexistent"),
            SelectionPolicy::SingleFirst,
        );
        assert!(matches!(result, Err(StemslotError::Validation(_))));
    }
}
