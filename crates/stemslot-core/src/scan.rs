//! # Directory Index
//!
//! One-shot scan of a target directory into a `stem -> {indices}` snapshot.
//!
//! Files are recognized when their name matches `{stem}_{NN}.{ext}`:
//! - `stem` made of `[A-Za-z0-9_.]`
//! - `NN` two or more ASCII digits (no upper bound when reading)
//! - any extension
//!
//! Everything else in the directory is ignored. Scanning never fails: an
//! unreadable or missing directory is an empty index, since "not created
//! yet" is a legitimate state for an output directory.

use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::io::ErrorKind;
use std::path::Path;
use std::sync::LazyLock;

static ENUMERATED_FILENAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9_.]+)_(\d{2,})(\.[^.]+)$")
        .expect("enumerated filename pattern is valid")
});

/// A filename split along the naming contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumeratedName<'a> {
    pub stem: &'a str,
    pub index: u64,
    /// Extension including the leading dot.
    pub ext: &'a str,
}

/// Parse `{stem}_{NN}{ext}`.
///
/// Returns `None` for names outside the contract, including indices too
/// large to represent.
pub fn parse_enumerated(name: &str) -> Option<EnumeratedName<'_>> {
    let caps = ENUMERATED_FILENAME.captures(name)?;
    let stem = caps.get(1)?.as_str();
    let index = caps.get(2)?.as_str().parse::<u64>().ok()?;
    let ext = caps.get(3)?.as_str();
    Some(EnumeratedName { stem, index, ext })
}

// =============================================================================
// DIRECTORY INDEX
// =============================================================================

/// Point-in-time snapshot of the enumerated files in one directory.
///
/// Indices are grouped per stem, and each index remembers the extensions it
/// was seen with (`Idle_01.png` and `Idle_01.webp` share index 1).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryIndex {
    entries: BTreeMap<String, BTreeMap<u64, BTreeSet<String>>>,
}

impl DirectoryIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// List `directory` once and index every enumerated file in it.
    ///
    /// I/O failures degrade to "no existing entries".
    pub fn scan(directory: &Path) -> Self {
        let mut index = Self::new();

        let entries = match std::fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(directory = %directory.display(), "scan: directory absent, treating as empty");
                return index;
            }
            Err(e) => {
                tracing::warn!(directory = %directory.display(), error = %e, "scan: cannot list directory, treating as empty");
                return index;
            }
        };

        for entry in entries {
            let Ok(entry) = entry else {
                continue;
            };
            if entry.file_type().is_ok_and(|t| t.is_dir()) {
                continue;
            }
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if let Some(parsed) = parse_enumerated(name) {
                index.record(parsed.stem, parsed.index, parsed.ext);
            }
        }

        tracing::debug!(
            directory = %directory.display(),
            stems = index.stem_count(),
            files = index.file_count(),
            "scan: indexed directory"
        );
        index
    }

    /// Build an index from bare file names (no I/O).
    pub fn from_file_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = Self::new();
        for name in names {
            if let Some(parsed) = parse_enumerated(name.as_ref()) {
                index.record(parsed.stem, parsed.index, parsed.ext);
            }
        }
        index
    }

    /// Record one file.
    pub fn record(&mut self, stem: &str, index: u64, ext: &str) {
        self.entries
            .entry(stem.to_string())
            .or_default()
            .entry(index)
            .or_default()
            .insert(ext.to_string());
    }

    /// Whether `stem` has a file at `index` (any extension).
    #[must_use]
    pub fn contains(&self, stem: &str, index: u64) -> bool {
        self.entries
            .get(stem)
            .is_some_and(|indices| indices.contains_key(&index))
    }

    /// Whether `stem` has any recorded index at all.
    #[must_use]
    pub fn has_any(&self, stem: &str) -> bool {
        self.entries.contains_key(stem)
    }

    /// Recorded indices for `stem`, ascending.
    pub fn indices(&self, stem: &str) -> impl Iterator<Item = u64> + '_ {
        self.entries
            .get(stem)
            .into_iter()
            .flat_map(|indices| indices.keys().copied())
    }

    /// Highest index recorded for `stem` with extension `ext`, or 0.
    #[must_use]
    pub fn max_index(&self, stem: &str, ext: &str) -> u64 {
        self.entries
            .get(stem)
            .and_then(|indices| {
                indices
                    .iter()
                    .rev()
                    .find(|(_, exts)| exts.contains(ext))
                    .map(|(index, _)| *index)
            })
            .unwrap_or(0)
    }

    /// Number of distinct stems.
    #[must_use]
    pub fn stem_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of indexed files.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.entries
            .values()
            .flat_map(|indices| indices.values())
            .map(BTreeSet::len)
            .sum()
    }

    /// Whether no enumerated file was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `stem -> [indices]`, ordered by stem.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, Vec<u64>> {
        self.entries
            .iter()
            .map(|(stem, indices)| (stem.clone(), indices.keys().copied().collect()))
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
