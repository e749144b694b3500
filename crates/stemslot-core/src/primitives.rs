//! # Naming Primitives
//!
//! Fixed constants of the on-disk naming contract.
//!
//! Filenames have the form `{stem}_{index:02}{ext}`. These values are
//! compiled in; changing any of them changes which existing files the
//! engine recognizes.

/// Smallest enumeration index ever assigned.
pub const MIN_INDEX: u64 = 1;

/// Largest enumeration index ever assigned.
///
/// Indices read back from disk are not bounded by this value; only newly
/// assigned ones are.
pub const MAX_INDEX: u64 = 99;

/// Minimum rendered width of the enumeration suffix (zero-padded).
pub const INDEX_WIDTH: usize = 2;

/// Stem used when sanitization leaves nothing behind.
pub const FALLBACK_STEM: &str = "image";

/// Reserved substring marking a tag as "no id supplied".
///
/// Tags containing it are dropped from the stem unless every tag carries it.
pub const PLACEHOLDER_MARKER: &str = "_no_id_";

/// Separator between joined tags and between stem and index.
pub const SEPARATOR: char = '_';
