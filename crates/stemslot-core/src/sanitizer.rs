//! # Stem Sanitizer
//!
//! Pure transformation from a tag sequence to a filesystem-safe stem.
//!
//! - Tags carrying the placeholder marker are dropped (unless all do)
//! - Remaining tags are joined with `_`
//! - Every character outside `[A-Za-z0-9_.]` becomes `_`
//! - Runs of `_` collapse; leading/trailing `_` and `.` are trimmed
//! - An empty result falls back to `"image"`
//!
//! No I/O, no state. Never fails.

use crate::primitives::{FALLBACK_STEM, MAX_INDEX, MIN_INDEX, PLACEHOLDER_MARKER, SEPARATOR};
use crate::types::{EnumerationIndex, Stem};

/// Sanitize a tag sequence into a stem.
///
/// Re-sanitizing a returned stem as a single-element sequence yields the
/// same stem.
pub fn sanitize<S: AsRef<str>>(tags: &[S]) -> Stem {
    let mut parts: Vec<&str> = tags
        .iter()
        .map(AsRef::as_ref)
        .filter(|tag| !tag.contains(PLACEHOLDER_MARKER))
        .collect();
    if parts.is_empty() {
        parts = tags.iter().map(AsRef::as_ref).collect();
    }

    let joined = parts.join("_");
    let mut out = String::with_capacity(joined.len());
    for ch in joined.chars() {
        let ch = if is_stem_char(ch) { ch } else { SEPARATOR };
        if ch == SEPARATOR && out.ends_with(SEPARATOR) {
            continue;
        }
        out.push(ch);
    }

    let trimmed = out.trim_matches(['_', '.']);
    if trimmed.is_empty() {
        Stem(FALLBACK_STEM.to_string())
    } else {
        Stem(trimmed.to_string())
    }
}

#[inline]
fn is_stem_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '.'
}

// =============================================================================
// SUGGESTED INDEX
// =============================================================================

/// A stem split into the base used for naming and an optional
/// caller-suggested starting index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StemParts {
    /// Stem with any trailing index digits removed.
    pub base: Stem,
    /// Index embedded in the stem's trailing digits, clamped to `1..=99`.
    pub suggested: Option<EnumerationIndex>,
}

/// Split trailing digits off a stem as a suggested enumeration index.
///
/// `"Talking5"` becomes base `"Talking"` with suggestion `5`, and
/// `"Idle_07"` becomes `"Idle"` with `7`. The digits only count when the
/// remaining base is non-empty; a digit run too long to parse is treated as
/// no suggestion. Suggestions are clamped to `[1, 99]`.
pub fn split_suggested_index(stem: &Stem) -> StemParts {
    let s = stem.as_str();
    let digits_at = s.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    let unsplit = || StemParts {
        base: stem.clone(),
        suggested: None,
    };

    if digits_at == s.len() {
        return unsplit();
    }
    let base = s[..digits_at].trim_end_matches(['_', '.']);
    if base.is_empty() {
        return unsplit();
    }
    let Ok(raw) = s[digits_at..].parse::<u64>() else {
        return unsplit();
    };

    StemParts {
        base: Stem(base.to_string()),
        suggested: Some(EnumerationIndex(raw.clamp(MIN_INDEX, MAX_INDEX))),
    }
}

// =============================================================================
// TESTS
// =============================================================================
