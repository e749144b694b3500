//! # Property-Based Tests
//!
//! Invariants of the sanitizer, the naming engine and the classifier,
//! checked with proptest.

use proptest::collection::vec;
use proptest::prelude::*;
use stemslot_core::{
    CollisionPolicy, Combination, DirectoryIndex, EnumerationIndex, NameCache, NameOutcome,
    SelectionPolicy, classify, is_existing, next_name, sanitize,
};
use std::fs;

/// Arbitrary printable tags, including reserved and non-ASCII characters.
fn any_tag() -> impl Strategy<Value = String> {
    "[ -~àéü]{0,12}"
}

/// Tags that never end in a digit, so no index is suggested.
fn plain_tag() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z ]{0,8}[A-Za-z]"
}

proptest! {
    /// Stems only use the filename alphabet and are never empty.
    #[test]
    fn sanitized_stems_are_filesystem_safe(tags in vec(any_tag(), 0..6)) {
        let stem = sanitize(&tags);
        let s = stem.as_str();

        prop_assert!(!s.is_empty());
        prop_assert!(s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.'));
        prop_assert!(!s.starts_with(['_', '.']));
        prop_assert!(!s.ends_with(['_', '.']));
        prop_assert!(!s.contains("__"));
    }

    /// Re-sanitizing a stem as a single tag leaves it unchanged.
    #[test]
    fn sanitize_is_stable_on_its_output(tags in vec(any_tag(), 0..6)) {
        let stem = sanitize(&tags);
        prop_assert_eq!(sanitize(&[stem.as_str()]), stem.clone());
    }

    /// Same-stem calls on an empty directory enumerate 01, 02, ... in order.
    #[test]
    fn append_enumerates_in_call_order(
        tag in plain_tag(),
        repeats in 1usize..8
    ) {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut cache = NameCache::new();
        let stem = sanitize(&[tag.as_str()]);

        for expected in 1..=repeats {
            // Alternate between two tag spellings with the same stem.
            let name = if expected % 2 == 0 {
                next_name(&[tag.replace(' ', "_")], ".png", dir.path(), CollisionPolicy::Append, &mut cache)
            } else {
                next_name(&[tag.as_str()], ".png", dir.path(), CollisionPolicy::Append, &mut cache)
            }
            .expect("name");
            prop_assert_eq!(name.filename(), format!("{}_{:02}.png", stem, expected));
        }
    }

    /// `all` selection is idempotent on an unchanged directory.
    #[test]
    fn classify_all_is_idempotent(
        tags in vec(vec(plain_tag(), 1..3), 0..6),
        existing in vec(plain_tag(), 0..4)
    ) {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in &existing {
            let stem = sanitize(&[name.as_str()]);
            fs::write(dir.path().join(format!("{}_01.png", stem)), b"x").expect("write");
        }
        let batch: Vec<Combination> = tags
            .into_iter()
            .map(|t| Combination { tags: t, prompt: String::new() })
            .collect();

        let first = classify(batch.clone(), dir.path(), SelectionPolicy::All).expect("first");
        let second = classify(batch.clone(), dir.path(), SelectionPolicy::All).expect("second");

        prop_assert_eq!(&first.kept, &batch);
        prop_assert_eq!(first, second);
    }

    /// A name written under append is seen as existing after a rescan.
    #[test]
    fn appended_names_round_trip(tags in vec(plain_tag(), 1..4)) {
        let dir = tempfile::tempdir().expect("tempdir");
        let name = next_name(&tags, ".webp", dir.path(), CollisionPolicy::Append, &mut NameCache::new())
            .expect("name");
        fs::write(dir.path().join(name.filename()), b"x").expect("write");

        let index = DirectoryIndex::scan(dir.path());
        prop_assert!(is_existing(&index, &tags));
    }

    /// Digit-ending tags round-trip when append claims the suggested slot;
    /// a displaced suggestion is still reported new.
    #[test]
    fn suggested_slots_round_trip_when_claimed(
        base in "[A-Za-z]{1,8}",
        suggested in 1u64..=20,
        taken in 0u64..=20
    ) {
        let dir = tempfile::tempdir().expect("tempdir");
        if taken > 0 {
            fs::write(dir.path().join(format!("{}_{:02}.png", base, taken)), b"x").expect("write");
        }
        let tag = format!("{}{}", base, suggested);

        let outcome = next_name(&[tag.as_str()], ".png", dir.path(), CollisionPolicy::Append, &mut NameCache::new())
            .expect("name");
        let NameOutcome::Assigned(name) = outcome else {
            return Err(TestCaseError::fail("append never omits"));
        };
        let expected = if suggested > taken { suggested } else { taken + 1 };
        prop_assert_eq!(name.index, EnumerationIndex(expected));
        fs::write(dir.path().join(&name.filename), b"x").expect("write");

        let index = DirectoryIndex::scan(dir.path());
        prop_assert_eq!(is_existing(&index, &[tag.as_str()]), suggested >= taken);
    }
}
