//! # Scenario Tier Tests (N0-N3)
//!
//! End-to-end behavior of the engine against real directories.
//!
//! ## Tiers
//! - N0: Stem Sanitization
//! - N1: Enumeration
//! - N2: Existence Classification
//! - N3: Naming/Classification Round Trip

use stemslot_core::{
    CollisionPolicy, Combination, NameCache, SelectionPolicy, StemslotError, classify, next_name,
    sanitize,
};
use std::fs;
use std::path::Path;

fn touch(dir: &Path, name: &str) {
    fs::write(dir.join(name), b"artifact").expect("write");
}

fn combo(tags: &[&str]) -> Combination {
    Combination::new(tags.iter().copied(), "")
}

// =============================================================================
// TIER N0: STEM SANITIZATION
// =============================================================================

mod n0_sanitization {
    use super::*;

    /// N0.1: Illegal characters collapse to single separators.
    #[test]
    fn illegal_characters_in_filename() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut cache = NameCache::new();
        let name = next_name(
            &["A*B", "C:D"],
            ".png",
            dir.path(),
            CollisionPolicy::Append,
            &mut cache,
        )
        .expect("name");
        assert_eq!(name.filename(), "A_B_C_D_01.png");
        assert!(!dir.path().join(name.filename()).exists());
    }

    /// N0.2: Placeholder ids do not leak into stems.
    #[test]
    fn placeholder_ids_are_dropped() {
        assert_eq!(
            sanitize(&["input_2_no_id_", "Neutral", "Idle"]).as_str(),
            "Neutral_Idle"
        );
    }
}

// =============================================================================
// TIER N1: ENUMERATION
// =============================================================================

mod n1_enumeration {
    use super::*;

    /// N1.1: A new file bumps the next name, across caches.
    #[test]
    fn enumeration_follows_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let tags = ["Neutral", "Thinking"];

        let first = next_name(
            &tags,
            ".png",
            dir.path(),
            CollisionPolicy::Append,
            &mut NameCache::new(),
        )
        .expect("first");
        assert_eq!(first.filename(), "Neutral_Thinking_01.png");
        touch(dir.path(), first.filename());

        let second = next_name(
            &tags,
            ".png",
            dir.path(),
            CollisionPolicy::Append,
            &mut NameCache::new(),
        )
        .expect("second");
        assert_eq!(second.filename(), "Neutral_Thinking_02.png");
    }

    /// N1.2: Different tag sequences with one stem share the enumeration.
    #[test]
    fn distinct_tags_same_stem_share_indices() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut cache = NameCache::new();
        let a = next_name(&["Big Smile"], ".png", dir.path(), CollisionPolicy::Append, &mut cache)
            .expect("a");
        let b = next_name(&["Big", "Smile"], ".png", dir.path(), CollisionPolicy::Append, &mut cache)
            .expect("b");
        assert_eq!(a.filename(), "Big_Smile_01.png");
        assert_eq!(b.filename(), "Big_Smile_02.png");
    }

    /// N1.3: The 100th enumeration of a stem is refused.
    #[test]
    fn hundredth_enumeration_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut cache = NameCache::new();
        for expected in 1..=99u64 {
            let name = next_name(&["Crowd"], ".png", dir.path(), CollisionPolicy::Append, &mut cache)
                .expect("within capacity");
            assert_eq!(name.filename(), format!("Crowd_{:02}.png", expected));
        }
        let overflow = next_name(&["Crowd"], ".png", dir.path(), CollisionPolicy::Append, &mut cache);
        assert!(matches!(
            overflow,
            Err(StemslotError::CapacityExceeded { max: 99, .. })
        ));
    }

    /// N1.4: Skip never writes over an existing artifact.
    #[test]
    fn skip_leaves_existing_artifacts_alone() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "Neutral_Idle_01.webp");
        let outcome = next_name(
            &["Neutral", "Idle"],
            ".webp",
            dir.path(),
            CollisionPolicy::Skip,
            &mut NameCache::new(),
        )
        .expect("name");
        assert!(outcome.is_omitted());
    }
}

// =============================================================================
// TIER N2: EXISTENCE CLASSIFICATION
// =============================================================================

mod n2_classification {
    use super::*;

    /// N2.1: new-only drops the combination already on disk (any extension).
    #[test]
    fn new_only_skips_existing() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "Neutral_Idle_01.webp");

        let result = classify(
            vec![combo(&["Neutral", "Idle"]), combo(&["Happy", "Wave"])],
            dir.path(),
            SelectionPolicy::NewOnly,
        )
        .expect("classify");

        assert_eq!(result.kept, vec![combo(&["Happy", "Wave"])]);
        assert_eq!(result.skipped_count, 1);
        assert_eq!(result.kept_count, 1);
    }

    /// N2.2: Any recorded index marks the stem as existing.
    #[test]
    fn new_only_skips_on_other_index() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "Neutral_Idle_02.png");
        touch(dir.path(), "Angry_Attack_07.jpeg");

        let batch = vec![
            combo(&["Neutral", "Idle"]),
            combo(&["Happy", "Wave"]),
            combo(&["Angry", "Attack"]),
            combo(&["Calm", "Pose"]),
        ];
        let result = classify(batch, dir.path(), SelectionPolicy::NewOnly).expect("classify");

        assert_eq!(
            result.kept,
            vec![combo(&["Happy", "Wave"]), combo(&["Calm", "Pose"])]
        );
        assert_eq!(result.skipped_count, 2);
    }

    /// N2.3: single-first picks the first *new* item, not item 0.
    #[test]
    fn single_first_prefers_new() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "A_B_01.png");

        let batch = vec![combo(&["A", "B"]), combo(&["C"]), combo(&["D"])];
        let result = classify(batch, dir.path(), SelectionPolicy::SingleFirst).expect("classify");

        assert_eq!(result.kept, vec![combo(&["C"])]);
        assert_eq!(result.kept_count, 1);
    }

    /// N2.4: all keeps existing combinations.
    #[test]
    fn all_keeps_existing() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "Neutral_Idle_01.png");
        touch(dir.path(), "Happy_Wave_01.png");

        let batch = vec![combo(&["Neutral", "Idle"]), combo(&["Happy", "Wave"])];
        let result = classify(batch.clone(), dir.path(), SelectionPolicy::All).expect("classify");

        assert_eq!(result.kept, batch);
        assert_eq!(result.skipped_count, 0);
    }

    /// N2.5: Nothing left to generate is an error, not an empty batch.
    #[test]
    fn all_filtered_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "Neutral_Idle_01.png");

        let result = classify(
            vec![combo(&["Neutral", "Idle"])],
            dir.path(),
            SelectionPolicy::NewOnly,
        );
        assert!(matches!(result, Err(StemslotError::AllFiltered { total: 1 })));
    }

    /// N2.6: A missing directory means nothing exists yet.
    #[test]
    fn missing_directory_keeps_everything() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = classify(
            vec![combo(&["A"]), combo(&["B"])],
            &dir.path().join("later"),
            SelectionPolicy::NewOnly,
        )
        .expect("classify");
        assert_eq!(result.kept_count, 2);
    }
}

// =============================================================================
// TIER N3: ROUND TRIP
// =============================================================================

mod n3_round_trip {
    use super::*;

    /// N3.1: What append names, new-only recognizes.
    #[test]
    fn appended_name_is_detected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let tags = ["Surprised", "Jump"];
        let name = next_name(
            &tags,
            ".webp",
            dir.path(),
            CollisionPolicy::Append,
            &mut NameCache::new(),
        )
        .expect("name");
        touch(dir.path(), name.filename());

        let result = classify(
            vec![combo(&tags), combo(&["Calm"])],
            dir.path(),
            SelectionPolicy::NewOnly,
        )
        .expect("classify");
        assert_eq!(result.kept, vec![combo(&["Calm"])]);
    }

    /// N3.2: A suggested slot round-trips through its exact index.
    #[test]
    fn suggested_slot_is_detected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let name = next_name(
            &["Talking5"],
            ".png",
            dir.path(),
            CollisionPolicy::Append,
            &mut NameCache::new(),
        )
        .expect("name");
        assert_eq!(name.filename(), "Talking_05.png");
        touch(dir.path(), name.filename());

        let result = classify(
            vec![combo(&["Talking5"]), combo(&["Talking6"])],
            dir.path(),
            SelectionPolicy::NewOnly,
        )
        .expect("classify");
        assert_eq!(result.kept, vec![combo(&["Talking6"])]);
    }

    /// N3.3: A suggested slot already passed on disk enumerates past it, and
    /// the combination stays new until its own slot exists.
    #[test]
    fn displaced_suggestion_stays_new() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "Neutral_Talking_06.png");

        let name = next_name(
            &["Neutral", "Talking5"],
            ".png",
            dir.path(),
            CollisionPolicy::Append,
            &mut NameCache::new(),
        )
        .expect("name");
        assert_eq!(name.filename(), "Neutral_Talking_07.png");
        touch(dir.path(), name.filename());

        let result = classify(
            vec![combo(&["Neutral", "Talking5"]), combo(&["Neutral", "Talking7"])],
            dir.path(),
            SelectionPolicy::NewOnly,
        )
        .expect("classify");
        assert_eq!(result.kept, vec![combo(&["Neutral", "Talking5"])]);

        touch(dir.path(), "Neutral_Talking_05.png");
        let result = classify(
            vec![combo(&["Neutral", "Talking5"]), combo(&["Other"])],
            dir.path(),
            SelectionPolicy::NewOnly,
        )
        .expect("classify");
        assert_eq!(result.kept, vec![combo(&["Other"])]);
    }
}
