//! # Output Folder Resolver
//!
//! Turns a root path hint and a subfolder hint into an existing directory.
//!
//! The root is used verbatim (trimmed) and falls back to a configured
//! default. The subfolder is sanitized so that user input cannot smuggle
//! reserved characters or `..` into the path.

use crate::types::StemslotError;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static RESERVED_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[:*?"<>|]+"#).expect("reserved character pattern is valid"));

/// Sanitize a subfolder hint.
///
/// Runs of `: * ? " < > |` become `_`, surrounding whitespace is trimmed,
/// and every `.` is removed, so `"."`, `".."` and `"a/../b"` cannot climb
/// out of the root. Leading separators are dropped so the result always
/// joins *under* the root. May return an empty string.
pub fn sanitize_subfolder(sub: &str) -> String {
    let replaced = RESERVED_RUN.replace_all(sub, "_");
    let trimmed = replaced.trim();
    if trimmed == "." || trimmed == ".." {
        return String::new();
    }
    trimmed
        .replace('.', "")
        .trim_start_matches(['/', '\\'])
        .to_string()
}

/// The output directory for a root hint and subfolder hint. Nothing is
/// created.
///
/// - root: `path_hint` trimmed, or `default_root` when blank
/// - subfolder: [`sanitize_subfolder`] of `subfolder_hint`, joined under the
///   root when non-empty
pub fn output_directory_path(path_hint: &str, subfolder_hint: &str, default_root: &Path) -> PathBuf {
    let hint = path_hint.trim();
    let root = if hint.is_empty() {
        default_root.to_path_buf()
    } else {
        PathBuf::from(hint)
    };

    let subfolder = sanitize_subfolder(subfolder_hint);
    if subfolder.is_empty() {
        root
    } else {
        root.join(subfolder)
    }
}

/// Resolve the output directory with [`output_directory_path`] and create
/// it, root included, if absent.
pub fn resolve_output_directory(
    path_hint: &str,
    subfolder_hint: &str,
    default_root: &Path,
) -> Result<PathBuf, StemslotError> {
    let directory = output_directory_path(path_hint, subfolder_hint, default_root);
    create_dir(&directory)?;
    Ok(directory)
}

fn create_dir(path: &Path) -> Result<(), StemslotError> {
    std::fs::create_dir_all(path).map_err(|e| {
        StemslotError::IoError(format!(
            "cannot create output directory '{}': {}",
            path.display(),
            e
        ))
    })
}
