//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::TargetArgs;
use crate::api::{self, OneOrMany};
use crate::config::Config;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use stemslot_core::{
    ArtifactSink, Classifier, Combination, DirectoryIndex, ExportedFile, NameCache, NameOutcome,
    StemslotError, export_batch, next_name,
};

// =============================================================================
// OUTPUT
// =============================================================================

/// How results are printed.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputMode {
    /// Print JSON instead of text.
    pub json: bool,
    /// Include prompts and per-item detail in text output.
    pub verbose: bool,
}

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

/// Target directory for read-only commands; a missing one scans as empty.
fn locate_directory(config: &Config, target: &TargetArgs) -> PathBuf {
    config.locate_directory(target.output.as_deref(), target.subfolder.as_deref())
}

/// Target directory for `export`, created if absent.
fn target_directory(config: &Config, target: &TargetArgs) -> Result<PathBuf, StemslotError> {
    config.target_directory(target.output.as_deref(), target.subfolder.as_deref())
}

// =============================================================================
// MANIFEST
// =============================================================================

/// Maximum manifest size (16 MB).
const MAX_MANIFEST_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// One planned artifact in a JSON manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestItem {
    /// A single tag or an ordered list of tags.
    pub tags: OneOrMany<String>,
    #[serde(default)]
    pub prompt: String,
    /// File to copy into place (`export` only).
    #[serde(default)]
    pub source: Option<PathBuf>,
}

/// Canonicalize an input path and require a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, StemslotError> {
    let canonical = path.canonicalize().map_err(|e| {
        StemslotError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(StemslotError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Read and parse a JSON manifest.
pub fn load_manifest(path: &Path) -> Result<Vec<ManifestItem>, StemslotError> {
    let path = validate_file_path(path)?;
    let metadata = std::fs::metadata(&path)
        .map_err(|e| StemslotError::IoError(format!("Cannot read file metadata: {}", e)))?;
    if metadata.len() > MAX_MANIFEST_FILE_SIZE {
        return Err(StemslotError::Validation(format!(
            "Manifest size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            MAX_MANIFEST_FILE_SIZE
        )));
    }

    let text = std::fs::read_to_string(&path)
        .map_err(|e| StemslotError::IoError(format!("Cannot read manifest: {}", e)))?;
    serde_json::from_str(&text)
        .map_err(|e| StemslotError::Validation(format!("Invalid manifest: {}", e)))
}

// =============================================================================
// NAME COMMAND
// =============================================================================

/// Print the filename the next artifact with `tags` would get.
pub fn cmd_name(
    config: &Config,
    output: OutputMode,
    tags: &[String],
    ext: &str,
    on_exists: Option<&str>,
    target: &TargetArgs,
) -> Result<(), StemslotError> {
    let policy = config.collision_policy(on_exists)?;
    let directory = locate_directory(config, target);
    let outcome = next_name(tags, ext, &directory, policy, &mut NameCache::new())?;

    if output.json {
        print_json(&serde_json::json!({
            "directory": directory.display().to_string(),
            "policy": policy.as_str(),
            "name": outcome,
        }));
        return Ok(());
    }

    match outcome {
        NameOutcome::Assigned(name) if name.replaces_existing => {
            println!("{} (replaces existing file)", name.filename);
        }
        NameOutcome::Assigned(name) => println!("{}", name.filename),
        NameOutcome::Omitted { filename } => {
            println!("{} (exists, would be skipped)", filename);
        }
    }
    Ok(())
}

// =============================================================================
// SCAN COMMAND
// =============================================================================

/// Show the Directory Index of the target directory.
pub fn cmd_scan(
    config: &Config,
    output: OutputMode,
    target: &TargetArgs,
) -> Result<(), StemslotError> {
    let directory = locate_directory(config, target);
    let index = DirectoryIndex::scan(&directory);

    if output.json {
        print_json(&serde_json::json!({
            "directory": directory.display().to_string(),
            "stem_count": index.stem_count(),
            "file_count": index.file_count(),
            "stems": index.to_map(),
        }));
        return Ok(());
    }

    println!("Directory: {}", directory.display());
    println!(
        "Stems: {}  Files: {}",
        index.stem_count(),
        index.file_count()
    );
    for (stem, indices) in index.to_map() {
        let rendered: Vec<String> = indices.iter().map(|i| format!("{:02}", i)).collect();
        println!("  {}: {}", stem, rendered.join(", "));
    }
    Ok(())
}

// =============================================================================
// CLASSIFY COMMAND
// =============================================================================

/// Filter a manifest batch against the target directory.
pub fn cmd_classify(
    config: &Config,
    output: OutputMode,
    manifest: &Path,
    selection: Option<&str>,
    seed: Option<u64>,
    target: &TargetArgs,
) -> Result<(), StemslotError> {
    let selection = config.selection_policy(selection)?;
    let batch: Vec<Combination> = load_manifest(manifest)?
        .into_iter()
        .map(|item| Combination::new(item.tags.into_vec(), item.prompt))
        .collect();
    let directory = locate_directory(config, target);

    let classifier = match seed {
        Some(seed) => Classifier::new(selection).with_seed(seed),
        None => Classifier::new(selection),
    };
    let classification = classifier.classify(batch, &directory)?;

    if output.json {
        print_json(&serde_json::json!({
            "directory": directory.display().to_string(),
            "selection": selection.as_str(),
            "kept": classification.kept,
            "kept_count": classification.kept_count,
            "skipped_count": classification.skipped_count,
            "summary": classification.summary,
        }));
        return Ok(());
    }

    println!("{}", classification.summary);
    for combination in &classification.kept {
        if output.verbose && !combination.prompt.is_empty() {
            println!("  {}  {}", combination.tags.join(", "), combination.prompt);
        } else {
            println!("  {}", combination.tags.join(", "));
        }
    }
    Ok(())
}

// =============================================================================
// EXPORT COMMAND
// =============================================================================

/// Copies source files into place.
///
/// A source that already is the destination file (an overwrite of itself)
/// is left alone and counted in `in_place`.
#[derive(Debug, Default)]
pub struct FileCopySink {
    pub copied: usize,
    pub in_place: usize,
}

/// Both paths exist and resolve to the same file.
fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

impl ArtifactSink<PathBuf> for FileCopySink {
    fn persist(&mut self, artifact: &PathBuf, path: &Path) -> Result<(), StemslotError> {
        if same_file(artifact, path) {
            tracing::debug!(path = %path.display(), "Source is already in place");
            self.in_place += 1;
            return Ok(());
        }
        std::fs::copy(artifact, path).map_err(|e| {
            StemslotError::IoError(format!(
                "Cannot copy '{}' to '{}': {}",
                artifact.display(),
                path.display(),
                e
            ))
        })?;
        self.copied += 1;
        Ok(())
    }
}

/// Manifest items sharing one extension.
#[derive(Debug, Default)]
struct ExportGroup {
    sources: Vec<PathBuf>,
    tags: Vec<Vec<String>>,
    prompts: Vec<String>,
}

/// `.ext` of a source file.
fn source_extension(path: &Path) -> Result<String, StemslotError> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
        .ok_or_else(|| {
            StemslotError::Validation(format!(
                "Source '{}' has no usable extension",
                path.display()
            ))
        })
}

/// Copy every manifest item's source into the target directory under its
/// assigned name. Each file keeps its own extension.
///
/// All sources are checked before anything is copied. Items are exported
/// grouped by extension, in manifest order within each group.
pub fn cmd_export(
    config: &Config,
    output: OutputMode,
    manifest: &Path,
    on_exists: Option<&str>,
    target: &TargetArgs,
) -> Result<(), StemslotError> {
    let policy = config.collision_policy(on_exists)?;
    let items = load_manifest(manifest)?;

    let mut groups: BTreeMap<String, ExportGroup> = BTreeMap::new();
    for (position, item) in items.into_iter().enumerate() {
        let source = item.source.ok_or_else(|| {
            StemslotError::Validation(format!("Manifest item {} has no 'source'", position))
        })?;
        let source = validate_file_path(&source)?;
        let group = groups.entry(source_extension(&source)?).or_default();
        group.sources.push(source);
        group.tags.push(item.tags.into_vec());
        group.prompts.push(item.prompt);
    }

    let directory = target_directory(config, target)?;
    let mut sink = FileCopySink::default();
    let mut saved: Vec<ExportedFile> = Vec::new();
    let mut skipped = 0;
    for (ext, group) in &groups {
        let report = export_batch(
            &group.sources,
            &group.tags,
            &group.prompts,
            ext,
            &directory,
            policy,
            &mut sink,
        )?;
        skipped += report.skipped;
        saved.extend(report.saved);
    }

    if output.json {
        print_json(&serde_json::json!({
            "directory": directory.display().to_string(),
            "policy": policy.as_str(),
            "saved": saved,
            "skipped": skipped,
        }));
        return Ok(());
    }

    println!(
        "Exported {} file(s) to {} ({} skipped, {} already in place)",
        sink.copied,
        directory.display(),
        skipped,
        sink.in_place
    );
    for file in &saved {
        let marker = if file.replaced_existing {
            " (replaced)"
        } else {
            ""
        };
        if output.verbose && !file.prompt.is_empty() {
            println!("  {}{}  {}", file.filename, marker, file.prompt);
        } else {
            println!("  {}{}", file.filename, marker);
        }
    }
    Ok(())
}

// =============================================================================
// SERVE COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_serve(
    mut config: Config,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), StemslotError> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    let addr = config.server.addr();

    println!("stemslot HTTP Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Address:     {}", addr);
    println!("  Output root: {}", config.output_root.display());
    println!("  On exists:   {}", config.on_exists);
    println!("  Selection:   {}", config.selection);
    println!();
    println!("Endpoints:");
    println!("  GET  /health   - Health check");
    println!("  POST /names    - Plan filenames");
    println!("  POST /classify - Filter a planned batch");
    println!("  POST /scan     - Directory Index");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    api::run_server(&addr, config).await
}

// =============================================================================
// TESTS
// =============================================================================
