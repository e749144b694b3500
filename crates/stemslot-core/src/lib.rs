//! # stemslot-core
//!
//! The naming and deduplication engine for tag-keyed generated artifacts.
//!
//! Given an ordered sequence of free-form tags per artifact (a "combination"),
//! this crate:
//! - sanitizes the tags into a filesystem-safe stem (`sanitizer`)
//! - assigns a zero-padded enumeration suffix that is unique within a batch
//!   and against files already on disk (`naming`)
//! - scans a target directory once to decide which planned combinations
//!   already have an artifact, and reduces the batch per a selection policy
//!   (`classifier`)
//!
//! ## Architectural Constraints
//!
//! - Synchronous, no network: every operation is one directory listing plus
//!   in-memory work
//! - No process-wide state: the per-batch naming cache is owned by the caller
//! - The engine decides *where* and *whether* an artifact is written, never
//!   *how*; writing is delegated to an [`ArtifactSink`]

// =============================================================================
// MODULES
// =============================================================================

pub mod classifier;
pub mod export;
pub mod folder;
pub mod naming;
pub mod primitives;
pub mod sanitizer;
pub mod scan;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    CollisionPolicy, Combination, EnumerationIndex, SelectionPolicy, Stem, StemslotError,
    broadcast_prompts,
};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use classifier::{Classification, Classifier, classify, is_existing};
pub use export::{ArtifactSink, ExportReport, ExportedFile, export_batch};
pub use folder::{output_directory_path, resolve_output_directory, sanitize_subfolder};
pub use naming::{AssignedName, NameCache, NameOutcome, next_name, render_filename};
pub use sanitizer::{StemParts, sanitize, split_suggested_index};
pub use scan::{DirectoryIndex, EnumeratedName, parse_enumerated};
