//! # stemslot CLI Module
//!
//! This module implements the CLI interface for stemslot.
//!
//! ## Available Commands
//!
//! - `name` - Print the filename the next artifact would get
//! - `scan` - Show the Directory Index of the target directory
//! - `classify` - Filter a manifest batch against the target directory
//! - `export` - Copy manifest source files into place under assigned names
//! - `serve` - Start the HTTP server

mod commands;

use crate::config::Config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use stemslot_core::StemslotError;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// stemslot - stable, collision-free names for generated artifacts
///
/// Derives filenames from tag sequences, enumerates same-stem artifacts
/// `_01` to `_99`, and filters planned batches against what is on disk.
#[derive(Parser, Debug)]
#[command(name = "stemslot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the configuration file (default: ./stemslot.toml if present)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Target directory flags shared by every file-system command.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Output root (default: `output_root` from the config)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Subfolder under the root (default: `subfolder` from the config)
    #[arg(short = 'S', long)]
    pub subfolder: Option<String>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the filename the next artifact would get (nothing is written)
    Name {
        /// Tag, repeatable; order determines the stem
        #[arg(short, long = "tag", required = true)]
        tags: Vec<String>,

        /// Extension with leading dot
        #[arg(short, long, default_value = ".png")]
        ext: String,

        /// Collision policy (append, overwrite, skip)
        #[arg(long)]
        on_exists: Option<String>,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Show the Directory Index of the target directory
    Scan {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Filter a manifest batch against the target directory
    Classify {
        /// JSON manifest: [{"tags": ..., "prompt": ...}, ...]
        #[arg(short, long)]
        manifest: PathBuf,

        /// Selection policy (all, new-only, single-first, single-last, single-random)
        #[arg(long)]
        selection: Option<String>,

        /// Seed for single-random
        #[arg(long)]
        seed: Option<u64>,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Copy manifest source files into the target directory under assigned names
    Export {
        /// JSON manifest: [{"tags": ..., "prompt": ..., "source": ...}, ...]
        #[arg(short, long)]
        manifest: PathBuf,

        /// Collision policy (append, overwrite, skip)
        #[arg(long)]
        on_exists: Option<String>,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Start HTTP server
    Serve {
        /// Host to bind to (default: `server.host` from the config)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (default: `server.port` from the config)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), StemslotError> {
    let config = Config::load(cli.config.as_deref())?;
    let output = OutputMode {
        json: cli.json_mode,
        verbose: cli.verbose,
    };

    match cli.command {
        Some(Commands::Name {
            tags,
            ext,
            on_exists,
            target,
        }) => cmd_name(&config, output, &tags, &ext, on_exists.as_deref(), &target),
        Some(Commands::Scan { target }) => cmd_scan(&config, output, &target),
        Some(Commands::Classify {
            manifest,
            selection,
            seed,
            target,
        }) => cmd_classify(
            &config,
            output,
            &manifest,
            selection.as_deref(),
            seed,
            &target,
        ),
        Some(Commands::Export {
            manifest,
            on_exists,
            target,
        }) => cmd_export(&config, output, &manifest, on_exists.as_deref(), &target),
        Some(Commands::Serve { host, port }) => cmd_serve(config, host, port).await,
        None => {
            // No subcommand - show the configured directory by default
            cmd_scan(&config, output, &TargetArgs::default())
        }
    }
}
