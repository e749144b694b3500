//! # stemslot
//!
//! Stable, collision-free filenames for tag-keyed generated artifacts.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │            apps/stemslot (THE BINARY)         │
//! │                                               │
//! │   ┌─────────────┐          ┌─────────────┐    │
//! │   │    CLI      │          │  HTTP API   │    │
//! │   │   (clap)    │          │   (axum)    │    │
//! │   └──────┬──────┘          └──────┬──────┘    │
//! │          └───────────┬────────────┘           │
//! │                      ▼                        │
//! │             ┌─────────────────┐               │
//! │             │  stemslot-core  │               │
//! │             │  (THE ENGINE)   │               │
//! │             └─────────────────┘               │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Next name for a combination
//! stemslot name -t Neutral -t Thinking --ext .png
//!
//! # Filter a planned batch against the output folder
//! stemslot classify -m batch.json --selection new-only
//!
//! # Start the HTTP server
//! stemslot serve --host 0.0.0.0 --port 8080
//! ```

use clap::Parser;
use stemslot::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // STEMSLOT_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("STEMSLOT_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "stemslot=info,stemslot_core=info,tower_http=debug".into());

    // Logs go to stderr so --json-mode output stays parseable.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!(kind = e.kind(), "Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    eprintln!("stemslot v{}", env!("CARGO_PKG_VERSION"));
}
