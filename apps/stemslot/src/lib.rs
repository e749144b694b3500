//! # stemslot
//!
//! CLI and HTTP front ends for the `stemslot-core` naming engine.
//!
//! - [`cli`]: clap commands (`name`, `scan`, `classify`, `export`, `serve`)
//! - [`api`]: axum router over the same engine operations
//! - [`config`]: `stemslot.toml` defaults shared by both

pub mod api;
pub mod cli;
pub mod config;
