//! # Configuration
//!
//! `stemslot.toml`, parsed with `toml` + `serde`.
//!
//! ## Lookup order
//!
//! 1. `--config <path>` (must exist)
//! 2. `./stemslot.toml` if present
//! 3. built-in defaults
//!
//! CLI flags and request fields override the values loaded here.
//!
//! ```toml
//! output_root = "output"
//! subfolder = "Avatars/Default"
//! on_exists = "append"
//! selection = "new-only"
//!
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//! rate_limit = 100
//! ```
//!
//! ## Target directories
//!
//! The CLI may point `--output` anywhere and only `export` creates the
//! directory. HTTP requests go through [`Config::request_directory`], which
//! keeps every target under `output_root` and never creates it.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};
use stemslot_core::{
    CollisionPolicy, SelectionPolicy, StemslotError, output_directory_path,
    resolve_output_directory,
};

/// File looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "stemslot.toml";

/// Maximum config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

// =============================================================================
// CONFIG
// =============================================================================

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Root used when no output path is given.
    pub output_root: PathBuf,
    /// Default subfolder under the root (sanitized on use).
    pub subfolder: String,
    /// Default collision policy.
    pub on_exists: CollisionPolicy,
    /// Default selection policy.
    pub selection: SelectionPolicy,
    pub server: ServerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("output"),
            subfolder: "Avatars/Default".to_string(),
            on_exists: CollisionPolicy::default(),
            selection: SelectionPolicy::default(),
            server: ServerConfig::default(),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Requests per second across all clients; `0` disables throttling.
    pub rate_limit: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            rate_limit: 100,
        }
    }
}

impl ServerConfig {
    /// `host:port` for binding.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    /// Load configuration following the lookup order above.
    pub fn load(path: Option<&Path>) -> Result<Self, StemslotError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let local = Path::new(CONFIG_FILE_NAME);
                if local.is_file() {
                    Self::from_file(local)
                } else {
                    tracing::debug!("No {} found, using defaults", CONFIG_FILE_NAME);
                    Ok(Self::default())
                }
            }
        }
    }

    /// Read and parse a config file.
    pub fn from_file(path: &Path) -> Result<Self, StemslotError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            StemslotError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(StemslotError::Validation(format!(
                "Config file size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let text = std::fs::read_to_string(path).map_err(|e| {
            StemslotError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse config from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, StemslotError> {
        toml::from_str(text)
            .map_err(|e| StemslotError::Validation(format!("Invalid configuration: {}", e)))
    }

    /// The target directory, without touching the filesystem.
    ///
    /// `output` replaces `output_root` when given and non-blank; `subfolder`
    /// replaces the configured subfolder when given, even if empty.
    pub fn locate_directory(&self, output: Option<&str>, subfolder: Option<&str>) -> PathBuf {
        output_directory_path(
            output.unwrap_or_default(),
            subfolder.unwrap_or(&self.subfolder),
            &self.output_root,
        )
    }

    /// [`Config::locate_directory`], creating the directory if absent.
    pub fn target_directory(
        &self,
        output: Option<&str>,
        subfolder: Option<&str>,
    ) -> Result<PathBuf, StemslotError> {
        resolve_output_directory(
            output.unwrap_or_default(),
            subfolder.unwrap_or(&self.subfolder),
            &self.output_root,
        )
    }

    /// Target directory for a remote caller. Nothing is created.
    ///
    /// A relative `output` is taken under `output_root`; an absolute one must
    /// already lie inside it once symlinks are resolved. `..` components are
    /// rejected outright.
    pub fn request_directory(
        &self,
        output: Option<&str>,
        subfolder: Option<&str>,
    ) -> Result<PathBuf, StemslotError> {
        let hint = Path::new(output.map(str::trim).unwrap_or_default());
        if hint.components().any(|c| c == Component::ParentDir) {
            return Err(StemslotError::Validation(format!(
                "output '{}' must not contain '..'",
                hint.display()
            )));
        }

        let root = if hint.as_os_str().is_empty() {
            self.output_root.clone()
        } else {
            self.output_root.join(hint)
        };
        let directory = output_directory_path("", subfolder.unwrap_or(&self.subfolder), &root);

        let bound = resolve_existing(&self.output_root)?;
        if !resolve_existing(&directory)?.starts_with(&bound) {
            return Err(StemslotError::Validation(format!(
                "output '{}' is outside the output root '{}'",
                directory.display(),
                self.output_root.display()
            )));
        }
        Ok(directory)
    }

    /// `flag` parsed as a collision policy, else the configured one.
    pub fn collision_policy(&self, flag: Option<&str>) -> Result<CollisionPolicy, StemslotError> {
        Ok(flag.map(str::parse::<CollisionPolicy>).transpose()?.unwrap_or(self.on_exists))
    }

    /// `flag` parsed as a selection policy, else the configured one.
    pub fn selection_policy(&self, flag: Option<&str>) -> Result<SelectionPolicy, StemslotError> {
        Ok(flag.map(str::parse::<SelectionPolicy>).transpose()?.unwrap_or(self.selection))
    }
}

/// Canonical form of `path` when it may not exist yet: the longest existing
/// ancestor is canonicalized and the missing tail re-appended.
fn resolve_existing(path: &Path) -> Result<PathBuf, StemslotError> {
    let absolute = std::path::absolute(path).map_err(|e| {
        StemslotError::IoError(format!("Cannot resolve '{}': {}", path.display(), e))
    })?;

    let mut missing: Vec<OsString> = Vec::new();
    let mut current = absolute.as_path();
    loop {
        if let Ok(canonical) = current.canonicalize() {
            return Ok(missing
                .iter()
                .rev()
                .fold(canonical, |acc, part| acc.join(part)));
        }
        match (current.parent(), current.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                current = parent;
            }
            _ => return Ok(absolute),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
