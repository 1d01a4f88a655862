//! Configuration file loading.
//!
//! Settings come from an optional `fglscope.json`. Every field has a
//! default, so a missing file or a partial file is fine.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// File name looked up in the analyzed root.
pub const CONFIG_FILE_NAME: &str = "fglscope.json";

/// Errors that can occur while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiagnosticsConfig {
    /// Report unused variables at all.
    pub enable: bool,
    /// Quiet period before the watch host re-analyzes.
    pub delay_ms: u64,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            enable: true,
            delay_ms: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkspaceConfig {
    /// Source file extensions, compared case-insensitively.
    pub extensions: Vec<String>,
    pub ignore_dirs: Vec<String>,
    /// Cap on files searched by cross-file definition lookup.
    pub max_files: usize,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["4gl".to_string()],
            ignore_dirs: ["node_modules", ".git", "target", "build", "dist"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_files: 500,
        }
    }
}

impl WorkspaceConfig {
    /// Returns true if the path has one of the configured extensions.
    pub fn is_source_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    /// Returns true if a directory with this name should not be entered.
    pub fn is_ignored_dir(&self, name: &str) -> bool {
        self.ignore_dirs.iter().any(|d| d == name)
    }
}

impl Config {
    /// Parses configuration from JSON text.
    pub fn from_json(text: &str, path: &Path) -> ConfigResult<Self> {
        serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads configuration from an explicit file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text, path)
    }

    /// Loads `fglscope.json` from `root` if present, defaults otherwise.
    pub fn discover(root: &Path) -> ConfigResult<Self> {
        let candidate = root.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            debug!(path = %candidate.display(), "loading config");
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }
}
