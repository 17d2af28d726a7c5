//! Configuration loading and data folder resolution
//!
//! Bootstrap settings come from a TOML file. A missing file is not an error:
//! callers get compiled defaults and a warning. A file that exists but cannot
//! be parsed is a `Config` error.
//!
//! # Lookup order for the TOML file
//!
//! 1. Explicit path (command-line `--config`)
//! 2. `SONGDECK_CONFIG` environment variable
//! 3. `<config_dir>/songdeck/config.toml`

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the TOML config file
pub const CONFIG_ENV_VAR: &str = "SONGDECK_CONFIG";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Song library JSON document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_path: Option<PathBuf>,

    /// Newline-delimited list of requested songs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets_path: Option<PathBuf>,

    /// Folder holding the selection, version and order caches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_folder: Option<PathBuf>,

    /// Optional JSON export of the compiled songs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,

    #[serde(default)]
    pub matching: MatchingConfig,

    #[serde(default)]
    pub lyrics: LyricsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Orientation of the `books[0].songs` mapping in the library document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookKeys {
    /// `{ "<song id>": "<hymn number>" }` (songbase dumps)
    #[default]
    SongId,
    /// `{ "<hymn number>": "<song id>" }`
    HymnNumber,
}

/// Song matching settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Minimum similarity for a fuzzy title match
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,

    /// Present fuzzy matches to the operator before accepting them
    #[serde(default = "default_true")]
    pub confirm_fuzzy_matches: bool,

    #[serde(default)]
    pub book_keys: BookKeys,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: default_fuzzy_threshold(),
            confirm_fuzzy_matches: true,
            book_keys: BookKeys::default(),
        }
    }
}

/// Lyric structuring settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricsConfig {
    /// Repeat a song's single chorus after every stanza
    #[serde(default = "default_true")]
    pub repeat_choruses: bool,
}

impl Default for LyricsConfig {
    fn default() -> Self {
        Self { repeat_choruses: true }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_fuzzy_threshold() -> f64 {
    0.80
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse TOML text and validate value ranges
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let threshold = self.matching.fuzzy_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(Error::Config(format!(
                "matching.fuzzy_threshold must be within 0.0-1.0 (got {})",
                threshold
            )));
        }
        Ok(())
    }
}

/// Locate the TOML config file: explicit path, then env var, then platform config dir.
///
/// Returns `None` when nothing is configured and the platform default does not exist.
pub fn locate_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    default_config_path().filter(|p| p.exists())
}

/// `<config_dir>/songdeck/config.toml` for the current platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("songdeck").join("config.toml"))
}

/// Where the loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),
    /// This file was named but does not exist; compiled defaults used
    Missing(PathBuf),
    /// No file configured and none at the platform default; compiled defaults used
    Defaults,
}

impl ConfigSource {
    /// Report the source. Call once a subscriber is installed; logging
    /// settings come from the config itself, so loading cannot log.
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!(path = %path.display(), "Loaded TOML configuration"),
            ConfigSource::Missing(path) => {
                warn!(path = %path.display(), "Config file not found, using compiled defaults")
            }
            ConfigSource::Defaults => info!("No config file found, using compiled defaults"),
        }
    }
}

/// Load TOML config, falling back to defaults when the file is missing.
///
/// A located file that exists but fails to parse is an error; a missing file
/// yields `TomlConfig::default()` and `ConfigSource::Missing`.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<(TomlConfig, ConfigSource)> {
    let Some(path) = locate_config_file(explicit) else {
        return Ok((TomlConfig::default(), ConfigSource::Defaults));
    };

    if !path.exists() {
        return Ok((TomlConfig::default(), ConfigSource::Missing(path)));
    }

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Failed to read config file {}: {}", path.display(), e)))?;
    let config = TomlConfig::from_toml_str(&content)?;
    Ok((config, ConfigSource::File(path)))
}

/// Write a TOML config atomically (temp file + rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Failed to serialize TOML: {}", e)))?;
    crate::store::write_atomic(path, content.as_bytes())
}

/// Get OS-dependent default data folder path
pub fn get_default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("songdeck"))
        .unwrap_or_else(|| PathBuf::from("./songdeck_data"))
}
