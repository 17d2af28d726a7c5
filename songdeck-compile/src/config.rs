//! Configuration resolution for songdeck-compile
//!
//! Priority per value: command line / environment → TOML → compiled default.
//! Command line and environment are merged by clap before they reach here.

use crate::workflow::PipelineConfig;
use songdeck_common::config::{get_default_data_folder, BookKeys, TomlConfig};
use songdeck_common::{Error, Result};
use std::path::PathBuf;
use tracing::{debug, info};

/// Default library file, relative to the working directory
pub const DEFAULT_LIBRARY_FILE: &str = "songs.json";
/// Default target list, relative to the working directory
pub const DEFAULT_TARGETS_FILE: &str = "target_songs.txt";

/// Values given on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub library_path: Option<PathBuf>,
    pub targets_path: Option<PathBuf>,
    pub data_folder: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
    pub fuzzy_threshold: Option<f64>,
    pub no_confirm_fuzzy: bool,
    pub no_repeat_choruses: bool,
}

impl ConfigOverrides {
    /// `toml` with these overrides folded in, for writing back as a config file
    pub fn apply_to(&self, toml: &TomlConfig) -> TomlConfig {
        let mut merged = toml.clone();
        if let Some(path) = &self.library_path {
            merged.library_path = Some(path.clone());
        }
        if let Some(path) = &self.targets_path {
            merged.targets_path = Some(path.clone());
        }
        if let Some(path) = &self.data_folder {
            merged.data_folder = Some(path.clone());
        }
        if let Some(path) = &self.output_path {
            merged.output_path = Some(path.clone());
        }
        if let Some(threshold) = self.fuzzy_threshold {
            merged.matching.fuzzy_threshold = threshold;
        }
        if self.no_confirm_fuzzy {
            merged.matching.confirm_fuzzy_matches = false;
        }
        if self.no_repeat_choruses {
            merged.lyrics.repeat_choruses = false;
        }
        merged
    }
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct CompileSettings {
    pub library_path: PathBuf,
    pub targets_path: PathBuf,
    pub data_folder: PathBuf,
    pub output_path: Option<PathBuf>,
    pub book_keys: BookKeys,
    pub pipeline: PipelineConfig,
}

impl CompileSettings {
    pub fn resolve(toml: &TomlConfig, overrides: ConfigOverrides) -> Result<Self> {
        let library_path = pick("library_path", overrides.library_path, toml.library_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LIBRARY_FILE));
        let targets_path = pick("targets_path", overrides.targets_path, toml.targets_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TARGETS_FILE));
        let data_folder = pick("data_folder", overrides.data_folder, toml.data_folder.clone())
            .unwrap_or_else(get_default_data_folder);
        let output_path = pick("output_path", overrides.output_path, toml.output_path.clone());

        let fuzzy_threshold = overrides.fuzzy_threshold.unwrap_or(toml.matching.fuzzy_threshold);
        if !(0.0..=1.0).contains(&fuzzy_threshold) {
            return Err(Error::Config(format!(
                "fuzzy_threshold must be between 0.0 and 1.0, got {}",
                fuzzy_threshold
            )));
        }

        let settings = Self {
            library_path,
            targets_path,
            data_folder,
            output_path,
            book_keys: toml.matching.book_keys,
            pipeline: PipelineConfig {
                fuzzy_threshold,
                confirm_fuzzy_matches: toml.matching.confirm_fuzzy_matches && !overrides.no_confirm_fuzzy,
                repeat_choruses: toml.lyrics.repeat_choruses && !overrides.no_repeat_choruses,
            },
        };

        info!(
            library = %settings.library_path.display(),
            targets = %settings.targets_path.display(),
            data_folder = %settings.data_folder.display(),
            "Configuration resolved"
        );
        Ok(settings)
    }
}

fn pick(name: &str, cli_or_env: Option<PathBuf>, toml: Option<PathBuf>) -> Option<PathBuf> {
    match (cli_or_env, toml) {
        (Some(value), _) => {
            debug!(setting = name, source = "command line/environment", "Setting resolved");
            Some(value)
        }
        (None, Some(value)) => {
            debug!(setting = name, source = "TOML", "Setting resolved");
            Some(value)
        }
        (None, None) => None,
    }
}
