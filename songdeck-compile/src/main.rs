//! songdeck-compile - Song list compiler
//!
//! Reads a target list and a song library, resolves every request to a
//! library song (asking the operator when the match is uncertain), and
//! produces structured lyrics plus an alphabetical index.

use anyhow::{Context, Result};
use clap::Parser;
use songdeck_common::config::{load_toml_config, write_toml_config, LoggingConfig};
use songdeck_common::Error;
use songdeck_compile::config::{CompileSettings, ConfigOverrides};
use songdeck_compile::decision::{ConsoleDecisionProvider, DecisionProvider, NonInteractiveDecisionProvider};
use songdeck_compile::services::LibraryIndex;
use songdeck_compile::{report, Pipeline, PipelineStores};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "songdeck-compile", version, about = "Compile a song list into structured lyrics")]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "SONGDECK_CONFIG")]
    config: Option<PathBuf>,

    /// Song library JSON document
    #[arg(short, long, env = "SONGDECK_LIBRARY")]
    library: Option<PathBuf>,

    /// Target list, one requested song per line
    #[arg(short, long, env = "SONGDECK_TARGETS")]
    targets: Option<PathBuf>,

    /// Folder for remembered selections, versions and song order
    #[arg(short, long, env = "SONGDECK_DATA_FOLDER")]
    data_folder: Option<PathBuf>,

    /// Write compiled songs and index as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Minimum similarity for a fuzzy match (0.0-1.0)
    #[arg(long)]
    fuzzy_threshold: Option<f64>,

    /// Accept fuzzy matches without asking
    #[arg(long)]
    no_confirm_fuzzy: bool,

    /// Keep sections in parsed order instead of repeating the chorus
    #[arg(long)]
    no_repeat_choruses: bool,

    /// Never prompt: skip uncertain matches, use first lyric versions
    #[arg(long)]
    non_interactive: bool,

    /// Write the effective configuration (file plus flags) as TOML and exit
    #[arg(long, value_name = "PATH")]
    write_config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let (toml_config, config_source) =
        load_toml_config(args.config.as_deref()).context("Failed to load configuration")?;
    init_logging(&toml_config.logging)?;

    info!("Starting songdeck-compile");
    info!(
        "Version: {} (git {}, built {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    config_source.log();

    let overrides = ConfigOverrides {
        library_path: args.library,
        targets_path: args.targets,
        data_folder: args.data_folder,
        output_path: args.output,
        fuzzy_threshold: args.fuzzy_threshold,
        no_confirm_fuzzy: args.no_confirm_fuzzy,
        no_repeat_choruses: args.no_repeat_choruses,
    };

    if let Some(path) = &args.write_config {
        let merged = overrides.apply_to(&toml_config);
        merged.validate().context("Invalid configuration")?;
        write_toml_config(&merged, path)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let settings = CompileSettings::resolve(&toml_config, overrides).context("Invalid configuration")?;

    let library = LibraryIndex::load(&settings.library_path, settings.book_keys)
        .with_context(|| format!("Failed to load library {}", settings.library_path.display()))?;
    let targets = std::fs::read_to_string(&settings.targets_path)
        .with_context(|| format!("Failed to read target list {}", settings.targets_path.display()))?;

    let mut provider: Box<dyn DecisionProvider> = if args.non_interactive {
        Box::new(NonInteractiveDecisionProvider)
    } else {
        Box::new(ConsoleDecisionProvider::stdio())
    };

    let pipeline = Pipeline::new(
        settings.pipeline.clone(),
        library,
        PipelineStores::in_folder(&settings.data_folder),
    );
    let outcome = match pipeline.run(&targets, provider.as_mut()) {
        Ok(outcome) => outcome,
        Err(Error::Aborted(reason)) => {
            info!(reason = %reason, "Run aborted by operator");
            println!("\nOperation cancelled by user.");
            return Ok(());
        }
        Err(e) => return Err(e).context("Compile failed"),
    };

    print!("{}", report::render(&outcome));

    if let Some(path) = &settings.output_path {
        report::write_export(path, &outcome)
            .with_context(|| format!("Failed to write output {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}

/// Logging to stderr, or to the configured file; `RUST_LOG` wins over the TOML level
fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "songdeck_compile={level},songdeck_common={level}",
            level = logging.level
        ))
    });

    match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
    Ok(())
}
