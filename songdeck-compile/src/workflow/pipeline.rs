//! Pipeline orchestrator
//!
//! Owns the library and the three decision stores for one run. Stages run
//! strictly in sequence; only resolution, version choice and order editing
//! wait on the operator.
//!
//! # Error Handling
//! - Per-request problems are collected in the outcome, never returned
//! - Unreadable caches start empty (logged)
//! - Failed cache writes are logged; the decision still applies to this run
//! - Only an operator abort (`Error::Aborted`) stops a run part way

use super::{AttentionNote, CompileOutcome, LyricStructurer};
use crate::decision::DecisionProvider;
use crate::models::{ResolvedMatch, UncertainMatch};
use crate::services::request_parser::parse_targets;
use crate::services::{
    AlphabeticalIndexer, InteractiveResolver, LibraryIndex, LyricVersionCache, MatchEngine, ResolutionCache,
    DEFAULT_FUZZY_THRESHOLD,
};
use songdeck_common::{DocumentStore, JsonFileStore, MemoryStore, Result};
use std::path::Path;
use tracing::{info, warn};

/// File name of the song selection cache inside the data folder
pub const SELECTIONS_FILE: &str = "selected_songs.json";
/// File name of the lyric version cache inside the data folder
pub const VERSIONS_FILE: &str = "lyric_versions.json";
/// File name of the saved alphabetical order inside the data folder
pub const ORDER_FILE: &str = "song_order.json";

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Minimum similarity for a fuzzy match (0.0-1.0)
    pub fuzzy_threshold: f64,
    /// Send fuzzy matches to the operator for confirmation
    pub confirm_fuzzy_matches: bool,
    /// Repeat a song's single chorus after each stanza
    pub repeat_choruses: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            confirm_fuzzy_matches: true,
            repeat_choruses: true,
        }
    }
}

/// Backing stores for the remembered operator decisions
pub struct PipelineStores {
    pub selections: Box<dyn DocumentStore>,
    pub versions: Box<dyn DocumentStore>,
    pub order: Box<dyn DocumentStore>,
}

impl PipelineStores {
    /// JSON files inside `data_folder`
    pub fn in_folder(data_folder: &Path) -> Self {
        Self {
            selections: Box::new(JsonFileStore::new(data_folder.join(SELECTIONS_FILE))),
            versions: Box::new(JsonFileStore::new(data_folder.join(VERSIONS_FILE))),
            order: Box::new(JsonFileStore::new(data_folder.join(ORDER_FILE))),
        }
    }

    /// Fresh in-memory stores (nothing remembered, nothing persisted)
    pub fn in_memory() -> Self {
        Self {
            selections: Box::new(MemoryStore::new()),
            versions: Box::new(MemoryStore::new()),
            order: Box::new(MemoryStore::new()),
        }
    }
}

/// One compile run over a library
pub struct Pipeline {
    config: PipelineConfig,
    library: LibraryIndex,
    stores: PipelineStores,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, library: LibraryIndex, stores: PipelineStores) -> Self {
        Self {
            config,
            library,
            stores,
        }
    }

    /// Compile a target list
    ///
    /// # Arguments
    /// * `targets` - Target list text, one request per line
    /// * `provider` - Source of operator decisions
    pub fn run(self, targets: &str, provider: &mut dyn DecisionProvider) -> Result<CompileOutcome> {
        let Pipeline {
            config,
            library,
            stores,
        } = self;

        // Stage 1: requests
        let requests = parse_targets(targets);
        info!(requests = requests.len(), songs = library.len(), "Compiling target list");

        // Stage 2: matching
        let report = MatchEngine::new(&library, config.fuzzy_threshold).match_all(&requests);

        let mut resolved: Vec<ResolvedMatch> = report.exact_by_number;
        resolved.extend(report.exact_by_title);

        let mut uncertain: Vec<UncertainMatch> = report.ambiguous.into_iter().map(UncertainMatch::Ambiguous).collect();
        for matched in report.fuzzy {
            match library.get(matched.song_id) {
                Some(song) if config.confirm_fuzzy_matches => uncertain.push(UncertainMatch::Fuzzy {
                    song: song.clone(),
                    matched,
                }),
                _ => resolved.push(matched),
            }
        }

        // Stage 3: operator resolution
        let mut selections = ResolutionCache::load(stores.selections);
        let resolution = InteractiveResolver::new(&library, &mut selections).resolve_all(uncertain, provider)?;
        if let Err(e) = selections.flush() {
            warn!(error = %e, "Failed to save song selections");
        }

        resolved.extend(resolution.resolved);
        resolved.sort_by_key(ResolvedMatch::line_number);

        // Stage 4: lyrics
        let mut structurer = LyricStructurer::new(LyricVersionCache::load(stores.versions), config.repeat_choruses);
        let mut compiled = Vec::with_capacity(resolved.len());
        for matched in &resolved {
            compiled.push(structurer.structure(matched, provider)?);
        }

        let attention: Vec<AttentionNote> = compiled.iter().flat_map(AttentionNote::for_song).collect();
        for note in &attention {
            warn!(position = note.position(), "{}", note);
        }

        // Stage 5: alphabetical index
        let index = if compiled.is_empty() {
            info!("No songs compiled, skipping alphabetical index");
            Vec::new()
        } else {
            AlphabeticalIndexer::new(stores.order).order(&compiled, provider)?
        };

        let outcome = CompileOutcome {
            total: report.total,
            resolved,
            unresolved: resolution.unresolved,
            failures: report.failures,
            compiled,
            index,
            attention,
        };

        info!(
            total = outcome.total,
            compiled = outcome.compiled.len(),
            unresolved = outcome.unresolved.len(),
            failures = outcome.failures.len(),
            "Compile complete"
        );

        Ok(outcome)
    }
}
