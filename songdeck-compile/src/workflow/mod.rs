//! Compile workflow
//!
//! Runs the stages in order over one target list:
//! 1. Parse target lines into requests
//! 2. Match requests against the library
//! 3. Resolve ambiguous (and, optionally, fuzzy) matches with the operator
//! 4. Structure lyrics: version choice, cleaning, sections, chorus expansion
//! 5. Build the alphabetical index
//!
//! Every request ends up exactly once in the compiled songs, the failures,
//! or the unresolved entries of [`CompileOutcome`].

pub mod pipeline;
pub mod structurer;

use crate::error::RequestError;
use crate::models::{AlphaOrderEntry, AmbiguousMatch, CompiledSong, ResolvedMatch, TargetRequest};
use serde::Serialize;
use std::fmt;

pub use pipeline::{Pipeline, PipelineConfig, PipelineStores};
pub use structurer::LyricStructurer;

/// A compiled song that may need manual attention
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttentionNote {
    /// Lyrics produced no sections
    NoSections { position: usize, title: String },
    /// Several choruses; compiled in parsed order without repetition
    MultipleChoruses { position: usize, title: String, choruses: usize },
}

impl AttentionNote {
    pub fn position(&self) -> usize {
        match self {
            AttentionNote::NoSections { position, .. } | AttentionNote::MultipleChoruses { position, .. } => *position,
        }
    }

    /// Attention notes for one compiled song
    pub fn for_song(song: &CompiledSong) -> Vec<AttentionNote> {
        let mut notes = Vec::new();
        if song.sections.is_empty() {
            notes.push(AttentionNote::NoSections {
                position: song.position,
                title: song.title.clone(),
            });
        }
        if song.chorus_count > 1 {
            notes.push(AttentionNote::MultipleChoruses {
                position: song.position,
                title: song.title.clone(),
                choruses: song.chorus_count,
            });
        }
        notes
    }
}

impl fmt::Display for AttentionNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttentionNote::NoSections { position, title } => {
                write!(f, "line {}: '{}' has no lyric sections", position, title)
            }
            AttentionNote::MultipleChoruses { position, title, choruses } => {
                write!(f, "line {}: '{}' has {} choruses, not repeated", position, title, choruses)
            }
        }
    }
}

/// Everything a compile run produced
#[derive(Debug, Clone, Default)]
pub struct CompileOutcome {
    /// Number of parsed requests
    pub total: usize,
    /// Matches that were compiled, ascending by line number
    pub resolved: Vec<ResolvedMatch>,
    /// Uncertain matches the operator skipped
    pub unresolved: Vec<AmbiguousMatch>,
    /// Requests with no match at all
    pub failures: Vec<TargetRequest>,
    /// One entry per resolved match, same order
    pub compiled: Vec<CompiledSong>,
    pub index: Vec<AlphaOrderEntry>,
    pub attention: Vec<AttentionNote>,
}

impl CompileOutcome {
    /// Failures and unresolved entries as reportable errors, by line number
    pub fn issues(&self) -> Vec<RequestError> {
        let mut issues: Vec<RequestError> = self
            .failures
            .iter()
            .map(|r| RequestError::Unresolved {
                line_number: r.line_number,
                original: r.original.clone(),
            })
            .chain(self.unresolved.iter().map(|a| RequestError::AmbiguousUnresolved {
                line_number: a.line_number(),
                original: a.request.original.clone(),
                candidates: a.candidates.len(),
            }))
            .collect();
        issues.sort_by_key(RequestError::line_number);
        issues
    }

    /// Every request accounted for exactly once
    pub fn is_complete(&self) -> bool {
        self.resolved.len() + self.unresolved.len() + self.failures.len() == self.total
    }
}
