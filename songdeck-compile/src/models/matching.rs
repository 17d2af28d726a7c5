//! Match outcomes
//!
//! The match engine classifies each request into exactly one outcome.
//! Ambiguous and (optionally) fuzzy outcomes go through operator resolution
//! before lyrics are structured.

use super::{SongRecord, TargetRequest};
use serde::Serialize;
use std::fmt;

/// How a request was tied to a library song
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchKind {
    HymnNumber,
    Title,
    Fuzzy { score: f64 },
    CachedSelection,
    ManualSelection,
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchKind::HymnNumber => write!(f, "exact match by hymn number"),
            MatchKind::Title => write!(f, "exact match by title"),
            MatchKind::Fuzzy { score } => write!(f, "fuzzy match ({:.2})", score),
            MatchKind::CachedSelection => write!(f, "cached selection"),
            MatchKind::ManualSelection => write!(f, "manual selection"),
        }
    }
}

/// A request tied to exactly one song
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedMatch {
    pub request: TargetRequest,
    pub kind: MatchKind,
    pub song_id: i64,
    /// Display title; the library title unless the operator overrode it
    pub title: String,
    pub lyrics: String,
}

impl ResolvedMatch {
    pub fn new(request: TargetRequest, kind: MatchKind, song: &SongRecord) -> Self {
        Self {
            request,
            kind,
            song_id: song.id,
            title: song.title.clone(),
            lyrics: song.lyrics.clone(),
        }
    }

    pub fn line_number(&self) -> usize {
        self.request.line_number
    }
}

/// A request whose title matched several songs by substring
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmbiguousMatch {
    pub request: TargetRequest,
    pub candidates: Vec<SongRecord>,
}

impl AmbiguousMatch {
    pub fn line_number(&self) -> usize {
        self.request.line_number
    }
}

/// Result of matching a single request
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    ExactByHymnNumber(ResolvedMatch),
    ExactByTitle(ResolvedMatch),
    Ambiguous(AmbiguousMatch),
    Fuzzy(ResolvedMatch),
    Unresolved(TargetRequest),
}

impl MatchOutcome {
    pub fn line_number(&self) -> usize {
        match self {
            MatchOutcome::ExactByHymnNumber(m)
            | MatchOutcome::ExactByTitle(m)
            | MatchOutcome::Fuzzy(m) => m.line_number(),
            MatchOutcome::Ambiguous(a) => a.line_number(),
            MatchOutcome::Unresolved(r) => r.line_number,
        }
    }
}

/// Outcomes of a whole matching pass, each list ascending by line number
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchReport {
    /// Number of parsed requests
    pub total: usize,
    pub exact_by_number: Vec<ResolvedMatch>,
    pub exact_by_title: Vec<ResolvedMatch>,
    pub fuzzy: Vec<ResolvedMatch>,
    pub ambiguous: Vec<AmbiguousMatch>,
    pub failures: Vec<TargetRequest>,
}

impl MatchReport {
    pub fn push(&mut self, outcome: MatchOutcome) {
        match outcome {
            MatchOutcome::ExactByHymnNumber(m) => self.exact_by_number.push(m),
            MatchOutcome::ExactByTitle(m) => self.exact_by_title.push(m),
            MatchOutcome::Fuzzy(m) => self.fuzzy.push(m),
            MatchOutcome::Ambiguous(a) => self.ambiguous.push(a),
            MatchOutcome::Unresolved(r) => self.failures.push(r),
        }
    }

    pub fn sort_by_line(&mut self) {
        self.exact_by_number.sort_by_key(|m| m.line_number());
        self.exact_by_title.sort_by_key(|m| m.line_number());
        self.fuzzy.sort_by_key(|m| m.line_number());
        self.ambiguous.sort_by_key(|a| a.line_number());
        self.failures.sort_by_key(|r| r.line_number);
    }
}

/// An outcome that needs operator confirmation
#[derive(Debug, Clone, PartialEq)]
pub enum UncertainMatch {
    Ambiguous(AmbiguousMatch),
    /// A fuzzy pick awaiting confirmation; the picked song is the only candidate
    Fuzzy { matched: ResolvedMatch, song: SongRecord },
}

impl UncertainMatch {
    pub fn request(&self) -> &TargetRequest {
        match self {
            UncertainMatch::Ambiguous(a) => &a.request,
            UncertainMatch::Fuzzy { matched, .. } => &matched.request,
        }
    }

    pub fn line_number(&self) -> usize {
        self.request().line_number
    }

    pub fn candidates(&self) -> &[SongRecord] {
        match self {
            UncertainMatch::Ambiguous(a) => &a.candidates,
            UncertainMatch::Fuzzy { song, .. } => std::slice::from_ref(song),
        }
    }

    /// Short description shown to the operator
    pub fn reason(&self) -> String {
        match self {
            UncertainMatch::Ambiguous(a) => format!("multiple title matches ({})", a.candidates.len()),
            UncertainMatch::Fuzzy { matched, .. } => matched.kind.to_string(),
        }
    }

    /// Convert back into an unresolved ambiguous entry for reporting
    pub fn into_unresolved(self) -> AmbiguousMatch {
        match self {
            UncertainMatch::Ambiguous(a) => a,
            UncertainMatch::Fuzzy { matched, song } => AmbiguousMatch {
                request: matched.request,
                candidates: vec![song],
            },
        }
    }
}
