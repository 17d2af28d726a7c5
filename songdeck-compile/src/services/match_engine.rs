//! Request → library song matching
//!
//! Per request, first success wins:
//!
//! 1. **Hymn number** — the number is in the hymn book and its song has not
//!    been taken by an earlier request.
//! 2. **Substring** — the normalized title is contained in a song's
//!    normalized title, full lyrics, or first lyric line. One hit is an exact
//!    match; several hits are ambiguous and nothing is consumed.
//! 3. **Fuzzy** — the highest title similarity over untaken songs (first
//!    song wins ties) if it reaches the threshold.
//!
//! Matched song ids are consumed for the rest of the run, so no song is
//! assigned to two requests.

use crate::models::{AmbiguousMatch, MatchKind, MatchOutcome, MatchReport, ResolvedMatch, SongRecord, TargetRequest};
use crate::services::LibraryIndex;
use songdeck_common::text::{normalize, SequenceMatcher};
use std::collections::HashSet;
use tracing::{debug, info};

/// Default minimum similarity for a fuzzy match
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.80;

/// Normalized comparison keys for one library song
struct SongKeys {
    title: String,
    title_chars: Vec<char>,
    lyrics: String,
    first_line: String,
}

/// Matches requests against a library
pub struct MatchEngine<'a> {
    library: &'a LibraryIndex,
    keys: Vec<SongKeys>,
    fuzzy_threshold: f64,
}

impl<'a> MatchEngine<'a> {
    pub fn new(library: &'a LibraryIndex, fuzzy_threshold: f64) -> Self {
        let keys = library
            .songs()
            .iter()
            .map(|song| {
                let title = normalize(&song.title);
                SongKeys {
                    title_chars: title.chars().collect(),
                    title,
                    lyrics: normalize(&song.lyrics),
                    first_line: normalize(song.first_line()),
                }
            })
            .collect();

        Self {
            library,
            keys,
            fuzzy_threshold,
        }
    }

    /// Match every request in order, sharing one consumed-id set
    pub fn match_all(&self, requests: &[TargetRequest]) -> MatchReport {
        let mut consumed = HashSet::new();
        let mut report = MatchReport {
            total: requests.len(),
            ..Default::default()
        };

        for request in requests {
            let outcome = self.match_one(request, &mut consumed);
            report.push(outcome);
        }
        report.sort_by_line();

        info!(
            total = report.total,
            by_number = report.exact_by_number.len(),
            by_title = report.exact_by_title.len(),
            fuzzy = report.fuzzy.len(),
            ambiguous = report.ambiguous.len(),
            failures = report.failures.len(),
            "Matching complete"
        );

        report
    }

    /// Match one request; ids of exact and fuzzy matches are added to `consumed`
    pub fn match_one(&self, request: &TargetRequest, consumed: &mut HashSet<i64>) -> MatchOutcome {
        if let Some(song) = self.match_hymn_number(request, consumed) {
            consumed.insert(song.id);
            debug!(line = request.line_number, song_id = song.id, "Matched by hymn number");
            return MatchOutcome::ExactByHymnNumber(ResolvedMatch::new(request.clone(), MatchKind::HymnNumber, song));
        }

        let target = normalize(&request.title);
        if target.is_empty() {
            debug!(line = request.line_number, original = %request.original, "No usable title");
            return MatchOutcome::Unresolved(request.clone());
        }

        let hits = self.substring_hits(&target, consumed);
        match hits.len() {
            0 => {}
            1 => {
                let song = hits[0];
                consumed.insert(song.id);
                debug!(line = request.line_number, song_id = song.id, "Matched by title");
                return MatchOutcome::ExactByTitle(ResolvedMatch::new(request.clone(), MatchKind::Title, song));
            }
            n => {
                debug!(line = request.line_number, candidates = n, "Ambiguous title match");
                return MatchOutcome::Ambiguous(AmbiguousMatch {
                    request: request.clone(),
                    candidates: hits.into_iter().cloned().collect(),
                });
            }
        }

        match self.best_fuzzy(&target, consumed) {
            Some((song, score)) if score >= self.fuzzy_threshold => {
                consumed.insert(song.id);
                debug!(line = request.line_number, song_id = song.id, score, "Fuzzy match");
                MatchOutcome::Fuzzy(ResolvedMatch::new(request.clone(), MatchKind::Fuzzy { score }, song))
            }
            best => {
                debug!(
                    line = request.line_number,
                    best_score = best.map(|(_, s)| s).unwrap_or(0.0),
                    "No match"
                );
                MatchOutcome::Unresolved(request.clone())
            }
        }
    }

    fn match_hymn_number(&self, request: &TargetRequest, consumed: &HashSet<i64>) -> Option<&'a SongRecord> {
        if !request.has_hymn_number() {
            return None;
        }
        let id = self.library.id_for_hymn(&request.hymn_number)?;
        if consumed.contains(&id) {
            debug!(line = request.line_number, song_id = id, "Hymn number song already taken");
            return None;
        }
        self.library.get(id)
    }

    fn substring_hits(&self, target: &str, consumed: &HashSet<i64>) -> Vec<&'a SongRecord> {
        self.library
            .songs()
            .iter()
            .zip(&self.keys)
            .filter(|(song, _)| !consumed.contains(&song.id))
            .filter(|(_, keys)| {
                keys.title.contains(target) || keys.lyrics.contains(target) || keys.first_line.contains(target)
            })
            .map(|(song, _)| song)
            .collect()
    }

    fn best_fuzzy(&self, target: &str, consumed: &HashSet<i64>) -> Option<(&'a SongRecord, f64)> {
        let target_chars: Vec<char> = target.chars().collect();
        let mut best: Option<(&'a SongRecord, f64)> = None;

        for (song, keys) in self.library.songs().iter().zip(&self.keys) {
            if consumed.contains(&song.id) {
                continue;
            }
            let score = SequenceMatcher::new(&target_chars, &keys.title_chars).ratio();
            if score > best.map(|(_, s)| s).unwrap_or(0.0) {
                best = Some((song, score));
            }
        }

        best
    }
}
