//! Run report and JSON export
//!
//! The text report lists each request under the category it ended up in,
//! followed by summary totals. The export bundles the compiled songs, the
//! alphabetical index and the per-request issues for the slide renderer.

use crate::error::RequestError;
use crate::models::{AlphaOrderEntry, CompiledSong, MatchKind, ResolvedMatch};
use crate::workflow::CompileOutcome;
use chrono::{DateTime, Utc};
use serde::Serialize;
use songdeck_common::store::write_atomic;
use songdeck_common::Result;
use std::fmt::Write as _;
use std::path::Path;

/// Characters of lyrics shown per detail line
pub const REPORT_SNIPPET_CHARS: usize = 100;

const RULE: &str = "==================================================";

/// Format the full run report
pub fn render(outcome: &CompileOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}\nRESULTS\n{}", RULE, RULE);

    let by_number = select(&outcome.resolved, |k| matches!(k, MatchKind::HymnNumber));
    let by_title = select(&outcome.resolved, |k| matches!(k, MatchKind::Title));
    let by_choice = select(&outcome.resolved, |k| {
        matches!(k, MatchKind::Fuzzy { .. } | MatchKind::CachedSelection | MatchKind::ManualSelection)
    });

    render_matches(&mut out, "Exact matches by hymn number", &by_number);
    render_matches(&mut out, "Exact matches by title/lyrics", &by_title);
    render_matches(&mut out, "Fuzzy and selected matches", &by_choice);

    let _ = writeln!(out, "\nUnresolved (skipped):\n");
    for entry in &outcome.unresolved {
        let _ = writeln!(
            out,
            "{:>3}. '{}' → unresolved ({} candidates)",
            entry.line_number(),
            entry.request.original,
            entry.candidates.len()
        );
    }

    let _ = writeln!(out, "\nNo match found:\n");
    for request in &outcome.failures {
        let _ = writeln!(out, "{:>3}. '{}' not found", request.line_number, request.original);
    }

    if !outcome.attention.is_empty() {
        let _ = writeln!(out, "\nNeeds attention:\n");
        for note in &outcome.attention {
            let _ = writeln!(out, "  {}", note);
        }
    }

    let _ = writeln!(out, "\nSummary:\n");
    let total = outcome.total;
    let unresolved_lines: Vec<usize> = outcome.unresolved.iter().map(|a| a.line_number()).collect();
    let failure_lines: Vec<usize> = outcome.failures.iter().map(|r| r.line_number).collect();
    summary_line(&mut out, "Exact by hymn number", &lines_of(&by_number), total);
    summary_line(&mut out, "Exact by title", &lines_of(&by_title), total);
    summary_line(&mut out, "Fuzzy / selected", &lines_of(&by_choice), total);
    summary_line(&mut out, "Unresolved", &unresolved_lines, total);
    summary_line(&mut out, "Not found", &failure_lines, total);

    let _ = writeln!(out, "\nCompiled {} of {} requests.", outcome.compiled.len(), total);
    out
}

fn select(resolved: &[ResolvedMatch], keep: impl Fn(&MatchKind) -> bool) -> Vec<&ResolvedMatch> {
    resolved.iter().filter(|m| keep(&m.kind)).collect()
}

fn lines_of(matches: &[&ResolvedMatch]) -> Vec<usize> {
    matches.iter().map(|m| m.line_number()).collect()
}

fn render_matches(out: &mut String, heading: &str, matches: &[&ResolvedMatch]) {
    let _ = writeln!(out, "\n{}:\n", heading);
    for m in matches {
        let snippet: String = m
            .lyrics
            .chars()
            .take(REPORT_SNIPPET_CHARS)
            .map(|c| if c == '\n' { ' ' } else { c })
            .collect();
        let _ = writeln!(
            out,
            "{:>3}. '{}' → '{}' (ID: {}) via {}",
            m.line_number(),
            m.request.original,
            m.title,
            m.song_id,
            m.kind
        );
        let _ = writeln!(out, "     Lyrics: {}...\n", snippet);
    }
}

/// `label: count/total (pct%) → lines: 1, 4`
pub fn summary_line(out: &mut String, label: &str, lines: &[usize], total: usize) {
    let percent = if total == 0 {
        0.0
    } else {
        lines.len() as f64 / total as f64 * 100.0
    };
    let listed = if lines.is_empty() {
        "-".to_string()
    } else {
        lines.iter().map(usize::to_string).collect::<Vec<_>>().join(", ")
    };
    let _ = writeln!(out, "{}: {}/{} ({:.1}%) → lines: {}", label, lines.len(), total, percent, listed);
}

/// JSON document written to the output path
#[derive(Debug, Clone, Serialize)]
pub struct ExportDocument<'a> {
    pub generated_at: DateTime<Utc>,
    pub songs: &'a [CompiledSong],
    pub index: &'a [AlphaOrderEntry],
    pub issues: Vec<RequestError>,
}

impl<'a> ExportDocument<'a> {
    pub fn new(outcome: &'a CompileOutcome) -> Self {
        Self {
            generated_at: Utc::now(),
            songs: &outcome.compiled,
            index: &outcome.index,
            issues: outcome.issues(),
        }
    }
}

/// Write the export document atomically
pub fn write_export(path: &Path, outcome: &CompileOutcome) -> Result<()> {
    let content = serde_json::to_string_pretty(&ExportDocument::new(outcome))?;
    write_atomic(path, content.as_bytes())?;
    tracing::info!(path = %path.display(), songs = outcome.compiled.len(), "Export written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AmbiguousMatch, Section, SongRecord, TargetRequest};

    fn request(line_number: usize, original: &str) -> TargetRequest {
        TargetRequest {
            line_number,
            original: original.to_string(),
            title: original.to_string(),
            hymn_number: String::new(),
        }
    }

    fn outcome() -> CompileOutcome {
        let song = SongRecord {
            id: 1,
            title: "Amazing Grace".into(),
            lyrics: "1\nAmazing grace".into(),
        };
        CompileOutcome {
            total: 4,
            resolved: vec![
                ResolvedMatch::new(request(1, "512"), MatchKind::HymnNumber, &song),
                ResolvedMatch::new(request(2, "Amazin"), MatchKind::Fuzzy { score: 0.91 }, &song),
            ],
            unresolved: vec![AmbiguousMatch {
                request: request(3, "Holy"),
                candidates: vec![song.clone(), song.clone()],
            }],
            failures: vec![request(4, "Nowhere")],
            compiled: vec![CompiledSong {
                position: 1,
                song_id: 1,
                title: "Amazing Grace".into(),
                chorus_count: 0,
                sections: vec![Section::stanza(1, "Amazing grace")],
            }],
            index: vec![AlphaOrderEntry::new(1, "Amazing Grace")],
            attention: vec![],
        }
    }

    #[test]
    fn test_summary_line_format() {
        let mut out = String::new();
        summary_line(&mut out, "Not found", &[2, 7], 8);
        assert_eq!(out, "Not found: 2/8 (25.0%) → lines: 2, 7\n");

        let mut out = String::new();
        summary_line(&mut out, "Unresolved", &[], 0);
        assert_eq!(out, "Unresolved: 0/0 (0.0%) → lines: -\n");
    }

    #[test]
    fn test_render_lists_every_category() {
        let text = render(&outcome());
        assert!(text.contains("  1. '512' → 'Amazing Grace' (ID: 1) via exact match by hymn number"));
        assert!(text.contains("via fuzzy match (0.91)"));
        assert!(text.contains("  3. 'Holy' → unresolved (2 candidates)"));
        assert!(text.contains("  4. 'Nowhere' not found"));
        assert!(text.contains("Fuzzy / selected: 1/4 (25.0%) → lines: 2"));
        assert!(text.contains("Lyrics: 1 Amazing grace..."));
    }

    #[test]
    fn test_export_document_shape() {
        let outcome = outcome();
        let value = serde_json::to_value(ExportDocument::new(&outcome)).unwrap();
        assert_eq!(value["songs"][0]["sections"][0]["type"], "stanza");
        assert_eq!(value["index"][0][1], "Amazing Grace");
        assert_eq!(value["issues"][0]["kind"], "ambiguous_unresolved");
        assert_eq!(value["issues"][1]["kind"], "unresolved");
        assert!(value["generated_at"].is_string());
    }

    #[test]
    fn test_write_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("compiled.json");
        write_export(&path, &outcome()).unwrap();
        let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["songs"].as_array().unwrap().len(), 1);
    }
}
