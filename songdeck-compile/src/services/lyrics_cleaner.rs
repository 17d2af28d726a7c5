//! Raw lyric cleanup and version selection
//!
//! Raw lyrics can hold several alternate versions, each introduced by a
//! `### <label>` header line. A version is picked first (headers are comment
//! lines and would be dropped by cleaning), then the chosen text is cleaned.

use crate::decision::DecisionProvider;
use crate::services::version_cache::LyricVersionCache;
use once_cell::sync::Lazy;
use regex::Regex;
use songdeck_common::Result;
use tracing::{debug, info, warn};

static CHORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[.*?\]").expect("valid regex"));

static VERSION_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^###\s+(\S.*?)\s*$").expect("valid regex"));

/// Remove comment, capo and copyright lines and chord annotations.
///
/// Leading whitespace of kept lines is preserved; trailing whitespace is
/// removed. Blank lines inside the text are kept, blank lines at either end
/// are not.
pub fn clean(raw: &str) -> String {
    let lines: Vec<String> = raw
        .lines()
        .filter(|line| !is_dropped_line(line))
        .map(|line| CHORD.replace_all(line, "").trim_end().to_string())
        .collect();

    let first = lines.iter().position(|l| !l.is_empty());
    let last = lines.iter().rposition(|l| !l.is_empty());
    match (first, last) {
        (Some(first), Some(last)) => lines[first..=last].join("\n"),
        _ => String::new(),
    }
}

fn is_dropped_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    let lower = trimmed.to_lowercase();
    trimmed.starts_with('#') || lower.starts_with("capo") || lower.starts_with("(c)") || trimmed.starts_with('©')
}

/// Labels of all version headers, in order of appearance
pub fn version_labels(raw: &str) -> Vec<String> {
    raw.lines()
        .filter_map(|line| VERSION_HEADER.captures(line.trim_start()))
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Text from the first header labelled `label` up to the next header.
///
/// `None` if no header has that label.
pub fn extract_version(raw: &str, label: &str) -> Option<String> {
    let mut lines = raw.lines();
    lines.by_ref().find(|line| header_label(line) == Some(label))?;

    let body: Vec<&str> = lines.take_while(|line| header_label(line).is_none()).collect();
    Some(body.join("\n"))
}

fn header_label(line: &str) -> Option<&str> {
    VERSION_HEADER
        .captures(line.trim_start())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Pick the lyric version to compile for `title`.
///
/// Lyrics without version headers are returned unchanged. Otherwise a cached
/// choice is reused when its label still exists; if not, the operator is
/// asked and the answer is cached immediately. When the provider declines to
/// choose, the first version is used and nothing is cached.
pub fn choose_version(
    title: &str,
    raw: &str,
    cache: &mut LyricVersionCache,
    provider: &mut dyn DecisionProvider,
) -> Result<String> {
    let labels = version_labels(raw);
    let Some(first) = labels.first() else {
        return Ok(raw.to_string());
    };

    if let Some(label) = cache.get(title) {
        if let Some(text) = extract_version(raw, label) {
            debug!(title = %title, label = %label, "Reusing cached lyric version");
            return Ok(text);
        }
        warn!(title = %title, label = %label, "Cached lyric version no longer present, asking again");
    }

    let label = match provider.choose_version(title, &labels)? {
        Some(index) => {
            let label = labels.get(index).unwrap_or(first).clone();
            if let Err(e) = cache.put(title, label.as_str()) {
                warn!(title = %title, error = %e, "Failed to save lyric version choice");
            }
            info!(title = %title, label = %label, "Lyric version chosen");
            label
        }
        None => {
            debug!(title = %title, label = %first, "Using first lyric version");
            first.clone()
        }
    };

    Ok(extract_version(raw, &label).unwrap_or_default())
}
