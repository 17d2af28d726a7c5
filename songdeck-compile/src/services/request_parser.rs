//! Target list parsing
//!
//! Each non-blank line becomes one `TargetRequest`. Recognized forms, first
//! match wins:
//!
//! 1. `512` → hymn number only
//! 2. `512 Amazing Grace` → hymn number and title
//! 3. `Amazing Grace (Hymn 512)` / `(Hymns, 512)` → title and hymn number
//! 4. anything else → title only

use crate::models::TargetRequest;
use once_cell::sync::Lazy;
use regex::Regex;

static DIGITS_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("valid regex"));

static NUMBER_THEN_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\s+(.+)$").expect("valid regex"));

static TITLE_THEN_HYMN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(.*?)\s*\(hymns?,?\s*(\d+)\)\s*[.,;:!?]*\s*$").expect("valid regex")
});

/// Parse a whole target list.
///
/// Line numbers are 1-based over all input lines, blank ones included, so
/// they can be non-contiguous in the output.
pub fn parse_targets(input: &str) -> Vec<TargetRequest> {
    input
        .lines()
        .enumerate()
        .filter_map(|(index, line)| parse_line(index + 1, line))
        .collect()
}

/// Parse one line; `None` for blank lines
pub fn parse_line(line_number: usize, line: &str) -> Option<TargetRequest> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (title, hymn_number) = if DIGITS_ONLY.is_match(line) {
        (String::new(), line.to_string())
    } else if let Some(caps) = NUMBER_THEN_TITLE.captures(line) {
        (caps[2].trim().to_string(), caps[1].to_string())
    } else if let Some(caps) = TITLE_THEN_HYMN.captures(line) {
        (caps[1].trim().to_string(), caps[2].to_string())
    } else {
        (line.to_string(), String::new())
    };

    tracing::debug!(line_number, title = %title, hymn_number = %hymn_number, "Parsed target line");

    Some(TargetRequest {
        line_number,
        original: line.to_string(),
        title,
        hymn_number,
    })
}
