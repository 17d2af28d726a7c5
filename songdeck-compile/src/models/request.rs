//! Parsed song requests

use serde::{Deserialize, Serialize};

/// One requested song, parsed from a non-blank line of the target list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRequest {
    /// 1-based line in the input, counting blank lines
    pub line_number: usize,

    /// Trimmed line text
    pub original: String,

    /// Title part of the line (empty when the line was only a hymn number)
    pub title: String,

    /// Hymn number part of the line (empty when none was given)
    pub hymn_number: String,
}

impl TargetRequest {
    pub fn has_hymn_number(&self) -> bool {
        !self.hymn_number.is_empty()
    }
}
