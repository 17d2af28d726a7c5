//! Per-request problems collected during a run
//!
//! Matching and resolution never throw for a single bad request. Each one
//! ends up compiled or reported through one of these variants so that a full
//! report can be produced after the batch completes. Structural failures
//! (library load, operator abort) use `songdeck_common::Error` instead.

use serde::Serialize;
use thiserror::Error;

/// A request that did not make it into the compiled output
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RequestError {
    /// No hymn number, substring or fuzzy match
    #[error("line {line_number}: no match found for '{original}'")]
    Unresolved { line_number: usize, original: String },

    /// Several candidates (or an unconfirmed fuzzy pick) and no selection made
    #[error("line {line_number}: '{original}' left unresolved ({candidates} candidates)")]
    AmbiguousUnresolved {
        line_number: usize,
        original: String,
        candidates: usize,
    },
}

impl RequestError {
    pub fn line_number(&self) -> usize {
        match self {
            RequestError::Unresolved { line_number, .. }
            | RequestError::AmbiguousUnresolved { line_number, .. } => *line_number,
        }
    }
}
