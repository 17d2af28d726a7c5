//! songdeck-compile library interface
//!
//! Turns a target list of requested songs into structured lyrics:
//! matching against a song library, operator resolution of uncertain
//! matches, lyric cleanup, section parsing, chorus expansion and an
//! alphabetical index.

pub mod config;
pub mod decision;
pub mod error;
pub mod models;
pub mod report;
pub mod services;
pub mod workflow;

pub use crate::error::RequestError;
pub use crate::workflow::{CompileOutcome, Pipeline, PipelineConfig, PipelineStores};
