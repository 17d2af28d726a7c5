//! # songdeck Common Library
//!
//! Shared code for songdeck binaries including:
//! - Error types
//! - TOML configuration loading and data folder resolution
//! - Text normalization and similarity scoring
//! - Whole-document JSON stores used by the persistent caches

pub mod config;
pub mod error;
pub mod store;
pub mod text;

pub use error::{Error, Result};
pub use store::{DocumentStore, JsonFileStore, MemoryStore};
