//! Pipeline stages
//!
//! Pure stages (parsing, matching, cleaning, section parsing, expansion) are
//! free functions or borrow-only structs. Stages that remember operator
//! decisions own a `DocumentStore`.

pub mod alpha_indexer;
pub mod chorus_expander;
pub mod interactive_resolver;
pub mod library_index;
pub mod lyrics_cleaner;
pub mod match_engine;
pub mod request_parser;
pub mod resolution_cache;
pub mod section_parser;
pub mod version_cache;

pub use alpha_indexer::AlphabeticalIndexer;
pub use interactive_resolver::{InteractiveResolver, Resolution};
pub use library_index::LibraryIndex;
pub use match_engine::{MatchEngine, DEFAULT_FUZZY_THRESHOLD};
pub use resolution_cache::{CachedSelection, ResolutionCache};
pub use version_cache::LyricVersionCache;
