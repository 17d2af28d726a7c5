//! Data models for songdeck-compile
//!
//! - Library songs and requested targets
//! - Match outcomes before and after operator resolution
//! - Structured lyric output (sections, compiled songs, alphabetical index)

pub mod matching;
pub mod request;
pub mod song;

pub use matching::{AmbiguousMatch, MatchKind, MatchOutcome, MatchReport, ResolvedMatch, UncertainMatch};
pub use request::TargetRequest;
pub use song::{AlphaOrderEntry, CompiledSong, Section, SectionKind, SongRecord};
