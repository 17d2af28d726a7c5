//! Library songs and structured lyric output

use serde::{Deserialize, Serialize};
use std::fmt;

/// One song from the library document (read-only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongRecord {
    /// Library id, unique within a library
    pub id: i64,

    #[serde(default)]
    pub title: String,

    /// Raw lyrics: chords, comments and version headers included
    #[serde(default)]
    pub lyrics: String,
}

impl SongRecord {
    /// First line of the raw lyrics
    pub fn first_line(&self) -> &str {
        self.lyrics.split('\n').next().unwrap_or("")
    }

    /// Lyrics flattened onto one line and cut to `max_chars` characters
    pub fn snippet(&self, max_chars: usize) -> String {
        self.lyrics
            .chars()
            .take(max_chars)
            .map(|c| if c == '\n' { ' ' } else { c })
            .collect()
    }
}

/// Section type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Stanza,
    Chorus,
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionKind::Stanza => write!(f, "stanza"),
            SectionKind::Chorus => write!(f, "chorus"),
        }
    }
}

/// One stanza or chorus of a song
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    #[serde(rename = "type")]
    pub kind: SectionKind,

    /// 1-based, counted separately for stanzas and choruses
    pub number: u32,

    pub content: String,
}

impl Section {
    pub fn stanza(number: u32, content: impl Into<String>) -> Self {
        Self {
            kind: SectionKind::Stanza,
            number,
            content: content.into(),
        }
    }

    pub fn chorus(number: u32, content: impl Into<String>) -> Self {
        Self {
            kind: SectionKind::Chorus,
            number,
            content: content.into(),
        }
    }

    pub fn is_chorus(&self) -> bool {
        self.kind == SectionKind::Chorus
    }
}

/// Final output unit handed to the slide renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledSong {
    /// Line number of the request; display number and stable ordering key
    pub position: usize,

    pub song_id: i64,

    /// Display title (may be an operator override of the library title)
    pub title: String,

    /// Number of distinct choruses found before expansion
    pub chorus_count: usize,

    /// Performance-order sections
    pub sections: Vec<Section>,
}

/// `(position, title)` pair of the alphabetical index.
///
/// Persisted as a two-element JSON array so saved orders stay readable by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(usize, String)", into = "(usize, String)")]
pub struct AlphaOrderEntry {
    pub position: usize,
    pub title: String,
}

impl AlphaOrderEntry {
    pub fn new(position: usize, title: impl Into<String>) -> Self {
        Self {
            position,
            title: title.into(),
        }
    }
}

impl From<(usize, String)> for AlphaOrderEntry {
    fn from((position, title): (usize, String)) -> Self {
        Self { position, title }
    }
}

impl From<AlphaOrderEntry> for (usize, String) {
    fn from(entry: AlphaOrderEntry) -> Self {
        (entry.position, entry.title)
    }
}

impl From<&CompiledSong> for AlphaOrderEntry {
    fn from(song: &CompiledSong) -> Self {
        Self::new(song.position, song.title.clone())
    }
}
