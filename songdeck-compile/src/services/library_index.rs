//! Song library loading and lookup
//!
//! The library is one JSON document:
//!
//! ```json
//! {
//!   "songs": [{ "id": 1, "title": "Amazing Grace", "lyrics": "..." }],
//!   "books": [{ "songs": { "1": "512" } }]
//! }
//! ```
//!
//! Hymn numbers come from the first book only. Additional books are ignored.

use crate::models::SongRecord;
use serde::Deserialize;
use serde_json::{Map, Value};
use songdeck_common::config::BookKeys;
use songdeck_common::{Error, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct LibraryDocument {
    songs: Vec<SongRecord>,
    books: Vec<BookDocument>,
}

#[derive(Debug, Deserialize)]
struct BookDocument {
    /// Document order; a hymn number listed twice resolves to the later entry
    songs: Map<String, Value>,
}

/// Immutable view of the song library
#[derive(Debug, Clone)]
pub struct LibraryIndex {
    /// Songs in document order (fuzzy tie-breaking depends on it)
    songs: Vec<SongRecord>,
    by_id: HashMap<i64, usize>,
    hymn_to_id: HashMap<String, i64>,
}

impl LibraryIndex {
    /// Read and index a library file
    pub fn load(path: &Path, book_keys: BookKeys) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::LibraryLoad(format!("Failed to read library {}: {}", path.display(), e))
        })?;
        let index = Self::from_json_str(&content, book_keys)?;
        info!(
            path = %path.display(),
            songs = index.len(),
            hymn_numbers = index.hymn_to_id.len(),
            "Song library loaded"
        );
        Ok(index)
    }

    /// Parse and index a library document
    pub fn from_json_str(content: &str, book_keys: BookKeys) -> Result<Self> {
        let document: LibraryDocument = serde_json::from_str(content)
            .map_err(|e| Error::LibraryLoad(format!("Malformed library document: {}", e)))?;

        let first_book = document
            .books
            .into_iter()
            .next()
            .ok_or_else(|| Error::LibraryLoad("Library has no books".to_string()))?;

        let hymn_to_id = build_hymn_map(first_book.songs, book_keys)?;
        Self::from_parts(document.songs, hymn_to_id)
    }

    /// Build an index from already-parsed songs and a hymn-number → id map
    pub fn from_parts(songs: Vec<SongRecord>, hymn_to_id: HashMap<String, i64>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(songs.len());
        for (position, song) in songs.iter().enumerate() {
            if by_id.insert(song.id, position).is_some() {
                return Err(Error::LibraryLoad(format!("Duplicate song id {}", song.id)));
            }
        }

        Ok(Self {
            songs,
            by_id,
            hymn_to_id,
        })
    }

    pub fn songs(&self) -> &[SongRecord] {
        &self.songs
    }

    pub fn get(&self, id: i64) -> Option<&SongRecord> {
        self.by_id.get(&id).map(|&i| &self.songs[i])
    }

    /// Song id for a hymn number, if the first book lists it
    pub fn id_for_hymn(&self, hymn_number: &str) -> Option<i64> {
        self.hymn_to_id.get(hymn_number).copied()
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}

fn build_hymn_map(book: Map<String, Value>, book_keys: BookKeys) -> Result<HashMap<String, i64>> {
    let mut map = HashMap::with_capacity(book.len());

    for (key, value) in book {
        let value = scalar_to_string(&value).ok_or_else(|| {
            Error::LibraryLoad(format!("Book entry '{}' has a non-scalar value", key))
        })?;

        let (hymn_number, song_id) = match book_keys {
            BookKeys::SongId => (value, key),
            BookKeys::HymnNumber => (key, value),
        };

        let song_id: i64 = song_id.trim().parse().map_err(|_| {
            Error::LibraryLoad(format!("Book entry has an invalid song id '{}'", song_id))
        })?;

        if let Some(previous) = map.insert(hymn_number.trim().to_string(), song_id) {
            debug!(hymn_number = %hymn_number, previous, song_id, "Hymn number listed twice, keeping later entry");
        }
    }

    Ok(map)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
