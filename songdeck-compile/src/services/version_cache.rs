//! Persistent lyric version choices, keyed by song title
//!
//! Unlike song selections, every `put` is written out immediately.

use songdeck_common::store::{load_document, save_document, DocumentStore};
use songdeck_common::Result;
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub struct LyricVersionCache {
    store: Box<dyn DocumentStore>,
    entries: BTreeMap<String, String>,
}

impl LyricVersionCache {
    /// Load from `store`; corruption or I/O failure yields an empty cache
    pub fn load(store: Box<dyn DocumentStore>) -> Self {
        let entries = match load_document::<BTreeMap<String, String>>(store.as_ref()) {
            Ok(entries) => entries.unwrap_or_default(),
            Err(e) => {
                warn!(store = %store.location(), error = %e, "Lyric version cache unreadable, starting empty");
                BTreeMap::new()
            }
        };
        debug!(store = %store.location(), entries = entries.len(), "Lyric version cache loaded");
        Self { store, entries }
    }

    /// Chosen version label for a title
    pub fn get(&self, title: &str) -> Option<&str> {
        self.entries.get(title).map(String::as_str)
    }

    /// Record a choice and write the whole cache.
    ///
    /// The entry is kept in memory even when the write fails.
    pub fn put(&mut self, title: impl Into<String>, label: impl Into<String>) -> Result<()> {
        self.entries.insert(title.into(), label.into());
        save_document(self.store.as_ref(), &self.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
