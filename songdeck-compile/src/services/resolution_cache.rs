//! Persistent operator song selections
//!
//! Keyed by the normalized original request text. Values record the chosen
//! song id and the display title the operator settled on. Older cache files
//! stored a bare song id per key; those entries still load, with an empty
//! display title meaning "use the library title".
//!
//! A missing or unreadable store is treated as empty. `flush` only writes
//! after a `put`.

use serde::{Deserialize, Serialize};
use songdeck_common::store::{load_document, save_document, DocumentStore};
use songdeck_common::text::normalize;
use songdeck_common::Result;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// A remembered selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedSelection {
    pub song_id: i64,
    #[serde(default)]
    pub display_title: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredSelection {
    Entry(CachedSelection),
    LegacyId(i64),
}

impl From<StoredSelection> for CachedSelection {
    fn from(stored: StoredSelection) -> Self {
        match stored {
            StoredSelection::Entry(entry) => entry,
            StoredSelection::LegacyId(song_id) => CachedSelection {
                song_id,
                display_title: String::new(),
            },
        }
    }
}

/// Cache key for a request's original text
pub fn cache_key(original: &str) -> String {
    normalize(original)
}

pub struct ResolutionCache {
    store: Box<dyn DocumentStore>,
    entries: BTreeMap<String, CachedSelection>,
    dirty: bool,
}

impl ResolutionCache {
    /// Load from `store`; corruption or I/O failure yields an empty cache
    pub fn load(store: Box<dyn DocumentStore>) -> Self {
        let entries = match load_document::<BTreeMap<String, StoredSelection>>(store.as_ref()) {
            Ok(Some(raw)) => raw.into_iter().map(|(k, v)| (k, v.into())).collect(),
            Ok(None) => BTreeMap::new(),
            Err(e) => {
                warn!(store = %store.location(), error = %e, "Selection cache unreadable, starting empty");
                BTreeMap::new()
            }
        };

        debug!(store = %store.location(), entries = entries.len(), "Selection cache loaded");

        Self {
            store,
            entries,
            dirty: false,
        }
    }

    pub fn get(&self, key: &str) -> Option<&CachedSelection> {
        self.entries.get(key)
    }

    pub fn put(&mut self, key: impl Into<String>, selection: CachedSelection) {
        self.entries.insert(key.into(), selection);
        self.dirty = true;
    }

    /// Write the whole cache if anything changed since load or the last flush.
    ///
    /// Returns whether a write happened.
    pub fn flush(&mut self) -> Result<bool> {
        if !self.dirty {
            return Ok(false);
        }
        save_document(self.store.as_ref(), &self.entries)?;
        self.dirty = false;
        info!(store = %self.store.location(), entries = self.entries.len(), "Saved song selections");
        Ok(true)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
