//! Whole-document persistence for small key-value caches
//!
//! Every cache (song selections, lyric versions, alphabetical order) is one
//! JSON document that is read once and rewritten as a whole. Stores only
//! move raw text; parsing lives in [`load_document`] so that file-backed and
//! in-memory stores report corruption identically.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Backing storage for one persisted document
pub trait DocumentStore {
    /// Current document text, or `None` if nothing has been stored yet
    fn read_raw(&self) -> Result<Option<String>>;

    /// Replace the whole document
    fn write_raw(&self, content: &str) -> Result<()>;

    /// Human-readable location for log messages
    fn location(&self) -> String;
}

/// Read and parse a document.
///
/// Returns `Ok(None)` for a missing document and `Error::CacheCorrupt` when
/// the stored text is not valid JSON for `T`.
pub fn load_document<T: DeserializeOwned>(store: &dyn DocumentStore) -> Result<Option<T>> {
    let Some(raw) = store.read_raw()? else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| Error::CacheCorrupt(format!("{}: {}", store.location(), e)))
}

/// Serialize a document (pretty-printed, non-ASCII kept verbatim) and store it
pub fn save_document<T: Serialize + ?Sized>(store: &dyn DocumentStore, document: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(document)?;
    store.write_raw(&content)
}

/// Write `contents` to `path` via a sibling temp file and rename.
///
/// Readers never observe a partially written file; an interrupted write
/// leaves the previous document in place.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut tmp_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .ok_or_else(|| Error::InvalidInput(format!("Not a file path: {}", path.display())))?;
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    {
        let mut file = std::fs::File::create(&tmp_path)?;
        file.write_all(contents)?;
        file.sync_all()?;
    }
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

/// JSON document stored in a single file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentStore for JsonFileStore {
    fn read_raw(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Io(e)),
        }
    }

    fn write_raw(&self, content: &str) -> Result<()> {
        write_atomic(&self.path, content.as_bytes())?;
        tracing::debug!(path = %self.path.display(), bytes = content.len(), "Wrote document");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory document store.
///
/// Clones share the same document, so a test can hand one clone to a cache,
/// drop the cache, and open a fresh cache on another clone to simulate a
/// second run.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryDocument>>,
}

#[derive(Debug, Default)]
struct MemoryDocument {
    content: Option<String>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with raw text (may be deliberately invalid)
    pub fn with_content(content: impl Into<String>) -> Self {
        let store = Self::default();
        store.lock().content = Some(content.into());
        store
    }

    /// Current raw text
    pub fn content(&self) -> Option<String> {
        self.lock().content.clone()
    }

    /// Number of `write_raw` calls so far
    pub fn writes(&self) -> usize {
        self.lock().writes
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryDocument> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DocumentStore for MemoryStore {
    fn read_raw(&self) -> Result<Option<String>> {
        Ok(self.lock().content.clone())
    }

    fn write_raw(&self, content: &str) -> Result<()> {
        let mut doc = self.lock();
        doc.content = Some(content.to_string());
        doc.writes += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
