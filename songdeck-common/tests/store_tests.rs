//! File-backed document store tests

use songdeck_common::store::{load_document, save_document, DocumentStore, JsonFileStore};
use songdeck_common::Error;
use std::collections::BTreeMap;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_missing_file_reads_as_none() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path().join("selected_songs.json"));

    assert!(store.read_raw().unwrap().is_none());
    let doc: Option<BTreeMap<String, i64>> = load_document(&store).unwrap();
    assert!(doc.is_none());
}

#[test]
fn test_save_creates_parent_folders_and_leaves_no_temp_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data").join("song_order.json");
    let store = JsonFileStore::new(&path);

    save_document(&store, &vec![(3, "Abide with Me"), (1, "Be Thou My Vision")]).unwrap();

    assert!(path.exists());
    assert!(!dir.path().join("data").join("song_order.json.tmp").exists());
    let loaded: Vec<(i64, String)> = load_document(&store).unwrap().unwrap();
    assert_eq!(loaded[0], (3, "Abide with Me".to_string()));
}

#[test]
fn test_corrupt_file_reported_as_cache_corrupt() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("lyric_versions.json");
    fs::write(&path, "not json at all").unwrap();

    let store = JsonFileStore::new(&path);
    let err = load_document::<BTreeMap<String, String>>(&store).unwrap_err();
    match err {
        Error::CacheCorrupt(msg) => assert!(msg.contains("lyric_versions.json")),
        other => panic!("expected CacheCorrupt, got {:?}", other),
    }
}

#[test]
fn test_overwrite_replaces_whole_document() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path().join("doc.json"));

    let mut first = BTreeMap::new();
    first.insert("a".to_string(), 1);
    first.insert("b".to_string(), 2);
    save_document(&store, &first).unwrap();

    let mut second = BTreeMap::new();
    second.insert("c".to_string(), 3);
    save_document(&store, &second).unwrap();

    let loaded: BTreeMap<String, i64> = load_document(&store).unwrap().unwrap();
    assert_eq!(loaded, second);
}
