//! Test Helper Utilities
//!
//! Shared fixtures for songdeck-compile integration tests

#![allow(dead_code)]

use serde_json::json;
use songdeck_common::config::BookKeys;
use songdeck_compile::services::LibraryIndex;
use std::path::{Path, PathBuf};

/// Library document in songbase layout (book keyed by song id)
pub fn library_document(songs: &[(i64, &str, &str)], hymns: &[(i64, &str)]) -> String {
    let songs: Vec<_> = songs
        .iter()
        .map(|(id, title, lyrics)| json!({ "id": id, "title": title, "lyrics": lyrics, "lang": "english" }))
        .collect();
    let book: serde_json::Map<String, serde_json::Value> = hymns
        .iter()
        .map(|(id, hymn)| (id.to_string(), json!(hymn)))
        .collect();

    json!({
        "songs": songs,
        "books": [{ "name": "Hymns", "songs": book }]
    })
    .to_string()
}

pub fn load_library(songs: &[(i64, &str, &str)], hymns: &[(i64, &str)]) -> LibraryIndex {
    LibraryIndex::from_json_str(&library_document(songs, hymns), BookKeys::SongId).expect("fixture library")
}

/// Small hymnal used across tests
pub fn hymnal() -> LibraryIndex {
    load_library(
        &[
            (1, "Amazing Grace", "1\nAmazing grace, how sweet the sound\n\n  Praise God\n\n2\nThrough many dangers"),
            (2, "Holy, Holy, Holy", "1\nHoly, holy, holy! Lord God Almighty"),
            (3, "Holy Ground", "We are standing on holy ground"),
            (4, "Be Thou My Vision", "### Original\n1\nBe Thou my vision\n### Short\n1\nBe my vision"),
        ],
        &[(1, "512"), (2, "1"), (4, "77")],
    )
}

/// Write `content` to `name` inside `dir`
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write fixture");
    path
}
