//! Persistence of operator decisions across runs
//!
//! Each test runs the pipeline twice against the same data folder.

mod helpers;

use helpers::{hymnal, write_file};
use songdeck_compile::decision::{OrderEdit, ScriptedAnswer, ScriptedDecisionProvider, SongChoice};
use songdeck_compile::models::MatchKind;
use songdeck_compile::workflow::pipeline::{ORDER_FILE, SELECTIONS_FILE, VERSIONS_FILE};
use songdeck_compile::{Pipeline, PipelineConfig, PipelineStores};
use tempfile::TempDir;

const TARGETS: &str = "Holy\nBe Thou My Vision (Hymn 77)\n";

fn run(data: &TempDir, provider: &mut ScriptedDecisionProvider) -> songdeck_compile::CompileOutcome {
    let pipeline = Pipeline::new(PipelineConfig::default(), hymnal(), PipelineStores::in_folder(data.path()));
    pipeline.run(TARGETS, provider).unwrap()
}

#[test]
fn test_second_run_reuses_every_decision() {
    let data = TempDir::new().unwrap();

    // First run: operator picks a song, a lyric version, and accepts the order
    let mut first = ScriptedDecisionProvider::new([
        ScriptedAnswer::Song(SongChoice::select(0)),
        ScriptedAnswer::Version(1),
        ScriptedAnswer::Order(OrderEdit::Swap(1, 2)),
        ScriptedAnswer::Order(OrderEdit::Save),
    ]);
    let outcome = run(&data, &mut first);
    assert_eq!(outcome.resolved[0].kind, MatchKind::ManualSelection);
    assert!(data.path().join(SELECTIONS_FILE).exists());
    assert!(data.path().join(VERSIONS_FILE).exists());
    assert!(data.path().join(ORDER_FILE).exists());

    // Second run: no answers scripted, any prompt would abort
    let mut second = ScriptedDecisionProvider::new([]);
    let again = run(&data, &mut second);

    assert!(second.song_prompts.is_empty());
    assert!(second.version_prompts.is_empty());
    assert_eq!(second.order_prompts, 0);
    assert_eq!(again.resolved[0].kind, MatchKind::CachedSelection);
    assert_eq!(again.resolved[0].song_id, outcome.resolved[0].song_id);
    assert_eq!(again.compiled, outcome.compiled);
    assert_eq!(again.index, outcome.index);
}

#[test]
fn test_selection_survives_abort() {
    let data = TempDir::new().unwrap();

    // Operator selects the song, then input ends at the version prompt
    let mut aborted = ScriptedDecisionProvider::new([ScriptedAnswer::Song(SongChoice::select(1))]);
    let pipeline = Pipeline::new(PipelineConfig::default(), hymnal(), PipelineStores::in_folder(data.path()));
    assert!(pipeline.run(TARGETS, &mut aborted).is_err());

    let saved = std::fs::read_to_string(data.path().join(SELECTIONS_FILE)).unwrap();
    let saved: serde_json::Value = serde_json::from_str(&saved).unwrap();
    assert_eq!(saved["holy"]["song_id"], 3);
}

#[test]
fn test_corrupt_selection_file_prompts_again() {
    let data = TempDir::new().unwrap();
    write_file(data.path(), SELECTIONS_FILE, "{ not json");

    let mut provider = ScriptedDecisionProvider::new([
        ScriptedAnswer::Song(SongChoice::select(0)),
        ScriptedAnswer::Version(0),
        ScriptedAnswer::Order(OrderEdit::Save),
    ]);
    let outcome = run(&data, &mut provider);

    assert_eq!(provider.song_prompts, vec![1]);
    assert_eq!(outcome.compiled.len(), 2);

    // Rewritten as valid JSON
    let saved = std::fs::read_to_string(data.path().join(SELECTIONS_FILE)).unwrap();
    assert!(serde_json::from_str::<serde_json::Value>(&saved).is_ok());
}

#[test]
fn test_legacy_selection_file_is_honoured() {
    let data = TempDir::new().unwrap();
    write_file(data.path(), SELECTIONS_FILE, r#"{"holy": 3}"#);

    let mut provider = ScriptedDecisionProvider::new([
        ScriptedAnswer::Version(0),
        ScriptedAnswer::Order(OrderEdit::Save),
    ]);
    let outcome = run(&data, &mut provider);

    assert!(provider.song_prompts.is_empty());
    assert_eq!(outcome.resolved[0].kind, MatchKind::CachedSelection);
    assert_eq!(outcome.resolved[0].title, "Holy Ground");
}
