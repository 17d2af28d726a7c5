//! Operator resolution of ambiguous and fuzzy matches
//!
//! Entries are handled one at a time in line order. A remembered selection
//! is applied without asking; otherwise the operator is shown the candidates
//! through the [`DecisionProvider`]. Every new selection is flushed to the
//! selection cache before the next entry is looked at, so an abort later in
//! the run keeps it.

use crate::decision::{DecisionProvider, SongChoice};
use crate::models::{AmbiguousMatch, MatchKind, ResolvedMatch, SongRecord, UncertainMatch};
use crate::services::resolution_cache::{cache_key, CachedSelection, ResolutionCache};
use crate::services::LibraryIndex;
use songdeck_common::{Error, Result};
use tracing::{debug, info, warn};

/// Outcome of a resolution pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub resolved: Vec<ResolvedMatch>,
    /// Entries the operator skipped
    pub unresolved: Vec<AmbiguousMatch>,
}

pub struct InteractiveResolver<'a> {
    library: &'a LibraryIndex,
    cache: &'a mut ResolutionCache,
}

impl<'a> InteractiveResolver<'a> {
    pub fn new(library: &'a LibraryIndex, cache: &'a mut ResolutionCache) -> Self {
        Self { library, cache }
    }

    /// Resolve every entry. Fails only when the operator aborts.
    pub fn resolve_all(
        &mut self,
        mut entries: Vec<UncertainMatch>,
        provider: &mut dyn DecisionProvider,
    ) -> Result<Resolution> {
        entries.sort_by_key(|e| e.line_number());
        let mut resolution = Resolution::default();

        for entry in entries {
            match self.resolve_one(&entry, provider)? {
                Some(matched) => resolution.resolved.push(matched),
                None => resolution.unresolved.push(entry.into_unresolved()),
            }
        }

        info!(
            resolved = resolution.resolved.len(),
            unresolved = resolution.unresolved.len(),
            "Resolution complete"
        );
        Ok(resolution)
    }

    /// Resolve one entry; `None` when the operator skips it
    pub fn resolve_one(
        &mut self,
        entry: &UncertainMatch,
        provider: &mut dyn DecisionProvider,
    ) -> Result<Option<ResolvedMatch>> {
        let request = entry.request();
        let key = cache_key(&request.original);

        if let Some(cached) = self.cache.get(&key).cloned() {
            match self.find_song(cached.song_id, entry.candidates()) {
                Some(song) => {
                    debug!(line = request.line_number, song_id = song.id, "Reusing cached selection");
                    let mut matched = ResolvedMatch::new(request.clone(), MatchKind::CachedSelection, song);
                    if !cached.display_title.is_empty() {
                        matched.title = cached.display_title;
                    }
                    return Ok(Some(matched));
                }
                None => warn!(
                    line = request.line_number,
                    song_id = cached.song_id,
                    "Cached song no longer in library, asking again"
                ),
            }
        }

        let candidates = entry.candidates();
        let (index, display_title) = match provider.choose_song(request, &entry.reason(), candidates)? {
            SongChoice::Select { index, display_title } => (index, display_title),
            SongChoice::Skip => {
                info!(line = request.line_number, original = %request.original, "Request skipped by operator");
                return Ok(None);
            }
        };

        let song = candidates.get(index).ok_or_else(|| {
            Error::InvalidInput(format!("selection {} out of {} candidates", index + 1, candidates.len()))
        })?;
        let mut matched = ResolvedMatch::new(request.clone(), MatchKind::ManualSelection, song);
        if let Some(title) = display_title {
            matched.title = title;
        }

        self.cache.put(
            key,
            CachedSelection {
                song_id: song.id,
                display_title: matched.title.clone(),
            },
        );
        if let Err(e) = self.cache.flush() {
            warn!(error = %e, "Failed to save song selection, it applies to this run only");
        }

        info!(line = request.line_number, song_id = song.id, title = %matched.title, "Selected song");
        Ok(Some(matched))
    }

    fn find_song<'s>(&self, id: i64, candidates: &'s [SongRecord]) -> Option<&'s SongRecord>
    where
        'a: 's,
    {
        candidates
            .iter()
            .find(|song| song.id == id)
            .or_else(|| self.library.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::{NonInteractiveDecisionProvider, ScriptedAnswer, ScriptedDecisionProvider};
    use crate::models::TargetRequest;
    use songdeck_common::MemoryStore;
    use std::collections::HashMap;

    fn song(id: i64, title: &str) -> SongRecord {
        SongRecord {
            id,
            title: title.to_string(),
            lyrics: format!("{} lyrics", title),
        }
    }

    fn request(line_number: usize, text: &str) -> TargetRequest {
        TargetRequest {
            line_number,
            original: text.to_string(),
            title: text.to_string(),
            hymn_number: String::new(),
        }
    }

    fn library() -> LibraryIndex {
        LibraryIndex::from_parts(
            vec![song(1, "Holy, Holy, Holy"), song(2, "Holy Ground"), song(3, "Amazing Grace")],
            HashMap::new(),
        )
        .unwrap()
    }

    fn ambiguous(line: usize, text: &str, lib: &LibraryIndex) -> UncertainMatch {
        UncertainMatch::Ambiguous(AmbiguousMatch {
            request: request(line, text),
            candidates: vec![lib.get(1).unwrap().clone(), lib.get(2).unwrap().clone()],
        })
    }

    #[test]
    fn test_manual_selection_is_flushed_immediately() {
        let lib = library();
        let store = MemoryStore::new();
        let mut cache = ResolutionCache::load(Box::new(store.clone()));
        let mut provider = ScriptedDecisionProvider::new([ScriptedAnswer::Song(SongChoice::Select {
            index: 1,
            display_title: Some("Holy Ground (Davis)".to_string()),
        })]);

        let mut resolver = InteractiveResolver::new(&lib, &mut cache);
        let matched = resolver
            .resolve_one(&ambiguous(4, "Holy", &lib), &mut provider)
            .unwrap()
            .unwrap();

        assert_eq!(matched.kind, MatchKind::ManualSelection);
        assert_eq!(matched.song_id, 2);
        assert_eq!(matched.title, "Holy Ground (Davis)");
        assert_eq!(store.writes(), 1);
        assert!(store.content().unwrap().contains("Holy Ground (Davis)"));
    }

    #[test]
    fn test_cached_selection_skips_prompt() {
        let lib = library();
        let store = MemoryStore::with_content(r#"{"holy": {"song_id": 1, "display_title": "Holy Holy Holy"}}"#);
        let mut cache = ResolutionCache::load(Box::new(store.clone()));
        let mut provider = ScriptedDecisionProvider::new([]);

        let mut resolver = InteractiveResolver::new(&lib, &mut cache);
        let matched = resolver
            .resolve_one(&ambiguous(2, "Holy!", &lib), &mut provider)
            .unwrap()
            .unwrap();

        assert_eq!(matched.kind, MatchKind::CachedSelection);
        assert_eq!(matched.song_id, 1);
        assert_eq!(matched.title, "Holy Holy Holy");
        assert!(provider.song_prompts.is_empty());
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn test_legacy_cached_id_uses_library_title() {
        let lib = library();
        let store = MemoryStore::with_content(r#"{"grace": 3}"#);
        let mut cache = ResolutionCache::load(Box::new(store));
        let mut provider = ScriptedDecisionProvider::new([]);

        // Cached id is outside the candidate list but still in the library
        let mut resolver = InteractiveResolver::new(&lib, &mut cache);
        let matched = resolver
            .resolve_one(&ambiguous(1, "Grace", &lib), &mut provider)
            .unwrap()
            .unwrap();
        assert_eq!(matched.song_id, 3);
        assert_eq!(matched.title, "Amazing Grace");
    }

    #[test]
    fn test_stale_cached_id_prompts_again() {
        let lib = library();
        let store = MemoryStore::with_content(r#"{"holy": {"song_id": 99, "display_title": "Gone"}}"#);
        let mut cache = ResolutionCache::load(Box::new(store));
        let mut provider = ScriptedDecisionProvider::new([ScriptedAnswer::Song(SongChoice::select(0))]);

        let mut resolver = InteractiveResolver::new(&lib, &mut cache);
        let matched = resolver
            .resolve_one(&ambiguous(1, "Holy", &lib), &mut provider)
            .unwrap()
            .unwrap();
        assert_eq!(matched.song_id, 1);
        assert_eq!(provider.song_prompts, vec![1]);
    }

    #[test]
    fn test_skip_and_fuzzy_confirmation_in_line_order() {
        let lib = library();
        let mut cache = ResolutionCache::load(Box::new(MemoryStore::new()));
        let fuzzy_request = request(2, "Amazin Grac");
        let fuzzy = UncertainMatch::Fuzzy {
            matched: ResolvedMatch::new(fuzzy_request, MatchKind::Fuzzy { score: 0.92 }, lib.get(3).unwrap()),
            song: lib.get(3).unwrap().clone(),
        };
        let mut provider = ScriptedDecisionProvider::new([
            ScriptedAnswer::Song(SongChoice::select(0)),
            ScriptedAnswer::Song(SongChoice::Skip),
        ]);

        let mut resolver = InteractiveResolver::new(&lib, &mut cache);
        let resolution = resolver
            .resolve_all(vec![ambiguous(5, "Holy", &lib), fuzzy], &mut provider)
            .unwrap();

        assert_eq!(provider.song_prompts, vec![2, 5]);
        assert_eq!(resolution.resolved.len(), 1);
        assert_eq!(resolution.resolved[0].song_id, 3);
        assert_eq!(resolution.unresolved.len(), 1);
        assert_eq!(resolution.unresolved[0].request.line_number, 5);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_abort_keeps_earlier_selections() {
        let lib = library();
        let store = MemoryStore::new();
        let mut cache = ResolutionCache::load(Box::new(store.clone()));
        let mut provider = ScriptedDecisionProvider::new([ScriptedAnswer::Song(SongChoice::select(0))]);

        let mut resolver = InteractiveResolver::new(&lib, &mut cache);
        let err = resolver
            .resolve_all(vec![ambiguous(1, "Holy", &lib), ambiguous(2, "Holy Spirit", &lib)], &mut provider)
            .unwrap_err();
        assert!(matches!(err, Error::Aborted(_)));

        let reloaded = ResolutionCache::load(Box::new(store));
        assert_eq!(reloaded.get("holy").map(|s| s.song_id), Some(1));
        assert!(reloaded.get("holy spirit").is_none());
    }

    #[test]
    fn test_non_interactive_leaves_everything_unresolved() {
        let lib = library();
        let mut cache = ResolutionCache::load(Box::new(MemoryStore::new()));
        let mut provider = NonInteractiveDecisionProvider;
        let mut resolver = InteractiveResolver::new(&lib, &mut cache);
        let resolution = resolver.resolve_all(vec![ambiguous(1, "Holy", &lib)], &mut provider).unwrap();
        assert!(resolution.resolved.is_empty());
        assert_eq!(resolution.unresolved.len(), 1);
    }
}
