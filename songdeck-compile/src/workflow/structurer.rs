//! Resolved match → compiled song
//!
//! Version choice, cleaning, section parsing and chorus expansion for one
//! song at a time.

use crate::decision::DecisionProvider;
use crate::models::{CompiledSong, ResolvedMatch};
use crate::services::{chorus_expander, lyrics_cleaner, section_parser, LyricVersionCache};
use songdeck_common::Result;
use tracing::{debug, warn};

pub struct LyricStructurer {
    versions: LyricVersionCache,
    repeat_choruses: bool,
}

impl LyricStructurer {
    pub fn new(versions: LyricVersionCache, repeat_choruses: bool) -> Self {
        Self {
            versions,
            repeat_choruses,
        }
    }

    /// Structure one song. Only fails when the operator aborts a version prompt.
    pub fn structure(&mut self, matched: &ResolvedMatch, provider: &mut dyn DecisionProvider) -> Result<CompiledSong> {
        let chosen = lyrics_cleaner::choose_version(&matched.title, &matched.lyrics, &mut self.versions, provider)?;
        let cleaned = lyrics_cleaner::clean(&chosen);
        let (chorus_count, sections) = section_parser::parse(&cleaned);

        let sections = if self.repeat_choruses {
            chorus_expander::expand(sections, chorus_count)
        } else {
            sections
        };

        if chorus_count > 1 {
            warn!(title = %matched.title, choruses = chorus_count, "Song has several choruses, compiled as parsed");
        }
        debug!(
            line = matched.line_number(),
            title = %matched.title,
            sections = sections.len(),
            chorus_count,
            "Structured lyrics"
        );

        Ok(CompiledSong {
            position: matched.line_number(),
            song_id: matched.song_id,
            title: matched.title.clone(),
            chorus_count,
            sections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::{ScriptedAnswer, ScriptedDecisionProvider};
    use crate::models::{MatchKind, Section, SongRecord, TargetRequest};
    use songdeck_common::MemoryStore;

    fn matched(lyrics: &str) -> ResolvedMatch {
        let request = TargetRequest {
            line_number: 6,
            original: "Be Thou".to_string(),
            title: "Be Thou".to_string(),
            hymn_number: String::new(),
        };
        let song = SongRecord {
            id: 40,
            title: "Be Thou My Vision".to_string(),
            lyrics: lyrics.to_string(),
        };
        ResolvedMatch::new(request, MatchKind::Title, &song)
    }

    fn structurer(repeat: bool) -> LyricStructurer {
        LyricStructurer::new(LyricVersionCache::load(Box::new(MemoryStore::new())), repeat)
    }

    const LYRICS: &str = "# SLANE\nCapo 1\n1\n[D]Be Thou my vision\n\n  [G]Refrain\n\n2\nBe Thou my wisdom";

    #[test]
    fn test_structure_with_repetition() {
        let mut provider = ScriptedDecisionProvider::new([]);
        let song = structurer(true).structure(&matched(LYRICS), &mut provider).unwrap();

        assert_eq!(song.position, 6);
        assert_eq!(song.song_id, 40);
        assert_eq!(song.chorus_count, 1);
        assert_eq!(
            song.sections,
            vec![
                Section::stanza(1, "Be Thou my vision"),
                Section::chorus(1, "Refrain"),
                Section::stanza(2, "Be Thou my wisdom"),
                Section::chorus(1, "Refrain"),
            ]
        );
    }

    #[test]
    fn test_structure_without_repetition() {
        let mut provider = ScriptedDecisionProvider::new([]);
        let song = structurer(false).structure(&matched(LYRICS), &mut provider).unwrap();
        assert_eq!(song.sections.len(), 3);
    }

    #[test]
    fn test_versioned_lyrics_prompt_once_per_title() {
        let lyrics = "### Long\n1\nlong verse\n### Short\n1\nshort verse";
        let mut provider = ScriptedDecisionProvider::new([ScriptedAnswer::Version(1)]);
        let mut structurer = structurer(true);

        let song = structurer.structure(&matched(lyrics), &mut provider).unwrap();
        assert_eq!(song.sections, vec![Section::stanza(1, "short verse")]);

        let again = structurer.structure(&matched(lyrics), &mut provider).unwrap();
        assert_eq!(again.sections, song.sections);
        assert_eq!(provider.version_prompts, vec!["Be Thou My Vision".to_string()]);
    }
}
