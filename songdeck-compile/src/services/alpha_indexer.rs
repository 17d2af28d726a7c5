//! Alphabetical index of compiled songs
//!
//! The default order sorts by title, case-insensitively. An order saved by a
//! previous run takes precedence and is matched by title, so it survives
//! position changes in the target list. Without a saved order, the proposed
//! order goes through pairwise swap editing and is then saved.

use crate::decision::{DecisionProvider, OrderEdit};
use crate::models::{AlphaOrderEntry, CompiledSong};
use songdeck_common::store::{load_document, save_document, DocumentStore};
use songdeck_common::Result;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, info, warn};

/// Songs sorted by lowercase title; equal titles keep their input order
pub fn default_order(songs: &[CompiledSong]) -> Vec<AlphaOrderEntry> {
    let mut entries: Vec<AlphaOrderEntry> = songs.iter().map(AlphaOrderEntry::from).collect();
    entries.sort_by_cached_key(|e| e.title.to_lowercase());
    entries
}

/// Apply a saved order to the current songs.
///
/// Saved entries whose title is not among `songs` are dropped. Songs the
/// saved order does not mention are appended in default order.
pub fn apply_saved_order(saved: &[AlphaOrderEntry], songs: &[CompiledSong]) -> Vec<AlphaOrderEntry> {
    let mut positions: HashMap<&str, VecDeque<usize>> = HashMap::new();
    for song in songs {
        positions.entry(song.title.as_str()).or_default().push_back(song.position);
    }

    let mut ordered = Vec::with_capacity(songs.len());
    for entry in saved {
        match positions.get_mut(entry.title.as_str()).and_then(VecDeque::pop_front) {
            Some(position) => ordered.push(AlphaOrderEntry::new(position, entry.title.clone())),
            None => debug!(title = %entry.title, "Saved order entry not in this run, dropped"),
        }
    }

    let remaining: HashSet<usize> = positions.into_values().flatten().collect();
    let leftovers: Vec<CompiledSong> = songs
        .iter()
        .filter(|song| remaining.contains(&song.position))
        .cloned()
        .collect();

    if !leftovers.is_empty() {
        warn!(count = leftovers.len(), "Songs missing from saved order, appending alphabetically");
        ordered.extend(default_order(&leftovers));
    }

    ordered
}

/// Run the swap loop until the provider saves
pub fn edit_order(mut entries: Vec<AlphaOrderEntry>, provider: &mut dyn DecisionProvider) -> Result<Vec<AlphaOrderEntry>> {
    loop {
        match provider.edit_order(&entries)? {
            OrderEdit::Save => return Ok(entries),
            OrderEdit::Swap(a, b) if (1..=entries.len()).contains(&a) && (1..=entries.len()).contains(&b) => {
                entries.swap(a - 1, b - 1);
                debug!(a, b, "Swapped index entries");
            }
            OrderEdit::Swap(a, b) => warn!(a, b, len = entries.len(), "Ignoring out-of-range swap"),
        }
    }
}

/// Produces the alphabetical index and owns the saved-order store
pub struct AlphabeticalIndexer {
    store: Box<dyn DocumentStore>,
}

impl AlphabeticalIndexer {
    pub fn new(store: Box<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Previously saved order; an empty, missing or unreadable document is `None`
    pub fn load_saved(&self) -> Option<Vec<AlphaOrderEntry>> {
        match load_document::<Vec<AlphaOrderEntry>>(self.store.as_ref()) {
            Ok(Some(entries)) if !entries.is_empty() => Some(entries),
            Ok(_) => None,
            Err(e) => {
                warn!(store = %self.store.location(), error = %e, "Saved song order unreadable, ignoring it");
                None
            }
        }
    }

    pub fn save(&self, entries: &[AlphaOrderEntry]) -> Result<()> {
        save_document(self.store.as_ref(), entries)?;
        info!(store = %self.store.location(), entries = entries.len(), "Song order saved");
        Ok(())
    }

    /// Alphabetical index for `songs`
    pub fn order(&self, songs: &[CompiledSong], provider: &mut dyn DecisionProvider) -> Result<Vec<AlphaOrderEntry>> {
        if let Some(saved) = self.load_saved() {
            info!(entries = saved.len(), "Using saved song order");
            return Ok(apply_saved_order(&saved, songs));
        }

        info!("No saved song order, starting from alphabetical");
        let entries = edit_order(default_order(songs), provider)?;
        if let Err(e) = self.save(&entries) {
            warn!(error = %e, "Failed to save song order");
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::{NonInteractiveDecisionProvider, ScriptedAnswer, ScriptedDecisionProvider};
    use songdeck_common::MemoryStore;

    fn compiled(position: usize, title: &str) -> CompiledSong {
        CompiledSong {
            position,
            song_id: position as i64,
            title: title.to_string(),
            chorus_count: 0,
            sections: vec![],
        }
    }

    fn titles(entries: &[AlphaOrderEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.title.as_str()).collect()
    }

    fn songs() -> Vec<CompiledSong> {
        vec![compiled(1, "be thou my vision"), compiled(2, "Amazing Grace"), compiled(4, "Abide with Me")]
    }

    #[test]
    fn test_default_order_ignores_case() {
        let order = default_order(&songs());
        assert_eq!(titles(&order), vec!["Abide with Me", "Amazing Grace", "be thou my vision"]);
        assert_eq!(order[0].position, 4);
    }

    #[test]
    fn test_saved_order_applied_by_title() {
        let saved = vec![
            AlphaOrderEntry::new(9, "Amazing Grace"),
            AlphaOrderEntry::new(3, "Gone Song"),
            AlphaOrderEntry::new(1, "Abide with Me"),
        ];
        let order = apply_saved_order(&saved, &songs());
        assert_eq!(titles(&order), vec!["Amazing Grace", "Abide with Me", "be thou my vision"]);
        // Positions come from this run
        assert_eq!(order[0].position, 2);
        assert_eq!(order[1].position, 4);
    }

    #[test]
    fn test_duplicate_titles_each_placed_once() {
        let songs = vec![compiled(1, "Doxology"), compiled(5, "Doxology"), compiled(3, "Amen")];
        let saved = vec![AlphaOrderEntry::new(1, "Doxology")];
        let order = apply_saved_order(&saved, &songs);
        assert_eq!(
            order,
            vec![
                AlphaOrderEntry::new(1, "Doxology"),
                AlphaOrderEntry::new(3, "Amen"),
                AlphaOrderEntry::new(5, "Doxology"),
            ]
        );
    }

    #[test]
    fn test_edit_then_save_persists() {
        let store = MemoryStore::new();
        let indexer = AlphabeticalIndexer::new(Box::new(store.clone()));
        let mut provider = ScriptedDecisionProvider::new([
            ScriptedAnswer::Order(OrderEdit::Swap(1, 3)),
            ScriptedAnswer::Order(OrderEdit::Save),
        ]);

        let order = indexer.order(&songs(), &mut provider).unwrap();
        assert_eq!(titles(&order), vec!["be thou my vision", "Amazing Grace", "Abide with Me"]);
        assert_eq!(provider.order_prompts, 2);

        // Next run reuses it without prompting
        let order = indexer.order(&songs(), &mut provider).unwrap();
        assert_eq!(titles(&order), vec!["be thou my vision", "Amazing Grace", "Abide with Me"]);
        assert_eq!(provider.order_prompts, 2);
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn test_corrupt_or_empty_saved_order_is_ignored() {
        for content in ["{\"a\": 1}", "[]"] {
            let indexer = AlphabeticalIndexer::new(Box::new(MemoryStore::with_content(content)));
            assert!(indexer.load_saved().is_none());
            let order = indexer.order(&songs(), &mut NonInteractiveDecisionProvider).unwrap();
            assert_eq!(titles(&order), vec!["Abide with Me", "Amazing Grace", "be thou my vision"]);
        }
    }
}
