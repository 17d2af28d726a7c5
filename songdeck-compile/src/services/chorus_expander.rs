//! Chorus repetition for performance order
//!
//! With exactly one chorus, the chorus is repeated after every stanza that
//! comes after it has first been seen. Songs with zero or several choruses
//! are returned as parsed.

use crate::models::Section;

pub fn expand(sections: Vec<Section>, chorus_count: usize) -> Vec<Section> {
    if chorus_count != 1 {
        return sections;
    }

    let mut expanded = Vec::with_capacity(sections.len() * 2);
    let mut chorus: Option<Section> = None;

    for section in sections {
        if section.is_chorus() {
            chorus = Some(section.clone());
            expanded.push(section);
        } else {
            expanded.push(section);
            if let Some(chorus) = &chorus {
                expanded.push(chorus.clone());
            }
        }
    }

    expanded
}
