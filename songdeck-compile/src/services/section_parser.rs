//! Cleaned lyrics → stanza and chorus sections
//!
//! Single top-to-bottom scan:
//!
//! - a digits-only line is a stanza marker: it closes the current section
//!   and the next section is a stanza; the marker itself is dropped
//! - a blank line closes the current section
//! - any other line starting a section picks the type from indentation
//!   (two or more leading whitespace characters → chorus), unless a marker
//!   already fixed it
//!
//! Stanzas and choruses are numbered independently from 1.

use crate::models::{Section, SectionKind};

/// Minimum leading whitespace for an unmarked section to count as a chorus
pub const CHORUS_INDENT: usize = 2;

/// Parse cleaned lyrics. Returns the number of choruses and the sections in
/// text order.
pub fn parse(text: &str) -> (usize, Vec<Section>) {
    let mut parser = Parser::default();

    for line in text.lines() {
        let trimmed = line.trim();
        if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
            parser.flush();
            parser.kind = Some(SectionKind::Stanza);
        } else if trimmed.is_empty() {
            if !parser.buffer.is_empty() {
                parser.flush();
                parser.kind = None;
            }
        } else {
            if parser.buffer.is_empty() && parser.kind.is_none() {
                parser.kind = Some(kind_from_indent(line));
            }
            parser.buffer.push(line);
        }
    }
    parser.flush();

    (parser.choruses as usize, parser.sections)
}

fn kind_from_indent(line: &str) -> SectionKind {
    let indent = line.chars().take_while(|c| c.is_whitespace()).count();
    if indent >= CHORUS_INDENT {
        SectionKind::Chorus
    } else {
        SectionKind::Stanza
    }
}

#[derive(Default)]
struct Parser<'t> {
    buffer: Vec<&'t str>,
    kind: Option<SectionKind>,
    stanzas: u32,
    choruses: u32,
    sections: Vec<Section>,
}

impl Parser<'_> {
    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let content = self.buffer.join("\n").trim().to_string();
        self.buffer.clear();

        let kind = self.kind.unwrap_or(SectionKind::Stanza);
        let number = match kind {
            SectionKind::Stanza => {
                self.stanzas += 1;
                self.stanzas
            }
            SectionKind::Chorus => {
                self.choruses += 1;
                self.choruses
            }
        };
        self.sections.push(Section { kind, number, content });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_blank_lines_and_indent() {
        let (choruses, sections) = parse("1\nline one\nline two\n\n  chorus line\n\n2\nline three");
        assert_eq!(choruses, 1);
        assert_eq!(
            sections,
            vec![
                Section::stanza(1, "line one\nline two"),
                Section::chorus(1, "chorus line"),
                Section::stanza(2, "line three"),
            ]
        );
    }

    #[test]
    fn test_unmarked_sections_split_on_blank_lines() {
        let (choruses, sections) = parse("first verse\n\n    refrain a\n    refrain b\n\nsecond verse");
        assert_eq!(choruses, 1);
        assert_eq!(sections[0], Section::stanza(1, "first verse"));
        // Only the joined content is trimmed; inner indentation stays
        assert_eq!(sections[1], Section::chorus(1, "refrain a\n    refrain b"));
        assert_eq!(sections[2], Section::stanza(2, "second verse"));
    }

    #[test]
    fn test_marker_overrides_indentation() {
        let (choruses, sections) = parse("1\n  indented stanza");
        assert_eq!(choruses, 0);
        assert_eq!(sections, vec![Section::stanza(1, "indented stanza")]);
    }

    #[test]
    fn test_marker_type_survives_blank_line() {
        let (_, sections) = parse("3\n\n   still a stanza");
        assert_eq!(sections, vec![Section::stanza(1, "still a stanza")]);
    }

    #[test]
    fn test_marker_without_blank_line_splits() {
        let (_, sections) = parse("1\na\n2\nb");
        assert_eq!(sections, vec![Section::stanza(1, "a"), Section::stanza(2, "b")]);
    }

    #[test]
    fn test_single_space_is_not_chorus() {
        let (choruses, sections) = parse(" one space");
        assert_eq!(choruses, 0);
        assert_eq!(sections[0].kind, SectionKind::Stanza);
    }

    #[test]
    fn test_multiple_choruses_counted() {
        let (choruses, sections) = parse("v1\n\n  c1\n\nv2\n\n  c2");
        assert_eq!(choruses, 2);
        assert_eq!(sections[3], Section::chorus(2, "c2"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse(""), (0, vec![]));
        assert_eq!(parse("\n\n1\n\n"), (0, vec![]));
    }

    #[test]
    fn test_deterministic() {
        let text = "1\nA\n\n  B\n\n2\nC\n";
        assert_eq!(parse(text), parse(text));
    }
}
