//! Operator decisions
//!
//! Everything that blocks on a person goes through [`DecisionProvider`]:
//! picking a song among candidates, picking a lyric version, and editing the
//! alphabetical order. Production uses [`ConsoleDecisionProvider`]; batch
//! runs use [`NonInteractiveDecisionProvider`]; tests script answers with
//! [`ScriptedDecisionProvider`].
//!
//! Returning `Error::Aborted` from any method cancels the whole run.

use crate::models::{AlphaOrderEntry, SongRecord, TargetRequest};
use songdeck_common::{Error, Result};
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Characters of lyrics shown under each candidate
pub const SNIPPET_CHARS: usize = 120;

/// Operator answer for a song selection prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SongChoice {
    /// 0-based candidate index, with an optional display title override
    Select {
        index: usize,
        display_title: Option<String>,
    },
    /// Leave the request unresolved
    Skip,
}

impl SongChoice {
    pub fn select(index: usize) -> Self {
        SongChoice::Select {
            index,
            display_title: None,
        }
    }
}

/// One step of alphabetical order editing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderEdit {
    /// Swap two 1-based positions
    Swap(usize, usize),
    Save,
}

pub trait DecisionProvider {
    /// Choose among `candidates` for `request`
    fn choose_song(&mut self, request: &TargetRequest, reason: &str, candidates: &[SongRecord]) -> Result<SongChoice>;

    /// Choose a lyric version label (0-based). `None` means "no decision":
    /// the caller uses the first version and does not remember it.
    fn choose_version(&mut self, title: &str, labels: &[String]) -> Result<Option<usize>>;

    /// Next edit to the proposed alphabetical order
    fn edit_order(&mut self, entries: &[AlphaOrderEntry]) -> Result<OrderEdit>;
}

/// Line-oriented prompts over any reader/writer pair (stdin/stdout in production)
pub struct ConsoleDecisionProvider<R, W> {
    input: R,
    output: W,
}

impl ConsoleDecisionProvider<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsoleDecisionProvider<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn prompt(&mut self, text: &str) -> Result<String> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Err(Error::Aborted("end of input".to_string()));
        }
        Ok(line.trim().to_string())
    }

    /// Ask for a 1-based number until one in `1..=max` is given.
    /// Empty input returns `None` when `allow_empty`.
    fn prompt_number(&mut self, text: &str, max: usize, allow_empty: bool) -> Result<Option<usize>> {
        loop {
            let answer = self.prompt(text)?;
            if answer.is_empty() && allow_empty {
                return Ok(None);
            }
            match answer.parse::<usize>() {
                Ok(n) if (1..=max).contains(&n) => return Ok(Some(n - 1)),
                _ => writeln!(self.output, "Invalid number. Try again.")?,
            }
        }
    }

    fn print_order(&mut self, entries: &[AlphaOrderEntry]) -> Result<()> {
        for (i, entry) in entries.iter().enumerate() {
            writeln!(self.output, "  {}. {:02} - {}", i + 1, entry.position, entry.title)?;
        }
        Ok(())
    }
}

impl<R: BufRead, W: Write> DecisionProvider for ConsoleDecisionProvider<R, W> {
    fn choose_song(&mut self, request: &TargetRequest, reason: &str, candidates: &[SongRecord]) -> Result<SongChoice> {
        writeln!(self.output, "\nTarget (line {}): {} ({})\n", request.line_number, request.original, reason)?;
        for (i, song) in candidates.iter().enumerate() {
            writeln!(self.output, "  [{}] {} (ID: {})", i + 1, song.title, song.id)?;
            writeln!(self.output, "{}", "-".repeat(50))?;
            writeln!(self.output, "{}...", song.snippet(SNIPPET_CHARS))?;
            writeln!(self.output, "{}\n", "-".repeat(50))?;
        }

        let question = format!("Select the correct song [1-{}] (Enter to skip): ", candidates.len());
        let Some(index) = self.prompt_number(&question, candidates.len(), true)? else {
            writeln!(self.output, "Skipped.")?;
            return Ok(SongChoice::Skip);
        };

        let title = &candidates[index].title;
        let answer = self.prompt(&format!("Display title [{}]: ", title))?;
        let display_title = (!answer.is_empty()).then_some(answer);
        writeln!(self.output, "Selected: {}\n", display_title.as_deref().unwrap_or(title))?;

        Ok(SongChoice::Select { index, display_title })
    }

    fn choose_version(&mut self, title: &str, labels: &[String]) -> Result<Option<usize>> {
        writeln!(self.output, "\n'{}' has {} lyric versions:", title, labels.len())?;
        for (i, label) in labels.iter().enumerate() {
            writeln!(self.output, "  [{}] {}", i + 1, label)?;
        }
        let question = format!("Select a version [1-{}]: ", labels.len());
        self.prompt_number(&question, labels.len(), false)
    }

    fn edit_order(&mut self, entries: &[AlphaOrderEntry]) -> Result<OrderEdit> {
        writeln!(self.output, "\nCurrent order:")?;
        self.print_order(entries)?;

        loop {
            let answer = self.prompt("\nEnter two numbers to swap (e.g. '3 5'), or 's' to save: ")?;
            if answer.eq_ignore_ascii_case("s") {
                return Ok(OrderEdit::Save);
            }

            let numbers: Vec<usize> = answer
                .split_whitespace()
                .filter_map(|part| part.parse().ok())
                .collect();
            match numbers.as_slice() {
                [a, b] if (1..=entries.len()).contains(a) && (1..=entries.len()).contains(b) => {
                    return Ok(OrderEdit::Swap(*a, *b));
                }
                [_, _] => writeln!(self.output, "Invalid numbers, try again.")?,
                _ => writeln!(self.output, "Invalid input, enter two numbers or 's'.")?,
            }
        }
    }
}

/// Never blocks: skips every uncertain match, leaves version choice to the
/// caller's default, and accepts the alphabetical order as proposed
#[derive(Debug, Clone, Copy, Default)]
pub struct NonInteractiveDecisionProvider;

impl DecisionProvider for NonInteractiveDecisionProvider {
    fn choose_song(&mut self, request: &TargetRequest, _reason: &str, candidates: &[SongRecord]) -> Result<SongChoice> {
        tracing::debug!(line = request.line_number, candidates = candidates.len(), "Non-interactive: skipping");
        Ok(SongChoice::Skip)
    }

    fn choose_version(&mut self, _title: &str, _labels: &[String]) -> Result<Option<usize>> {
        Ok(None)
    }

    fn edit_order(&mut self, _entries: &[AlphaOrderEntry]) -> Result<OrderEdit> {
        Ok(OrderEdit::Save)
    }
}

/// Scripted answer for [`ScriptedDecisionProvider`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedAnswer {
    Song(SongChoice),
    Version(usize),
    Order(OrderEdit),
}

/// Replays answers in order and records which prompts were asked.
///
/// Running out of answers behaves like end of input (`Error::Aborted`).
#[derive(Debug, Default)]
pub struct ScriptedDecisionProvider {
    answers: VecDeque<ScriptedAnswer>,
    /// Line numbers of song prompts, in order
    pub song_prompts: Vec<usize>,
    /// Song titles of version prompts, in order
    pub version_prompts: Vec<String>,
    pub order_prompts: usize,
}

impl ScriptedDecisionProvider {
    pub fn new(answers: impl IntoIterator<Item = ScriptedAnswer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, prompt: &str) -> Result<ScriptedAnswer> {
        self.answers
            .pop_front()
            .ok_or_else(|| Error::Aborted(format!("no scripted answer for {}", prompt)))
    }
}

impl DecisionProvider for ScriptedDecisionProvider {
    fn choose_song(&mut self, request: &TargetRequest, _reason: &str, candidates: &[SongRecord]) -> Result<SongChoice> {
        self.song_prompts.push(request.line_number);
        match self.next("song prompt")? {
            ScriptedAnswer::Song(SongChoice::Select { index, .. }) if index >= candidates.len() => Err(
                Error::InvalidInput(format!("scripted index {} out of {} candidates", index, candidates.len())),
            ),
            ScriptedAnswer::Song(choice) => Ok(choice),
            other => Err(Error::InvalidInput(format!("expected song answer, got {:?}", other))),
        }
    }

    fn choose_version(&mut self, title: &str, labels: &[String]) -> Result<Option<usize>> {
        self.version_prompts.push(title.to_string());
        match self.next("version prompt")? {
            ScriptedAnswer::Version(index) if index < labels.len() => Ok(Some(index)),
            other => Err(Error::InvalidInput(format!("unusable version answer {:?}", other))),
        }
    }

    fn edit_order(&mut self, _entries: &[AlphaOrderEntry]) -> Result<OrderEdit> {
        self.order_prompts += 1;
        match self.next("order prompt")? {
            ScriptedAnswer::Order(edit) => Ok(edit),
            other => Err(Error::InvalidInput(format!("expected order answer, got {:?}", other))),
        }
    }
}
