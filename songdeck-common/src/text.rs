//! Text normalization and similarity scoring
//!
//! `normalize` produces the comparison key used everywhere a request is
//! compared against the library. It is never used for display.
//!
//! `similarity` is a matching-blocks ratio (Ratcliff/Obershelp style): the
//! longest common block is found, then the regions to its left and right are
//! searched recursively. The score is `2 * matched / (len_a + len_b)`.

use std::collections::HashMap;
use unicode_normalization::UnicodeNormalization;

/// Canonicalize a string for comparison.
///
/// Decomposes to NFKD and drops everything outside ASCII (which removes
/// combining diacritics), keeps only word characters (`[A-Za-z0-9_]`) and
/// whitespace (see [`is_space`]), lowercases, and trims.
///
/// # Examples
///
/// ```
/// use songdeck_common::text::normalize;
///
/// assert_eq!(normalize("  Ámazing Grace! "), "amazing grace");
/// assert_eq!(normalize("O Lord, my God"), "o lord my god");
/// ```
pub fn normalize(s: &str) -> String {
    s.nfkd()
        .filter(|c| c.is_ascii())
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || is_space(*c))
        .collect::<String>()
        .to_lowercase()
        .trim_matches(is_space)
        .to_string()
}

/// ASCII whitespace as regex `\s` sees it: `\t \n \x0B \x0C \r`, space, and
/// the `\x1C`-`\x1F` separators. `char::is_ascii_whitespace` misses `\x0B`.
pub fn is_space(c: char) -> bool {
    matches!(c, '\t'..='\r' | '\x1C'..='\x1F' | ' ')
}

/// Similarity ratio in `[0.0, 1.0]` between the normalized forms of `a` and `b`.
///
/// Two empty strings are identical (1.0).
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = normalize(a).chars().collect();
    let b: Vec<char> = normalize(b).chars().collect();
    SequenceMatcher::new(&a, &b).ratio()
}

/// A contiguous run where `a[a_start..a_start + size] == b[b_start..b_start + size]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchingBlock {
    pub a_start: usize,
    pub b_start: usize,
    pub size: usize,
}

/// Longest-matching-block sequence matcher over two char slices.
///
/// No junk heuristic is applied; inputs here are song titles, short enough
/// that popularity-based junk pruning would never trigger.
pub struct SequenceMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    /// Positions of each char in `b`, ascending
    b2j: HashMap<char, Vec<usize>>,
}

impl<'a> SequenceMatcher<'a> {
    pub fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, c) in b.iter().enumerate() {
            b2j.entry(*c).or_default().push(j);
        }
        Self { a, b, b2j }
    }

    /// Longest block matching within `a[alo..ahi]` and `b[blo..bhi]`.
    ///
    /// Ties go to the block starting earliest in `a`, then earliest in `b`.
    pub fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> MatchingBlock {
        let mut best = MatchingBlock {
            a_start: alo,
            b_start: blo,
            size: 0,
        };
        // j2len[j] = length of the match ending at a[i - 1], b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();

        for i in alo..ahi {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next.insert(j, k);
                    if k > best.size {
                        best = MatchingBlock {
                            a_start: i + 1 - k,
                            b_start: j + 1 - k,
                            size: k,
                        };
                    }
                }
            }
            j2len = next;
        }

        best
    }

    /// All non-overlapping matching blocks, ordered by position
    pub fn matching_blocks(&self) -> Vec<MatchingBlock> {
        let mut pending = vec![(0, self.a.len(), 0, self.b.len())];
        let mut blocks = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = pending.pop() {
            let m = self.find_longest_match(alo, ahi, blo, bhi);
            if m.size == 0 {
                continue;
            }
            blocks.push(m);
            if alo < m.a_start && blo < m.b_start {
                pending.push((alo, m.a_start, blo, m.b_start));
            }
            let (a_end, b_end) = (m.a_start + m.size, m.b_start + m.size);
            if a_end < ahi && b_end < bhi {
                pending.push((a_end, ahi, b_end, bhi));
            }
        }

        blocks.sort_by_key(|m| (m.a_start, m.b_start));
        blocks
    }

    /// `2 * matched / (len_a + len_b)`, or 1.0 when both inputs are empty
    pub fn ratio(&self) -> f64 {
        let total = self.a.len() + self.b.len();
        if total == 0 {
            return 1.0;
        }
        let matched: usize = self.matching_blocks().iter().map(|m| m.size).sum();
        2.0 * matched as f64 / total as f64
    }
}
