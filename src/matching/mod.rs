//! Pattern matchers
//!
//! Each matcher explains substrings of the password by one kind of human
//! pattern. Matchers run independently and may overlap freely; the scorer
//! later picks the cheapest non-overlapping cover.

mod date;
mod dictionary;
mod l33t;
mod regex_match;
mod repeat;
mod sequence;
mod spatial;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::dictionaries::DictionarySet;

pub use date::date_match;
pub use dictionary::{dictionary_match, reverse_dictionary_match};
pub use l33t::l33t_match;
pub use regex_match::regex_match;
pub use repeat::repeat_match;
pub use sequence::sequence_match;
pub use spatial::spatial_match;

/// A matcher takes the password as chars plus the dictionaries for this run.
pub type Matcher = fn(&[char], &DictionarySet<'_>) -> Vec<Match>;

/// A candidate explanation of `password[i..=j]` (char offsets, inclusive).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub i: usize,
    pub j: usize,
    pub token: String,
    #[serde(flatten)]
    pub pattern: MatchPattern,
    /// Memoized by the scorer, `None` until estimated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guesses: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guesses_log10: Option<f64>,
}

impl Match {
    pub fn new(i: usize, j: usize, token: String, pattern: MatchPattern) -> Self {
        assert!(i <= j, "match start {i} past end {j}");
        Self {
            i,
            j,
            token,
            pattern,
            guesses: None,
            guesses_log10: None,
        }
    }

    /// Token length in chars.
    pub fn len(&self) -> usize {
        self.j - self.i + 1
    }

    pub fn is_bruteforce(&self) -> bool {
        matches!(self.pattern, MatchPattern::Bruteforce)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "pattern", rename_all = "snake_case")]
pub enum MatchPattern {
    Dictionary(DictionaryPattern),
    Spatial(SpatialPattern),
    Repeat(RepeatPattern),
    Sequence(SequencePattern),
    Regex(RegexPattern),
    Date(DatePattern),
    /// Synthesized by the scorer for spans no matcher explains.
    Bruteforce,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DictionaryPattern {
    pub matched_word: String,
    pub rank: usize,
    pub dictionary_name: String,
    pub reversed: bool,
    pub l33t: bool,
    /// l33t character -> plain letter, restricted to what the token uses.
    pub sub: BTreeMap<char, char>,
    pub sub_display: String,
    /// Filled in by the scorer.
    pub uppercase_variations: Option<f64>,
    pub l33t_variations: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpatialPattern {
    pub graph: &'static str,
    pub turns: usize,
    pub shifted_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepeatPattern {
    pub base_token: String,
    pub base_guesses: f64,
    pub base_matches: Vec<Match>,
    pub repeat_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequencePattern {
    pub sequence_name: &'static str,
    pub sequence_space: u32,
    pub ascending: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegexName {
    RecentYear,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegexPattern {
    pub regex_name: RegexName,
    pub captured: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatePattern {
    pub separator: Option<char>,
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

/// Runs every matcher over `password` and returns the union sorted by `(i, j)`.
pub fn omnimatch(password: &str, dictionaries: &DictionarySet<'_>) -> Vec<Match> {
    let chars: Vec<char> = password.chars().collect();

    // Orchestrator: execute matchers in sequence
    let matchers: [(&str, Matcher); 8] = [
        ("dictionary", dictionary_match),
        ("reverse_dictionary", reverse_dictionary_match),
        ("l33t", l33t_match),
        ("spatial", spatial_match),
        ("repeat", repeat_match),
        ("sequence", sequence_match),
        ("regex", regex_match),
        ("date", date_match),
    ];

    let mut matches = Vec::new();
    for (_matcher_name, matcher) in matchers {
        let found = matcher(&chars, dictionaries);
        #[cfg(feature = "tracing")]
        tracing::debug!(matcher = _matcher_name, count = found.len(), "matcher finished");
        matches.extend(found);
    }
    sorted(matches)
}

pub(crate) fn sorted(mut matches: Vec<Match>) -> Vec<Match> {
    matches.sort_by_key(|m| (m.i, m.j));
    matches
}

pub(crate) fn token_of(chars: &[char], i: usize, j: usize) -> String {
    chars[i..=j].iter().collect()
}

/// Lowercases char by char, keeping offsets aligned with the input.
pub(crate) fn lowercase_chars(chars: &[char]) -> Vec<char> {
    chars
        .iter()
        .map(|&c| {
            let mut lower = c.to_lowercase();
            match (lower.next(), lower.next()) {
                (Some(l), None) => l,
                _ => c,
            }
        })
        .collect()
}
