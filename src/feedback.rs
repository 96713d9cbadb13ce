//! Feedback - a warning and suggestions derived from the weakest pattern found.
//!
//! Items are typed so a localization layer can translate them by key; their
//! `Display` is the English text.

use std::fmt;

use serde::Serialize;

use crate::matching::{DictionaryPattern, Match, MatchPattern, RegexName};
use crate::scoring::{is_all_upper, is_start_upper};
use crate::time_estimates::Score;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Warning {
    RowsOfKeys,
    ShortKeyboardPatterns,
    ShortRepeats,
    LongRepeats,
    Sequences,
    RecentYears,
    DatesAreEasy,
    SimilarToCommon,
    TopTenPassword,
    Top100Password,
    VeryCommonPassword,
    WordByItself,
    NamesByThemselves,
    CommonNamesAndSurnames,
    AllNumbers,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::RowsOfKeys => "Straight rows of keys are easy to guess",
            Self::ShortKeyboardPatterns => "Short keyboard patterns are easy to guess",
            Self::ShortRepeats => "Repeats like \"aaa\" are easy to guess",
            Self::LongRepeats => {
                "Repeats like \"abcabcabc\" are only slightly harder to guess than \"abc\""
            }
            Self::Sequences => "Sequences like abc or 6543 are easy to guess",
            Self::RecentYears => "Recent years are easy to guess",
            Self::DatesAreEasy => "Dates are often easy to guess",
            Self::SimilarToCommon => "This is similar to a commonly used password",
            Self::TopTenPassword => "This is a top-10 common password",
            Self::Top100Password => "This is a top-100 common password",
            Self::VeryCommonPassword => "This is a very common password",
            Self::WordByItself => "A word by itself is easy to guess",
            Self::NamesByThemselves => "Names and surnames by themselves are easy to guess",
            Self::CommonNamesAndSurnames => "Common names and surnames are easy to guess",
            Self::AllNumbers => "Passwords consisting of all numbers are easy to guess",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Suggestion {
    UseAFewWords,
    NoNeedForSymbols,
    AddAnotherWord,
    LongerKeyboardPattern,
    AvoidRepeatedWords,
    AvoidSequences,
    AvoidRecentYears,
    AvoidAssociatedYears,
    AvoidAssociatedDates,
    Capitalization,
    AllUppercase,
    ReversedWords,
    PredictableSubstitutions,
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::UseAFewWords => "Use a few words, avoid common phrases",
            Self::NoNeedForSymbols => "No need for symbols, digits, or uppercase letters",
            Self::AddAnotherWord => "Add another word or two. Uncommon words are better.",
            Self::LongerKeyboardPattern => "Use a longer keyboard pattern with more turns",
            Self::AvoidRepeatedWords => "Avoid repeated words and characters",
            Self::AvoidSequences => "Avoid sequences",
            Self::AvoidRecentYears => "Avoid recent years",
            Self::AvoidAssociatedYears => "Avoid years that are associated with you",
            Self::AvoidAssociatedDates => "Avoid dates and years that are associated with you",
            Self::Capitalization => "Capitalization doesn't help very much",
            Self::AllUppercase => "All-uppercase is almost as easy to guess as all-lowercase",
            Self::ReversedWords => "Reversed words aren't much harder to guess",
            Self::PredictableSubstitutions => {
                "Predictable substitutions like '@' instead of 'a' don't help very much"
            }
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub warning: Option<Warning>,
    pub suggestions: Vec<Suggestion>,
}

impl Feedback {
    /// Shown before anything has been typed.
    pub fn starting() -> Self {
        Self {
            warning: None,
            suggestions: vec![Suggestion::UseAFewWords, Suggestion::NoNeedForSymbols],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.warning.is_none() && self.suggestions.is_empty()
    }
}

/// Explains a weak password through the longest match of its winning sequence.
///
/// # Arguments
///
/// * `score` - The password's score; above `SomewhatGuessable` nothing is said
/// * `sequence` - The winning match sequence
///
/// # Returns
///
/// The starting hints for an empty sequence, otherwise feedback for the
/// longest match (the first one on ties). Sequences of several matches also
/// get a suggestion to add another word.
pub fn get_feedback(score: Score, sequence: &[Match]) -> Feedback {
    let Some(first) = sequence.first() else {
        return Feedback::starting();
    };
    if score > Score::SomewhatGuessable {
        return Feedback::default();
    }

    let longest = sequence[1..].iter().fold(first, |longest, m| {
        if m.token.chars().count() > longest.token.chars().count() {
            m
        } else {
            longest
        }
    });

    match get_match_feedback(longest, sequence.len() == 1) {
        Some(mut feedback) => {
            if sequence.len() > 1 {
                feedback.suggestions.insert(0, Suggestion::AddAnotherWord);
            }
            feedback
        }
        None => Feedback {
            warning: None,
            suggestions: vec![Suggestion::AddAnotherWord],
        },
    }
}

fn get_match_feedback(m: &Match, is_sole_match: bool) -> Option<Feedback> {
    let feedback = match &m.pattern {
        MatchPattern::Dictionary(d) => get_dictionary_match_feedback(m, d, is_sole_match),
        MatchPattern::Spatial(s) => Feedback {
            warning: Some(if s.turns == 1 {
                Warning::RowsOfKeys
            } else {
                Warning::ShortKeyboardPatterns
            }),
            suggestions: vec![Suggestion::LongerKeyboardPattern],
        },
        MatchPattern::Repeat(r) => Feedback {
            warning: Some(if r.base_token.chars().count() == 1 {
                Warning::ShortRepeats
            } else {
                Warning::LongRepeats
            }),
            suggestions: vec![Suggestion::AvoidRepeatedWords],
        },
        MatchPattern::Sequence(_) => Feedback {
            warning: Some(Warning::Sequences),
            suggestions: vec![Suggestion::AvoidSequences],
        },
        MatchPattern::Regex(r) => match r.regex_name {
            RegexName::RecentYear => Feedback {
                warning: Some(Warning::RecentYears),
                suggestions: vec![Suggestion::AvoidRecentYears, Suggestion::AvoidAssociatedYears],
            },
        },
        MatchPattern::Date(_) => Feedback {
            warning: Some(Warning::DatesAreEasy),
            suggestions: vec![Suggestion::AvoidAssociatedDates],
        },
        MatchPattern::Bruteforce => return None,
    };
    Some(feedback)
}

fn get_dictionary_match_feedback(m: &Match, d: &DictionaryPattern, is_sole_match: bool) -> Feedback {
    let warning = match d.dictionary_name.as_str() {
        "passwords" if is_sole_match && !d.l33t && !d.reversed => Some(match d.rank {
            0..=10 => Warning::TopTenPassword,
            11..=100 => Warning::Top100Password,
            _ => Warning::VeryCommonPassword,
        }),
        "passwords" if m.guesses_log10.is_some_and(|log| log <= 4.0) => Some(Warning::SimilarToCommon),
        "english_wikipedia" if is_sole_match => Some(Warning::WordByItself),
        "surnames" | "male_names" | "female_names" => Some(if is_sole_match {
            Warning::NamesByThemselves
        } else {
            Warning::CommonNamesAndSurnames
        }),
        _ => None,
    };

    let mut suggestions = Vec::new();
    let word = m.token.as_str();
    if is_start_upper(word) {
        suggestions.push(Suggestion::Capitalization);
    } else if is_all_upper(word) && word.to_lowercase() != word {
        suggestions.push(Suggestion::AllUppercase);
    }
    if d.reversed && word.chars().count() >= 4 {
        suggestions.push(Suggestion::ReversedWords);
    }
    if d.l33t {
        suggestions.push(Suggestion::PredictableSubstitutions);
    }

    Feedback { warning, suggestions }
}
