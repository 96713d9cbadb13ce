//! Dictionary matching - finds ranked words anywhere in the password.

use std::collections::BTreeMap;

use crate::dictionaries::DictionarySet;

use super::{lowercase_chars, sorted, token_of, DictionaryPattern, Match, MatchPattern};

/// Tests every substring against every dictionary, ignoring case.
///
/// The token keeps the password's original casing; `matched_word` is the
/// lowercase dictionary entry.
pub fn dictionary_match(password: &[char], dictionaries: &DictionarySet<'_>) -> Vec<Match> {
    let len = password.len();
    let password_lower = lowercase_chars(password);
    let mut matches = Vec::new();

    for (dictionary_name, ranked) in dictionaries.iter() {
        let longest = ranked.max_word_len();
        for i in 0..len {
            let mut word = String::new();
            for j in i..len.min(i + longest) {
                word.push(password_lower[j]);
                if let Some(rank) = ranked.rank(&word) {
                    matches.push(Match::new(
                        i,
                        j,
                        token_of(password, i, j),
                        MatchPattern::Dictionary(DictionaryPattern {
                            matched_word: word.clone(),
                            rank,
                            dictionary_name: dictionary_name.to_string(),
                            reversed: false,
                            l33t: false,
                            sub: BTreeMap::new(),
                            sub_display: String::new(),
                            uppercase_variations: None,
                            l33t_variations: None,
                        }),
                    ));
                }
            }
        }
    }
    sorted(matches)
}

/// Dictionary matching over the reversed password, mapped back to forward offsets.
pub fn reverse_dictionary_match(password: &[char], dictionaries: &DictionarySet<'_>) -> Vec<Match> {
    let len = password.len();
    let reversed: Vec<char> = password.iter().rev().copied().collect();

    let mut matches = dictionary_match(&reversed, dictionaries);
    for m in &mut matches {
        m.token = m.token.chars().rev().collect();
        (m.i, m.j) = (len - 1 - m.j, len - 1 - m.i);
        if let MatchPattern::Dictionary(d) = &mut m.pattern {
            d.reversed = true;
        }
    }
    sorted(matches)
}
