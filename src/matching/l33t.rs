//! l33t matching - dictionary words disguised with character substitutions.

use std::collections::BTreeMap;

use crate::dictionaries::DictionarySet;

use super::{dictionary_match, lowercase_chars, sorted, token_of, Match, MatchPattern};

/// Plain letter -> characters commonly typed in its place.
pub const L33T_TABLE: &[(char, &[char])] = &[
    ('a', &['4', '@']),
    ('b', &['8']),
    ('c', &['(', '{', '[', '<']),
    ('e', &['3']),
    ('g', &['6', '9']),
    ('i', &['1', '!', '|']),
    ('l', &['1', '|', '7']),
    ('o', &['0']),
    ('s', &['$', '5']),
    ('t', &['+', '7']),
    ('x', &['%']),
    ('z', &['2']),
];

/// l33t character -> the letter it stands for in one assignment.
pub type Substitution = BTreeMap<char, char>;

pub fn l33t_match(password: &[char], dictionaries: &DictionarySet<'_>) -> Vec<Match> {
    l33t_match_with_table(password, dictionaries, L33T_TABLE)
}

pub(crate) fn l33t_match_with_table(
    password: &[char],
    dictionaries: &DictionarySet<'_>,
    table: &[(char, &[char])],
) -> Vec<Match> {
    let mut matches = Vec::new();

    for sub in enumerate_l33t_subs(&relevant_l33t_subtable(password, table)) {
        if sub.is_empty() {
            // password has no relevant substitutions
            break;
        }
        let subbed: Vec<char> = password
            .iter()
            .map(|c| sub.get(c).copied().unwrap_or(*c))
            .collect();

        for mut m in dictionary_match(&subbed, dictionaries) {
            let token_chars = &password[m.i..=m.j];
            let MatchPattern::Dictionary(d) = &mut m.pattern else {
                continue;
            };
            let token_lower: String = lowercase_chars(token_chars).into_iter().collect();
            if token_lower == d.matched_word {
                // no substitution actually happened
                continue;
            }

            let match_sub: Substitution = sub
                .iter()
                .filter(|(l33t_chr, _)| token_chars.contains(l33t_chr))
                .map(|(&l33t_chr, &letter)| (l33t_chr, letter))
                .collect();
            d.l33t = true;
            d.sub_display = match_sub
                .iter()
                .map(|(l33t_chr, letter)| format!("{l33t_chr} -> {letter}"))
                .collect::<Vec<_>>()
                .join(", ");
            d.sub = match_sub;
            m.token = token_of(password, m.i, m.j);
            matches.push(m);
        }
    }

    // single-character l33t matches ('1' -> 'i') are noise
    matches.retain(|m| m.len() > 1);
    sorted(matches)
}

/// Prunes `table` down to the substitutions whose l33t characters occur in `password`.
pub(crate) fn relevant_l33t_subtable(
    password: &[char],
    table: &[(char, &[char])],
) -> Vec<(char, Vec<char>)> {
    table
        .iter()
        .filter_map(|&(letter, subs)| {
            let relevant: Vec<char> = subs
                .iter()
                .copied()
                .filter(|sub| password.contains(sub))
                .collect();
            (!relevant.is_empty()).then_some((letter, relevant))
        })
        .collect()
}

/// Enumerates every distinct assignment of l33t characters to letters.
///
/// A l33t character stands for one letter per assignment; when two letters
/// share a l33t character (`1` for `i` and `l`) both alternatives are kept.
/// Returns a single empty assignment for an empty table.
pub(crate) fn enumerate_l33t_subs(table: &[(char, Vec<char>)]) -> Vec<Substitution> {
    let mut subs: Vec<Vec<(char, char)>> = vec![Vec::new()];

    for (letter, l33t_chrs) in table {
        let mut next_subs = Vec::new();
        for &l33t_chr in l33t_chrs {
            for sub in &subs {
                match sub.iter().position(|&(existing, _)| existing == l33t_chr) {
                    None => {
                        let mut extension = sub.clone();
                        extension.push((l33t_chr, *letter));
                        next_subs.push(extension);
                    }
                    Some(dup) => {
                        let mut alternative = sub.clone();
                        alternative.remove(dup);
                        alternative.push((l33t_chr, *letter));
                        next_subs.push(sub.clone());
                        next_subs.push(alternative);
                    }
                }
            }
        }
        subs = dedup(next_subs);
    }

    subs.into_iter()
        .map(|sub| sub.into_iter().collect())
        .collect()
}

fn dedup(subs: Vec<Vec<(char, char)>>) -> Vec<Vec<(char, char)>> {
    let mut seen: Vec<Substitution> = Vec::new();
    let mut deduped = Vec::new();
    for sub in subs {
        let key: Substitution = sub.iter().copied().collect();
        if !seen.contains(&key) {
            seen.push(key);
            deduped.push(sub);
        }
    }
    deduped
}
