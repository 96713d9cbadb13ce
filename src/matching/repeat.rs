//! Repeat matching - runs of one unit repeated back to back ("aaa", "abcabc").

use crate::dictionaries::DictionarySet;
use crate::scoring::most_guessable_match_sequence;

use super::{omnimatch, token_of, Match, MatchPattern, RepeatPattern};

/// Scans left to right for `(unit)+` runs and scores each unit recursively.
///
/// At a run's start both the shortest and the longest repeating unit are
/// tried; the one covering more characters wins, and a long winner is then
/// reduced to its minimal unit (`aabaab` repeats `aab`, `abababab` repeats `ab`).
pub fn repeat_match(password: &[char], dictionaries: &DictionarySet<'_>) -> Vec<Match> {
    let len = password.len();
    let mut matches = Vec::new();
    let mut last_index = 0;

    while last_index < len {
        let Some(start) = (last_index..len).find(|&p| shortest_unit(password, p).is_some()) else {
            break;
        };
        let (Some(lazy_unit), Some(greedy_unit)) =
            (shortest_unit(password, start), longest_unit(password, start))
        else {
            break;
        };

        let lazy_span = lazy_unit * copies(password, start, lazy_unit);
        let greedy_span = greedy_unit * copies(password, start, greedy_unit);
        let (span, base_len) = if greedy_span > lazy_span {
            let run = &password[start..start + greedy_span];
            (greedy_span, minimal_period(run))
        } else {
            (lazy_span, lazy_unit)
        };

        let (i, j) = (start, start + span - 1);
        let base_token = token_of(password, i, i + base_len - 1);
        let base_analysis = most_guessable_match_sequence(
            &base_token,
            omnimatch(&base_token, dictionaries),
            true,
        );

        matches.push(Match::new(
            i,
            j,
            token_of(password, i, j),
            MatchPattern::Repeat(RepeatPattern {
                base_token,
                base_guesses: base_analysis.guesses,
                base_matches: base_analysis.sequence,
                repeat_count: span / base_len,
            }),
        ));
        last_index = j + 1;
    }
    matches
}

// '.' in a unit never spans a line break
fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Candidate unit lengths at `start`, shortest first: every unit that is
/// immediately followed by at least one copy of itself.
fn unit_lengths(password: &[char], start: usize) -> impl Iterator<Item = usize> + '_ {
    let rest = &password[start..];
    let usable = rest
        .iter()
        .position(|&c| is_line_terminator(c))
        .unwrap_or(rest.len());
    (1..=usable.min(rest.len() / 2)).filter(move |&unit| rest[..unit] == rest[unit..2 * unit])
}

fn shortest_unit(password: &[char], start: usize) -> Option<usize> {
    unit_lengths(password, start).next()
}

fn longest_unit(password: &[char], start: usize) -> Option<usize> {
    unit_lengths(password, start).last()
}

/// Number of back-to-back copies of the `unit`-long prefix at `start` (at least one).
fn copies(password: &[char], start: usize, unit: usize) -> usize {
    let base = &password[start..start + unit];
    let mut count = 1;
    while start + (count + 1) * unit <= password.len()
        && &password[start + count * unit..start + (count + 1) * unit] == base
    {
        count += 1;
    }
    count
}

/// Shortest unit that tiles `run` exactly, at least twice.
fn minimal_period(run: &[char]) -> usize {
    (1..=run.len() / 2)
        .find(|&unit| run.len() % unit == 0 && run.chunks(unit).all(|chunk| chunk == &run[..unit]))
        .unwrap_or(run.len())
}
