//! Sequence matching - runs with a constant code point step ("abcd", "9753").

use crate::dictionaries::DictionarySet;

use super::{token_of, Match, MatchPattern, SequencePattern};

/// Largest step between neighbours still read as a sequence ("aceg" but not "ajt").
const MAX_DELTA: i64 = 5;

/// Splits the password into maximal runs of equal step and keeps the plausible ones.
///
/// A run qualifies when its step is between 1 and [`MAX_DELTA`] in size and it
/// is at least three chars long; two-char runs qualify only with a step of one.
pub fn sequence_match(password: &[char], _dictionaries: &DictionarySet<'_>) -> Vec<Match> {
    if password.len() <= 1 {
        return Vec::new();
    }

    let mut matches = Vec::new();
    let mut i = 0;
    let mut last_delta: Option<i64> = None;

    for k in 1..password.len() {
        let delta = i64::from(u32::from(password[k])) - i64::from(u32::from(password[k - 1]));
        let previous = *last_delta.get_or_insert(delta);
        if delta == previous {
            continue;
        }
        let j = k - 1;
        push_run(password, i, j, previous, &mut matches);
        i = j;
        last_delta = Some(delta);
    }
    if let Some(delta) = last_delta {
        push_run(password, i, password.len() - 1, delta, &mut matches);
    }
    matches
}

fn push_run(password: &[char], i: usize, j: usize, delta: i64, matches: &mut Vec<Match>) {
    if j - i <= 1 && delta.abs() != 1 {
        return;
    }
    if delta == 0 || delta.abs() > MAX_DELTA {
        return;
    }

    let run = &password[i..=j];
    let (sequence_name, sequence_space) = if run.iter().all(char::is_ascii_lowercase) {
        ("lower", 26)
    } else if run.iter().all(char::is_ascii_uppercase) {
        ("upper", 26)
    } else if run.iter().all(char::is_ascii_digit) {
        ("digits", 10)
    } else {
        // conservatively stick with roman alphabet size
        ("unicode", 26)
    };

    matches.push(Match::new(
        i,
        j,
        token_of(password, i, j),
        MatchPattern::Sequence(SequencePattern {
            sequence_name,
            sequence_space,
            ascending: delta > 0,
        }),
    ));
}
