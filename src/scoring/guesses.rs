//! Guess models - how many attempts an attacker needs for each kind of match.

use std::sync::LazyLock;

use chrono::Datelike;

use crate::adjacency::graph;
use crate::matching::{
    DatePattern, DictionaryPattern, Match, MatchPattern, RegexName, RegexPattern, SequencePattern,
    SpatialPattern,
};

pub const BRUTEFORCE_CARDINALITY: f64 = 10.0;
pub const MIN_SUBMATCH_GUESSES_SINGLE_CHAR: f64 = 10.0;
pub const MIN_SUBMATCH_GUESSES_MULTI_CHAR: f64 = 50.0;
pub const MIN_YEAR_SPACE: i32 = 20;

/// Calendar year at first use; dates and years are costed by their distance from it.
pub static REFERENCE_YEAR: LazyLock<i32> = LazyLock::new(|| chrono::Local::now().year());

struct KeyboardStats {
    starting_positions: f64,
    average_degree: f64,
}

// keypad and mac keypad differ slightly, close enough
static KEYBOARD_STATS: LazyLock<KeyboardStats> = LazyLock::new(|| stats_for("qwerty"));
static KEYPAD_STATS: LazyLock<KeyboardStats> = LazyLock::new(|| stats_for("keypad"));

fn stats_for(name: &str) -> KeyboardStats {
    graph(name).map_or(
        KeyboardStats {
            starting_positions: 0.0,
            average_degree: 0.0,
        },
        |g| KeyboardStats {
            starting_positions: g.starting_positions() as f64,
            average_degree: g.average_degree(),
        },
    )
}

/// Estimates and memoizes the guesses needed for `m`.
///
/// A match covering only part of a `password_len`-char password is floored
/// to a minimum so trivial fragments can't make the whole look free.
/// Returns the cached value when `m.guesses` is already set.
pub fn estimate_guesses(m: &mut Match, password_len: usize) -> f64 {
    if let Some(guesses) = m.guesses {
        return guesses;
    }

    let token_len = m.token.chars().count();
    let min_guesses = if token_len < password_len {
        if token_len == 1 {
            MIN_SUBMATCH_GUESSES_SINGLE_CHAR
        } else {
            MIN_SUBMATCH_GUESSES_MULTI_CHAR
        }
    } else {
        1.0
    };

    let token = &m.token;
    let guesses = match &mut m.pattern {
        MatchPattern::Bruteforce => bruteforce_guesses(token_len),
        MatchPattern::Dictionary(d) => dictionary_guesses(token, d),
        MatchPattern::Spatial(s) => spatial_guesses(token, s),
        MatchPattern::Repeat(r) => r.base_guesses * r.repeat_count as f64,
        MatchPattern::Sequence(s) => sequence_guesses(token, s),
        MatchPattern::Regex(r) => regex_guesses(r),
        MatchPattern::Date(d) => date_guesses(d),
    };

    let guesses = guesses.max(min_guesses);
    m.guesses = Some(guesses);
    m.guesses_log10 = Some(guesses.log10());
    guesses
}

pub fn bruteforce_guesses(token_len: usize) -> f64 {
    let exponent = i32::try_from(token_len).unwrap_or(i32::MAX);
    let mut guesses = BRUTEFORCE_CARDINALITY.powi(exponent);
    if guesses.is_infinite() {
        guesses = f64::MAX;
    }
    // one above the submatch floor, so a real pattern over the same span wins ties
    let min_guesses = if token_len == 1 {
        MIN_SUBMATCH_GUESSES_SINGLE_CHAR + 1.0
    } else {
        MIN_SUBMATCH_GUESSES_MULTI_CHAR + 1.0
    };
    guesses.max(min_guesses)
}

fn dictionary_guesses(token: &str, d: &mut DictionaryPattern) -> f64 {
    let uppercase = uppercase_variations(token);
    let l33t = if d.l33t { l33t_variations(token, &d.sub) } else { 1.0 };
    d.uppercase_variations = Some(uppercase);
    d.l33t_variations = Some(l33t);
    let reversed = if d.reversed { 2.0 } else { 1.0 };
    d.rank as f64 * uppercase * l33t * reversed
}

pub fn spatial_guesses(token: &str, s: &SpatialPattern) -> f64 {
    let stats = match s.graph {
        "qwerty" | "dvorak" => &*KEYBOARD_STATS,
        _ => &*KEYPAD_STATS,
    };
    let length = token.chars().count();
    let turns = s.turns;

    // patterns of this length or shorter with this many turns or fewer
    let mut guesses = 0.0;
    for i in 2..=length {
        let possible_turns = turns.min(i - 1);
        for j in 1..=possible_turns {
            guesses += n_choose_k(i - 1, j - 1)
                * stats.starting_positions
                * stats.average_degree.powi(j as i32);
        }
    }

    // shifted keys ("%" for "5") vary like capitals
    if s.shifted_count > 0 {
        let shifted = s.shifted_count;
        let unshifted = length.saturating_sub(shifted);
        if unshifted == 0 {
            guesses *= 2.0;
        } else {
            let variations: f64 = (1..=shifted.min(unshifted))
                .map(|i| n_choose_k(shifted + unshifted, i))
                .sum();
            guesses *= variations;
        }
    }
    guesses
}

pub fn sequence_guesses(token: &str, s: &SequencePattern) -> f64 {
    let Some(first) = token.chars().next() else {
        return 0.0;
    };
    // obvious starting points
    let mut base_guesses = if matches!(first, 'a' | 'A' | 'z' | 'Z' | '0' | '1' | '9') {
        4.0
    } else if first.is_ascii_digit() {
        10.0
    } else {
        26.0
    };
    if !s.ascending {
        base_guesses *= 2.0;
    }
    base_guesses * token.chars().count() as f64
}

fn regex_guesses(r: &RegexPattern) -> f64 {
    match r.regex_name {
        RegexName::RecentYear => {
            let year = r.captured.parse::<i32>().unwrap_or(*REFERENCE_YEAR);
            year_space(year)
        }
    }
}

fn date_guesses(d: &DatePattern) -> f64 {
    let mut guesses = year_space(d.year) * 365.0;
    // one of about four common separators
    if d.separator.is_some() {
        guesses *= 4.0;
    }
    guesses
}

fn year_space(year: i32) -> f64 {
    f64::from((year - *REFERENCE_YEAR).abs().max(MIN_YEAR_SPACE))
}

/// `[A-Z][^A-Z]+`
pub(crate) fn is_start_upper(word: &str) -> bool {
    let mut chars = word.chars();
    chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.clone().next().is_some()
        && chars.all(|c| !c.is_ascii_uppercase())
}

/// `[^A-Z]+[A-Z]`
pub(crate) fn is_end_upper(word: &str) -> bool {
    let mut chars = word.chars().rev();
    chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.clone().next().is_some()
        && chars.all(|c| !c.is_ascii_uppercase())
}

/// `[^a-z]+`
pub(crate) fn is_all_upper(word: &str) -> bool {
    !word.is_empty() && word.chars().all(|c| !c.is_ascii_lowercase())
}

/// Ways to capitalize the token's letters no more "unusually" than it does.
///
/// Lowercase words cost nothing extra; a capital first or last letter, or all
/// caps, only doubles the space. Otherwise this counts the arrangements with
/// at most `min(upper, lower)` letters flipped.
pub fn uppercase_variations(word: &str) -> f64 {
    if !word.chars().any(|c| c.is_ascii_uppercase()) {
        return 1.0;
    }
    if is_start_upper(word) || is_end_upper(word) || is_all_upper(word) {
        return 2.0;
    }
    let upper = word.chars().filter(char::is_ascii_uppercase).count();
    let lower = word.chars().filter(char::is_ascii_lowercase).count();
    (1..=upper.min(lower)).map(|i| n_choose_k(upper + lower, i)).sum()
}

/// Extra guesses for trying substitution subsets, per substituted letter.
///
/// A letter that is always or never substituted doubles the space; a mix of
/// `s` substituted and `u` plain occurrences adds every way to pick up to
/// `min(s, u)` of them.
pub fn l33t_variations(token: &str, sub: &std::collections::BTreeMap<char, char>) -> f64 {
    let lower: Vec<char> = token.to_lowercase().chars().collect();
    let mut variations = 1.0;
    for (&subbed, &unsubbed) in sub {
        let s = lower.iter().filter(|&&c| c == subbed).count();
        let u = lower.iter().filter(|&&c| c == unsubbed).count();
        if s == 0 || u == 0 {
            variations *= 2.0;
        } else {
            let possibilities: f64 = (1..=s.min(u)).map(|i| n_choose_k(u + s, i)).sum();
            variations *= possibilities;
        }
    }
    variations
}

pub fn n_choose_k(n: usize, k: usize) -> f64 {
    if k > n {
        return 0.0;
    }
    let mut n = n as f64;
    let mut r = 1.0;
    for d in 1..=k {
        r *= n;
        r /= d as f64;
        n -= 1.0;
    }
    r
}

pub fn factorial(n: usize) -> f64 {
    (2..=n).fold(1.0, |f, i| f * i as f64)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::matching::{RepeatPattern, SequencePattern};

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= expected.abs() * 1e-9,
            "{actual} != {expected}"
        );
    }

    fn dictionary(token: &str, rank: usize) -> Match {
        Match::new(
            0,
            token.chars().count() - 1,
            token.to_string(),
            MatchPattern::Dictionary(DictionaryPattern {
                matched_word: token.to_lowercase(),
                rank,
                dictionary_name: "passwords".into(),
                reversed: false,
                l33t: false,
                sub: BTreeMap::new(),
                sub_display: String::new(),
                uppercase_variations: None,
                l33t_variations: None,
            }),
        )
    }

    #[test]
    fn test_n_choose_k() {
        assert_eq!(n_choose_k(0, 0), 1.0);
        assert_eq!(n_choose_k(1, 0), 1.0);
        assert_eq!(n_choose_k(5, 0), 1.0);
        assert_eq!(n_choose_k(0, 1), 0.0);
        assert_eq!(n_choose_k(0, 5), 0.0);
        assert_eq!(n_choose_k(2, 1), 2.0);
        assert_eq!(n_choose_k(4, 2), 6.0);
        assert_eq!(n_choose_k(33, 7), 4_272_048.0);
    }

    #[test]
    fn test_factorial() {
        assert_eq!(factorial(0), 1.0);
        assert_eq!(factorial(1), 1.0);
        assert_eq!(factorial(5), 120.0);
    }

    #[test]
    fn test_guesses_are_memoized() {
        let mut m = dictionary("password", 2);
        m.guesses = Some(1.0);
        assert_eq!(estimate_guesses(&mut m, 8), 1.0);
    }

    #[test]
    fn test_submatch_floor() {
        let mut whole = dictionary("a", 1);
        assert_eq!(estimate_guesses(&mut whole, 1), 1.0);

        let mut single = dictionary("a", 1);
        assert_eq!(estimate_guesses(&mut single, 5), MIN_SUBMATCH_GUESSES_SINGLE_CHAR);

        let mut multi = dictionary("ab", 1);
        assert_eq!(estimate_guesses(&mut multi, 5), MIN_SUBMATCH_GUESSES_MULTI_CHAR);
        assert_eq!(multi.guesses_log10, Some(MIN_SUBMATCH_GUESSES_MULTI_CHAR.log10()));
    }

    #[test]
    fn test_bruteforce_guesses() {
        assert_eq!(bruteforce_guesses(1), 11.0);
        assert_eq!(bruteforce_guesses(2), 100.0);
        assert_eq!(bruteforce_guesses(5), 1e5);
        assert_eq!(bruteforce_guesses(400), f64::MAX);
    }

    #[test]
    fn test_dictionary_guesses() {
        let mut m = dictionary("aaaaa", 32);
        assert_eq!(estimate_guesses(&mut m, 5), 32.0);

        let mut m = dictionary("AAAaaa", 32);
        assert_eq!(estimate_guesses(&mut m, 6), 32.0 * uppercase_variations("AAAaaa"));
        let MatchPattern::Dictionary(d) = &m.pattern else { unreachable!() };
        assert_eq!(d.uppercase_variations, Some(41.0));
        assert_eq!(d.l33t_variations, Some(1.0));
    }

    #[test]
    fn test_dictionary_reversed_and_l33t() {
        let mut m = dictionary("aaa", 32);
        if let MatchPattern::Dictionary(d) = &mut m.pattern {
            d.reversed = true;
        }
        assert_eq!(estimate_guesses(&mut m, 3), 64.0);

        let mut m = dictionary("aaa@@@", 32);
        if let MatchPattern::Dictionary(d) = &mut m.pattern {
            d.l33t = true;
            d.sub = BTreeMap::from([('@', 'a')]);
        }
        assert_eq!(estimate_guesses(&mut m, 6), 32.0 * 41.0);
    }

    #[test]
    fn test_uppercase_variations() {
        let cases = [
            ("", 1.0),
            ("a", 1.0),
            ("A", 2.0),
            ("abcdef", 1.0),
            ("Abcdef", 2.0),
            ("abcdeF", 2.0),
            ("ABCDEF", 2.0),
            ("aBcdef", n_choose_k(6, 1)),
            ("aBcDef", n_choose_k(6, 1) + n_choose_k(6, 2)),
            ("ABCDEf", n_choose_k(6, 1)),
            ("aBCDEf", n_choose_k(6, 1) + n_choose_k(6, 2)),
            ("ABCdef", n_choose_k(6, 1) + n_choose_k(6, 2) + n_choose_k(6, 3)),
            ("aBcDeF", 41.0),
            ("aBcD", 10.0),
        ];
        for (word, expected) in cases {
            assert_eq!(uppercase_variations(word), expected, "{word}");
        }
    }

    #[test]
    fn test_l33t_variations() {
        let sub = |pairs: &[(char, char)]| pairs.iter().copied().collect::<BTreeMap<_, _>>();
        assert_eq!(l33t_variations("", &sub(&[])), 1.0);
        assert_eq!(l33t_variations("a", &sub(&[])), 1.0);
        assert_eq!(l33t_variations("4", &sub(&[('4', 'a')])), 2.0);
        assert_eq!(l33t_variations("4pple", &sub(&[('4', 'a')])), 2.0);
        assert_eq!(l33t_variations("abcet", &sub(&[])), 1.0);
        assert_eq!(l33t_variations("4bcet", &sub(&[('4', 'a')])), 2.0);
        assert_eq!(l33t_variations("a8cet", &sub(&[('8', 'b')])), 2.0);
        assert_eq!(l33t_variations("abce+", &sub(&[('+', 't')])), 2.0);
        assert_eq!(l33t_variations("48cet", &sub(&[('4', 'a'), ('8', 'b')])), 4.0);
        assert_eq!(
            l33t_variations("a4a4aa", &sub(&[('4', 'a')])),
            n_choose_k(6, 2) + n_choose_k(6, 1)
        );
        assert_eq!(
            l33t_variations("4a4a44", &sub(&[('4', 'a')])),
            n_choose_k(6, 2) + n_choose_k(6, 1)
        );
        assert_eq!(
            l33t_variations("a44att+", &sub(&[('4', 'a'), ('+', 't')])),
            (n_choose_k(4, 2) + n_choose_k(4, 1)) * n_choose_k(3, 1)
        );
        // capitalization doesn't affect the substitution count
        assert_eq!(
            l33t_variations("Aa44aA", &sub(&[('4', 'a')])),
            n_choose_k(6, 2) + n_choose_k(6, 1)
        );
    }

    #[test]
    fn test_spatial_guesses() {
        let pattern = SpatialPattern { graph: "qwerty", turns: 1, shifted_count: 0 };
        let base = 5.0 * KEYBOARD_STATS.starting_positions * KEYBOARD_STATS.average_degree;
        assert_close(spatial_guesses("zxcvbn", &pattern), base);

        // all shifted doubles
        let shifted = SpatialPattern { shifted_count: 6, ..pattern.clone() };
        assert_close(spatial_guesses("ZXCVBN", &shifted), base * 2.0);

        let mixed = SpatialPattern { shifted_count: 2, ..pattern.clone() };
        assert_close(
            spatial_guesses("ZxCvbn", &mixed),
            base * (n_choose_k(6, 2) + n_choose_k(6, 1))
        );
    }

    #[test]
    fn test_spatial_guesses_with_turns() {
        let pattern = SpatialPattern { graph: "qwerty", turns: 3, shifted_count: 0 };
        let token = "zxcft6yh";
        let s = KEYBOARD_STATS.starting_positions;
        let d = KEYBOARD_STATS.average_degree;
        let mut expected = 0.0;
        for i in 2..=8usize {
            for j in 1..=3usize.min(i - 1) {
                expected += n_choose_k(i - 1, j - 1) * s * d.powi(j as i32);
            }
        }
        assert_eq!(spatial_guesses(token, &pattern), expected);
    }

    #[test]
    fn test_keypad_uses_keypad_stats() {
        let pattern = SpatialPattern { graph: "keypad", turns: 1, shifted_count: 0 };
        let expected = 2.0 * KEYPAD_STATS.starting_positions * KEYPAD_STATS.average_degree;
        assert_close(spatial_guesses("123", &pattern), expected);
    }

    #[test]
    fn test_sequence_guesses() {
        let seq = |ascending| SequencePattern { sequence_name: "lower", sequence_space: 26, ascending };
        assert_eq!(sequence_guesses("ab", &seq(true)), 8.0);
        assert_eq!(sequence_guesses("XYZ", &seq(true)), 78.0);
        assert_eq!(sequence_guesses("4567", &seq(true)), 40.0);
        assert_eq!(sequence_guesses("7654", &seq(false)), 80.0);
        assert_eq!(sequence_guesses("ZYX", &seq(false)), 24.0);
    }

    #[test]
    fn test_regex_and_date_guesses() {
        let year = *REFERENCE_YEAR - 30;
        let mut m = Match::new(
            0,
            3,
            year.to_string(),
            MatchPattern::Regex(RegexPattern {
                regex_name: RegexName::RecentYear,
                captured: year.to_string(),
            }),
        );
        assert_eq!(estimate_guesses(&mut m, 4), 30.0);

        let near = RegexPattern {
            regex_name: RegexName::RecentYear,
            captured: REFERENCE_YEAR.to_string(),
        };
        assert_eq!(regex_guesses(&near), f64::from(MIN_YEAR_SPACE));

        let date = DatePattern { separator: Some('/'), year: *REFERENCE_YEAR - 50, month: 1, day: 1 };
        assert_eq!(date_guesses(&date), 50.0 * 365.0 * 4.0);
        let recent = DatePattern { separator: None, year: *REFERENCE_YEAR, month: 1, day: 1 };
        assert_eq!(date_guesses(&recent), 20.0 * 365.0);
    }

    #[test]
    fn test_repeat_guesses() {
        let mut m = Match::new(
            0,
            8,
            "abcabcabc".into(),
            MatchPattern::Repeat(RepeatPattern {
                base_token: "abc".into(),
                base_guesses: 12.0,
                base_matches: Vec::new(),
                repeat_count: 3,
            }),
        );
        assert_eq!(estimate_guesses(&mut m, 9), 36.0);
    }
}
