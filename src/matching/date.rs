//! Date matching - day, month and year in any common order, with or without separators.

use std::sync::LazyLock;

use regex::Regex;

use crate::dictionaries::DictionarySet;
use crate::scoring::REFERENCE_YEAR;

use super::{sorted, token_of, DatePattern, Match, MatchPattern};

const DATE_MAX_YEAR: i32 = 2050;
const DATE_MIN_YEAR: i32 = 1000;

/// Split points for undelimited digit runs, keyed by run length.
/// `(k, l)` reads the run as `[..k]`, `[k..l]`, `[l..]`.
fn date_splits(len: usize) -> &'static [(usize, usize)] {
    match len {
        4 => &[(1, 2), (2, 3)],
        5 => &[(1, 3), (2, 3)],
        6 => &[(1, 2), (2, 4), (4, 5)],
        7 => &[(1, 3), (2, 3), (4, 5), (4, 6)],
        8 => &[(2, 4), (4, 6)],
        _ => &[],
    }
}

static MAYBE_DATE_WITH_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{1,4})([\s/\\_.\-])([0-9]{1,2})([\s/\\_.\-])([0-9]{1,4})$").expect("valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Dmy {
    pub day: u32,
    pub month: u32,
    pub year: i32,
}

/// Finds dates such as `13-11-1991`, `1/1/91` or `11141991`.
///
/// Digit runs of 4 to 8 chars are tried against every split for their length
/// and the reading with the year closest to the reference year wins. Runs of 6
/// to 10 chars with one separator used twice are read from their groups.
/// Dates lying strictly inside another date are dropped.
pub fn date_match(password: &[char], _dictionaries: &DictionarySet<'_>) -> Vec<Match> {
    let len = password.len();
    let mut matches = Vec::new();

    // 4 ("1191") to 8 ("11111991") digits
    for i in 0..len.saturating_sub(3) {
        for j in i + 3..=(i + 7).min(len - 1) {
            let window = &password[i..=j];
            if !window.iter().all(char::is_ascii_digit) {
                continue;
            }
            let token = token_of(password, i, j);
            let best = date_splits(window.len())
                .iter()
                .filter_map(|&(k, l)| {
                    let ints = [parse(&token[..k])?, parse(&token[k..l])?, parse(&token[l..])?];
                    map_ints_to_dmy(ints)
                })
                .min_by_key(|dmy| (dmy.year - *REFERENCE_YEAR).abs());
            if let Some(dmy) = best {
                matches.push(date(i, j, token, None, dmy));
            }
        }
    }

    // 6 ("1/1/91") to 10 ("11/11/1991") chars
    for i in 0..len.saturating_sub(5) {
        for j in i + 5..=(i + 9).min(len - 1) {
            let token = token_of(password, i, j);
            let Some(caps) = MAYBE_DATE_WITH_SEPARATOR.captures(&token) else {
                continue;
            };
            if caps[2] != caps[4] {
                continue;
            }
            let (Some(a), Some(b), Some(c)) = (parse(&caps[1]), parse(&caps[3]), parse(&caps[5])) else {
                continue;
            };
            let Some(dmy) = map_ints_to_dmy([a, b, c]) else {
                continue;
            };
            let separator = caps[2].chars().next();
            matches.push(date(i, j, token, separator, dmy));
        }
    }

    // "2015_06_04" also yields "15_06_04", "5_06_04" and even "2015"
    let kept: Vec<Match> = matches
        .iter()
        .enumerate()
        .filter(|&(idx, m)| {
            !matches
                .iter()
                .enumerate()
                .any(|(other_idx, other)| other_idx != idx && other.i <= m.i && other.j >= m.j)
        })
        .map(|(_, m)| m.clone())
        .collect();
    sorted(kept)
}

fn parse(digits: &str) -> Option<i32> {
    digits.parse().ok()
}

fn date(i: usize, j: usize, token: String, separator: Option<char>, dmy: Dmy) -> Match {
    Match::new(
        i,
        j,
        token,
        MatchPattern::Date(DatePattern {
            separator,
            year: dmy.year,
            month: dmy.month,
            day: dmy.day,
        }),
    )
}

/// Reads three integers as a calendar date in some order.
///
/// Years never sit in the middle. A four-digit year at either end decides the
/// reading outright; otherwise the first end that leaves a valid day and month
/// is taken as a two-digit year.
pub(crate) fn map_ints_to_dmy(ints: [i32; 3]) -> Option<Dmy> {
    if ints[1] > 31 || ints[1] <= 0 {
        return None;
    }
    let mut over_12 = 0;
    let mut over_31 = 0;
    let mut under_1 = 0;
    for &int in &ints {
        if (99 < int && int < DATE_MIN_YEAR) || int > DATE_MAX_YEAR {
            return None;
        }
        if int > 31 {
            over_31 += 1;
        }
        if int > 12 {
            over_12 += 1;
        }
        if int <= 0 {
            under_1 += 1;
        }
    }
    if over_31 >= 2 || over_12 == 3 || under_1 >= 2 {
        return None;
    }

    // year last, then year first
    let possible_year_splits = [(ints[2], [ints[0], ints[1]]), (ints[0], [ints[1], ints[2]])];
    for (year, rest) in possible_year_splits {
        if (DATE_MIN_YEAR..=DATE_MAX_YEAR).contains(&year) {
            // a four-digit year whose remainder is no day-month is not a date
            let (day, month) = map_ints_to_dm(rest)?;
            return Some(Dmy { day, month, year });
        }
    }

    possible_year_splits.into_iter().find_map(|(year, rest)| {
        let (day, month) = map_ints_to_dm(rest)?;
        Some(Dmy {
            day,
            month,
            year: two_to_four_digit_year(year),
        })
    })
}

fn map_ints_to_dm([a, b]: [i32; 2]) -> Option<(u32, u32)> {
    [(a, b), (b, a)].into_iter().find_map(|(day, month)| {
        ((1..=31).contains(&day) && (1..=12).contains(&month)).then_some((day as u32, month as u32))
    })
}

pub(crate) fn two_to_four_digit_year(year: i32) -> i32 {
    if year > 99 {
        year
    } else if year > 50 {
        year + 1900
    } else {
        year + 2000
    }
}
