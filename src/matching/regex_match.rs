//! Regex matching - well known shapes such as recent years.

use std::sync::LazyLock;

use regex::Regex;

use crate::dictionaries::DictionarySet;

use super::{sorted, Match, MatchPattern, RegexName, RegexPattern};

static REGEXEN: LazyLock<Vec<(RegexName, Regex)>> = LazyLock::new(|| {
    vec![(
        RegexName::RecentYear,
        Regex::new(r"19[0-9]{2}|20[01][0-9]").expect("valid regex"),
    )]
});

/// Reports every non-overlapping hit of each named regex.
pub fn regex_match(password: &[char], _dictionaries: &DictionarySet<'_>) -> Vec<Match> {
    let text: String = password.iter().collect();
    let mut matches = Vec::new();

    for (regex_name, regex) in REGEXEN.iter() {
        for found in regex.find_iter(&text) {
            let i = text[..found.start()].chars().count();
            let len = found.as_str().chars().count();
            if len == 0 {
                continue;
            }
            matches.push(Match::new(
                i,
                i + len - 1,
                found.as_str().to_string(),
                MatchPattern::Regex(RegexPattern {
                    regex_name: *regex_name,
                    captured: found.as_str().to_string(),
                }),
            ));
        }
    }
    sorted(matches)
}
