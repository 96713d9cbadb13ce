//! Spatial matching - runs of physically adjacent keys.

use crate::adjacency::{graphs, AdjacencyGraph};
use crate::dictionaries::DictionarySet;

use super::{sorted, token_of, Match, MatchPattern, SpatialPattern};

const SHIFTED_CHARS: &str = "~!@#$%^&*()_+QWERTYUIOP{}|ASDFGHJKL:\"ZXCVBNM<>?";

/// Walks every keyboard graph looking for chains of three or more adjacent keys.
pub fn spatial_match(password: &[char], _dictionaries: &DictionarySet<'_>) -> Vec<Match> {
    let mut matches = Vec::new();
    for graph in graphs() {
        matches.extend(spatial_match_helper(password, graph));
    }
    sorted(matches)
}

pub(crate) fn spatial_match_helper(password: &[char], graph: &AdjacencyGraph) -> Vec<Match> {
    let len = password.len();
    let mut matches = Vec::new();
    let mut i = 0;

    while i + 1 < len {
        let mut j = i + 1;
        let mut last_direction: Option<usize> = None;
        let mut turns = 0;
        let mut shifted_count = usize::from(graph.is_keyboard() && SHIFTED_CHARS.contains(password[i]));

        loop {
            let mut found = false;
            if j < len {
                let cur_char = password[j];
                for (direction, adjacent) in graph.neighbors(password[j - 1]).iter().enumerate() {
                    let Some(position) = adjacent.and_then(|keys| keys.chars().position(|c| c == cur_char))
                    else {
                        continue;
                    };
                    found = true;
                    // second slot of a key is its shifted character
                    if position == 1 {
                        shifted_count += 1;
                    }
                    // every pattern starts with a turn
                    if last_direction != Some(direction) {
                        turns += 1;
                        last_direction = Some(direction);
                    }
                    break;
                }
            }

            if found {
                j += 1;
                continue;
            }
            if j - i > 2 {
                matches.push(Match::new(
                    i,
                    j - 1,
                    token_of(password, i, j - 1),
                    MatchPattern::Spatial(SpatialPattern {
                        graph: graph.name(),
                        turns,
                        shifted_count,
                    }),
                ));
            }
            i = j;
            break;
        }
    }
    matches
}
