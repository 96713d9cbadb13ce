//! Scoring - the cheapest way to explain the whole password.
//!
//! Given overlapping candidate matches, finds the non-overlapping sequence
//! covering every character that minimizes
//!
//! ```text
//! g = l! * product(m.guesses for m in sequence) + MIN_GUESSES_BEFORE_GROWING_SEQUENCE^(l - 1)
//! ```
//!
//! where `l` is the sequence length. The factorial counts the orderings of
//! `l` patterns; the additive term reflects that attackers try shorter
//! sequences first. Gaps no matcher explains are filled with bruteforce.

mod guesses;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::matching::{Match, MatchPattern};

pub use guesses::{
    bruteforce_guesses, estimate_guesses, factorial, l33t_variations, n_choose_k,
    uppercase_variations, REFERENCE_YEAR,
};
pub(crate) use guesses::{is_all_upper, is_start_upper};

pub const MIN_GUESSES_BEFORE_GROWING_SEQUENCE: f64 = 10_000.0;

/// The winning sequence and its total guesses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuessCalculation {
    pub guesses: f64,
    pub guesses_log10: f64,
    pub sequence: Vec<Match>,
}

/// What a slot's final match is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Candidate {
    /// Index into the candidate matches.
    Match(usize),
    /// Bruteforce over the slot's span; only materialized if it ends up in the winning sequence.
    Bruteforce,
}

/// Best length-`l` sequence ending at some position.
#[derive(Debug, Clone, Copy)]
struct Slot {
    /// Start of the final match.
    i: usize,
    candidate: Candidate,
    /// Product of guesses over the sequence.
    pi: f64,
    /// Overall metric.
    g: f64,
}

struct Optimizer {
    password: Vec<char>,
    exclude_additive: bool,
    matches: Vec<Match>,
    /// `optimal[k][l]`: best length-`l` sequence covering `password[..=k]`.
    /// A length is absent when a shorter sequence over the same prefix does at least as well.
    optimal: Vec<BTreeMap<usize, Slot>>,
}

impl Optimizer {
    /// Considers the length-`l` sequence ending with `candidate` over `[i, k]`,
    /// keeping it if no sequence of `l` or fewer matches over the same prefix beats it.
    fn update(&mut self, i: usize, k: usize, candidate: Candidate, l: usize) {
        let mut pi = match candidate {
            Candidate::Match(m) => estimate_guesses(&mut self.matches[m], self.password.len()),
            Candidate::Bruteforce => bruteforce_guesses(k - i + 1),
        };
        if l > 1 {
            // extend the best length-(l-1) sequence ending just before this match
            pi *= self.optimal[i - 1][&(l - 1)].pi;
        }
        let mut g = factorial(l) * pi;
        if !self.exclude_additive {
            g += MIN_GUESSES_BEFORE_GROWING_SEQUENCE.powi(l as i32 - 1);
        }

        let dominated = self.optimal[k]
            .iter()
            .any(|(&competing_l, competing)| competing_l <= l && competing.g <= g);
        if dominated {
            return;
        }
        self.optimal[k].insert(l, Slot { i, candidate, pi, g });
    }

    /// Tries bruteforce matches ending at `k`: one over the whole prefix, and
    /// `[i, k]` appended to every sequence that ends at `i - 1`.
    fn bruteforce_update(&mut self, k: usize) {
        self.update(0, k, Candidate::Bruteforce, 1);

        let mut lengths = Vec::new();
        for i in 1..=k {
            lengths.clear();
            // two adjacent bruteforce matches are never better than one wider one
            lengths.extend(
                self.optimal[i - 1]
                    .iter()
                    .filter(|(_, slot)| slot.candidate != Candidate::Bruteforce)
                    .map(|(&l, _)| l),
            );
            for &l in &lengths {
                self.update(i, k, Candidate::Bruteforce, l + 1);
            }
        }
    }

    /// Walks back from the best full-length sequence, returning its matches and metric.
    fn unwind(self) -> (Vec<Match>, f64) {
        let n = self.password.len();
        let (&best_l, best) = self.optimal[n - 1]
            .iter()
            .reduce(|best, candidate| if candidate.1.g < best.1.g { candidate } else { best })
            .expect("a bruteforce match always covers the whole password");
        let guesses = best.g;

        let mut sequence = Vec::with_capacity(best_l);
        let mut k = n - 1;
        let mut l = best_l;
        loop {
            let slot = *self.optimal[k]
                .get(&l)
                .expect("every recorded sequence extends a recorded shorter one");
            let m = match slot.candidate {
                Candidate::Match(m) => self.matches[m].clone(),
                Candidate::Bruteforce => {
                    let token = self.password[slot.i..=k].iter().collect();
                    let mut m = Match::new(slot.i, k, token, MatchPattern::Bruteforce);
                    estimate_guesses(&mut m, n);
                    m
                }
            };
            sequence.push(m);
            if slot.i == 0 {
                break;
            }
            k = slot.i - 1;
            l -= 1;
        }
        sequence.reverse();
        assert_eq!(l, 1, "match sequence must start at the first character");
        debug_assert_eq!(sequence.len(), best_l);
        (sequence, guesses)
    }
}

/// Picks the non-overlapping, full-coverage match sequence with the fewest total guesses.
///
/// # Arguments
///
/// * `password` - The text being explained
/// * `matches` - Candidate matches over `password`, in any order
/// * `exclude_additive` - Drops the sequence-length term; used when scoring a repeat's unit
///
/// # Returns
///
/// The winning sequence, every match carrying its guesses. An empty password takes one guess.
pub fn most_guessable_match_sequence(
    password: &str,
    matches: Vec<Match>,
    exclude_additive: bool,
) -> GuessCalculation {
    let password: Vec<char> = password.chars().collect();
    let n = password.len();
    if n == 0 {
        return GuessCalculation {
            guesses: 1.0,
            guesses_log10: 0.0,
            sequence: Vec::new(),
        };
    }

    // bucket by end position, sorted by start for deterministic output
    let mut by_j: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (idx, m) in matches.iter().enumerate() {
        if m.j < n {
            by_j[m.j].push(idx);
        }
    }
    for bucket in &mut by_j {
        bucket.sort_by_key(|&idx| matches[idx].i);
    }

    let mut optimizer = Optimizer {
        password,
        exclude_additive,
        matches,
        optimal: vec![BTreeMap::new(); n],
    };

    for (k, bucket) in by_j.iter().enumerate() {
        for &m in bucket {
            let i = optimizer.matches[m].i;
            if i > 0 {
                let lengths: Vec<usize> = optimizer.optimal[i - 1].keys().copied().collect();
                for l in lengths {
                    optimizer.update(i, k, Candidate::Match(m), l + 1);
                }
            } else {
                optimizer.update(0, k, Candidate::Match(m), 1);
            }
        }
        optimizer.bruteforce_update(k);
    }

    #[cfg(feature = "tracing")]
    let candidates = optimizer.matches.len();
    let (sequence, guesses) = optimizer.unwind();

    #[cfg(feature = "tracing")]
    tracing::trace!(guesses, candidates, "match sequence chosen");

    GuessCalculation {
        guesses,
        guesses_log10: guesses.log10(),
        sequence,
    }
}
