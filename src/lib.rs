//! Password guessability estimation library
//!
//! Estimates how many guesses an attacker needs to find a password by
//! explaining it as a sequence of predictable patterns (dictionary words,
//! keyboard walks, repeats, sequences, years, dates) and bruteforced gaps.
//!
//! # Features
//!
//! - `async` (default): Enables debounced async estimation with cancellation support
//! - `tracing`: Enables logging via tracing crate
//!
//! # Environment Variables
//!
//! - `PWD_DICTIONARIES_PATH`: Custom path to the frequency lists file
//!   (default: `./assets/frequency_lists.json`)
//!
//! # Example
//!
//! ```rust,no_run
//! use pwd_guess::{estimate, evaluate_policy, init_dictionaries};
//! use secrecy::SecretString;
//!
//! // Load the frequency lists (call once at startup)
//! init_dictionaries().expect("Failed to load dictionaries");
//!
//! let password = SecretString::new("MyP@ssw0rd!".to_string().into());
//!
//! if let Some(entropy) = estimate(&password, &["alice", "alice@example.com"], "en").ready() {
//!     println!("Score: {}", entropy.score);
//!     println!("Guesses: 10^{:.1}", entropy.guesses_log10);
//!     println!("Valid: {}", evaluate_policy(&entropy, false).is_valid);
//! }
//! ```

pub mod adjacency;
pub mod dictionaries;
mod evaluator;
pub mod feedback;
pub mod matching;
mod policy;
pub mod scoring;
pub mod time_estimates;

// Public API
pub use dictionaries::{
    dictionaries, dictionaries_ready, init_dictionaries, init_dictionaries_from_path,
    install_dictionaries, DictionaryError, FrequencyDictionaries, RankedDictionary,
};
pub use evaluator::{estimate, estimate_with, normalize_language, Entropy, Estimation};
pub use feedback::{Feedback, Suggestion, Warning};
pub use matching::{omnimatch, Match, MatchPattern};
pub use policy::{evaluate_policy, PasswordPolicy, PasswordStrength, PolicyVerdict};
pub use scoring::{most_guessable_match_sequence, GuessCalculation};
pub use time_estimates::Score;

#[cfg(feature = "async")]
pub use evaluator::estimate_tx;
