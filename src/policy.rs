//! Acceptance policy - turns an estimate into an accept/reject verdict.
//!
//! Adds the checks a sign-up form applies on top of the raw score: a minimum
//! length, an external breach flag and the all-numbers rule.

use secrecy::ExposeSecret;
use serde::Serialize;

use crate::evaluator::Entropy;
use crate::feedback::{Feedback, Warning};
use crate::time_estimates::Score;

const MIN_LENGTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PasswordPolicy {
    /// Shortest acceptable password, in chars.
    pub min_length: usize,
    /// Lowest acceptable score.
    pub min_score: Score,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: MIN_LENGTH,
            min_score: Score::SafelyUnguessable,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "score", rename_all = "snake_case")]
pub enum PasswordStrength {
    TooShort,
    /// Known from a public breach; never acceptable whatever its score.
    Breached,
    Rated(Score),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyVerdict {
    pub strength: PasswordStrength,
    pub is_valid: bool,
    pub feedback: Feedback,
}

impl PasswordPolicy {
    /// Applies the policy to an estimate.
    ///
    /// # Arguments
    /// * `entropy` - The estimate for the candidate password
    /// * `breached` - Whether a breach lookup found the password
    ///
    /// # Returns
    /// The verdict; length is checked first, then the breach flag, then the score.
    pub fn evaluate(&self, entropy: &Entropy, breached: bool) -> PolicyVerdict {
        let password = entropy.password.expose_secret();
        let (score, feedback) = all_numbers_rule(password, entropy.score, &entropy.feedback);

        let strength = if password.chars().count() < self.min_length {
            PasswordStrength::TooShort
        } else if breached {
            PasswordStrength::Breached
        } else {
            PasswordStrength::Rated(score)
        };
        let is_valid = matches!(strength, PasswordStrength::Rated(score) if score >= self.min_score);

        #[cfg(feature = "tracing")]
        tracing::debug!(?strength, is_valid, "password policy applied");

        PolicyVerdict {
            strength,
            is_valid,
            feedback,
        }
    }
}

/// Evaluates `entropy` against the default policy.
pub fn evaluate_policy(entropy: &Entropy, breached: bool) -> PolicyVerdict {
    PasswordPolicy::default().evaluate(entropy, breached)
}

/// Digit-only passwords are rated no better than `TooGuessable`.
fn all_numbers_rule(password: &str, score: Score, feedback: &Feedback) -> (Score, Feedback) {
    let all_numbers = !password.is_empty() && password.chars().all(|c| c.is_ascii_digit());
    if all_numbers && score > Score::TooGuessable {
        let feedback = Feedback {
            warning: Some(Warning::AllNumbers),
            suggestions: Vec::new(),
        };
        return (Score::TooGuessable, feedback);
    }
    (score, feedback.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionaries::test_dictionaries;
    use crate::evaluator::estimate_with;
    use secrecy::SecretString;

    fn entropy(password: &str) -> Entropy {
        let pwd = SecretString::new(password.to_string().into());
        estimate_with(&pwd, &[] as &[&str], "en", &test_dictionaries())
    }

    #[test]
    fn test_default_policy() {
        let policy = PasswordPolicy::default();
        assert_eq!(policy.min_length, 8);
        assert_eq!(policy.min_score, Score::SafelyUnguessable);
    }

    #[test]
    fn test_too_short() {
        let verdict = evaluate_policy(&entropy("Zq7!mR#"), false);
        assert_eq!(verdict.strength, PasswordStrength::TooShort);
        assert!(!verdict.is_valid);
    }

    #[test]
    fn test_breached_overrides_score() {
        let strong = entropy("Zq7!mR#t9Lw$2xKv@8Jn");
        assert_eq!(strong.score, Score::VeryUnguessable);
        let verdict = evaluate_policy(&strong, true);
        assert_eq!(verdict.strength, PasswordStrength::Breached);
        assert!(!verdict.is_valid);
    }

    #[test]
    fn test_rated_passwords() {
        let verdict = evaluate_policy(&entropy("Zq7!mR#t9Lw$2xKv@8Jn"), false);
        assert_eq!(verdict.strength, PasswordStrength::Rated(Score::VeryUnguessable));
        assert!(verdict.is_valid);

        let verdict = evaluate_policy(&entropy("password"), false);
        assert_eq!(verdict.strength, PasswordStrength::Rated(Score::TooGuessable));
        assert!(!verdict.is_valid);
        assert_eq!(verdict.feedback.warning, Some(Warning::TopTenPassword));
    }

    #[test]
    fn test_all_numbers_rule() {
        // random enough to rate above zero on its own
        let digits = entropy("80437261935");
        assert!(digits.score > Score::TooGuessable);

        let verdict = evaluate_policy(&digits, false);
        assert_eq!(verdict.strength, PasswordStrength::Rated(Score::TooGuessable));
        assert_eq!(verdict.feedback.warning, Some(Warning::AllNumbers));
        assert!(verdict.feedback.suggestions.is_empty());
        assert!(!verdict.is_valid);
    }

    #[test]
    fn test_custom_policy() {
        let policy = PasswordPolicy {
            min_length: 4,
            min_score: Score::TooGuessable,
        };
        let verdict = policy.evaluate(&entropy("dragon"), false);
        assert!(verdict.is_valid);
    }

    #[test]
    fn test_strength_serialization() {
        assert_eq!(
            serde_json::to_string(&PasswordStrength::Rated(Score::SomewhatGuessable)).unwrap(),
            r#"{"state":"rated","score":2}"#
        );
        assert_eq!(
            serde_json::to_string(&PasswordStrength::Breached).unwrap(),
            r#"{"state":"breached"}"#
        );
    }
}
