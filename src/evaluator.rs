//! Password guessability estimator - main estimation logic.

use std::time::{Duration, Instant};

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

#[cfg(feature = "async")]
use tokio::sync::mpsc;

#[cfg(feature = "async")]
use tokio_util::sync::CancellationToken;

use crate::dictionaries::{dictionaries, FrequencyDictionaries};
use crate::feedback::{get_feedback, Feedback};
use crate::matching::{omnimatch, Match};
use crate::scoring::most_guessable_match_sequence;
use crate::time_estimates::{estimate_attack_times, CrackTimesDisplay, CrackTimesSeconds, Score};

const DEFAULT_LANGUAGE: &str = "en";

/// Everything learned about one password.
#[derive(Debug, Serialize)]
pub struct Entropy {
    #[serde(skip)]
    pub password: SecretString,
    pub guesses: f64,
    pub guesses_log10: f64,
    pub calc_time: Duration,
    pub crack_times_seconds: CrackTimesSeconds,
    pub crack_times_display: CrackTimesDisplay,
    pub score: Score,
    /// The cheapest explanation of the password, covering it left to right.
    pub sequence: Vec<Match>,
    pub feedback: Feedback,
    /// Primary language subtag the feedback should be shown in.
    pub language: String,
}

/// Outcome of [`estimate`].
#[derive(Debug)]
pub enum Estimation {
    Ready(Entropy),
    /// The frequency dictionaries are not installed yet; estimating now would
    /// rate dictionary words as random text.
    DictionariesPending,
}

impl Estimation {
    pub fn ready(self) -> Option<Entropy> {
        match self {
            Self::Ready(entropy) => Some(entropy),
            Self::DictionariesPending => None,
        }
    }
}

/// Estimates how many guesses an attacker needs for `password`.
///
/// # Arguments
/// * `password` - The password to estimate
/// * `user_inputs` - Context words for this call only (user name, site name, ...)
/// * `language` - Locale tag for the feedback, e.g. `en` or `pt-BR`
///
/// # Returns
/// `Estimation::DictionariesPending` until one of the dictionary init
/// functions has succeeded, otherwise the full [`Entropy`].
pub fn estimate<S: AsRef<str>>(
    password: &SecretString,
    user_inputs: &[S],
    language: &str,
) -> Estimation {
    let Some(dictionaries) = dictionaries() else {
        #[cfg(feature = "tracing")]
        tracing::warn!("estimation requested before frequency dictionaries were installed");
        return Estimation::DictionariesPending;
    };
    Estimation::Ready(estimate_with(password, user_inputs, language, &dictionaries))
}

/// Estimates against an explicit dictionary set, bypassing the registry.
pub fn estimate_with<S: AsRef<str>>(
    password: &SecretString,
    user_inputs: &[S],
    language: &str,
    dictionaries: &FrequencyDictionaries,
) -> Entropy {
    let start = Instant::now();
    let pwd = password.expose_secret();

    // user inputs are ranked afresh for every call
    let dictionary_set = dictionaries.with_user_inputs(user_inputs);
    let matches = omnimatch(pwd, &dictionary_set);
    let result = most_guessable_match_sequence(pwd, matches, false);
    let attack_times = estimate_attack_times(result.guesses);
    let feedback = get_feedback(attack_times.score, &result.sequence);

    #[cfg(feature = "tracing")]
    tracing::debug!(
        guesses = result.guesses,
        score = attack_times.score.as_u8(),
        sequence_len = result.sequence.len(),
        "estimation finished"
    );

    Entropy {
        password: SecretString::new(pwd.into()),
        guesses: result.guesses,
        guesses_log10: result.guesses_log10,
        calc_time: start.elapsed(),
        crack_times_seconds: attack_times.crack_times_seconds,
        crack_times_display: attack_times.crack_times_display,
        score: attack_times.score,
        sequence: result.sequence,
        feedback,
        language: normalize_language(language),
    }
}

/// Reduces a locale tag to its lowercase primary subtag (`pt-BR` -> `pt`).
pub fn normalize_language(tag: &str) -> String {
    let primary = tag.trim().split(['-', '_']).next().unwrap_or_default();
    if primary.is_empty() || !primary.chars().all(|c| c.is_ascii_alphabetic()) {
        return DEFAULT_LANGUAGE.to_string();
    }
    primary.to_ascii_lowercase()
}

/// Async version that waits for the dictionaries and sends the estimate via channel.
///
/// Debounces for 300 ms so fast typists only pay for the last keystroke, then
/// polls every 500 ms until the dictionaries are installed. The estimate runs
/// on a blocking worker. Nothing is sent once `token` is cancelled.
#[cfg(feature = "async")]
pub async fn estimate_tx(
    password: SecretString,
    user_inputs: Vec<String>,
    language: String,
    token: CancellationToken,
    tx: mpsc::Sender<Entropy>,
) {
    #[cfg(feature = "tracing")]
    tracing::info!("estimation is about to start...");

    if token
        .run_until_cancelled(tokio::time::sleep(Duration::from_millis(300)))
        .await
        .is_none()
    {
        return;
    }

    let dictionaries = loop {
        if let Some(dictionaries) = dictionaries() {
            break dictionaries;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!("frequency dictionaries not ready, retrying in 500ms");
        if token
            .run_until_cancelled(tokio::time::sleep(Duration::from_millis(500)))
            .await
            .is_none()
        {
            return;
        }
    };

    let worker = tokio::task::spawn_blocking(move || {
        estimate_with(&password, user_inputs.as_slice(), &language, &dictionaries)
    });
    let entropy = match worker.await {
        Ok(entropy) => entropy,
        Err(_e) => {
            #[cfg(feature = "tracing")]
            tracing::error!("Password estimation worker failed: {}", _e);
            return;
        }
    };

    if token.is_cancelled() {
        return;
    }
    if let Err(_e) = tx.send(entropy).await {
        #[cfg(feature = "tracing")]
        tracing::error!("Failed to send password estimation result: {}", _e);
    }
}


#[cfg(all(test, feature = "async"))]
mod async_tests {
    use super::*;
    use crate::dictionaries::{install_dictionaries, reset_dictionaries_for_testing, test_dictionaries};
    use serial_test::serial;

    fn secret(password: &str) -> SecretString {
        SecretString::new(password.to_string().into())
    }

    #[tokio::test]
    #[serial]
    async fn test_estimate_tx() {
        reset_dictionaries_for_testing();
        install_dictionaries(test_dictionaries());
        let (tx, mut rx) = mpsc::channel(1);
        let token = CancellationToken::new();

        estimate_tx(secret("dragon"), Vec::new(), "en".into(), token, tx).await;

        let entropy = rx.recv().await.expect("Should receive estimation");
        assert_eq!(entropy.score, Score::TooGuessable);
        assert_eq!(entropy.sequence.len(), 1);

        reset_dictionaries_for_testing();
    }

    #[tokio::test]
    #[serial]
    async fn test_estimate_tx_waits_for_dictionaries() {
        reset_dictionaries_for_testing();
        let (tx, mut rx) = mpsc::channel(1);
        let token = CancellationToken::new();

        let handle = tokio::spawn(estimate_tx(
            secret("monkey"),
            vec!["acme".to_string()],
            "en".into(),
            token,
            tx,
        ));
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(rx.try_recv().is_err());

        install_dictionaries(test_dictionaries());
        let entropy = rx.recv().await.expect("Should receive estimation once ready");
        assert_eq!(entropy.score, Score::TooGuessable);
        handle.await.expect("estimation task panicked");

        reset_dictionaries_for_testing();
    }

    #[tokio::test]
    #[serial]
    async fn test_estimate_tx_cancelled() {
        reset_dictionaries_for_testing();
        install_dictionaries(test_dictionaries());
        let (tx, mut rx) = mpsc::channel(1);
        let token = CancellationToken::new();
        token.cancel();

        estimate_tx(secret("TestPass123!"), Vec::new(), "en".into(), token, tx).await;

        assert!(rx.recv().await.is_none());

        reset_dictionaries_for_testing();
    }

    #[tokio::test]
    #[serial]
    async fn test_estimate_tx_cancelled_while_waiting() {
        reset_dictionaries_for_testing();
        let (tx, mut rx) = mpsc::channel(1);
        let token = CancellationToken::new();

        let handle = tokio::spawn(estimate_tx(
            secret("TestPass123!"),
            Vec::new(),
            "en".into(),
            token.clone(),
            tx,
        ));
        tokio::time::sleep(Duration::from_millis(350)).await;
        token.cancel();
        handle.await.expect("estimation task panicked");

        assert!(rx.recv().await.is_none());
    }
}
