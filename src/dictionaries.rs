//! Frequency dictionary management module
//!
//! Handles loading the ranked word lists (common passwords, English words,
//! names, ...) and the process-wide registry the estimator reads from.
//! Per-call context words never enter the registry: they are ranked into a
//! fresh [`DictionarySet`] for each estimate.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use serde::Deserialize;
use thiserror::Error;

static RANKED_DICTIONARIES: RwLock<Option<Arc<FrequencyDictionaries>>> = RwLock::new(None);

/// Name of the per-call dictionary built from caller-supplied context.
pub const USER_INPUTS: &str = "user_inputs";

#[derive(Error, Debug)]
pub enum DictionaryError {
    #[error("Dictionary file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Failed to read dictionary file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse dictionary file: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Dictionary file is empty")]
    EmptyFile,
    #[error("Dictionary '{0}' has no words")]
    EmptyDictionary(String),
}

/// Maps a lowercase word to its frequency rank (1 = most common).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankedDictionary {
    ranks: HashMap<String, usize>,
    max_word_len: usize,
}

impl RankedDictionary {
    /// Builds a ranked dictionary from a list ordered most-common first.
    ///
    /// Words are trimmed and lowercased, rank is `1 + position` in the list.
    /// When a word appears twice the earlier (more common) rank is kept.
    pub fn from_ordered<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ranks = HashMap::new();
        let mut max_word_len = 0;
        for (position, word) in words.into_iter().enumerate() {
            let word = word.as_ref().trim().to_lowercase();
            if word.is_empty() {
                continue;
            }
            max_word_len = max_word_len.max(word.chars().count());
            ranks.entry(word).or_insert(position + 1);
        }
        Self { ranks, max_word_len }
    }

    pub fn rank(&self, word: &str) -> Option<usize> {
        self.ranks.get(word).copied()
    }

    /// Length in chars of the longest word, used to bound substring scans.
    pub fn max_word_len(&self) -> usize {
        self.max_word_len
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

/// The static, named dictionaries shared by every estimate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyDictionaries {
    dictionaries: BTreeMap<String, RankedDictionary>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WordList {
    Joined(String),
    Words(Vec<String>),
}

impl FrequencyDictionaries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the set from `(name, words)` pairs, words ordered most-common first.
    pub fn from_ordered_lists<I, N, W, S>(lists: I) -> Self
    where
        I: IntoIterator<Item = (N, W)>,
        N: Into<String>,
        W: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dictionaries = Self::new();
        for (name, words) in lists {
            dictionaries.insert(name, RankedDictionary::from_ordered(words));
        }
        dictionaries
    }

    /// Parses a JSON object of `name -> words`.
    ///
    /// Each value is either an array of words or a single comma-separated
    /// string, most common word first.
    pub fn from_json_str(content: &str) -> Result<Self, DictionaryError> {
        if content.trim().is_empty() {
            return Err(DictionaryError::EmptyFile);
        }

        let raw: BTreeMap<String, WordList> = serde_json::from_str(content)?;
        if raw.is_empty() {
            return Err(DictionaryError::EmptyFile);
        }

        let mut dictionaries = Self::new();
        for (name, list) in raw {
            let ranked = match list {
                WordList::Joined(joined) => RankedDictionary::from_ordered(joined.split(',')),
                WordList::Words(words) => RankedDictionary::from_ordered(words),
            };
            if ranked.is_empty() {
                return Err(DictionaryError::EmptyDictionary(name));
            }
            dictionaries.insert(name, ranked);
        }
        Ok(dictionaries)
    }

    /// Adds or replaces a dictionary. The reserved `user_inputs` name is
    /// ignored: context words are supplied per call.
    pub fn insert(&mut self, name: impl Into<String>, dictionary: RankedDictionary) {
        let name = name.into();
        if name == USER_INPUTS {
            return;
        }
        self.dictionaries.insert(name, dictionary);
    }

    pub fn get(&self, name: &str) -> Option<&RankedDictionary> {
        self.dictionaries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RankedDictionary)> {
        self.dictionaries.iter().map(|(name, dict)| (name.as_str(), dict))
    }

    /// Total number of ranked words across all dictionaries.
    pub fn word_count(&self) -> usize {
        self.dictionaries.values().map(RankedDictionary::len).sum()
    }

    /// Merges the static dictionaries with a fresh ranking of `user_inputs`.
    pub fn with_user_inputs<S: AsRef<str>>(&self, user_inputs: &[S]) -> DictionarySet<'_> {
        DictionarySet {
            shared: self,
            user_inputs: RankedDictionary::from_ordered(user_inputs),
        }
    }
}

/// The immutable dictionary view used for one matching run.
#[derive(Debug, Clone)]
pub struct DictionarySet<'a> {
    shared: &'a FrequencyDictionaries,
    user_inputs: RankedDictionary,
}

impl<'a> DictionarySet<'a> {
    /// Iterates the shared dictionaries first, then `user_inputs`.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RankedDictionary)> {
        self.shared
            .iter()
            .chain(std::iter::once((USER_INPUTS, &self.user_inputs)))
    }

    pub fn user_inputs(&self) -> &RankedDictionary {
        &self.user_inputs
    }
}

/// Returns the dictionary file path.
///
/// Priority:
/// 1. Environment variable `PWD_DICTIONARIES_PATH`
/// 2. Default path `./assets/frequency_lists.json`
pub fn get_dictionaries_path() -> PathBuf {
    std::env::var("PWD_DICTIONARIES_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./assets/frequency_lists.json"))
}

/// Initializes the frequency dictionaries from the configured file.
///
/// # Environment Variable
///
/// Set `PWD_DICTIONARIES_PATH` to specify a custom file location.
/// If not set, defaults to `./assets/frequency_lists.json`.
///
/// # Errors
///
/// Returns error if:
/// - File does not exist
/// - File cannot be read or parsed
/// - File or one of its dictionaries is empty
///
/// # Example
///
/// ```rust,ignore
/// unsafe { std::env::set_var("PWD_DICTIONARIES_PATH", "/etc/myapp/frequency_lists.json"); }
/// pwd_guess::init_dictionaries()?;
/// ```
pub fn init_dictionaries() -> Result<usize, DictionaryError> {
    let path = get_dictionaries_path();
    init_dictionaries_from_path(&path)
}

/// Initializes the frequency dictionaries from a specific file path.
///
/// Returns the number of ranked words installed. If dictionaries are
/// already installed this is a no-op returning the existing count.
pub fn init_dictionaries_from_path<P: AsRef<Path>>(path: P) -> Result<usize, DictionaryError> {
    if let Some(existing) = dictionaries() {
        return Ok(existing.word_count());
    }

    let path = path.as_ref();

    if !path.exists() {
        #[cfg(feature = "tracing")]
        tracing::error!("Dictionary initialization FAILED: FileNotFound {:?}", path);
        return Err(DictionaryError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let parsed = FrequencyDictionaries::from_json_str(&content).inspect_err(|_e| {
        #[cfg(feature = "tracing")]
        tracing::error!("Dictionary initialization FAILED for {:?}: {}", path, _e);
    })?;

    Ok(install_dictionaries(parsed))
}

/// Installs dictionaries loaded by the caller.
///
/// The first installation wins; later calls leave the registry untouched
/// and return the installed word count.
pub fn install_dictionaries(dictionaries: FrequencyDictionaries) -> usize {
    let mut guard = RANKED_DICTIONARIES
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    if let Some(existing) = guard.as_ref() {
        return existing.word_count();
    }

    let count = dictionaries.word_count();
    *guard = Some(Arc::new(dictionaries));

    #[cfg(feature = "tracing")]
    tracing::info!("Frequency dictionaries installed: {} words", count);

    count
}

/// Returns a shared handle to the installed dictionaries.
///
/// Returns `None` until one of the init functions has succeeded.
pub fn dictionaries() -> Option<Arc<FrequencyDictionaries>> {
    RANKED_DICTIONARIES
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Whether dictionary-based matching can run yet.
pub fn dictionaries_ready() -> bool {
    RANKED_DICTIONARIES
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .is_some()
}

/// Resets the registry for testing purposes.
#[cfg(test)]
pub fn reset_dictionaries_for_testing() {
    let mut guard = RANKED_DICTIONARIES
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    *guard = None;
}

/// Small fixture standing in for the real frequency lists.
#[cfg(test)]
pub(crate) fn test_dictionaries() -> FrequencyDictionaries {
    FrequencyDictionaries::from_ordered_lists([
        (
            "passwords",
            vec![
                "123456", "password", "12345678", "qwerty", "123456789", "12345", "1234",
                "111111", "1234567", "dragon", "123123", "baseball", "abc123", "football",
                "monkey", "letmein", "shadow", "master", "696969", "mustang",
            ],
        ),
        (
            "english_wikipedia",
            vec![
                "the", "of", "and", "to", "in", "was", "is", "for", "on", "as", "with", "by",
                "he", "at", "from", "his", "an", "were", "are", "which", "word", "pass",
            ],
        ),
        ("male_names", vec!["james", "john", "robert", "michael", "william"]),
        ("female_names", vec!["mary", "patricia", "linda", "barbara", "elizabeth"]),
        ("surnames", vec!["smith", "johnson", "williams", "jones", "brown"]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper to safely set env var in tests
    fn set_env(key: &str, value: &str) {
        // SAFETY: This is only for testing purposes in single-threaded test context
        unsafe { std::env::set_var(key, value); }
    }

    /// Helper to safely remove env var in tests
    fn remove_env(key: &str) {
        // SAFETY: This is only for testing purposes in single-threaded test context
        unsafe { std::env::remove_var(key); }
    }

    fn setup_with_tempfile(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        write!(temp_file, "{}", content).expect("Failed to write");
        temp_file
    }

    #[test]
    fn test_ranked_dictionary_ranks_by_position() {
        let dict = RankedDictionary::from_ordered(["Password", " letmein ", "", "password"]);
        assert_eq!(dict.rank("password"), Some(1));
        assert_eq!(dict.rank("letmein"), Some(2));
        assert_eq!(dict.rank("Password"), None);
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.max_word_len(), 8);
    }

    #[test]
    fn test_from_json_accepts_joined_and_array_lists() {
        let dicts = FrequencyDictionaries::from_json_str(
            r#"{"passwords": "123456,password,qwerty", "surnames": ["smith", "jones"]}"#,
        )
        .expect("valid json");
        assert_eq!(dicts.get("passwords").and_then(|d| d.rank("qwerty")), Some(3));
        assert_eq!(dicts.get("surnames").and_then(|d| d.rank("jones")), Some(2));
        assert_eq!(dicts.word_count(), 5);
    }

    #[test]
    fn test_from_json_rejects_empty_dictionary() {
        let result = FrequencyDictionaries::from_json_str(r#"{"passwords": ""}"#);
        assert!(matches!(result, Err(DictionaryError::EmptyDictionary(name)) if name == "passwords"));
    }

    #[test]
    fn test_from_json_rejects_malformed_content() {
        assert!(matches!(
            FrequencyDictionaries::from_json_str("   "),
            Err(DictionaryError::EmptyFile)
        ));
        assert!(matches!(
            FrequencyDictionaries::from_json_str("[1, 2"),
            Err(DictionaryError::ParseError(_))
        ));
    }

    #[test]
    fn test_user_inputs_are_per_set() {
        let shared = test_dictionaries();
        let with_company = shared.with_user_inputs(&["CompanyName"]);
        let without = shared.with_user_inputs::<&str>(&[]);

        assert_eq!(with_company.user_inputs().rank("companyname"), Some(1));
        assert!(without.user_inputs().is_empty());
        assert!(shared.get(USER_INPUTS).is_none());
        assert_eq!(with_company.iter().last().map(|(name, _)| name), Some(USER_INPUTS));
    }

    #[test]
    fn test_insert_ignores_reserved_name() {
        let mut dicts = FrequencyDictionaries::new();
        dicts.insert(USER_INPUTS, RankedDictionary::from_ordered(["leak"]));
        assert!(dicts.get(USER_INPUTS).is_none());
    }

    #[test]
    #[serial]
    fn test_get_dictionaries_path_default() {
        remove_env("PWD_DICTIONARIES_PATH");

        let path = get_dictionaries_path();
        assert_eq!(path, PathBuf::from("./assets/frequency_lists.json"));
    }

    #[test]
    #[serial]
    fn test_get_dictionaries_path_from_env() {
        let custom_path = "/custom/path/frequency_lists.json";
        set_env("PWD_DICTIONARIES_PATH", custom_path);

        let path = get_dictionaries_path();
        assert_eq!(path, PathBuf::from(custom_path));

        remove_env("PWD_DICTIONARIES_PATH");
    }

    #[test]
    #[serial]
    fn test_init_dictionaries_file_not_found() {
        reset_dictionaries_for_testing();
        set_env("PWD_DICTIONARIES_PATH", "/nonexistent/path/frequency_lists.json");

        let result = init_dictionaries();
        assert!(matches!(result, Err(DictionaryError::FileNotFound(_))));
        assert!(!dictionaries_ready());

        remove_env("PWD_DICTIONARIES_PATH");
    }

    #[test]
    #[serial]
    fn test_init_dictionaries_empty_file() {
        reset_dictionaries_for_testing();
        let temp_file = setup_with_tempfile("");

        let path = temp_file.path().to_str().unwrap();
        set_env("PWD_DICTIONARIES_PATH", path);

        let result = init_dictionaries();
        assert!(matches!(result, Err(DictionaryError::EmptyFile)));
        assert!(!dictionaries_ready());

        remove_env("PWD_DICTIONARIES_PATH");
    }

    #[test]
    #[serial]
    fn test_init_dictionaries_success() {
        reset_dictionaries_for_testing();
        let temp_file = setup_with_tempfile(r#"{"passwords": "password123,qwerty"}"#);

        let path = temp_file.path().to_str().unwrap();
        set_env("PWD_DICTIONARIES_PATH", path);

        let result = init_dictionaries();
        assert_eq!(result.unwrap(), 2);
        assert!(dictionaries_ready());

        let installed = dictionaries().expect("installed");
        assert_eq!(installed.get("passwords").and_then(|d| d.rank("qwerty")), Some(2));

        remove_env("PWD_DICTIONARIES_PATH");
        reset_dictionaries_for_testing();
    }

    #[test]
    #[serial]
    fn test_install_dictionaries_first_wins() {
        reset_dictionaries_for_testing();

        assert_eq!(install_dictionaries(test_dictionaries()), test_dictionaries().word_count());
        let replacement = FrequencyDictionaries::from_ordered_lists([("passwords", vec!["x"])]);
        assert_eq!(install_dictionaries(replacement), test_dictionaries().word_count());
        assert!(dictionaries().unwrap().get("surnames").is_some());

        reset_dictionaries_for_testing();
    }
}
