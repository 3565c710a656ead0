// Stopword sets.
//
// The builtin list is the one the bundled spam classifier was trained with
// (the NLTK English list, minus the contraction fragments). Changing it
// changes which tokens reach the vectorizer, so it must match the artifact.

use std::collections::HashSet;

use stop_words::{get, LANGUAGE};

/// Which stopword list to filter with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopwordSource {
    /// The fixed training-time list (default)
    Builtin,
    /// The broader English list shipped with the `stop-words` crate
    Extended,
}

impl StopwordSource {
    /// Parse the `SIEVE_STOPWORDS` value. Unknown values are rejected.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "builtin" | "" => Some(Self::Builtin),
            "extended" => Some(Self::Extended),
            _ => None,
        }
    }
}

const BUILTIN_ENGLISH: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
    "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
    "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by",
    "for", "with", "about", "against", "between", "into", "through", "during", "before",
    "after", "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over",
    "under", "again", "further", "then", "once", "here", "there", "when", "where", "why",
    "how", "all", "any", "both", "each", "few", "more", "most", "other", "some", "such", "no",
    "nor", "not", "only", "own", "same", "so", "than", "too", "very", "s", "t", "can", "will",
    "just", "don", "should", "now",
];

/// An immutable set of lowercase stopwords.
#[derive(Debug, Clone)]
pub struct StopwordSet {
    words: HashSet<String>,
}

impl StopwordSet {
    pub fn from_source(source: StopwordSource) -> Self {
        match source {
            StopwordSource::Builtin => Self::builtin(),
            StopwordSource::Extended => Self::extended(),
        }
    }

    /// The training-time English list.
    pub fn builtin() -> Self {
        Self::from_words(BUILTIN_ENGLISH.iter().copied())
    }

    /// English stopwords from the `stop-words` crate.
    pub fn extended() -> Self {
        let words: Vec<String> = get(LANGUAGE::English);
        Self::from_words(words.iter().map(String::as_str))
    }

    /// Build a set from arbitrary words. Entries are lowercased.
    pub fn from_words<'a>(words: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            words: words.into_iter().map(|w| w.trim().to_lowercase()).collect(),
        }
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, word: &str) -> bool {
        if self.words.contains(word) {
            return true;
        }
        let lower = word.to_lowercase();
        lower != word && self.words.contains(&lower)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for StopwordSet {
    fn default() -> Self {
        Self::builtin()
    }
}
