// Text normalizer — raw SMS/email text to a stemmed token stream.
//
// Steps, in order: lowercase, split Treebank-style into words and clitics,
// keep purely alphanumeric tokens, drop stopwords and punctuation, stem, join with single
// spaces. The vectorizer artifact was fitted on text produced this way, so
// any change here is a change to the model's input distribution.
//
// Every step is total over &str: emoji, mixed scripts and control characters
// just fall out at the alphanumeric filter.

use std::fmt;

use rust_stemmers::{Algorithm, Stemmer};

use super::stopwords::StopwordSet;

/// Whitespace-joined stemmed tokens. May be empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the individual stemmed tokens.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.split(' ').filter(|t| !t.is_empty())
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Holds the stopword set and stemmer. Immutable once built, so one instance
/// can be shared across requests.
pub struct Normalizer {
    stopwords: StopwordSet,
    stemmer: Stemmer,
}

impl Normalizer {
    pub fn new(stopwords: StopwordSet) -> Self {
        Self {
            stopwords,
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    pub fn stopwords(&self) -> &StopwordSet {
        &self.stopwords
    }

    /// Normalize raw text. Never fails.
    pub fn normalize(&self, raw: &str) -> NormalizedText {
        let lowered = raw.to_lowercase();

        let stems: Vec<String> = word_tokens(&lowered)
            .into_iter()
            .filter(|token| is_alphanumeric_token(token))
            .filter(|token| !self.stopwords.contains(token) && !is_punctuation(token))
            .map(|token| self.stemmer.stem(token).into_owned())
            .filter(|stem| !stem.is_empty())
            .collect();

        NormalizedText(stems.join(" "))
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(StopwordSet::default())
    }
}

/// Treebank-style clitics split off the end of a word.
const CLITICS: &[&str] = &["'s", "'m", "'d", "'ll", "'re", "'ve"];

/// Words the Treebank tokenizer splits after their third byte
/// ("cannot" -> "can" "not", "gonna" -> "gon" "na").
const SPLIT_WORDS: &[&str] = &["cannot", "gimme", "gonna", "gotta", "lemme", "wanna"];

/// Closing brackets and quotes that may follow a sentence-final period.
const CLOSERS: &[u8] = b")]}>\"'";

/// Split text into word tokens following the Treebank word tokenizer.
///
/// Whitespace separates chunks. Inside a chunk only these break a word:
/// `; @ # $ % & ? ! *`, quotes and brackets, `--`, an ellipsis, a period
/// ending the chunk, and `,` or `:` not followed by a digit. Contractions
/// split into stem and clitic ("don't" -> "do" "n't"). Anything else stays
/// glued, so "£1000", "3.5", "e-mail", "150p/msg" and "08:00" are single
/// tokens that the alphanumeric filter later drops.
fn word_tokens(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    for chunk in text.split_whitespace() {
        split_chunk(chunk, &mut tokens);
    }
    tokens
}

/// Split one whitespace-delimited chunk at Treebank punctuation.
///
/// Every split point is an ASCII byte, so slicing at it is always on a
/// char boundary.
fn split_chunk<'a>(chunk: &'a str, tokens: &mut Vec<&'a str>) {
    let bytes = chunk.as_bytes();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let split_len = match bytes[i] {
            b';' | b'@' | b'#' | b'$' | b'%' | b'&' | b'?' | b'!' | b'*' | b'"' | b'('
            | b')' | b'[' | b']' | b'{' | b'}' | b'<' | b'>' => 1,
            b',' | b':' if !bytes.get(i + 1).is_some_and(u8::is_ascii_digit) => 1,
            b'-' if bytes.get(i + 1) == Some(&b'-') => 2,
            b'.' => {
                let run = bytes[i..].iter().take_while(|&&b| b == b'.').count();
                let sentence_end = bytes[i + run..].iter().all(|b| CLOSERS.contains(b));
                if run >= 3 || sentence_end {
                    run
                } else {
                    0
                }
            }
            _ => 0,
        };

        if split_len == 0 {
            i += 1;
            continue;
        }
        push_word(&chunk[start..i], tokens);
        tokens.push(&chunk[i..i + split_len]);
        i += split_len;
        start = i;
    }
    push_word(&chunk[start..], tokens);
}

/// Push a punctuation-free piece, splitting off opening quotes and clitics.
fn push_word<'a>(mut word: &'a str, tokens: &mut Vec<&'a str>) {
    while word.len() > 1 && word.starts_with('\'') && !is_clitic(word) {
        tokens.push(&word[..1]);
        word = &word[1..];
    }
    if word.is_empty() {
        return;
    }
    match clitic_split(word) {
        Some(at) => {
            tokens.push(&word[..at]);
            tokens.push(&word[at..]);
        }
        None => tokens.push(word),
    }
}

fn is_clitic(word: &str) -> bool {
    let lower = word.to_ascii_lowercase();
    lower == "n't" || CLITICS.contains(&lower.as_str())
}

/// Byte offset where a trailing clitic or closing quote starts, if any.
fn clitic_split(word: &str) -> Option<usize> {
    // ASCII lowercasing keeps byte offsets valid for `word`
    let lower = word.to_ascii_lowercase();

    if SPLIT_WORDS.contains(&lower.as_str()) {
        return Some(3);
    }
    if lower.len() > 3 && lower.ends_with("n't") {
        return Some(lower.len() - 3);
    }
    for clitic in CLITICS {
        if lower.len() > clitic.len() && lower.ends_with(clitic) {
            let at = lower.len() - clitic.len();
            if !lower[..at].ends_with('\'') {
                return Some(at);
            }
        }
    }
    if lower.len() > 1 && lower.ends_with('\'') && !lower[..lower.len() - 1].ends_with('\'') {
        return Some(lower.len() - 1);
    }
    None
}

/// Non-empty and every char alphanumeric (letters or digits in any script).
fn is_alphanumeric_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(char::is_alphanumeric)
}

/// Made up only of ASCII punctuation.
fn is_punctuation(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_punctuation())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(raw: &str) -> String {
        Normalizer::default().normalize(raw).into_string()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_all_stopwords() {
        assert_eq!(normalize("the and of"), "");
    }

    #[test]
    fn test_inflections_collapse_to_one_stem() {
        assert_eq!(normalize("Loving, loved, LOVES!!"), "love love love");
    }

    #[test]
    fn test_punctuation_and_emoji_dropped() {
        assert_eq!(normalize("!!! ... 🎉🎉 ???"), "");
    }

    #[test]
    fn test_contraction_keeps_only_the_stem() {
        // "do" is a stopword and "n't" is not alphanumeric
        assert_eq!(normalize("don't"), "");
        assert_eq!(normalize("John's phone"), "john phone");
    }

    #[test]
    fn test_word_tokens_split_clitics() {
        assert_eq!(word_tokens("can't stop"), vec!["ca", "n't", "stop"]);
        assert_eq!(word_tokens("we're 'here'"), vec!["we", "'re", "'", "here", "'"]);
        assert_eq!(word_tokens("cannot"), vec!["can", "not"]);
    }

    #[test]
    fn test_word_tokens_split_treebank_punctuation() {
        assert_eq!(
            word_tokens("txt:win,now"),
            vec!["txt", ":", "win", ",", "now"]
        );
        assert_eq!(word_tokens("win!!"), vec!["win", "!", "!"]);
        assert_eq!(word_tokens("(free)"), vec!["(", "free", ")"]);
        assert_eq!(word_tokens("wait...what"), vec!["wait", "...", "what"]);
        assert_eq!(word_tokens("prize."), vec!["prize", "."]);
        assert_eq!(word_tokens("\"prize.\""), vec!["\"", "prize", ".", "\""]);
        assert_eq!(word_tokens("a--b"), vec!["a", "--", "b"]);
    }

    #[test]
    fn test_word_tokens_keep_glued_symbols() {
        assert_eq!(word_tokens("£1000"), vec!["£1000"]);
        assert_eq!(word_tokens("3.5"), vec!["3.5"]);
        assert_eq!(word_tokens("150p/msg"), vec!["150p/msg"]);
        assert_eq!(word_tokens("e-mail"), vec!["e-mail"]);
        assert_eq!(word_tokens("www.win.com"), vec!["www.win.com"]);
        assert_eq!(word_tokens("08:00"), vec!["08:00"]);
        assert_eq!(word_tokens("1,000"), vec!["1,000"]);
    }

    #[test]
    fn test_numbers_survive() {
        assert_eq!(normalize("Call 08712460324 now"), "call 08712460324");
    }

    #[test]
    fn test_order_preserved() {
        assert_eq!(normalize("winner claim prize"), "winner claim prize");
    }

    #[test]
    fn test_tokens_iterator() {
        let text = Normalizer::default().normalize("free entry in a weekly draw");
        let tokens: Vec<&str> = text.tokens().collect();
        assert_eq!(tokens, vec!["free", "entri", "week", "draw"]);
    }

    #[test]
    fn test_is_punctuation() {
        assert!(is_punctuation("!"));
        assert!(is_punctuation("..."));
        assert!(!is_punctuation("a"));
        assert!(!is_punctuation(""));
    }
}
