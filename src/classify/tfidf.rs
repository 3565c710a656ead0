// TF-IDF vectorizer artifact.
//
// The JSON layout mirrors a fitted scikit-learn TfidfVectorizer: a term to
// column vocabulary plus one idf weight per column. Transform reproduces
// sklearn's defaults for text that has already been normalized: whitespace
// tokens of at least two chars (the `\b\w\w+\b` token pattern), optional
// word n-grams, raw or sublinear term frequency, idf weighting, row norm.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::Vectorizer;
use crate::error::{read_json, ArtifactError};

/// Row normalization applied after idf weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    #[serde(default = "default_ngram_range")]
    ngram_range: (usize, usize),
    #[serde(default)]
    sublinear_tf: bool,
    #[serde(default = "default_norm")]
    norm: Option<Norm>,
    #[serde(default = "default_min_token_len")]
    min_token_len: usize,
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

fn default_min_token_len() -> usize {
    2
}

impl TfidfVectorizer {
    /// Build a unigram, l2-normalized vectorizer from its fitted parts.
    pub fn new(vocabulary: HashMap<String, usize>, idf: Vec<f64>) -> Result<Self, ArtifactError> {
        let vectorizer = Self {
            vocabulary,
            idf,
            ngram_range: default_ngram_range(),
            sublinear_tf: false,
            norm: default_norm(),
            min_token_len: default_min_token_len(),
        };
        vectorizer.validate()?;
        Ok(vectorizer)
    }

    pub fn with_ngram_range(mut self, min_n: usize, max_n: usize) -> Result<Self, ArtifactError> {
        self.ngram_range = (min_n, max_n);
        self.validate()?;
        Ok(self)
    }

    pub fn with_sublinear_tf(mut self, sublinear_tf: bool) -> Self {
        self.sublinear_tf = sublinear_tf;
        self
    }

    pub fn with_norm(mut self, norm: Option<Norm>) -> Self {
        self.norm = norm;
        self
    }

    /// Load and validate a vectorizer artifact from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let vectorizer: Self = read_json(path)?;
        vectorizer.validate()?;
        debug!(
            path = %path.display(),
            terms = vectorizer.vocabulary.len(),
            dimension = vectorizer.idf.len(),
            "Loaded TF-IDF vectorizer"
        );
        Ok(vectorizer)
    }

    fn validate(&self) -> Result<(), ArtifactError> {
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ArtifactError::mismatch(format!(
                "vectorizer ngram_range ({min_n}, {max_n}) is invalid"
            )));
        }
        if let Some((term, &column)) = self
            .vocabulary
            .iter()
            .find(|&(_, &column)| column >= self.idf.len())
        {
            return Err(ArtifactError::mismatch(format!(
                "vectorizer term {term:?} maps to column {column} but only {} idf weights exist",
                self.idf.len()
            )));
        }
        Ok(())
    }

    /// Split a document into the terms the vocabulary is keyed on.
    fn terms(&self, document: &str) -> Vec<String> {
        let tokens: Vec<&str> = document
            .split_whitespace()
            .filter(|t| t.chars().count() >= self.min_token_len)
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n {
            if n > tokens.len() {
                break;
            }
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }
}

impl Vectorizer for TfidfVectorizer {
    fn dimension(&self) -> usize {
        self.idf.len()
    }

    fn transform(&self, document: &str) -> Vec<f64> {
        let mut row = vec![0.0f64; self.idf.len()];

        for term in self.terms(document) {
            if let Some(&column) = self.vocabulary.get(&term) {
                row[column] += 1.0;
            }
        }

        for (column, value) in row.iter_mut().enumerate() {
            if *value > 0.0 {
                let tf = if self.sublinear_tf {
                    value.ln() + 1.0
                } else {
                    *value
                };
                *value = tf * self.idf[column];
            }
        }

        let length = match self.norm {
            Some(Norm::L2) => row.iter().map(|v| v * v).sum::<f64>().sqrt(),
            Some(Norm::L1) => row.iter().map(|v| v.abs()).sum::<f64>(),
            None => 0.0,
        };
        if length > 0.0 {
            for value in &mut row {
                *value /= length;
            }
        }

        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(terms: &[&str]) -> HashMap<String, usize> {
        terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.to_string(), i))
            .collect()
    }

    #[test]
    fn test_transform_counts_and_normalizes() {
        let v = TfidfVectorizer::new(vocab(&["free", "prize", "call"]), vec![1.0, 2.0, 1.0])
            .unwrap();
        let row = v.transform("free prize prize");
        // raw: [1, 4, 0] -> l2 norm sqrt(17)
        let norm = 17f64.sqrt();
        assert!((row[0] - 1.0 / norm).abs() < 1e-12);
        assert!((row[1] - 4.0 / norm).abs() < 1e-12);
        assert_eq!(row[2], 0.0);
    }

    #[test]
    fn test_empty_document_is_zero_vector() {
        let v = TfidfVectorizer::new(vocab(&["free"]), vec![1.5]).unwrap();
        assert_eq!(v.transform(""), vec![0.0]);
    }

    #[test]
    fn test_single_char_tokens_ignored() {
        let v = TfidfVectorizer::new(vocab(&["u", "ur"]), vec![1.0, 1.0]).unwrap();
        let row = v.transform("u ur");
        assert_eq!(row[0], 0.0);
        assert!((row[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_bigrams() {
        let v = TfidfVectorizer::new(vocab(&["free", "free entri"]), vec![1.0, 1.0])
            .unwrap()
            .with_ngram_range(1, 2)
            .unwrap()
            .with_norm(None);
        assert_eq!(v.transform("free entri"), vec![1.0, 1.0]);
    }

    #[test]
    fn test_sublinear_tf() {
        let v = TfidfVectorizer::new(vocab(&["win"]), vec![1.0])
            .unwrap()
            .with_sublinear_tf(true)
            .with_norm(None);
        let row = v.transform("win win win");
        assert!((row[0] - (3f64.ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_range_column_rejected() {
        let mut vocabulary = vocab(&["free"]);
        vocabulary.insert("prize".to_string(), 5);
        let err = TfidfVectorizer::new(vocabulary, vec![1.0]).unwrap_err();
        assert!(err.is_mismatch());
    }

    #[test]
    fn test_deserialize_defaults() {
        let json = r#"{"vocabulary": {"free": 0}, "idf": [1.0]}"#;
        let v: TfidfVectorizer = serde_json::from_str(json).unwrap();
        assert_eq!(v.ngram_range, (1, 1));
        assert_eq!(v.norm, Some(Norm::L2));
        assert!(!v.sublinear_tf);
        assert_eq!(v.dimension(), 1);
    }

    #[test]
    fn test_deserialize_null_norm() {
        let json = r#"{"vocabulary": {}, "idf": [], "norm": null}"#;
        let v: TfidfVectorizer = serde_json::from_str(json).unwrap();
        assert_eq!(v.norm, None);
    }
}
