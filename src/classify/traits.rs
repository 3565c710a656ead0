// Vectorizer and classifier traits — the seams around the pre-trained artifacts.

use anyhow::Result;

/// Maps one normalized document to a fixed-dimension feature vector.
pub trait Vectorizer: Send + Sync {
    /// Number of columns every output vector has.
    fn dimension(&self) -> usize;

    /// Transform exactly one document.
    fn transform(&self, document: &str) -> Vec<f64>;
}

/// Predicts a class id from a feature vector.
pub trait Classifier: Send + Sync {
    /// Number of features the classifier was trained on.
    fn n_features(&self) -> usize;

    /// Class ids the classifier can emit, in training order.
    fn classes(&self) -> &[i64];

    /// Predict a single class id. Fails if the vector has the wrong length.
    fn predict(&self, features: &[f64]) -> Result<i64>;
}
