// Spam classification — normalizer, vectorizer and classifier chained into
// one read-only pipeline.
//
// The Vectorizer and Classifier traits keep the pipeline independent of the
// artifact formats. The JSON artifacts in tfidf.rs and model.rs are the
// default implementations.

pub mod model;
pub mod pipeline;
pub mod tfidf;
pub mod traits;
