// Spam classification pipeline: normalize -> vectorize -> predict -> label.
//
// The pipeline owns read-only handles to the normalizer and both artifacts.
// Construction is where artifact compatibility is checked; after that,
// classify() is a pure function of its input text.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use super::model::ClassifierModel;
use super::tfidf::TfidfVectorizer;
use super::traits::{Classifier, Vectorizer};
use crate::error::ArtifactError;
use crate::text::normalize::{NormalizedText, Normalizer};

/// File names of the spam artifacts inside the artifact directory.
pub const VECTORIZER_FILE: &str = "vectorizer.json";
pub const MODEL_FILE: &str = "model.json";

/// The two outcomes of the spam classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Spam,
    NotSpam,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Spam => f.write_str("Spam"),
            Label::NotSpam => f.write_str("Not Spam"),
        }
    }
}

/// Which classifier class id means spam and which means not-spam.
///
/// This is a property of how the model was trained, so it comes from
/// configuration rather than being baked into the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelMap {
    pub spam: i64,
    pub not_spam: i64,
}

impl Default for LabelMap {
    fn default() -> Self {
        Self {
            spam: 1,
            not_spam: 0,
        }
    }
}

impl LabelMap {
    pub fn label_for(&self, class: i64) -> Option<Label> {
        if class == self.spam {
            Some(Label::Spam)
        } else if class == self.not_spam {
            Some(Label::NotSpam)
        } else {
            None
        }
    }
}

/// A label plus the intermediate values that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub label: Label,
    pub class: i64,
    pub normalized: String,
    /// How many vectorizer columns were non-zero
    pub active_features: usize,
}

pub struct SpamPipeline {
    normalizer: Normalizer,
    vectorizer: Box<dyn Vectorizer>,
    classifier: Box<dyn Classifier>,
    labels: LabelMap,
}

impl SpamPipeline {
    /// Assemble a pipeline, refusing artifacts that disagree with each other.
    pub fn new(
        normalizer: Normalizer,
        vectorizer: Box<dyn Vectorizer>,
        classifier: Box<dyn Classifier>,
        labels: LabelMap,
    ) -> Result<Self, ArtifactError> {
        if vectorizer.dimension() != classifier.n_features() {
            return Err(ArtifactError::mismatch(format!(
                "vectorizer produces {} features but the classifier expects {}",
                vectorizer.dimension(),
                classifier.n_features()
            )));
        }

        if labels.spam == labels.not_spam {
            return Err(ArtifactError::mismatch(format!(
                "spam and not-spam both map to class {}",
                labels.spam
            )));
        }

        let classes = classifier.classes();
        for expected in [labels.spam, labels.not_spam] {
            if !classes.contains(&expected) {
                return Err(ArtifactError::mismatch(format!(
                    "classifier classes {classes:?} do not include configured class {expected}"
                )));
            }
        }
        if let Some(extra) = classes.iter().find(|c| labels.label_for(**c).is_none()) {
            return Err(ArtifactError::mismatch(format!(
                "classifier class {extra} has no spam/not-spam mapping"
            )));
        }

        Ok(Self {
            normalizer,
            vectorizer,
            classifier,
            labels,
        })
    }

    /// Load `vectorizer.json` and `model.json` from the artifact directory.
    pub fn load(dir: &Path, normalizer: Normalizer, labels: LabelMap) -> Result<Self> {
        let vectorizer = TfidfVectorizer::load(&dir.join(VECTORIZER_FILE))
            .context("Failed to load spam vectorizer")?;
        let model =
            ClassifierModel::load(&dir.join(MODEL_FILE)).context("Failed to load spam classifier")?;

        info!(
            dimension = vectorizer.dimension(),
            kind = model.kind(),
            "Loaded spam artifacts"
        );

        let pipeline = Self::new(normalizer, Box::new(vectorizer), Box::new(model), labels)?;
        Ok(pipeline)
    }

    pub fn normalize(&self, raw: &str) -> NormalizedText {
        self.normalizer.normalize(raw)
    }

    /// Classify raw text.
    pub fn classify(&self, raw: &str) -> Result<Label> {
        Ok(self.classify_detailed(raw)?.label)
    }

    /// Classify raw text, keeping the normalized text and class id.
    pub fn classify_detailed(&self, raw: &str) -> Result<Prediction> {
        let normalized = self.normalizer.normalize(raw);
        let features = self.vectorizer.transform(normalized.as_str());
        let class = self.classifier.predict(&features)?;

        let label = self
            .labels
            .label_for(class)
            .with_context(|| format!("Classifier returned unmapped class {class}"))?;

        let active_features = features.iter().filter(|v| **v != 0.0).count();
        debug!(
            class,
            active_features,
            tokens = normalized.tokens().count(),
            "Classified text"
        );

        Ok(Prediction {
            label,
            class,
            normalized: normalized.into_string(),
            active_features,
        })
    }
}
