// Classifier artifacts.
//
// A trained classifier is stored as JSON tagged by `kind`. The three kinds
// cover what spam filters over TF-IDF features are usually trained with:
// multinomial and Bernoulli naive Bayes, and linear models (logistic
// regression, linear SVM). Each holds exactly the fitted parameters its
// scikit-learn counterpart needs for `predict`.

use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::Classifier;
use crate::error::{read_json, ArtifactError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierModel {
    MultinomialNb {
        classes: Vec<i64>,
        class_log_prior: Vec<f64>,
        /// One row per class, one column per feature
        feature_log_prob: Vec<Vec<f64>>,
    },
    BernoulliNb {
        classes: Vec<i64>,
        class_log_prior: Vec<f64>,
        feature_log_prob: Vec<Vec<f64>>,
        /// Features above this count as present. `null` means the input is
        /// already binary and is used as-is; a missing field means 0.0.
        #[serde(default = "default_binarize")]
        binarize: Option<f64>,
    },
    Linear {
        classes: Vec<i64>,
        /// One row for a binary model, one row per class otherwise
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
    },
}

fn default_binarize() -> Option<f64> {
    Some(0.0)
}

impl ClassifierModel {
    /// Load and validate a classifier artifact from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let model: Self = read_json(path)?;
        model.validate()?;
        debug!(
            path = %path.display(),
            kind = model.kind(),
            features = model.n_features(),
            classes = ?model.classes(),
            "Loaded classifier"
        );
        Ok(model)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::MultinomialNb { .. } => "multinomial_nb",
            Self::BernoulliNb { .. } => "bernoulli_nb",
            Self::Linear { .. } => "linear",
        }
    }

    /// Check that every parameter array agrees on class and feature counts.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        let classes = self.classes();
        if classes.len() < 2 {
            return Err(ArtifactError::mismatch(format!(
                "classifier needs at least two classes, found {}",
                classes.len()
            )));
        }

        let (rows, intercepts) = match self {
            Self::MultinomialNb {
                class_log_prior,
                feature_log_prob,
                ..
            }
            | Self::BernoulliNb {
                class_log_prior,
                feature_log_prob,
                ..
            } => {
                if feature_log_prob.len() != classes.len() {
                    return Err(ArtifactError::mismatch(format!(
                        "classifier has {} classes but {} feature_log_prob rows",
                        classes.len(),
                        feature_log_prob.len()
                    )));
                }
                (feature_log_prob, class_log_prior)
            }
            Self::Linear {
                coef, intercept, ..
            } => {
                let expected_rows = if classes.len() == 2 { 1 } else { classes.len() };
                if coef.len() != expected_rows {
                    return Err(ArtifactError::mismatch(format!(
                        "linear classifier with {} classes needs {} coef rows, found {}",
                        classes.len(),
                        expected_rows,
                        coef.len()
                    )));
                }
                (coef, intercept)
            }
        };

        if intercepts.len() != rows.len() {
            return Err(ArtifactError::mismatch(format!(
                "classifier has {} weight rows but {} bias terms",
                rows.len(),
                intercepts.len()
            )));
        }

        let width = rows[0].len();
        if rows.iter().any(|row| row.len() != width) {
            return Err(ArtifactError::mismatch(
                "classifier weight rows have differing lengths",
            ));
        }
        Ok(())
    }

    /// Per-class scores; argmax picks the prediction.
    fn decision(&self, x: &[f64]) -> Vec<f64> {
        match self {
            Self::MultinomialNb {
                class_log_prior,
                feature_log_prob,
                ..
            } => feature_log_prob
                .iter()
                .zip(class_log_prior)
                .map(|(row, prior)| dot(row, x) + prior)
                .collect(),
            Self::BernoulliNb {
                class_log_prior,
                feature_log_prob,
                binarize,
                ..
            } => {
                feature_log_prob
                    .iter()
                    .zip(class_log_prior)
                    .map(|(row, prior)| {
                        let mut jll = *prior;
                        for (&log_p, &value) in row.iter().zip(x) {
                            let present = match binarize {
                                Some(threshold) => f64::from(u8::from(value > *threshold)),
                                None => value,
                            };
                            let log_not_p = (-log_p.exp()).ln_1p();
                            jll += present * log_p + (1.0 - present) * log_not_p;
                        }
                        jll
                    })
                    .collect()
            }
            Self::Linear {
                coef, intercept, ..
            } => {
                let scores: Vec<f64> = coef
                    .iter()
                    .zip(intercept)
                    .map(|(row, bias)| dot(row, x) + bias)
                    .collect();
                if scores.len() == 1 {
                    // Binary linear model: positive margin means classes[1]
                    vec![0.0, scores[0]]
                } else {
                    scores
                }
            }
        }
    }
}

impl Classifier for ClassifierModel {
    fn n_features(&self) -> usize {
        match self {
            Self::MultinomialNb {
                feature_log_prob, ..
            }
            | Self::BernoulliNb {
                feature_log_prob, ..
            } => feature_log_prob.first().map_or(0, Vec::len),
            Self::Linear { coef, .. } => coef.first().map_or(0, Vec::len),
        }
    }

    fn classes(&self) -> &[i64] {
        match self {
            Self::MultinomialNb { classes, .. }
            | Self::BernoulliNb { classes, .. }
            | Self::Linear { classes, .. } => classes,
        }
    }

    fn predict(&self, features: &[f64]) -> Result<i64> {
        if features.len() != self.n_features() {
            anyhow::bail!(
                "Feature vector has {} columns but the classifier expects {}",
                features.len(),
                self.n_features()
            );
        }

        let scores = self.decision(features);

        // First class wins ties, like numpy's argmax
        let mut best = 0;
        for (i, score) in scores.iter().enumerate().skip(1) {
            if *score > scores[best] {
                best = i;
            }
        }
        Ok(self.classes()[best])
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn multinomial() -> ClassifierModel {
        ClassifierModel::MultinomialNb {
            classes: vec![0, 1],
            class_log_prior: vec![(0.8f64).ln(), (0.2f64).ln()],
            // feature 0 = "free" (spammy), feature 1 = "meet" (hammy)
            feature_log_prob: vec![
                vec![(0.1f64).ln(), (0.9f64).ln()],
                vec![(0.9f64).ln(), (0.1f64).ln()],
            ],
        }
    }

    #[test]
    fn test_multinomial_predicts_by_likelihood() {
        let model = multinomial();
        assert_eq!(model.predict(&[1.0, 0.0]).unwrap(), 1);
        assert_eq!(model.predict(&[0.0, 1.0]).unwrap(), 0);
    }

    #[test]
    fn test_multinomial_empty_vector_falls_back_to_prior() {
        let model = multinomial();
        assert_eq!(model.predict(&[0.0, 0.0]).unwrap(), 0);
    }

    #[test]
    fn test_bernoulli_uses_absent_features() {
        let model = ClassifierModel::BernoulliNb {
            classes: vec![0, 1],
            class_log_prior: vec![(0.5f64).ln(), (0.5f64).ln()],
            feature_log_prob: vec![vec![(0.1f64).ln()], vec![(0.9f64).ln()]],
            binarize: Some(0.0),
        };
        assert_eq!(model.predict(&[0.4]).unwrap(), 1);
        assert_eq!(model.predict(&[0.0]).unwrap(), 0);
    }

    #[test]
    fn test_bernoulli_without_binarize_uses_raw_values() {
        // 0.4 is not thresholded to 1.0, so it leans towards absence
        let model = ClassifierModel::BernoulliNb {
            classes: vec![0, 1],
            class_log_prior: vec![(0.5f64).ln(), (0.5f64).ln()],
            feature_log_prob: vec![vec![(0.1f64).ln()], vec![(0.9f64).ln()]],
            binarize: None,
        };
        assert_eq!(model.predict(&[0.4]).unwrap(), 0);
        assert_eq!(model.predict(&[1.0]).unwrap(), 1);
    }

    #[test]
    fn test_bernoulli_binarize_field_defaults() {
        let base = r#""kind": "bernoulli_nb", "classes": [0, 1],
            "class_log_prior": [-0.69, -0.69], "feature_log_prob": [[-2.3], [-0.1]]"#;

        let missing: ClassifierModel = serde_json::from_str(&format!("{{{base}}}")).unwrap();
        assert!(matches!(
            missing,
            ClassifierModel::BernoulliNb { binarize: Some(t), .. } if t == 0.0
        ));

        let null: ClassifierModel =
            serde_json::from_str(&format!("{{{base}, \"binarize\": null}}")).unwrap();
        assert!(matches!(
            null,
            ClassifierModel::BernoulliNb { binarize: None, .. }
        ));
    }

    #[test]
    fn test_binary_linear_margin() {
        let model = ClassifierModel::Linear {
            classes: vec![0, 1],
            coef: vec![vec![2.0, -1.0]],
            intercept: vec![-0.5],
        };
        assert_eq!(model.predict(&[1.0, 0.0]).unwrap(), 1);
        assert_eq!(model.predict(&[0.0, 1.0]).unwrap(), 0);
        // zero margin is not positive
        assert_eq!(model.predict(&[0.25, 0.0]).unwrap(), 0);
    }

    #[test]
    fn test_wrong_feature_count_is_error() {
        let model = multinomial();
        assert!(model.predict(&[1.0]).is_err());
    }

    #[test]
    fn test_validate_row_mismatch() {
        let model = ClassifierModel::MultinomialNb {
            classes: vec![0, 1],
            class_log_prior: vec![0.0, 0.0],
            feature_log_prob: vec![vec![0.0, 0.0]],
        };
        assert!(model.validate().unwrap_err().is_mismatch());
    }

    #[test]
    fn test_validate_linear_rows() {
        let model = ClassifierModel::Linear {
            classes: vec![0, 1],
            coef: vec![vec![1.0], vec![1.0]],
            intercept: vec![0.0, 0.0],
        };
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_deserialize_tagged() {
        let json = r#"{
            "kind": "linear",
            "classes": [0, 1],
            "coef": [[0.5, 0.5]],
            "intercept": [0.0]
        }"#;
        let model: ClassifierModel = serde_json::from_str(json).unwrap();
        assert_eq!(model.kind(), "linear");
        assert_eq!(model.n_features(), 2);
        assert_eq!(model.classes(), &[0, 1]);
    }
}
