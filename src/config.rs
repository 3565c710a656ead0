use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::classify::pipeline::LabelMap;
use crate::recommend::resolver::{ResolverConfig, DEFAULT_FUZZY_CUTOFF};
use crate::text::stopwords::StopwordSource;

/// Central configuration loaded from environment variables.
///
/// Secrets come from env vars (never hardcoded). The .env file
/// is loaded automatically at startup via dotenvy.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding vectorizer.json, model.json, movies.json, similarity.json
    pub artifact_dir: PathBuf,
    /// Download manifest (file name -> Google Drive id)
    pub manifest_path: PathBuf,
    pub stopwords: StopwordSource,
    /// Which classifier class ids mean spam / not spam
    pub labels: LabelMap,
    pub resolver: ResolverConfig,
    /// OMDb API key. Empty disables poster lookups.
    pub omdb_api_key: String,
    pub omdb_api_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every variable has a default. Malformed values are errors.
    pub fn load() -> Result<Self> {
        let artifact_dir = env::var("SIEVE_ARTIFACT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| crate::artifacts::default_artifact_dir());

        let manifest_path = env::var("SIEVE_ARTIFACT_MANIFEST")
            .map(PathBuf::from)
            .unwrap_or_else(|_| artifact_dir.join(crate::artifacts::MANIFEST_FILE));

        let stopwords = match env::var("SIEVE_STOPWORDS") {
            Ok(value) => StopwordSource::parse(&value).with_context(|| {
                format!("SIEVE_STOPWORDS must be \"builtin\" or \"extended\", got {value:?}")
            })?,
            Err(_) => StopwordSource::Builtin,
        };

        let defaults = LabelMap::default();
        let labels = LabelMap {
            spam: parse_var("SIEVE_SPAM_CLASS", defaults.spam)?,
            not_spam: parse_var("SIEVE_NOT_SPAM_CLASS", defaults.not_spam)?,
        };

        let fuzzy_cutoff: f64 = parse_var("SIEVE_FUZZY_CUTOFF", DEFAULT_FUZZY_CUTOFF)?;
        if !(0.0..=1.0).contains(&fuzzy_cutoff) {
            anyhow::bail!("SIEVE_FUZZY_CUTOFF must be between 0.0 and 1.0, got {fuzzy_cutoff}");
        }
        let resolver = ResolverConfig {
            fuzzy_cutoff,
            substring_case_sensitive: parse_var("SIEVE_SUBSTRING_CASE_SENSITIVE", false)?,
        };

        Ok(Self {
            artifact_dir,
            manifest_path,
            stopwords,
            labels,
            resolver,
            omdb_api_key: env::var("OMDB_API_KEY").unwrap_or_default(),
            omdb_api_url: env::var("OMDB_API_URL")
                .unwrap_or_else(|_| crate::posters::omdb::DEFAULT_OMDB_URL.to_string()),
        })
    }

    /// Whether poster lookups can be made.
    pub fn posters_enabled(&self) -> bool {
        !self.omdb_api_key.is_empty()
    }

    /// Check that the spam artifacts exist.
    /// Call this before building a SpamPipeline.
    pub fn require_spam_artifacts(&self) -> Result<()> {
        if !crate::artifacts::spam_files_present(&self.artifact_dir) {
            anyhow::bail!(
                "Spam model artifacts not found in {}\n\
                 Run `sieve download` to fetch them, or set SIEVE_ARTIFACT_DIR.",
                self.artifact_dir.display()
            );
        }
        Ok(())
    }

    /// Check that the recommender artifacts exist.
    /// Call this before building a Recommender.
    pub fn require_recommender_artifacts(&self) -> Result<()> {
        if !crate::artifacts::recommender_files_present(&self.artifact_dir) {
            anyhow::bail!(
                "Recommender artifacts not found in {}\n\
                 Run `sieve download` to fetch them, or set SIEVE_ARTIFACT_DIR.",
                self.artifact_dir.display()
            );
        }
        Ok(())
    }
}

/// Parse an optional env var, using `default` when it is unset or blank.
fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid value for {name}: {value:?} ({e})")),
        _ => Ok(default),
    }
}
