// Artifact directory layout and presence checks.
//
// All four model artifacts live side by side in one directory:
//   vectorizer.json, model.json    spam detector
//   movies.json, similarity.json   recommender
// Files are stored in a platform-appropriate directory
// (~/.local/share/sieve/artifacts/ on Linux) unless SIEVE_ARTIFACT_DIR says otherwise.

pub mod download;

use std::path::{Path, PathBuf};

use crate::classify::pipeline::{MODEL_FILE, VECTORIZER_FILE};
use crate::recommend::{CATALOG_FILE, SIMILARITY_FILE};

/// Default name of the download manifest inside the artifact directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Returns the default directory for storing artifacts.
pub fn default_artifact_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sieve")
        .join("artifacts")
}

/// A file exists and is not empty.
pub fn file_present(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

/// Check whether both spam artifacts exist.
pub fn spam_files_present(dir: &Path) -> bool {
    file_present(&dir.join(VECTORIZER_FILE)) && file_present(&dir.join(MODEL_FILE))
}

/// Check whether both recommender artifacts exist.
pub fn recommender_files_present(dir: &Path) -> bool {
    file_present(&dir.join(CATALOG_FILE)) && file_present(&dir.join(SIMILARITY_FILE))
}

/// Every artifact file name, with whether it is present in `dir`.
pub fn inventory(dir: &Path) -> Vec<(&'static str, bool)> {
    [VECTORIZER_FILE, MODEL_FILE, CATALOG_FILE, SIMILARITY_FILE]
        .into_iter()
        .map(|name| (name, file_present(&dir.join(name))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_artifact_dir_is_under_sieve() {
        let dir = default_artifact_dir();
        let path_str = dir.to_string_lossy();
        assert!(
            path_str.contains("sieve") && path_str.contains("artifacts"),
            "Expected path containing sieve/artifacts, got: {path_str}"
        );
    }

    #[test]
    fn test_files_present_false_when_missing() {
        let dir = std::env::temp_dir().join("sieve-test-nonexistent");
        assert!(!spam_files_present(&dir));
        assert!(!recommender_files_present(&dir));
        assert!(inventory(&dir).iter().all(|(_, present)| !present));
    }

    #[test]
    fn test_empty_file_is_not_present() {
        let dir = std::env::temp_dir().join("sieve-artifacts-empty-test");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(VECTORIZER_FILE), b"").unwrap();
        std::fs::write(dir.join(MODEL_FILE), b"{}").unwrap();

        assert!(!spam_files_present(&dir));

        std::fs::write(dir.join(VECTORIZER_FILE), b"{}").unwrap();
        assert!(spam_files_present(&dir));

        // Cleanup
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
