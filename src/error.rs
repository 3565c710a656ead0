// Typed errors for artifact loading.
//
// Everything above the artifact layer uses anyhow; this enum exists so
// callers (and tests) can tell a missing file apart from a mismatch between
// two artifacts that were trained together.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Artifact not found: {}\nRun `sieve download` to fetch it.", .0.display())]
    Missing(PathBuf),

    #[error("Failed to read artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse artifact {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Artifact mismatch: {0}")]
    Mismatch(String),
}

impl ArtifactError {
    pub fn mismatch(message: impl Into<String>) -> Self {
        Self::Mismatch(message.into())
    }

    pub fn is_mismatch(&self) -> bool {
        matches!(self, Self::Mismatch(_))
    }
}

/// Read and deserialize a JSON artifact from disk.
pub fn read_json<T: serde::de::DeserializeOwned>(
    path: &std::path::Path,
) -> Result<T, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::Missing(path.to_path_buf()));
    }
    let bytes = std::fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
