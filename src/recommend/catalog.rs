// Title catalog and precomputed similarity matrix.
//
// Both are loaded once from the artifact directory and never mutated. Row i
// of the matrix belongs to catalog entry i; Recommender::new checks that the
// two line up before anything is served.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{read_json, ArtifactError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    /// Row position in the catalog and the similarity matrix
    pub index: usize,
    pub title: String,
}

/// Titles may have been exported as numbers (e.g. "1917"); both become strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTitle {
    Text(String),
    Number(serde_json::Number),
}

#[derive(Deserialize)]
struct CatalogRecord {
    title: RawTitle,
}

/// An ordered, read-only list of titles.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    /// Lowercased titles, precomputed for the exact and substring tiers
    lowered: Vec<String>,
}

impl Catalog {
    pub fn new<S: Into<String>>(titles: impl IntoIterator<Item = S>) -> Self {
        let entries: Vec<CatalogEntry> = titles
            .into_iter()
            .enumerate()
            .map(|(index, title)| CatalogEntry {
                index,
                title: title.into(),
            })
            .collect();
        let lowered = entries.iter().map(|e| e.title.to_lowercase()).collect();
        Self { entries, lowered }
    }

    /// Load a catalog from a JSON array of records with a `title` field.
    /// Other fields are ignored.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let records: Vec<CatalogRecord> = read_json(path)?;
        let titles = records.into_iter().map(|r| match r.title {
            RawTitle::Text(s) => s,
            RawTitle::Number(n) => n.to_string(),
        });
        let catalog = Self::new(titles);
        debug!(path = %path.display(), entries = catalog.len(), "Loaded catalog");
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Lowercased title of the entry at `index`.
    pub(crate) fn lowered(&self, index: usize) -> &str {
        &self.lowered[index]
    }

    /// Titles containing `query` (case-insensitive), in catalog order.
    /// An empty query lists the catalog from the top.
    pub fn search(&self, query: &str, limit: usize) -> Vec<&CatalogEntry> {
        let needle = query.trim().to_lowercase();
        self.entries
            .iter()
            .zip(&self.lowered)
            .filter(|(_, lower)| lower.contains(&needle))
            .map(|(entry, _)| entry)
            .take(limit)
            .collect()
    }
}

/// Square matrix of pairwise similarity scores, stored row-major.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    size: usize,
    data: Vec<f32>,
}

impl SimilarityMatrix {
    /// Build from nested rows. Fails unless every row has `rows.len()` columns.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self, ArtifactError> {
        let size = rows.len();
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != size) {
            return Err(ArtifactError::mismatch(format!(
                "similarity matrix is not square: row {i} has {} columns, expected {size}",
                row.len()
            )));
        }
        Ok(Self {
            size,
            data: rows.into_iter().flatten().collect(),
        })
    }

    /// Load a matrix stored as a JSON array of rows.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let rows: Vec<Vec<f32>> = read_json(path)?;
        let matrix = Self::from_rows(rows)?;
        debug!(path = %path.display(), size = matrix.size, "Loaded similarity matrix");
        Ok(matrix)
    }

    /// Number of rows (and columns).
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        if index >= self.size {
            return None;
        }
        let start = index * self.size;
        Some(&self.data[start..start + self.size])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_indexes_in_order() {
        let catalog = Catalog::new(["Avatar", "Up", "Heat"]);
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get(1).unwrap().title, "Up");
        assert_eq!(catalog.get(2).unwrap().index, 2);
        assert!(catalog.get(3).is_none());
    }

    #[test]
    fn test_search_is_case_insensitive_and_limited() {
        let catalog = Catalog::new(["The Dark Knight", "Dark City", "Up", "Darkman"]);
        let hits: Vec<&str> = catalog
            .search("DARK", 2)
            .into_iter()
            .map(|e| e.title.as_str())
            .collect();
        assert_eq!(hits, vec!["The Dark Knight", "Dark City"]);
    }

    #[test]
    fn test_numeric_titles_become_strings() {
        let records: Vec<CatalogRecord> =
            serde_json::from_str(r#"[{"title": 1917, "id": 5}, {"title": "Up"}]"#).unwrap();
        let titles: Vec<String> = records
            .into_iter()
            .map(|r| match r.title {
                RawTitle::Text(s) => s,
                RawTitle::Number(n) => n.to_string(),
            })
            .collect();
        assert_eq!(titles, vec!["1917", "Up"]);
    }

    #[test]
    fn test_matrix_rows() {
        let m = SimilarityMatrix::from_rows(vec![vec![1.0, 0.5], vec![0.5, 1.0]]).unwrap();
        assert_eq!(m.size(), 2);
        assert_eq!(m.row(1), Some(&[0.5, 1.0][..]));
        assert!(m.row(2).is_none());
    }

    #[test]
    fn test_non_square_matrix_rejected() {
        let err = SimilarityMatrix::from_rows(vec![vec![1.0, 0.5], vec![0.5]]).unwrap_err();
        assert!(err.is_mismatch());
    }
}
