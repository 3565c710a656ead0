// Title recommendation — resolve a query against the catalog, then rank the
// matched entry's row of the precomputed similarity matrix.

pub mod catalog;
pub mod fuzzy;
pub mod ranking;
pub mod resolver;

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::error::ArtifactError;
use catalog::{Catalog, CatalogEntry, SimilarityMatrix};
use ranking::Recommendation;
use resolver::{MatchTier, ResolverConfig};

/// File names of the recommender artifacts inside the artifact directory.
pub const CATALOG_FILE: &str = "movies.json";
pub const SIMILARITY_FILE: &str = "similarity.json";

/// Recommendations for one query, plus the entry the query resolved to.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationSet {
    pub matched: CatalogEntry,
    #[serde(flatten)]
    pub tier: MatchTier,
    pub recommendations: Vec<Recommendation>,
}

/// Read-only handle over the catalog, its similarity matrix and resolver
/// settings.
pub struct Recommender {
    catalog: Catalog,
    matrix: SimilarityMatrix,
    resolver: ResolverConfig,
}

impl Recommender {
    /// Pair a catalog with its matrix; they must have the same number of rows.
    pub fn new(
        catalog: Catalog,
        matrix: SimilarityMatrix,
        resolver: ResolverConfig,
    ) -> Result<Self, ArtifactError> {
        if catalog.len() != matrix.size() {
            return Err(ArtifactError::mismatch(format!(
                "catalog has {} titles but the similarity matrix is {}x{}",
                catalog.len(),
                matrix.size(),
                matrix.size()
            )));
        }
        Ok(Self {
            catalog,
            matrix,
            resolver,
        })
    }

    /// Load `movies.json` and `similarity.json` from the artifact directory.
    pub fn load(dir: &Path, resolver: ResolverConfig) -> Result<Self> {
        let catalog =
            Catalog::load(&dir.join(CATALOG_FILE)).context("Failed to load title catalog")?;
        let matrix = SimilarityMatrix::load(&dir.join(SIMILARITY_FILE))
            .context("Failed to load similarity matrix")?;

        info!(titles = catalog.len(), "Loaded recommender artifacts");

        Ok(Self::new(catalog, matrix, resolver)?)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Resolve a free-text title to a catalog entry.
    pub fn resolve(&self, query: &str) -> Option<&CatalogEntry> {
        resolver::resolve(query, &self.catalog, &self.resolver)
    }

    /// Resolve `query` and rank its neighbours. `None` means no title matched.
    pub fn recommend(&self, query: &str, top_n: usize) -> Option<RecommendationSet> {
        let resolution = resolver::resolve_detailed(query, &self.catalog, &self.resolver)?;
        let recommendations =
            ranking::recommend(resolution.entry, &self.catalog, &self.matrix, top_n);

        Some(RecommendationSet {
            matched: resolution.entry.clone(),
            tier: resolution.tier,
            recommendations,
        })
    }
}
