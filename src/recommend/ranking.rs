// Ranking engine — top-N most similar catalog entries from a matrix row.

use std::cmp::Ordering;

use serde::Serialize;
use tracing::warn;

use super::catalog::{Catalog, CatalogEntry, SimilarityMatrix};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub index: usize,
    pub title: String,
    pub score: f32,
}

/// Clamp a requested count to [1, catalog_size - 1]. Zero when nothing can
/// be recommended (catalog of one entry or fewer).
pub fn clamp_top_n(top_n: usize, catalog_size: usize) -> usize {
    if catalog_size <= 1 {
        return 0;
    }
    top_n.clamp(1, catalog_size - 1)
}

/// Rank one similarity row, excluding `self_index`.
///
/// Scores sort descending with ties broken by ascending index (the sort is
/// stable over an index-ordered row). NaN scores sort last.
pub fn rank_row(row: &[f32], self_index: usize, top_n: usize) -> Vec<(usize, f32)> {
    let take = clamp_top_n(top_n, row.len());
    if take == 0 {
        return Vec::new();
    }

    let mut scored: Vec<(usize, f32)> = row.iter().copied().enumerate().collect();
    scored.sort_by(|a, b| descending(a.1, b.1));

    // Self-similarity is expected to be maximal, so self normally leads.
    if scored.first().map(|(i, _)| *i) != Some(self_index) {
        warn!(
            index = self_index,
            "Entry is not its own nearest neighbour; similarity matrix may be malformed"
        );
    }

    scored
        .into_iter()
        .filter(|(i, _)| *i != self_index)
        .take(take)
        .collect()
}

fn descending(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Recommend up to `top_n` entries similar to `entry`.
///
/// Returns an empty list if the entry has no row in the matrix.
pub fn recommend(
    entry: &CatalogEntry,
    catalog: &Catalog,
    matrix: &SimilarityMatrix,
    top_n: usize,
) -> Vec<Recommendation> {
    let Some(row) = matrix.row(entry.index) else {
        warn!(index = entry.index, "No similarity row for catalog entry");
        return Vec::new();
    };

    rank_row(row, entry.index, top_n)
        .into_iter()
        .filter_map(|(index, score)| {
            catalog.get(index).map(|other| Recommendation {
                index,
                title: other.title.clone(),
                score,
            })
        })
        .collect()
}
