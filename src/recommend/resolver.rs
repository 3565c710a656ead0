// Match resolver — free-text title query to exactly one catalog entry.
//
// Tiers run in strict order and the first tier with any hit wins:
//   1. exact (case-insensitive, trimmed)
//   2. substring (case-insensitive unless configured otherwise)
//   3. fuzzy ratio >= cutoff, best ratio wins
// A fuzzy candidate never overrides an exact or substring hit, even when its
// ratio against some other title would be higher. Ties inside a tier go to
// the earlier catalog row.

use serde::Serialize;
use tracing::debug;

use super::catalog::{Catalog, CatalogEntry};
use super::fuzzy;

/// Minimum fuzzy ratio accepted by default.
pub const DEFAULT_FUZZY_CUTOFF: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolverConfig {
    pub fuzzy_cutoff: f64,
    pub substring_case_sensitive: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            fuzzy_cutoff: DEFAULT_FUZZY_CUTOFF,
            substring_case_sensitive: false,
        }
    }
}

/// Which tier produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "tier", rename_all = "snake_case")]
pub enum MatchTier {
    Exact,
    Substring,
    Fuzzy { ratio: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution<'a> {
    pub entry: &'a CatalogEntry,
    #[serde(flatten)]
    pub tier: MatchTier,
}

/// Resolve `query` to a catalog entry, or `None` when no tier matches.
pub fn resolve<'a>(
    query: &str,
    catalog: &'a Catalog,
    config: &ResolverConfig,
) -> Option<&'a CatalogEntry> {
    resolve_detailed(query, catalog, config).map(|r| r.entry)
}

/// Like `resolve`, but also reports which tier matched.
pub fn resolve_detailed<'a>(
    query: &str,
    catalog: &'a Catalog,
    config: &ResolverConfig,
) -> Option<Resolution<'a>> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }

    let resolution = exact(query, catalog)
        .map(|entry| Resolution {
            entry,
            tier: MatchTier::Exact,
        })
        .or_else(|| {
            substring(query, catalog, config.substring_case_sensitive).map(|entry| Resolution {
                entry,
                tier: MatchTier::Substring,
            })
        })
        .or_else(|| {
            fuzzy_best(query, catalog, config.fuzzy_cutoff).map(|(entry, ratio)| Resolution {
                entry,
                tier: MatchTier::Fuzzy { ratio },
            })
        });

    match &resolution {
        Some(r) => debug!(query, title = %r.entry.title, tier = ?r.tier, "Resolved title"),
        None => debug!(query, "No catalog match"),
    }
    resolution
}

fn exact<'a>(query: &str, catalog: &'a Catalog) -> Option<&'a CatalogEntry> {
    let needle = query.to_lowercase();
    catalog
        .entries()
        .iter()
        .find(|e| catalog.lowered(e.index) == needle)
}

fn substring<'a>(
    query: &str,
    catalog: &'a Catalog,
    case_sensitive: bool,
) -> Option<&'a CatalogEntry> {
    if case_sensitive {
        catalog.entries().iter().find(|e| e.title.contains(query))
    } else {
        let needle = query.to_lowercase();
        catalog
            .entries()
            .iter()
            .find(|e| catalog.lowered(e.index).contains(&needle))
    }
}

/// Best fuzzy candidate at or above `cutoff`. Titles are compared as written.
fn fuzzy_best<'a>(
    query: &str,
    catalog: &'a Catalog,
    cutoff: f64,
) -> Option<(&'a CatalogEntry, f64)> {
    let query: Vec<char> = query.chars().collect();
    let mut best: Option<(&CatalogEntry, f64)> = None;

    for entry in catalog.entries() {
        let title: Vec<char> = entry.title.chars().collect();

        // Skip titles whose length alone rules them out
        let upper = fuzzy::ratio_upper_bound(title.len(), query.len());
        if upper < cutoff || best.is_some_and(|(_, r)| upper <= r) {
            continue;
        }

        let ratio = fuzzy::ratio_chars(&title, &query);
        if ratio >= cutoff && best.map_or(true, |(_, r)| ratio > r) {
            best = Some((entry, ratio));
        }
    }

    best
}
