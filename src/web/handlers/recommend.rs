// GET /api/recommend — titles similar to a free-text title query.
//
// ?title=  the query (exact, partial or misspelled)
// ?count=  how many recommendations (default 5, clamped to the catalog)
// ?posters=true  also look up poster URLs; lookups that fail are omitted

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::posters::{attach_posters, PosterCard};
use crate::recommend::catalog::CatalogEntry;
use crate::recommend::resolver::MatchTier;
use crate::web::{api_error, AppState};

#[derive(Deserialize)]
pub struct RecommendQuery {
    pub title: Option<String>,
    pub count: Option<usize>,
    #[serde(default)]
    pub posters: bool,
}

/// Same shape as RecommendationSet, with poster URLs on each item.
#[derive(Serialize)]
struct PosterResponse {
    matched: CatalogEntry,
    #[serde(flatten)]
    tier: MatchTier,
    recommendations: Vec<PosterCard>,
}

/// GET /api/recommend — resolve the title, then rank its neighbours.
pub async fn recommend(
    State(state): State<AppState>,
    Query(params): Query<RecommendQuery>,
) -> Response {
    let Some(recommender) = state.recommender.as_ref() else {
        return api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Recommender not loaded. Run `sieve download` first.",
        );
    };

    let Some(title) = params.title.as_deref() else {
        return api_error(StatusCode::BAD_REQUEST, "Missing required parameter: title");
    };

    let count = params.count.unwrap_or(5);
    let Some(set) = recommender.recommend(title, count) else {
        return api_error(
            StatusCode::NOT_FOUND,
            "No match found. Try a different spelling.",
        );
    };

    if !params.posters {
        return Json(set).into_response();
    }

    let recommendations = attach_posters(state.posters.as_ref(), set.recommendations).await;
    Json(PosterResponse {
        matched: set.matched,
        tier: set.tier,
        recommendations,
    })
    .into_response()
}
