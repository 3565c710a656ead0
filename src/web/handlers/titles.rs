// GET /api/titles — catalog titles, optionally filtered by ?search=.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::web::{api_error, AppState};

#[derive(Deserialize, Default)]
pub struct TitlesQuery {
    /// Case-insensitive substring filter
    pub search: Option<String>,
    /// Max titles returned (default 100, max 1000)
    pub limit: Option<usize>,
}

/// GET /api/titles — list catalog titles in catalog order.
pub async fn list_titles(
    State(state): State<AppState>,
    Query(params): Query<TitlesQuery>,
) -> Response {
    let Some(recommender) = state.recommender.as_ref() else {
        return api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Recommender not loaded. Run `sieve download` first.",
        );
    };

    let limit = params.limit.unwrap_or(100).min(1000);
    let catalog = recommender.catalog();
    let titles = catalog.search(params.search.as_deref().unwrap_or(""), limit);

    Json(serde_json::json!({
        "total": catalog.len(),
        "titles": titles,
    }))
    .into_response()
}
