// Web server — Axum JSON API over the two demos.
//
// Both pipelines are loaded once at startup and shared read-only through
// AppState; handlers never mutate them, so no locking is needed. A demo
// whose artifacts are absent answers 503; artifacts that disagree with each
// other stop the server from starting at all.

use std::sync::Arc;

use anyhow::Result;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::classify::pipeline::SpamPipeline;
use crate::posters::traits::PosterLookup;
use crate::recommend::Recommender;

pub mod handlers;

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub spam: Option<Arc<SpamPipeline>>,
    pub recommender: Option<Arc<Recommender>>,
    pub posters: Arc<dyn PosterLookup>,
}

/// Start the Axum web server and block until it exits.
pub async fn run_server(state: AppState, port: u16, bind: &str) -> Result<()> {
    if state.spam.is_none() && state.recommender.is_none() {
        anyhow::bail!("Neither demo has its artifacts; run `sieve download` first");
    }

    let app = build_router(state);

    let addr = format!("{bind}:{port}");
    info!("Sieve API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/predict", post(handlers::predict::predict))
        .route("/api/recommend", get(handlers::recommend::recommend))
        .route("/api/titles", get(handlers::titles::list_titles))
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check — always returns 200 OK.
async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        axum::Json(serde_json::json!({ "status": "ok" })),
    )
}

pub fn api_error(status: StatusCode, message: &str) -> Response {
    (status, axum::Json(serde_json::json!({ "error": message }))).into_response()
}
