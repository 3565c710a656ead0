// POST /api/predict — classify one message as spam or not spam.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::web::{api_error, AppState};

#[derive(Deserialize)]
pub struct PredictRequest {
    pub text: String,
}

/// POST /api/predict — `{"text": "..."}` in, the prediction out.
pub async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Response {
    let Some(pipeline) = state.spam.as_ref() else {
        return api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Spam model not loaded. Run `sieve download` first.",
        );
    };

    match pipeline.classify_detailed(&request.text) {
        Ok(prediction) => Json(prediction).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Classification failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Classification failed")
        }
    }
}
