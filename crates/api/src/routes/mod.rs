pub mod health;
pub mod jobs;

use axum::Router;

use crate::state::AppState;

/// Build the full route tree.
///
/// ```text
/// /                          health (GET)
/// /generate-token            issue a job token (GET)
/// /upload-dataset/{token}    upload + normalize a CSV (POST)
/// /start-training/{token}    persist args, enqueue pipeline (POST)
/// /check-status/{token}      status journal (GET)
/// /evaluate-model/{token}    evaluation metrics (GET)
/// /model-metadata/{token}    chosen estimator summary (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(health::router()).merge(jobs::router())
}
