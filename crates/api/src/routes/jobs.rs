//! Route definitions for the training-job endpoints.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::jobs;
use crate::state::AppState;

/// Routes for the job lifecycle, mounted at the root.
///
/// ```text
/// GET  /generate-token          -> generate_token
/// POST /upload-dataset/{token}  -> upload_dataset
/// POST /start-training/{token}  -> start_training
/// GET  /check-status/{token}    -> check_status
/// GET  /evaluate-model/{token}  -> evaluate_model
/// GET  /model-metadata/{token}  -> model_metadata
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate-token", get(jobs::generate_token))
        .route("/upload-dataset/{token}", post(jobs::upload_dataset))
        .route("/start-training/{token}", post(jobs::start_training))
        .route("/check-status/{token}", get(jobs::check_status))
        .route("/evaluate-model/{token}", get(jobs::evaluate_model))
        .route("/model-metadata/{token}", get(jobs::model_metadata))
}
