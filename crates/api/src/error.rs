use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tabforge_core::error::CoreError;
use tabforge_pipeline::{PipelineError, QueueFull};
use tabforge_store::StoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain, storage, and pipeline error types and adds
/// HTTP-specific variants. Implements [`IntoResponse`] to produce
/// consistent JSON error responses; not-found responses carry the job
/// token for diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `tabforge_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A storage-layer error from `tabforge_store`.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A pipeline-stage error from `tabforge_pipeline`.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The worker pool's queue is saturated.
    #[error("Job queue is full")]
    QueueFull,

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<QueueFull> for AppError {
    fn from(_: QueueFull) -> Self {
        AppError::QueueFull
    }
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, token) = classify(&self);

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(token) = token {
            body["token"] = json!(token);
        }

        (status, axum::Json(body)).into_response()
    }
}

/// Classify an error into an HTTP status, error code, message, and the
/// token it concerns (when known).
fn classify(err: &AppError) -> (StatusCode, &'static str, String, Option<String>) {
    match err {
        AppError::Core(core) => classify_core(core),

        AppError::Store(store) => classify_store(store),

        // Pipeline errors on the request path are argument-save failures;
        // training failures are journaled in the background, never mapped
        // to a response.
        AppError::Pipeline(PipelineError::Store(store)) => classify_store(store),
        AppError::Pipeline(PipelineError::Core(core)) => classify_core(core),
        AppError::Pipeline(PipelineError::Training(msg)) => {
            tracing::error!(error = %msg, "Training error on request path");
            internal()
        }

        AppError::BadRequest(msg) => {
            (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None)
        }

        AppError::QueueFull => (
            StatusCode::SERVICE_UNAVAILABLE,
            "SERVICE_BUSY",
            "Job queue is full; retry later".to_string(),
            None,
        ),

        AppError::InternalError(msg) => {
            tracing::error!(error = %msg, "Internal error");
            internal()
        }
    }
}

fn classify_core(err: &CoreError) -> (StatusCode, &'static str, String, Option<String>) {
    match err {
        CoreError::Validation(msg) => (
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            msg.clone(),
            None,
        ),
        CoreError::Parse(msg) => (StatusCode::BAD_REQUEST, "PARSE_ERROR", msg.clone(), None),
    }
}

fn classify_store(err: &StoreError) -> (StatusCode, &'static str, String, Option<String>) {
    match err {
        StoreError::NotFound { kind, token } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("Artifact {kind} not found"),
            Some(token.clone()),
        ),
        other => {
            tracing::error!(error = %other, "Storage error");
            internal()
        }
    }
}

fn internal() -> (StatusCode, &'static str, String, Option<String>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
        None,
    )
}
