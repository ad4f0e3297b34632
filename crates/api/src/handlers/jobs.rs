//! Handlers for the training-job endpoints.
//!
//! A job is addressed by its opaque token. Uploading a dataset creates
//! the job implicitly; starting training persists the arguments and hands
//! the pipeline to the worker pool; the remaining endpoints are read-only
//! queries over the job's artifacts.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};

use tabforge_core::dataset::{Dataset, Dtype, RawTable};
use tabforge_core::preprocess::normalize;
use tabforge_core::status::{JobState, StatusEvent, MSG_DATASET_UPLOADED};
use tabforge_core::training::{ModelMetadata, Task, TrainingArgs};
use tabforge_core::token;
use tabforge_store::{read_bin, read_json, write_bin, ArtifactKind};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Token issuance
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// GET /generate-token
///
/// Issue a fresh job token. Pure random draw; nothing is persisted.
pub async fn generate_token() -> impl IntoResponse {
    Json(DataResponse {
        data: TokenResponse {
            token: token::generate(),
        },
    })
}

// ---------------------------------------------------------------------------
// Dataset upload
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub dtype: Dtype,
}

#[derive(Serialize)]
pub struct UploadSummary {
    pub rows: usize,
    pub columns: Vec<ColumnSummary>,
}

/// POST /upload-dataset/{token}
///
/// Accept a multipart request with a `csv` file part, normalize it, and
/// persist it as the job's dataset artifact. Rejects anything that is not
/// CSV with 400 before touching storage.
pub async fn upload_dataset(
    State(state): State<AppState>,
    Path(token): Path<String>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut payload: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("csv") {
            continue;
        }

        let content_type_ok = field.content_type() == Some("text/csv");
        let extension_ok = field
            .file_name()
            .is_some_and(|name| name.ends_with(".csv"));
        if !content_type_ok && !extension_ok {
            return Err(AppError::BadRequest("Invalid file type".into()));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;
        payload = Some(bytes.to_vec());
        break;
    }

    let payload =
        payload.ok_or_else(|| AppError::BadRequest("Missing 'csv' file field".into()))?;

    let table = RawTable::from_csv(&payload)?;
    let dataset = normalize(table);

    write_bin(state.store.as_ref(), ArtifactKind::Dataset, &token, &dataset).await?;
    state
        .journal
        .append(
            &token,
            StatusEvent::ok(MSG_DATASET_UPLOADED),
            Some(JobState::Created),
        )
        .await?;

    tracing::info!(
        token,
        rows = dataset.rows(),
        columns = dataset.columns.len(),
        "Dataset uploaded",
    );

    let summary = UploadSummary {
        rows: dataset.rows(),
        columns: dataset
            .columns
            .iter()
            .map(|(name, column)| ColumnSummary {
                name: name.clone(),
                dtype: column.dtype(),
            })
            .collect(),
    };
    Ok(Json(DataResponse { data: summary }))
}

// ---------------------------------------------------------------------------
// Training start
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct StartTrainingForm {
    pub target: String,
    pub task: Task,
    pub iterations: u32,
}

/// POST /start-training/{token}
///
/// Validate the arguments against the uploaded dataset, persist them, and
/// enqueue the pipeline. Returns 202 immediately; progress is observable
/// through `/check-status/{token}`. A saturated worker pool maps to 503.
pub async fn start_training(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Form(form): Form<StartTrainingForm>,
) -> AppResult<impl IntoResponse> {
    let dataset: Dataset =
        read_bin(state.store.as_ref(), ArtifactKind::Dataset, &token).await?;

    let args = TrainingArgs {
        token: token.clone(),
        target: form.target,
        task: form.task,
        iterations: form.iterations,
    };
    args.validate(&dataset)?;

    state.orchestrator.save_args(&args).await?;
    state.queue.submit(args)?;

    tracing::info!(token, "Training job enqueued");
    Ok(StatusCode::ACCEPTED)
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// GET /check-status/{token}
///
/// The job's explicit state plus its full ordered event sequence, or 404
/// when the token has no journal (job never created).
pub async fn check_status(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<impl IntoResponse> {
    let record = state.journal.read(&token).await?;
    Ok(Json(DataResponse { data: record }))
}

/// GET /evaluate-model/{token}
///
/// The held-out metric map, or 404 while evaluation has not been written.
pub async fn evaluate_model(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<impl IntoResponse> {
    let results: std::collections::BTreeMap<String, f64> =
        read_json(state.store.as_ref(), ArtifactKind::Evaluation, &token).await?;
    Ok(Json(DataResponse { data: results }))
}

/// GET /model-metadata/{token}
///
/// The chosen estimator summary, or 404 while it has not been written.
pub async fn model_metadata(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<impl IntoResponse> {
    let metadata: ModelMetadata =
        read_json(state.store.as_ref(), ArtifactKind::Metadata, &token).await?;
    Ok(Json(DataResponse { data: metadata }))
}
