use tabforge_core::error::CoreError;
use tabforge_store::StoreError;

/// Errors surfaced by pipeline stages.
///
/// Training failures are recorded in the status journal before they are
/// propagated; storage failures are fatal for the stage and not retried.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The model search failed (or panicked). Terminal for the job.
    #[error("Training failed: {0}")]
    Training(String),

    /// Artifact read/write failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Domain-level failure (bad target column, empty dataset).
    #[error(transparent)]
    Core(#[from] CoreError),
}
