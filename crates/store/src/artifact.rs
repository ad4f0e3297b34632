//! The artifact-store contract and typed read/write helpers.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Kinds of per-job artifacts. Each `(token, kind)` pair maps to exactly
/// one storage location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Normalized dataset, bincode-encoded columnar data.
    Dataset,
    /// Serialized trained model, opaque binary blob.
    Model,
    /// Evaluation result, JSON metric map.
    Evaluation,
    /// Training arguments, JSON record.
    TrainingArgs,
    /// Status journal, JSON record (state + ordered events).
    Status,
    /// Model metadata, JSON record.
    Metadata,
}

impl ArtifactKind {
    /// Filename suffix for the filesystem backend; also used as a stable
    /// human-readable name in errors and logs.
    pub fn suffix(&self) -> &'static str {
        match self {
            ArtifactKind::Dataset => "dataset.bin",
            ArtifactKind::Model => "model.bin",
            ArtifactKind::Evaluation => "evaluation.json",
            ArtifactKind::TrainingArgs => "training_args.json",
            ArtifactKind::Status => "status.json",
            ArtifactKind::Metadata => "metadata.json",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Storage-layer errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The artifact does not exist. Distinct from an empty artifact.
    #[error("Artifact {kind} not found for token {token}")]
    NotFound { kind: ArtifactKind, token: String },

    /// Underlying I/O failure. Fatal for the stage that hit it; not
    /// retried automatically.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The artifact exists but cannot be decoded.
    #[error("Corrupt artifact: {0}")]
    Corrupt(String),
}

/// Typed artifact storage keyed by `(token, kind)`.
///
/// Writes fully replace prior content; the status journal's append-only
/// behaviour is layered on top by [`crate::journal::StatusJournal`].
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Read the full artifact, or `NotFound` if it was never written.
    async fn read(&self, kind: ArtifactKind, token: &str) -> Result<Vec<u8>, StoreError>;

    /// Write the full artifact, replacing any prior content.
    async fn write(&self, kind: ArtifactKind, token: &str, data: &[u8]) -> Result<(), StoreError>;

    /// Whether the artifact has been written.
    async fn exists(&self, kind: ArtifactKind, token: &str) -> bool;

    /// Human-readable storage location, for logs and diagnostics.
    fn location(&self, kind: ArtifactKind, token: &str) -> String;
}

// ---------------------------------------------------------------------------
// Typed helpers
// ---------------------------------------------------------------------------

/// Read and decode a JSON artifact.
pub async fn read_json<T: DeserializeOwned>(
    store: &dyn ArtifactStore,
    kind: ArtifactKind,
    token: &str,
) -> Result<T, StoreError> {
    let bytes = store.read(kind, token).await?;
    serde_json::from_slice(&bytes)
        .map_err(|e| StoreError::Corrupt(format!("{kind} for token {token}: {e}")))
}

/// Encode and write a JSON artifact.
pub async fn write_json<T: Serialize>(
    store: &dyn ArtifactStore,
    kind: ArtifactKind,
    token: &str,
    value: &T,
) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec(value)
        .map_err(|e| StoreError::Corrupt(format!("{kind} for token {token}: {e}")))?;
    store.write(kind, token, &bytes).await
}

/// Read and decode a bincode artifact (dataset, model blob).
pub async fn read_bin<T: DeserializeOwned>(
    store: &dyn ArtifactStore,
    kind: ArtifactKind,
    token: &str,
) -> Result<T, StoreError> {
    let bytes = store.read(kind, token).await?;
    bincode::deserialize(&bytes)
        .map_err(|e| StoreError::Corrupt(format!("{kind} for token {token}: {e}")))
}

/// Encode and write a bincode artifact.
pub async fn write_bin<T: Serialize>(
    store: &dyn ArtifactStore,
    kind: ArtifactKind,
    token: &str,
    value: &T,
) -> Result<(), StoreError> {
    let bytes = bincode::serialize(value)
        .map_err(|e| StoreError::Corrupt(format!("{kind} for token {token}: {e}")))?;
    store.write(kind, token, &bytes).await
}
