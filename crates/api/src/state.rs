use std::sync::Arc;

use tabforge_pipeline::{JobQueue, Orchestrator};
use tabforge_store::{ArtifactStore, StatusJournal};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// Cheaply cloneable; all inner data is behind `Arc` or is already
/// `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Typed artifact storage, keyed by (token, kind).
    pub store: Arc<dyn ArtifactStore>,
    /// Per-token serialized status journal.
    pub journal: Arc<StatusJournal>,
    /// Pipeline driver; handlers call it for the synchronous args stage.
    pub orchestrator: Arc<Orchestrator>,
    /// Handle for submitting jobs to the worker pool.
    pub queue: JobQueue,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
