//! Append-only status journal, one record per token.
//!
//! The journal artifact is a single JSON record holding the explicit job
//! state and the ordered event list. Appending is a read-modify-write of
//! the whole record, so appends for the same token are serialized through
//! a per-token async lock; without it two concurrent writers could each
//! read the same snapshot and one update would be lost.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tabforge_core::status::{JobState, JournalRecord, StatusEvent};

use crate::artifact::{read_json, write_json, ArtifactKind, ArtifactStore, StoreError};

/// Per-token serialized view over the `Status` artifact.
pub struct StatusJournal {
    store: Arc<dyn ArtifactStore>,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl StatusJournal {
    pub fn new(store: Arc<dyn ArtifactStore>) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// The async lock guarding appends for one token. The registry grows
    /// by one entry per token seen; entries are never reclaimed, which is
    /// acceptable for the small per-entry footprint.
    fn lock_for(&self, token: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().expect("journal lock registry poisoned");
        locks
            .entry(token.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Append one event, optionally advancing the job state in the same
    /// write. Creates the journal on first append.
    pub async fn append(
        &self,
        token: &str,
        event: StatusEvent,
        state: Option<JobState>,
    ) -> Result<(), StoreError> {
        let lock = self.lock_for(token);
        let _guard = lock.lock().await;

        let mut record =
            match read_json::<JournalRecord>(self.store.as_ref(), ArtifactKind::Status, token)
                .await
            {
                Ok(record) => record,
                Err(StoreError::NotFound { .. }) => JournalRecord::new(),
                Err(e) => return Err(e),
            };

        tracing::debug!(token, message = %event.message, flag = %event.flag, "Status appended");

        record.events.push(event);
        if let Some(state) = state {
            record.state = state;
        }

        write_json(self.store.as_ref(), ArtifactKind::Status, token, &record).await
    }

    /// The full journal record, or `NotFound` when no journal exists yet.
    /// "No job" is distinct from "job with zero events".
    pub async fn read(&self, token: &str) -> Result<JournalRecord, StoreError> {
        read_json(self.store.as_ref(), ArtifactKind::Status, token).await
    }
}
