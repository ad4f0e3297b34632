//! Job lifecycle types: status events, journal records, and the explicit
//! job state machine.
//!
//! A job's state is stored as an explicit enum alongside its event log so
//! readers never have to infer progress from free-text messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Stage messages and flags
// ---------------------------------------------------------------------------

pub const MSG_DATASET_UPLOADED: &str = "Dataset uploaded successfully";
pub const MSG_ARGS_SAVED: &str = "Training arguments saved successfully";
pub const MSG_DATASET_IMPORTED: &str = "Dataset imported";
pub const MSG_MODEL_TRAINED: &str = "Model trained successfully";
pub const MSG_TRAINING_FAILED: &str = "Training failed";
pub const MSG_EVALUATION_DONE: &str = "Evaluation done successfully";
pub const MSG_METADATA_SAVED: &str = "Model metadata saved";
pub const MSG_MODEL_SAVED: &str = "Model saved successfully";

/// Flag carried by ordinary progress events.
pub const FLAG_OK: &str = "ok";

/// Flag carried by the terminal event of a failed pipeline.
pub const FLAG_ERROR: &str = "error";

// ---------------------------------------------------------------------------
// Job state
// ---------------------------------------------------------------------------

/// Explicit job state, advanced by the pipeline as stages complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Dataset uploaded, no training arguments yet.
    Created,
    /// Training arguments persisted; job queued or about to be.
    ArgsSaved,
    /// Pipeline is running (dataset import through model search).
    Training,
    /// Training failed; terminal.
    Failed,
    /// Held-out evaluation written; model persistence still pending.
    Evaluated,
    /// Model artifact persisted; terminal.
    Completed,
}

impl JobState {
    /// Whether the job can make no further progress.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Failed | JobState::Completed)
    }
}

// ---------------------------------------------------------------------------
// Status events
// ---------------------------------------------------------------------------

/// One entry in a job's status journal. Immutable once written; ordering
/// is the append order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEvent {
    pub message: String,
    pub time: DateTime<Utc>,
    pub flag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<serde_json::Map<String, serde_json::Value>>,
}

impl StatusEvent {
    /// A progress event with the `ok` flag and the current time.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            time: Utc::now(),
            flag: FLAG_OK.to_string(),
            extras: None,
        }
    }

    /// A failure event with the `error` flag and the current time.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            time: Utc::now(),
            flag: FLAG_ERROR.to_string(),
            extras: None,
        }
    }

    /// Attach structured extras to the event.
    pub fn with_extras(mut self, extras: serde_json::Map<String, serde_json::Value>) -> Self {
        self.extras = Some(extras);
        self
    }
}

/// The persisted journal artifact: the explicit state plus the full
/// ordered event sequence for one token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalRecord {
    pub state: JobState,
    pub events: Vec<StatusEvent>,
}

impl JournalRecord {
    /// An empty journal for a freshly created job.
    pub fn new() -> Self {
        Self {
            state: JobState::Created,
            events: Vec::new(),
        }
    }
}

impl Default for JournalRecord {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(JobState::Failed.is_terminal());
        assert!(JobState::Completed.is_terminal());
        assert!(!JobState::Training.is_terminal());
        assert!(!JobState::Created.is_terminal());
    }

    #[test]
    fn event_constructors_set_flags() {
        assert_eq!(StatusEvent::ok("m").flag, FLAG_OK);
        assert_eq!(StatusEvent::error("m").flag, FLAG_ERROR);
    }

    #[test]
    fn journal_round_trips_through_json() {
        let mut record = JournalRecord::new();
        record.events.push(StatusEvent::ok(MSG_DATASET_UPLOADED));
        record.state = JobState::ArgsSaved;

        let json = serde_json::to_string(&record).unwrap();
        let back: JournalRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.state, JobState::ArgsSaved);
        assert_eq!(back.events.len(), 1);
        assert_eq!(back.events[0].message, MSG_DATASET_UPLOADED);
    }
}
