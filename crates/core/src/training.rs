//! Training arguments and model-search configuration.

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::error::CoreError;

/// Learning task kind, chosen by the caller at training start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    Regression,
    Classification,
}

/// Per-job training arguments. Written once, before the pipeline starts,
/// and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingArgs {
    pub token: String,
    pub target: String,
    pub task: Task,
    pub iterations: u32,
}

impl TrainingArgs {
    /// Boundary validation: positive iteration budget and a target column
    /// that exists in the normalized dataset.
    pub fn validate(&self, dataset: &Dataset) -> Result<(), CoreError> {
        if self.iterations == 0 {
            return Err(CoreError::Validation(
                "iterations must be a positive integer".into(),
            ));
        }
        if dataset.column(&self.target).is_none() {
            return Err(CoreError::Validation(format!(
                "Target column '{}' not present in the uploaded dataset",
                self.target
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Search options
// ---------------------------------------------------------------------------

/// Cross-validation fold count used by the model search.
pub const CV_FOLDS: usize = 3;

/// Deterministic seed for fold assignment and evaluation sampling.
pub const SEARCH_SEED: u64 = 42;

/// Estimators the model search is allowed to try.
pub const ESTIMATOR_ALLOW_LIST: &[&str] = &["baseline", "stump"];

/// Fixed configuration handed to the model search alongside the per-job
/// arguments.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub cv_folds: usize,
    pub seed: u64,
    pub early_stop: bool,
    pub estimators: Vec<String>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            cv_folds: CV_FOLDS,
            seed: SEARCH_SEED,
            early_stop: true,
            estimators: ESTIMATOR_ALLOW_LIST.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Summary of the search's chosen configuration, persisted as the
/// metadata artifact. Not the model itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub estimator: String,
    pub best_loss: f64,
    pub best_config: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Column;

    fn dataset() -> Dataset {
        Dataset {
            columns: vec![("label".into(), Column::UInt32(vec![0, 1]))],
        }
    }

    #[test]
    fn task_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Task::Regression).unwrap(), "\"regression\"");
        let task: Task = serde_json::from_str("\"classification\"").unwrap();
        assert_eq!(task, Task::Classification);
    }

    #[test]
    fn zero_iterations_rejected() {
        let args = TrainingArgs {
            token: "t".into(),
            target: "label".into(),
            task: Task::Classification,
            iterations: 0,
        };
        assert!(args.validate(&dataset()).is_err());
    }

    #[test]
    fn unknown_target_rejected() {
        let args = TrainingArgs {
            token: "t".into(),
            target: "missing".into(),
            task: Task::Classification,
            iterations: 5,
        };
        assert!(args.validate(&dataset()).is_err());
    }

    #[test]
    fn valid_args_accepted() {
        let args = TrainingArgs {
            token: "t".into(),
            target: "label".into(),
            task: Task::Classification,
            iterations: 15,
        };
        assert!(args.validate(&dataset()).is_ok());
    }
}
