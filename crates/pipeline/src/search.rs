//! The model-search contract and the built-in searcher.
//!
//! The orchestrator depends only on [`ModelSearch`]; the built-in
//! implementation is a deliberately small cross-validated search over a
//! bounded estimator allow-list (a constant baseline and single-feature
//! decision stumps). It honours the iteration budget and early stopping,
//! which is all the orchestration layer needs from a trainer.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;

use tabforge_core::dataset::Dataset;
use tabforge_core::training::{SearchOptions, Task, TrainingArgs};

/// Candidate evaluations without improvement before the search stops
/// early (when `SearchOptions::early_stop` is set).
const EARLY_STOP_ROUNDS: usize = 8;

/// Candidate thresholds considered per feature for stump estimators.
const THRESHOLDS_PER_FEATURE: usize = 8;

/// Failure surfaced by a model search. Carried into the status journal
/// verbatim as the failure diagnostic.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct SearchError(pub String);

/// Black-box model-search contract: fit a model to a normalized dataset
/// under a fixed option set.
///
/// Implementations must be safe to call from a blocking worker thread.
pub trait ModelSearch: Send + Sync {
    fn fit(
        &self,
        dataset: &Dataset,
        args: &TrainingArgs,
        options: &SearchOptions,
    ) -> Result<TrainedModel, SearchError>;
}

// ---------------------------------------------------------------------------
// Fitted models
// ---------------------------------------------------------------------------

/// A fitted estimator, serializable as the opaque model artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FittedEstimator {
    /// Predicts one value everywhere: the majority class for
    /// classification, the mean for regression.
    Constant { value: f64 },
    /// Single-feature threshold split with one value per side.
    Stump {
        feature: usize,
        threshold: f64,
        below: f64,
        above: f64,
    },
}

impl FittedEstimator {
    pub fn predict(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        match self {
            FittedEstimator::Constant { value } => vec![*value; rows.len()],
            FittedEstimator::Stump {
                feature,
                threshold,
                below,
                above,
            } => rows
                .iter()
                .map(|row| if row[*feature] <= *threshold { *below } else { *above })
                .collect(),
        }
    }
}

/// The search's result: the fitted estimator plus the summary the
/// metadata artifact is built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    pub estimator: String,
    pub best_loss: f64,
    pub best_config: serde_json::Value,
    pub fitted: FittedEstimator,
}

// ---------------------------------------------------------------------------
// Built-in search
// ---------------------------------------------------------------------------

/// Candidate configurations enumerated by the built-in search.
#[derive(Debug, Clone)]
enum Candidate {
    Constant,
    Stump { feature: usize, threshold: f64 },
}

impl Candidate {
    fn estimator_name(&self) -> &'static str {
        match self {
            Candidate::Constant => "baseline",
            Candidate::Stump { .. } => "stump",
        }
    }

    fn config(&self) -> serde_json::Value {
        match self {
            Candidate::Constant => json!({}),
            Candidate::Stump { feature, threshold } => {
                json!({ "feature": feature, "threshold": threshold })
            }
        }
    }

    /// Fit this candidate on a subset of the rows.
    fn fit(&self, features: &[Vec<f64>], targets: &[f64], task: Task) -> FittedEstimator {
        match self {
            Candidate::Constant => FittedEstimator::Constant {
                value: central_value(targets, task),
            },
            Candidate::Stump { feature, threshold } => {
                let (mut below, mut above) = (Vec::new(), Vec::new());
                for (row, target) in features.iter().zip(targets) {
                    if row[*feature] <= *threshold {
                        below.push(*target);
                    } else {
                        above.push(*target);
                    }
                }
                let fallback = central_value(targets, task);
                FittedEstimator::Stump {
                    feature: *feature,
                    threshold: *threshold,
                    below: if below.is_empty() {
                        fallback
                    } else {
                        central_value(&below, task)
                    },
                    above: if above.is_empty() {
                        fallback
                    } else {
                        central_value(&above, task)
                    },
                }
            }
        }
    }
}

/// Majority class for classification, mean for regression.
fn central_value(targets: &[f64], task: Task) -> f64 {
    match task {
        Task::Regression => {
            if targets.is_empty() {
                0.0
            } else {
                targets.iter().sum::<f64>() / targets.len() as f64
            }
        }
        Task::Classification => {
            let mut sorted = targets.to_vec();
            sorted.sort_by(f64::total_cmp);
            let mut best = (0.0, 0usize);
            let mut idx = 0;
            while idx < sorted.len() {
                let value = sorted[idx];
                let run = sorted[idx..].iter().take_while(|v| **v == value).count();
                if run > best.1 {
                    best = (value, run);
                }
                idx += run;
            }
            best.0
        }
    }
}

/// Squared error for regression, error rate for classification. Lower is
/// better.
fn loss(y_true: &[f64], y_pred: &[f64], task: Task) -> f64 {
    match task {
        Task::Regression => tabforge_core::metrics::mse(y_true, y_pred),
        Task::Classification => 1.0 - tabforge_core::metrics::accuracy(y_true, y_pred),
    }
}

/// The built-in cross-validated model search.
#[derive(Debug, Default)]
pub struct BuiltinSearch;

impl BuiltinSearch {
    pub fn new() -> Self {
        Self
    }

    /// Enumerate candidates in allow-list order: the baseline first, then
    /// stump configurations per feature over value midpoints.
    fn candidates(
        &self,
        features: &[Vec<f64>],
        options: &SearchOptions,
    ) -> Vec<Candidate> {
        let mut out = Vec::new();
        if options.estimators.iter().any(|e| e == "baseline") {
            out.push(Candidate::Constant);
        }
        if options.estimators.iter().any(|e| e == "stump") {
            let feature_count = features.first().map_or(0, Vec::len);
            for feature in 0..feature_count {
                let mut values: Vec<f64> = features.iter().map(|row| row[feature]).collect();
                values.sort_by(f64::total_cmp);
                values.dedup();
                if values.len() < 2 {
                    continue;
                }
                let step = (values.len() - 1).div_ceil(THRESHOLDS_PER_FEATURE).max(1);
                for pair in values.windows(2).step_by(step) {
                    out.push(Candidate::Stump {
                        feature,
                        threshold: (pair[0] + pair[1]) / 2.0,
                    });
                }
            }
        }
        out
    }

    /// Mean validation loss across folds. Falls back to resubstitution
    /// loss when the dataset is too small to hold out anything.
    fn cv_loss(
        &self,
        candidate: &Candidate,
        features: &[Vec<f64>],
        targets: &[f64],
        folds: &[Vec<usize>],
        task: Task,
    ) -> f64 {
        let mut losses = Vec::new();
        for fold in folds {
            if fold.is_empty() || fold.len() == targets.len() {
                continue;
            }
            let (mut train_x, mut train_y) = (Vec::new(), Vec::new());
            let (mut val_x, mut val_y) = (Vec::new(), Vec::new());
            for (idx, (row, target)) in features.iter().zip(targets).enumerate() {
                if fold.contains(&idx) {
                    val_x.push(row.clone());
                    val_y.push(*target);
                } else {
                    train_x.push(row.clone());
                    train_y.push(*target);
                }
            }
            let fitted = candidate.fit(&train_x, &train_y, task);
            losses.push(loss(&val_y, &fitted.predict(&val_x), task));
        }

        if losses.is_empty() {
            let fitted = candidate.fit(features, targets, task);
            return loss(targets, &fitted.predict(features), task);
        }
        losses.iter().sum::<f64>() / losses.len() as f64
    }
}

impl ModelSearch for BuiltinSearch {
    fn fit(
        &self,
        dataset: &Dataset,
        args: &TrainingArgs,
        options: &SearchOptions,
    ) -> Result<TrainedModel, SearchError> {
        let (features, targets) = dataset
            .split_features(&args.target)
            .map_err(|e| SearchError(e.to_string()))?;
        if targets.is_empty() {
            return Err(SearchError("Dataset has no rows".into()));
        }

        let folds = make_folds(targets.len(), options.cv_folds, options.seed);
        let candidates = self.candidates(&features, options);
        if candidates.is_empty() {
            return Err(SearchError("No estimator in the allow-list applies".into()));
        }

        let mut best: Option<(f64, Candidate)> = None;
        let mut since_improved = 0usize;
        let mut evaluated = 0usize;

        for candidate in candidates {
            if evaluated >= args.iterations as usize {
                break;
            }
            evaluated += 1;

            let loss = self.cv_loss(&candidate, &features, &targets, &folds, args.task);
            match &best {
                Some((best_loss, _)) if loss >= *best_loss => {
                    since_improved += 1;
                    if options.early_stop && since_improved >= EARLY_STOP_ROUNDS {
                        break;
                    }
                }
                _ => {
                    best = Some((loss, candidate));
                    since_improved = 0;
                }
            }
        }

        let (best_loss, candidate) =
            best.ok_or_else(|| SearchError("Iteration budget allowed no candidate".into()))?;
        tracing::debug!(
            estimator = candidate.estimator_name(),
            best_loss,
            evaluated,
            "Model search finished",
        );

        Ok(TrainedModel {
            estimator: candidate.estimator_name().to_string(),
            best_loss,
            best_config: candidate.config(),
            fitted: candidate.fit(&features, &targets, args.task),
        })
    }
}

/// Deterministic fold assignment: shuffle row indices with the seeded RNG
/// and deal them round-robin into `folds` buckets.
fn make_folds(rows: usize, folds: usize, seed: u64) -> Vec<Vec<usize>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut indices: Vec<usize> = (0..rows).collect();
    indices.shuffle(&mut rng);

    let mut out = vec![Vec::new(); folds.max(1)];
    for (position, index) in indices.into_iter().enumerate() {
        out[position % folds.max(1)].push(index);
    }
    out
}
