//! Held-out scoring of a trained model.
//!
//! Draws a fixed, deterministically-seeded sample of the dataset, splits
//! it into features and target, and scores the model's predictions with
//! the metric set matching the task.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use tabforge_core::dataset::Dataset;
use tabforge_core::metrics;
use tabforge_core::training::{Task, TrainingArgs, SEARCH_SEED};

use crate::error::PipelineError;
use crate::search::TrainedModel;

/// Fraction of rows drawn for held-out scoring.
pub const EVAL_SAMPLE_FRACTION: f64 = 0.25;

/// Evaluate a trained model on a seeded 25% sample of the dataset.
///
/// Regression reports r2 and mean squared error; classification reports
/// accuracy, precision, recall, and F1, binary-averaged when the sampled
/// target has exactly two distinct values and support-weighted otherwise.
pub fn evaluate(
    model: &TrainedModel,
    dataset: &Dataset,
    args: &TrainingArgs,
) -> Result<BTreeMap<String, f64>, PipelineError> {
    let (features, targets) = dataset.split_features(&args.target)?;

    let sample = sample_indices(targets.len());
    let y_true: Vec<f64> = sample.iter().map(|i| targets[*i]).collect();
    let sampled: Vec<Vec<f64>> = sample.iter().map(|i| features[*i].clone()).collect();
    let y_pred = model.fitted.predict(&sampled);

    let mut results = BTreeMap::new();
    match args.task {
        Task::Regression => {
            results.insert("r2_score".to_string(), metrics::r2(&y_true, &y_pred));
            results.insert(
                "mean_squared_error".to_string(),
                metrics::mse(&y_true, &y_pred),
            );
        }
        Task::Classification => {
            let average = metrics::average_for(&y_true);
            results.insert(
                "accuracy_score".to_string(),
                metrics::accuracy(&y_true, &y_pred),
            );
            results.insert(
                "precision_score".to_string(),
                metrics::precision(&y_true, &y_pred, average),
            );
            results.insert(
                "recall_score".to_string(),
                metrics::recall(&y_true, &y_pred, average),
            );
            results.insert("f1_score".to_string(), metrics::f1(&y_true, &y_pred, average));
        }
    }
    Ok(results)
}

/// Seeded sample of row indices: at least one row, at most all of them.
fn sample_indices(rows: usize) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(SEARCH_SEED);
    let mut indices: Vec<usize> = (0..rows).collect();
    indices.shuffle(&mut rng);

    let count = ((rows as f64 * EVAL_SAMPLE_FRACTION).round() as usize).clamp(1, rows);
    indices.truncate(count);
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::FittedEstimator;
    use tabforge_core::dataset::Column;

    fn model(fitted: FittedEstimator) -> TrainedModel {
        TrainedModel {
            estimator: "stump".into(),
            best_loss: 0.0,
            best_config: serde_json::json!({}),
            fitted,
        }
    }

    fn args(task: Task) -> TrainingArgs {
        TrainingArgs {
            token: "t".into(),
            target: "label".into(),
            task,
            iterations: 10,
        }
    }

    #[test]
    fn classification_reports_the_four_scores() {
        let dataset = Dataset {
            columns: vec![
                ("x".into(), Column::Float32(vec![1.0; 8])),
                ("label".into(), Column::UInt32(vec![0, 1, 0, 1, 0, 1, 0, 1])),
            ],
        };
        let results = evaluate(
            &model(FittedEstimator::Constant { value: 1.0 }),
            &dataset,
            &args(Task::Classification),
        )
        .unwrap();

        for key in ["accuracy_score", "precision_score", "recall_score", "f1_score"] {
            assert!(results.contains_key(key), "missing {key}");
        }
        assert!(!results.contains_key("r2_score"));
    }

    #[test]
    fn regression_reports_r2_and_mse() {
        let dataset = Dataset {
            columns: vec![
                ("x".into(), Column::Float32(vec![1.0; 8])),
                (
                    "label".into(),
                    Column::Float32(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]),
                ),
            ],
        };
        let results = evaluate(
            &model(FittedEstimator::Constant { value: 4.5 }),
            &dataset,
            &args(Task::Regression),
        )
        .unwrap();

        assert!(results.contains_key("r2_score"));
        assert!(results.contains_key("mean_squared_error"));
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn perfect_model_scores_perfectly() {
        // label = 1 iff x > 4, and the model encodes exactly that split.
        let dataset = Dataset {
            columns: vec![
                (
                    "x".into(),
                    Column::Float32(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]),
                ),
                ("label".into(), Column::UInt32(vec![0, 0, 0, 0, 1, 1, 1, 1])),
            ],
        };
        let results = evaluate(
            &model(FittedEstimator::Stump {
                feature: 0,
                threshold: 4.5,
                below: 0.0,
                above: 1.0,
            }),
            &dataset,
            &args(Task::Classification),
        )
        .unwrap();
        assert_eq!(results["accuracy_score"], 1.0);
    }

    #[test]
    fn sample_is_a_quarter_of_the_rows_and_deterministic() {
        let a = sample_indices(100);
        let b = sample_indices(100);
        assert_eq!(a.len(), 25);
        assert_eq!(a, b);
    }

    #[test]
    fn tiny_dataset_still_samples_one_row() {
        assert_eq!(sample_indices(1).len(), 1);
        assert_eq!(sample_indices(2).len(), 1);
    }
}
