//! Pure metric functions for held-out scoring.
//!
//! Classification metrics operate on class labels encoded as `f64` (codes
//! for categorical targets, raw values for integer targets). Averaging is
//! binary when the target has exactly two distinct values (positive class
//! `1`), weighted by class support otherwise.

/// Averaging strategy for multi-class precision/recall/F1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Average {
    /// Score the positive class (label `1`) only.
    Binary,
    /// Per-class scores weighted by class support.
    Weighted,
}

/// Pick the averaging strategy for a target: binary iff exactly two
/// distinct values.
pub fn average_for(y_true: &[f64]) -> Average {
    if classes_of(y_true).len() == 2 {
        Average::Binary
    } else {
        Average::Weighted
    }
}

/// Fraction of exact label matches.
pub fn accuracy(y_true: &[f64], y_pred: &[f64]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let hits = y_true
        .iter()
        .zip(y_pred)
        .filter(|(t, p)| t == p)
        .count();
    hits as f64 / y_true.len() as f64
}

pub fn precision(y_true: &[f64], y_pred: &[f64], average: Average) -> f64 {
    averaged(y_true, y_pred, average, class_precision)
}

pub fn recall(y_true: &[f64], y_pred: &[f64], average: Average) -> f64 {
    averaged(y_true, y_pred, average, class_recall)
}

pub fn f1(y_true: &[f64], y_pred: &[f64], average: Average) -> f64 {
    averaged(y_true, y_pred, average, |t, p, c| {
        let precision = class_precision(t, p, c);
        let recall = class_recall(t, p, c);
        if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        }
    })
}

/// Coefficient of determination. A constant target scores 1.0 only for a
/// perfect fit.
pub fn r2(y_true: &[f64], y_pred: &[f64]) -> f64 {
    let n = y_true.len();
    if n == 0 {
        return 0.0;
    }
    let mean = y_true.iter().sum::<f64>() / n as f64;
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

/// Mean squared error.
pub fn mse(y_true: &[f64], y_pred: &[f64]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>()
        / y_true.len() as f64
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

/// Sorted distinct values of the true labels.
fn classes_of(y_true: &[f64]) -> Vec<f64> {
    let mut classes = y_true.to_vec();
    classes.sort_by(f64::total_cmp);
    classes.dedup();
    classes
}

fn class_precision(y_true: &[f64], y_pred: &[f64], class: f64) -> f64 {
    let predicted = y_pred.iter().filter(|p| **p == class).count();
    if predicted == 0 {
        return 0.0;
    }
    let hits = y_true
        .iter()
        .zip(y_pred)
        .filter(|(t, p)| **p == class && **t == class)
        .count();
    hits as f64 / predicted as f64
}

fn class_recall(y_true: &[f64], y_pred: &[f64], class: f64) -> f64 {
    let actual = y_true.iter().filter(|t| **t == class).count();
    if actual == 0 {
        return 0.0;
    }
    let hits = y_true
        .iter()
        .zip(y_pred)
        .filter(|(t, p)| **t == class && **p == class)
        .count();
    hits as f64 / actual as f64
}

fn averaged(
    y_true: &[f64],
    y_pred: &[f64],
    average: Average,
    score: impl Fn(&[f64], &[f64], f64) -> f64,
) -> f64 {
    match average {
        Average::Binary => score(y_true, y_pred, 1.0),
        Average::Weighted => {
            let n = y_true.len();
            if n == 0 {
                return 0.0;
            }
            classes_of(y_true)
                .into_iter()
                .map(|class| {
                    let support = y_true.iter().filter(|t| **t == class).count();
                    score(y_true, y_pred, class) * support as f64 / n as f64
                })
                .sum()
        }
    }
}
