//! Upload-time dataset normalization.
//!
//! Pure, deterministic, and idempotent: re-running the pipeline on its own
//! output changes nothing. Per column, in order:
//!
//! 1. free-text with more than [`MAX_CATEGORICAL_CARDINALITY`] distinct
//!    values is dropped (identifier / free-text field, not a feature);
//! 2. missing values are imputed (mode for text, median for numeric);
//! 3. text becomes a closed-vocabulary categorical column;
//! 4. non-negative integers downcast to `u32`;
//! 5. other integers downcast to `i32`;
//! 6. floats downcast to `f32`.

use std::collections::{BTreeSet, HashMap};

use crate::dataset::{Column, Dataset, RawColumn, RawTable};

/// Distinct-value ceiling above which a text column is treated as
/// free-text and dropped rather than encoded.
pub const MAX_CATEGORICAL_CARDINALITY: usize = 10;

/// Normalize a raw table into a compact, fully-imputed dataset.
pub fn normalize(table: RawTable) -> Dataset {
    let mut columns = Vec::with_capacity(table.columns.len());

    for (name, raw) in table.columns {
        match raw {
            RawColumn::Text(cells) => {
                let distinct: BTreeSet<&String> = cells.iter().flatten().collect();
                if distinct.len() > MAX_CATEGORICAL_CARDINALITY {
                    continue;
                }
                columns.push((name, encode_categorical(cells)));
            }
            RawColumn::Int64(cells) => {
                let values = impute_int(cells);
                let column = if values.iter().all(|v| *v >= 0) {
                    // Truncating casts match the source format's width.
                    Column::UInt32(values.into_iter().map(|v| v as u32).collect())
                } else {
                    Column::Int32(values.into_iter().map(|v| v as i32).collect())
                };
                columns.push((name, column));
            }
            RawColumn::Float64(cells) => {
                let values = impute_float(cells);
                columns.push((
                    name,
                    Column::Float32(values.into_iter().map(|v| v as f32).collect()),
                ));
            }
        }
    }

    Dataset { columns }
}

/// Encode a low-cardinality text column: impute the mode, then map each
/// value to its index in the sorted vocabulary.
fn encode_categorical(cells: Vec<Option<String>>) -> Column {
    let mode = text_mode(&cells);
    let filled: Vec<String> = cells
        .into_iter()
        .map(|c| c.unwrap_or_else(|| mode.clone()))
        .collect();

    let vocabulary: Vec<String> = filled
        .iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .cloned()
        .collect();

    let codes = filled
        .iter()
        .map(|v| vocabulary.iter().position(|w| w == v).unwrap() as u32)
        .collect();

    Column::Categorical { vocabulary, codes }
}

/// Most frequent present value; ties break toward the lexicographically
/// smallest, so imputation is deterministic.
fn text_mode(cells: &[Option<String>]) -> String {
    let mut counts: HashMap<&String, usize> = HashMap::new();
    for value in cells.iter().flatten() {
        *counts.entry(value).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by(|(a, ca), (b, cb)| ca.cmp(cb).then_with(|| b.cmp(a)))
        .map(|(v, _)| v.clone())
        .unwrap_or_default()
}

fn impute_int(cells: Vec<Option<i64>>) -> Vec<i64> {
    let present: Vec<i64> = cells.iter().flatten().copied().collect();
    let median = int_median(&present);
    cells.into_iter().map(|c| c.unwrap_or(median)).collect()
}

fn impute_float(cells: Vec<Option<f64>>) -> Vec<f64> {
    let present: Vec<f64> = cells.iter().flatten().copied().collect();
    let median = float_median(&present);
    cells.into_iter().map(|c| c.unwrap_or(median)).collect()
}

fn int_median(values: &[i64]) -> i64 {
    if values.is_empty() {
        return 0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    sorted[sorted.len() / 2]
}

fn float_median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
