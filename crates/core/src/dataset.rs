//! Tabular data model: raw uploaded tables and normalized datasets.
//!
//! A [`RawTable`] is what CSV parsing produces: typed columns that may
//! still contain missing values. A [`Dataset`] is the normalized form the
//! pipeline works with: compact dtypes, closed categorical vocabularies,
//! and no missing values (see [`crate::preprocess`]).

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Raw (pre-normalization) tables
// ---------------------------------------------------------------------------

/// A parsed but not yet normalized column. Cells may be missing.
///
/// Numeric columns that contain missing values are always [`RawColumn::Float64`]:
/// an integer column only stays integer when every cell is present.
#[derive(Debug, Clone, PartialEq)]
pub enum RawColumn {
    Int64(Vec<Option<i64>>),
    Float64(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl RawColumn {
    pub fn len(&self) -> usize {
        match self {
            RawColumn::Int64(v) => v.len(),
            RawColumn::Float64(v) => v.len(),
            RawColumn::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An ordered set of named raw columns, all the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub columns: Vec<(String, RawColumn)>,
}

impl RawTable {
    /// Parse a CSV document (with a header row) into typed columns.
    ///
    /// Empty cells are missing values. A column is `Int64` when every cell
    /// is present and parses as a 64-bit integer, `Float64` when every
    /// present cell parses as a 64-bit float, and `Text` otherwise.
    pub fn from_csv(bytes: &[u8]) -> Result<Self, CoreError> {
        let mut reader = csv::Reader::from_reader(bytes);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| CoreError::Parse(format!("Invalid CSV header: {e}")))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        if headers.is_empty() {
            return Err(CoreError::Parse("CSV has no columns".into()));
        }

        let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
        for result in reader.records() {
            let record = result.map_err(|e| CoreError::Parse(format!("Invalid CSV row: {e}")))?;
            if record.len() != headers.len() {
                return Err(CoreError::Parse(format!(
                    "Row has {} fields, expected {}",
                    record.len(),
                    headers.len()
                )));
            }
            for (idx, field) in record.iter().enumerate() {
                let field = field.trim();
                cells[idx].push(if field.is_empty() {
                    None
                } else {
                    Some(field.to_string())
                });
            }
        }

        if cells[0].is_empty() {
            return Err(CoreError::Parse("CSV has no data rows".into()));
        }

        let columns = headers
            .into_iter()
            .zip(cells)
            .map(|(name, raw)| (name, infer_column(raw)))
            .collect();

        Ok(Self { columns })
    }

    /// Number of rows (all columns have the same length).
    pub fn rows(&self) -> usize {
        self.columns.first().map_or(0, |(_, c)| c.len())
    }
}

/// Pick the narrowest raw type that holds every present cell.
fn infer_column(cells: Vec<Option<String>>) -> RawColumn {
    let complete = cells.iter().all(|c| c.is_some());

    if complete
        && cells
            .iter()
            .flatten()
            .all(|c| c.parse::<i64>().is_ok())
    {
        return RawColumn::Int64(
            cells
                .into_iter()
                .map(|c| c.map(|s| s.parse::<i64>().unwrap()))
                .collect(),
        );
    }

    if cells
        .iter()
        .flatten()
        .all(|c| c.parse::<f64>().is_ok())
    {
        return RawColumn::Float64(
            cells
                .into_iter()
                .map(|c| c.map(|s| s.parse::<f64>().unwrap()))
                .collect(),
        );
    }

    RawColumn::Text(cells)
}

// ---------------------------------------------------------------------------
// Normalized datasets
// ---------------------------------------------------------------------------

/// Column dtype after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dtype {
    UInt32,
    Int32,
    Float32,
    Categorical,
}

/// A normalized column: compact dtype, no missing values.
///
/// Categorical columns store a closed vocabulary plus per-row codes that
/// index into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Column {
    UInt32(Vec<u32>),
    Int32(Vec<i32>),
    Float32(Vec<f32>),
    Categorical {
        vocabulary: Vec<String>,
        codes: Vec<u32>,
    },
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::UInt32(v) => v.len(),
            Column::Int32(v) => v.len(),
            Column::Float32(v) => v.len(),
            Column::Categorical { codes, .. } => codes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> Dtype {
        match self {
            Column::UInt32(_) => Dtype::UInt32,
            Column::Int32(_) => Dtype::Int32,
            Column::Float32(_) => Dtype::Float32,
            Column::Categorical { .. } => Dtype::Categorical,
        }
    }

    /// Numeric view of one cell. Categorical cells map to their vocabulary
    /// code, which is what the model search and metrics operate on.
    pub fn value_as_f64(&self, row: usize) -> f64 {
        match self {
            Column::UInt32(v) => f64::from(v[row]),
            Column::Int32(v) => f64::from(v[row]),
            Column::Float32(v) => f64::from(v[row]),
            Column::Categorical { codes, .. } => f64::from(codes[row]),
        }
    }
}

/// A normalized dataset: ordered named columns, ready for training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub columns: Vec<(String, Column)>,
}

impl Dataset {
    pub fn rows(&self) -> usize {
        self.columns.first().map_or(0, |(_, c)| c.len())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Split into numeric feature rows and target values for the given
    /// target column. Feature columns keep their dataset order.
    pub fn split_features(&self, target: &str) -> Result<(Vec<Vec<f64>>, Vec<f64>), CoreError> {
        let target_col = self
            .column(target)
            .ok_or_else(|| CoreError::Validation(format!("Unknown target column '{target}'")))?;

        let feature_cols: Vec<&Column> = self
            .columns
            .iter()
            .filter(|(n, _)| n != target)
            .map(|(_, c)| c)
            .collect();

        let rows = self.rows();
        let mut features = Vec::with_capacity(rows);
        let mut targets = Vec::with_capacity(rows);
        for row in 0..rows {
            features.push(feature_cols.iter().map(|c| c.value_as_f64(row)).collect());
            targets.push(target_col.value_as_f64(row));
        }
        Ok((features, targets))
    }

    /// Lossless widening back to a raw table, used to check that
    /// re-normalizing a normalized dataset is a no-op.
    pub fn to_raw(&self) -> RawTable {
        let columns = self
            .columns
            .iter()
            .map(|(name, col)| {
                let raw = match col {
                    Column::UInt32(v) => {
                        RawColumn::Int64(v.iter().map(|x| Some(i64::from(*x))).collect())
                    }
                    Column::Int32(v) => {
                        RawColumn::Int64(v.iter().map(|x| Some(i64::from(*x))).collect())
                    }
                    Column::Float32(v) => {
                        RawColumn::Float64(v.iter().map(|x| Some(f64::from(*x))).collect())
                    }
                    Column::Categorical { vocabulary, codes } => RawColumn::Text(
                        codes
                            .iter()
                            .map(|c| Some(vocabulary[*c as usize].clone()))
                            .collect(),
                    ),
                };
                (name.clone(), raw)
            })
            .collect();
        RawTable { columns }
    }
}
