//! Domain types for the tabforge training service.
//!
//! This crate has no async or HTTP dependencies so it can be used by the
//! storage layer, the pipeline, and the API server alike. It holds the
//! tabular data model, the upload-time normalization rules, job lifecycle
//! types (status events and states), training arguments, and the metric
//! functions used for held-out scoring.

pub mod dataset;
pub mod error;
pub mod metrics;
pub mod preprocess;
pub mod status;
pub mod token;
pub mod training;
