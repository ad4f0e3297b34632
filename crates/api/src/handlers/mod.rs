//! Request handlers.
//!
//! Handlers validate inputs, delegate to the store/journal/pipeline, and
//! map errors via [`crate::error::AppError`].

pub mod jobs;
