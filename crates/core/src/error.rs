/// Domain-level errors shared across crates.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Input failed a boundary validation check (bad upload, bad form).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Raw tabular input could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),
}
