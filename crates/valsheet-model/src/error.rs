//! Model error types

use thiserror::Error;

/// Result type for model operations
pub type ModelResult<T> = std::result::Result<T, ModelError>;

/// Errors from model construction and statement loading
#[derive(Debug, Error)]
pub enum ModelError {
    /// A series was declared on a row another series already occupies
    #[error("Row {0} is already in use")]
    RowInUse(u32),

    /// A registry lookup named a label that was never registered
    #[error("Unknown label: '{0}'")]
    UnknownLabel(String),

    /// No statement row matches the given title pattern
    #[error("No row matches title pattern '{0}'")]
    MissingTitle(String),

    /// Malformed title pattern
    #[error("Invalid title pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Model input was missing or inconsistent
    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Grid(#[from] valsheet_core::Error),

    #[error(transparent)]
    Formula(#[from] valsheet_formula::FormulaError),
}
