//! Core error types

use thiserror::Error;

/// Result type for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from grid and address operations
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed cell address or range
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Row index out of bounds
    #[error("Row {0} out of bounds (max {1})")]
    RowOutOfBounds(u32, u32),

    /// Column index out of bounds
    #[error("Column {0} out of bounds (max {1})")]
    ColumnOutOfBounds(u32, u32),
}
