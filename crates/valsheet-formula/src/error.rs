//! Formula error types

use thiserror::Error;
use valsheet_core::CellAddress;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur during formula tokenizing or evaluation
#[derive(Debug, Error)]
pub enum FormulaError {
    /// Formula parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Formula evaluation error
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// The input is not a formula (missing the leading '=')
    #[error("Not a formula: '{0}'")]
    NotAFormula(String),

    /// Function calls other than a whole-cell SUM(range) are outside the
    /// supported grammar; this includes SUM mixed with other arithmetic.
    #[error("Unsupported function expression: {0}")]
    UnsupportedFunction(String),

    /// Division by a zero-valued operand
    #[error("Division by zero")]
    DivisionByZero,

    /// A formula chain references itself
    #[error("Circular reference detected at {0}")]
    CircularReference(CellAddress),

    /// Invalid cell reference
    #[error(transparent)]
    InvalidReference(#[from] valsheet_core::Error),
}
