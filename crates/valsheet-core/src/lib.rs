//! # valsheet-core
//!
//! Core data structures for the valsheet valuation workbook builder.
//!
//! This crate provides the fundamental types the rest of the workspace
//! builds on:
//! - [`CellAddress`] and [`CellRange`] - 1-based cell addressing with
//!   bijective base-26 column letters
//! - [`CellValue`] and [`Cell`] - cell contents (numbers, text, formulas)
//! - [`Style`] - the closed set of display styles and number formats
//! - [`SheetLayout`] - per-workbook column layout configuration
//! - [`Grid`] - the sparse single-sheet surface a model is written onto
//!
//! ## Example
//!
//! ```rust
//! use valsheet_core::{CellValue, Grid, SheetLayout, Style};
//!
//! let mut grid = Grid::new("nvda", SheetLayout::default());
//! grid.put(3, 2, CellValue::Number(100.0), Style::Comma).unwrap();
//! grid.put(3, 3, CellValue::formula("=B3*2"), Style::Comma).unwrap();
//! ```

pub mod address;
pub mod cell;
pub mod error;
pub mod grid;
pub mod layout;
pub mod style;

// Re-exports for convenience
pub use address::{column_to_letters, letters_to_column, CellAddress, CellRange};
pub use cell::{Cell, CellValue};
pub use error::{Error, Result};
pub use grid::Grid;
pub use layout::SheetLayout;
pub use style::{FontStyle, Style};

/// Maximum number of rows in a sheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a sheet (Excel limit)
pub const MAX_COLS: u32 = 16_384;
