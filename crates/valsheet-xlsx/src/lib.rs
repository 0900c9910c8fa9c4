//! # valsheet-xlsx
//!
//! Minimal XLSX writer for valsheet model grids.
//!
//! A built model is worth little trapped in memory; this crate saves the
//! grid as a real single-sheet `.xlsx` workbook with its formulas intact,
//! so the model stays live when opened in a spreadsheet application.
//!
//! ## Example
//!
//! ```rust,no_run
//! use valsheet_core::{Grid, SheetLayout};
//! use valsheet_xlsx::XlsxWriter;
//!
//! let grid = Grid::new("nvda", SheetLayout::default());
//! XlsxWriter::write_file(&grid, "nvda-dcf.xlsx").unwrap();
//! ```

pub mod error;
pub mod writer;

pub use error::{XlsxError, XlsxResult};
pub use writer::XlsxWriter;
