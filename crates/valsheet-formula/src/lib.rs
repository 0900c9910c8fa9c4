//! # valsheet-formula
//!
//! Formula tokenizer, evaluator and typed expression tree for valsheet.
//!
//! The write path builds formulas as [`Expr`] trees and renders them to
//! Excel-grammar strings (`=C3*2`, `=SUM(C5:L5)`); the read path
//! tokenizes those strings back and evaluates them with a two-stack
//! operator-precedence pass, resolving cell references recursively
//! through a [`CellSource`]. Anything the writer emits, the evaluator
//! reads back to the same number.
//!
//! ## Example
//!
//! ```rust
//! use valsheet_core::{CellValue, Grid, SheetLayout, Style};
//! use valsheet_formula::evaluate_formula;
//!
//! let mut grid = Grid::new("t", SheetLayout::default());
//! grid.put(3, 3, CellValue::Number(5.0), Style::Comma).unwrap();
//! grid.put(3, 4, CellValue::formula("=C3*2"), Style::Comma).unwrap();
//!
//! assert_eq!(evaluate_formula(&grid, "=SUM(C3:D3)").unwrap(), 15.0);
//! ```

pub mod error;
pub mod eval;
pub mod expr;
pub mod token;

pub use error::{FormulaError, FormulaResult};
pub use eval::{evaluate_cell, evaluate_formula, CellSource};
pub use expr::{BinaryOp, Expr};
pub use token::{tokenize_body, tokenize_formula, Token};
