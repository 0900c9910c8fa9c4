//! Named-series writer and scalar registry
//!
//! A [`ModelSheet`] wraps a grid and hands out [`Series`] handles: one
//! labeled row each, appended to left-to-right one period per call.
//! Scalars are one-cell series registered the same way and looked up by
//! label, so a later formula can reference an earlier result by
//! coordinate. Rows are claimed once; redeclaring a row is a modeling
//! error and fails immediately.

use ahash::AHashSet;

use crate::error::{ModelError, ModelResult};
use valsheet_core::{CellAddress, CellRange, CellValue, Grid, SheetLayout, Style};
use valsheet_formula::Expr;

/// One entry appended to a series or set as a scalar
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesEntry {
    /// Numeric value
    Value(f64),
    /// Formula text, with or without the leading '='
    Formula(String),
    /// An explicit placeholder: nothing stored, cursor still advances
    Blank,
}

impl From<f64> for SeriesEntry {
    fn from(v: f64) -> Self {
        SeriesEntry::Value(v)
    }
}

impl From<Expr> for SeriesEntry {
    fn from(expr: Expr) -> Self {
        SeriesEntry::Formula(expr.to_formula())
    }
}

impl From<Option<f64>> for SeriesEntry {
    fn from(v: Option<f64>) -> Self {
        match v {
            Some(v) => SeriesEntry::Value(v),
            None => SeriesEntry::Blank,
        }
    }
}

/// Handle to one labeled row of sequential per-period cells
///
/// The handle is plain data (row, cursor, style, layout); all writes go
/// through [`ModelSheet::append`] so the grid has a single owner.
#[derive(Debug, Clone)]
pub struct Series {
    row: u32,
    cursor: u32,
    style: Style,
    layout: SheetLayout,
}

impl Series {
    /// The row this series occupies
    pub fn row(&self) -> u32 {
        self.row
    }

    /// The column the next append will write to
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    /// The series' display style
    pub fn style(&self) -> Style {
        self.style
    }

    /// Coordinate of the next cell to be appended
    ///
    /// For a scalar entry fresh from a registry lookup this is the
    /// scalar's own cell.
    pub fn value_ref(&self) -> CellAddress {
        CellAddress::new(self.row, self.cursor)
    }

    /// The fixed terminal-year cell, independent of how much has been appended
    pub fn last_ref(&self) -> CellAddress {
        CellAddress::new(self.row, self.layout.terminal_column())
    }

    /// The fixed cell just before the terminal year
    pub fn second_last_ref(&self) -> CellAddress {
        CellAddress::new(self.row, self.layout.last_regular_column())
    }

    /// First cell of the 10-year analysis window
    pub fn start_ref(&self) -> CellAddress {
        CellAddress::new(self.row, self.layout.window_start())
    }

    /// Last cell of the 10-year analysis window
    pub fn end_ref(&self) -> CellAddress {
        CellAddress::new(self.row, self.layout.window_end())
    }

    /// The analysis window as a range, for SUM formulas
    pub fn window(&self) -> CellRange {
        CellRange::new(self.start_ref(), self.end_ref())
    }
}

/// A grid plus the row/label bookkeeping for series and scalars
#[derive(Debug)]
pub struct ModelSheet {
    grid: Grid,
    rows_in_use: AHashSet<u32>,
}

impl ModelSheet {
    /// Create a sheet for one security
    pub fn new<S: Into<String>>(ticker: S, layout: SheetLayout) -> Self {
        Self {
            grid: Grid::new(ticker, layout),
            rows_in_use: AHashSet::new(),
        }
    }

    /// The underlying grid
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Consume the sheet, returning the grid for saving
    pub fn into_grid(self) -> Grid {
        self.grid
    }

    fn claim_row(&mut self, row: u32) -> ModelResult<()> {
        if row <= 1 {
            return Err(ModelError::Invalid(format!(
                "row {} is reserved for the period header",
                row
            )));
        }
        if !self.rows_in_use.insert(row) {
            return Err(ModelError::RowInUse(row));
        }
        Ok(())
    }

    fn write_label(&mut self, label: &str, row: u32) -> ModelResult<()> {
        let col = self.grid.layout().label_column;
        // A label beginning with '=' mirrors another cell (the trade block
        // titles itself with the ticker this way).
        let value = if label.starts_with('=') {
            CellValue::Formula(label.to_string())
        } else {
            CellValue::Text(label.to_string())
        };
        self.grid.put(row, col, value, Style::Plain)?;
        Ok(())
    }

    /// Declare a labeled series on `row`; the row must be unclaimed
    pub fn create_series(&mut self, label: &str, row: u32, style: Style) -> ModelResult<Series> {
        self.claim_row(row)?;
        self.write_label(label, row)?;
        Ok(Series {
            row,
            cursor: self.grid.layout().start_column,
            style,
            layout: self.grid.layout(),
        })
    }

    /// Write a section label without starting a series
    pub fn add_label(&mut self, label: &str, row: u32) -> ModelResult<()> {
        self.claim_row(row)?;
        self.write_label(label, row)
    }

    /// Append the next period cell to a series
    ///
    /// Numeric zero in a Comma-styled series is suppressed to a blank
    /// cell; blanks advance the cursor without storing a value so column
    /// alignment survives series of different temporal coverage.
    pub fn append<E: Into<SeriesEntry>>(&mut self, series: &mut Series, entry: E) -> ModelResult<()> {
        let value = match entry.into() {
            SeriesEntry::Blank => CellValue::Blank,
            SeriesEntry::Value(v) if v == 0.0 && series.style.suppresses_zero() => CellValue::Blank,
            SeriesEntry::Value(v) => CellValue::Number(v),
            SeriesEntry::Formula(text) => CellValue::formula(text),
        };
        self.grid.put(series.row, series.cursor, value, series.style)?;
        series.cursor += 1;
        Ok(())
    }

    /// Register a labeled scalar at `(row, start column)`
    ///
    /// Scalar cells are always written as formulas, numeric values
    /// included, so the saved workbook stays live when an input cell is
    /// edited.
    pub fn set<E: Into<SeriesEntry>>(
        &mut self,
        label: &str,
        entry: E,
        row: u32,
        style: Style,
    ) -> ModelResult<()> {
        self.claim_row(row)?;
        self.write_label(label, row)?;

        let col = self.grid.layout().start_column;
        let value = match entry.into() {
            SeriesEntry::Blank => CellValue::Blank,
            SeriesEntry::Value(v) => CellValue::Formula(format!("={}", v)),
            SeriesEntry::Formula(text) => CellValue::formula(text),
        };
        self.grid.put(row, col, value, style)?;
        Ok(())
    }

    /// Look up a previously declared series or scalar by label
    ///
    /// The returned handle's cursor sits at the start column, so
    /// [`Series::value_ref`] is the entry's first cell. Unregistered
    /// labels are a hard fault: callers must `set` before any `get`.
    pub fn get(&self, label: &str) -> ModelResult<Series> {
        let layout = self.grid.layout();
        for row in 2..=self.grid.max_row() {
            if let Some(cell) = self.grid.cell(row, layout.label_column) {
                if matches!(&cell.value, CellValue::Text(text) if text == label) {
                    return Ok(Series {
                        row,
                        cursor: layout.start_column,
                        style: Style::Comma,
                        layout,
                    });
                }
            }
        }
        Err(ModelError::UnknownLabel(label.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valsheet_core::column_to_letters;
    use valsheet_formula::evaluate_cell;

    fn sheet() -> ModelSheet {
        ModelSheet::new("test", SheetLayout::default())
    }

    #[test]
    fn test_cursor_advances_per_append() {
        let mut sheet = sheet();
        let mut series = sheet.create_series("Revenue", 3, Style::Comma).unwrap();
        assert_eq!(series.cursor(), 2);

        for k in 0..4 {
            sheet.append(&mut series, 100.0 + k as f64).unwrap();
        }
        assert_eq!(series.cursor(), 6);

        // The four cells occupy columns 2..=5 in order
        for (i, col) in (2..=5).enumerate() {
            assert_eq!(
                sheet.grid().value_at(3, col),
                CellValue::Number(100.0 + i as f64)
            );
        }
    }

    #[test]
    fn test_label_written_to_column_one() {
        let mut sheet = sheet();
        sheet.create_series("EBIT margin", 4, Style::Percent).unwrap();
        assert_eq!(
            sheet.grid().value_at(4, 1),
            CellValue::Text("EBIT margin".into())
        );
    }

    #[test]
    fn test_duplicate_row_is_a_fault() {
        let mut sheet = sheet();
        sheet.create_series("Revenue", 3, Style::Comma).unwrap();
        let err = sheet.create_series("EBIT", 3, Style::Comma).unwrap_err();
        assert!(matches!(err, ModelError::RowInUse(3)));
    }

    #[test]
    fn test_header_row_cannot_be_claimed() {
        let mut sheet = sheet();
        assert!(sheet.create_series("x", 1, Style::Comma).is_err());
    }

    #[test]
    fn test_zero_suppression_comma_only() {
        let mut sheet = sheet();
        let mut comma = sheet.create_series("Dividends", 3, Style::Comma).unwrap();
        let mut ratio = sheet.create_series("Coverage", 4, Style::Ratio).unwrap();

        sheet.append(&mut comma, 0.0).unwrap();
        sheet.append(&mut ratio, 0.0).unwrap();

        assert_eq!(sheet.grid().value_at(3, 2), CellValue::Blank);
        assert_eq!(sheet.grid().value_at(4, 2), CellValue::Number(0.0));
    }

    #[test]
    fn test_blank_advances_cursor() {
        let mut sheet = sheet();
        let mut series = sheet.create_series("Reinvestment", 8, Style::Comma).unwrap();
        sheet.append(&mut series, SeriesEntry::Blank).unwrap();
        sheet.append(&mut series, 12.5).unwrap();

        assert_eq!(sheet.grid().value_at(8, 2), CellValue::Blank);
        assert_eq!(sheet.grid().value_at(8, 3), CellValue::Number(12.5));
        assert_eq!(series.cursor(), 4);
    }

    #[test]
    fn test_terminal_refs_are_position_fixed() {
        let mut sheet = sheet();
        let mut series = sheet.create_series("FCFF", 9, Style::Comma).unwrap();

        // Only 4 of 12 cells appended; the terminal refs must not move.
        for _ in 0..4 {
            sheet.append(&mut series, 1.0).unwrap();
        }
        assert_eq!(series.last_ref().to_a1_string(), "M9");
        assert_eq!(series.second_last_ref().to_a1_string(), "L9");
        assert_eq!(series.last_ref().col, 13);
        assert_eq!(series.second_last_ref().col, 12);
    }

    #[test]
    fn test_window_refs() {
        let mut sheet = sheet();
        let series = sheet.create_series("PV (FCFF)", 13, Style::Comma).unwrap();
        assert_eq!(series.start_ref().to_a1_string(), "C13");
        assert_eq!(series.end_ref().to_a1_string(), "L13");
        assert_eq!(series.window().to_a1_string(), "C13:L13");
        assert_eq!(column_to_letters(series.start_ref().col), "C");
    }

    #[test]
    fn test_scalar_set_and_get() {
        let mut sheet = sheet();
        sheet
            .set("Terminal value", 1234.5, 17, Style::Comma)
            .unwrap();

        let handle = sheet.get("Terminal value").unwrap();
        assert_eq!(handle.value_ref().to_a1_string(), "B17");
        assert_eq!(
            sheet.grid().value_at(17, 2),
            CellValue::Formula("=1234.5".into())
        );
    }

    #[test]
    fn test_get_unknown_label_is_a_fault() {
        let sheet = sheet();
        let err = sheet.get("No such thing").unwrap_err();
        assert!(matches!(err, ModelError::UnknownLabel(_)));
    }

    #[test]
    fn test_cross_series_reference_evaluates() {
        let mut sheet = sheet();
        let mut revenue = sheet.create_series("Revenue", 3, Style::Comma).unwrap();
        // Base-year placeholder, then two forecast years at C3 and D3.
        sheet.append(&mut revenue, SeriesEntry::Blank).unwrap();
        sheet.append(&mut revenue, 100.0).unwrap();
        sheet.append(&mut revenue, 110.0).unwrap();

        sheet
            .set(
                "Growth",
                SeriesEntry::Formula("=(D3-C3)/C3".into()),
                15,
                Style::Percent,
            )
            .unwrap();

        let growth = sheet.get("Growth").unwrap();
        let value = evaluate_cell(sheet.grid(), growth.value_ref()).unwrap();
        assert!((value - 0.10).abs() < 1e-12);
    }
}
