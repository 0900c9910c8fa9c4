//! The model grid
//!
//! A sparse, single-sheet, 1-based cell surface. Row 1 is reserved for
//! the period header (ticker, base year, period numbers, terminal year)
//! and is initialized at construction; everything below it belongs to
//! the series and scalar writers layered on top.

use ahash::AHashMap;

use crate::address::CellAddress;
use crate::cell::{Cell, CellValue};
use crate::error::{Error, Result};
use crate::layout::SheetLayout;
use crate::style::{FontStyle, Style};
use crate::{MAX_COLS, MAX_ROWS};

/// A sparse spreadsheet grid holding one valuation model
#[derive(Debug)]
pub struct Grid {
    /// Security identifier, upper-cased into row 1 column 1
    ticker: String,
    /// Column layout this grid was built against
    layout: SheetLayout,
    /// Workbook font
    font: FontStyle,
    /// Sparse cell storage keyed by (row, col)
    cells: AHashMap<(u32, u32), Cell>,
    /// Highest row written so far
    max_row: u32,
}

impl Grid {
    /// Create a new grid and write its period header row
    pub fn new<S: Into<String>>(ticker: S, layout: SheetLayout) -> Self {
        let mut grid = Self {
            ticker: ticker.into().to_uppercase(),
            layout,
            font: FontStyle::default(),
            cells: AHashMap::new(),
            max_row: 0,
        };
        grid.init_header_row();
        grid
    }

    fn init_header_row(&mut self) {
        let ticker = self.ticker.clone();
        self.store(1, self.layout.label_column, CellValue::Text(ticker), Style::Plain);
        self.store(
            1,
            self.layout.start_column,
            CellValue::Text("Base year".into()),
            Style::Plain,
        );
        for i in 1..self.layout.total_columns - 1 {
            self.store(
                1,
                self.layout.start_column + i,
                CellValue::Number(i as f64),
                Style::Plain,
            );
        }
        self.store(
            1,
            self.layout.terminal_column(),
            CellValue::Text("Terminal year".into()),
            Style::Plain,
        );
    }

    /// The security identifier (upper-cased)
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// The layout this grid was built against
    pub fn layout(&self) -> SheetLayout {
        self.layout
    }

    /// The workbook font
    pub fn font(&self) -> &FontStyle {
        &self.font
    }

    /// Write a cell, replacing any existing content
    pub fn put(&mut self, row: u32, col: u32, value: CellValue, style: Style) -> Result<()> {
        if row == 0 || row > MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS));
        }
        if col == 0 || col > MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS));
        }
        self.store(row, col, value, style);
        Ok(())
    }

    fn store(&mut self, row: u32, col: u32, value: CellValue, style: Style) {
        self.cells.insert((row, col), Cell::new(value, style));
        if row > self.max_row {
            self.max_row = row;
        }
    }

    /// Get a cell, if present
    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    /// Get a cell by address, if present
    pub fn cell_at(&self, addr: CellAddress) -> Option<&Cell> {
        self.cell(addr.row, addr.col)
    }

    /// Get a cell's value, blank when the cell was never written
    pub fn value_at(&self, row: u32, col: u32) -> CellValue {
        self.cell(row, col)
            .map(|c| c.value.clone())
            .unwrap_or(CellValue::Blank)
    }

    /// Highest row written so far
    pub fn max_row(&self) -> u32 {
        self.max_row
    }

    /// Number of stored cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of formula cells
    pub fn formula_count(&self) -> usize {
        self.cells.values().filter(|c| c.value.is_formula()).count()
    }

    /// Iterate over stored cells in row-major order
    pub fn iter_cells(&self) -> impl Iterator<Item = (u32, u32, &Cell)> + '_ {
        let mut entries: Vec<_> = self
            .cells
            .iter()
            .map(|(&(row, col), cell)| (row, col, cell))
            .collect();
        entries.sort_by_key(|&(row, col, _)| (row, col));
        entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_header_row() {
        let grid = Grid::new("nvda", SheetLayout::default());

        assert_eq!(grid.value_at(1, 1), CellValue::Text("NVDA".into()));
        assert_eq!(grid.value_at(1, 2), CellValue::Text("Base year".into()));
        assert_eq!(grid.value_at(1, 3), CellValue::Number(1.0));
        assert_eq!(grid.value_at(1, 12), CellValue::Number(10.0));
        assert_eq!(grid.value_at(1, 13), CellValue::Text("Terminal year".into()));
        assert_eq!(grid.value_at(1, 14), CellValue::Blank);
    }

    #[test]
    fn test_put_and_read_back() {
        let mut grid = Grid::new("intc", SheetLayout::default());
        grid.put(3, 2, CellValue::Number(100.0), Style::Comma).unwrap();

        let cell = grid.cell(3, 2).unwrap();
        assert_eq!(cell.value, CellValue::Number(100.0));
        assert_eq!(cell.style, Style::Comma);
        assert_eq!(grid.max_row(), 3);
    }

    #[test]
    fn test_put_rejects_zero_indices() {
        let mut grid = Grid::new("intc", SheetLayout::default());
        assert!(grid.put(0, 1, CellValue::Blank, Style::Plain).is_err());
        assert!(grid.put(1, 0, CellValue::Blank, Style::Plain).is_err());
    }

    #[test]
    fn test_iter_cells_row_major() {
        let mut grid = Grid::new("t", SheetLayout::default());
        grid.put(5, 3, CellValue::Number(1.0), Style::Plain).unwrap();
        grid.put(2, 9, CellValue::Number(2.0), Style::Plain).unwrap();
        grid.put(2, 4, CellValue::Number(3.0), Style::Plain).unwrap();

        let coords: Vec<(u32, u32)> = grid
            .iter_cells()
            .filter(|&(row, _, _)| row > 1)
            .map(|(row, col, _)| (row, col))
            .collect();
        assert_eq!(coords, vec![(2, 4), (2, 9), (5, 3)]);
    }
}
