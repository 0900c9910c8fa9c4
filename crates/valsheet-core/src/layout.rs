//! Sheet layout configuration
//!
//! Every model workbook is built against one immutable layout describing
//! where the label column sits, where data columns start, and how many
//! regular periods there are. All fixed column positions (terminal year,
//! the 10-year SUM window) derive from this struct, so two builds in the
//! same process can never observe each other's column arithmetic.

/// Column layout for a model sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetLayout {
    /// Column holding series labels
    pub label_column: u32,
    /// First data column (the base-year column)
    pub start_column: u32,
    /// Number of regular period columns, base year included
    pub total_columns: u32,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            label_column: 1,
            start_column: 2,
            total_columns: 12,
        }
    }
}

impl SheetLayout {
    /// The terminal-year column (one past the regular periods)
    pub fn terminal_column(&self) -> u32 {
        self.start_column + self.total_columns - 1
    }

    /// The last regular period column, just before the terminal year
    pub fn last_regular_column(&self) -> u32 {
        self.terminal_column() - 1
    }

    /// First column of the 10-year analysis window (base year excluded)
    pub fn window_start(&self) -> u32 {
        self.start_column + 1
    }

    /// Last column of the 10-year analysis window
    pub fn window_end(&self) -> u32 {
        self.last_regular_column()
    }

    /// Half of the regular period columns
    pub fn half_columns(&self) -> u32 {
        self.total_columns / 2
    }

    /// Number of forecast periods inside the analysis window
    pub fn window_len(&self) -> u32 {
        self.window_end() - self.window_start() + 1
    }
}
