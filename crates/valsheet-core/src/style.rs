//! Display styles and number formats
//!
//! The style set is closed: every series in a valuation model renders as
//! one of these five, and the number format is derived from the style,
//! never set independently.

/// Display style for a cell or series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Style {
    /// Thousands separator, two decimals (`#,0.00`); zero renders blank
    #[default]
    Comma,
    /// Percentage with two decimals (`0.00%`)
    Percent,
    /// Four-decimal ratio (`0.0000`)
    Ratio,
    /// Two-decimal ratio (`0.00`)
    Ratio2,
    /// No number format
    Plain,
}

impl Style {
    /// The Excel number-format code, or `None` for General
    pub fn format_code(&self) -> Option<&'static str> {
        match self {
            Style::Comma => Some("#,0.00"),
            Style::Percent => Some("0.00%"),
            Style::Ratio => Some("0.0000"),
            Style::Ratio2 => Some("0.00"),
            Style::Plain => None,
        }
    }

    /// Whether a numeric zero in this style is suppressed to a blank cell
    pub fn suppresses_zero(&self) -> bool {
        matches!(self, Style::Comma)
    }
}

/// Font settings
///
/// The model workbook uses a single font throughout, so this carries only
/// what the writer needs.
#[derive(Debug, Clone, PartialEq)]
pub struct FontStyle {
    /// Font name
    pub name: String,
    /// Size in points
    pub size: f64,
}

impl Default for FontStyle {
    fn default() -> Self {
        Self {
            name: "Calibri".to_string(),
            size: 11.0,
        }
    }
}
