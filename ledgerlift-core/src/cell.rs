//! Typed spreadsheet cells and the rectangular grid produced by the loader

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single decoded cell.
///
/// Numbers and dates keep both the value used for calculation and the string
/// shown to users, so later stages never have to re-render a float.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawCell {
    Number { value: f64, display: String },
    Text { text: String },
    Date { value: NaiveDate, display: String },
    Empty,
}

impl RawCell {
    pub fn number(value: f64) -> Self {
        RawCell::Number {
            value,
            display: format_number(value),
        }
    }

    /// Text cell; whitespace-only input collapses to `Empty`.
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.trim().is_empty() {
            RawCell::Empty
        } else {
            RawCell::Text { text }
        }
    }

    pub fn date(value: NaiveDate) -> Self {
        RawCell::Date {
            value,
            display: value.format("%Y-%m-%d").to_string(),
        }
    }

    /// String form of the cell as a user would see it.
    pub fn display(&self) -> &str {
        match self {
            RawCell::Number { display, .. } => display,
            RawCell::Text { text } => text,
            RawCell::Date { display, .. } => display,
            RawCell::Empty => "",
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text { text } => text.trim().is_empty(),
            RawCell::Number { .. } | RawCell::Date { .. } => false,
        }
    }
}

/// Render a float without a spurious `.0` for whole values.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

/// Rows of cells, padded so every row has the same width.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGrid {
    rows: Vec<Vec<RawCell>>,
    width: usize,
    /// 1-based spreadsheet row number of `rows[0]`.
    first_row_number: usize,
}

impl RawGrid {
    pub fn new(rows: Vec<Vec<RawCell>>) -> Self {
        Self::with_first_row(rows, 1)
    }

    pub fn with_first_row(mut rows: Vec<Vec<RawCell>>, first_row_number: usize) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, RawCell::Empty);
        }
        Self {
            rows,
            width,
            first_row_number: first_row_number.max(1),
        }
    }

    pub fn rows(&self) -> &[Vec<RawCell>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[RawCell]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Spreadsheet row number (1-based) for a grid row index.
    pub fn source_row_number(&self, index: usize) -> usize {
        self.first_row_number + index
    }
}
