//! Cell and grid model for one report sheet.
//!
//! A sheet arrives as an ordered grid of heterogeneous cells. Nothing here
//! interprets a cell beyond its scalar kind; numeric and date meaning is
//! assigned in `normalize.rs`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One spreadsheet cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum Cell {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    /// A native date/time value (workbook readers that decode date cells).
    DateTime(DateTime<Utc>),
}

static EMPTY: Cell = Cell::Empty;

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    /// Decode a field from a CSV export of the sheet.
    ///
    /// Blank fields become `Empty`; fields that parse as a plain decimal
    /// (dot separator) become `Number`; everything else stays `Text`.
    /// Comma decimals stay text and are handled by the numeric normaliser.
    pub fn from_csv_field(raw: &str) -> Self {
        let t = raw.trim();
        if t.is_empty() {
            return Cell::Empty;
        }
        if looks_like_plain_decimal(t) {
            if let Ok(v) = t.parse::<f64>() {
                return Cell::Number(v);
            }
        }
        Cell::Text(raw.to_string())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Spreadsheet truthiness: empty, zero, `false` and the empty string are
    /// false; anything else is true. Used for QC error markers.
    pub fn is_truthy(&self) -> bool {
        match self {
            Cell::Empty => false,
            Cell::Number(v) => *v != 0.0 && !v.is_nan(),
            Cell::Text(s) => !s.is_empty(),
            Cell::Bool(b) => *b,
            Cell::DateTime(_) => true,
        }
    }

    /// Display text used for name matching. `None` for empty cells.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(v) => Some(format_number(*v)),
            Cell::Bool(b) => Some(b.to_string()),
            Cell::DateTime(dt) => Some(dt.to_rfc3339()),
        }
    }

    /// Trimmed display text; `None` when the cell is empty or all whitespace.
    pub fn as_trimmed_text(&self) -> Option<String> {
        self.as_text()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_text() {
            Some(s) => write!(f, "{s}"),
            None => write!(f, "<empty>"),
        }
    }
}

/// Render a number the way a spreadsheet shows it: `12`, not `12.0`.
pub fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

fn looks_like_plain_decimal(t: &str) -> bool {
    let body = t.strip_prefix('-').or_else(|| t.strip_prefix('+')).unwrap_or(t);
    !body.is_empty()
        && body.chars().all(|c| c.is_ascii_digit() || c == '.')
        && body.chars().filter(|c| *c == '.').count() <= 1
        && body.chars().any(|c| c.is_ascii_digit())
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// A whole sheet: rows of cells, ragged rows allowed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cell at (row, col); out-of-range positions read as empty.
    pub fn get(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    pub fn row(&self, row: usize) -> &[Cell] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Cell lookup inside one row slice; out-of-range reads as empty.
pub fn cell_at(row: &[Cell], col: usize) -> &Cell {
    row.get(col).unwrap_or(&EMPTY)
}
