//! Well addressing — row/column ↔ linear index ↔ well name ("C12").
//!
//! Pure functions, no plate state. Every conversion takes the plate
//! [`Shape`] and [`FillOrder`] it is evaluated against.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Plate dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    pub rows: usize,
    pub cols: usize,
}

impl Shape {
    /// 8 × 12
    pub const PLATE_96: Shape = Shape { rows: 8, cols: 12 };
    /// 16 × 24
    pub const PLATE_384: Shape = Shape { rows: 16, cols: 24 };
    /// Rows are named by a single letter, `A` to `Z`.
    pub const MAX_ROWS: usize = 26;

    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Total number of wells.
    pub const fn capacity(&self) -> usize {
        self.rows * self.cols
    }

    pub const fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    /// Non-empty, and every row has a letter.
    pub const fn is_addressable(&self) -> bool {
        self.rows > 0 && self.cols > 0 && self.rows <= Self::MAX_ROWS
    }
}

impl Default for Shape {
    fn default() -> Self {
        Shape::PLATE_96
    }
}

/// Direction the linear index (and sequential allocation) walks the plate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FillOrder {
    /// A1, B1, … H1, A2, …: index increases down the rows of a column.
    /// A line is one full column.
    #[default]
    DownColumns,
    /// A1, A2, … A12, B1, …: index increases across the columns of a row.
    /// A line is one full row.
    AcrossRows,
}

impl FillOrder {
    /// Map the "column ordered" flag onto a fill order.
    pub fn from_column_ordered(column_ordered: bool) -> Self {
        if column_ordered { FillOrder::AcrossRows } else { FillOrder::DownColumns }
    }

    pub fn is_column_ordered(self) -> bool {
        matches!(self, FillOrder::AcrossRows)
    }

    /// Number of wells in one line under this order.
    pub fn line_len(self, shape: Shape) -> usize {
        match self {
            FillOrder::DownColumns => shape.rows,
            FillOrder::AcrossRows => shape.cols,
        }
    }
}

/// A well position, zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Well {
    pub row: usize,
    pub col: usize,
}

impl Well {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Canonical name, e.g. row 2 col 11 → `C12`.
    pub fn name(&self) -> String {
        well_name(self.row, self.col)
    }

    /// Parse a well name against the given plate shape.
    pub fn parse(name: &str, shape: Shape) -> Result<Self> {
        let (row, col) = parse_well(name, shape)?;
        Ok(Self { row, col })
    }
}

impl fmt::Display for Well {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

// ============================================================================
// Codec
// ============================================================================

/// Row letter (`A` + row) followed by the 1-based column.
pub fn well_name(row: usize, col: usize) -> String {
    let letter = (b'A' + row as u8) as char;
    format!("{letter}{}", col + 1)
}

/// Inverse of [`well_name`], range-checked against `shape`.
pub fn parse_well(name: &str, shape: Shape) -> Result<(usize, usize)> {
    let invalid = |reason: String| Error::InvalidAddress {
        address: name.to_owned(),
        reason,
    };

    let mut chars = name.trim().chars();
    let letter = chars
        .next()
        .ok_or_else(|| invalid("empty well name".into()))?
        .to_ascii_uppercase();
    if !letter.is_ascii_uppercase() {
        return Err(invalid(format!("row '{letter}' is not a letter")));
    }
    let row = (letter as u8 - b'A') as usize;
    if row >= shape.rows {
        return Err(invalid(format!("row '{letter}' outside {} rows", shape.rows)));
    }

    let digits = chars.as_str();
    let col: usize = digits
        .bytes()
        .all(|b| b.is_ascii_digit())
        .then(|| digits.parse().ok())
        .flatten()
        .ok_or_else(|| invalid(format!("column '{digits}' is not a number")))?;
    if col == 0 || col > shape.cols {
        return Err(invalid(format!("column {col} outside 1..={}", shape.cols)));
    }

    Ok((row, col - 1))
}

/// Linear index → (row, col) under `order`.
pub fn index_to_rowcol(idx: usize, shape: Shape, order: FillOrder) -> (usize, usize) {
    match order {
        FillOrder::AcrossRows => (idx / shape.cols, idx % shape.cols),
        FillOrder::DownColumns => (idx % shape.rows, idx / shape.rows),
    }
}

/// (row, col) → linear index under `order`.
pub fn rowcol_to_index(row: usize, col: usize, shape: Shape, order: FillOrder) -> usize {
    match order {
        FillOrder::AcrossRows => row * shape.cols + col,
        FillOrder::DownColumns => col * shape.rows + row,
    }
}
