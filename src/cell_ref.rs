//! Cell coordinates, inclusive cell ranges, and Excel-style A1 references.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TileError;

/// Zero-based (row, column) address of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    pub row: u32,
    pub col: u32,
}

impl CellCoord {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", col_to_letter(self.col), u64::from(self.row) + 1)
    }
}

/// Inclusive rectangular range of cells.
///
/// Constructors normalize so that `start_* <= end_*` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellRange {
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
}

impl CellRange {
    /// Build a range from two corners in any order.
    pub fn new(row0: u32, col0: u32, row1: u32, col1: u32) -> Self {
        Self {
            start_row: row0.min(row1),
            start_col: col0.min(col1),
            end_row: row0.max(row1),
            end_col: col0.max(col1),
        }
    }

    /// Range covering exactly one cell.
    pub fn single(coord: CellCoord) -> Self {
        Self::new(coord.row, coord.col, coord.row, coord.col)
    }

    /// Every row of the given columns.
    pub fn whole_cols(col0: u32, col1: u32) -> Self {
        Self::new(0, col0, u32::MAX, col1)
    }

    /// Every column of the given rows.
    pub fn whole_rows(row0: u32, row1: u32) -> Self {
        Self::new(row0, 0, row1, u32::MAX)
    }

    pub fn start(&self) -> CellCoord {
        CellCoord::new(self.start_row, self.start_col)
    }

    pub fn end(&self) -> CellCoord {
        CellCoord::new(self.end_row, self.end_col)
    }

    /// True if the two ranges share at least one cell.
    pub fn intersects(&self, other: &CellRange) -> bool {
        self.start_row <= other.end_row
            && other.start_row <= self.end_row
            && self.start_col <= other.end_col
            && other.start_col <= self.end_col
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start() == self.end() {
            write!(f, "{}", self.start())
        } else {
            write!(f, "{}:{}", self.start(), self.end())
        }
    }
}

impl FromStr for CellRange {
    type Err = TileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (row0, col0, row1, col1) =
            parse_cell_range(s).ok_or_else(|| TileError::CellRef(s.to_string()))?;
        Ok(Self::new(row0, col0, row1, col1))
    }
}

impl FromStr for CellCoord {
    type Err = TileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (col, row) = parse_cell_ref(s).ok_or_else(|| TileError::CellRef(s.to_string()))?;
        Ok(Self::new(row, col))
    }
}

/// Parse a cell reference like "A1" into (col, row) where col and row are 0-indexed.
///
/// Letters must precede digits; `$` anchors are ignored.
pub fn parse_cell_ref(cell_ref: &str) -> Option<(u32, u32)> {
    let mut col: u32 = 0;
    let mut row: u32 = 0;
    let mut saw_col = false;
    let mut saw_row = false;

    for ch in cell_ref.trim().chars() {
        if ch == '$' {
            continue;
        }
        if ch.is_ascii_alphabetic() {
            if saw_row {
                return None;
            }
            let upper = ch.to_ascii_uppercase();
            col = col
                .checked_mul(26)?
                .checked_add(upper as u32 - 'A' as u32 + 1)?;
            saw_col = true;
        } else if ch.is_ascii_digit() {
            row = row.checked_mul(10)?.checked_add(ch as u32 - '0' as u32)?;
            saw_row = true;
        } else {
            return None;
        }
    }

    if !saw_col || !saw_row || row == 0 {
        return None;
    }

    Some((col - 1, row - 1))
}

/// Parse a cell range like "A1:B10" or "A1" into (start_row, start_col, end_row, end_col).
pub fn parse_cell_range(range: &str) -> Option<(u32, u32, u32, u32)> {
    if let Some((start, end)) = range.split_once(':') {
        let (start_col, start_row) = parse_cell_ref(start)?;
        let (end_col, end_row) = parse_cell_ref(end)?;
        Some((start_row, start_col, end_row, end_col))
    } else {
        let (start_col, start_row) = parse_cell_ref(range)?;
        Some((start_row, start_col, start_row, start_col))
    }
}

/// Convert a 0-based column index to Excel column letters (A, B, ..., Z, AA, AB, ...)
pub fn col_to_letter(col: u32) -> String {
    let mut letters = Vec::new();
    let mut n = u64::from(col) + 1;
    while n > 0 {
        n -= 1;
        letters.push(b'A' + u8::try_from(n % 26).unwrap_or(0));
        n /= 26;
    }
    letters.iter().rev().map(|&b| char::from(b)).collect()
}
