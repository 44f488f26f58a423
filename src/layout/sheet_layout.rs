//! Two-axis layout for a sheet.
//!
//! Composes one [`SpanSequence`] for rows and one for columns into cell
//! geometry: bounds, hit testing, and visible ranges. Nothing derived from the
//! spans is cached here; every query reads the current span state.

use crate::cell_ref::{CellCoord, CellRange};

use super::rect::{Point, Rect};
use super::span::SpanSequence;

/// Default column width in pixels (Excel default ~64px at 100% zoom)
pub const DEFAULT_COL_WIDTH: f64 = 64.0;

/// Default row height in pixels (Excel default ~20px at 100% zoom)
pub const DEFAULT_ROW_HEIGHT: f64 = 20.0;

/// Row and column geometry for one sheet.
///
/// Resizing or hiding a row or column changes the geometry of every tile that
/// touches it, so callers must invalidate their whole tile cache afterwards.
#[derive(Debug, Clone)]
pub struct SheetLayout {
    rows: SpanSequence,
    cols: SpanSequence,
}

impl SheetLayout {
    /// Create a layout with uniform row heights and column widths.
    pub fn new(row_count: u32, col_count: u32, row_height: f64, col_width: f64) -> Self {
        Self {
            rows: SpanSequence::new(row_count, row_height),
            cols: SpanSequence::new(col_count, col_width),
        }
    }

    /// Create a layout using Excel-like default dimensions.
    pub fn with_defaults(row_count: u32, col_count: u32) -> Self {
        Self::new(row_count, col_count, DEFAULT_ROW_HEIGHT, DEFAULT_COL_WIDTH)
    }

    pub fn rows(&self) -> &SpanSequence {
        &self.rows
    }

    pub fn cols(&self) -> &SpanSequence {
        &self.cols
    }

    pub fn row_count(&self) -> u32 {
        self.rows.count()
    }

    pub fn col_count(&self) -> u32 {
        self.cols.count()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.cols.is_empty()
    }

    /// Get total width of the sheet
    pub fn total_width(&self) -> f64 {
        self.cols.total_size()
    }

    /// Get total height of the sheet
    pub fn total_height(&self) -> f64 {
        self.rows.total_size()
    }

    /// Full sheet extent as a rectangle anchored at the origin.
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.total_width(), self.total_height())
    }

    pub fn row_height(&self, row: u32) -> f64 {
        self.rows.size_at(row)
    }

    pub fn col_width(&self, col: u32) -> f64 {
        self.cols.size_at(col)
    }

    /// Get cell bounds in sheet coordinates
    pub fn cell_bounds(&self, coord: CellCoord) -> Rect {
        Rect::new(
            self.cols.position_at(coord.col),
            self.rows.position_at(coord.row),
            self.cols.size_at(coord.col),
            self.rows.size_at(coord.row),
        )
    }

    /// Cell under a sheet-space point. Never fails; clamps to the grid.
    pub fn cell_at(&self, point: Point) -> CellCoord {
        CellCoord::new(
            self.rows.index_at_position(point.y),
            self.cols.index_at_position(point.x),
        )
    }

    /// Inclusive row range visible for a vertical scroll offset and height.
    pub fn visible_rows(&self, scroll_y: f64, height: f64) -> (u32, u32) {
        self.rows.visible_range(scroll_y, height)
    }

    /// Inclusive column range visible for a horizontal scroll offset and width.
    pub fn visible_cols(&self, scroll_x: f64, width: f64) -> (u32, u32) {
        self.cols.visible_range(scroll_x, width)
    }

    /// Union rectangle of every cell in `range`.
    ///
    /// Range ends past the sheet are clipped to the last row/column, so
    /// whole-row and whole-column ranges are accepted.
    pub fn range_bounds(&self, range: &CellRange) -> Rect {
        let (left, right) = axis_extent(&self.cols, range.start_col, range.end_col);
        let (top, bottom) = axis_extent(&self.rows, range.start_row, range.end_row);
        Rect::from_edges(left, top, right, bottom)
    }

    /// Cells touched by a sheet-space rectangle (half-open edges).
    pub fn cells_in_rect(&self, rect: &Rect) -> CellRange {
        let (start_row, end_row) = self.rows.index_range(rect.top, rect.bottom());
        let (start_col, end_col) = self.cols.index_range(rect.left, rect.right());
        CellRange::new(start_row, start_col, end_row, end_col)
    }

    pub fn set_row_height(&mut self, row: u32, height: f64) {
        self.rows.set_size(row, height);
    }

    pub fn set_col_width(&mut self, col: u32, width: f64) {
        self.cols.set_size(col, width);
    }

    pub fn reset_row_height(&mut self, row: u32) {
        self.rows.reset_size(row);
    }

    pub fn reset_col_width(&mut self, col: u32) {
        self.cols.reset_size(col);
    }

    pub fn set_row_hidden(&mut self, row: u32, hidden: bool) {
        self.rows.set_hidden(row, hidden);
    }

    pub fn set_col_hidden(&mut self, col: u32, hidden: bool) {
        self.cols.set_hidden(col, hidden);
    }
}

/// Start and end offsets of the inclusive index span `[first, last]`, clipped to the axis.
fn axis_extent(seq: &SpanSequence, first: u32, last: u32) -> (f64, f64) {
    debug_assert!(first <= last, "inverted range {first}..={last}");
    let count = seq.count();
    let start = first.min(count);
    let end = last.saturating_add(1).min(count).max(start);
    (seq.position_at(start), seq.position_at(end))
}
