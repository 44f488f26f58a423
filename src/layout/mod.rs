//! Layout engine for computing cell positions and viewport management.
//!
//! This module handles:
//! - Cumulative row/column positions with lazy rebuild after resizes
//! - Binary search for cell lookup at sheet coordinates
//! - Viewport state (scroll position, zoom, visible range)

mod rect;
mod sheet_layout;
mod span;
mod viewport;

pub use rect::{Point, Rect};
pub use sheet_layout::{SheetLayout, DEFAULT_COL_WIDTH, DEFAULT_ROW_HEIGHT};
pub use span::SpanSequence;
pub use viewport::Viewport;
