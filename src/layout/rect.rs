//! Plain geometry values in sheet (zoom = 1.0) pixel space.

use serde::{Deserialize, Serialize};

/// A point in sheet coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle, half-open on its right and bottom edges.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// X position (left edge)
    pub left: f64,
    /// Y position (top edge)
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Build from edge coordinates; inverted edges give an empty rect.
    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self::new(left, top, (right - left).max(0.0), (bottom - top).max(0.0))
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn inverted_edges_give_empty_rect() {
        let r = Rect::from_edges(10.0, 10.0, 5.0, 30.0);
        assert_eq!(r, Rect::new(10.0, 10.0, 0.0, 20.0));
        assert!(r.is_empty());
    }

    #[test]
    fn edges_follow_size() {
        let r = Rect::new(2.0, 3.0, 10.0, 20.0);
        assert_eq!((r.right(), r.bottom()), (12.0, 23.0));
        assert!(!r.is_empty());
    }
}
