//! Viewport state management for scrolling and zoom.

use super::rect::{Point, Rect};
use super::SheetLayout;

/// Viewport state - represents the visible area of the spreadsheet
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// Horizontal scroll position in sheet coordinates
    pub scroll_x: f64,
    /// Vertical scroll position in sheet coordinates
    pub scroll_y: f64,
    /// Viewport width in screen pixels
    pub width: f64,
    /// Viewport height in screen pixels
    pub height: f64,
    /// Zoom scale factor (1.0 = 100%)
    pub scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    /// Create a new viewport with default values
    pub fn new() -> Self {
        Self {
            scroll_x: 0.0,
            scroll_y: 0.0,
            width: 800.0,
            height: 600.0,
            scale: 1.0,
        }
    }

    /// Visible region in sheet coordinates.
    pub fn world_rect(&self) -> Rect {
        let scale = self.effective_scale();
        Rect::new(
            self.scroll_x,
            self.scroll_y,
            (self.width / scale).max(0.0),
            (self.height / scale).max(0.0),
        )
    }

    /// Get visible row range (inclusive) based on current scroll position.
    pub fn visible_rows(&self, layout: &SheetLayout) -> (u32, u32) {
        let world = self.world_rect();
        layout.visible_rows(world.top, world.height)
    }

    /// Get visible column range (inclusive) based on current scroll position.
    pub fn visible_cols(&self, layout: &SheetLayout) -> (u32, u32) {
        let world = self.world_rect();
        layout.visible_cols(world.left, world.width)
    }

    /// Convert sheet coordinates to screen coordinates
    pub fn to_screen(&self, point: Point) -> Point {
        Point::new(
            (point.x - self.scroll_x) * self.scale,
            (point.y - self.scroll_y) * self.scale,
        )
    }

    /// Convert screen coordinates to sheet coordinates
    pub fn to_sheet(&self, screen: Point) -> Point {
        let scale = self.effective_scale();
        Point::new(
            screen.x / scale + self.scroll_x,
            screen.y / scale + self.scroll_y,
        )
    }

    /// Clamp scroll position so the viewport never runs past the sheet.
    pub fn clamp_scroll(&mut self, layout: &SheetLayout) {
        let world = self.world_rect();
        let max_x = (layout.total_width() - world.width).max(0.0);
        let max_y = (layout.total_height() - world.height).max(0.0);
        self.scroll_x = self.scroll_x.clamp(0.0, max_x);
        self.scroll_y = self.scroll_y.clamp(0.0, max_y);
    }

    /// Scroll by delta amounts (sheet coordinates)
    pub fn scroll_by(&mut self, delta_x: f64, delta_y: f64, layout: &SheetLayout) {
        self.scroll_x += delta_x;
        self.scroll_y += delta_y;
        self.clamp_scroll(layout);
    }

    /// Set absolute scroll position
    pub fn set_scroll(&mut self, x: f64, y: f64, layout: &SheetLayout) {
        self.scroll_x = x;
        self.scroll_y = y;
        self.clamp_scroll(layout);
    }

    /// Resize the viewport
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
    }

    /// Zoom so that the sheet point under `anchor` (screen coordinates) stays put.
    ///
    /// `zoom` is clamped to `[min_zoom, max_zoom]`.
    pub fn zoom_at(
        &mut self,
        anchor: Point,
        zoom: f64,
        (min_zoom, max_zoom): (f64, f64),
        layout: &SheetLayout,
    ) {
        if !zoom.is_finite() {
            return;
        }
        let pinned = self.to_sheet(anchor);
        self.scale = zoom.clamp(min_zoom, max_zoom);
        self.scroll_x = pinned.x - anchor.x / self.scale;
        self.scroll_y = pinned.y - anchor.y / self.scale;
        self.clamp_scroll(layout);
    }

    fn effective_scale(&self) -> f64 {
        if self.scale.is_finite() && self.scale > 0.0 {
            self.scale
        } else {
            1.0
        }
    }
}
