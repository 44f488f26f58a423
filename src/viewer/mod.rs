//! JavaScript-facing grid handle.
//!
//! `GridView` owns the sheet geometry, scroll/zoom state, and a tile manager
//! fed by an in-memory cell store. Geometry and frame-planning methods are
//! plain Rust and work off wasm; canvas compositing is wasm32 only.

use std::collections::HashMap;

use wasm_bindgen::prelude::*;

use crate::cell_ref::{CellCoord, CellRange};
use crate::config::TileConfig;
use crate::error::Result;
use crate::layout::{Point, SheetLayout, Viewport};
use crate::render::DisplayListRenderer;
use crate::tiles::TileManager;

#[cfg(target_arch = "wasm32")]
use web_sys::CanvasRenderingContext2d;

type CellStore = HashMap<CellCoord, String>;

/// Scrollable, zoomable tiled grid.
#[wasm_bindgen]
pub struct GridView {
    layout: SheetLayout,
    viewport: Viewport,
    tiles: TileManager<DisplayListRenderer<CellStore>>,
}

#[wasm_bindgen]
impl GridView {
    /// Create a grid with default geometry and tile configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(row_count: u32, col_count: u32) -> GridView {
        console_error_panic_hook::set_once();
        Self {
            layout: SheetLayout::with_defaults(row_count, col_count),
            viewport: Viewport::new(),
            tiles: TileManager::with_defaults(DisplayListRenderer::new(CellStore::new())),
        }
    }

    /// Resize the viewport (screen pixels).
    #[wasm_bindgen]
    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport.resize(width, height);
        self.viewport.clamp_scroll(&self.layout);
    }

    /// Cell under a screen point as `[row, col]`.
    #[wasm_bindgen]
    pub fn cell_at(&self, x: f64, y: f64) -> Vec<u32> {
        let coord = self.layout.cell_at(self.viewport.to_sheet(Point::new(x, y)));
        vec![coord.row, coord.col]
    }

    /// Sheet-space bounds of a cell as `[left, top, width, height]`.
    #[wasm_bindgen]
    pub fn cell_bounds(&self, row: u32, col: u32) -> Vec<f64> {
        let rect = self.layout.cell_bounds(CellCoord::new(row, col));
        vec![rect.left, rect.top, rect.width, rect.height]
    }

    /// Visible row range as `[first, last]`.
    #[wasm_bindgen]
    pub fn visible_rows(&self) -> Vec<u32> {
        let (first, last) = self.viewport.visible_rows(&self.layout);
        vec![first, last]
    }

    /// Visible column range as `[first, last]`.
    #[wasm_bindgen]
    pub fn visible_cols(&self) -> Vec<u32> {
        let (first, last) = self.viewport.visible_cols(&self.layout);
        vec![first, last]
    }

    /// Index of the zoom bucket a zoom factor falls into.
    #[wasm_bindgen]
    pub fn bucket_index_for(&self, zoom: f64) -> u8 {
        self.tiles.policy().bucket_for(zoom).id.0
    }

    #[wasm_bindgen]
    pub fn set_row_height(&mut self, row: u32, height: f64) {
        self.layout.set_row_height(row, height);
        self.geometry_changed();
    }

    #[wasm_bindgen]
    pub fn set_col_width(&mut self, col: u32, width: f64) {
        self.layout.set_col_width(col, width);
        self.geometry_changed();
    }

    #[wasm_bindgen]
    pub fn set_row_hidden(&mut self, row: u32, hidden: bool) {
        self.layout.set_row_hidden(row, hidden);
        self.geometry_changed();
    }

    #[wasm_bindgen]
    pub fn set_col_hidden(&mut self, col: u32, hidden: bool) {
        self.layout.set_col_hidden(col, hidden);
        self.geometry_changed();
    }

    /// Set a cell's text, returning how many cached tiles were dropped.
    #[wasm_bindgen]
    pub fn set_cell(&mut self, row: u32, col: u32, value: String) -> usize {
        let coord = CellCoord::new(row, col);
        self.tiles.renderer_mut().source_mut().insert(coord, value);
        self.tiles
            .invalidate_cells(&self.layout, &CellRange::single(coord))
    }

    #[wasm_bindgen]
    pub fn clear_cell(&mut self, row: u32, col: u32) -> usize {
        let coord = CellCoord::new(row, col);
        if self.tiles.renderer_mut().source_mut().remove(&coord).is_none() {
            return 0;
        }
        self.tiles
            .invalidate_cells(&self.layout, &CellRange::single(coord))
    }

    /// Scroll by a delta in screen pixels.
    #[wasm_bindgen]
    pub fn scroll_by(&mut self, delta_x: f64, delta_y: f64) {
        let scale = self.zoom();
        self.viewport
            .scroll_by(delta_x / scale, delta_y / scale, &self.layout);
    }

    /// Scroll to an absolute sheet-space position.
    #[wasm_bindgen]
    pub fn set_scroll(&mut self, x: f64, y: f64) {
        self.viewport.set_scroll(x, y, &self.layout);
    }

    /// Zoom around a screen point, keeping the cell under it in place.
    #[wasm_bindgen]
    pub fn zoom_at(&mut self, x: f64, y: f64, zoom: f64) {
        let range = self.tiles.policy().zoom_range();
        self.viewport
            .zoom_at(Point::new(x, y), zoom, range, &self.layout);
    }

    #[wasm_bindgen]
    pub fn zoom(&self) -> f64 {
        if self.viewport.scale > 0.0 {
            self.viewport.scale
        } else {
            1.0
        }
    }

    #[wasm_bindgen]
    pub fn scroll_x(&self) -> f64 {
        self.viewport.scroll_x
    }

    #[wasm_bindgen]
    pub fn scroll_y(&self) -> f64 {
        self.viewport.scroll_y
    }

    /// Resolve this frame's tiles without drawing, rendering misses.
    /// Returns the number of visible tiles that are ready.
    #[wasm_bindgen]
    pub fn prepare_frame(&mut self) -> u32 {
        let mut ready = 0;
        for tile in self.tiles.tiles_for(&self.layout, &self.viewport) {
            if !tile.prefetch && tile.content.is_ready() {
                ready += 1;
            }
        }
        ready
    }

    /// Release surfaces retired during the frame.
    #[wasm_bindgen]
    pub fn end_frame(&mut self) -> usize {
        self.tiles.drain_pending_disposal()
    }

    /// Whether prefetch work was deferred and another frame should be scheduled.
    #[wasm_bindgen]
    pub fn needs_another_frame(&self) -> bool {
        self.tiles.has_deferred_prefetch()
    }
}

impl GridView {
    /// Create a grid with a custom tile configuration.
    pub fn with_config(row_count: u32, col_count: u32, config: TileConfig) -> Result<Self> {
        Ok(Self {
            layout: SheetLayout::with_defaults(row_count, col_count),
            viewport: Viewport::new(),
            tiles: TileManager::new(config, DisplayListRenderer::new(CellStore::new()))?,
        })
    }

    pub fn layout(&self) -> &SheetLayout {
        &self.layout
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn tiles(&self) -> &TileManager<DisplayListRenderer<CellStore>> {
        &self.tiles
    }

    fn geometry_changed(&mut self) {
        self.tiles.invalidate_all();
        self.viewport.clamp_scroll(&self.layout);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl GridView {
    /// Create a grid from a JSON tile configuration.
    #[wasm_bindgen(js_name = "withConfigJson")]
    pub fn with_config_json(row_count: u32, col_count: u32, json: &str) -> std::result::Result<GridView, JsValue> {
        console_error_panic_hook::set_once();
        let config = TileConfig::from_json(json)?;
        Ok(Self::with_config(row_count, col_count, config)?)
    }

    /// Composite visible tiles onto a canvas and release retired surfaces.
    /// Returns the number of tiles drawn.
    #[wasm_bindgen]
    pub fn render(&mut self, ctx: &CanvasRenderingContext2d) -> u32 {
        use crate::render::{canvas, palette};
        use crate::tiles::TileContent;

        let raster = f64::from(self.tiles.config().tile_size);
        let mut drawn = 0;
        for tile in self.tiles.tiles_for(&self.layout, &self.viewport) {
            if tile.prefetch {
                continue;
            }
            let origin = (tile.screen_origin.x, tile.screen_origin.y);
            match &tile.content {
                TileContent::Ready(list) => {
                    canvas::replay(ctx, list, origin, tile.screen_size / raster);
                    drawn += 1;
                }
                TileContent::Failed(_) | TileContent::Deferred => {
                    ctx.set_fill_style_str(&palette::WHITE.to_hex());
                    ctx.fill_rect(origin.0, origin.1, tile.screen_size, tile.screen_size);
                }
            }
        }
        self.tiles.drain_pending_disposal();
        drawn
    }

    /// Tile counters as a JS object.
    #[wasm_bindgen]
    pub fn stats(&self) -> std::result::Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.tiles.stats())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn hit_testing_follows_scroll_and_zoom() {
        let mut view = GridView::new(1000, 100);
        assert_eq!(view.cell_at(70.0, 45.0), vec![2, 1]);
        view.set_scroll(64.0, 20.0);
        assert_eq!(view.cell_at(0.0, 0.0), vec![1, 1]);
        view.zoom_at(0.0, 0.0, 2.0);
        assert_eq!(view.zoom(), 2.0);
        assert_eq!(view.cell_at(130.0, 0.0), vec![1, 2]);
        assert_eq!(view.bucket_index_for(view.zoom()), 3);
    }

    #[test]
    fn resizing_invalidates_tiles() {
        let mut view = GridView::new(1000, 100);
        assert_eq!(view.prepare_frame(), 12);
        assert_eq!(view.tiles().cache().len(), 20);
        view.set_col_width(0, 100.0);
        assert!(view.tiles().cache().is_empty());
        assert_eq!(view.cell_bounds(0, 1), vec![100.0, 0.0, 64.0, 20.0]);
        assert_eq!(view.end_frame(), 20);
    }

    #[test]
    fn editing_a_cell_drops_its_tile() {
        let mut view = GridView::new(1000, 100);
        view.prepare_frame();
        assert_eq!(view.set_cell(0, 0, "hello".to_string()), 1);
        assert_eq!(view.clear_cell(5, 5), 0);
        view.prepare_frame();
        assert_eq!(view.tiles().stats().renders, 21);
    }

    #[test]
    fn custom_config() {
        let config = TileConfig {
            tile_size: 128,
            ..TileConfig::default()
        };
        let mut view = GridView::with_config(1000, 100, config).unwrap();
        view.resize(256.0, 128.0);
        assert_eq!(view.visible_cols(), vec![0, 4]);
        assert_eq!(view.prepare_frame(), 2);
    }
}
