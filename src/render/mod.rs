//! Tile rendering.
//!
//! This module provides:
//! - The [`TileRenderer`] contract the tile manager calls on a cache miss
//! - A backend-agnostic display-list renderer driven by a [`CellSource`]
//! - Canvas 2D replay of display lists (wasm32 only)
//! - Color utilities

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod colors;
pub mod display_list;

pub use colors::{palette, Rgb};
pub use display_list::{CellSource, CellStyle, DisplayList, DisplayListRenderer, DrawCommand};

use crate::cell_ref::CellRange;
use crate::error::BoxedRenderError;
use crate::layout::{Rect, SheetLayout};
use crate::tiles::{TileKey, ZoomBucket};

/// Everything a renderer needs to paint one tile.
#[derive(Debug, Clone, Copy)]
pub struct TileRequest<'a> {
    pub key: TileKey,
    pub bucket: ZoomBucket,
    /// Sheet-space area the tile covers
    pub sheet_rect: Rect,
    /// Cells intersecting `sheet_rect`
    pub cells: CellRange,
    /// Edge length of the raster in pixels
    pub raster_size: u32,
    /// Raster pixels per sheet pixel
    pub raster_scale: f64,
    pub layout: &'a SheetLayout,
}

impl TileRequest<'_> {
    /// Map a sheet-space rectangle into this tile's raster coordinates.
    pub fn to_raster(&self, rect: &Rect) -> Rect {
        Rect::new(
            (rect.left - self.sheet_rect.left) * self.raster_scale,
            (rect.top - self.sheet_rect.top) * self.raster_scale,
            rect.width * self.raster_scale,
            rect.height * self.raster_scale,
        )
    }
}

/// Produces the surface for a tile on a cache miss.
///
/// Renders must be deterministic for identical inputs: the cache keeps
/// whichever surface was written last for a key.
pub trait TileRenderer {
    type Surface;

    fn render_tile(
        &mut self,
        request: &TileRequest<'_>,
    ) -> std::result::Result<Self::Surface, BoxedRenderError>;
}

/// Adapter turning a closure into a [`TileRenderer`].
#[derive(Debug, Clone)]
pub struct FnRenderer<F>(F);

/// Wrap a render closure.
pub fn from_fn<F, S, E>(f: F) -> FnRenderer<F>
where
    F: FnMut(&TileRequest<'_>) -> std::result::Result<S, E>,
    E: Into<BoxedRenderError>,
{
    FnRenderer(f)
}

impl<F, S, E> TileRenderer for FnRenderer<F>
where
    F: FnMut(&TileRequest<'_>) -> std::result::Result<S, E>,
    E: Into<BoxedRenderError>,
{
    type Surface = S;

    fn render_tile(
        &mut self,
        request: &TileRequest<'_>,
    ) -> std::result::Result<Self::Surface, BoxedRenderError> {
        (self.0)(request).map_err(Into::into)
    }
}
