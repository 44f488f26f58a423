//! Backend-agnostic tile surfaces.
//!
//! A [`DisplayList`] is an immutable batch of draw commands in tile-local
//! raster pixels. It is cheap to replay against any 2D canvas and is the
//! surface type produced by [`DisplayListRenderer`].

use std::borrow::Cow;
use std::collections::HashMap;

use crate::cell_ref::CellCoord;
use crate::error::BoxedRenderError;
use crate::layout::{Point, Rect};
use crate::tiles::DetailLevel;

use super::colors::{palette, Rgb};
use super::{TileRenderer, TileRequest};

/// Cell padding in sheet pixels
const CELL_PADDING: f64 = 4.0;
/// Body font size in sheet pixels
const FONT_SIZE: f64 = 11.0;

/// Visual attributes of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellStyle {
    pub fill: Option<Rgb>,
    pub text_color: Option<Rgb>,
}

/// Read-only access to worksheet data for rendering.
pub trait CellSource {
    /// Display text of a cell, if any.
    fn cell_value(&self, coord: CellCoord) -> Option<Cow<'_, str>>;

    fn cell_style(&self, _coord: CellCoord) -> Option<CellStyle> {
        None
    }
}

impl<T: CellSource + ?Sized> CellSource for &T {
    fn cell_value(&self, coord: CellCoord) -> Option<Cow<'_, str>> {
        (**self).cell_value(coord)
    }

    fn cell_style(&self, coord: CellCoord) -> Option<CellStyle> {
        (**self).cell_style(coord)
    }
}

impl CellSource for HashMap<CellCoord, String> {
    fn cell_value(&self, coord: CellCoord) -> Option<Cow<'_, str>> {
        self.get(&coord).map(|s| Cow::Borrowed(s.as_str()))
    }
}

/// One drawing operation in tile raster coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect {
        rect: Rect,
        color: Rgb,
    },
    Line {
        from: Point,
        to: Point,
        color: Rgb,
        width: f64,
    },
    /// Left-aligned text; `origin.y` is the vertical middle of the line.
    Text {
        origin: Point,
        text: String,
        color: Rgb,
        size: f64,
    },
}

/// Immutable, replayable drawing batch for one tile.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisplayList {
    size: u32,
    commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new(size: u32) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    /// Edge length of the raster in pixels.
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }
}

/// Reference renderer: paints cells from a [`CellSource`] into display lists,
/// honoring each bucket's level of detail.
#[derive(Debug, Clone)]
pub struct DisplayListRenderer<D> {
    source: D,
    background: Rgb,
}

impl<D: CellSource> DisplayListRenderer<D> {
    pub fn new(source: D) -> Self {
        Self {
            source,
            background: palette::WHITE,
        }
    }

    pub fn with_background(mut self, background: Rgb) -> Self {
        self.background = background;
        self
    }

    pub fn source(&self) -> &D {
        &self.source
    }

    /// Mutable access to the data. Callers must invalidate affected cells.
    pub fn source_mut(&mut self) -> &mut D {
        &mut self.source
    }

    fn paint(&self, request: &TileRequest<'_>) -> DisplayList {
        let layout = request.layout;
        let scale = request.raster_scale;
        let edge = f64::from(request.raster_size);
        let mut list = DisplayList::new(request.raster_size);
        list.push(DrawCommand::FillRect {
            rect: Rect::new(0.0, 0.0, edge, edge),
            color: self.background,
        });

        let detail = request.bucket.detail;
        let cells = request.cells;
        for row in cells.start_row..=cells.end_row {
            if layout.row_height(row) <= 0.0 {
                continue;
            }
            for col in cells.start_col..=cells.end_col {
                if layout.col_width(col) <= 0.0 {
                    continue;
                }
                let coord = CellCoord::new(row, col);
                let bounds = request.to_raster(&layout.cell_bounds(coord));
                let style = self.source.cell_style(coord).unwrap_or_default();
                if let Some(fill) = style.fill {
                    list.push(DrawCommand::FillRect {
                        rect: bounds,
                        color: fill,
                    });
                }
                let Some(value) = self.source.cell_value(coord) else {
                    continue;
                };
                if value.is_empty() {
                    continue;
                }
                let pad = CELL_PADDING * scale;
                match detail {
                    DetailLevel::Text | DetailLevel::Full => list.push(DrawCommand::Text {
                        origin: Point::new(bounds.left + pad, bounds.top + bounds.height / 2.0),
                        text: value.into_owned(),
                        color: style.text_color.unwrap_or(palette::BLACK),
                        size: FONT_SIZE * scale,
                    }),
                    DetailLevel::Blocks | DetailLevel::Grid => list.push(DrawCommand::FillRect {
                        rect: Rect::new(
                            bounds.left + pad,
                            bounds.top + bounds.height * 0.3,
                            (bounds.width - 2.0 * pad).max(0.0),
                            bounds.height * 0.4,
                        ),
                        color: style
                            .text_color
                            .map_or(palette::CONTENT_BLOCK, |c| c.lighten(0.6)),
                    }),
                }
            }
        }

        if detail.show_gridlines() {
            let sheet = request.sheet_rect;
            let col_end = cells.end_col.saturating_add(1).min(layout.col_count());
            for col in cells.start_col..=col_end {
                let x = (layout.cols().position_at(col) - sheet.left) * scale;
                if (0.0..=edge).contains(&x) {
                    list.push(grid_line(Point::new(x, 0.0), Point::new(x, edge)));
                }
            }
            let row_end = cells.end_row.saturating_add(1).min(layout.row_count());
            for row in cells.start_row..=row_end {
                let y = (layout.rows().position_at(row) - sheet.top) * scale;
                if (0.0..=edge).contains(&y) {
                    list.push(grid_line(Point::new(0.0, y), Point::new(edge, y)));
                }
            }
        }
        list
    }
}

fn grid_line(from: Point, to: Point) -> DrawCommand {
    DrawCommand::Line {
        from,
        to,
        color: palette::GRID_LINE,
        width: 1.0,
    }
}

impl<D: CellSource> TileRenderer for DisplayListRenderer<D> {
    type Surface = DisplayList;

    fn render_tile(
        &mut self,
        request: &TileRequest<'_>,
    ) -> std::result::Result<DisplayList, BoxedRenderError> {
        Ok(self.paint(request))
    }
}
