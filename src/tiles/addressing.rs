//! Tile grid addressing.
//!
//! A tile at grid position `(x, y)` in a bucket with coverage multiplier `m`
//! covers the sheet-space rectangle
//! `[x·T·m, (x+1)·T·m) × [y·T·m, (y+1)·T·m)` where `T` is the tile size.

use serde::{Deserialize, Serialize};

use crate::cell_ref::CellRange;
use crate::layout::{Rect, SheetLayout};

use super::zoom::{BucketId, ZoomBucket, ZoomPolicy};

/// Cache key of one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileKey {
    pub x: i32,
    pub y: i32,
    pub bucket: BucketId,
}

impl TileKey {
    pub const fn new(x: i32, y: i32, bucket: BucketId) -> Self {
        Self { x, y, bucket }
    }
}

/// Inclusive rectangle of tile grid positions within one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileSpan {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl TileSpan {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        (self.x0..=self.x1).contains(&x) && (self.y0..=self.y1).contains(&y)
    }

    /// Grow by `rings` tiles on every side.
    pub fn expand(&self, rings: u32) -> TileSpan {
        let rings = i32::try_from(rings).unwrap_or(i32::MAX);
        TileSpan {
            x0: self.x0.saturating_sub(rings),
            y0: self.y0.saturating_sub(rings),
            x1: self.x1.saturating_add(rings),
            y1: self.y1.saturating_add(rings),
        }
    }

    pub fn intersect(&self, other: &TileSpan) -> Option<TileSpan> {
        let span = TileSpan {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        };
        (span.x0 <= span.x1 && span.y0 <= span.y1).then_some(span)
    }

    pub fn tile_count(&self) -> u64 {
        let w = i64::from(self.x1) - i64::from(self.x0) + 1;
        let h = i64::from(self.y1) - i64::from(self.y0) + 1;
        w.max(0)
            .checked_mul(h.max(0))
            .and_then(|n| u64::try_from(n).ok())
            .unwrap_or(u64::MAX)
    }

    /// Grid positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = (i32, i32)> {
        let (x0, x1) = (self.x0, self.x1);
        (self.y0..=self.y1).flat_map(move |y| (x0..=x1).map(move |x| (x, y)))
    }
}

/// Maps between sheet space, tile grid positions, and cell footprints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileAddressing {
    tile_size: f64,
}

impl TileAddressing {
    pub fn new(tile_size: u32) -> Self {
        debug_assert!(tile_size > 0, "tile size must be positive");
        Self {
            tile_size: f64::from(tile_size.max(1)),
        }
    }

    /// Tile edge length in raster pixels.
    pub fn tile_size(&self) -> f64 {
        self.tile_size
    }

    /// Tile edge length in sheet pixels for a bucket.
    pub fn tile_extent(&self, bucket: &ZoomBucket) -> f64 {
        self.tile_size * bucket.coverage
    }

    /// Sheet-space rectangle covered by a tile.
    pub fn tile_rect(&self, x: i32, y: i32, bucket: &ZoomBucket) -> Rect {
        let extent = self.tile_extent(bucket);
        Rect::new(f64::from(x) * extent, f64::from(y) * extent, extent, extent)
    }

    /// Grid positions whose tiles overlap a sheet-space rectangle.
    #[allow(clippy::cast_possible_truncation)]
    pub fn span_for_rect(&self, rect: &Rect, bucket: &ZoomBucket) -> Option<TileSpan> {
        let extent = self.tile_extent(bucket);
        if rect.is_empty() || extent.is_nan() || extent <= 0.0 {
            return None;
        }
        // Half-open: a rect ending exactly on a tile edge does not reach the next tile.
        let x0 = (rect.left / extent).floor() as i32;
        let y0 = (rect.top / extent).floor() as i32;
        let x1 = ((rect.right() / extent).ceil() as i32).saturating_sub(1).max(x0);
        let y1 = ((rect.bottom() / extent).ceil() as i32).saturating_sub(1).max(y0);
        Some(TileSpan { x0, y0, x1, y1 })
    }

    /// Every grid position that holds part of the sheet.
    pub fn sheet_span(&self, layout: &SheetLayout, bucket: &ZoomBucket) -> Option<TileSpan> {
        self.span_for_rect(&layout.bounds(), bucket)
    }

    /// Cells a tile covers, computed from the current geometry.
    pub fn footprint(&self, layout: &SheetLayout, key: TileKey, bucket: &ZoomBucket) -> CellRange {
        layout.cells_in_rect(&self.tile_rect(key.x, key.y, bucket))
    }

    /// Per-bucket grid spans touched by a cell range.
    pub fn spans_intersecting(
        &self,
        layout: &SheetLayout,
        range: &CellRange,
        policy: &ZoomPolicy,
    ) -> Vec<(BucketId, TileSpan)> {
        if layout.is_empty() {
            return Vec::new();
        }
        let bounds = layout.range_bounds(range);
        policy
            .buckets()
            .iter()
            .filter_map(|bucket| {
                let span = self.span_for_rect(&bounds, bucket)?;
                let sheet = self.sheet_span(layout, bucket)?;
                Some((bucket.id, span.intersect(&sheet)?))
            })
            .collect()
    }

    /// Every tile key, across all buckets, whose rectangle intersects a cell range.
    pub fn tiles_intersecting(
        &self,
        layout: &SheetLayout,
        range: &CellRange,
        policy: &ZoomPolicy,
    ) -> impl Iterator<Item = TileKey> {
        self.spans_intersecting(layout, range, policy)
            .into_iter()
            .flat_map(|(bucket, span)| {
                span.positions().map(move |(x, y)| TileKey::new(x, y, bucket))
            })
    }
}
