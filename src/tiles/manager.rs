//! Per-frame tile orchestration.
//!
//! [`TileManager::tiles_for_viewport`] turns a sheet-space viewport and a
//! zoom factor into a row-major stream of placed tiles. Cache hits are
//! served directly; misses invoke the [`TileRenderer`] synchronously and the
//! result is cached before it is yielded, so a tile is never shown stale.
//!
//! Tiles in the prefetch ring that miss only render while the frame's
//! prefetch budget lasts. The rest are yielded as [`TileContent::Deferred`]
//! and [`TileManager::has_deferred_prefetch`] tells the host to schedule
//! another frame.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, trace};

use crate::cell_ref::CellRange;
use crate::config::TileConfig;
use crate::error::{Result, TileError};
use crate::layout::{Point, Rect, SheetLayout, Viewport};
use crate::render::{TileRenderer, TileRequest};

use super::addressing::{TileAddressing, TileKey, TileSpan};
use super::cache::{TileCache, TileEntry};
use super::zoom::{BucketId, ZoomBucket, ZoomPolicy};

/// Running counters, readable and resettable by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileStats {
    pub hits: u64,
    pub misses: u64,
    pub renders: u64,
    pub failures: u64,
    pub evictions: u64,
    pub invalidated: u64,
}

/// What a placed tile carries.
#[derive(Debug)]
pub enum TileContent<S> {
    /// Rendered surface, shared with the cache.
    Ready(Arc<S>),
    /// The render callback failed; draw background instead.
    Failed(TileError),
    /// Prefetch tile skipped for this frame's render budget.
    Deferred,
}

impl<S> TileContent<S> {
    pub fn surface(&self) -> Option<&Arc<S>> {
        match self {
            Self::Ready(surface) => Some(surface),
            Self::Failed(_) | Self::Deferred => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// One tile positioned for compositing.
#[derive(Debug)]
pub struct PlacedTile<S> {
    pub key: TileKey,
    /// Sheet-space area the tile covers
    pub sheet_rect: Rect,
    /// Top-left corner in screen pixels, relative to the viewport
    pub screen_origin: Point,
    /// On-screen edge length in pixels
    pub screen_size: f64,
    /// Outside the visible area; drawn only if the host wants it
    pub prefetch: bool,
    pub content: TileContent<S>,
}

/// Owns the cache and drives rendering for one sheet.
pub struct TileManager<R: TileRenderer> {
    config: TileConfig,
    policy: ZoomPolicy,
    addressing: TileAddressing,
    cache: TileCache<R::Surface>,
    renderer: R,
    stats: TileStats,
    deferred_prefetch: bool,
}

impl<R: TileRenderer> TileManager<R> {
    /// Create a manager from a validated configuration.
    pub fn new(config: TileConfig, renderer: R) -> Result<Self> {
        config.validate()?;
        let policy = config.zoom_policy()?;
        Ok(Self::assemble(config, policy, renderer))
    }

    /// Create a manager with [`TileConfig::default`].
    pub fn with_defaults(renderer: R) -> Self {
        Self::assemble(TileConfig::default(), ZoomPolicy::default(), renderer)
    }

    fn assemble(config: TileConfig, policy: ZoomPolicy, renderer: R) -> Self {
        Self {
            addressing: TileAddressing::new(config.tile_size),
            cache: TileCache::new(config.cache_capacity()),
            policy,
            config,
            renderer,
            stats: TileStats::default(),
            deferred_prefetch: false,
        }
    }

    /// Tiles covering `viewport_rect` (sheet coordinates) at `zoom`, plus
    /// `prefetch_rings` rings around it, in row-major grid order.
    ///
    /// The returned iterator renders lazily as it is advanced. Tiles it
    /// never reaches are neither looked up nor rendered.
    pub fn tiles_for_viewport<'m, 'l>(
        &'m mut self,
        layout: &'l SheetLayout,
        viewport_rect: Rect,
        zoom: f64,
        prefetch_rings: u32,
    ) -> ViewportTiles<'m, 'l, R> {
        self.deferred_prefetch = false;
        let bucket = self.policy.bucket_for(zoom);
        let visible = self.addressing.span_for_rect(&viewport_rect, &bucket);
        let sheet = self.addressing.sheet_span(layout, &bucket);
        let span = visible
            .zip(sheet)
            .and_then(|(visible, sheet)| visible.expand(prefetch_rings).intersect(&sheet));
        trace!(
            bucket = bucket.id.0,
            zoom,
            ?visible,
            ?span,
            "planned viewport tiles"
        );
        let budget = self.config.max_prefetch_renders;
        ViewportTiles {
            cursor: span.map(|s| (s.x0, s.y0)),
            span,
            visible,
            bucket,
            view_origin: Point::new(viewport_rect.left, viewport_rect.top),
            zoom: if zoom.is_finite() && zoom > 0.0 { zoom } else { 1.0 },
            prefetch_budget: budget,
            layout,
            manager: self,
        }
    }

    /// Tiles for a [`Viewport`] using its scale and the configured prefetch rings.
    pub fn tiles_for<'m, 'l>(
        &'m mut self,
        layout: &'l SheetLayout,
        viewport: &Viewport,
    ) -> ViewportTiles<'m, 'l, R> {
        let rings = self.config.prefetch_rings;
        self.tiles_for_viewport(layout, viewport.world_rect(), viewport.scale, rings)
    }

    /// Drop every tile showing any cell of `range`, in every bucket.
    ///
    /// Call synchronously with the data write that changed the cells.
    pub fn invalidate_cells(&mut self, layout: &SheetLayout, range: &CellRange) -> usize {
        let spans = self.addressing.spans_intersecting(layout, range, &self.policy);
        let removed = self.cache.invalidate_where(|key, entry| {
            entry.cell_range().intersects(range)
                || spans
                    .iter()
                    .any(|(bucket, span)| *bucket == key.bucket && span.contains(key.x, key.y))
        });
        debug!(%range, removed, "invalidated tiles for changed cells");
        self.stats.invalidated += removed as u64;
        removed
    }

    /// Drop every tile. Required after any row/column geometry change.
    pub fn invalidate_all(&mut self) -> usize {
        let removed = self.cache.invalidate_all();
        self.stats.invalidated += removed as u64;
        removed
    }

    pub fn invalidate_bucket(&mut self, bucket: BucketId) -> usize {
        let removed = self.cache.invalidate_bucket(bucket);
        self.stats.invalidated += removed as u64;
        removed
    }

    /// Release surfaces retired since the last call. Call once per frame,
    /// after the composite pass has been issued.
    pub fn drain_pending_disposal(&mut self) -> usize {
        self.cache.drain_pending_disposal()
    }

    /// Whether the last viewport pass skipped prefetch renders for budget.
    pub fn has_deferred_prefetch(&self) -> bool {
        self.deferred_prefetch
    }

    pub fn stats(&self) -> TileStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = TileStats::default();
    }

    pub fn cache(&self) -> &TileCache<R::Surface> {
        &self.cache
    }

    pub fn policy(&self) -> &ZoomPolicy {
        &self.policy
    }

    pub fn config(&self) -> &TileConfig {
        &self.config
    }

    /// Replace the configuration. Every cached tile is dropped.
    pub fn set_config(&mut self, config: TileConfig) -> Result<()> {
        config.validate()?;
        self.policy = config.zoom_policy()?;
        self.addressing = TileAddressing::new(config.tile_size);
        self.invalidate_all();
        self.cache.set_capacity(config.cache_capacity());
        self.config = config;
        Ok(())
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Mutable access to the renderer. Invalidate anything it now draws differently.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    fn resolve(
        &mut self,
        layout: &SheetLayout,
        key: TileKey,
        bucket: &ZoomBucket,
        prefetch: bool,
        budget: &mut Option<u32>,
    ) -> TileContent<R::Surface> {
        if let Some(entry) = self.cache.get(&key) {
            trace!(x = key.x, y = key.y, bucket = key.bucket.0, "tile cache hit");
            self.stats.hits += 1;
            return TileContent::Ready(Arc::clone(entry.surface()));
        }
        trace!(x = key.x, y = key.y, bucket = key.bucket.0, "tile cache miss");
        self.stats.misses += 1;

        if prefetch {
            match budget {
                Some(0) => {
                    self.deferred_prefetch = true;
                    return TileContent::Deferred;
                }
                Some(remaining) => *remaining -= 1,
                None => {}
            }
        }

        let cells = self.addressing.footprint(layout, key, bucket);
        let request = TileRequest {
            key,
            bucket: *bucket,
            sheet_rect: self.addressing.tile_rect(key.x, key.y, bucket),
            cells,
            raster_size: self.config.tile_size,
            raster_scale: 1.0 / bucket.coverage,
            layout,
        };
        match self.renderer.render_tile(&request) {
            Ok(surface) => {
                self.stats.renders += 1;
                let surface = Arc::new(surface);
                let evicted_before = self.cache.evicted_total();
                self.cache
                    .insert(key, TileEntry::from_shared(Arc::clone(&surface), cells));
                self.stats.evictions += self.cache.evicted_total() - evicted_before;
                TileContent::Ready(surface)
            }
            Err(source) => {
                self.stats.failures += 1;
                let err = TileError::Render { key, source };
                debug!(x = key.x, y = key.y, bucket = key.bucket.0, error = %err, "tile render failed");
                TileContent::Failed(err)
            }
        }
    }
}

/// Lazy, row-major stream of tiles for one frame.
///
/// Holds the manager mutably; drop it before invalidating or draining.
pub struct ViewportTiles<'m, 'l, R: TileRenderer> {
    manager: &'m mut TileManager<R>,
    layout: &'l SheetLayout,
    bucket: ZoomBucket,
    span: Option<TileSpan>,
    visible: Option<TileSpan>,
    cursor: Option<(i32, i32)>,
    view_origin: Point,
    zoom: f64,
    prefetch_budget: Option<u32>,
}

impl<R: TileRenderer> ViewportTiles<'_, '_, R> {
    /// Zoom bucket this frame renders at.
    pub fn bucket(&self) -> &ZoomBucket {
        &self.bucket
    }

    /// Grid span being enumerated, prefetch ring included.
    pub fn span(&self) -> Option<TileSpan> {
        self.span
    }

    fn advance(&mut self) -> Option<(i32, i32)> {
        let span = self.span?;
        let (x, y) = self.cursor?;
        self.cursor = if x < span.x1 {
            Some((x + 1, y))
        } else if y < span.y1 {
            Some((span.x0, y + 1))
        } else {
            None
        };
        Some((x, y))
    }
}

impl<R: TileRenderer> Iterator for ViewportTiles<'_, '_, R> {
    type Item = PlacedTile<R::Surface>;

    fn next(&mut self) -> Option<Self::Item> {
        let (x, y) = self.advance()?;
        let key = TileKey::new(x, y, self.bucket.id);
        let prefetch = !self.visible.is_some_and(|v| v.contains(x, y));
        let sheet_rect = self.manager.addressing.tile_rect(x, y, &self.bucket);
        let content = self.manager.resolve(
            self.layout,
            key,
            &self.bucket,
            prefetch,
            &mut self.prefetch_budget,
        );
        Some(PlacedTile {
            key,
            sheet_rect,
            screen_origin: Point::new(
                (sheet_rect.left - self.view_origin.x) * self.zoom,
                (sheet_rect.top - self.view_origin.y) * self.zoom,
            ),
            screen_size: sheet_rect.width * self.zoom,
            prefetch,
            content,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match (self.span, self.cursor) {
            (Some(span), Some((x, y))) => {
                let width = i64::from(span.x1) - i64::from(span.x0) + 1;
                let rows_after = i64::from(span.y1) - i64::from(y);
                let in_row = i64::from(span.x1) - i64::from(x) + 1;
                usize::try_from(rows_after * width + in_row).unwrap_or(usize::MAX)
            }
            _ => 0,
        };
        (remaining, Some(remaining))
    }
}
