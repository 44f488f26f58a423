//! Zoom bucketing.
//!
//! Continuous zoom factors are grouped into a handful of buckets. Tiles are
//! rendered once per bucket and scaled uniformly at paint time, so zooming
//! within a bucket reuses every cached tile.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TileError};

/// Tolerance when checking that consecutive buckets share an edge.
const EDGE_EPSILON: f64 = 1e-9;

/// Stable identifier of a bucket: its position in the policy's ordered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BucketId(pub u8);

/// How much detail tiles in a bucket carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DetailLevel {
    /// Fills only; non-empty cells drawn as solid blocks.
    Blocks,
    /// Fills and gridlines.
    Grid,
    /// Fills and text, no gridlines.
    Text,
    /// Everything.
    Full,
}

impl DetailLevel {
    pub fn from_flags(show_gridlines: bool, show_text: bool) -> Self {
        match (show_gridlines, show_text) {
            (false, false) => Self::Blocks,
            (true, false) => Self::Grid,
            (false, true) => Self::Text,
            (true, true) => Self::Full,
        }
    }

    pub fn show_gridlines(self) -> bool {
        matches!(self, Self::Grid | Self::Full)
    }

    pub fn show_text(self) -> bool {
        matches!(self, Self::Text | Self::Full)
    }
}

/// Configured shape of one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoomBucketConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Tile edge in sheet pixels = `tile_size * multiplier`
    #[serde(alias = "tileCoverageMultiplier")]
    pub multiplier: f64,
    pub show_gridlines: bool,
    pub show_text: bool,
}

impl ZoomBucketConfig {
    pub const fn new(
        min_zoom: f64,
        max_zoom: f64,
        multiplier: f64,
        show_gridlines: bool,
        show_text: bool,
    ) -> Self {
        Self {
            min_zoom,
            max_zoom,
            multiplier,
            show_gridlines,
            show_text,
        }
    }
}

/// Default tiers covering 10%..400%.
pub const DEFAULT_ZOOM_BUCKETS: [ZoomBucketConfig; 4] = [
    ZoomBucketConfig::new(0.10, 0.35, 4.0, false, false),
    ZoomBucketConfig::new(0.35, 0.75, 2.0, true, false),
    ZoomBucketConfig::new(0.75, 1.50, 1.0, true, true),
    ZoomBucketConfig::new(1.50, 4.00, 0.5, true, true),
];

/// A resolved zoom tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomBucket {
    pub id: BucketId,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub coverage: f64,
    pub detail: DetailLevel,
}

impl ZoomBucket {
    /// Stand-in for an empty policy; never produced by a validated one.
    const UNIT: ZoomBucket = ZoomBucket {
        id: BucketId(0),
        min_zoom: 1.0,
        max_zoom: 1.0,
        coverage: 1.0,
        detail: DetailLevel::Full,
    };

    pub fn show_gridlines(&self) -> bool {
        self.detail.show_gridlines()
    }

    pub fn show_text(&self) -> bool {
        self.detail.show_text()
    }

    /// Half-open membership test `[min_zoom, max_zoom)`.
    pub fn contains(&self, zoom: f64) -> bool {
        zoom >= self.min_zoom && zoom < self.max_zoom
    }
}

/// Ordered, contiguous set of zoom buckets.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomPolicy {
    buckets: Vec<ZoomBucket>,
}

impl Default for ZoomPolicy {
    fn default() -> Self {
        Self {
            buckets: DEFAULT_ZOOM_BUCKETS
                .iter()
                .zip((0..=u8::MAX).map(BucketId))
                .map(|(cfg, id)| resolve(cfg, id))
                .collect(),
        }
    }
}

fn resolve(cfg: &ZoomBucketConfig, id: BucketId) -> ZoomBucket {
    ZoomBucket {
        id,
        min_zoom: cfg.min_zoom,
        max_zoom: cfg.max_zoom,
        coverage: cfg.multiplier,
        detail: DetailLevel::from_flags(cfg.show_gridlines, cfg.show_text),
    }
}

impl ZoomPolicy {
    /// Validate and build a policy from an ordered bucket list.
    ///
    /// Buckets must be non-empty, each `min < max` with a positive finite
    /// multiplier, and each bucket must start exactly where the previous ends.
    pub fn new(configs: &[ZoomBucketConfig]) -> Result<Self> {
        if configs.is_empty() {
            return Err(TileError::Config("at least one zoom bucket is required".into()));
        }

        let mut buckets: Vec<ZoomBucket> = Vec::with_capacity(configs.len());
        for (index, cfg) in configs.iter().enumerate() {
            let id = u8::try_from(index).map_err(|_| {
                TileError::Config(format!(
                    "too many zoom buckets: {} (at most {})",
                    configs.len(),
                    usize::from(u8::MAX) + 1
                ))
            })?;
            let finite = cfg.min_zoom.is_finite()
                && cfg.max_zoom.is_finite()
                && cfg.multiplier.is_finite();
            if !finite || cfg.min_zoom <= 0.0 || cfg.multiplier <= 0.0 {
                return Err(TileError::Config(format!(
                    "bucket {id}: zoom bounds and multiplier must be positive and finite"
                )));
            }
            if cfg.min_zoom >= cfg.max_zoom {
                return Err(TileError::Config(format!(
                    "bucket {id}: min zoom {} must be below max zoom {}",
                    cfg.min_zoom, cfg.max_zoom
                )));
            }
            let mut bucket = resolve(cfg, BucketId(id));
            if let Some(prev) = buckets.last() {
                if (prev.max_zoom - cfg.min_zoom).abs() > EDGE_EPSILON {
                    return Err(TileError::Config(format!(
                        "bucket {id} starts at {} but bucket {} ends at {}",
                        cfg.min_zoom, prev.id.0, prev.max_zoom
                    )));
                }
                // Share the exact edge so no zoom value falls in a rounding gap.
                bucket.min_zoom = prev.max_zoom;
            }
            buckets.push(bucket);
        }
        Ok(Self { buckets })
    }

    pub fn buckets(&self) -> &[ZoomBucket] {
        &self.buckets
    }

    pub fn bucket(&self, id: BucketId) -> Option<ZoomBucket> {
        self.buckets.get(usize::from(id.0)).copied()
    }

    /// Supported zoom domain `(min, max)`.
    pub fn zoom_range(&self) -> (f64, f64) {
        let min = self.buckets.first().map_or(1.0, |b| b.min_zoom);
        let max = self.buckets.last().map_or(1.0, |b| b.max_zoom);
        (min, max)
    }

    /// Bucket for a zoom factor. Total: out-of-domain zooms clamp to the
    /// nearest bucket, NaN is treated as 100%.
    pub fn bucket_for(&self, zoom: f64) -> ZoomBucket {
        let (min, max) = self.zoom_range();
        let zoom = if zoom.is_nan() { 1.0 } else { zoom }.clamp(min, max);
        self.buckets
            .iter()
            .find(|b| zoom < b.max_zoom)
            .or_else(|| self.buckets.last())
            .copied()
            .unwrap_or(ZoomBucket::UNIT)
    }
}
