//! Tile engine configuration.
//!
//! Hosts usually pass configuration as JSON from JavaScript:
//!
//! ```json
//! {
//!   "tileSize": 256,
//!   "maxCachedTiles": 100,
//!   "prefetchRings": 1,
//!   "zoomBuckets": [
//!     { "minZoom": 0.1, "maxZoom": 1.0, "multiplier": 2.0, "showGridlines": false, "showText": false },
//!     { "minZoom": 1.0, "maxZoom": 4.0, "multiplier": 1.0, "showGridlines": true, "showText": true }
//!   ]
//! }
//! ```
//!
//! Every field is optional and falls back to [`TileConfig::default`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TileError};
use crate::tiles::{ZoomBucketConfig, ZoomPolicy, DEFAULT_ZOOM_BUCKETS};

pub const DEFAULT_TILE_SIZE: u32 = 256;
pub const DEFAULT_MAX_CACHED_TILES: u32 = 100;
pub const DEFAULT_PREFETCH_RINGS: u32 = 1;

/// Tunables for the tile manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TileConfig {
    /// Tile edge length in raster pixels
    pub tile_size: u32,
    pub max_cached_tiles: u32,
    /// Extra rings of tiles rendered around the visible area
    pub prefetch_rings: u32,
    /// Per-frame cap on new renders for prefetch-only tiles; `None` is unlimited
    pub max_prefetch_renders: Option<u32>,
    pub zoom_buckets: Vec<ZoomBucketConfig>,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            max_cached_tiles: DEFAULT_MAX_CACHED_TILES,
            prefetch_rings: DEFAULT_PREFETCH_RINGS,
            max_prefetch_renders: None,
            zoom_buckets: DEFAULT_ZOOM_BUCKETS.to_vec(),
        }
    }
}

impl TileConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: TileConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field, returning the first problem found.
    pub fn validate(&self) -> Result<()> {
        let outcome = self.check();
        if let Err(err) = &outcome {
            debug!(error = %err, "rejected tile configuration");
        }
        outcome
    }

    /// Build the zoom policy described by `zoom_buckets`.
    pub fn zoom_policy(&self) -> Result<ZoomPolicy> {
        ZoomPolicy::new(&self.zoom_buckets)
    }

    /// Cache capacity as a collection size.
    pub fn cache_capacity(&self) -> usize {
        usize::try_from(self.max_cached_tiles).unwrap_or(usize::MAX)
    }

    fn check(&self) -> Result<()> {
        if self.tile_size == 0 {
            return Err(TileError::Config("tileSize must be positive".into()));
        }
        if self.max_cached_tiles == 0 {
            return Err(TileError::Config("maxCachedTiles must be positive".into()));
        }
        self.zoom_policy().map(|_| ())
    }
}
