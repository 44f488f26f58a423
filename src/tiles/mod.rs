//! Tile caching.
//!
//! This module provides:
//! - Zoom bucketing with per-bucket level of detail
//! - Tile grid addressing and cell footprints
//! - A capacity-bounded LRU tile cache with deferred disposal
//! - The per-frame tile manager

pub mod addressing;
pub mod cache;
pub mod manager;
pub mod zoom;

pub use addressing::{TileAddressing, TileKey, TileSpan};
pub use cache::{TileCache, TileEntry};
pub use manager::{PlacedTile, TileContent, TileManager, TileStats, ViewportTiles};
pub use zoom::{BucketId, DetailLevel, ZoomBucket, ZoomBucketConfig, ZoomPolicy, DEFAULT_ZOOM_BUCKETS};
