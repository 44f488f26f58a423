//! xltiles - tiled rendering geometry for large grids
//!
//! Keeps a spreadsheet-sized grid (up to ~1M rows × 16K columns) smooth to
//! scroll and zoom in the browser by spending bounded work per frame:
//! - Cumulative-size row/column index with O(log N) hit testing
//! - Zoom buckets with per-bucket level of detail
//! - LRU tile cache with cell-range invalidation and deferred disposal
//! - Per-frame tile planning with prefetch rings and a render budget
//!
//! # Usage (Rust)
//!
//! ```
//! use xltiles::layout::{Rect, SheetLayout};
//! use xltiles::render::{from_fn, TileRequest};
//! use xltiles::tiles::TileManager;
//!
//! let layout = SheetLayout::with_defaults(1_000, 100);
//! let renderer = from_fn(|request: &TileRequest<'_>| Ok::<_, String>(request.cells));
//! let mut tiles = TileManager::with_defaults(renderer);
//! let frame: Vec<_> = tiles
//!     .tiles_for_viewport(&layout, Rect::new(0.0, 0.0, 800.0, 600.0), 1.0, 1)
//!     .collect();
//! assert!(frame.iter().all(|tile| tile.content.is_ready()));
//! drop(frame);
//! tiles.drain_pending_disposal();
//! ```
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { GridView } from 'xltiles';
//! await init();
//! const view = new GridView(1000000, 16384);
//! view.resize(canvas.width, canvas.height);
//! view.render(ctx);
//! ```

pub mod cell_ref;
pub mod config;
pub mod error;
pub mod layout;
pub mod render;
pub mod tiles;
pub mod viewer;

use wasm_bindgen::prelude::*;

pub use config::TileConfig;
pub use error::{Result, TileError};
pub use viewer::GridView;

/// Get the library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
