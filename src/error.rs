//! Structured error types for xltiles.

use crate::tiles::TileKey;

/// Boxed error returned by an injected render callback.
pub type BoxedRenderError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// All errors that can occur in the tile engine.
#[derive(Debug, thiserror::Error)]
pub enum TileError {
    /// The render callback failed for a single tile.
    #[error("Render failed for tile ({}, {}) in bucket {}: {source}", .key.x, .key.y, .key.bucket.0)]
    Render {
        key: TileKey,
        #[source]
        source: BoxedRenderError,
    },

    /// Invalid configuration (zoom buckets, capacity, tile size).
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// JSON configuration could not be parsed.
    #[error("JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid cell reference.
    #[error("Invalid cell reference: {0}")]
    CellRef(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TileError>;

#[cfg(target_arch = "wasm32")]
impl From<TileError> for wasm_bindgen::JsValue {
    fn from(e: TileError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
