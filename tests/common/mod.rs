//! Shared helpers for the tile engine integration tests.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use std::cell::RefCell;
use std::rc::Rc;

use xltiles::cell_ref::CellRange;
use xltiles::layout::SheetLayout;
use xltiles::render::{from_fn, TileRenderer, TileRequest};
use xltiles::tiles::{TileKey, TileManager};
use xltiles::TileConfig;

/// 1000 rows × 100 columns at 20px × 64px.
pub fn uniform_layout() -> SheetLayout {
    SheetLayout::new(1000, 100, 20.0, 64.0)
}

/// Surface recording what a tile was rendered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamp {
    pub key: TileKey,
    pub cells: CellRange,
}

/// Renderer that stamps each tile and logs every call.
pub fn stamping_renderer(
    log: Rc<RefCell<Vec<TileKey>>>,
) -> impl TileRenderer<Surface = Stamp> {
    from_fn(move |request: &TileRequest<'_>| {
        log.borrow_mut().push(request.key);
        Ok::<_, String>(Stamp {
            key: request.key,
            cells: request.cells,
        })
    })
}

/// Manager with a stamping renderer plus the shared render log.
pub fn stamping_manager(
    config: TileConfig,
) -> (TileManager<impl TileRenderer<Surface = Stamp>>, Rc<RefCell<Vec<TileKey>>>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let manager = TileManager::new(config, stamping_renderer(Rc::clone(&log))).unwrap();
    (manager, log)
}

/// Default configuration without a prefetch ring.
pub fn visible_only() -> TileConfig {
    TileConfig {
        prefetch_rings: 0,
        ..TileConfig::default()
    }
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
