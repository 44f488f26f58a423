//! Tile manager tests: frame planning, cache reuse, invalidation, budgets.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use std::collections::HashMap;

use common::{stamping_manager, uniform_layout, visible_only, Stamp};
use xltiles::cell_ref::{CellCoord, CellRange};
use xltiles::layout::{Point, Rect, Viewport};
use xltiles::render::{DisplayListRenderer, DrawCommand};
use xltiles::tiles::{BucketId, PlacedTile, TileContent, TileKey, TileManager, TileStats};
use xltiles::TileConfig;

#[test]
fn frame_is_row_major_with_prefetch_ring() {
    let layout = uniform_layout();
    let (mut tiles, log) = stamping_manager(TileConfig::default());
    let frame: Vec<_> = tiles
        .tiles_for_viewport(&layout, Rect::new(300.0, 300.0, 400.0, 200.0), 1.0, 1)
        .collect();

    // Visible tiles x 1..=2, y 1..=1; ring adds one tile on every side.
    let positions: Vec<(i32, i32)> = frame.iter().map(|t| (t.key.x, t.key.y)).collect();
    let expected: Vec<(i32, i32)> = (0..=2)
        .flat_map(|y| (0..=3).map(move |x| (x, y)))
        .collect();
    assert_eq!(positions, expected);
    let visible: Vec<(i32, i32)> = frame
        .iter()
        .filter(|t| !t.prefetch)
        .map(|t| (t.key.x, t.key.y))
        .collect();
    assert_eq!(visible, vec![(1, 1), (2, 1)]);
    assert_eq!(log.borrow().len(), 12);
}

#[test]
fn cached_tiles_are_reused_within_a_bucket() {
    let layout = uniform_layout();
    let (mut tiles, log) = stamping_manager(visible_only());
    let view = Rect::new(0.0, 0.0, 500.0, 500.0);
    tiles.tiles_for_viewport(&layout, view, 0.8, 0).for_each(drop);
    let rendered = log.borrow().len();
    tiles.tiles_for_viewport(&layout, view, 1.4, 0).for_each(drop);
    assert_eq!(log.borrow().len(), rendered);
    assert_eq!(tiles.stats().hits, 4);

    // Crossing into the next bucket renders new tiles.
    tiles.tiles_for_viewport(&layout, view, 1.6, 0).for_each(drop);
    assert!(log.borrow().len() > rendered);
    assert!(log.borrow().iter().any(|k| k.bucket == BucketId(3)));
}

#[test]
fn surfaces_carry_their_footprint() {
    let layout = uniform_layout();
    let (mut tiles, _log) = stamping_manager(visible_only());
    let frame: Vec<_> = tiles
        .tiles_for_viewport(&layout, Rect::new(0.0, 0.0, 100.0, 100.0), 1.0, 0)
        .collect();
    let stamp = frame[0].content.surface().unwrap();
    assert_eq!(stamp.key, TileKey::new(0, 0, BucketId(2)));
    assert_eq!(stamp.cells, CellRange::new(0, 0, 12, 3));
    assert_eq!(frame[0].sheet_rect, Rect::new(0.0, 0.0, 256.0, 256.0));
}

#[test]
fn cell_edit_invalidates_only_touching_tiles() {
    let layout = uniform_layout();
    let (mut tiles, log) = stamping_manager(visible_only());
    let view = Rect::new(0.0, 0.0, 1024.0, 512.0);
    tiles.tiles_for_viewport(&layout, view, 1.0, 0).for_each(drop);
    tiles.tiles_for_viewport(&layout, view, 0.5, 0).for_each(drop);
    assert_eq!(tiles.cache().len(), 8 + 2);

    // Column E (index 4) row 13 sits in tile (1, 1) of the normal bucket
    // and tile (0, 0) of the half-zoom bucket.
    let removed = tiles.invalidate_cells(&layout, &CellRange::single(CellCoord::new(13, 4)));
    assert_eq!(removed, 2);
    assert!(!tiles.cache().contains_key(&TileKey::new(1, 1, BucketId(2))));
    assert!(!tiles.cache().contains_key(&TileKey::new(0, 0, BucketId(1))));

    log.borrow_mut().clear();
    tiles.tiles_for_viewport(&layout, view, 1.0, 0).for_each(drop);
    assert_eq!(*log.borrow(), vec![TileKey::new(1, 1, BucketId(2))]);
}

#[test]
fn geometry_change_then_invalidate_all() {
    let mut layout = uniform_layout();
    let (mut tiles, _log) = stamping_manager(visible_only());
    let view = Rect::new(0.0, 0.0, 100.0, 100.0);
    tiles.tiles_for_viewport(&layout, view, 1.0, 0).for_each(drop);

    layout.set_col_width(0, 256.0);
    assert_eq!(tiles.invalidate_all(), 1);
    let frame: Vec<_> = tiles.tiles_for_viewport(&layout, view, 1.0, 0).collect();
    assert_eq!(
        frame[0].content.surface().unwrap().cells,
        CellRange::new(0, 0, 12, 0)
    );
    assert_eq!(tiles.drain_pending_disposal(), 1);
}

#[test]
fn small_cache_still_serves_whole_frame() {
    let layout = uniform_layout();
    let (mut tiles, _log) = stamping_manager(TileConfig {
        max_cached_tiles: 3,
        prefetch_rings: 0,
        ..TileConfig::default()
    });
    let frame: Vec<_> = tiles
        .tiles_for_viewport(&layout, Rect::new(0.0, 0.0, 1024.0, 512.0), 1.0, 0)
        .collect();
    assert_eq!(frame.len(), 8);
    assert!(frame.iter().all(|t| t.content.is_ready()));
    assert_eq!(tiles.cache().len(), 3);
    assert_eq!(tiles.stats().evictions, 5);
    drop(frame);
    assert_eq!(tiles.drain_pending_disposal(), 5);
}

fn deferred(frame: &[PlacedTile<Stamp>]) -> usize {
    frame
        .iter()
        .filter(|t| matches!(t.content, TileContent::Deferred))
        .count()
}

#[test]
fn prefetch_budget_spreads_work_over_frames() {
    let layout = uniform_layout();
    let (mut tiles, _log) = stamping_manager(TileConfig {
        max_prefetch_renders: Some(4),
        ..TileConfig::default()
    });
    let view = Rect::new(300.0, 300.0, 100.0, 100.0);

    let first: Vec<_> = tiles.tiles_for_viewport(&layout, view, 1.0, 1).collect();
    assert_eq!(deferred(&first), 4);
    assert!(tiles.has_deferred_prefetch());

    let second: Vec<_> = tiles.tiles_for_viewport(&layout, view, 1.0, 1).collect();
    assert_eq!(deferred(&second), 0);
    assert!(!tiles.has_deferred_prefetch());
    assert_eq!(tiles.stats().renders, 9);
}

#[test]
fn iteration_is_lazy() {
    let layout = uniform_layout();
    let (mut tiles, log) = stamping_manager(TileConfig::default());
    let mut frame = tiles.tiles_for_viewport(&layout, Rect::new(0.0, 0.0, 800.0, 600.0), 1.0, 1);
    assert_eq!(frame.size_hint(), (20, Some(20)));
    let first = frame.next().unwrap();
    assert_eq!(first.key, TileKey::new(0, 0, BucketId(2)));
    assert_eq!(frame.size_hint(), (19, Some(19)));
    drop(frame);
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn placement_follows_viewport() {
    let layout = uniform_layout();
    let (mut tiles, _log) = stamping_manager(visible_only());
    let mut viewport = Viewport::new();
    viewport.resize(400.0, 300.0);
    viewport.zoom_at(Point::new(0.0, 0.0), 0.5, tiles.policy().zoom_range(), &layout);
    viewport.set_scroll(100.0, 0.0, &layout);

    let frame: Vec<_> = tiles.tiles_for(&layout, &viewport).collect();
    // Zoom 0.5 uses 512-pixel tiles; the first one starts 100 sheet pixels left of the view.
    assert_eq!(frame[0].key, TileKey::new(0, 0, BucketId(1)));
    assert_eq!(frame[0].screen_origin, Point::new(-50.0, 0.0));
    assert_eq!(frame[0].screen_size, 256.0);
    assert_eq!(frame.len(), 4);
}

#[test]
fn set_config_replaces_policy_and_cache() {
    let layout = uniform_layout();
    let (mut tiles, _log) = stamping_manager(TileConfig::default());
    tiles
        .tiles_for_viewport(&layout, Rect::new(0.0, 0.0, 800.0, 600.0), 1.0, 1)
        .for_each(drop);
    assert!(!tiles.cache().is_empty());

    let config = TileConfig::from_json(
        r#"{"tileSize": 512, "zoomBuckets": [
            {"minZoom": 0.1, "maxZoom": 5.0, "multiplier": 1.0, "showGridlines": true, "showText": true}
        ]}"#,
    )
    .unwrap();
    tiles.set_config(config).unwrap();
    assert!(tiles.cache().is_empty());
    assert_eq!(tiles.policy().buckets().len(), 1);

    let keys: Vec<TileKey> = tiles
        .tiles_for_viewport(&layout, Rect::new(0.0, 0.0, 800.0, 600.0), 3.0, 0)
        .map(|t| t.key)
        .collect();
    assert_eq!(keys.len(), 4);
    assert!(keys.iter().all(|k| k.bucket == BucketId(0)));

    let bad = TileConfig {
        tile_size: 0,
        ..TileConfig::default()
    };
    assert!(tiles.set_config(bad).is_err());
    assert_eq!(tiles.config().tile_size, 512);
}

#[test]
fn stats_reset() {
    let layout = uniform_layout();
    let (mut tiles, _log) = stamping_manager(visible_only());
    let view = Rect::new(0.0, 0.0, 100.0, 100.0);
    tiles.tiles_for_viewport(&layout, view, 1.0, 0).for_each(drop);
    tiles.tiles_for_viewport(&layout, view, 1.0, 0).for_each(drop);
    let stats = tiles.stats();
    assert_eq!((stats.hits, stats.misses, stats.renders), (1, 1, 1));
    tiles.invalidate_bucket(BucketId(2));
    assert_eq!(tiles.stats().invalidated, 1);
    tiles.reset_stats();
    assert_eq!(tiles.stats(), TileStats::default());
}

#[test]
fn display_list_renderer_end_to_end() {
    let layout = uniform_layout();
    let mut data = HashMap::new();
    data.insert(CellCoord::new(0, 0), "Revenue".to_string());
    let mut tiles: TileManager<DisplayListRenderer<HashMap<CellCoord, String>>> =
        TileManager::new(visible_only(), DisplayListRenderer::new(data)).unwrap();

    let view = Rect::new(0.0, 0.0, 100.0, 100.0);
    let text_in_first_tile = |zoom: f64, tiles: &mut TileManager<DisplayListRenderer<HashMap<CellCoord, String>>>| {
        let frame: Vec<_> = tiles.tiles_for_viewport(&layout, view, zoom, 0).collect();
        frame[0]
            .content
            .surface()
            .unwrap()
            .commands()
            .iter()
            .any(|c| matches!(c, DrawCommand::Text { text, .. } if text == "Revenue"))
    };
    assert!(text_in_first_tile(1.0, &mut tiles));
    assert!(!text_in_first_tile(0.2, &mut tiles));

    tiles
        .renderer_mut()
        .source_mut()
        .insert(CellCoord::new(0, 0), "Cost".to_string());
    tiles.invalidate_cells(&layout, &CellRange::single(CellCoord::new(0, 0)));
    assert!(!text_in_first_tile(1.0, &mut tiles));
}
