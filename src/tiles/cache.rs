//! Capacity-bounded store of rendered tiles.
//!
//! The cache never renders; it only holds surfaces produced elsewhere.
//! Surfaces leaving the cache (eviction, overwrite, invalidation) are parked
//! on a disposal list instead of being dropped, because the compositor may
//! still be drawing them this frame. The host releases them with
//! [`TileCache::drain_pending_disposal`] once the frame has been issued.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::cell_ref::CellRange;

use super::addressing::TileKey;
use super::zoom::BucketId;

/// One cached tile.
#[derive(Debug)]
pub struct TileEntry<S> {
    surface: Arc<S>,
    cell_range: CellRange,
    last_accessed: u64,
}

impl<S> TileEntry<S> {
    pub fn new(surface: S, cell_range: CellRange) -> Self {
        Self::from_shared(Arc::new(surface), cell_range)
    }

    pub fn from_shared(surface: Arc<S>, cell_range: CellRange) -> Self {
        Self {
            surface,
            cell_range,
            last_accessed: 0,
        }
    }

    pub fn surface(&self) -> &Arc<S> {
        &self.surface
    }

    /// Cells this tile was rendered from.
    pub fn cell_range(&self) -> &CellRange {
        &self.cell_range
    }

    /// Recency stamp; larger is more recent.
    pub fn last_accessed(&self) -> u64 {
        self.last_accessed
    }
}

/// LRU tile store keyed by [`TileKey`].
#[derive(Debug)]
pub struct TileCache<S> {
    entries: HashMap<TileKey, TileEntry<S>>,
    capacity: usize,
    /// Monotonic recency clock; every touch and insert takes a fresh stamp
    clock: u64,
    pending_disposal: Vec<Arc<S>>,
    evicted: u64,
}

impl<S> TileCache<S> {
    /// Create a cache holding at most `capacity` tiles.
    ///
    /// A capacity of 0 disables caching entirely.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            capacity,
            clock: 0,
            pending_disposal: Vec::new(),
            evicted: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the capacity, evicting least-recent tiles if now over it.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        while self.entries.len() > self.capacity {
            if !self.evict_lru() {
                break;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &TileKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Look up a tile and mark it most recently used.
    pub fn get(&mut self, key: &TileKey) -> Option<&TileEntry<S>> {
        let stamp = self.tick();
        let entry = self.entries.get_mut(key)?;
        entry.last_accessed = stamp;
        Some(entry)
    }

    /// Look up a tile without touching its recency.
    pub fn peek(&self, key: &TileKey) -> Option<&TileEntry<S>> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &TileKey> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TileKey, &TileEntry<S>)> {
        self.entries.iter()
    }

    /// Insert a tile, evicting the least recently used one if full.
    ///
    /// An existing entry under the same key is replaced; its surface goes
    /// to the disposal list like an evicted one.
    pub fn insert(&mut self, key: TileKey, mut entry: TileEntry<S>) {
        if self.capacity == 0 {
            return;
        }
        if let Some(old) = self.entries.remove(&key) {
            self.pending_disposal.push(old.surface);
        } else {
            while self.entries.len() >= self.capacity {
                if !self.evict_lru() {
                    break;
                }
            }
        }
        entry.last_accessed = self.tick();
        self.entries.insert(key, entry);
    }

    /// Remove every tile whose cells intersect `range`, in all buckets.
    pub fn invalidate_range(&mut self, range: &CellRange) -> usize {
        let removed = self.invalidate_where(|_, entry| entry.cell_range.intersects(range));
        debug!(%range, removed, "invalidated tiles by cell range");
        removed
    }

    /// Remove every tile rendered for `bucket`.
    pub fn invalidate_bucket(&mut self, bucket: BucketId) -> usize {
        let removed = self.invalidate_where(|key, _| key.bucket == bucket);
        debug!(bucket = bucket.0, removed, "invalidated tiles by bucket");
        removed
    }

    /// Remove every tile.
    pub fn invalidate_all(&mut self) -> usize {
        let removed = self.entries.len();
        self.pending_disposal
            .extend(self.entries.drain().map(|(_, entry)| entry.surface));
        debug!(removed, "invalidated all tiles");
        removed
    }

    /// Remove every tile matching `predicate`, returning how many went.
    pub fn invalidate_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&TileKey, &TileEntry<S>) -> bool,
    {
        let before = self.entries.len();
        let pending = &mut self.pending_disposal;
        self.entries.retain(|key, entry| {
            if predicate(key, entry) {
                pending.push(Arc::clone(&entry.surface));
                false
            } else {
                true
            }
        });
        before - self.entries.len()
    }

    /// Number of surfaces waiting for release.
    pub fn pending_disposal_len(&self) -> usize {
        self.pending_disposal.len()
    }

    /// Release every parked surface. Call once per frame, after compositing.
    pub fn drain_pending_disposal(&mut self) -> usize {
        let released = self.pending_disposal.len();
        self.pending_disposal.clear();
        released
    }

    /// Total tiles evicted for capacity since creation.
    pub fn evicted_total(&self) -> u64 {
        self.evicted
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn evict_lru(&mut self) -> bool {
        let Some(oldest) = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_accessed)
            .map(|(key, _)| *key)
        else {
            return false;
        };
        if let Some(entry) = self.entries.remove(&oldest) {
            debug!(
                x = oldest.x,
                y = oldest.y,
                bucket = oldest.bucket.0,
                last_accessed = entry.last_accessed,
                "evicting tile"
            );
            self.pending_disposal.push(entry.surface);
            self.evicted += 1;
        }
        true
    }
}
