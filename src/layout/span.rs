//! Cumulative-size index over one axis of the grid.
//!
//! A [`SpanSequence`] stores a default size plus sparse overrides, and derives
//! the cumulative start position of every span lazily. Writes only drop the
//! derived array; the next read rebuilds it in a single O(n) pass, so a batch
//! of resizes costs one rebuild rather than one per write.

use std::cell::OnceCell;
use std::collections::{HashMap, HashSet};

/// Per-axis index of `count` ordered spans (rows or columns).
#[derive(Debug, Clone)]
pub struct SpanSequence {
    count: u32,
    default_size: f64,
    /// Explicit sizes by index
    overrides: HashMap<u32, f64>,
    /// Hidden spans measure 0 but keep their override
    hidden: HashSet<u32>,
    /// `positions[i]` = start of span i; `positions[count]` = total size
    positions: OnceCell<Vec<f64>>,
}

/// Sizes must be finite and non-negative. Anything else is a caller bug;
/// release builds treat it as zero.
fn sanitize_size(size: f64) -> f64 {
    debug_assert!(
        size.is_finite() && size >= 0.0,
        "span sizes must be finite and non-negative; got {size}"
    );
    if size.is_finite() && size > 0.0 {
        size
    } else {
        0.0
    }
}

fn to_index(i: usize) -> u32 {
    u32::try_from(i).unwrap_or(u32::MAX)
}

impl SpanSequence {
    /// Create a sequence of `count` spans, all `default_size` long.
    pub fn new(count: u32, default_size: f64) -> Self {
        Self {
            count,
            default_size: sanitize_size(default_size),
            overrides: HashMap::new(),
            hidden: HashSet::new(),
            positions: OnceCell::new(),
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn default_size(&self) -> f64 {
        self.default_size
    }

    /// Size of span `i`. Undefined (but non-panicking) for `i >= count`.
    pub fn size_at(&self, i: u32) -> f64 {
        debug_assert!(i < self.count, "span index {i} out of range 0..{}", self.count);
        if self.hidden.contains(&i) {
            return 0.0;
        }
        self.overrides.get(&i).copied().unwrap_or(self.default_size)
    }

    /// Start offset of span `i`. `position_at(count)` is the total size.
    pub fn position_at(&self, i: u32) -> f64 {
        debug_assert!(i <= self.count, "position index {i} out of range 0..={}", self.count);
        let positions = self.positions();
        let clamped = i.min(self.count) as usize;
        positions.get(clamped).copied().unwrap_or(0.0)
    }

    pub fn total_size(&self) -> f64 {
        self.positions().last().copied().unwrap_or(0.0)
    }

    /// Index of the span containing `p`.
    ///
    /// Positions before the start clamp to 0 and positions at or past the end
    /// clamp to `count - 1`. Zero-size spans never contain a position, so when
    /// several spans start at `p` the first one with a non-zero size wins.
    pub fn index_at_position(&self, p: f64) -> u32 {
        if self.count == 0 || p.is_nan() || p < 0.0 {
            return 0;
        }
        if p >= self.total_size() {
            return self.count - 1;
        }
        let starts = self.starts();
        let after = starts.partition_point(|&pos| pos <= p);
        to_index(after.saturating_sub(1))
    }

    /// Inclusive index range touched by the half-open interval `[start, end)`.
    ///
    /// Unlike `index_at_position(end)`, a span beginning exactly at `end` is
    /// not included.
    pub fn index_range(&self, start: f64, end: f64) -> (u32, u32) {
        let first = self.index_at_position(start);
        if self.count == 0 || end.is_nan() || end <= start {
            return (first, first);
        }
        let starts = self.starts();
        let before_end = starts.partition_point(|&pos| pos < end);
        let last = to_index(before_end.saturating_sub(1))
            .min(self.count - 1)
            .max(first);
        (first, last)
    }

    /// Inclusive range of spans visible in a viewport.
    pub fn visible_range(&self, scroll_offset: f64, viewport_size: f64) -> (u32, u32) {
        let first = self.index_at_position(scroll_offset);
        let last = self.index_at_position(scroll_offset + viewport_size.max(0.0));
        (first, last.max(first))
    }

    /// Override the size of span `i`.
    pub fn set_size(&mut self, i: u32, size: f64) {
        debug_assert!(i < self.count, "span index {i} out of range 0..{}", self.count);
        if i >= self.count {
            return;
        }
        self.overrides.insert(i, sanitize_size(size));
        self.invalidate();
    }

    /// Apply several overrides with a single rebuild on the next read.
    pub fn set_sizes<I>(&mut self, sizes: I)
    where
        I: IntoIterator<Item = (u32, f64)>,
    {
        for (i, size) in sizes {
            debug_assert!(i < self.count, "span index {i} out of range 0..{}", self.count);
            if i < self.count {
                self.overrides.insert(i, sanitize_size(size));
            }
        }
        self.invalidate();
    }

    /// Drop the override for span `i`, restoring the default size.
    pub fn reset_size(&mut self, i: u32) {
        if self.overrides.remove(&i).is_some() {
            self.invalidate();
        }
    }

    /// Hide or show span `i`. Hidden spans measure zero.
    pub fn set_hidden(&mut self, i: u32, hidden: bool) {
        debug_assert!(i < self.count, "span index {i} out of range 0..{}", self.count);
        if i >= self.count {
            return;
        }
        let changed = if hidden {
            self.hidden.insert(i)
        } else {
            self.hidden.remove(&i)
        };
        if changed {
            self.invalidate();
        }
    }

    pub fn is_hidden(&self, i: u32) -> bool {
        self.hidden.contains(&i)
    }

    fn invalidate(&mut self) {
        self.positions.take();
    }

    fn positions(&self) -> &[f64] {
        self.positions.get_or_init(|| self.rebuild())
    }

    /// Start positions only (without the trailing total).
    fn starts(&self) -> &[f64] {
        let positions = self.positions();
        positions.get(..self.count as usize).unwrap_or(positions)
    }

    fn rebuild(&self) -> Vec<f64> {
        let mut positions = Vec::with_capacity(self.count as usize + 1);
        let mut pos = 0.0;
        for i in 0..self.count {
            positions.push(pos);
            pos += self.size_at(i);
        }
        positions.push(pos); // Final edge
        positions
    }
}
