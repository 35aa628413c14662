// Copyright 2026 the Lattice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cache-aware staggered layout.
//!
//! Placement is not symmetric: laying out items 0 to N will usually produce a
//! different arrangement than laying out N back to 0. The grid therefore
//! keeps a [`Location`] for every placement it has ever computed (within the
//! retained run), and replays those records when the window grows back over
//! previously evicted items, so a scroll away and back lands every item
//! exactly where it was. Only when the cache cannot answer (empty, out of
//! range, or contradicted by a fresh size report) does placement fall through
//! to the row-balancing algorithm in [`crate::placement`].

use core::fmt;
use core::num::NonZeroUsize;

use crate::cache::{Location, LocationCache};
use crate::grid::{GridCore, RowRanges, START_DEFAULT};
use crate::provider::Provider;

/// A multi-row staggered grid with a replayable placement cache.
pub struct StaggeredGrid<P: Provider> {
    pub(crate) core: GridCore<P>,
    pub(crate) cache: LocationCache,
    // An item whose size was fetched but whose cached placement turned out to
    // be stale; reused by the fallback placement within the same call.
    pending: Option<(P::Item, i32)>,
}

impl<P: Provider> StaggeredGrid<P> {
    /// Creates a staggered grid with `num_rows` rows driven by `provider`.
    #[must_use]
    pub fn new(num_rows: NonZeroUsize, provider: P) -> Self {
        Self {
            core: GridCore::new(provider, num_rows.get()),
            cache: LocationCache::new(),
            pending: None,
        }
    }

    /// Changes the row count, discarding per-row scratch. Cached placements
    /// keep their recorded rows; callers changing the row count of live
    /// content should invalidate as well.
    pub fn set_num_rows(&mut self, num_rows: NonZeroUsize) {
        self.core.set_num_rows(num_rows.get());
    }

    /// Index of the first item with a cached placement; negative if none.
    /// The cached run may start before the visible window.
    #[must_use]
    pub fn first_index(&self) -> i32 {
        self.cache.first_index()
    }

    /// Index of the last item with a cached placement; negative if none.
    #[must_use]
    pub fn last_index(&self) -> i32 {
        self.cache.last_index()
    }

    /// Number of cached placements.
    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Cached placement of an item. Pure lookup; never mutates.
    #[must_use]
    pub fn location(&self, index: i32) -> Option<&Location> {
        self.cache.location(index)
    }

    pub(crate) fn check_append_over_limit(&self, to_limit: i32) -> bool {
        if self.core.last_visible < 0 {
            return false;
        }
        let extreme = if self.core.reversed_flow {
            self.find_row_min_from(true, self.core.last_visible).edge
        } else {
            self.find_row_max_from(false, self.core.last_visible).edge
        };
        self.core.append_edge_over_limit(extreme, to_limit)
    }

    pub(crate) fn check_prepend_over_limit(&self, to_limit: i32) -> bool {
        if self.core.last_visible < 0 {
            return false;
        }
        let extreme = if self.core.reversed_flow {
            self.find_row_max_from(false, self.core.first_visible).edge
        } else {
            self.find_row_min_from(true, self.core.first_visible).edge
        };
        self.core.prepend_edge_over_limit(extreme, to_limit)
    }

    pub(crate) fn prepend_visible(&mut self, to_limit: i32, one_column_mode: bool) -> bool {
        if self.core.provider.count() == 0 {
            return false;
        }
        if !one_column_mode && self.check_prepend_over_limit(to_limit) {
            return false;
        }
        let filled = self.prepend_visible_items_with_cache(to_limit, one_column_mode)
            || self.prepend_visible_items_without_cache(to_limit, one_column_mode);
        self.pending = None;
        filled
    }

    pub(crate) fn append_visible(&mut self, to_limit: i32, one_column_mode: bool) -> bool {
        if self.core.provider.count() == 0 {
            return false;
        }
        if !one_column_mode && self.check_append_over_limit(to_limit) {
            return false;
        }
        let filled = self.append_visible_items_with_cache(to_limit, one_column_mode)
            || self.append_visible_items_without_cache(to_limit, one_column_mode);
        self.pending = None;
        filled
    }

    /// Replays cached placements backward from the window's leading edge.
    /// Returns true when the limit was reached; false means the caller should
    /// continue with the uncached algorithm.
    fn prepend_visible_items_with_cache(&mut self, to_limit: i32, one_column_mode: bool) -> bool {
        if self.cache.is_empty() {
            return false;
        }
        let mut edge;
        let mut offset;
        let mut item_index;
        if self.core.first_visible >= 0 {
            // Keep growing backward from the first visible item.
            edge = self.core.provider.edge(self.core.first_visible);
            offset = self.cache[self.core.first_visible].offset;
            item_index = self.core.first_visible - 1;
        } else {
            // Nothing visible; try to start inside the cached run.
            edge = i32::MAX;
            offset = 0;
            item_index = if self.core.start_index != START_DEFAULT {
                self.core.start_index
            } else {
                0
            };
            if item_index > self.last_index() || item_index < self.first_index() - 1 {
                // Start is not within or adjacent to the cached run; the
                // history is useless for it.
                self.cache.clear();
                return false;
            } else if item_index < self.first_index() {
                // Adjacent to the front of the run: fresh placement.
                return false;
            }
        }
        let first_index = self.core.provider.min_index().max(self.cache.first_index());
        while item_index >= first_index {
            let location = self.cache[item_index];
            let (item, size) = self.core.provider.create_item(item_index, false, false);
            if size != location.size {
                // The cached run up to here no longer matches the content.
                // Drop it and let the uncached path place this item.
                self.cache
                    .remove_from_start(item_index + 1 - self.cache.first_index());
                self.pending = Some((item, size));
                return false;
            }
            self.core.first_visible = item_index;
            if self.core.last_visible < 0 {
                self.core.last_visible = item_index;
            }
            self.core.provider.add_item(
                item,
                item_index,
                size,
                location.row,
                edge.saturating_sub(offset),
            );
            if !one_column_mode && self.check_prepend_over_limit(to_limit) {
                return true;
            }
            edge = self.core.provider.edge(item_index);
            offset = location.offset;
            // A column is complete once row 0 is reached.
            if location.row == 0 && one_column_mode {
                return true;
            }
            item_index -= 1;
        }
        false
    }

    /// Replays cached placements forward from the window's trailing edge.
    /// Returns true when the limit was reached; false means the caller should
    /// continue with the uncached algorithm.
    fn append_visible_items_with_cache(&mut self, to_limit: i32, one_column_mode: bool) -> bool {
        if self.cache.is_empty() {
            return false;
        }
        let count = self.core.provider.count();
        let mut edge;
        let mut item_index;
        if self.core.last_visible >= 0 {
            item_index = self.core.last_visible + 1;
            edge = self.core.provider.edge(self.core.last_visible);
        } else {
            edge = i32::MAX;
            item_index = if self.core.start_index != START_DEFAULT {
                self.core.start_index
            } else {
                0
            };
            if item_index > self.last_index() + 1 || item_index < self.first_index() {
                self.cache.clear();
                return false;
            } else if item_index > self.last_index() {
                // Adjacent to the back of the run: fresh placement.
                return false;
            }
        }
        let mut last_index = self.last_index();
        while item_index < count && item_index <= last_index {
            let location = self.cache[item_index];
            if edge != i32::MAX {
                edge += location.offset;
            }
            let (item, size) = self.core.provider.create_item(item_index, true, false);
            if size != location.size {
                // Content drifted. Keep this entry with the fresh size (its
                // row assignment still stands) and drop everything after it.
                if let Some(stale) = self.cache.location_mut(item_index) {
                    stale.size = size;
                }
                self.cache.remove_from_end(last_index - item_index);
                last_index = item_index;
            }
            self.core.last_visible = item_index;
            if self.core.first_visible < 0 {
                self.core.first_visible = item_index;
            }
            self.core
                .provider
                .add_item(item, item_index, size, location.row, edge);
            if !one_column_mode && self.check_append_over_limit(to_limit) {
                return true;
            }
            if edge == i32::MAX {
                edge = self.core.provider.edge(item_index);
            }
            // A column is complete once the last row is reached.
            if location.row == self.core.num_rows - 1 && one_column_mode {
                return true;
            }
            item_index += 1;
        }
        false
    }

    /// Offset for an item appended right after the cached run, derived from
    /// the run's own offset chain so the record stays replayable.
    fn calculate_offset_after_last_item(&self, row: usize) -> i32 {
        // Find the most recent cached item in the same row; fall back to the
        // last cached item.
        let mut cached_index = self.last_index();
        let mut found_in_same_row = false;
        while cached_index >= self.cache.first_index() {
            if self.cache[cached_index].row == row {
                found_in_same_row = true;
                break;
            }
            cached_index -= 1;
        }
        if !found_in_same_row {
            cached_index = self.last_index();
        }
        // The new item sits next to the cached one in its row, so the offsets
        // across (cached_index, new item] must sum to the cached item's size
        // plus spacing.
        let mut offset = if self.core.reversed_flow {
            -self.cache[cached_index].size - self.core.spacing
        } else {
            self.cache[cached_index].size + self.core.spacing
        };
        for i in cached_index + 1..=self.last_index() {
            offset -= self.cache[i].offset;
        }
        offset
    }

    /// Prepends one item with a brand-new [`Location`]. Only called from the
    /// uncached placement algorithm.
    ///
    /// # Panics
    ///
    /// Panics if the window and cache bounds disagree about where the next
    /// prepended item belongs; that means append/prepend calls were not
    /// issued in the incremental order the engine requires, and continuing
    /// would corrupt the cache.
    pub(crate) fn prepend_visible_item_to_row(
        &mut self,
        item_index: i32,
        row_index: usize,
        edge: i32,
    ) -> i32 {
        if self.core.first_visible >= 0 {
            assert!(
                self.core.first_visible == self.first_index()
                    && self.core.first_visible == item_index + 1,
                "prepend out of sequence: item {item_index} against window start {} and cached run start {}",
                self.core.first_visible,
                self.first_index(),
            );
        }
        let old_first = if self.core.first_visible >= 0 {
            Some((
                self.cache.first_index(),
                self.core.provider.edge(self.core.first_visible),
            ))
        } else {
            None
        };
        let (item, size) = match self.pending.take() {
            Some((item, size)) => (item, size),
            None => self.core.provider.create_item(item_index, false, false),
        };
        self.cache
            .push_front(item_index, Location::new(row_index, 0, size));
        self.core.first_visible = item_index;
        if self.core.last_visible < 0 {
            self.core.last_visible = item_index;
        }
        let this_edge = if self.core.reversed_flow {
            edge.saturating_add(size)
        } else {
            edge.saturating_sub(size)
        };
        if let Some((old_first_index, old_first_edge)) = old_first {
            if let Some(old_location) = self.cache.location_mut(old_first_index) {
                old_location.offset = old_first_edge - this_edge;
            }
        }
        self.core
            .provider
            .add_item(item, item_index, size, row_index, this_edge);
        size
    }

    /// Appends one item with a brand-new [`Location`]. Only called from the
    /// uncached placement algorithm.
    ///
    /// # Panics
    ///
    /// Panics if the window and cache bounds disagree about where the next
    /// appended item belongs; see
    /// [`prepend_visible_item_to_row`](Self::prepend_visible_item_to_row).
    pub(crate) fn append_visible_item_to_row(
        &mut self,
        item_index: i32,
        row_index: usize,
        edge: i32,
    ) -> i32 {
        if self.core.last_visible >= 0 {
            assert!(
                self.core.last_visible == self.last_index()
                    && self.core.last_visible == item_index - 1,
                "append out of sequence: item {item_index} against window end {} and cached run end {}",
                self.core.last_visible,
                self.last_index(),
            );
        }
        let offset = if self.core.last_visible < 0 {
            if !self.cache.is_empty() && item_index == self.last_index() + 1 {
                // Appending right after cached history: derive the offset so
                // a later cached prepend can walk back across the gap.
                self.calculate_offset_after_last_item(row_index)
            } else {
                0
            }
        } else {
            edge - self.core.provider.edge(self.core.last_visible)
        };
        let (item, size) = match self.pending.take() {
            Some((item, size)) => (item, size),
            None => self.core.provider.create_item(item_index, true, false),
        };
        self.cache
            .push_back(item_index, Location::new(row_index, offset, size));
        if self.cache.len() == 1 {
            self.core.first_visible = item_index;
            self.core.last_visible = item_index;
        } else if self.core.last_visible < 0 {
            self.core.first_visible = item_index;
            self.core.last_visible = item_index;
        } else {
            self.core.last_visible += 1;
        }
        self.core
            .provider
            .add_item(item, item_index, size, row_index, edge);
        size
    }

    pub(crate) fn item_positions_in_rows(&mut self, start_pos: i32, end_pos: i32) -> &[RowRanges] {
        for ranges in &mut self.core.row_positions {
            ranges.clear();
        }
        if start_pos >= 0 {
            for i in start_pos..=end_pos {
                let row = self.cache[i].row;
                let ranges = &mut self.core.row_positions[row];
                match ranges.last_mut() {
                    // Extend a continuous run.
                    Some(range) if range.1 == i - 1 => range.1 = i,
                    _ => ranges.push((i, i)),
                }
            }
        }
        &self.core.row_positions
    }

    /// Declares everything from `index` onward stale, dropping both the
    /// window tail and the cached placements at or past `index`.
    pub fn invalidate_items_after(&mut self, index: i32) {
        if index < 0 {
            return;
        }
        self.core.invalidate_window_after(index);
        self.cache.remove_from_end(self.last_index() - index + 1);
    }

    #[cfg(test)]
    pub(crate) fn assert_window_within_cache(&self) {
        if self.core.first_visible >= 0 {
            assert!(
                self.first_index() <= self.core.first_visible
                    && self.core.first_visible <= self.core.last_visible
                    && self.core.last_visible <= self.last_index(),
                "window [{}, {}] escaped cached run [{}, {}]",
                self.core.first_visible,
                self.core.last_visible,
                self.first_index(),
                self.last_index(),
            );
        }
    }
}

// The pending item is host-owned and opaque; skip it.
impl<P: Provider> fmt::Debug for StaggeredGrid<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaggeredGrid")
            .field("core", &self.core)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;
    use core::num::NonZeroUsize;

    use crate::fixture::{Placed, TestProvider};
    use crate::staggered::StaggeredGrid;

    fn grid_with_sizes(num_rows: usize, sizes: &[i32]) -> StaggeredGrid<TestProvider> {
        StaggeredGrid::new(
            NonZeroUsize::new(num_rows).unwrap(),
            TestProvider::new(sizes.to_vec()),
        )
    }

    fn scroll_forward(grid: &mut StaggeredGrid<TestProvider>, keep_from: i32) {
        grid.core.remove_invisible_items_at_front(keep_from, i32::MAX);
    }

    #[test]
    fn cached_prepend_replays_the_forward_pass_exactly() {
        let sizes = [80, 120, 60, 100, 90, 110, 70, 100, 80];
        let mut grid = grid_with_sizes(3, &sizes);
        grid.core.spacing = 10;
        assert!(grid.append_visible(10_000, false));
        assert_eq!(grid.core.last_visible, 8);
        let forward: Vec<Placed> = (0..9).map(|i| grid.core.provider.placed(i)).collect();

        // Scroll forward so items 0..6 are evicted, then scroll back.
        scroll_forward(&mut grid, 6);
        assert_eq!(grid.core.first_visible, 6);
        assert_eq!(grid.first_index(), 0, "history must be retained");
        grid.assert_window_within_cache();

        grid.prepend_visible(-10_000, false);
        assert_eq!(grid.core.first_visible, 0);
        for (i, expected) in forward.iter().enumerate() {
            assert_eq!(
                &grid.core.provider.placed(i as i32),
                expected,
                "item {i} drifted on replay"
            );
        }
        grid.assert_window_within_cache();
    }

    #[test]
    fn stale_size_on_append_truncates_and_falls_back() {
        let mut grid = grid_with_sizes(3, &[50; 10]);
        grid.append_visible(10_000, false);
        let row_of_5 = grid.location(5).unwrap().row;

        // Evict the tail, then change item 5's size upstream.
        grid.core.remove_invisible_items_at_end(3, i32::MIN);
        assert_eq!(grid.core.last_visible, 3);
        assert_eq!(grid.last_index(), 9);
        grid.core.provider.set_size(5, 80);

        grid.append_visible(10_000, false);
        assert_eq!(grid.core.last_visible, 9);
        // Item 5 kept its row but carries the fresh size; everything after it
        // was rebuilt rather than replayed.
        let location = *grid.location(5).unwrap();
        assert_eq!(location.size, 80);
        assert_eq!(location.row, row_of_5);
        assert_eq!(grid.core.provider.placed_size(5), 80);
        assert_eq!(grid.last_index(), 9);
        grid.assert_window_within_cache();
    }

    #[test]
    fn stale_size_on_prepend_reuses_the_pending_item() {
        let mut grid = grid_with_sizes(3, &[50; 9]);
        grid.append_visible(10_000, false);
        scroll_forward(&mut grid, 6);

        grid.core.provider.set_size(3, 75);
        grid.core.provider.created.clear();
        assert!(grid.prepend_visible(-10_000, false));
        assert_eq!(grid.core.first_visible, 0);

        // The mismatched item was created once; the fallback reused it
        // instead of asking the provider again.
        let creations_of_3 = grid
            .core
            .provider
            .created
            .iter()
            .filter(|&&i| i == 3)
            .count();
        assert_eq!(creations_of_3, 1);
        assert_eq!(grid.core.provider.placed_size(3), 75);
        assert_eq!(grid.location(3).unwrap().size, 75);
        grid.assert_window_within_cache();
    }

    #[test]
    fn invalidate_truncates_the_cache_tail() {
        let mut grid = grid_with_sizes(3, &[100; 10]);
        grid.append_visible(10_000, false);
        assert_eq!(grid.last_index(), 9);

        grid.invalidate_items_after(4);
        assert_eq!(grid.core.last_visible, 3);
        assert_eq!(grid.last_index(), 3);
        assert!(grid.location(4).is_none());

        // Re-append with changed sizes; nothing stale may leak through.
        for i in 4..10 {
            grid.core.provider.set_size(i, 130);
        }
        grid.append_visible(10_000, false);
        assert_eq!(grid.core.last_visible, 9);
        for i in 4..10 {
            assert_eq!(grid.location(i).unwrap().size, 130);
        }
        grid.assert_window_within_cache();
    }

    #[test]
    fn invalidating_everything_resets_the_cache_base() {
        let mut grid = grid_with_sizes(2, &[100; 4]);
        grid.append_visible(10_000, false);
        grid.invalidate_items_after(0);
        assert_eq!(grid.cache_len(), 0);
        assert_eq!(grid.first_index(), -1);
    }

    #[test]
    fn cached_append_resumes_after_a_window_reset() {
        let mut grid = grid_with_sizes(3, &[100; 9]);
        grid.append_visible(10_000, false);
        let forward: Vec<Placed> = (0..9).map(|i| grid.core.provider.placed(i)).collect();

        // The host rebuilt its children but kept the grid: same placements
        // must come back from the cache.
        grid.core.reset_visible_index();
        grid.core.start_index = 0;
        grid.append_visible(10_000, false);
        for (i, expected) in forward.iter().enumerate() {
            assert_eq!(&grid.core.provider.placed(i as i32), expected);
        }
    }

    #[test]
    fn starting_far_outside_the_cached_run_clears_it() {
        let mut grid = grid_with_sizes(3, &[100; 30]);
        grid.append_visible(350, false);
        assert!(grid.cache_len() > 0);

        grid.core.reset_visible_index();
        grid.core.start_index = 20;
        grid.append_visible(10_000, false);
        // The old run could not seed index 20; it was discarded and a new
        // run started there.
        assert_eq!(grid.first_index(), 20);
        assert_eq!(grid.core.first_visible, 20);
        grid.assert_window_within_cache();
    }

    #[test]
    fn item_positions_in_rows_compresses_runs() {
        let mut grid = grid_with_sizes(3, &[100; 10]);
        grid.core.spacing = 0;
        grid.append_visible(10_000, false);

        let rows: Vec<_> = grid.item_positions_in_rows(0, 9).to_vec();
        assert_eq!(rows[0].as_slice(), [(0, 0), (3, 3), (6, 6), (9, 9)]);
        assert_eq!(rows[1].as_slice(), [(1, 1), (4, 4), (7, 7)]);
        assert_eq!(rows[2].as_slice(), [(2, 2), (5, 5), (8, 8)]);
    }
}
