// Copyright 2026 the Lattice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The orientation-agnostic grid engine: visible-window state, the public
//! operation surface, and the operations shared by all row layouts.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::num::NonZeroUsize;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::cache::Location;
use crate::provider::Provider;
use crate::single_row::SingleRow;
use crate::staggered::StaggeredGrid;

/// Sentinel for [`Grid::set_start`]: no explicit start index was provided.
pub const START_DEFAULT: i32 = -1;

/// Per-row inclusive index ranges, as produced by
/// [`Grid::item_positions_in_rows`].
pub type RowRanges = SmallVec<[(i32, i32); 4]>;

/// Result of a row-extreme query: the extreme edge value, the row it belongs
/// to, and the item whose placement produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowExtreme {
    /// The extreme edge value found.
    pub edge: i32,
    /// Row holding the extreme edge.
    pub row: usize,
    /// Item index whose placement produced the extreme edge.
    pub index: i32,
}

/// Window state and configuration shared by every grid variant.
pub(crate) struct GridCore<P: Provider> {
    pub(crate) provider: P,
    pub(crate) reversed_flow: bool,
    pub(crate) spacing: i32,
    pub(crate) num_rows: usize,
    // Absolute indices of the materialized window; -1 while empty.
    pub(crate) first_visible: i32,
    pub(crate) last_visible: i32,
    // First index to lay out when the window is empty.
    pub(crate) start_index: i32,
    // Scratch for item_positions_in_rows, one entry per row.
    pub(crate) row_positions: Vec<RowRanges>,
}

impl<P: Provider> GridCore<P> {
    pub(crate) fn new(provider: P, num_rows: usize) -> Self {
        Self {
            provider,
            reversed_flow: false,
            spacing: 0,
            num_rows,
            first_visible: -1,
            last_visible: -1,
            start_index: START_DEFAULT,
            row_positions: vec![RowRanges::new(); num_rows],
        }
    }

    pub(crate) fn set_num_rows(&mut self, num_rows: usize) {
        if self.num_rows == num_rows {
            return;
        }
        self.num_rows = num_rows;
        self.row_positions = vec![RowRanges::new(); num_rows];
    }

    pub(crate) fn reset_visible_index(&mut self) {
        self.first_visible = -1;
        self.last_visible = -1;
    }

    pub(crate) fn reset_visible_index_if_empty(&mut self) {
        if self.last_visible < self.first_visible {
            self.reset_visible_index();
        }
    }

    /// True once the extreme row edge, adjusted by spacing, has crossed
    /// `to_limit` in the append direction. `extreme` is the caller's
    /// row-extreme edge for the current flow.
    pub(crate) fn append_edge_over_limit(&self, extreme: i32, to_limit: i32) -> bool {
        if self.reversed_flow {
            extreme <= to_limit.saturating_add(self.spacing)
        } else {
            extreme >= to_limit.saturating_sub(self.spacing)
        }
    }

    pub(crate) fn prepend_edge_over_limit(&self, extreme: i32, to_limit: i32) -> bool {
        if self.reversed_flow {
            extreme >= to_limit.saturating_sub(self.spacing)
        } else {
            extreme <= to_limit.saturating_add(self.spacing)
        }
    }

    /// Shrinks the window from the end while items sit fully past `to_limit`,
    /// never removing the item at `above_index` or below it.
    pub(crate) fn remove_invisible_items_at_end(&mut self, above_index: i32, to_limit: i32) {
        while self.last_visible >= self.first_visible && self.last_visible > above_index {
            let edge = self.provider.edge(self.last_visible);
            let off_end = if self.reversed_flow {
                edge <= to_limit
            } else {
                edge >= to_limit
            };
            if !off_end {
                break;
            }
            self.provider.remove_item(self.last_visible);
            self.last_visible -= 1;
        }
        self.reset_visible_index_if_empty();
    }

    /// Shrinks the window from the front while items sit fully past
    /// `to_limit`, never removing the item at `below_index` or above it.
    pub(crate) fn remove_invisible_items_at_front(&mut self, below_index: i32, to_limit: i32) {
        while self.last_visible >= self.first_visible && self.first_visible < below_index {
            let size = self.provider.size(self.first_visible);
            let edge = self.provider.edge(self.first_visible);
            let off_front = if self.reversed_flow {
                edge - size >= to_limit
            } else {
                edge + size <= to_limit
            };
            if !off_front {
                break;
            }
            self.provider.remove_item(self.first_visible);
            self.first_visible += 1;
        }
        self.reset_visible_index_if_empty();
    }

    /// Window part of invalidation; cache truncation is the staggered
    /// variant's business.
    pub(crate) fn invalidate_window_after(&mut self, index: i32) {
        if index < 0 || self.last_visible < 0 {
            return;
        }
        if self.last_visible >= index {
            self.last_visible = index - 1;
        }
        self.reset_visible_index_if_empty();
        if self.first_visible < 0 {
            self.start_index = index;
        }
    }

    /// Places items that just left the window so the host can animate them
    /// out. `positions` is sorted ascending; entries past the last visible
    /// index are chained after the trailing edge, entries before the first
    /// visible index before the leading edge. `position_to_row` names the row
    /// each disappearing item belonged to; unknown items land on row 0.
    pub(crate) fn fill_disappearing_items(
        &mut self,
        positions: &[i32],
        position_to_row: &HashMap<i32, usize>,
    ) {
        let last_pos = self.last_visible;
        if last_pos >= 0 {
            // The last visible item itself must not be in the disappearing
            // list; only the insertion point past it matters.
            if let Err(first_disappearing) = positions.binary_search(&last_pos) {
                let mut edge = if self.reversed_flow {
                    self.provider.edge(last_pos) - self.provider.size(last_pos) - self.spacing
                } else {
                    self.provider.edge(last_pos) + self.provider.size(last_pos) + self.spacing
                };
                for &index in &positions[first_disappearing..] {
                    let row = position_to_row.get(&index).copied().unwrap_or(0);
                    let (item, size) = self.provider.create_item(index, true, true);
                    self.provider.add_item(item, index, size, row, edge);
                    edge = if self.reversed_flow {
                        edge - size - self.spacing
                    } else {
                        edge + size + self.spacing
                    };
                }
            }
        }

        let first_pos = self.first_visible;
        if first_pos >= 0 {
            if let Err(insertion) = positions.binary_search(&first_pos) {
                let mut edge = self.provider.edge(first_pos);
                for &index in positions[..insertion].iter().rev() {
                    let row = position_to_row.get(&index).copied().unwrap_or(0);
                    let (item, size) = self.provider.create_item(index, false, true);
                    edge = if self.reversed_flow {
                        edge + self.spacing + size
                    } else {
                        edge - self.spacing - size
                    };
                    self.provider.add_item(item, index, size, row, edge);
                }
            }
        }
    }
}

impl<P: Provider> fmt::Debug for GridCore<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridCore")
            .field("reversed_flow", &self.reversed_flow)
            .field("spacing", &self.spacing)
            .field("num_rows", &self.num_rows)
            .field("first_visible", &self.first_visible)
            .field("last_visible", &self.last_visible)
            .field("start_index", &self.start_index)
            .field("row_positions", &self.row_positions)
            .finish_non_exhaustive()
    }
}

/// A single- or multi-row grid layout engine over a [`Provider`].
///
/// The engine maintains a window of materialized items bounded by
/// [`first_visible_index`](Grid::first_visible_index) and
/// [`last_visible_index`](Grid::last_visible_index). The window grows through
/// [`append_visible_items`](Grid::append_visible_items) and
/// [`prepend_visible_items`](Grid::prepend_visible_items) up to a caller
/// supplied edge limit, and shrinks through the `remove_invisible_items_*`
/// operations. Multi-row grids cache every placement they compute so that
/// scrolling back reproduces the earlier layout exactly; hosts must call
/// [`invalidate_items_after`](Grid::invalidate_items_after) when they detect
/// that an item's size changed.
///
/// The variant is chosen once, at construction, from the row count.
pub enum Grid<P: Provider> {
    /// Degenerate single-row layout: items chain directly along the axis.
    SingleRow(SingleRow<P>),
    /// Balanced multi-row staggered layout with a placement cache.
    Staggered(StaggeredGrid<P>),
}

impl<P: Provider> Grid<P> {
    /// Creates a grid for `num_rows` rows driven by `provider`.
    #[must_use]
    pub fn new(num_rows: NonZeroUsize, provider: P) -> Self {
        if num_rows.get() == 1 {
            Self::SingleRow(SingleRow::new(provider))
        } else {
            Self::Staggered(StaggeredGrid::new(num_rows, provider))
        }
    }

    pub(crate) fn core(&self) -> &GridCore<P> {
        match self {
            Self::SingleRow(grid) => &grid.core,
            Self::Staggered(grid) => &grid.core,
        }
    }

    pub(crate) fn core_mut(&mut self) -> &mut GridCore<P> {
        match self {
            Self::SingleRow(grid) => &mut grid.core,
            Self::Staggered(grid) => &mut grid.core,
        }
    }

    /// Returns the staggered variant, if this grid has more than one row.
    #[must_use]
    pub fn staggered(&self) -> Option<&StaggeredGrid<P>> {
        match self {
            Self::Staggered(grid) => Some(grid),
            Self::SingleRow(_) => None,
        }
    }

    /// Mutable access to the staggered variant, if any.
    pub fn staggered_mut(&mut self) -> Option<&mut StaggeredGrid<P>> {
        match self {
            Self::Staggered(grid) => Some(grid),
            Self::SingleRow(_) => None,
        }
    }

    /// Shared access to the provider.
    #[must_use]
    pub fn provider(&self) -> &P {
        &self.core().provider
    }

    /// Mutable access to the provider.
    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.core_mut().provider
    }

    /// Replaces the provider. Window and cache state are kept; callers that
    /// swap to unrelated content should also invalidate.
    pub fn set_provider(&mut self, provider: P) {
        self.core_mut().provider = provider;
    }

    /// Sets the spacing between items along the main axis.
    pub fn set_spacing(&mut self, spacing: i32) {
        self.core_mut().spacing = spacing;
    }

    /// Sets reversed flow (right-to-left / bottom-to-top scan order).
    pub fn set_reversed_flow(&mut self, reversed_flow: bool) {
        self.core_mut().reversed_flow = reversed_flow;
    }

    /// Returns true if the flow is reversed.
    #[must_use]
    pub fn is_reversed_flow(&self) -> bool {
        self.core().reversed_flow
    }

    /// Sets the first item index to create when the window is empty.
    pub fn set_start(&mut self, start_index: i32) {
        self.core_mut().start_index = start_index;
    }

    /// Number of rows items are distributed across.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.core().num_rows
    }

    /// Index of the first item in the window; negative while the window is
    /// empty.
    #[must_use]
    pub fn first_visible_index(&self) -> i32 {
        self.core().first_visible
    }

    /// Index of the last item in the window; negative while the window is
    /// empty.
    #[must_use]
    pub fn last_visible_index(&self) -> i32 {
        self.core().last_visible
    }

    /// Clears the window bounds while keeping any cached placements.
    pub fn reset_visible_index(&mut self) {
        self.core_mut().reset_visible_index();
    }

    /// Cached or visible placement of an item. Pure lookup; never mutates.
    #[must_use]
    pub fn location(&self, index: i32) -> Option<Location> {
        match self {
            Self::SingleRow(grid) => grid.location(index),
            Self::Staggered(grid) => grid.location(index).copied(),
        }
    }

    /// Row of an item, if its placement is known.
    #[must_use]
    pub fn row_index(&self, index: i32) -> Option<usize> {
        self.location(index).map(|location| location.row)
    }

    /// Finds the largest (or smallest) row min edge among visible rows.
    ///
    /// # Panics
    ///
    /// Panics if the window is empty; growing and shrinking the window is the
    /// only way to establish edges to compare.
    #[must_use]
    pub fn find_row_min(&self, find_large: bool) -> RowExtreme {
        let core = self.core();
        assert!(
            core.last_visible >= 0,
            "find_row_min called on an empty window"
        );
        let index_limit = if core.reversed_flow {
            core.last_visible
        } else {
            core.first_visible
        };
        match self {
            Self::SingleRow(grid) => grid.find_row_min_from(find_large, index_limit),
            Self::Staggered(grid) => grid.find_row_min_from(find_large, index_limit),
        }
    }

    /// Finds the largest (or smallest) row max edge among visible rows.
    ///
    /// # Panics
    ///
    /// Panics if the window is empty.
    #[must_use]
    pub fn find_row_max(&self, find_large: bool) -> RowExtreme {
        let core = self.core();
        assert!(
            core.last_visible >= 0,
            "find_row_max called on an empty window"
        );
        let index_limit = if core.reversed_flow {
            core.first_visible
        } else {
            core.last_visible
        };
        match self {
            Self::SingleRow(grid) => grid.find_row_max_from(find_large, index_limit),
            Self::Staggered(grid) => grid.find_row_max_from(find_large, index_limit),
        }
    }

    /// Appends items until the provider runs out or the trailing edge crosses
    /// `to_limit` (max edge for normal flow, min edge for reversed flow).
    /// Returns true if at least one item was filled.
    pub fn append_visible_items(&mut self, to_limit: i32) -> bool {
        match self {
            Self::SingleRow(grid) => grid.append_visible(to_limit, false),
            Self::Staggered(grid) => grid.append_visible(to_limit, false),
        }
    }

    /// Prepends items until the provider's minimum index or until the leading
    /// edge crosses `to_limit`. Returns true if at least one item was filled.
    pub fn prepend_visible_items(&mut self, to_limit: i32) -> bool {
        match self {
            Self::SingleRow(grid) => grid.prepend_visible(to_limit, false),
            Self::Staggered(grid) => grid.prepend_visible(to_limit, false),
        }
    }

    /// Appends one full column (one item per row, from row 0 to the last
    /// row) regardless of any edge limit. Returns true if at least one item
    /// was filled.
    pub fn append_one_column_visible_items(&mut self) -> bool {
        let limit = if self.core().reversed_flow {
            i32::MAX
        } else {
            i32::MIN
        };
        match self {
            Self::SingleRow(grid) => grid.append_visible(limit, true),
            Self::Staggered(grid) => grid.append_visible(limit, true),
        }
    }

    /// Prepends one full column regardless of any edge limit. Returns true if
    /// at least one item was filled.
    pub fn prepend_one_column_visible_items(&mut self) -> bool {
        let limit = if self.core().reversed_flow {
            i32::MIN
        } else {
            i32::MAX
        };
        match self {
            Self::SingleRow(grid) => grid.prepend_visible(limit, true),
            Self::Staggered(grid) => grid.prepend_visible(limit, true),
        }
    }

    /// Removes items from the end of the window while they sit fully past
    /// `to_limit`, never removing the item at `above_index` or below it.
    pub fn remove_invisible_items_at_end(&mut self, above_index: i32, to_limit: i32) {
        self.core_mut()
            .remove_invisible_items_at_end(above_index, to_limit);
    }

    /// Removes items from the front of the window while they sit fully past
    /// `to_limit`, never removing the item at `below_index` or above it.
    pub fn remove_invisible_items_at_front(&mut self, below_index: i32, to_limit: i32) {
        self.core_mut()
            .remove_invisible_items_at_front(below_index, to_limit);
    }

    /// Declares everything from `index` onward stale: the window is truncated
    /// before `index` and, for staggered grids, cached placements at or past
    /// `index` are dropped. The host performs its own child removal; the
    /// provider is not called back for invalidated items.
    pub fn invalidate_items_after(&mut self, index: i32) {
        match self {
            Self::SingleRow(grid) => grid.core.invalidate_window_after(index),
            Self::Staggered(grid) => grid.invalidate_items_after(index),
        }
    }

    /// Places items that just left the window so the host can run their exit
    /// animations. See [`Provider::create_item`]'s `disappearing` flag.
    ///
    /// `positions` must be sorted ascending.
    pub fn fill_disappearing_items(
        &mut self,
        positions: &[i32],
        position_to_row: &HashMap<i32, usize>,
    ) {
        self.core_mut()
            .fill_disappearing_items(positions, position_to_row);
    }

    /// Per-row inclusive index ranges for items between `start_pos` and
    /// `end_pos` (both inclusive). The slice is scratch owned by the grid and
    /// is overwritten by the next call.
    pub fn item_positions_in_rows(&mut self, start_pos: i32, end_pos: i32) -> &[RowRanges] {
        match self {
            Self::SingleRow(grid) => grid.item_positions_in_rows(start_pos, end_pos),
            Self::Staggered(grid) => grid.item_positions_in_rows(start_pos, end_pos),
        }
    }

    /// Per-row inclusive index ranges for the whole visible window.
    pub fn visible_item_positions_in_rows(&mut self) -> &[RowRanges] {
        let (first, last) = (self.core().first_visible, self.core().last_visible);
        self.item_positions_in_rows(first, last)
    }

    /// Reports the next item the host could usefully create ahead of time
    /// when scrolling by `delta`, as `(index, distance)` pairs fed to `sink`.
    /// Only meaningful for single-row grids; multi-row grids report nothing.
    pub fn collect_adjacent_prefetch_positions(
        &self,
        from_limit: i32,
        delta: i32,
        sink: &mut dyn FnMut(i32, i32),
    ) {
        if let Self::SingleRow(grid) = self {
            grid.collect_adjacent_prefetch_positions(from_limit, delta, sink);
        }
    }
}

impl<P: Provider> fmt::Debug for Grid<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleRow(grid) => f.debug_tuple("SingleRow").field(grid).finish(),
            Self::Staggered(grid) => f.debug_tuple("Staggered").field(grid).finish(),
        }
    }
}

impl<P: Provider> fmt::Display for Grid<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleRow(grid) => write!(
                f,
                "SingleRow<{},{}>",
                grid.core.first_visible, grid.core.last_visible
            ),
            Self::Staggered(grid) => {
                for index in grid.first_index()..=grid.last_index() {
                    if let Some(location) = grid.location(index) {
                        write!(f, "<{index},{}> ", location.row)?;
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;
    use core::num::NonZeroUsize;

    use hashbrown::HashMap;

    use crate::fixture::TestProvider;
    use crate::grid::Grid;

    fn rows(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn factory_selects_the_variant_by_row_count() {
        let single = Grid::new(rows(1), TestProvider::with_uniform_sizes(4, 100));
        assert!(matches!(single, Grid::SingleRow(_)));
        assert_eq!(single.num_rows(), 1);

        let staggered = Grid::new(rows(3), TestProvider::with_uniform_sizes(4, 100));
        assert!(matches!(staggered, Grid::Staggered(_)));
        assert_eq!(staggered.num_rows(), 3);
    }

    #[test]
    fn empty_provider_fills_nothing() {
        let mut grid = Grid::new(rows(3), TestProvider::with_uniform_sizes(0, 100));
        assert!(!grid.append_visible_items(10_000));
        assert!(!grid.prepend_visible_items(-10_000));
        assert!(!grid.append_one_column_visible_items());
        assert!(grid.first_visible_index() < 0);
        assert!(grid.last_visible_index() < 0);
    }

    #[test]
    fn removal_shrinks_the_window_and_respects_the_index_guard() {
        let mut grid = Grid::new(rows(3), TestProvider::with_uniform_sizes(9, 100));
        grid.append_visible_items(10_000);
        assert_eq!(grid.first_visible_index(), 0);
        assert_eq!(grid.last_visible_index(), 8);

        // Everything up to item 5 has scrolled past; items 6.. stay.
        let limit = grid.provider().placed_edge(6);
        grid.remove_invisible_items_at_front(6, limit);
        assert_eq!(grid.first_visible_index(), 6);
        assert_eq!(grid.provider().removed, (0..6).collect::<Vec<_>>());

        // The guard index wins over the edge limit.
        grid.remove_invisible_items_at_end(7, i32::MIN);
        assert_eq!(grid.last_visible_index(), 7);

        // Removing the rest empties the window.
        grid.remove_invisible_items_at_end(-1, i32::MIN);
        grid.remove_invisible_items_at_front(i32::MAX, i32::MAX);
        assert!(grid.first_visible_index() < 0);
        assert!(grid.last_visible_index() < 0);
    }

    #[test]
    fn disappearing_items_extend_both_window_edges() {
        let mut grid = Grid::new(rows(3), TestProvider::with_uniform_sizes(12, 100));
        grid.append_visible_items(10_000);
        let front_limit = grid.provider().placed_edge(3);
        grid.remove_invisible_items_at_front(3, front_limit);
        grid.remove_invisible_items_at_end(8, i32::MIN);
        assert_eq!(grid.first_visible_index(), 3);
        assert_eq!(grid.last_visible_index(), 8);

        let first_edge = grid.provider().placed_edge(3);
        let last_edge = grid.provider().placed_edge(8);
        let last_size = grid.provider().placed_size(8);

        let mut position_to_row = HashMap::new();
        position_to_row.insert(9, 2_usize);
        grid.fill_disappearing_items(&[1, 9], &position_to_row);

        // Position 9 chains after the trailing edge, on its recorded row.
        assert_eq!(grid.provider().placed_edge(9), last_edge + last_size);
        assert_eq!(grid.provider().placed_row(9), 2);
        // Position 1 chains before the leading edge; its row is unknown, so
        // it defaults to row 0.
        assert_eq!(grid.provider().placed_edge(1), first_edge - 100);
        assert_eq!(grid.provider().placed_row(1), 0);
    }

    #[test]
    fn disappearing_positions_inside_the_window_are_skipped() {
        let mut grid = Grid::new(rows(2), TestProvider::with_uniform_sizes(6, 50));
        grid.append_visible_items(10_000);

        // Both the first and the last visible index appear in the positions
        // list; neither side fills anything.
        let placed_before = grid.provider().placed_count();
        grid.fill_disappearing_items(&[0, 5], &HashMap::new());
        assert_eq!(grid.provider().placed_count(), placed_before);
    }

    #[test]
    fn invalidate_on_an_empty_window_arms_the_start_index() {
        let mut grid = Grid::new(rows(3), TestProvider::with_uniform_sizes(9, 100));
        grid.append_visible_items(10_000);
        grid.invalidate_items_after(0);
        assert!(grid.first_visible_index() < 0);

        // The next append starts fresh at the invalidated index.
        assert!(grid.append_one_column_visible_items());
        assert_eq!(grid.first_visible_index(), 0);
    }

    #[test]
    fn display_lists_cached_placements() {
        use alloc::format;

        let mut grid = Grid::new(rows(2), TestProvider::with_uniform_sizes(4, 100));
        grid.append_visible_items(10_000);
        assert_eq!(format!("{grid}"), "<0,0> <1,1> <2,0> <3,1> ");

        let mut single = Grid::new(rows(1), TestProvider::with_uniform_sizes(2, 100));
        single.append_visible_items(10_000);
        assert_eq!(format!("{single}"), "SingleRow<0,1>");
    }
}
