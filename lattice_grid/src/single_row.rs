// Copyright 2026 the Lattice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Degenerate one-row layout: every item lands on row 0 and chains directly
//! off its neighbor, so no placement cache is needed.

use core::fmt;

use smallvec::smallvec;

use crate::cache::Location;
use crate::grid::{GridCore, RowExtreme, RowRanges, START_DEFAULT};
use crate::provider::Provider;

/// A grid restricted to a single row.
pub struct SingleRow<P: Provider> {
    pub(crate) core: GridCore<P>,
}

impl<P: Provider> fmt::Debug for SingleRow<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleRow").field("core", &self.core).finish()
    }
}

impl<P: Provider> SingleRow<P> {
    /// Creates a single-row grid driven by `provider`.
    #[must_use]
    pub fn new(provider: P) -> Self {
        Self {
            core: GridCore::new(provider, 1),
        }
    }

    /// Every item shares the same trivial row-0 placement.
    #[must_use]
    pub fn location(&self, _index: i32) -> Option<Location> {
        Some(Location::new(0, 0, 0))
    }

    fn start_index_for_append(&self) -> i32 {
        if self.core.last_visible >= 0 {
            self.core.last_visible + 1
        } else if self.core.start_index != START_DEFAULT {
            self.core.start_index.min(self.core.provider.count() - 1)
        } else {
            0
        }
    }

    fn start_index_for_prepend(&self) -> i32 {
        if self.core.first_visible >= 0 {
            self.core.first_visible - 1
        } else if self.core.start_index != START_DEFAULT {
            self.core.start_index.min(self.core.provider.count() - 1)
        } else {
            self.core.provider.count() - 1
        }
    }

    pub(crate) fn find_row_min_from(&self, _find_large: bool, index_limit: i32) -> RowExtreme {
        let edge = if self.core.reversed_flow {
            self.core.provider.edge(index_limit) - self.core.provider.size(index_limit)
        } else {
            self.core.provider.edge(index_limit)
        };
        RowExtreme {
            edge,
            row: 0,
            index: index_limit,
        }
    }

    pub(crate) fn find_row_max_from(&self, _find_large: bool, index_limit: i32) -> RowExtreme {
        let edge = if self.core.reversed_flow {
            self.core.provider.edge(index_limit)
        } else {
            self.core.provider.edge(index_limit) + self.core.provider.size(index_limit)
        };
        RowExtreme {
            edge,
            row: 0,
            index: index_limit,
        }
    }

    fn check_append_over_limit(&self, to_limit: i32) -> bool {
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

    fn check_prepend_over_limit(&self, to_limit: i32) -> bool {
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

    pub(crate) fn append_visible(&mut self, to_limit: i32, one_column_mode: bool) -> bool {
        if self.core.provider.count() == 0 {
            return false;
        }
        if !one_column_mode && self.check_append_over_limit(to_limit) {
            return false;
        }
        let mut filled_one = false;
        for index in self.start_index_for_append()..self.core.provider.count() {
            let (item, size) = self.core.provider.create_item(index, true, false);
            let edge;
            if self.core.first_visible < 0 || self.core.last_visible < 0 {
                // First item: the host resolves the actual origin.
                edge = if self.core.reversed_flow {
                    i32::MAX
                } else {
                    i32::MIN
                };
                self.core.first_visible = index;
                self.core.last_visible = index;
            } else {
                let prev_edge = self.core.provider.edge(index - 1);
                let prev_size = self.core.provider.size(index - 1);
                edge = if self.core.reversed_flow {
                    prev_edge - prev_size - self.core.spacing
                } else {
                    prev_edge + prev_size + self.core.spacing
                };
                self.core.last_visible = index;
            }
            self.core.provider.add_item(item, index, size, 0, edge);
            filled_one = true;
            if one_column_mode || self.check_append_over_limit(to_limit) {
                break;
            }
        }
        filled_one
    }

    pub(crate) fn prepend_visible(&mut self, to_limit: i32, one_column_mode: bool) -> bool {
        if self.core.provider.count() == 0 {
            return false;
        }
        if !one_column_mode && self.check_prepend_over_limit(to_limit) {
            return false;
        }
        let mut filled_one = false;
        let min_index = self.core.provider.min_index();
        let mut index = self.start_index_for_prepend();
        while index >= min_index {
            let (item, size) = self.core.provider.create_item(index, false, false);
            let edge;
            if self.core.first_visible < 0 || self.core.last_visible < 0 {
                edge = if self.core.reversed_flow {
                    i32::MIN
                } else {
                    i32::MAX
                };
                self.core.first_visible = index;
                self.core.last_visible = index;
            } else {
                let next_edge = self.core.provider.edge(index + 1);
                edge = if self.core.reversed_flow {
                    next_edge + self.core.spacing + size
                } else {
                    next_edge - self.core.spacing - size
                };
                self.core.first_visible = index;
            }
            self.core.provider.add_item(item, index, size, 0, edge);
            filled_one = true;
            if one_column_mode || self.check_prepend_over_limit(to_limit) {
                break;
            }
            index -= 1;
        }
        filled_one
    }

    pub(crate) fn item_positions_in_rows(&mut self, start_pos: i32, end_pos: i32) -> &[RowRanges] {
        // All items share row 0.
        self.core.row_positions[0] = smallvec![(start_pos, end_pos)];
        &self.core.row_positions
    }

    /// Reports the item adjacent to the window in the scroll direction
    /// `delta`, with its distance from `from_limit`, so the host can create
    /// it ahead of time.
    pub(crate) fn collect_adjacent_prefetch_positions(
        &self,
        from_limit: i32,
        delta: i32,
        sink: &mut dyn FnMut(i32, i32),
    ) {
        let prepending = if self.core.reversed_flow {
            delta > 0
        } else {
            delta < 0
        };
        let (index_to_prefetch, nearest_edge) = if prepending {
            if self.core.first_visible == 0 {
                return;
            }
            let edge = self.core.provider.edge(self.core.first_visible)
                + if self.core.reversed_flow {
                    self.core.spacing
                } else {
                    -self.core.spacing
                };
            (self.start_index_for_prepend(), edge)
        } else {
            if self.core.last_visible == self.core.provider.count() - 1 {
                return;
            }
            let item_size_with_space =
                self.core.provider.size(self.core.last_visible) + self.core.spacing;
            let edge = self.core.provider.edge(self.core.last_visible)
                + if self.core.reversed_flow {
                    -item_size_with_space
                } else {
                    item_size_with_space
                };
            (self.start_index_for_append(), edge)
        };
        sink(index_to_prefetch, (nearest_edge - from_limit).abs());
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use crate::fixture::TestProvider;
    use crate::single_row::SingleRow;

    #[test]
    fn append_chains_edges_with_spacing() {
        let mut grid = SingleRow::new(TestProvider::with_uniform_sizes(5, 10));
        grid.core.spacing = 2;
        assert!(grid.append_visible(10_000, false));

        for i in 0..5 {
            assert_eq!(grid.core.provider.placed_edge(i), i * 12);
            assert_eq!(grid.core.provider.placed_row(i), 0);
        }
        assert_eq!(grid.core.first_visible, 0);
        assert_eq!(grid.core.last_visible, 4);
    }

    #[test]
    fn prepend_recomputes_the_same_edges() {
        let mut grid = SingleRow::new(TestProvider::with_uniform_sizes(5, 10));
        grid.core.spacing = 2;
        grid.append_visible(10_000, false);

        let limit = grid.core.provider.placed_edge(3);
        grid.core.remove_invisible_items_at_front(3, limit);
        assert_eq!(grid.core.first_visible, 3);

        assert!(grid.prepend_visible(-10_000, false));
        for i in 0..5 {
            assert_eq!(grid.core.provider.placed_edge(i), i * 12);
        }
        assert_eq!(grid.core.first_visible, 0);
    }

    #[test]
    fn append_stops_at_the_limit() {
        let mut grid = SingleRow::new(TestProvider::with_uniform_sizes(100, 10));
        assert!(grid.append_visible(35, false));
        // Items 0..=3 cover 0..40; the max edge crosses the limit at item 3.
        assert_eq!(grid.core.last_visible, 3);

        // Appending again with the same limit fills nothing.
        assert!(!grid.append_visible(35, false));
    }

    #[test]
    fn one_column_mode_fills_exactly_one_item() {
        let mut grid = SingleRow::new(TestProvider::with_uniform_sizes(5, 10));
        assert!(grid.append_visible(i32::MIN, true));
        assert_eq!(grid.core.last_visible, 0);
        assert!(grid.append_visible(i32::MIN, true));
        assert_eq!(grid.core.last_visible, 1);
    }

    #[test]
    fn reversed_flow_chains_edges_downward() {
        let mut grid = SingleRow::new(TestProvider::with_uniform_sizes(4, 10));
        grid.core.reversed_flow = true;
        grid.append_visible(-10_000, false);

        // First item resolves at the origin; later items walk negative.
        for i in 0..4 {
            assert_eq!(grid.core.provider.placed_edge(i), -i * 10);
        }
    }

    #[test]
    fn prefetch_reports_the_adjacent_item_and_distance() {
        let mut grid = SingleRow::new(TestProvider::with_uniform_sizes(10, 10));
        grid.append_visible(25, false);
        assert_eq!(grid.core.last_visible, 2);

        let mut seen = Vec::new();
        grid.collect_adjacent_prefetch_positions(30, 1, &mut |index, distance| {
            seen.push((index, distance));
        });
        // Next append candidate is item 3, whose edge would be 30.
        assert_eq!(seen, [(3, 0)]);

        // Scrolling backward from the start prefetches nothing.
        seen.clear();
        grid.collect_adjacent_prefetch_positions(0, -1, &mut |index, distance| {
            seen.push((index, distance));
        });
        assert!(seen.is_empty());
    }
}
