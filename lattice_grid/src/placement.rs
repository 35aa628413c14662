// Copyright 2026 the Lattice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Row-balancing placement for [`StaggeredGrid`]: where items go when the
//! cache has no record of them.
//!
//! Items fill rows in consecutive order, so the next item always lands in the
//! same row as its predecessor or in the adjacent one. Each pass walks the
//! rows of one "column" and keeps filling a row until it grows past the edge
//! of the previous column, which is what keeps the rows near-equal in length
//! when item sizes vary.

use crate::grid::{RowExtreme, START_DEFAULT};
use crate::provider::Provider;
use crate::staggered::StaggeredGrid;

impl<P: Provider> StaggeredGrid<P> {
    /// Max edge of any item, visible or cached, in `row`; `i32::MIN` when the
    /// row has nothing placed. This is where the next uncached item in the
    /// row goes.
    fn row_max(&self, row: usize) -> i32 {
        if self.core.first_visible < 0 {
            return i32::MIN;
        }
        if self.core.reversed_flow {
            let mut edge = self.core.provider.edge(self.core.first_visible);
            if self.cache[self.core.first_visible].row == row {
                return edge;
            }
            for i in self.core.first_visible + 1..=self.last_index() {
                let location = self.cache[i];
                edge += location.offset;
                if location.row == row {
                    return edge;
                }
            }
        } else {
            let mut edge = self.core.provider.edge(self.core.last_visible);
            let mut location = self.cache[self.core.last_visible];
            if location.row == row {
                return edge + location.size;
            }
            for i in (self.first_index()..self.core.last_visible).rev() {
                edge -= location.offset;
                location = self.cache[i];
                if location.row == row {
                    return edge + location.size;
                }
            }
        }
        i32::MIN
    }

    /// Min edge of any item, visible or cached, in `row`; `i32::MAX` when the
    /// row has nothing placed.
    fn row_min(&self, row: usize) -> i32 {
        if self.core.first_visible < 0 {
            return i32::MAX;
        }
        if self.core.reversed_flow {
            let mut edge = self.core.provider.edge(self.core.last_visible);
            let mut location = self.cache[self.core.last_visible];
            if location.row == row {
                return edge - location.size;
            }
            for i in (self.first_index()..self.core.last_visible).rev() {
                edge -= location.offset;
                location = self.cache[i];
                if location.row == row {
                    return edge - location.size;
                }
            }
        } else {
            let mut edge = self.core.provider.edge(self.core.first_visible);
            if self.cache[self.core.first_visible].row == row {
                return edge;
            }
            for i in self.core.first_visible + 1..=self.last_index() {
                let location = self.cache[i];
                edge += location.offset;
                if location.row == row {
                    return edge;
                }
            }
        }
        i32::MAX
    }

    /// Finds the largest (or smallest) per-row max edge, scanning backward
    /// from `index_limit` until every row has been visited once.
    ///
    /// Relies on rows being filled consecutively: the scan stops after
    /// `num_rows` distinct rows, and within a row the first placement found
    /// wins.
    pub(crate) fn find_row_max_from(&self, find_large: bool, index_limit: i32) -> RowExtreme {
        let mut edge = self.core.provider.edge(index_limit);
        let mut location = self.cache[index_limit];
        let mut row = location.row;
        let mut index = index_limit;
        let mut visit_row = location.row;
        let mut visited_rows = 1;
        let mut value;
        if self.core.reversed_flow {
            value = edge;
            for i in index_limit + 1..=self.core.last_visible {
                if visited_rows >= self.core.num_rows {
                    break;
                }
                location = self.cache[i];
                edge += location.offset;
                if location.row != visit_row {
                    visit_row = location.row;
                    visited_rows += 1;
                    let better = if find_large { edge > value } else { edge < value };
                    if better {
                        row = visit_row;
                        value = edge;
                        index = i;
                    }
                }
            }
        } else {
            value = edge + self.core.provider.size(index_limit);
            for i in (self.core.first_visible..index_limit).rev() {
                if visited_rows >= self.core.num_rows {
                    break;
                }
                edge -= location.offset;
                location = self.cache[i];
                if location.row != visit_row {
                    visit_row = location.row;
                    visited_rows += 1;
                    let new_value = edge + self.core.provider.size(i);
                    let better = if find_large {
                        new_value > value
                    } else {
                        new_value < value
                    };
                    if better {
                        row = visit_row;
                        value = new_value;
                        index = i;
                    }
                }
            }
        }
        RowExtreme {
            edge: value,
            row,
            index,
        }
    }

    /// Finds the largest (or smallest) per-row min edge, scanning forward
    /// from `index_limit` until every row has been visited once.
    pub(crate) fn find_row_min_from(&self, find_large: bool, index_limit: i32) -> RowExtreme {
        let mut edge = self.core.provider.edge(index_limit);
        let mut location = self.cache[index_limit];
        let mut row = location.row;
        let mut index = index_limit;
        let mut visit_row = location.row;
        let mut visited_rows = 1;
        let mut value;
        if self.core.reversed_flow {
            value = edge - self.core.provider.size(index_limit);
            for i in (self.core.first_visible..index_limit).rev() {
                if visited_rows >= self.core.num_rows {
                    break;
                }
                edge -= location.offset;
                location = self.cache[i];
                if location.row != visit_row {
                    visit_row = location.row;
                    visited_rows += 1;
                    let new_value = edge - self.core.provider.size(i);
                    let better = if find_large {
                        new_value > value
                    } else {
                        new_value < value
                    };
                    if better {
                        row = visit_row;
                        value = new_value;
                        index = i;
                    }
                }
            }
        } else {
            value = edge;
            for i in index_limit + 1..=self.core.last_visible {
                if visited_rows >= self.core.num_rows {
                    break;
                }
                location = self.cache[i];
                edge += location.offset;
                if location.row != visit_row {
                    visit_row = location.row;
                    visited_rows += 1;
                    let better = if find_large { edge > value } else { edge < value };
                    if better {
                        row = visit_row;
                        value = edge;
                        index = i;
                    }
                }
            }
        }
        RowExtreme {
            edge: value,
            row,
            index,
        }
    }

    fn window_row_max(&self, find_large: bool) -> i32 {
        let index_limit = if self.core.reversed_flow {
            self.core.first_visible
        } else {
            self.core.last_visible
        };
        self.find_row_max_from(find_large, index_limit).edge
    }

    fn window_row_min(&self, find_large: bool) -> i32 {
        let index_limit = if self.core.reversed_flow {
            self.core.last_visible
        } else {
            self.core.first_visible
        };
        self.find_row_min_from(find_large, index_limit).edge
    }

    /// Finds the start of the previous full column: the last-row item of the
    /// most recent wrap before the window edge. Negative when the window does
    /// not span a full column yet.
    fn find_row_edge_limit_search_index(&self, append: bool) -> i32 {
        let last_row = self.core.num_rows - 1;
        let mut wrapped = false;
        if append {
            for index in (self.core.first_visible..=self.core.last_visible).rev() {
                let row = self.cache[index].row;
                if row == 0 {
                    wrapped = true;
                } else if wrapped && row == last_row {
                    return index;
                }
            }
        } else {
            for index in self.core.first_visible..=self.core.last_visible {
                let row = self.cache[index].row;
                if row == last_row {
                    wrapped = true;
                } else if wrapped && row == 0 {
                    return index;
                }
            }
        }
        -1
    }

    pub(crate) fn append_visible_items_without_cache(
        &mut self,
        to_limit: i32,
        one_column_mode: bool,
    ) -> bool {
        let count = self.core.provider.count();
        let reversed = self.core.reversed_flow;
        let spacing = self.core.spacing;
        let mut item_index;
        let mut row_index;
        let mut edge_limit;
        let mut edge_limit_is_valid;
        if self.core.last_visible >= 0 {
            if self.core.last_visible < self.last_index() {
                // Still inside cached history; the cached path owns this.
                return false;
            }
            item_index = self.core.last_visible + 1;
            row_index = self.cache[self.core.last_visible].row;
            let search_index = self.find_row_edge_limit_search_index(true);
            if search_index < 0 {
                // No full previous column yet; grow toward the first row
                // that has content.
                edge_limit = i32::MIN;
                for row in 0..self.core.num_rows {
                    edge_limit = if reversed {
                        self.row_min(row)
                    } else {
                        self.row_max(row)
                    };
                    if edge_limit != i32::MIN {
                        break;
                    }
                }
            } else {
                edge_limit = if reversed {
                    self.find_row_min_from(false, search_index).edge
                } else {
                    self.find_row_max_from(true, search_index).edge
                };
            }
            let row_full = if reversed {
                self.row_min(row_index) <= edge_limit
            } else {
                self.row_max(row_index) >= edge_limit
            };
            if row_full {
                // Current row already reached the previous column; move on.
                row_index += 1;
                if row_index == self.core.num_rows {
                    // Wrapped: a new column starts, limited by this one.
                    row_index = 0;
                    edge_limit = if reversed {
                        self.window_row_min(false)
                    } else {
                        self.window_row_max(true)
                    };
                }
            }
            edge_limit_is_valid = true;
        } else {
            item_index = if self.core.start_index != START_DEFAULT {
                self.core.start_index
            } else {
                0
            };
            // With cached history, continue on the row after the last cached
            // item so a later cached prepend lines up.
            row_index = if self.cache.is_empty() {
                usize::try_from(item_index).unwrap_or(0) % self.core.num_rows
            } else {
                (self.cache[self.last_index()].row + 1) % self.core.num_rows
            };
            edge_limit = 0;
            edge_limit_is_valid = false;
        }

        let mut filled_one = false;
        loop {
            // One column pass: fill each row once, then keep filling the row
            // until it grows past the previous column's edge.
            while row_index < self.core.num_rows {
                if item_index == count
                    || (!one_column_mode && self.check_append_over_limit(to_limit))
                {
                    return filled_one;
                }
                let mut edge = if reversed {
                    self.row_min(row_index)
                } else {
                    self.row_max(row_index)
                };
                if edge == i32::MAX || edge == i32::MIN {
                    // Nothing on the row yet.
                    if row_index == 0 {
                        edge = if reversed {
                            self.row_min(self.core.num_rows - 1)
                        } else {
                            self.row_max(self.core.num_rows - 1)
                        };
                        if edge != i32::MAX && edge != i32::MIN {
                            edge = if reversed {
                                edge.saturating_sub(spacing)
                            } else {
                                edge.saturating_add(spacing)
                            };
                        }
                    } else {
                        edge = if reversed {
                            self.row_max(row_index - 1)
                        } else {
                            self.row_min(row_index - 1)
                        };
                    }
                } else {
                    edge = if reversed {
                        edge.saturating_sub(spacing)
                    } else {
                        edge.saturating_add(spacing)
                    };
                }
                let mut size = self.append_visible_item_to_row(item_index, row_index, edge);
                item_index += 1;
                filled_one = true;
                if edge_limit_is_valid {
                    loop {
                        let row_short = if reversed {
                            edge.saturating_sub(size) > edge_limit
                        } else {
                            edge.saturating_add(size) < edge_limit
                        };
                        if !row_short {
                            break;
                        }
                        if item_index == count
                            || (!one_column_mode && self.check_append_over_limit(to_limit))
                        {
                            return filled_one;
                        }
                        edge = if reversed {
                            edge.saturating_sub(size + spacing)
                        } else {
                            edge.saturating_add(size + spacing)
                        };
                        size = self.append_visible_item_to_row(item_index, row_index, edge);
                        item_index += 1;
                    }
                } else {
                    edge_limit_is_valid = true;
                    edge_limit = if reversed {
                        self.row_min(row_index)
                    } else {
                        self.row_max(row_index)
                    };
                }
                row_index += 1;
            }
            if one_column_mode {
                return filled_one;
            }
            edge_limit = if reversed {
                self.window_row_min(false)
            } else {
                self.window_row_max(true)
            };
            row_index = 0;
        }
    }

    pub(crate) fn prepend_visible_items_without_cache(
        &mut self,
        to_limit: i32,
        one_column_mode: bool,
    ) -> bool {
        let reversed = self.core.reversed_flow;
        let spacing = self.core.spacing;
        let last_row = self.core.num_rows - 1;
        let mut item_index;
        // None once the walk steps below row 0.
        let mut row_index: Option<usize>;
        let mut edge_limit;
        let mut edge_limit_is_valid;
        if self.core.first_visible >= 0 {
            if self.core.first_visible > self.first_index() {
                // Still inside cached history; the cached path owns this.
                return false;
            }
            item_index = self.core.first_visible - 1;
            let first_row = self.cache[self.core.first_visible].row;
            row_index = Some(first_row);
            let search_index = self.find_row_edge_limit_search_index(false);
            if search_index < 0 {
                // No full previous column yet; step up a row and grow toward
                // the last row that has content.
                row_index = first_row.checked_sub(1);
                edge_limit = i32::MAX;
                for row in (0..self.core.num_rows).rev() {
                    edge_limit = if reversed {
                        self.row_max(row)
                    } else {
                        self.row_min(row)
                    };
                    if edge_limit != i32::MAX {
                        break;
                    }
                }
            } else {
                edge_limit = if reversed {
                    self.find_row_max_from(true, search_index).edge
                } else {
                    self.find_row_min_from(false, search_index).edge
                };
            }
            let row_full = match row_index {
                Some(row) => {
                    if reversed {
                        self.row_max(row) >= edge_limit
                    } else {
                        self.row_min(row) <= edge_limit
                    }
                }
                // Below row 0: nothing placed, so only a sentinel limit
                // matches.
                None => {
                    if reversed {
                        edge_limit == i32::MIN
                    } else {
                        edge_limit == i32::MAX
                    }
                }
            };
            if row_full {
                // Current row already reached the previous column; move on.
                row_index = match row_index {
                    Some(row) if row > 0 => Some(row - 1),
                    _ => {
                        // Wrapped: a new column starts, limited by this one.
                        edge_limit = if reversed {
                            self.window_row_max(true)
                        } else {
                            self.window_row_min(false)
                        };
                        Some(last_row)
                    }
                };
            }
            edge_limit_is_valid = true;
        } else {
            item_index = if self.core.start_index != START_DEFAULT {
                self.core.start_index
            } else {
                0
            };
            // With cached history, continue on the row before the first
            // cached item so a later cached append lines up.
            row_index = Some(if self.cache.is_empty() {
                usize::try_from(item_index).unwrap_or(0) % self.core.num_rows
            } else {
                (self.cache[self.first_index()].row + last_row) % self.core.num_rows
            });
            edge_limit = 0;
            edge_limit_is_valid = false;
        }

        let mut filled_one = false;
        loop {
            // One column pass in reverse: fill each row once from the current
            // row down to row 0, extending each row past the previous
            // column's edge.
            while let Some(row) = row_index {
                if item_index < 0
                    || (!one_column_mode && self.check_prepend_over_limit(to_limit))
                {
                    return filled_one;
                }
                let mut edge = if reversed {
                    self.row_max(row)
                } else {
                    self.row_min(row)
                };
                if edge == i32::MAX || edge == i32::MIN {
                    // Nothing on the row yet.
                    if row == last_row {
                        edge = if reversed {
                            self.row_max(0)
                        } else {
                            self.row_min(0)
                        };
                        if edge != i32::MAX && edge != i32::MIN {
                            edge = if reversed {
                                edge.saturating_add(spacing)
                            } else {
                                edge.saturating_sub(spacing)
                            };
                        }
                    } else {
                        edge = if reversed {
                            self.row_min(row + 1)
                        } else {
                            self.row_max(row + 1)
                        };
                    }
                } else {
                    edge = if reversed {
                        edge.saturating_add(spacing)
                    } else {
                        edge.saturating_sub(spacing)
                    };
                }
                let mut size = self.prepend_visible_item_to_row(item_index, row, edge);
                item_index -= 1;
                filled_one = true;
                if edge_limit_is_valid {
                    loop {
                        let row_short = if reversed {
                            edge.saturating_add(size) < edge_limit
                        } else {
                            edge.saturating_sub(size) > edge_limit
                        };
                        if !row_short {
                            break;
                        }
                        if item_index < 0
                            || (!one_column_mode && self.check_prepend_over_limit(to_limit))
                        {
                            return filled_one;
                        }
                        edge = if reversed {
                            edge.saturating_add(size + spacing)
                        } else {
                            edge.saturating_sub(size + spacing)
                        };
                        size = self.prepend_visible_item_to_row(item_index, row, edge);
                        item_index -= 1;
                    }
                } else {
                    edge_limit_is_valid = true;
                    edge_limit = if reversed {
                        self.row_max(row)
                    } else {
                        self.row_min(row)
                    };
                }
                row_index = row.checked_sub(1);
            }
            if one_column_mode {
                return filled_one;
            }
            edge_limit = if reversed {
                self.window_row_max(true)
            } else {
                self.window_row_min(false)
            };
            row_index = Some(last_row);
        }
    }
}

#[cfg(test)]
mod tests {
    use core::num::NonZeroUsize;

    use crate::fixture::TestProvider;
    use crate::staggered::StaggeredGrid;

    fn grid_with_sizes(num_rows: usize, sizes: &[i32]) -> StaggeredGrid<TestProvider> {
        StaggeredGrid::new(
            NonZeroUsize::new(num_rows).unwrap(),
            TestProvider::new(sizes.to_vec()),
        )
    }

    #[test]
    fn uniform_items_fill_rows_in_consecutive_order() {
        let mut grid = grid_with_sizes(3, &[100; 10]);
        for _ in 0..10 {
            grid.append_visible(i32::MIN, true);
        }
        assert_eq!(grid.core.last_visible, 9);
        for i in 0..10_i32 {
            assert_eq!(grid.location(i).unwrap().row, usize::try_from(i).unwrap() % 3);
            assert_eq!(grid.core.provider.placed_edge(i), i / 3 * 100);
        }
    }

    #[test]
    fn short_rows_catch_up_to_the_previous_column() {
        // Item 0 is twice as long as items 1 and 2; row 1 takes two items to
        // catch up before the next column starts.
        let mut grid = grid_with_sizes(2, &[100, 50, 50, 100]);
        grid.append_visible(10_000, false);

        assert_eq!(grid.core.provider.placed_row(0), 0);
        assert_eq!(grid.core.provider.placed_row(1), 1);
        assert_eq!(grid.core.provider.placed_row(2), 1);
        assert_eq!(grid.core.provider.placed_row(3), 0);
        assert_eq!(grid.core.provider.placed_edge(1), 0);
        assert_eq!(grid.core.provider.placed_edge(2), 50);
        assert_eq!(grid.core.provider.placed_edge(3), 100);
    }

    #[test]
    fn spacing_separates_columns_but_not_the_first_fill_of_a_row() {
        let mut grid = grid_with_sizes(2, &[100; 4]);
        grid.core.spacing = 10;
        grid.append_visible(10_000, false);

        // Row 1's first item copies row 0's min edge rather than adding
        // spacing; the second column is spaced off the first.
        assert_eq!(grid.core.provider.placed_edge(0), 0);
        assert_eq!(grid.core.provider.placed_edge(1), 0);
        assert_eq!(grid.core.provider.placed_edge(2), 110);
        assert_eq!(grid.core.provider.placed_edge(3), 110);
    }

    #[test]
    fn reversed_flow_grows_toward_negative_edges() {
        let mut grid = grid_with_sizes(2, &[100; 4]);
        grid.core.reversed_flow = true;
        grid.append_visible(-10_000, false);

        assert_eq!(grid.core.provider.placed_edge(0), 0);
        assert_eq!(grid.core.provider.placed_edge(1), 0);
        assert_eq!(grid.core.provider.placed_edge(2), -100);
        assert_eq!(grid.core.provider.placed_edge(3), -100);
        assert_eq!(grid.core.provider.placed_row(2), 0);
        assert_eq!(grid.core.provider.placed_row(3), 1);
    }

    #[test]
    fn row_extreme_queries_report_first_found_on_ties() {
        let mut grid = grid_with_sizes(2, &[100, 100]);
        grid.append_visible(10_000, false);
        // Both rows end at 100; the backward scan starts at the window end
        // (item 1, row 1) and keeps the first row it sees.
        let extreme = grid.find_row_max_from(true, grid.core.last_visible);
        assert_eq!(extreme.edge, 100);
        assert_eq!(extreme.row, 1);
        assert_eq!(extreme.index, 1);

        // Both rows start at 0; the forward scan keeps row 0.
        let extreme = grid.find_row_min_from(true, grid.core.first_visible);
        assert_eq!(extreme.edge, 0);
        assert_eq!(extreme.row, 0);
        assert_eq!(extreme.index, 0);
    }

    #[test]
    fn append_stops_once_every_row_crossed_the_limit() {
        let mut grid = grid_with_sizes(3, &[100; 30]);
        grid.append_visible(350, false);
        // Columns at 0, 100, 200, 300; the fill stops once the shortest row
        // reaches past 350.
        assert_eq!(grid.core.last_visible, 11);
        assert!(!grid.append_visible(350, false));
    }
}
