// Copyright 2026 the Lattice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll simulation over a three-row staggered grid.
//!
//! Fills a viewport, scrolls forward past the first few columns, then scrolls
//! back to the start, printing the materialized window after each step. The
//! layout printed on the way back is identical to the first fill because the
//! grid replays its placement cache.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use lattice_grid::{Grid, Provider};

const VIEWPORT: i32 = 480;

/// A shelf of cards with deterministic, varied widths.
struct Shelf {
    sizes: Vec<i32>,
    placed: HashMap<i32, (i32, i32, usize)>,
}

impl Shelf {
    fn new(count: usize) -> Self {
        let sizes = (0..count).map(|i| 80 + (i as i32 * 37) % 60).collect();
        Self {
            sizes,
            placed: HashMap::new(),
        }
    }
}

impl Provider for Shelf {
    type Item = ();

    fn count(&self) -> i32 {
        self.sizes.len() as i32
    }

    fn create_item(&mut self, index: i32, _append: bool, _disappearing: bool) -> ((), i32) {
        ((), self.sizes[index as usize])
    }

    fn add_item(&mut self, _item: (), index: i32, length: i32, row_index: usize, edge: i32) {
        // The first item of a fill carries an "edge unknown" marker; this
        // host anchors it at 0.
        let edge = if edge == i32::MAX || edge == i32::MIN {
            0
        } else {
            edge
        };
        self.placed.insert(index, (edge, length, row_index));
    }

    fn remove_item(&mut self, index: i32) {
        self.placed.remove(&index);
    }

    fn edge(&self, index: i32) -> i32 {
        self.placed[&index].0
    }

    fn size(&self, index: i32) -> i32 {
        self.placed[&index].1
    }
}

fn print_window(label: &str, grid: &mut Grid<Shelf>) {
    println!(
        "{label}: window [{}, {}]",
        grid.first_visible_index(),
        grid.last_visible_index()
    );
    let per_row: Vec<Vec<(i32, i32)>> = grid
        .visible_item_positions_in_rows()
        .iter()
        .map(|ranges| ranges.to_vec())
        .collect();
    for (row, ranges) in per_row.iter().enumerate() {
        print!("  row {row}:");
        for &(start, end) in ranges {
            for index in start..=end {
                let edge = grid.provider().edge(index);
                let size = grid.provider().size(index);
                print!(" {index}@[{edge},{}]", edge + size);
            }
        }
        println!();
    }
}

fn main() {
    let rows = NonZeroUsize::new(3).expect("row count is a nonzero literal");
    let mut grid = Grid::new(rows, Shelf::new(60));
    grid.set_spacing(8);

    grid.append_visible_items(VIEWPORT);
    print_window("initial fill", &mut grid);

    // Scroll forward in steps, appending ahead and evicting behind.
    let mut start = 0;
    for _ in 0..3 {
        start += 300;
        grid.append_visible_items(start + VIEWPORT);
        let keep = grid.last_visible_index();
        grid.remove_invisible_items_at_front(keep, start);
        print_window("after scroll forward", &mut grid);
    }

    // Scroll back to the top; cached placements replay exactly.
    grid.prepend_visible_items(0);
    let keep = grid.first_visible_index();
    grid.remove_invisible_items_at_end(keep, VIEWPORT);
    print_window("after scroll back", &mut grid);
}
