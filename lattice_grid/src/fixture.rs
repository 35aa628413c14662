// Copyright 2026 the Lattice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Test provider shared by the grid tests.

use alloc::vec;
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::provider::Provider;

/// One recorded placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Placed {
    pub(crate) edge: i32,
    pub(crate) size: i32,
    pub(crate) row: usize,
}

/// A provider over a vector of item sizes that records every callback.
///
/// Plays the host's part of the edge contract: an `add_item` carrying an
/// `i32::MAX`/`i32::MIN` edge marker is resolved to origin 0, and `edge`
/// queries report the resolved coordinate.
pub(crate) struct TestProvider {
    sizes: Vec<i32>,
    placed: HashMap<i32, Placed>,
    pub(crate) removed: Vec<i32>,
    pub(crate) created: Vec<i32>,
}

impl TestProvider {
    pub(crate) fn new(sizes: Vec<i32>) -> Self {
        Self {
            sizes,
            placed: HashMap::new(),
            removed: Vec::new(),
            created: Vec::new(),
        }
    }

    pub(crate) fn with_uniform_sizes(count: i32, size: i32) -> Self {
        Self::new(vec![size; usize::try_from(count).unwrap()])
    }

    /// Changes an item's size upstream, without telling the grid.
    pub(crate) fn set_size(&mut self, index: i32, size: i32) {
        self.sizes[usize::try_from(index).unwrap()] = size;
    }

    pub(crate) fn placed(&self, index: i32) -> Placed {
        self.placed[&index]
    }

    pub(crate) fn placed_edge(&self, index: i32) -> i32 {
        self.placed(index).edge
    }

    pub(crate) fn placed_size(&self, index: i32) -> i32 {
        self.placed(index).size
    }

    pub(crate) fn placed_row(&self, index: i32) -> usize {
        self.placed(index).row
    }

    pub(crate) fn placed_count(&self) -> usize {
        self.placed.len()
    }
}

impl Provider for TestProvider {
    type Item = i32;

    fn count(&self) -> i32 {
        i32::try_from(self.sizes.len()).unwrap()
    }

    fn create_item(&mut self, index: i32, _append: bool, _disappearing: bool) -> (Self::Item, i32) {
        self.created.push(index);
        (index, self.sizes[usize::try_from(index).unwrap()])
    }

    fn add_item(&mut self, item: Self::Item, index: i32, length: i32, row_index: usize, edge: i32) {
        assert_eq!(item, index, "item handle must round-trip");
        let edge = if edge == i32::MAX || edge == i32::MIN {
            0
        } else {
            edge
        };
        self.placed.insert(
            index,
            Placed {
                edge,
                size: length,
                row: row_index,
            },
        );
    }

    fn remove_item(&mut self, index: i32) {
        assert!(
            self.placed.remove(&index).is_some(),
            "removed item {index} was never placed"
        );
        self.removed.push(index);
    }

    fn edge(&self, index: i32) -> i32 {
        self.placed(index).edge
    }

    fn size(&self, index: i32) -> i32 {
        self.placed(index).size
    }
}
