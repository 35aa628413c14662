// Copyright 2026 the Lattice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The placement cache: per-item `{row, offset, size}` records indexed by
//! absolute item index.

use alloc::collections::VecDeque;
use core::ops::Index;

/// Cached placement of one item.
///
/// `offset` is the distance from this item's leading edge to the previous
/// item's leading edge in the same scan order (not necessarily the same row):
/// `min_edge(i) - min_edge(i - 1)` for normal flow, `max_edge(i) -
/// max_edge(i - 1)` for reversed flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// Row the item was assigned to.
    pub row: usize,
    /// Signed distance to the previous item's edge in scan order.
    pub offset: i32,
    /// Extent of the item along the main axis.
    pub size: i32,
}

impl Location {
    /// Creates a new `Location`.
    #[must_use]
    pub const fn new(row: usize, offset: i32, size: i32) -> Self {
        Self { row, offset, size }
    }
}

/// A double-ended, contiguous run of [`Location`]s.
///
/// Entries are logically addressed by absolute item index: entry `i` of the
/// backing deque corresponds to item `first_index() + i`. Entries are only
/// ever added or dropped at the ends, so the run stays contiguous. The run may
/// extend past the currently visible window; that history is what lets a
/// scroll back over evicted items reproduce the exact placements of the
/// original forward pass.
#[derive(Debug, Default)]
pub(crate) struct LocationCache {
    locations: VecDeque<Location>,
    // Absolute item index of locations[0]; -1 when the cache is empty.
    first_index: i32,
}

impl LocationCache {
    pub(crate) fn new() -> Self {
        Self {
            locations: VecDeque::with_capacity(64),
            first_index: -1,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.locations.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Absolute index of the first cached entry, or -1 if empty.
    pub(crate) fn first_index(&self) -> i32 {
        self.first_index
    }

    /// Absolute index of the last cached entry.
    ///
    /// Computed as `first_index + len - 1`, so this is meaningless (negative)
    /// while the cache is empty; callers compare against it the same way the
    /// window indices are compared against their -1 sentinels.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Cache length is bounded by the item index range, which is i32."
    )]
    pub(crate) fn last_index(&self) -> i32 {
        self.first_index + self.locations.len() as i32 - 1
    }

    pub(crate) fn location(&self, index: i32) -> Option<&Location> {
        let in_cache = index - self.first_index;
        if in_cache < 0 || in_cache as usize >= self.locations.len() {
            return None;
        }
        self.locations.get(in_cache as usize)
    }

    pub(crate) fn location_mut(&mut self, index: i32) -> Option<&mut Location> {
        let in_cache = index - self.first_index;
        if in_cache < 0 || in_cache as usize >= self.locations.len() {
            return None;
        }
        self.locations.get_mut(in_cache as usize)
    }

    /// Prepends an entry for item `index`, which must be adjacent to (or
    /// establish) the front of the run.
    pub(crate) fn push_front(&mut self, index: i32, location: Location) {
        debug_assert!(
            self.locations.is_empty() || index == self.first_index - 1,
            "cache prepend must stay contiguous"
        );
        self.locations.push_front(location);
        self.first_index = index;
    }

    /// Appends an entry for item `index`, which must be adjacent to (or
    /// establish) the back of the run.
    pub(crate) fn push_back(&mut self, index: i32, location: Location) {
        debug_assert!(
            self.locations.is_empty() || index == self.last_index() + 1,
            "cache append must stay contiguous"
        );
        if self.locations.is_empty() {
            self.first_index = index;
        }
        self.locations.push_back(location);
    }

    /// Drops up to `count` entries from the front, sliding `first_index` up.
    pub(crate) fn remove_from_start(&mut self, count: i32) {
        let mut removed = 0;
        while removed < count && self.locations.pop_front().is_some() {
            removed += 1;
        }
        if self.locations.is_empty() {
            self.first_index = -1;
        } else {
            self.first_index += removed;
        }
    }

    /// Drops up to `count` entries from the back.
    pub(crate) fn remove_from_end(&mut self, count: i32) {
        let mut removed = 0;
        while removed < count && self.locations.pop_back().is_some() {
            removed += 1;
        }
        if self.locations.is_empty() {
            self.first_index = -1;
        }
    }

    pub(crate) fn clear(&mut self) {
        self.locations.clear();
        self.first_index = -1;
    }
}

impl Index<i32> for LocationCache {
    type Output = Location;

    fn index(&self, index: i32) -> &Location {
        self.location(index)
            .expect("item index outside the cached run")
    }
}
