// Copyright 2026 the Lattice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=lattice_grid --heading-base-level=0

//! Lattice Grid: a staggered grid layout engine with a replayable placement
//! cache.
//!
//! This crate assigns a dense strip of items `0..count` to a fixed number of
//! rows along one scrolling axis, keeping the rows near-equal in length even
//! when item extents vary. It is renderer-agnostic: the host owns the actual
//! views and geometry behind the [`Provider`] trait, and the engine only
//! decides which items exist, which row each one belongs to, and at what edge
//! coordinate it starts.
//!
//! The core concepts are:
//!
//! - [`Provider`]: the host-side contract. The engine materializes items
//!   through it, reports placements back to it, and queries it for the edges
//!   and extents of items currently held.
//! - [`Grid`]: the engine itself, constructed from a row count. It maintains
//!   a visible window bounded by [`Grid::first_visible_index`] and
//!   [`Grid::last_visible_index`], grown by the append/prepend operations up
//!   to a pixel limit and shrunk by the `remove_invisible_items_*`
//!   operations.
//! - [`Location`]: the cached placement of one item (row, size, and the
//!   offset to its predecessor). Multi-row grids record a [`Location`] for
//!   every placement so that scrolling back over evicted items reproduces
//!   the earlier layout exactly; a single-row grid has no use for the cache
//!   and skips it.
//!
//! Hosts are responsible for:
//!
//! - Resolving the origin: the first item of a fill arrives with an
//!   `i32::MAX`/`i32::MIN` "edge unknown" marker (see [`Provider::add_item`]).
//! - Calling [`Grid::invalidate_items_after`] when item sizes change, and
//!   [`Grid::fill_disappearing_items`] when removed items should stay around
//!   for an exit animation.
//!
//! ## Minimal example
//!
//! A host that lays out fixed-size cards in three rows:
//!
//! ```rust
//! use core::num::NonZeroUsize;
//! use std::collections::HashMap;
//!
//! use lattice_grid::{Grid, Provider};
//!
//! struct Cards {
//!     sizes: Vec<i32>,
//!     // index -> (edge, size)
//!     placed: HashMap<i32, (i32, i32)>,
//! }
//!
//! impl Provider for Cards {
//!     type Item = ();
//!
//!     fn count(&self) -> i32 {
//!         self.sizes.len() as i32
//!     }
//!
//!     fn create_item(&mut self, index: i32, _append: bool, _disappearing: bool) -> ((), i32) {
//!         ((), self.sizes[index as usize])
//!     }
//!
//!     fn add_item(&mut self, _item: (), index: i32, length: i32, _row: usize, edge: i32) {
//!         // The first item carries an "edge unknown" marker; the host picks
//!         // the origin.
//!         let edge = if edge == i32::MAX || edge == i32::MIN { 0 } else { edge };
//!         self.placed.insert(index, (edge, length));
//!     }
//!
//!     fn remove_item(&mut self, index: i32) {
//!         self.placed.remove(&index);
//!     }
//!
//!     fn edge(&self, index: i32) -> i32 {
//!         self.placed[&index].0
//!     }
//!
//!     fn size(&self, index: i32) -> i32 {
//!         self.placed[&index].1
//!     }
//! }
//!
//! let provider = Cards { sizes: vec![120; 12], placed: HashMap::new() };
//! let mut grid = Grid::new(NonZeroUsize::new(3).unwrap(), provider);
//!
//! // Fill a 400px viewport, then query where everything landed.
//! grid.append_visible_items(400);
//! assert_eq!(grid.first_visible_index(), 0);
//! assert_eq!(grid.row_index(1), Some(1));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod cache;
#[cfg(test)]
mod fixture;
mod grid;
mod placement;
mod provider;
mod single_row;
mod staggered;

pub use cache::Location;
pub use grid::{Grid, RowExtreme, RowRanges, START_DEFAULT};
pub use provider::Provider;
pub use single_row::SingleRow;
pub use staggered::StaggeredGrid;
