// Copyright 2026 the Lattice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The provider contract a [`Grid`](crate::Grid) is driven through.

/// Supplies items to a grid and receives placement callbacks.
///
/// The grid never touches views, widgets, or screen geometry itself; the host
/// owns all of that behind this trait. The engine calls [`create_item`] to
/// materialize an item and learn its extent along the main axis, then always
/// follows up with [`add_item`] carrying the row and edge the item was placed
/// at. Items evicted from the window are handed back through [`remove_item`].
///
/// All callbacks are synchronous bookkeeping; implementations are expected to
/// be non-blocking and must not re-enter the grid.
///
/// Edges use the full `i32` range: when the grid places the very first item it
/// has no edge to chain from, and passes `i32::MAX` (or `i32::MIN`, depending
/// on direction and flow) to [`add_item`] as an "edge unknown" marker. The
/// host picks the actual origin in that case, and later [`edge`] queries must
/// report the resolved coordinate.
///
/// [`create_item`]: Provider::create_item
/// [`add_item`]: Provider::add_item
/// [`remove_item`]: Provider::remove_item
/// [`edge`]: Provider::edge
pub trait Provider {
    /// Opaque handle for a materialized item, returned by
    /// [`create_item`](Provider::create_item) and passed back to
    /// [`add_item`](Provider::add_item).
    type Item;

    /// Number of items available.
    fn count(&self) -> i32;

    /// Minimum index the grid may prepend down to. Usually 0, but a host
    /// replaying a removal can shift the index space so that indices below
    /// zero-of-today still resolve.
    fn min_index(&self) -> i32 {
        0
    }

    /// Materializes the item at `index` and returns it with its main-axis
    /// extent. `append` is true when the item extends the window forward,
    /// false when it extends it backward. `disappearing` marks items placed
    /// by [`fill_disappearing_items`](crate::Grid::fill_disappearing_items)
    /// for exit animations.
    ///
    /// Always followed by an [`add_item`](Provider::add_item) call for the
    /// same index (possibly in a later engine call, if placement had to be
    /// retried after a stale cache entry).
    fn create_item(&mut self, index: i32, append: bool, disappearing: bool) -> (Self::Item, i32);

    /// Accepts the placement of a previously created item: its extent
    /// (`length`), the row it was assigned to, and its leading edge (min edge
    /// for normal flow, max edge for reversed flow; may be the "edge unknown"
    /// marker for the first item).
    fn add_item(&mut self, item: Self::Item, index: i32, length: i32, row_index: usize, edge: i32);

    /// Releases the item at `index`; it is no longer part of the window.
    fn remove_item(&mut self, index: i32);

    /// Leading edge of a currently placed item (min edge for normal flow,
    /// max edge for reversed flow).
    fn edge(&self, index: i32) -> i32;

    /// Main-axis extent of a currently placed item.
    fn size(&self, index: i32) -> i32;
}
