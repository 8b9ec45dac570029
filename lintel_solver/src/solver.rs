// Copyright 2025 the Lintel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Solver trait: the fixed vocabulary a layout tree uses to drive an engine.

use kurbo::{Insets, Rect, Size};

use crate::error::SolveError;
use crate::types::{Behave, Container, ItemId};

/// Layout engine abstraction used by `lintel_tree::Tree`.
///
/// A solver owns a working context of items. Each frame the caller resets the
/// context, recreates every item with [`create`](Solver::create), links them
/// into a tree with [`insert`](Solver::insert) and [`append`](Solver::append),
/// pushes their attributes, calls [`run`](Solver::run), then reads back
/// rectangles with [`rect`](Solver::rect).
///
/// Implementations must honor these semantics:
/// - A non-zero size component pins that axis; zero defers to content or fill.
/// - Margins are space outside the item's box, taken from the parent.
/// - [`Container`] selects how an item arranges its children.
/// - [`Behave`] selects how an item is placed within its parent.
/// - Rectangles are absolute: offsets accumulate from the root item.
/// - Nothing survives [`reset`](Solver::reset); handles from a previous run
///   are invalid afterward.
///
/// Calling any item method with a handle that was not returned by
/// [`create`](Solver::create) since the last reset is a programmer error and
/// may panic.
pub trait Solver {
    /// Drop every item and start a fresh context.
    fn reset(&mut self);

    /// Create a new, unlinked item with default attributes.
    fn create(&mut self) -> ItemId;

    /// Insert `child` as the first child of `parent`.
    fn insert(&mut self, parent: ItemId, child: ItemId);

    /// Insert `later` as the next sibling of `earlier`, under the same parent.
    fn append(&mut self, earlier: ItemId, later: ItemId);

    /// Set the explicit size of an item.
    fn set_size(&mut self, id: ItemId, size: Size);

    /// Set the margins of an item.
    fn set_margins(&mut self, id: ItemId, margins: Insets);

    /// Set how an item arranges its children.
    fn set_contain(&mut self, id: ItemId, container: Container);

    /// Set how an item is placed within its parent.
    fn set_behave(&mut self, id: ItemId, behave: Behave);

    /// Solve the layout of every item in the context.
    fn run(&mut self) -> Result<(), SolveError>;

    /// The solved rectangle of an item, as of the last [`run`](Solver::run).
    fn rect(&self, id: ItemId) -> Rect;
}
