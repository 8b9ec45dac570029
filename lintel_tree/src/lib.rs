// Copyright 2025 the Lintel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lintel Tree: a retained-mode layout tree on top of a flexbox-style solver.
//!
//! The tree is the consumer-facing half of the layout stack. It owns a
//! hierarchy of nodes, each carrying an explicit size, margins, a container
//! model for its children, and a placement policy in its parent. Once per
//! frame it rebuilds a fresh solver context from scratch, solves it, and
//! copies the absolute rectangles back onto its nodes.
//!
//! - Structure is edited through a small mutation protocol: insert detached or
//!   under a parent, add as a sibling, remove, and atomic [`Tree::replace`].
//! - Layout is computed by any [`Solver`]; the default is [`TaffySolver`].
//! - Leaves can draw a shared [`Image`] onto a [`Surface`] at their solved rectangle.
//!
//! ## Frame pipeline
//!
//! 1. Refresh: per-node [`Refresh`] hooks regenerate content (new text
//!    bitmaps, swapped icons) by mutating the tree.
//! 2. Populate: every node reachable from the root becomes one solver item,
//!    linked in child order.
//! 3. Solve: [`Solver::run`].
//! 4. Readback: every reachable node receives its rectangle, visible or not.
//! 5. Render: [`Tree::render`] walks the tree pre-order, skipping hidden
//!    subtrees, and blits each bitmap leaf.
//!
//! Steps 1 to 4 are [`Tree::run`]. Visibility is read only by step 5, so
//! showing or hiding a node is cheap and never moves other nodes.
//!
//! ## API overview
//!
//! - [`Tree`]: owns the nodes, the root, and the solver.
//! - [`LocalNode`]: per-node attributes; [`LocalNode::bitmap`] builds a leaf
//!   sized to its image.
//! - [`NodeId`]: generational handle of a node.
//! - [`Content`]: what a node draws.
//!
//! Key operations:
//! - [`Tree::insert`] → [`NodeId`]
//! - [`Tree::add_child`] / [`Tree::add_sibling`] / [`Tree::replace`]
//! - [`Tree::remove_child`] / [`Tree::remove_children`] / [`Tree::remove`]
//! - [`Tree::set_size`] / [`Tree::set_margins`] / [`Tree::set_container`] /
//!   [`Tree::set_behave`] / [`Tree::show`] / [`Tree::hide`]
//! - [`Tree::run`] then [`Tree::rect`] and [`Tree::render`]
//!
//! ## Misuse
//!
//! Structural errors panic: removing a node from a parent it is not a child
//! of, adding a sibling to a detached node, attaching a node that already has
//! a parent, or forming a cycle. Stale ids are tolerated by setters and
//! queries, which ignore them or return `None`.
//!
//! ## Features
//!
//! - `std` *(default)*: enables `std` in `kurbo` and `lintel_solver`.
//! - `libm`: float math for `no_std` builds.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod content;
mod tree;
mod types;

pub use content::{Content, Image, Surface};
pub use tree::{Refresh, Tree};
pub use types::{LocalNode, NodeId};

pub use lintel_solver::{
    Behave, Container, Direction, Justify, SolveError, Solver, TaffySolver,
};
