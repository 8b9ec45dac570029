// Copyright 2025 the Lintel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lintel Solver: the contract between a layout tree and a flexbox-style engine.
//!
//! A layout tree describes itself to a solver through a small, fixed vocabulary:
//!
//! - [`Solver::reset`], [`Solver::create`]: start a fresh context and create item handles.
//! - [`Solver::insert`], [`Solver::append`]: link items as first child or next sibling.
//! - [`Solver::set_size`], [`Solver::set_margins`], [`Solver::set_contain`],
//!   [`Solver::set_behave`]: push per-item attributes.
//! - [`Solver::run`], [`Solver::rect`]: solve and read back absolute rectangles.
//!
//! Any engine that honors the semantics documented on [`Solver`] can be swapped in.
//! The crate ships [`TaffySolver`], which lays items out with [`taffy`].
//!
//! ## Attributes
//!
//! - [`Container`]: how an item arranges its own children ([`Direction`], wrap, [`Justify`]).
//! - [`Behave`]: how an item is placed in its parent (anchors and fills; [`Behave::CENTER`] is empty).
//!
//! # Example
//!
//! ```rust
//! use kurbo::{Rect, Size};
//! use lintel_solver::{Behave, Container, Solver, TaffySolver};
//!
//! let mut solver = TaffySolver::new();
//! let row = solver.create();
//! solver.set_contain(row, Container::row());
//! solver.set_size(row, Size::new(100.0, 0.0));
//!
//! let icon = solver.create();
//! solver.set_size(icon, Size::new(10.0, 10.0));
//! solver.insert(row, icon);
//!
//! let spacer = solver.create();
//! solver.set_size(spacer, Size::new(0.0, 10.0));
//! solver.set_behave(spacer, Behave::HFILL);
//! solver.append(icon, spacer);
//!
//! solver.run().unwrap();
//! assert_eq!(solver.rect(icon), Rect::new(0.0, 0.0, 10.0, 10.0));
//! assert_eq!(solver.rect(spacer), Rect::new(10.0, 0.0, 100.0, 10.0));
//! ```
//!
//! ## Features
//!
//! - `std` *(default)*: enables `std` in `kurbo` and `taffy`.
//! - `libm`: float math for `no_std` builds of `kurbo`.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod error;
mod solver;
pub mod solvers;
mod types;

pub use error::SolveError;
pub use solver::Solver;
pub use solvers::TaffySolver;
pub use types::{Anchor, Behave, Container, Direction, ItemId, Justify};
