// Copyright 2025 the Lintel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Solver implementations.
//!
//! - `taffy`: buffers the item tree and lays it out with the `taffy` engine.
//!   Free containers map to a one-cell grid; rows and columns map to flexbox.

pub(crate) mod taffy;

pub use self::taffy::TaffySolver;
