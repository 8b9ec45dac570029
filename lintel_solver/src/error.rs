// Copyright 2025 the Lintel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported by [`Solver::run`](crate::Solver::run).

use alloc::string::String;

use crate::types::ItemId;

/// A failure while solving a layout.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SolveError {
    /// The underlying engine rejected the item tree.
    #[error("layout engine failed: {0}")]
    Engine(String),
    /// Item links form a cycle, so no root can be laid out.
    #[error("item {0:?} is linked into a cycle")]
    Cycle(ItemId),
}
