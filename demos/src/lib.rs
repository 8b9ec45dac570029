// Copyright 2025 the Lintel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lintel Demos: small widgets built on [`lintel_tree`].
//!
//! - [`status_bar`]: a launcher status bar showing free disk space, a clock,
//!   a battery icon, and optional CPU frequency and manual indicators. Every
//!   text is a bitmap leaf that is swapped out with
//!   [`Tree::replace`](lintel_tree::Tree::replace) whenever it changes.
//!
//! Run `cargo run -p lintel_demos --example status_bar` to print the blits of
//! a few frames. Set `RUST_LOG=trace` to see the layout pipeline.

pub mod status_bar;
