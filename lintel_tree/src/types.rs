// Copyright 2025 the Lintel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the layout tree: node identifiers and per-node attributes.

use alloc::rc::Rc;

use kurbo::{Insets, Size};
use lintel_solver::{Behave, Container};

use crate::content::{Content, Image};

/// Identifier for a node in the tree (generational).
///
/// Ids stay valid until their node is removed. After that they are stale:
/// queries return `None` and setters are ignored, even if the slot is reused.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Consumer-set state of a node.
///
/// Changes made through the [`Tree`](crate::Tree) setters take effect on the
/// next [`Tree::run`](crate::Tree::run) (geometry) or
/// [`Tree::render`](crate::Tree::render) (visibility).
#[derive(Debug)]
pub struct LocalNode<I: ?Sized> {
    /// Explicit size. A zero component lets the solver derive that axis.
    pub size: Size,
    /// Space outside the node's box: `x0` left, `y0` top, `x1` right, `y1` bottom.
    pub margins: Insets,
    /// How this node arranges its own children.
    pub container: Container,
    /// How this node is placed within its parent.
    pub behave: Behave,
    /// Whether this node and its subtree are drawn. Does not affect layout.
    pub visible: bool,
    /// What this node draws at its solved rectangle.
    pub content: Content<I>,
}

impl<I: ?Sized> Default for LocalNode<I> {
    fn default() -> Self {
        Self {
            size: Size::ZERO,
            margins: Insets::ZERO,
            container: Container::FREE,
            behave: Behave::CENTER,
            visible: true,
            content: Content::Container,
        }
    }
}

impl<I: ?Sized> Clone for LocalNode<I> {
    fn clone(&self) -> Self {
        Self {
            content: self.content.clone(),
            ..*self
        }
    }
}

impl<I: Image + ?Sized> LocalNode<I> {
    /// A bitmap leaf sized to its image's natural size and centered in its parent.
    pub fn bitmap(image: Rc<I>) -> Self {
        Self {
            size: image.size(),
            behave: Behave::CENTER,
            content: Content::Bitmap(image),
            ..Self::default()
        }
    }
}
