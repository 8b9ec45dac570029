// Copyright 2025 the Lintel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Leaf rendering: what a node draws and where it draws it.

use alloc::rc::Rc;

use kurbo::{Rect, Size};

/// A fixed-size, ready-to-draw image resource.
///
/// Decoding and rasterization happen elsewhere; the tree only needs the
/// natural size to seed a bitmap leaf's explicit size.
pub trait Image {
    /// Natural size of the image in layout units.
    fn size(&self) -> Size;
}

/// A drawable target supplied by the embedding application.
pub trait Surface<I: ?Sized> {
    /// Draw `image` into `rect`, which is the node's solved rectangle.
    fn blit(&mut self, image: &I, rect: Rect);
}

/// What a node draws during [`Tree::render`](crate::Tree::render).
pub enum Content<I: ?Sized> {
    /// Draws nothing; only arranges children.
    Container,
    /// Draws a shared image at the node's solved rectangle.
    Bitmap(Rc<I>),
}

impl<I: ?Sized> Content<I> {
    /// Issue this content's draw calls for a node solved to `rect`.
    ///
    /// A bitmap issues exactly one [`Surface::blit`] with `rect` unchanged.
    pub fn draw<S: Surface<I> + ?Sized>(&self, surface: &mut S, rect: Rect) {
        match self {
            Self::Container => {}
            Self::Bitmap(image) => surface.blit(image, rect),
        }
    }

    /// The image held by a bitmap, if any.
    pub fn image(&self) -> Option<&Rc<I>> {
        match self {
            Self::Container => None,
            Self::Bitmap(image) => Some(image),
        }
    }
}

impl<I: ?Sized> Clone for Content<I> {
    fn clone(&self) -> Self {
        match self {
            Self::Container => Self::Container,
            Self::Bitmap(image) => Self::Bitmap(Rc::clone(image)),
        }
    }
}

impl<I: ?Sized> core::fmt::Debug for Content<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Container => f.write_str("Container"),
            Self::Bitmap(image) => f
                .debug_tuple("Bitmap")
                .field(&Rc::as_ptr(image).cast::<()>())
                .finish(),
        }
    }
}
