// Copyright 2025 the Lintel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the solver contract: item handles and layout attributes.

/// Handle to an item inside a solver's working context.
///
/// Handles are only meaningful between a [`Solver::reset`](crate::Solver::reset)
/// and the next one; they must never be cached across runs.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ItemId(u32);

impl ItemId {
    /// Create a handle from a slot index in the solver's item storage.
    pub const fn new(idx: u32) -> Self {
        Self(idx)
    }

    /// Slot index of this handle.
    pub const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Arrangement axis of a container.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Children overlap and are anchored independently on both axes.
    #[default]
    Free,
    /// Children flow left to right.
    Row,
    /// Children flow top to bottom.
    Column,
}

/// Distribution of children along a flex container's main axis.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Justify {
    /// Pack children at the start of the main axis.
    Start,
    /// Center children on the main axis.
    #[default]
    Middle,
    /// Pack children at the end of the main axis.
    End,
    /// Distribute free space between children.
    SpaceBetween,
}

/// How a node arranges its own children.
///
/// The default is a free (non-flex) container: every child is placed
/// relative to the container box according to its own [`Behave`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Container {
    /// Arrangement axis.
    pub direction: Direction,
    /// Whether children that overflow the main axis wrap onto new lines.
    pub wrap: bool,
    /// Main-axis distribution. Ignored by free containers.
    pub justify: Justify,
}

impl Container {
    /// A free container.
    pub const FREE: Self = Self {
        direction: Direction::Free,
        wrap: false,
        justify: Justify::Middle,
    };

    /// A flex row with centered justification.
    pub const fn row() -> Self {
        Self {
            direction: Direction::Row,
            ..Self::FREE
        }
    }

    /// A flex column with centered justification.
    pub const fn column() -> Self {
        Self {
            direction: Direction::Column,
            ..Self::FREE
        }
    }

    /// Enable wrapping.
    pub const fn wrapping(mut self) -> Self {
        self.wrap = true;
        self
    }

    /// Set the main-axis justification.
    pub const fn justify(mut self, justify: Justify) -> Self {
        self.justify = justify;
        self
    }

    /// Whether children are arranged by flex flow (row or column).
    pub const fn is_flex(&self) -> bool {
        !matches!(self.direction, Direction::Free)
    }
}

bitflags::bitflags! {
    /// How a node is sized and placed within its parent's arrangement.
    ///
    /// Anchoring both edges of an axis fills that axis; anchoring neither
    /// centers the node on it. [`Behave::CENTER`] is the empty set.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Behave: u8 {
        /// Anchor to the left edge.
        const LEFT   = 0b0000_0001;
        /// Anchor to the top edge.
        const TOP    = 0b0000_0010;
        /// Anchor to the right edge.
        const RIGHT  = 0b0000_0100;
        /// Anchor to the bottom edge.
        const BOTTOM = 0b0000_1000;
        /// Fill the horizontal axis.
        const HFILL  = Self::LEFT.bits() | Self::RIGHT.bits();
        /// Fill the vertical axis.
        const VFILL  = Self::TOP.bits() | Self::BOTTOM.bits();
        /// Fill both axes.
        const FILL   = Self::HFILL.bits() | Self::VFILL.bits();
    }
}

impl Behave {
    /// Centered on both axes.
    pub const CENTER: Self = Self::empty();

    /// Placement on the horizontal axis.
    pub fn horizontal(self) -> Anchor {
        Anchor::from_edges(self.contains(Self::LEFT), self.contains(Self::RIGHT))
    }

    /// Placement on the vertical axis.
    pub fn vertical(self) -> Anchor {
        Anchor::from_edges(self.contains(Self::TOP), self.contains(Self::BOTTOM))
    }
}

impl Default for Behave {
    fn default() -> Self {
        Self::CENTER
    }
}

/// Placement of a node along one axis, derived from a pair of [`Behave`] edges.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// Neither edge anchored.
    Center,
    /// Only the leading (left/top) edge anchored.
    Start,
    /// Only the trailing (right/bottom) edge anchored.
    End,
    /// Both edges anchored.
    Fill,
}

impl Anchor {
    const fn from_edges(start: bool, end: bool) -> Self {
        match (start, end) {
            (false, false) => Self::Center,
            (true, false) => Self::Start,
            (false, true) => Self::End,
            (true, true) => Self::Fill,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn behave_anchors() {
        assert_eq!(Behave::CENTER.horizontal(), Anchor::Center);
        assert_eq!(Behave::CENTER.vertical(), Anchor::Center);
        assert_eq!(Behave::HFILL.horizontal(), Anchor::Fill);
        assert_eq!(Behave::HFILL.vertical(), Anchor::Center);
        assert_eq!((Behave::LEFT | Behave::BOTTOM).horizontal(), Anchor::Start);
        assert_eq!((Behave::LEFT | Behave::BOTTOM).vertical(), Anchor::End);
        assert_eq!(Behave::FILL.vertical(), Anchor::Fill);
        assert_eq!(Behave::default(), Behave::CENTER);
    }

    #[test]
    fn container_builders() {
        let c = Container::row().wrapping().justify(Justify::Start);
        assert_eq!(c.direction, Direction::Row);
        assert!(c.wrap);
        assert_eq!(c.justify, Justify::Start);
        assert!(c.is_flex());
        assert!(!Container::default().is_flex());
        assert_eq!(Container::default(), Container::FREE);
    }
}
