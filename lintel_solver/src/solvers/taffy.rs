// Copyright 2025 the Lintel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Solver backed by the `taffy` layout engine.

use alloc::string::ToString;
use alloc::vec;
use alloc::vec::Vec;

use kurbo::{Insets, Point, Rect, Size};
use taffy::prelude::TaffyMaxContent;
use taffy::style::{
    AlignSelf, Dimension, Display, FlexDirection, FlexWrap, JustifyContent, LengthPercentageAuto,
    Style,
};
use taffy::style_helpers::line;
use taffy::{TaffyError, TaffyTree};

use crate::error::SolveError;
use crate::solver::Solver;
use crate::types::{Anchor, Behave, Container, Direction, ItemId, Justify};

#[derive(Clone, Debug, Default)]
struct Item {
    parent: Option<ItemId>,
    first_child: Option<ItemId>,
    next_sibling: Option<ItemId>,
    size: Size,
    margins: Insets,
    container: Container,
    behave: Behave,
}

/// A [`Solver`] that buffers items into flat arrays and lays them out with
/// [`taffy`] when [`run`](Solver::run) is called.
///
/// Free containers become a single-cell grid so that every child is anchored
/// independently; row and column containers become flexbox containers.
///
/// ## Example
///
/// ```rust
/// use kurbo::{Rect, Size};
/// use lintel_solver::{Behave, Container, Solver, TaffySolver};
///
/// let mut solver = TaffySolver::new();
/// let root = solver.create();
/// solver.set_contain(root, Container::row());
/// solver.set_size(root, Size::new(100.0, 20.0));
///
/// let child = solver.create();
/// solver.insert(root, child);
/// solver.set_size(child, Size::new(0.0, 20.0));
/// solver.set_behave(child, Behave::HFILL);
///
/// solver.run().unwrap();
/// assert_eq!(solver.rect(child), Rect::new(0.0, 0.0, 100.0, 20.0));
/// ```
pub struct TaffySolver {
    items: Vec<Item>,
    rects: Vec<Rect>,
    taffy: TaffyTree<()>,
    rounding: bool,
}

impl core::fmt::Debug for TaffySolver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TaffySolver")
            .field("items", &self.items.len())
            .field("rounding", &self.rounding)
            .finish_non_exhaustive()
    }
}

impl Default for TaffySolver {
    fn default() -> Self {
        Self::new()
    }
}

impl TaffySolver {
    /// Create an empty solver with pixel rounding enabled.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            rects: Vec::new(),
            taffy: TaffyTree::new(),
            rounding: true,
        }
    }

    /// Enable or disable rounding of solved rectangles to whole pixels.
    pub fn with_rounding(mut self, rounding: bool) -> Self {
        self.rounding = rounding;
        self
    }

    /// Number of items created since the last reset.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no item was created since the last reset.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn item_mut(&mut self, id: ItemId) -> &mut Item {
        &mut self.items[id.idx()]
    }
}

impl Solver for TaffySolver {
    fn reset(&mut self) {
        self.items.clear();
        self.rects.clear();
    }

    fn create(&mut self) -> ItemId {
        let id = item_id(self.items.len());
        self.items.push(Item::default());
        id
    }

    fn insert(&mut self, parent: ItemId, child: ItemId) {
        let first = self.items[parent.idx()].first_child.replace(child);
        let c = self.item_mut(child);
        c.parent = Some(parent);
        c.next_sibling = first;
    }

    fn append(&mut self, earlier: ItemId, later: ItemId) {
        let (parent, next) = {
            let e = self.item_mut(earlier);
            (e.parent, e.next_sibling.replace(later))
        };
        let l = self.item_mut(later);
        l.parent = parent;
        l.next_sibling = next;
    }

    fn set_size(&mut self, id: ItemId, size: Size) {
        self.item_mut(id).size = size;
    }

    fn set_margins(&mut self, id: ItemId, margins: Insets) {
        self.item_mut(id).margins = margins;
    }

    fn set_contain(&mut self, id: ItemId, container: Container) {
        self.item_mut(id).container = container;
    }

    fn set_behave(&mut self, id: ItemId, behave: Behave) {
        self.item_mut(id).behave = behave;
    }

    fn run(&mut self) -> Result<(), SolveError> {
        self.taffy = TaffyTree::new();
        if !self.rounding {
            self.taffy.disable_rounding();
        }
        self.rects.clear();
        self.rects.resize(self.items.len(), Rect::ZERO);

        let mut nodes: Vec<Option<taffy::NodeId>> = vec![None; self.items.len()];
        let mut seen = vec![false; self.items.len()];
        let roots: Vec<ItemId> = (0..self.items.len())
            .filter(|&i| self.items[i].parent.is_none())
            .map(item_id)
            .collect();
        log::trace!(
            "taffy: solving {} items under {} roots",
            self.items.len(),
            roots.len()
        );

        for root in roots {
            let node = build(
                &self.items,
                &mut self.taffy,
                &mut nodes,
                &mut seen,
                root,
                None,
            )?;
            self.taffy
                .compute_layout(node, taffy::geometry::Size::MAX_CONTENT)
                .map_err(engine_error)?;
            self.read_back(root, &nodes)?;
        }
        // Only items on a cycle are unreachable from every root.
        match nodes.iter().position(Option::is_none) {
            Some(stray) => Err(SolveError::Cycle(item_id(stray))),
            None => Ok(()),
        }
    }

    fn rect(&self, id: ItemId) -> Rect {
        self.rects.get(id.idx()).copied().unwrap_or(Rect::ZERO)
    }
}

impl TaffySolver {
    fn read_back(
        &mut self,
        root: ItemId,
        nodes: &[Option<taffy::NodeId>],
    ) -> Result<(), SolveError> {
        // Taffy positions are relative to the parent box; accumulate them so
        // every rect is in root space.
        let mut stack = vec![(root, Point::ZERO)];
        while let Some((id, origin)) = stack.pop() {
            let Some(node) = nodes[id.idx()] else {
                unreachable!("every item under a root was built");
            };
            let layout = self.taffy.layout(node).map_err(engine_error)?;
            let rect = Rect::from_origin_size(
                (
                    origin.x + f64::from(layout.location.x),
                    origin.y + f64::from(layout.location.y),
                ),
                (
                    f64::from(layout.size.width),
                    f64::from(layout.size.height),
                ),
            );
            self.rects[id.idx()] = rect;
            for child in children(&self.items, id) {
                stack.push((child, rect.origin()));
            }
        }
        Ok(())
    }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "ItemId indices are 32-bit."
)]
fn item_id(idx: usize) -> ItemId {
    ItemId::new(idx as u32)
}

fn engine_error(err: TaffyError) -> SolveError {
    SolveError::Engine(err.to_string())
}

/// Child handles of `id`, in link order.
fn children(items: &[Item], id: ItemId) -> Vec<ItemId> {
    let mut out = Vec::new();
    let mut next = items[id.idx()].first_child;
    while let Some(child) = next {
        if out.len() == items.len() {
            // A sibling chain longer than the context loops back on itself.
            break;
        }
        out.push(child);
        next = items[child.idx()].next_sibling;
    }
    out
}

fn build(
    items: &[Item],
    taffy: &mut TaffyTree<()>,
    nodes: &mut [Option<taffy::NodeId>],
    seen: &mut [bool],
    id: ItemId,
    parent: Option<Container>,
) -> Result<taffy::NodeId, SolveError> {
    if core::mem::replace(&mut seen[id.idx()], true) {
        return Err(SolveError::Cycle(id));
    }
    let item = &items[id.idx()];
    let kids = children(items, id);
    let mut child_nodes = Vec::with_capacity(kids.len());
    for child in kids {
        child_nodes.push(build(
            items,
            taffy,
            nodes,
            seen,
            child,
            Some(item.container),
        )?);
    }
    let node = taffy
        .new_with_children(item_style(item, parent), &child_nodes)
        .map_err(engine_error)?;
    nodes[id.idx()] = Some(node);
    Ok(node)
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "Taffy works in f32; UI coordinates fit comfortably."
)]
fn dimension(v: f64) -> Dimension {
    if v == 0.0 {
        Dimension::auto()
    } else {
        Dimension::length(v as f32)
    }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "Taffy works in f32; UI coordinates fit comfortably."
)]
fn margin(v: f64) -> LengthPercentageAuto {
    LengthPercentageAuto::length(v as f32)
}

fn align(anchor: Anchor) -> AlignSelf {
    match anchor {
        Anchor::Center => AlignSelf::Center,
        Anchor::Start => AlignSelf::Start,
        Anchor::End => AlignSelf::End,
        Anchor::Fill => AlignSelf::Stretch,
    }
}

fn item_style(item: &Item, parent: Option<Container>) -> Style {
    let c = item.container;
    let mut style = Style {
        display: if c.is_flex() {
            Display::Flex
        } else {
            Display::Grid
        },
        flex_direction: match c.direction {
            Direction::Column => FlexDirection::Column,
            Direction::Row | Direction::Free => FlexDirection::Row,
        },
        flex_wrap: if c.wrap {
            FlexWrap::Wrap
        } else {
            FlexWrap::NoWrap
        },
        justify_content: c.is_flex().then_some(match c.justify {
            Justify::Start => JustifyContent::FlexStart,
            Justify::Middle => JustifyContent::Center,
            Justify::End => JustifyContent::FlexEnd,
            Justify::SpaceBetween => JustifyContent::SpaceBetween,
        }),
        size: taffy::geometry::Size {
            width: dimension(item.size.width),
            height: dimension(item.size.height),
        },
        margin: taffy::geometry::Rect {
            left: margin(item.margins.x0),
            top: margin(item.margins.y0),
            right: margin(item.margins.x1),
            bottom: margin(item.margins.y1),
        },
        ..Style::default()
    };

    let Some(parent) = parent else {
        return style;
    };
    let b = item.behave;
    match parent.direction {
        Direction::Free => {
            // Every child shares the single cell and is anchored on its own.
            style.grid_row = line(1);
            style.grid_column = line(1);
            style.justify_self = Some(align(b.horizontal()));
            style.align_self = Some(align(b.vertical()));
        }
        Direction::Row | Direction::Column => {
            let (main, cross, main_size) = if parent.direction == Direction::Row {
                (b.horizontal(), b.vertical(), item.size.width)
            } else {
                (b.vertical(), b.horizontal(), item.size.height)
            };
            style.flex_grow = if main == Anchor::Fill { 1.0 } else { 0.0 };
            style.flex_shrink = if main_size == 0.0 { 1.0 } else { 0.0 };
            style.align_self = Some(align(cross));
        }
    }
    style
}
