// Copyright 2025 the Lintel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: structure, mutation protocol, and the frame pipeline.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::{vec, vec::Vec};

use kurbo::{Insets, Rect, Size};
use lintel_solver::{Behave, Container, ItemId, SolveError, Solver, TaffySolver};

use crate::content::Surface;
use crate::types::{LocalNode, NodeId};

/// A per-node hook run by the refresh pass of [`Tree::run`], before layout is
/// solved.
///
/// Hooks regenerate derived content, for instance by building a new bitmap
/// leaf and swapping it in with [`Tree::replace`]. They may mutate the tree
/// freely. The pass walks the tree pre-order and re-reads each child list as
/// it goes, so nodes a hook inserts later in the order (including a
/// replacement for the hook's own node) are visited in the same pass, and
/// nodes a hook removed are skipped. Each node is visited at most once per
/// pass.
pub trait Refresh<I: ?Sized, S: Solver> {
    /// Update the subtree rooted at `node`.
    fn refresh(&mut self, tree: &mut Tree<I, S>, node: NodeId);
}

impl<I: ?Sized, S: Solver, F> Refresh<I, S> for F
where
    F: FnMut(&mut Tree<I, S>, NodeId),
{
    fn refresh(&mut self, tree: &mut Tree<I, S>, node: NodeId) {
        self(tree, node);
    }
}

/// Retained layout tree and the orchestrator of its frame pipeline.
///
/// `I` is the image type drawn by bitmap leaves; `S` is the layout engine,
/// defaulting to [`TaffySolver`].
///
/// The tree owns an implicit root node: an auto-sized free container. Build
/// the UI under [`Tree::root`], then drive each frame as:
///
/// 1. mutate the tree (insert, replace, remove, show/hide, setters),
/// 2. call [`Tree::run`] once to solve the layout,
/// 3. call [`Tree::render`] once to draw.
///
/// Attribute changes do **not** take effect immediately. Geometry changes are
/// picked up by the next [`Tree::run`]; visibility by the next
/// [`Tree::render`]. Visibility never affects layout, so showing or hiding a
/// node does not require a new solve.
///
/// ## Example
///
/// ```rust
/// use std::rc::Rc;
///
/// use kurbo::{Rect, Size};
/// use lintel_tree::{Behave, Container, Image, LocalNode, Surface, Tree};
///
/// struct Icon;
/// impl Image for Icon {
///     fn size(&self) -> Size {
///         Size::new(16.0, 16.0)
///     }
/// }
///
/// #[derive(Default)]
/// struct Blits(Vec<Rect>);
/// impl Surface<Icon> for Blits {
///     fn blit(&mut self, _image: &Icon, rect: Rect) {
///         self.0.push(rect);
///     }
/// }
///
/// let mut tree: Tree<Icon> = Tree::new();
/// let bar = tree.insert(
///     Some(tree.root()),
///     LocalNode {
///         size: Size::new(100.0, 16.0),
///         container: Container::row(),
///         ..LocalNode::default()
///     },
/// );
/// let spacer = tree.insert(
///     Some(bar),
///     LocalNode {
///         behave: Behave::HFILL,
///         ..LocalNode::default()
///     },
/// );
/// tree.insert(Some(bar), LocalNode::bitmap(Rc::new(Icon)));
///
/// tree.run().unwrap();
/// assert_eq!(tree.rect(spacer).unwrap().width(), 84.0);
///
/// let mut surface = Blits::default();
/// tree.render(&mut surface);
/// assert_eq!(surface.0, vec![Rect::new(84.0, 0.0, 100.0, 16.0)]);
/// ```
pub struct Tree<I: ?Sized, S: Solver = TaffySolver> {
    /// slots
    nodes: Vec<Option<Node<I, S>>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    root: NodeId,
    solver: S,
    /// Refresh pass counter; nodes visited in the current pass carry it.
    pass: u32,
}

impl<I: ?Sized, S: Solver + core::fmt::Debug> core::fmt::Debug for Tree<I, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        let free = self.free_list.len();
        f.debug_struct("Tree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &free)
            .field("root", &self.root)
            .field("solver", &self.solver)
            .finish_non_exhaustive()
    }
}

impl<I: ?Sized, S: Solver + Default> Default for Tree<I, S> {
    fn default() -> Self {
        Self::with_solver(S::default())
    }
}

pub(crate) struct Node<I: ?Sized, S: Solver> {
    generation: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    local: LocalNode<I>,
    /// Solved rectangle as of the last readback that reached this node.
    rect: Rect,
    /// Solver handle, live only between populate and readback of one run.
    item: Option<ItemId>,
    refresh: Option<Box<dyn Refresh<I, S>>>,
    /// Last refresh pass that visited this node.
    pass: u32,
}

impl<I: ?Sized, S: Solver> Node<I, S> {
    fn new(generation: u32, local: LocalNode<I>) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            local,
            rect: Rect::ZERO,
            item: None,
            refresh: None,
            pass: 0,
        }
    }
}

impl<I: ?Sized> Tree<I> {
    /// Create a tree holding only its root, laid out by a [`TaffySolver`].
    pub fn new() -> Self {
        Self::with_solver(TaffySolver::new())
    }
}

impl<I: ?Sized, S: Solver> Tree<I, S> {
    /// Create a tree holding only its root, laid out by `solver`.
    pub fn with_solver(solver: S) -> Self {
        Self {
            nodes: vec![Some(Node::new(1, LocalNode::default()))],
            generations: vec![1],
            free_list: Vec::new(),
            root: NodeId::new(0, 1),
            solver,
            pass: 0,
        }
    }

    /// The implicit root node. It can be configured but never removed.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The layout engine.
    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Create a node, appended to `parent`'s children or detached if `None`.
    ///
    /// A detached node stays alive until it is attached with
    /// [`Tree::add_child`], [`Tree::add_sibling`], or [`Tree::replace`], or
    /// freed with [`Tree::remove`]. It takes part in layout from the next
    /// [`Tree::run`] after it is attached.
    pub fn insert(&mut self, parent: Option<NodeId>, local: LocalNode<I>) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, local));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId indices are 32-bit."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, local)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId indices are 32-bit."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        let id = NodeId::new(idx, generation);
        if let Some(p) = parent {
            self.add_child(p, id);
        }
        id
    }

    /// Append a detached node to the end of `parent`'s children.
    ///
    /// # Panics
    ///
    /// Panics if either id is stale, if `child` already has a parent, or if
    /// `child` is an ancestor of `parent`.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.check_attachable(parent, child);
        self.node_mut(parent).children.push(child);
        self.node_mut(child).parent = Some(parent);
    }

    /// Insert a detached node immediately after `existing` among its siblings.
    ///
    /// # Panics
    ///
    /// Panics if `existing` is not currently a child of some node, or under
    /// the same conditions as [`Tree::add_child`].
    pub fn add_sibling(&mut self, existing: NodeId, new_sibling: NodeId) {
        let Some(parent) = self.node(existing).parent else {
            panic!("add_sibling: {existing:?} is not a child of any node");
        };
        self.check_attachable(parent, new_sibling);
        let pos = self.child_position(parent, existing);
        self.node_mut(parent).children.insert(pos + 1, new_sibling);
        self.node_mut(new_sibling).parent = Some(parent);
    }

    /// Remove `child` from `parent` and free its subtree.
    ///
    /// Ids into the removed subtree become stale.
    ///
    /// # Panics
    ///
    /// Panics if `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        let pos = self.child_position(parent, child);
        self.node_mut(parent).children.remove(pos);
        self.node_mut(child).parent = None;
        self.free_subtree(child);
    }

    /// Remove and free every child of `parent`.
    pub fn remove_children(&mut self, parent: NodeId) {
        let children = core::mem::take(&mut self.node_mut(parent).children);
        for child in children {
            self.node_mut(child).parent = None;
            self.free_subtree(child);
        }
    }

    /// Put the detached node `new` at the position of `old`, then free `old`'s
    /// subtree.
    ///
    /// This is a single step: there is no state in which both nodes, or
    /// neither, are in the tree.
    ///
    /// # Panics
    ///
    /// Panics if `old` is not currently a child of some node, or if `new`
    /// cannot be attached there (see [`Tree::add_child`]).
    pub fn replace(&mut self, old: NodeId, new: NodeId) {
        let Some(parent) = self.node(old).parent else {
            panic!("replace: {old:?} is not a child of any node");
        };
        self.check_attachable(parent, new);
        let pos = self.child_position(parent, old);
        self.node_mut(parent).children[pos] = new;
        self.node_mut(new).parent = Some(parent);
        self.node_mut(old).parent = None;
        self.free_subtree(old);
    }

    /// Free a node and its subtree, detaching it from its parent first.
    ///
    /// Stale ids are ignored.
    ///
    /// # Panics
    ///
    /// Panics if `id` is the root.
    pub fn remove(&mut self, id: NodeId) {
        assert_ne!(id, self.root, "the root node cannot be removed");
        if !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.node(id).parent {
            let pos = self.child_position(parent, id);
            self.node_mut(parent).children.remove(pos);
        }
        self.free_subtree(id);
    }

    /// Update the explicit size. A zero component lets the solver derive that axis.
    pub fn set_size(&mut self, id: NodeId, size: Size) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.size = size;
        }
    }

    /// Update margins.
    pub fn set_margins(&mut self, id: NodeId, margins: Insets) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.margins = margins;
        }
    }

    /// Update how the node arranges its children.
    pub fn set_container(&mut self, id: NodeId, container: Container) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.container = container;
        }
    }

    /// Update how the node is placed within its parent.
    pub fn set_behave(&mut self, id: NodeId, behave: Behave) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.behave = behave;
        }
    }

    /// Update visibility. Hidden nodes and their subtrees are not drawn.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.visible = visible;
        }
    }

    /// Make a node visible.
    pub fn show(&mut self, id: NodeId) {
        self.set_visible(id, true);
    }

    /// Hide a node and its subtree.
    pub fn hide(&mut self, id: NodeId) {
        self.set_visible(id, false);
    }

    /// Install (or clear) the node's refresh hook.
    pub fn set_refresh(&mut self, id: NodeId, hook: Option<Box<dyn Refresh<I, S>>>) {
        if let Some(n) = self.node_opt_mut(id) {
            n.refresh = hook;
        }
    }

    /// Returns true if `id` refers to a live node.
    ///
    /// A `NodeId` is considered live if its slot exists and its generation matches
    /// the current generation stored in that slot.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .map(|n| n.generation == id.1)
            .unwrap_or(false)
    }

    /// Return the solved rectangle of a live node.
    ///
    /// Rectangles are valid after the [`Tree::run`] that follows the node
    /// joining the tree. Before that, this is [`Rect::ZERO`]. Returns `None`
    /// for stale identifiers.
    pub fn rect(&self, id: NodeId) -> Option<Rect> {
        self.node_opt(id).map(|n| n.rect)
    }

    /// Returns the consumer-set state of a live node.
    pub fn local(&self, id: NodeId) -> Option<&LocalNode<I>> {
        self.node_opt(id).map(|n| &n.local)
    }

    /// Returns whether a live node is visible.
    pub fn visible(&self, id: NodeId) -> Option<bool> {
        self.node_opt(id).map(|n| n.local.visible)
    }

    /// Returns the image drawn by a live bitmap leaf.
    pub fn image(&self, id: NodeId) -> Option<&Rc<I>> {
        self.node_opt(id).and_then(|n| n.local.content.image())
    }

    /// Returns the parent of a node if live, or `None` for the root, detached
    /// nodes, or stale ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id).and_then(|n| n.parent)
    }

    /// Get the children of a node, or empty slice if node is stale.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.node_opt(id).map_or(&[], |n| &n.children)
    }

    /// Returns true if the node has no children (or is stale).
    pub fn is_empty(&self, id: NodeId) -> bool {
        self.children_of(id).is_empty()
    }

    /// Run the frame pipeline and solve the layout.
    ///
    /// In order: the refresh pass runs every hook, pre-order, over the whole
    /// tree; the solver is reset; the populate pass recreates every reachable
    /// node as a solver item and pushes its attributes; the solver runs; the
    /// readback pass copies solved rectangles onto every reachable node,
    /// visible or not.
    pub fn run(&mut self) -> Result<(), SolveError> {
        self.refresh_all();
        self.solver.reset();
        let mut count = 0;
        self.populate(self.root, &mut count);
        log::trace!("populated {count} solver items");
        if let Err(err) = self.solver.run() {
            log::warn!("layout solve failed: {err}");
            return Err(err);
        }
        self.read_back();
        Ok(())
    }

    /// Draw the tree onto `surface`, pre-order, as of the last [`Tree::run`].
    ///
    /// A hidden node prunes its whole subtree: neither it nor any
    /// descendant is drawn.
    pub fn render<T: Surface<I> + ?Sized>(&self, surface: &mut T) {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            if !node.local.visible {
                continue;
            }
            node.local.content.draw(surface, node.rect);
            stack.extend(node.children.iter().rev().copied());
        }
    }

    /// Access a node; panics if `id` is stale.
    pub(crate) fn node(&self, id: NodeId) -> &Node<I, S> {
        self.node_opt(id).expect("dangling NodeId")
    }

    /// Access a node mutably; panics if `id` is stale.
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<I, S> {
        self.node_opt_mut(id).expect("dangling NodeId")
    }
}

impl<I: ?Sized, S: Solver> Tree<I, S> {
    // --- internals ---

    fn node_opt(&self, id: NodeId) -> Option<&Node<I, S>> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node<I, S>> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn child_position(&self, parent: NodeId, child: NodeId) -> usize {
        let Some(pos) = self.node(parent).children.iter().position(|&c| c == child) else {
            panic!("{child:?} is not a child of {parent:?}");
        };
        pos
    }

    fn check_attachable(&self, parent: NodeId, child: NodeId) {
        assert!(
            self.node(child).parent.is_none(),
            "{child:?} is already attached to a parent"
        );
        let mut current = Some(parent);
        while let Some(id) = current {
            assert_ne!(id, child, "attaching {child:?} under {parent:?} would form a cycle");
            current = self.node(id).parent;
        }
    }

    fn free_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes[id.idx()].take() else {
                unreachable!("subtree slots are occupied");
            };
            stack.extend(node.children);
            self.free_list.push(id.idx());
        }
    }

    fn refresh_all(&mut self) {
        self.pass = self.pass.wrapping_add(1).max(1);
        self.refresh_subtree(self.root);
    }

    fn refresh_subtree(&mut self, id: NodeId) {
        let pass = self.pass;
        let node = self.node_mut(id);
        node.pass = pass;
        if let Some(mut hook) = node.refresh.take() {
            hook.refresh(self, id);
            match self.node_opt_mut(id) {
                Some(n) if n.refresh.is_none() => n.refresh = Some(hook),
                Some(_) => {}
                None => return,
            }
        }
        // Children are re-read after every visit: a hook may insert, replace,
        // or remove its siblings.
        let mut i = 0;
        while let Some(&child) = self.node_opt(id).and_then(|n| n.children.get(i)) {
            if self.node(child).pass == pass {
                i += 1;
            } else {
                self.refresh_subtree(child);
            }
        }
    }

    fn populate(&mut self, id: NodeId, count: &mut usize) -> ItemId {
        let item = self.solver.create();
        *count += 1;
        self.node_mut(id).item = Some(item);

        let children = self.node(id).children.clone();
        let mut previous: Option<ItemId> = None;
        for child in children {
            let child_item = self.populate(child, count);
            match previous {
                None => self.solver.insert(item, child_item),
                Some(prev) => self.solver.append(prev, child_item),
            }
            previous = Some(child_item);
        }

        let local = &self.node(id).local;
        let (size, margins, container, behave) =
            (local.size, local.margins, local.container, local.behave);
        self.solver.set_size(item, size);
        self.solver.set_margins(item, margins);
        self.solver.set_contain(item, container);
        self.solver.set_behave(item, behave);
        item
    }

    fn read_back(&mut self) {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let item = self.node_mut(id).item.take();
            if let Some(item) = item {
                let rect = self.solver.rect(item);
                self.node_mut(id).rect = rect;
            }
            stack.extend(self.node(id).children.iter().rev().copied());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Image;
    use core::cell::Cell;
    use alloc::vec;
    use lintel_solver::Justify;

    #[derive(Debug)]
    struct Bitmap {
        name: &'static str,
        size: Size,
    }

    impl Bitmap {
        fn new(name: &'static str, width: f64, height: f64) -> Rc<Self> {
            Rc::new(Self {
                name,
                size: Size::new(width, height),
            })
        }
    }

    impl Image for Bitmap {
        fn size(&self) -> Size {
            self.size
        }
    }

    /// Records every blit as (image name, rect).
    #[derive(Debug, Default)]
    struct Canvas {
        blits: Vec<(&'static str, Rect)>,
    }

    impl Surface<Bitmap> for Canvas {
        fn blit(&mut self, image: &Bitmap, rect: Rect) {
            self.blits.push((image.name, rect));
        }
    }

    fn render(tree: &Tree<Bitmap>) -> Vec<(&'static str, Rect)> {
        let mut canvas = Canvas::default();
        tree.render(&mut canvas);
        canvas.blits
    }

    fn leaf(tree: &mut Tree<Bitmap>, parent: NodeId, name: &'static str) -> NodeId {
        tree.insert(Some(parent), LocalNode::bitmap(Bitmap::new(name, 10.0, 10.0)))
    }

    fn row(tree: &mut Tree<Bitmap>, width: f64) -> NodeId {
        let root = tree.root();
        tree.insert(
            Some(root),
            LocalNode {
                size: Size::new(width, 0.0),
                container: Container::row().justify(Justify::Start),
                ..LocalNode::default()
            },
        )
    }

    fn names(tree: &Tree<Bitmap>, parent: NodeId) -> Vec<&'static str> {
        tree.children_of(parent)
            .iter()
            .map(|&c| tree.image(c).map_or("-", |i| i.name))
            .collect()
    }

    #[test]
    fn fill_child_takes_remaining_row_space() {
        let mut tree: Tree<Bitmap> = Tree::new();
        let root = tree.root();
        let container = tree.insert(
            Some(root),
            LocalNode {
                size: Size::new(100.0, 0.0),
                container: Container::row(),
                ..LocalNode::default()
            },
        );
        let child1 = tree.insert(
            Some(container),
            LocalNode {
                size: Size::new(10.0, 10.0),
                ..LocalNode::default()
            },
        );
        let child2 = tree.insert(
            Some(container),
            LocalNode {
                size: Size::new(0.0, 10.0),
                behave: Behave::HFILL,
                ..LocalNode::default()
            },
        );
        tree.run().unwrap();

        assert_eq!(tree.rect(child1), Some(Rect::new(0.0, 0.0, 10.0, 10.0)));
        assert_eq!(tree.rect(child2), Some(Rect::new(10.0, 0.0, 100.0, 10.0)));
        assert_eq!(tree.rect(child2).unwrap().width(), 90.0);
    }

    #[test]
    fn rect_is_zero_before_first_run() {
        let mut tree: Tree<Bitmap> = Tree::new();
        let bar = row(&mut tree, 50.0);
        let a = leaf(&mut tree, bar, "a");
        assert_eq!(tree.rect(a), Some(Rect::ZERO));
        tree.run().unwrap();
        let b = leaf(&mut tree, bar, "b");
        assert_eq!(tree.rect(b), Some(Rect::ZERO), "joined after the last run");
        assert_ne!(tree.rect(a), Some(Rect::ZERO));
    }

    #[test]
    fn bitmap_leaf_seeds_size_and_centers() {
        let local = LocalNode::bitmap(Bitmap::new("icon", 32.0, 16.0));
        assert_eq!(local.size, Size::new(32.0, 16.0));
        assert_eq!(local.behave, Behave::CENTER);

        let mut tree: Tree<Bitmap> = Tree::new();
        let root = tree.root();
        let id = tree.insert(Some(root), local);
        assert_eq!(tree.local(id).unwrap().size, Size::new(32.0, 16.0));
    }

    #[test]
    fn render_blits_leaves_in_order_at_solved_rects() {
        let mut tree: Tree<Bitmap> = Tree::new();
        let bar = row(&mut tree, 100.0);
        leaf(&mut tree, bar, "a");
        leaf(&mut tree, bar, "b");
        tree.run().unwrap();

        assert_eq!(
            render(&tree),
            vec![
                ("a", Rect::new(0.0, 0.0, 10.0, 10.0)),
                ("b", Rect::new(10.0, 0.0, 20.0, 10.0)),
            ]
        );
    }

    #[test]
    fn hidden_ancestor_prunes_subtree() {
        let mut tree: Tree<Bitmap> = Tree::new();
        let bar = row(&mut tree, 100.0);
        leaf(&mut tree, bar, "a");
        let group = tree.insert(
            Some(bar),
            LocalNode {
                container: Container::row(),
                ..LocalNode::default()
            },
        );
        let inner = leaf(&mut tree, group, "inner");
        leaf(&mut tree, group, "inner2");
        leaf(&mut tree, bar, "c");
        tree.run().unwrap();

        tree.hide(group);
        let drawn: Vec<_> = render(&tree).into_iter().map(|(n, _)| n).collect();
        assert_eq!(drawn, vec!["a", "c"]);

        // Showing the descendant alone is not enough while its ancestor is hidden.
        tree.show(inner);
        let drawn: Vec<_> = render(&tree).into_iter().map(|(n, _)| n).collect();
        assert_eq!(drawn, vec!["a", "c"]);

        tree.hide(tree.root());
        assert!(render(&tree).is_empty());
    }

    #[test]
    fn visibility_does_not_affect_layout() {
        let mut tree: Tree<Bitmap> = Tree::new();
        let bar = row(&mut tree, 100.0);
        let a = leaf(&mut tree, bar, "a");
        let b = leaf(&mut tree, bar, "b");
        let c = leaf(&mut tree, bar, "c");
        tree.run().unwrap();
        let before: Vec<_> = [a, b, c].iter().map(|&n| tree.rect(n)).collect();

        tree.hide(b);
        tree.run().unwrap();
        let after: Vec<_> = [a, b, c].iter().map(|&n| tree.rect(n)).collect();
        assert_eq!(before, after);
        assert_eq!(tree.rect(b), Some(Rect::new(10.0, 0.0, 20.0, 10.0)));
    }

    #[test]
    fn hide_and_show_without_run_restores_output() {
        let mut tree: Tree<Bitmap> = Tree::new();
        let bar = row(&mut tree, 100.0);
        leaf(&mut tree, bar, "a");
        let b = leaf(&mut tree, bar, "b");
        tree.run().unwrap();
        let first = render(&tree);

        tree.set_visible(b, false);
        assert_eq!(render(&tree), vec![first[0]]);
        tree.set_visible(b, true);
        assert_eq!(render(&tree), first);
    }

    #[test]
    fn consecutive_runs_are_identical() {
        let mut tree: Tree<Bitmap> = Tree::new();
        let bar = row(&mut tree, 73.0);
        let mut ids = vec![bar];
        for name in ["a", "b", "c"] {
            let id = leaf(&mut tree, bar, name);
            tree.set_margins(id, Insets::new(1.5, 0.0, 0.25, 0.0));
            ids.push(id);
        }
        let fill = tree.insert(
            Some(bar),
            LocalNode {
                behave: Behave::FILL,
                ..LocalNode::default()
            },
        );
        ids.push(fill);

        tree.run().unwrap();
        let first: Vec<_> = ids.iter().map(|&n| tree.rect(n).unwrap()).collect();
        tree.run().unwrap();
        let second: Vec<_> = ids.iter().map(|&n| tree.rect(n).unwrap()).collect();
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.x0.to_bits(), b.x0.to_bits(), "x0 differs");
            assert_eq!(a.y0.to_bits(), b.y0.to_bits(), "y0 differs");
            assert_eq!(a.x1.to_bits(), b.x1.to_bits(), "x1 differs");
            assert_eq!(a.y1.to_bits(), b.y1.to_bits(), "y1 differs");
        }
    }

    #[test]
    fn add_sibling_then_remove_child_swaps_in_place() {
        let mut tree: Tree<Bitmap> = Tree::new();
        let bar = row(&mut tree, 100.0);
        leaf(&mut tree, bar, "a");
        let b = leaf(&mut tree, bar, "b");
        leaf(&mut tree, bar, "c");

        let b2 = tree.insert(None, LocalNode::bitmap(Bitmap::new("b2", 10.0, 10.0)));
        tree.add_sibling(b, b2);
        assert_eq!(names(&tree, bar), vec!["a", "b", "b2", "c"]);
        tree.remove_child(bar, b);
        assert_eq!(names(&tree, bar), vec!["a", "b2", "c"]);
        assert!(!tree.is_alive(b));
        assert_eq!(tree.parent_of(b2), Some(bar));
    }

    #[test]
    fn replace_matches_two_step_swap() {
        let mut tree: Tree<Bitmap> = Tree::new();
        let bar = row(&mut tree, 100.0);
        let a = leaf(&mut tree, bar, "a");
        leaf(&mut tree, bar, "b");
        tree.run().unwrap();
        let old_rect = tree.rect(a);

        let a2 = tree.insert(None, LocalNode::bitmap(Bitmap::new("a2", 10.0, 10.0)));
        tree.replace(a, a2);
        assert_eq!(names(&tree, bar), vec!["a2", "b"]);
        assert!(!tree.is_alive(a));

        tree.run().unwrap();
        assert_eq!(tree.rect(a2), old_rect);
    }

    #[test]
    fn add_sibling_after_last_appends() {
        let mut tree: Tree<Bitmap> = Tree::new();
        let bar = row(&mut tree, 100.0);
        leaf(&mut tree, bar, "a");
        let b = leaf(&mut tree, bar, "b");
        let c = tree.insert(None, LocalNode::bitmap(Bitmap::new("c", 10.0, 10.0)));
        tree.add_sibling(b, c);
        assert_eq!(names(&tree, bar), vec!["a", "b", "c"]);
    }

    #[test]
    #[should_panic(expected = "is not a child of any node")]
    fn add_sibling_of_detached_node_panics() {
        let mut tree: Tree<Bitmap> = Tree::new();
        let loose = tree.insert(None, LocalNode::default());
        let new = tree.insert(None, LocalNode::default());
        tree.add_sibling(loose, new);
    }

    #[test]
    #[should_panic(expected = "is not a child of")]
    fn remove_non_child_panics() {
        let mut tree: Tree<Bitmap> = Tree::new();
        let bar = row(&mut tree, 100.0);
        let other = row(&mut tree, 100.0);
        let a = leaf(&mut tree, other, "a");
        tree.remove_child(bar, a);
    }

    #[test]
    #[should_panic(expected = "already attached")]
    fn attaching_an_attached_node_panics() {
        let mut tree: Tree<Bitmap> = Tree::new();
        let bar = row(&mut tree, 100.0);
        let other = row(&mut tree, 100.0);
        let a = leaf(&mut tree, bar, "a");
        tree.add_child(other, a);
    }

    #[test]
    #[should_panic(expected = "would form a cycle")]
    fn attaching_an_ancestor_panics() {
        let mut tree: Tree<Bitmap> = Tree::new();
        let loose = tree.insert(None, LocalNode::default());
        let inner = tree.insert(Some(loose), LocalNode::default());
        tree.remove_child(loose, inner);
        let inner = tree.insert(Some(loose), LocalNode::default());
        // `loose` is detached, but it is an ancestor of `inner`.
        tree.add_child(inner, loose);
    }

    #[test]
    #[should_panic(expected = "cannot be removed")]
    fn removing_root_panics() {
        let mut tree: Tree<Bitmap> = Tree::new();
        tree.remove(tree.root());
    }

    #[test]
    fn remove_children_frees_subtrees() {
        let mut tree: Tree<Bitmap> = Tree::new();
        let bar = row(&mut tree, 100.0);
        let a = leaf(&mut tree, bar, "a");
        let group = tree.insert(Some(bar), LocalNode::default());
        let deep = leaf(&mut tree, group, "deep");
        assert!(!tree.is_empty(bar));

        tree.remove_children(bar);
        assert!(tree.is_empty(bar));
        for id in [a, group, deep] {
            assert!(!tree.is_alive(id));
        }
        tree.run().unwrap();
        assert!(render(&tree).is_empty());
    }

    #[test]
    fn liveness_insert_remove_reuse() {
        let mut tree: Tree<Bitmap> = Tree::new();
        let bar = row(&mut tree, 100.0);
        let a = leaf(&mut tree, bar, "a");
        tree.remove(a);
        assert!(!tree.is_alive(a));
        assert!(tree.is_empty(bar));

        // Likely reuses a's slot, but the generation bumps.
        let b = leaf(&mut tree, bar, "b");
        assert!(tree.is_alive(b));
        assert!(!tree.is_alive(a));
        if a.0 == b.0 {
            assert!(b.1 > a.1, "generation must increase on reuse");
        }

        // Stale ids read as absent and ignore setters.
        assert_eq!(tree.rect(a), None);
        assert_eq!(tree.parent_of(a), None);
        assert!(tree.children_of(a).is_empty());
        tree.set_size(a, Size::new(99.0, 99.0));
        tree.hide(a);
        assert_eq!(tree.local(b).unwrap().size, Size::new(10.0, 10.0));
        assert_eq!(tree.visible(b), Some(true));
    }

    #[test]
    fn detached_nodes_are_not_laid_out() {
        let mut tree: Tree<Bitmap> = Tree::new();
        let bar = row(&mut tree, 100.0);
        leaf(&mut tree, bar, "a");
        let loose = tree.insert(None, LocalNode::bitmap(Bitmap::new("loose", 10.0, 10.0)));
        tree.run().unwrap();
        assert_eq!(tree.rect(loose), Some(Rect::ZERO));
        assert_eq!(render(&tree).len(), 1);

        tree.add_child(bar, loose);
        tree.run().unwrap();
        assert_eq!(tree.rect(loose), Some(Rect::new(10.0, 0.0, 20.0, 10.0)));
    }

    #[test]
    fn setters_apply_on_next_run() {
        let mut tree: Tree<Bitmap> = Tree::new();
        let bar = row(&mut tree, 100.0);
        let a = leaf(&mut tree, bar, "a");
        let b = leaf(&mut tree, bar, "b");
        tree.run().unwrap();

        tree.set_margins(b, Insets::new(5.0, 0.0, 0.0, 0.0));
        tree.set_size(a, Size::new(20.0, 10.0));
        assert_eq!(tree.rect(b), Some(Rect::new(10.0, 0.0, 20.0, 10.0)));
        tree.run().unwrap();
        assert_eq!(tree.rect(b), Some(Rect::new(25.0, 0.0, 35.0, 10.0)));

        tree.set_container(bar, Container::row().justify(Justify::End));
        tree.set_behave(a, Behave::TOP);
        tree.run().unwrap();
        assert_eq!(tree.rect(b).unwrap().x1, 100.0);
    }

    #[test]
    fn refresh_hook_replaces_leaf_before_solve() {
        let mut tree: Tree<Bitmap> = Tree::new();
        let bar = row(&mut tree, 100.0);
        let text = leaf(&mut tree, bar, "old");
        leaf(&mut tree, bar, "tail");

        let mut current = text;
        let hook = move |tree: &mut Tree<Bitmap>, _node: NodeId| {
            let new = tree.insert(None, LocalNode::bitmap(Bitmap::new("new", 30.0, 10.0)));
            tree.replace(current, new);
            current = new;
        };
        tree.set_refresh(bar, Some(Box::new(hook)));
        tree.run().unwrap();

        assert!(!tree.is_alive(text));
        assert_eq!(
            render(&tree),
            vec![
                ("new", Rect::new(0.0, 0.0, 30.0, 10.0)),
                ("tail", Rect::new(30.0, 0.0, 40.0, 10.0)),
            ]
        );

        // The hook is kept and runs again on every frame.
        tree.run().unwrap();
        assert_eq!(tree.children_of(bar).len(), 2);
    }

    #[test]
    fn refresh_hook_can_remove_a_queued_sibling() {
        let mut tree: Tree<Bitmap> = Tree::new();
        let bar = row(&mut tree, 100.0);
        let first = tree.insert(Some(bar), LocalNode::default());
        let doomed = leaf(&mut tree, bar, "doomed");
        let hook = move |tree: &mut Tree<Bitmap>, _node: NodeId| {
            if tree.is_alive(doomed) {
                tree.remove(doomed);
            }
        };
        tree.set_refresh(first, Some(Box::new(hook)));
        tree.run().unwrap();
        assert!(render(&tree).is_empty());
        assert_eq!(tree.children_of(bar), &[first]);
    }

    #[test]
    fn sibling_inserted_by_hook_refreshes_in_same_run() {
        let mut tree: Tree<Bitmap> = Tree::new();
        let bar = row(&mut tree, 100.0);
        let first = tree.insert(Some(bar), LocalNode::default());
        let ran = Rc::new(Cell::new(0));

        let seen = Rc::clone(&ran);
        let hook = move |tree: &mut Tree<Bitmap>, node: NodeId| {
            if tree.children_of(bar).len() > 1 {
                return;
            }
            let sibling = tree.insert(None, LocalNode::default());
            let seen = Rc::clone(&seen);
            tree.set_refresh(
                sibling,
                Some(Box::new(move |_: &mut Tree<Bitmap>, _: NodeId| {
                    seen.set(seen.get() + 1);
                })),
            );
            tree.add_sibling(node, sibling);
        };
        tree.set_refresh(first, Some(Box::new(hook)));

        tree.run().unwrap();
        assert_eq!(ran.get(), 1, "the new sibling's hook runs in the same pass");
        tree.run().unwrap();
        assert_eq!(ran.get(), 2, "and once per pass afterwards");
    }

    #[test]
    fn replacement_subtree_refreshes_in_same_run() {
        let mut tree: Tree<Bitmap> = Tree::new();
        let bar = row(&mut tree, 100.0);
        let old = tree.insert(Some(bar), LocalNode::default());
        let ran = Rc::new(Cell::new(0));

        let seen = Rc::clone(&ran);
        let hook = move |tree: &mut Tree<Bitmap>, node: NodeId| {
            let group = tree.insert(None, LocalNode::default());
            let inner = leaf(tree, group, "inner");
            let seen = Rc::clone(&seen);
            tree.set_refresh(
                inner,
                Some(Box::new(move |_: &mut Tree<Bitmap>, _: NodeId| {
                    seen.set(seen.get() + 1);
                })),
            );
            tree.replace(node, group);
        };
        tree.set_refresh(old, Some(Box::new(hook)));

        tree.run().unwrap();
        assert!(!tree.is_alive(old));
        assert_eq!(ran.get(), 1);
        let group = tree.children_of(bar)[0];
        let inner = tree.children_of(group)[0];
        assert_eq!(tree.rect(inner), Some(Rect::new(0.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn image_identity_is_exposed() {
        let mut tree: Tree<Bitmap> = Tree::new();
        let bar = row(&mut tree, 100.0);
        let icon = Bitmap::new("battery", 10.0, 10.0);
        let id = tree.insert(Some(bar), LocalNode::bitmap(Rc::clone(&icon)));
        assert!(Rc::ptr_eq(tree.image(id).unwrap(), &icon));
        assert!(tree.image(bar).is_none());

        tree.remove(id);
        assert_eq!(Rc::strong_count(&icon), 1, "removal releases the tree's share");
    }

    /// Solver calls observed during a run.
    #[derive(Clone, Copy, Debug, PartialEq)]
    enum Call {
        Reset,
        Create(ItemId),
        Insert(ItemId, ItemId),
        Append(ItemId, ItemId),
        Size(ItemId, Size),
        Run,
    }

    /// Wraps the default solver and records the populate protocol.
    #[derive(Debug, Default)]
    struct Recorder {
        inner: TaffySolver,
        calls: Vec<Call>,
    }

    impl Solver for Recorder {
        fn reset(&mut self) {
            self.calls.push(Call::Reset);
            self.inner.reset();
        }

        fn create(&mut self) -> ItemId {
            let id = self.inner.create();
            self.calls.push(Call::Create(id));
            id
        }

        fn insert(&mut self, parent: ItemId, child: ItemId) {
            self.calls.push(Call::Insert(parent, child));
            self.inner.insert(parent, child);
        }

        fn append(&mut self, earlier: ItemId, later: ItemId) {
            self.calls.push(Call::Append(earlier, later));
            self.inner.append(earlier, later);
        }

        fn set_size(&mut self, id: ItemId, size: Size) {
            self.calls.push(Call::Size(id, size));
            self.inner.set_size(id, size);
        }

        fn set_margins(&mut self, id: ItemId, margins: Insets) {
            self.inner.set_margins(id, margins);
        }

        fn set_contain(&mut self, id: ItemId, container: Container) {
            self.inner.set_contain(id, container);
        }

        fn set_behave(&mut self, id: ItemId, behave: Behave) {
            self.inner.set_behave(id, behave);
        }

        fn run(&mut self) -> Result<(), SolveError> {
            self.calls.push(Call::Run);
            self.inner.run()
        }

        fn rect(&self, id: ItemId) -> Rect {
            self.inner.rect(id)
        }
    }

    #[test]
    fn populate_links_first_child_then_appends() {
        let mut tree: Tree<Bitmap, Recorder> = Tree::default();
        let root = tree.root();
        let bar = tree.insert(Some(root), LocalNode::default());
        for name in ["a", "b"] {
            tree.insert(Some(bar), LocalNode::bitmap(Bitmap::new(name, 4.0, 2.0)));
        }
        tree.run().unwrap();

        let [r, b, x, y] = [0, 1, 2, 3].map(ItemId::new);
        let leaf = Size::new(4.0, 2.0);
        assert_eq!(
            tree.solver().calls,
            vec![
                Call::Reset,
                Call::Create(r),
                Call::Create(b),
                Call::Create(x),
                Call::Size(x, leaf),
                Call::Insert(b, x),
                Call::Create(y),
                Call::Size(y, leaf),
                Call::Append(x, y),
                Call::Size(b, Size::ZERO),
                Call::Insert(r, b),
                Call::Size(r, Size::ZERO),
                Call::Run,
            ]
        );
    }

    #[test]
    fn every_run_starts_from_a_fresh_context() {
        let mut tree: Tree<Bitmap, Recorder> = Tree::default();
        let root = tree.root();
        tree.insert(Some(root), LocalNode::default());
        tree.run().unwrap();
        tree.run().unwrap();

        let calls = &tree.solver().calls;
        let resets = calls.iter().filter(|c| **c == Call::Reset).count();
        assert_eq!(resets, 2);
        let creates = calls
            .iter()
            .filter(|c| matches!(c, Call::Create(_)))
            .count();
        assert_eq!(creates, 4, "handles are recreated, never reused");
        assert_eq!(tree.solver().inner.len(), 2);
    }
}
