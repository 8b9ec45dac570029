// Copyright 2025 the Lintel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A launcher status bar.
//!
//! The bar is a row along the bottom of the screen. From left to right:
//!
//! - storage icon and free/total space text,
//! - CPU icon and frequency text (hidden until a frequency is shown),
//! - manual icon (hidden until enabled),
//! - a spacer that pushes the rest to the right edge,
//! - clock text and battery icon.
//!
//! Texts are rendered to images by a [`StatusSource`] and placed as bitmap
//! leaves. When a value changes, a new leaf is created and swapped in at the
//! old one's position, so the row keeps its order.

use std::rc::Rc;

use kurbo::{Insets, Size};
use lintel_tree::{Behave, Container, Image, Justify, LocalNode, NodeId, Solver, Tree};

/// Runtime options for a [`StatusBar`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatusBarConfig {
    /// Bar height in layout units. Half of it separates the items.
    pub height: f64,
    /// Show the clock as `HH:MM` instead of `HH:MMam`/`HH:MMpm`.
    pub clock_24h: bool,
}

impl Default for StatusBarConfig {
    fn default() -> Self {
        Self {
            height: 20.0,
            clock_24h: true,
        }
    }
}

/// Free and total capacity of the home file system, in bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiskSpace {
    /// Bytes available.
    pub free: u64,
    /// Total capacity in bytes.
    pub capacity: u64,
}

/// Everything the bar reads from the outside world.
pub trait StatusSource<I: ?Sized> {
    /// Current disk usage, or `None` if it cannot be queried.
    fn disk_space(&mut self) -> Option<DiskSpace>;
    /// Current local time as `(hours, minutes)`, or `None` without a clock.
    fn local_time(&mut self) -> Option<(u32, u32)>;
    /// Icon for the current battery level.
    ///
    /// Returning the same `Rc` as last time leaves the bar untouched.
    fn battery_icon(&mut self) -> Rc<I>;
    /// Render a line of text with the UI font.
    fn render_text(&mut self, text: &str) -> Rc<I>;
}

/// Static icons of the bar.
#[derive(Debug)]
pub struct StatusIcons<I: ?Sized> {
    /// Storage icon, before the disk text.
    pub sd: Rc<I>,
    /// CPU icon, before the frequency text.
    pub cpu: Rc<I>,
    /// Manual indicator.
    pub manual: Rc<I>,
}

/// Status bar widget. Owns its source and the ids of its nodes.
#[derive(Debug)]
pub struct StatusBar<P> {
    source: P,
    clock_24h: bool,
    margin: f64,
    node: NodeId,
    cpu: NodeId,
    manual: NodeId,
    sd_text: Option<NodeId>,
    cpu_text: Option<NodeId>,
    clock_text: Option<NodeId>,
    battery: Option<NodeId>,
    /// Last seen `(free, total)` in MiB.
    disk_mib: Option<(u64, u64)>,
    time: Option<(u32, u32)>,
    cpu_mhz: u64,
}

impl<P> StatusBar<P> {
    /// Build the bar under `parent` and fill in its initial texts.
    pub fn new<I, S>(
        tree: &mut Tree<I, S>,
        parent: NodeId,
        config: StatusBarConfig,
        icons: StatusIcons<I>,
        source: P,
    ) -> Self
    where
        I: Image + ?Sized,
        S: Solver,
        P: StatusSource<I>,
    {
        let margin = (config.height / 2.0).floor();
        let node = tree.insert(
            Some(parent),
            LocalNode {
                size: Size::new(0.0, config.height),
                container: Container::row().justify(Justify::Start),
                behave: Behave::HFILL,
                ..LocalNode::default()
            },
        );
        let left = Insets::new(margin, 0.0, 0.0, 0.0);
        let icon = |tree: &mut Tree<I, S>, image: Rc<I>| {
            let id = tree.insert(None, LocalNode::bitmap(image));
            tree.set_margins(id, left);
            id
        };

        let sd = icon(tree, icons.sd);
        tree.add_child(node, sd);
        let cpu = icon(tree, icons.cpu);
        let manual = icon(tree, icons.manual);
        tree.hide(cpu);
        tree.hide(manual);

        let mut bar = Self {
            source,
            clock_24h: config.clock_24h,
            margin,
            node,
            cpu,
            manual,
            sd_text: None,
            cpu_text: None,
            clock_text: None,
            battery: None,
            disk_mib: None,
            time: None,
            cpu_mhz: 0,
        };
        bar.update_disk_free_text(tree);

        tree.add_child(node, cpu);
        tree.add_child(node, manual);
        tree.insert(
            Some(node),
            LocalNode {
                behave: Behave::HFILL,
                ..LocalNode::default()
            },
        );
        bar.update_clock_text(tree);
        bar.update_battery_icon(tree);
        bar
    }

    /// The bar's row node.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The status source.
    pub fn source(&self) -> &P {
        &self.source
    }

    /// The status source, mutably.
    pub fn source_mut(&mut self) -> &mut P {
        &mut self.source
    }

    /// Poll the source and swap in new leaves for anything that changed.
    pub fn update<I, S>(&mut self, tree: &mut Tree<I, S>)
    where
        I: Image + ?Sized,
        S: Solver,
        P: StatusSource<I>,
    {
        self.update_disk_free_text(tree);
        self.update_clock_text(tree);
        self.update_battery_icon(tree);
    }

    /// Show or hide the manual indicator.
    pub fn enable_manual_icon<I: ?Sized, S: Solver>(&self, tree: &mut Tree<I, S>, enable: bool) {
        tree.set_visible(self.manual, enable);
    }

    /// Show the CPU frequency, or hide it with `mhz == 0`.
    pub fn show_cpu_freq<I, S>(&mut self, tree: &mut Tree<I, S>, mhz: u64)
    where
        I: Image + ?Sized,
        S: Solver,
        P: StatusSource<I>,
    {
        if mhz == 0 && self.cpu_mhz != 0 {
            tree.hide(self.cpu);
            if let Some(text) = self.cpu_text {
                tree.hide(text);
            }
        } else if mhz != self.cpu_mhz {
            let text = self.text_leaf(tree, &format!("{mhz}MHz"), Insets::ZERO);
            match self.cpu_text.replace(text) {
                Some(old) => tree.replace(old, text),
                None => tree.add_sibling(self.cpu, text),
            }
            tree.show(self.cpu);
        }
        self.cpu_mhz = mhz;
    }

    fn update_disk_free_text<I, S>(&mut self, tree: &mut Tree<I, S>)
    where
        I: Image + ?Sized,
        S: Solver,
        P: StatusSource<I>,
    {
        const MIB: u64 = 1024 * 1024;
        let space = self.source.disk_space().unwrap_or_default();
        let mib = (space.free / MIB, space.capacity / MIB);
        if self.disk_mib == Some(mib) {
            return;
        }
        self.disk_mib = Some(mib);

        let text = format_disk_free(mib.0, mib.1);
        log::debug!("disk free: {text}");
        let leaf = self.text_leaf(tree, &text, Insets::ZERO);
        self.swap_in(tree, Slot::SdText, leaf);
    }

    fn update_clock_text<I, S>(&mut self, tree: &mut Tree<I, S>)
    where
        I: Image + ?Sized,
        S: Solver,
        P: StatusSource<I>,
    {
        let Some(time) = self.source.local_time() else {
            return;
        };
        if self.time == Some(time) {
            return;
        }
        self.time = Some(time);

        let text = format_clock(time.0, time.1, self.clock_24h);
        let margins = Insets::new(self.margin, 0.0, self.margin, 0.0);
        let leaf = self.text_leaf(tree, &text, margins);
        self.swap_in(tree, Slot::ClockText, leaf);
    }

    fn update_battery_icon<I, S>(&mut self, tree: &mut Tree<I, S>)
    where
        I: Image + ?Sized,
        S: Solver,
        P: StatusSource<I>,
    {
        let icon = self.source.battery_icon();
        let unchanged = self
            .battery
            .and_then(|id| tree.image(id))
            .is_some_and(|current| Rc::ptr_eq(current, &icon));
        if unchanged {
            return;
        }
        let leaf = tree.insert(None, LocalNode::bitmap(icon));
        tree.set_margins(leaf, Insets::new(self.margin, 0.0, 0.0, 0.0));
        self.swap_in(tree, Slot::Battery, leaf);
    }

    fn text_leaf<I, S>(&mut self, tree: &mut Tree<I, S>, text: &str, margins: Insets) -> NodeId
    where
        I: Image + ?Sized,
        S: Solver,
        P: StatusSource<I>,
    {
        let leaf = tree.insert(None, LocalNode::bitmap(self.source.render_text(text)));
        tree.set_margins(leaf, margins);
        leaf
    }

    /// Put `leaf` where the slot's previous leaf was, or at the end of the row.
    fn swap_in<I: ?Sized, S: Solver>(&mut self, tree: &mut Tree<I, S>, slot: Slot, leaf: NodeId) {
        let current = match slot {
            Slot::SdText => &mut self.sd_text,
            Slot::ClockText => &mut self.clock_text,
            Slot::Battery => &mut self.battery,
        };
        match current.replace(leaf) {
            Some(old) => tree.replace(old, leaf),
            None => tree.add_child(self.node, leaf),
        }
    }
}

#[derive(Clone, Copy)]
enum Slot {
    SdText,
    ClockText,
    Battery,
}

/// Format disk usage given in MiB.
///
/// Totals of 10000 MiB and above switch to GiB with one truncated decimal.
///
/// ```
/// use lintel_demos::status_bar::format_disk_free;
///
/// assert_eq!(format_disk_free(812, 3904), "812/3904MiB");
/// assert_eq!(format_disk_free(5000, 15000), "4.8/14.6GiB");
/// ```
pub fn format_disk_free(free_mib: u64, total_mib: u64) -> String {
    if total_mib >= 10000 {
        let tenths = |mib: u64| ((mib % 1024) * 10) / 1024;
        format!(
            "{}.{}/{}.{}GiB",
            free_mib / 1024,
            tenths(free_mib),
            total_mib / 1024,
            tenths(total_mib)
        )
    } else {
        format!("{free_mib}/{total_mib}MiB")
    }
}

/// Format a wall-clock time.
///
/// The 12-hour form shows hours modulo 12, so noon reads `00:00pm`.
pub fn format_clock(hours: u32, minutes: u32, clock_24h: bool) -> String {
    if clock_24h {
        format!("{hours:02}:{minutes:02}")
    } else {
        let suffix = if hours >= 12 { "pm" } else { "am" };
        format!("{:02}:{minutes:02}{suffix}", hours % 12)
    }
}
