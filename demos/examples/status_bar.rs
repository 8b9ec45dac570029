// Copyright 2025 the Lintel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drive a status bar through a few frames and print what gets drawn.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p lintel_demos --example status_bar`

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::{Rect, Size};
use lintel_demos::status_bar::{DiskSpace, StatusBar, StatusBarConfig, StatusIcons, StatusSource};
use lintel_tree::{Image, NodeId, Surface, Tree};

/// A named stand-in for a decoded image.
#[derive(Debug)]
struct Sprite {
    name: String,
    size: Size,
}

impl Image for Sprite {
    fn size(&self) -> Size {
        self.size
    }
}

fn sprite(name: &str, width: f64, height: f64) -> Rc<Sprite> {
    Rc::new(Sprite {
        name: name.to_owned(),
        size: Size::new(width, height),
    })
}

/// Simulated device: the clock advances one minute per frame and the disk
/// slowly fills up.
struct Device {
    minute: u32,
    free_mib: u64,
    battery: [Rc<Sprite>; 2],
}

impl StatusSource<Sprite> for Device {
    fn disk_space(&mut self) -> Option<DiskSpace> {
        self.free_mib = self.free_mib.saturating_sub(700);
        Some(DiskSpace {
            free: self.free_mib * 1024 * 1024,
            capacity: 15_000 * 1024 * 1024,
        })
    }

    fn local_time(&mut self) -> Option<(u32, u32)> {
        self.minute += 1;
        Some((11 + self.minute / 60, self.minute % 60))
    }

    fn battery_icon(&mut self) -> Rc<Sprite> {
        let level = usize::from(self.minute > 2);
        Rc::clone(&self.battery[level])
    }

    fn render_text(&mut self, text: &str) -> Rc<Sprite> {
        // Fixed 6 unit wide glyphs.
        sprite(text, 6.0 * text.chars().count() as f64, 10.0)
    }
}

struct Printer;

impl Surface<Sprite> for Printer {
    fn blit(&mut self, image: &Sprite, rect: Rect) {
        println!(
            "  {:<14} x={:>5} y={:>4} w={:>4} h={:>4}",
            image.name,
            rect.x0,
            rect.y0,
            rect.width(),
            rect.height()
        );
    }
}

fn main() {
    env_logger::init();

    let mut tree: Tree<Sprite> = Tree::new();
    let root = tree.root();
    tree.set_size(root, Size::new(320.0, 240.0));

    let config = StatusBarConfig {
        clock_24h: false,
        ..StatusBarConfig::default()
    };
    let icons = StatusIcons {
        sd: sprite("sd", 16.0, 16.0),
        cpu: sprite("cpu", 16.0, 16.0),
        manual: sprite("manual", 16.0, 16.0),
    };
    let device = Device {
        minute: 58,
        free_mib: 5_000,
        battery: [sprite("battery-full", 8.0, 16.0), sprite("battery-low", 8.0, 16.0)],
    };
    let bar = StatusBar::new(&mut tree, root, config, icons, device);
    let node = bar.node();
    let bar = Rc::new(RefCell::new(bar));

    // Keep the bar at the bottom edge and poll it once per frame.
    tree.set_behave(node, lintel_tree::Behave::HFILL | lintel_tree::Behave::BOTTOM);
    let shared = Rc::clone(&bar);
    tree.set_refresh(
        node,
        Some(Box::new(move |tree: &mut Tree<Sprite>, _: NodeId| {
            shared.borrow_mut().update(tree);
        })),
    );

    for frame in 0..4 {
        match frame {
            1 => bar.borrow().enable_manual_icon(&mut tree, true),
            2 => bar.borrow_mut().show_cpu_freq(&mut tree, 336),
            3 => bar.borrow_mut().show_cpu_freq(&mut tree, 0),
            _ => {}
        }
        if let Err(err) = tree.run() {
            eprintln!("layout failed: {err}");
            return;
        }
        println!("frame {frame}:");
        tree.render(&mut Printer);
    }
}
