//! Color constants shared by every projection.
//!
//! Colors are plain RGB values so the core stays independent of any
//! rendering toolkit. With the `egui` feature they convert straight into
//! `egui::Color32` for an egui-based adapter.

use std::fmt;

use serde::{Serialize, Serializer};

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// CSS-style `#rrggbb`.
    pub fn hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "egui")]
impl From<Rgb> for egui::Color32 {
    fn from(c: Rgb) -> Self {
        egui::Color32::from_rgb(c.r, c.g, c.b)
    }
}

/// Group palette, indexed by the numeric part of the group id
pub mod group {
    use super::Rgb;

    pub const PURPLE: Rgb = Rgb::new(139, 92, 246);
    pub const CYAN: Rgb = Rgb::new(6, 182, 212);
    pub const AMBER: Rgb = Rgb::new(245, 158, 11);
    pub const EMERALD: Rgb = Rgb::new(16, 185, 129);
    pub const RED: Rgb = Rgb::new(239, 68, 68);
    pub const PINK: Rgb = Rgb::new(236, 72, 153);
    pub const INDIGO: Rgb = Rgb::new(99, 102, 241);
    pub const LIME: Rgb = Rgb::new(132, 204, 22);
    pub const ORANGE: Rgb = Rgb::new(249, 115, 22);
    pub const TEAL: Rgb = Rgb::new(20, 184, 166);

    pub const PALETTE: [Rgb; 10] = [
        PURPLE, CYAN, AMBER, EMERALD, RED, PINK, INDIGO, LIME, ORANGE, TEAL,
    ];

    /// Tabs that belong to no group
    pub const UNGROUPED: Rgb = Rgb::new(107, 114, 128);
}

/// Edge colors for adapters that style by reason
pub mod edge {
    use super::Rgb;

    /// Default relation line
    pub const DEFAULT: Rgb = Rgb::new(74, 85, 104);

    /// Navigation edges are drawn directed and highlighted
    pub const NAVIGATION: Rgb = Rgb::new(52, 211, 153);
}

/// Line widths by edge reason
pub mod stroke_width {
    pub const EDGE: f32 = 1.0;

    /// Twice the regular edge
    pub const NAVIGATION_EDGE: f32 = 2.0;
}

/// Node diameter for every projected tab
pub const NODE_SIZE: f32 = 20.0;
