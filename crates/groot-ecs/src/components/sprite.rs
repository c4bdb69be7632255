use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque reference to a visual resource (typically an image path).
///
/// The engine never loads resources itself; the embedding layer does, and
/// reports readiness through the engine's resource table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResourceId {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for ResourceId {
    fn from(path: String) -> Self {
        Self(path)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// A drawable image attached to an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    /// `None` means nothing to draw yet.
    pub resource: Option<ResourceId>,
    pub width: f64,
    pub height: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub visible: bool,
    pub tint: Color,
}

impl Sprite {
    /// A visible 16x16 sprite drawing `resource`.
    pub fn new(resource: impl Into<ResourceId>) -> Self {
        Self {
            resource: Some(resource.into()),
            ..Self::default()
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_offset(mut self, offset_x: f64, offset_y: f64) -> Self {
        self.offset_x = offset_x;
        self.offset_y = offset_y;
        self
    }

    pub fn with_tint(mut self, tint: Color) -> Self {
        self.tint = tint;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

impl Default for Sprite {
    fn default() -> Self {
        Self {
            resource: None,
            width: 16.0,
            height: 16.0,
            offset_x: 0.0,
            offset_y: 0.0,
            visible: true,
            tint: Color::WHITE,
        }
    }
}
