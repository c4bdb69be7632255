//! The five component kinds and the small geometry types they share.

mod animation;
mod collider;
mod sprite;
mod transform;
mod velocity;

pub use animation::{Animation, AnimationClip, AnimationFrame, PlayOutcome};
pub use collider::Collider;
pub use sprite::{Color, ResourceId, Sprite};
pub use transform::Transform;
pub use velocity::Velocity;

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle: top-left corner plus extents.
///
/// Used both for collider bounds in world space and for source rectangles
/// inside a sprite sheet.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Bounding box derived from a [`Collider`] and a [`Transform`].
pub type Aabb = Rect;

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Strict intersection on both axes. Touching edges do not overlap.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Penetration depth along X, assuming the rectangles intersect.
    pub fn overlap_x(&self, other: &Rect) -> f64 {
        (self.right() - other.x).min(other.right() - self.x)
    }

    /// Penetration depth along Y, assuming the rectangles intersect.
    pub fn overlap_y(&self, other: &Rect) -> f64 {
        (self.bottom() - other.y).min(other.bottom() - self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 16.0, 16.0);
        let b = Rect::new(16.0, 0.0, 16.0, 16.0);
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));
    }

    #[test]
    fn overlap_is_symmetric() {
        let a = Rect::new(0.0, 0.0, 16.0, 16.0);
        let b = Rect::new(10.0, 4.0, 16.0, 16.0);
        assert!(a.intersects(&b));
        assert_eq!(a.overlap_x(&b), 6.0);
        assert_eq!(b.overlap_x(&a), 6.0);
        assert_eq!(a.overlap_y(&b), 12.0);
        assert_eq!(b.overlap_y(&a), 12.0);
    }

    #[test]
    fn contained_rect_overlap_is_smaller_span() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        let inner = Rect::new(40.0, 10.0, 8.0, 8.0);
        assert!(outer.intersects(&inner));
        assert_eq!(outer.overlap_x(&inner), 48.0);
        assert_eq!(outer.overlap_y(&inner), 18.0);
    }
}
