use serde::{Deserialize, Serialize};

use super::{Aabb, Transform};

/// Axis-aligned box collider, positioned relative to the entity's
/// [`Transform`].
///
/// `solid` colliders push each other apart; a `trigger` only reports
/// overlaps and is never displaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub width: f64,
    pub height: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub solid: bool,
    pub trigger: bool,
}

impl Collider {
    /// A solid, non-trigger box of the given size with no offset.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            offset_x: 0.0,
            offset_y: 0.0,
            solid: true,
            trigger: false,
        }
    }

    pub fn with_offset(mut self, offset_x: f64, offset_y: f64) -> Self {
        self.offset_x = offset_x;
        self.offset_y = offset_y;
        self
    }

    /// Turn this collider into a trigger volume.
    pub fn as_trigger(mut self) -> Self {
        self.trigger = true;
        self
    }

    pub fn with_solid(mut self, solid: bool) -> Self {
        self.solid = solid;
        self
    }

    /// Whether overlaps with this collider may be resolved positionally.
    pub fn blocks(&self) -> bool {
        self.solid && !self.trigger
    }

    /// World-space bounds for this collider placed at `transform`.
    pub fn aabb(&self, transform: &Transform) -> Aabb {
        Aabb::new(
            transform.x + self.offset_x,
            transform.y + self.offset_y,
            self.width,
            self.height,
        )
    }
}

impl Default for Collider {
    fn default() -> Self {
        Self::new(16.0, 16.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aabb_follows_transform_and_offset() {
        let collider = Collider::new(8.0, 4.0).with_offset(2.0, -1.0);
        let aabb = collider.aabb(&Transform::new(10.0, 20.0));
        assert_eq!(aabb, Aabb::new(12.0, 19.0, 8.0, 4.0));
    }

    #[test]
    fn triggers_never_block() {
        assert!(Collider::default().blocks());
        assert!(!Collider::default().as_trigger().blocks());
        assert!(!Collider::default().with_solid(false).blocks());
    }
}
