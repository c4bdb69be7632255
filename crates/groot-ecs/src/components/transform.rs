use serde::{Deserialize, Serialize};

/// World-space placement of an entity.
///
/// `prev_x`/`prev_y` hold the position at the start of the last simulation
/// step so the renderer can blend between the two states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub prev_x: f64,
    pub prev_y: f64,
    /// Rotation in radians, applied about the sprite center.
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Transform {
    /// A transform at `(x, y)` with no rotation and unit scale. The previous
    /// position starts equal to the current one.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            prev_x: x,
            prev_y: y,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    pub fn with_rotation(mut self, radians: f64) -> Self {
        self.rotation = radians;
        self
    }

    pub fn with_scale(mut self, scale_x: f64, scale_y: f64) -> Self {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self
    }

    /// Snapshot the current position as the previous one.
    pub fn update_previous(&mut self) {
        self.prev_x = self.x;
        self.prev_y = self.y;
    }

    /// Move to `(x, y)` without leaving an interpolation trail.
    pub fn teleport(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
        self.update_previous();
    }

    pub fn interpolated_x(&self, alpha: f64) -> f64 {
        self.prev_x + (self.x - self.prev_x) * alpha
    }

    pub fn interpolated_y(&self, alpha: f64) -> f64 {
        self.prev_y + (self.y - self.prev_y) * alpha
    }

    /// Blend of previous and current position at `alpha` in `[0, 1)`.
    pub fn interpolated(&self, alpha: f64) -> (f64, f64) {
        (self.interpolated_x(alpha), self.interpolated_y(alpha))
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_transform_has_no_trail() {
        let t = Transform::new(160.0, 90.0);
        assert_eq!((t.prev_x, t.prev_y), (160.0, 90.0));
        assert_eq!(t.interpolated(0.5), (160.0, 90.0));
        assert_eq!((t.scale_x, t.scale_y), (1.0, 1.0));
    }

    #[test]
    fn interpolation_blends_previous_and_current() {
        let mut t = Transform::new(0.0, 10.0);
        t.x = 10.0;
        t.y = 20.0;
        assert_eq!(t.interpolated(0.0), (0.0, 10.0));
        assert_eq!(t.interpolated(0.25), (2.5, 12.5));
    }

    #[test]
    fn teleport_resets_previous() {
        let mut t = Transform::new(0.0, 0.0);
        t.teleport(50.0, -5.0);
        assert_eq!(t.interpolated(0.3), (50.0, -5.0));
    }
}
