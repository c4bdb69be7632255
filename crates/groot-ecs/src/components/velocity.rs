use serde::{Deserialize, Serialize};

/// Linear velocity in pixels per second, with damping and a speed cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub x: f64,
    pub y: f64,
    /// Upper bound on the velocity magnitude after each movement step.
    pub max_speed: f64,
    /// Per-step damping factor in `(0, 1]`; `1.0` means no friction.
    pub friction: f64,
}

impl Velocity {
    pub const DEFAULT_MAX_SPEED: f64 = 100.0;
    pub const DEFAULT_FRICTION: f64 = 0.8;

    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            max_speed: Self::DEFAULT_MAX_SPEED,
            friction: Self::DEFAULT_FRICTION,
        }
    }

    pub fn with_limits(mut self, max_speed: f64, friction: f64) -> Self {
        self.max_speed = max_speed;
        self.friction = friction;
        self
    }

    /// Magnitude of the velocity vector.
    pub fn speed(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Scale the vector down to `max_speed` if it exceeds it, keeping its
    /// direction.
    pub fn clamp_to_max_speed(&mut self) {
        let speed = self.speed();
        if speed > self.max_speed {
            let factor = self.max_speed / speed;
            self.x *= factor;
            self.y *= factor;
        }
    }

    /// Multiply both axes by the friction coefficient.
    pub fn apply_friction(&mut self) {
        self.x *= self.friction;
        self.y *= self.friction;
    }
}

impl Default for Velocity {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}
