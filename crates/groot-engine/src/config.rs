//! Engine configuration.
//!
//! [`EngineConfig`] carries the timing and resolution constants. Every field
//! has a default, so a JSON document only needs the values it overrides:
//!
//! ```
//! use groot_engine::config::EngineConfig;
//!
//! let config = EngineConfig::from_json(r#"{ "virtual_width": 256, "virtual_height": 144 }"#).unwrap();
//! assert_eq!(config.virtual_width, 256);
//! assert_eq!(config.max_frame_delta_ms, 250.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Timing and resolution settings for an [`Engine`](crate::engine::Engine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Simulated milliseconds per step. Must be positive and finite.
    pub fixed_timestep_ms: f64,
    /// Upper bound on the wall-clock delta consumed by one frame.
    pub max_frame_delta_ms: f64,
    /// Logical render-target width in pixels.
    pub virtual_width: u32,
    /// Logical render-target height in pixels.
    pub virtual_height: u32,
}

impl EngineConfig {
    /// 60 simulation steps per second.
    pub const DEFAULT_TIMESTEP_MS: f64 = 1000.0 / 60.0;
    pub const DEFAULT_MAX_FRAME_DELTA_MS: f64 = 250.0;
    pub const DEFAULT_VIRTUAL_WIDTH: u32 = 320;
    pub const DEFAULT_VIRTUAL_HEIGHT: u32 = 180;

    /// Parse and validate a JSON configuration document.
    pub fn from_json(text: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field is within range.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.fixed_timestep_ms > 0.0 && self.fixed_timestep_ms.is_finite()) {
            return Err(EngineError::InvalidConfig(format!(
                "fixed_timestep_ms must be positive and finite, got {}",
                self.fixed_timestep_ms
            )));
        }
        if !(self.max_frame_delta_ms > 0.0 && self.max_frame_delta_ms.is_finite()) {
            return Err(EngineError::InvalidConfig(format!(
                "max_frame_delta_ms must be positive and finite, got {}",
                self.max_frame_delta_ms
            )));
        }
        if self.virtual_width == 0 || self.virtual_height == 0 {
            return Err(EngineError::InvalidConfig(format!(
                "virtual resolution must be non-zero, got {}x{}",
                self.virtual_width, self.virtual_height
            )));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fixed_timestep_ms: Self::DEFAULT_TIMESTEP_MS,
            max_frame_delta_ms: Self::DEFAULT_MAX_FRAME_DELTA_MS,
            virtual_width: Self::DEFAULT_VIRTUAL_WIDTH,
            virtual_height: Self::DEFAULT_VIRTUAL_HEIGHT,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
