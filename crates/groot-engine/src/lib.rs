//! Groot Engine -- fixed-timestep 2D simulation core built on [`groot_ecs`].
//!
//! The engine drives an ordered pipeline of systems (movement, animation,
//! collision, render) from an external per-frame callback. Simulation
//! advances in fixed steps regardless of the frame rate; rendering blends
//! the last two simulation states and snaps to whole pixels.
//!
//! # Quick Start
//!
//! ```
//! use groot_engine::prelude::*;
//!
//! let surface = HeadlessSurface::new(1280.0, 720.0);
//! let mut engine = Engine::new(surface).unwrap();
//! assert_eq!(engine.viewport().scale(), 4);
//!
//! let player = engine.registry_mut().create_entity();
//! engine.registry_mut().add_component(player, Transform::new(160.0, 90.0)).unwrap();
//! engine.registry_mut().add_component(player, Velocity::new(60.0, 0.0)).unwrap();
//!
//! engine.start(0.0).unwrap();
//! let report = engine.frame(40.0).unwrap().unwrap();
//! assert_eq!(report.steps, 2);
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod engine;
pub mod render;
pub mod resources;
pub mod system;
pub mod systems;
pub mod tick;
pub mod viewport;

/// Re-export the ECS crate for convenience.
pub use groot_ecs;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by the engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The output surface could not provide a 2D drawing context.
    #[error("output surface could not provide a 2D rendering context")]
    NoRenderingContext,

    /// A configuration value is out of range.
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),

    /// Configuration text could not be parsed.
    #[error("failed to parse engine configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// The drawing backend rejected a call.
    #[error(transparent)]
    Canvas(#[from] render::CanvasError),

    /// An ECS write was rejected.
    #[error(transparent)]
    Ecs(#[from] groot_ecs::EcsError),

    /// A custom stage failed.
    #[error("stage '{stage}' failed: {reason}")]
    Stage {
        stage: &'static str,
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use groot_ecs::prelude::*;

    pub use crate::config::EngineConfig;
    pub use crate::engine::Engine;
    pub use crate::render::{
        Canvas2d, CanvasError, DrawCall, HeadlessSurface, OutputSurface, RecordingCanvas,
    };
    pub use crate::resources::{ResourceState, Resources};
    pub use crate::system::{FnSystem, Pipeline, PipelineBuilder, StageTiming, System};
    pub use crate::systems::{
        AnimationSystem, Axis, CollisionSystem, Contact, MovementSystem, RenderSystem,
    };
    pub use crate::tick::{FrameReport, LoopController, Simulation, StopHandle};
    pub use crate::viewport::{SurfaceSize, Viewport, ViewportFit};
    pub use crate::EngineError;
}
