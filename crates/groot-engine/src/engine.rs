//! The embeddable engine: registry, pipeline, frame driver and viewport
//! bound to one output surface.
//!
//! The host owns the frame clock. It calls [`Engine::start`] once, then
//! [`Engine::frame`] from each display-refresh callback for as long as the
//! returned report says to reschedule, and [`Engine::resize`] whenever the
//! surface's container changes size.

use groot_ecs::components::{Rect, ResourceId};
use groot_ecs::registry::Registry;

use crate::config::EngineConfig;
use crate::render::{Canvas2d, OutputSurface};
use crate::resources::Resources;
use crate::system::{Pipeline, RenderContext};
use crate::systems::{CollisionSystem, Contact};
use crate::tick::{FrameReport, LoopController, Simulation, StopHandle};
use crate::viewport::{Viewport, ViewportFit};
use crate::EngineError;

/// A running game instance bound to a surface `S`.
pub struct Engine<S: OutputSurface> {
    surface: S,
    canvas: S::Canvas,
    registry: Registry,
    resources: Resources,
    pipeline: Pipeline,
    controller: LoopController,
    viewport: Viewport,
    config: EngineConfig,
}

/// Borrowed view of the engine that the loop controller drives for one
/// frame.
struct FrameTarget<'a, C: Canvas2d> {
    pipeline: &'a mut Pipeline,
    registry: &'a mut Registry,
    resources: &'a Resources,
    canvas: &'a mut C,
    /// The whole virtual frame, in virtual pixels.
    frame: Rect,
}

impl<C: Canvas2d> Simulation for FrameTarget<'_, C> {
    fn step(&mut self, dt_ms: f64) -> Result<(), EngineError> {
        self.pipeline.update(self.registry, dt_ms)
    }

    fn render(&mut self, alpha: f64) -> Result<(), EngineError> {
        self.canvas.clear_rect(self.frame);
        let mut ctx = RenderContext {
            registry: self.registry,
            resources: self.resources,
            canvas: self.canvas,
            alpha,
        };
        self.pipeline.render(&mut ctx)
    }
}

impl<S: OutputSurface> Engine<S> {
    /// Engine with the default configuration and the standard pipeline.
    pub fn new(surface: S) -> Result<Self, EngineError> {
        Self::with_config(surface, EngineConfig::default())
    }

    /// Engine with a custom configuration and the standard pipeline.
    pub fn with_config(surface: S, config: EngineConfig) -> Result<Self, EngineError> {
        Self::with_pipeline(surface, config, Pipeline::standard())
    }

    /// Engine running a caller-assembled pipeline.
    ///
    /// Fails with [`EngineError::NoRenderingContext`] if the surface cannot
    /// provide a canvas, or [`EngineError::InvalidConfig`] if `config` does
    /// not validate.
    pub fn with_pipeline(
        mut surface: S,
        config: EngineConfig,
        pipeline: Pipeline,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let mut canvas = surface
            .create_canvas()
            .ok_or(EngineError::NoRenderingContext)?;
        canvas.set_image_smoothing(false);

        let mut engine = Self {
            surface,
            canvas,
            registry: Registry::new(),
            resources: Resources::new(),
            pipeline,
            controller: LoopController::from_config(&config),
            viewport: Viewport::new(config.virtual_width, config.virtual_height),
            config,
        };
        engine.resize();
        tracing::debug!(
            stages = ?engine.pipeline.stage_names(),
            scale = engine.viewport.scale(),
            "engine created"
        );
        Ok(engine)
    }

    /// Refit the virtual frame to the surface's current container.
    ///
    /// Does nothing (and returns `None`) when the container has no usable
    /// geometry; the previous scale stays in effect.
    pub fn resize(&mut self) -> Option<ViewportFit> {
        let Some(fit) = self.viewport.fit(self.surface.container_size()) else {
            tracing::debug!("resize skipped: container has no geometry");
            return None;
        };
        self.surface
            .set_backing_size(fit.backing_width, fit.backing_height);
        self.surface.set_display_size(fit.display);
        // Resizing the backing store resets the context state.
        self.canvas.set_base_scale(f64::from(fit.scale));
        self.canvas.set_image_smoothing(false);
        tracing::debug!(
            scale = fit.scale,
            backing_width = fit.backing_width,
            backing_height = fit.backing_height,
            "viewport resized"
        );
        Some(fit)
    }

    /// Start the loop at timestamp `now` (ms) and run the first frame.
    /// Returns `Ok(None)` if already running.
    pub fn start(&mut self, now: f64) -> Result<Option<FrameReport>, EngineError> {
        let (controller, mut target) = self.split_for_frame();
        controller.start(now, &mut target)
    }

    /// Stop after the frame in flight, if any.
    pub fn stop(&self) {
        self.controller.stop();
    }

    /// Handle one display-refresh callback at timestamp `now` (ms).
    ///
    /// Returns `Ok(None)` when stopped. Otherwise the report tells the host
    /// whether to request another frame.
    pub fn frame(&mut self, now: f64) -> Result<Option<FrameReport>, EngineError> {
        let (controller, mut target) = self.split_for_frame();
        controller.frame(now, &mut target)
    }

    fn split_for_frame(&mut self) -> (&mut LoopController, FrameTarget<'_, S::Canvas>) {
        let frame = Rect::new(
            0.0,
            0.0,
            f64::from(self.viewport.virtual_width()),
            f64::from(self.viewport.virtual_height()),
        );
        let target = FrameTarget {
            pipeline: &mut self.pipeline,
            registry: &mut self.registry,
            resources: &self.resources,
            canvas: &mut self.canvas,
            frame,
        };
        (&mut self.controller, target)
    }

    // -- accessors ----------------------------------------------------------

    pub fn stop_handle(&self) -> StopHandle {
        self.controller.stop_handle()
    }

    pub fn is_running(&self) -> bool {
        self.controller.is_running()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut Resources {
        &mut self.resources
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn controller(&self) -> &LoopController {
        &self.controller
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn canvas(&self) -> &S::Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut S::Canvas {
        &mut self.canvas
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable surface access, e.g. to move it to a new container before
    /// calling [`resize`](Self::resize).
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Overlaps found by the collision stage during the last step. Empty if
    /// the pipeline has no collision stage.
    pub fn contacts(&self) -> &[Contact] {
        self.pipeline
            .find::<CollisionSystem>()
            .map(CollisionSystem::contacts)
            .unwrap_or_default()
    }

    /// Mark every sprite resource not seen before as loading and return
    /// those ids for the host to fetch.
    pub fn request_missing_resources(&mut self) -> Vec<ResourceId> {
        self.resources.request_missing(&self.registry)
    }

    /// Digest of the simulation state, for determinism checks.
    pub fn state_digest(&self) -> String {
        self.registry.state_digest()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
