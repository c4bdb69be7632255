//! Systems and the fixed pipeline that runs them.
//!
//! A [`System`] is one stage of the simulation. Every stage takes part in
//! the simulation pass ([`System::update`]); stages that also draw opt in
//! through [`System::renders`], and the [`Pipeline`] records that choice at
//! registration so the render pass only visits those stages.
//!
//! Stage order is the registration order and cannot change once the
//! pipeline is built:
//!
//! ```
//! use groot_engine::system::Pipeline;
//!
//! let pipeline = Pipeline::standard();
//! assert_eq!(pipeline.stage_names(), vec!["movement", "animation", "collision", "render"]);
//! assert_eq!(pipeline.render_stage_names(), vec!["render"]);
//! ```

use std::any::Any;
use std::time::{Duration, Instant};

use groot_ecs::registry::Registry;

use crate::render::Canvas2d;
use crate::resources::Resources;
use crate::systems::{AnimationSystem, CollisionSystem, MovementSystem, RenderSystem};
use crate::EngineError;

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

/// Everything a render stage may read, plus the canvas it draws on.
pub struct RenderContext<'a> {
    pub registry: &'a Registry,
    pub resources: &'a Resources,
    pub canvas: &'a mut dyn Canvas2d,
    /// Fraction of a timestep left unsimulated, in `[0, 1)`.
    pub alpha: f64,
}

/// One stage of the pipeline.
pub trait System: Any {
    /// Stable, unique stage name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Advance this stage by one fixed step of `dt_ms` milliseconds.
    fn update(&mut self, registry: &mut Registry, dt_ms: f64) -> Result<(), EngineError>;

    /// Whether this stage takes part in the render pass.
    fn renders(&self) -> bool {
        false
    }

    /// Draw the current state. Only called when [`renders`](Self::renders)
    /// returned `true` at registration.
    fn render(&mut self, ctx: &mut RenderContext<'_>) -> Result<(), EngineError> {
        let _ = ctx;
        Ok(())
    }

    /// Downcast support for [`Pipeline::find`].
    fn as_any(&self) -> &dyn Any;
}

// ---------------------------------------------------------------------------
// FnSystem
// ---------------------------------------------------------------------------

/// A simulation-only stage backed by a closure.
///
/// Lets an embedder slot logic such as input handling into a custom
/// pipeline without defining a type.
pub struct FnSystem<F>
where
    F: FnMut(&mut Registry, f64) -> Result<(), EngineError> + 'static,
{
    name: &'static str,
    f: F,
}

impl<F> FnSystem<F>
where
    F: FnMut(&mut Registry, f64) -> Result<(), EngineError> + 'static,
{
    pub fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }
}

impl<F> System for FnSystem<F>
where
    F: FnMut(&mut Registry, f64) -> Result<(), EngineError> + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn update(&mut self, registry: &mut Registry, dt_ms: f64) -> Result<(), EngineError> {
        (self.f)(registry, dt_ms)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// Wall-clock time one stage took during the last simulation step.
#[derive(Debug, Clone)]
pub struct StageTiming {
    pub name: &'static str,
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// A registered stage and whether it opted into rendering.
struct Stage {
    system: Box<dyn System>,
    renders: bool,
}

/// Collects stages in order, then freezes them into a [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<Stage>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `system` as the next stage.
    ///
    /// # Panics
    ///
    /// Panics if a stage with the same name is already registered.
    pub fn with<S: System>(mut self, system: S) -> Self {
        let name = system.name();
        assert!(
            !self.stages.iter().any(|s| s.system.name() == name),
            "duplicate system name: {name:?}"
        );
        let renders = system.renders();
        self.stages.push(Stage {
            system: Box::new(system),
            renders,
        });
        self
    }

    /// Freeze the stage list.
    pub fn build(self) -> Pipeline {
        let render_order = self
            .stages
            .iter()
            .enumerate()
            .filter(|(_, stage)| stage.renders)
            .map(|(idx, _)| idx)
            .collect();
        Pipeline {
            stages: self.stages,
            render_order,
            last_timings: Vec::new(),
        }
    }
}

/// An ordered, immutable sequence of stages.
pub struct Pipeline {
    stages: Vec<Stage>,
    /// Indices into `stages` of the render participants, in order.
    render_order: Vec<usize>,
    last_timings: Vec<StageTiming>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Movement -> Animation -> Collision -> Render.
    pub fn standard() -> Self {
        Self::builder()
            .with(MovementSystem)
            .with(AnimationSystem)
            .with(CollisionSystem::new())
            .with(RenderSystem)
            .build()
    }

    /// Run one simulation step through every stage, in order.
    ///
    /// The first stage error aborts the step and is returned as is.
    pub fn update(&mut self, registry: &mut Registry, dt_ms: f64) -> Result<(), EngineError> {
        self.last_timings.clear();
        for stage in &mut self.stages {
            let start = Instant::now();
            stage.system.update(registry, dt_ms)?;
            let elapsed = start.elapsed();
            tracing::trace!(stage = stage.system.name(), ?elapsed, "stage updated");
            self.last_timings.push(StageTiming {
                name: stage.system.name(),
                elapsed,
            });
        }
        Ok(())
    }

    /// Run the render pass over the stages that opted in.
    pub fn render(&mut self, ctx: &mut RenderContext<'_>) -> Result<(), EngineError> {
        for &idx in &self.render_order {
            self.stages[idx].system.render(ctx)?;
        }
        Ok(())
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage names in execution order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.system.name()).collect()
    }

    /// Names of the stages that take part in the render pass.
    pub fn render_stage_names(&self) -> Vec<&'static str> {
        self.render_order
            .iter()
            .map(|&idx| self.stages[idx].system.name())
            .collect()
    }

    /// The first stage of concrete type `T`.
    pub fn find<T: System>(&self) -> Option<&T> {
        self.stages
            .iter()
            .find_map(|s| s.system.as_any().downcast_ref::<T>())
    }

    /// Per-stage timings of the last completed step.
    pub fn last_timings(&self) -> &[StageTiming] {
        &self.last_timings
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .field("render_stages", &self.render_stage_names())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use groot_ecs::components::Transform;

    fn logging_stage(name: &'static str, log: Rc<RefCell<Vec<&'static str>>>) -> impl System {
        FnSystem::new(name, move |_reg, _dt| {
            log.borrow_mut().push(name);
            Ok(())
        })
    }

    #[test]
    fn stages_run_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut pipeline = Pipeline::builder()
            .with(logging_stage("alpha", log.clone()))
            .with(logging_stage("beta", log.clone()))
            .with(logging_stage("gamma", log.clone()))
            .build();

        let mut reg = Registry::new();
        pipeline.update(&mut reg, 16.0).unwrap();
        pipeline.update(&mut reg, 16.0).unwrap();
        assert_eq!(
            *log.borrow(),
            vec!["alpha", "beta", "gamma", "alpha", "beta", "gamma"]
        );
        assert_eq!(pipeline.last_timings().len(), 3);
    }

    #[test]
    #[should_panic(expected = "duplicate system name")]
    fn duplicate_stage_name_panics() {
        let _ = Pipeline::builder()
            .with(FnSystem::new("physics", |_r, _dt| Ok(())))
            .with(FnSystem::new("physics", |_r, _dt| Ok(())));
    }

    #[test]
    fn stage_error_aborts_the_step() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut pipeline = Pipeline::builder()
            .with(FnSystem::new("boom", |_r, _dt| {
                Err(EngineError::Stage {
                    stage: "boom",
                    reason: "bad input".to_owned(),
                })
            }))
            .with(logging_stage("after", log.clone()))
            .build();

        let err = pipeline.update(&mut Registry::new(), 16.0).unwrap_err();
        assert!(matches!(err, EngineError::Stage { stage: "boom", .. }));
        assert!(log.borrow().is_empty(), "later stages must not run");
    }

    #[test]
    fn closure_stage_sees_registry_and_dt() {
        let mut pipeline = Pipeline::builder()
            .with(FnSystem::new("push", |reg, dt| {
                for e in reg.entities().collect::<Vec<_>>() {
                    if let Some(t) = reg.get_component_mut::<Transform>(e) {
                        t.x += dt;
                    }
                }
                Ok(())
            }))
            .build();
        let mut reg = Registry::new();
        let e = reg.create_entity();
        reg.add_component(e, Transform::new(0.0, 0.0)).unwrap();
        pipeline.update(&mut reg, 5.0).unwrap();
        assert_eq!(reg.get_component::<Transform>(e).map(|t| t.x), Some(5.0));
    }

    #[test]
    fn standard_pipeline_records_render_opt_in() {
        let pipeline = Pipeline::standard();
        assert_eq!(pipeline.len(), 4);
        assert_eq!(pipeline.render_stage_names(), vec!["render"]);
        assert!(pipeline.find::<CollisionSystem>().is_some());
        assert!(pipeline.find::<MovementSystem>().is_some());
    }
}
