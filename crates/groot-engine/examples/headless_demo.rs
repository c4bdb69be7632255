//! Headless arena demo -- runs a few seconds of simulated frames without a
//! display and logs what the engine did.
//!
//! Run with:
//!   RUST_LOG=groot_engine=debug cargo run --example headless_demo -p groot-engine
//!
//! An optional path to a JSON engine config may be passed as the first
//! argument, e.g. `{"fixed_timestep_ms": 10.0, "virtual_width": 256}`.

use anyhow::Context;
use groot_engine::prelude::*;

// ---------------------------------------------------------------------------
// Scene setup
// ---------------------------------------------------------------------------

fn spawn_wall(reg: &mut Registry, x: f64, y: f64, w: f64, h: f64) -> anyhow::Result<EntityId> {
    let e = reg.create_entity();
    reg.add_component(e, Transform::new(x, y))?;
    reg.add_component(e, Collider::new(w, h))?;
    reg.add_component(e, Sprite::new("wall.png").with_size(w, h))?;
    Ok(e)
}

fn spawn_runner(reg: &mut Registry, x: f64, y: f64, vx: f64, vy: f64) -> anyhow::Result<EntityId> {
    let frames = (0..4)
        .map(|i| AnimationFrame::new(Rect::new(f64::from(i) * 16.0, 0.0, 16.0, 16.0), 120.0))
        .collect();
    let mut anim = Animation::new().with_clip(AnimationClip::new("run", frames, true));
    anim.play("run", false);

    let e = reg.create_entity();
    reg.add_component(e, Transform::new(x, y))?;
    reg.add_component(e, Velocity::new(vx, vy).with_limits(90.0, 1.0))?;
    reg.add_component(e, Collider::new(16.0, 16.0))?;
    reg.add_component(e, Sprite::new("runner.png"))?;
    reg.add_component(e, anim)?;
    Ok(e)
}

fn build_scene(engine: &mut Engine<HeadlessSurface>) -> anyhow::Result<EntityId> {
    let (w, h) = (
        f64::from(engine.viewport().virtual_width()),
        f64::from(engine.viewport().virtual_height()),
    );
    let reg = engine.registry_mut();
    spawn_wall(reg, -8.0, 0.0, 8.0, h)?;
    spawn_wall(reg, w, 0.0, 8.0, h)?;
    spawn_wall(reg, 0.0, -8.0, w, 8.0)?;
    spawn_wall(reg, 0.0, h, w, 8.0)?;

    spawn_runner(reg, 40.0, 40.0, 80.0, 30.0)?;
    spawn_runner(reg, 200.0, 120.0, -70.0, -45.0)?;
    spawn_runner(reg, 150.0, 60.0, 20.0, 85.0)?;

    let pickup = reg.create_entity();
    reg.add_component(pickup, Transform::new(w / 2.0, h / 2.0))?;
    reg.add_component(pickup, Collider::new(8.0, 8.0).as_trigger())?;
    reg.add_component(pickup, Sprite::new("pickup.png").with_size(8.0, 8.0))?;
    Ok(pickup)
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config from {path}"))?;
            EngineConfig::from_json(&text)?
        }
        None => EngineConfig::default(),
    };

    let surface = HeadlessSurface::new(1366.0, 768.0);
    let mut engine = Engine::with_config(surface, config)?;
    tracing::info!(
        scale = engine.viewport().scale(),
        backing = ?engine.surface().backing_size(),
        "engine ready"
    );

    let pickup = build_scene(&mut engine)?;
    let requested = engine.request_missing_resources();
    tracing::info!(?requested, "resources requested");

    // Five seconds of a slightly jittery 60 Hz display, with one long stall.
    let mut now = 0.0;
    let mut frames = 0u32;
    let mut pickup_hits = 0u32;
    let mut report = engine.start(now)?;
    while let Some(r) = report {
        if !r.reschedule {
            break;
        }
        frames += 1;
        now += if frames % 3 == 0 { 17.5 } else { 16.4 };
        if frames == 150 {
            now += 1_000.0;
        }

        // Pretend the images finish loading a few frames in.
        if frames == 10 {
            for id in engine.resources().pending() {
                engine.resources_mut().mark_ready(id);
            }
        }
        if frames == 300 {
            engine.stop();
        }

        report = engine.frame(now)?;
        pickup_hits += engine
            .contacts()
            .iter()
            .filter(|c| c.a == pickup || c.b == pickup)
            .count() as u32;
    }

    let draws = engine.canvas().draws().len();
    tracing::info!(
        frames,
        steps = engine.controller().step_count(),
        sim_time_ms = engine.controller().sim_time_ms(),
        draws,
        pickup_hits,
        digest = %engine.state_digest(),
        "demo finished"
    );
    Ok(())
}
