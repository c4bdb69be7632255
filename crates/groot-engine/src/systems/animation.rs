use std::any::Any;

use groot_ecs::components::Animation;
use groot_ecs::registry::Registry;

use crate::system::System;
use crate::EngineError;

/// Advances every playing [`Animation`] by one step.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnimationSystem;

/// Advance `animation` by `dt_ms`.
///
/// At most one frame boundary is crossed per call. Past the last frame a
/// looping clip wraps to 0; a one-shot clip stops on its last frame so the
/// final pose stays visible.
pub fn advance_animation(animation: &mut Animation, dt_ms: f64) {
    if !animation.playing {
        return;
    }
    let Some(clip) = animation
        .current_clip
        .as_ref()
        .and_then(|name| animation.clips.get(name))
    else {
        return;
    };
    let frame_count = clip.frames.len();
    if frame_count == 0 {
        return;
    }
    let looping = clip.looping;
    let index = animation.current_frame.min(frame_count - 1);
    let duration = clip.frames[index].duration_ms;

    animation.elapsed_ms += dt_ms;
    if animation.elapsed_ms < duration {
        return;
    }
    animation.elapsed_ms = 0.0;
    animation.current_frame = index + 1;
    if animation.current_frame >= frame_count {
        if looping {
            animation.current_frame = 0;
        } else {
            animation.playing = false;
            animation.current_frame = frame_count - 1;
        }
    }
}

impl System for AnimationSystem {
    fn name(&self) -> &'static str {
        "animation"
    }

    fn update(&mut self, registry: &mut Registry, dt_ms: f64) -> Result<(), EngineError> {
        for (_, animation) in registry.get_components_mut::<Animation>().iter_mut() {
            advance_animation(animation, dt_ms);
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use groot_ecs::components::{AnimationClip, AnimationFrame, Rect};

    fn clip(name: &str, durations: &[f64], looping: bool) -> AnimationClip {
        let frames = durations
            .iter()
            .enumerate()
            .map(|(i, &d)| AnimationFrame::new(Rect::new(i as f64 * 16.0, 0.0, 16.0, 16.0), d))
            .collect();
        AnimationClip::new(name, frames, looping)
    }

    #[test]
    fn looping_clip_cycles_frames() {
        let mut anim = Animation::new().with_clip(clip("idle", &[100.0, 100.0], true));
        anim.play("idle", false);

        let mut visited = vec![anim.current_frame];
        for _ in 0..6 {
            advance_animation(&mut anim, 100.0);
            visited.push(anim.current_frame);
        }
        assert_eq!(visited, vec![0, 1, 0, 1, 0, 1, 0]);
        assert!(anim.playing);
    }

    #[test]
    fn frame_holds_until_duration_elapses() {
        let mut anim = Animation::new().with_clip(clip("idle", &[50.0, 50.0], true));
        anim.play("idle", false);
        advance_animation(&mut anim, 20.0);
        advance_animation(&mut anim, 20.0);
        assert_eq!(anim.current_frame, 0);
        assert_eq!(anim.elapsed_ms, 40.0);
        advance_animation(&mut anim, 20.0);
        assert_eq!(anim.current_frame, 1);
        assert_eq!(anim.elapsed_ms, 0.0);
    }

    #[test]
    fn one_shot_clip_stops_on_last_frame() {
        let mut anim = Animation::new().with_clip(clip("harvest", &[30.0, 30.0, 30.0], false));
        anim.play("harvest", false);
        for _ in 0..3 {
            advance_animation(&mut anim, 30.0);
        }
        assert!(!anim.playing);
        assert_eq!(anim.current_frame, 2);

        advance_animation(&mut anim, 30.0);
        assert_eq!(anim.current_frame, 2, "stopped clip does not advance");
        assert_eq!(anim.current_frame().map(|f| f.source.x), Some(32.0));
    }

    #[test]
    fn empty_or_unset_clip_is_skipped() {
        let mut anim = Animation::new().with_clip(clip("empty", &[], true));
        advance_animation(&mut anim, 100.0);
        assert_eq!(anim.elapsed_ms, 0.0);

        anim.play("empty", false);
        advance_animation(&mut anim, 100.0);
        assert_eq!(anim.elapsed_ms, 0.0);
        assert_eq!(anim.current_frame, 0);
    }

    #[test]
    fn system_advances_every_animation() {
        let mut reg = Registry::new();
        let a = reg.create_entity();
        let b = reg.create_entity();
        for e in [a, b] {
            let mut anim = Animation::new().with_clip(clip("walk", &[10.0, 10.0], true));
            anim.play("walk", false);
            reg.add_component(e, anim).unwrap();
        }
        reg.get_component_mut::<Animation>(b).unwrap().stop();

        AnimationSystem.update(&mut reg, 10.0).unwrap();
        assert_eq!(reg.get_component::<Animation>(a).unwrap().current_frame, 1);
        assert_eq!(reg.get_component::<Animation>(b).unwrap().current_frame, 0);
    }
}
