//! Property tests for the simulation stages and the frame driver.
//!
//! These tests use `proptest` to generate random bodies, velocities and frame
//! timings and verify the invariants that must hold regardless of input.

use groot_engine::prelude::*;
use groot_engine::systems::{integrate, resolve_pair};
use proptest::prelude::*;

/// Strategy that generates finite (non-NaN, non-Inf) f64 values.
fn finite_f64(range: i32) -> impl Strategy<Value = f64> {
    (-range * 100..range * 100).prop_map(|v| f64::from(v) * 0.01)
}

fn size() -> impl Strategy<Value = f64> {
    (100i32..6_400).prop_map(|v| f64::from(v) * 0.01)
}

/// Fraction strictly inside (0, 1), used to place a second box so that it
/// always intersects the first.
fn inside() -> impl Strategy<Value = f64> {
    (1i32..100).prop_map(|v| f64::from(v) * 0.01)
}

/// Records nothing; the controller's own accounting is under test.
struct Idle;

impl Simulation for Idle {
    fn step(&mut self, _dt_ms: f64) -> Result<(), EngineError> {
        Ok(())
    }

    fn render(&mut self, _alpha: f64) -> Result<(), EngineError> {
        Ok(())
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1_000))]

    // -- Movement ------------------------------------------------------------

    #[test]
    fn speed_never_exceeds_max_after_a_step(
        vx in finite_f64(10_000),
        vy in finite_f64(10_000),
        max_speed in 1.0f64..500.0,
        friction in 0.01f64..=1.0,
        dt in 1.0f64..100.0,
    ) {
        let mut transform = Transform::new(0.0, 0.0);
        let mut velocity = Velocity::new(vx, vy).with_limits(max_speed, friction);
        integrate(&mut transform, &mut velocity, dt);

        prop_assert!(
            velocity.speed() <= max_speed * (1.0 + 1e-12),
            "speed {} above max {}", velocity.speed(), max_speed
        );
        prop_assert_eq!(transform.prev_x, 0.0);
        prop_assert_eq!(transform.prev_y, 0.0);
    }

    // -- Collision -----------------------------------------------------------

    #[test]
    fn resolution_is_equal_and_opposite(
        ax in finite_f64(200), ay in finite_f64(200),
        aw in size(), ah in size(),
        bw in size(), bh in size(),
        tx in inside(), ty in inside(),
    ) {
        let bx = ax - bw + tx * (aw + bw);
        let by = ay - bh + ty * (ah + bh);
        let box_a = Rect::new(ax, ay, aw, ah);
        let box_b = Rect::new(bx, by, bw, bh);
        prop_assume!(box_a.intersects(&box_b));

        let mut ta = Transform::new(ax, ay);
        let mut tb = Transform::new(bx, by);
        let axis = resolve_pair(&box_a, &box_b, &mut ta, &mut tb);

        let (da, db) = match axis {
            Axis::X => {
                prop_assert_eq!((ta.y, tb.y), (ay, by));
                (ta.x - ax, tb.x - bx)
            }
            Axis::Y => {
                prop_assert_eq!((ta.x, tb.x), (ax, bx));
                (ta.y - ay, tb.y - by)
            }
        };
        prop_assert!((da + db).abs() < 1e-9, "moves {} and {} not opposite", da, db);
    }

    #[test]
    fn equal_boxes_are_separated_along_the_smaller_overlap(
        ax in finite_f64(200), ay in finite_f64(200),
        tx in inside(), ty in inside(),
    ) {
        let box_a = Rect::new(ax, ay, 16.0, 16.0);
        let box_b = Rect::new(ax - 16.0 + tx * 32.0, ay - 16.0 + ty * 32.0, 16.0, 16.0);
        prop_assume!(box_a.intersects(&box_b));

        let mut ta = Transform::new(box_a.x, box_a.y);
        let mut tb = Transform::new(box_b.x, box_b.y);
        let axis = resolve_pair(&box_a, &box_b, &mut ta, &mut tb);

        let expected = if box_a.overlap_x(&box_b) < box_a.overlap_y(&box_b) {
            Axis::X
        } else {
            Axis::Y
        };
        prop_assert_eq!(axis, expected);

        let after_a = Rect::new(ta.x, ta.y, 16.0, 16.0);
        let after_b = Rect::new(tb.x, tb.y, 16.0, 16.0);
        let remaining = match axis {
            Axis::X => after_a.overlap_x(&after_b),
            Axis::Y => after_a.overlap_y(&after_b),
        };
        prop_assert!(remaining <= 1e-9, "still overlapping by {} on {:?}", remaining, axis);
    }

    // -- Frame driver --------------------------------------------------------

    #[test]
    fn accumulator_stays_below_one_step(
        deltas in prop::collection::vec(-50.0f64..400.0, 1..200),
    ) {
        let step = 1000.0 / 60.0;
        let mut controller = LoopController::new(step, 250.0);
        controller.start(0.0, &mut Idle).unwrap();

        let mut last = 0.0;
        let mut fed = 0.0;
        for delta in deltas {
            let now = last + delta;
            let report = controller.frame(now, &mut Idle).unwrap().unwrap();
            fed += (now - last).clamp(0.0, 250.0);
            last = now;

            prop_assert!(report.steps <= 15);
            prop_assert!(controller.accumulator() >= 0.0);
            prop_assert!(controller.accumulator() < step);
            prop_assert!((0.0..1.0).contains(&report.alpha));
        }

        let accounted = controller.sim_time_ms() + controller.accumulator();
        prop_assert!((accounted - fed).abs() < 1e-6, "accounted {} vs fed {}", accounted, fed);
    }
}
