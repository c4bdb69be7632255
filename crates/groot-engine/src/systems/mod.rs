//! The built-in pipeline stages.
//!
//! [`Pipeline::standard`](crate::system::Pipeline::standard) runs them in
//! this order every step: movement integrates velocities, animation
//! advances clips, collision separates overlapping solids, and render draws
//! during the render pass only.

mod animation;
mod collision;
mod movement;
mod render;

pub use animation::{advance_animation, AnimationSystem};
pub use collision::{resolve_pair, Axis, CollisionSystem, Contact};
pub use movement::{integrate, MovementSystem};
pub use render::{draw_position, RenderSystem};
