//! Semi-implicit Euler with linear drag
//!
//! ```text
//! v' = v + (a - gamma * v) * dt
//! p' = p + v' * dt
//! ```
//! followed by per-axis boundary reflection.

use glam::Vec2;

use super::collision::{WallContact, boundary_collision};

/// Advance one point mass by `dt`. Returns the walls crossed this step.
pub fn integrate_point(
    position: &mut Vec2,
    velocity: &mut Vec2,
    acceleration: Vec2,
    gamma: f32,
    dt: f32,
    bounds: Vec2,
) -> WallContact {
    *velocity += (acceleration - gamma * *velocity) * dt;
    *position += *velocity * dt;
    boundary_collision(position, velocity, bounds)
}
