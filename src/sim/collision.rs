//! Boundary collision detection and response
//!
//! The arena is the square [-1, 1]². An entity's center is confined to
//! ±(1 - half_extent) per axis; crossing that line reflects the velocity on
//! that axis and records which wall was hit.

use bitflags::bitflags;
use glam::Vec2;

bitflags! {
    /// Walls touched by an entity during one tick
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WallContact: u32 {
        const LEFT = 1;
        const RIGHT = 1 << 1;
        const BOTTOM = 1 << 2;
        const TOP = 1 << 3;
    }
}

impl WallContact {
    /// Flag for one side of one axis (0 = x, 1 = y)
    pub fn for_side(axis: usize, positive: bool) -> Self {
        Self::from_bits_truncate(1 << (2 * axis + usize::from(positive)))
    }
}

/// Result of resolving one axis against its bound
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisHit {
    pub position: f32,
    pub velocity: f32,
    /// Side that was crossed, `true` for the positive wall
    pub side: Option<bool>,
}

/// Reflect and clamp one axis if the position lies beyond `±bound`
#[inline]
pub fn resolve_axis(position: f32, velocity: f32, bound: f32) -> AxisHit {
    if position.abs() > bound {
        AxisHit {
            position: position.clamp(-bound, bound),
            velocity: -velocity,
            side: Some(position > 0.0),
        }
    } else {
        AxisHit {
            position,
            velocity,
            side: None,
        }
    }
}

/// Resolve both axes independently
pub fn boundary_collision(position: &mut Vec2, velocity: &mut Vec2, bounds: Vec2) -> WallContact {
    let mut contacts = WallContact::empty();
    for axis in 0..2 {
        let hit = resolve_axis(position[axis], velocity[axis], bounds[axis]);
        position[axis] = hit.position;
        velocity[axis] = hit.velocity;
        if let Some(positive) = hit.side {
            contacts |= WallContact::for_side(axis, positive);
        }
    }
    contacts
}
