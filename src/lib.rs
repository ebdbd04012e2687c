//! Arena Sync - peer-replicated 2D arena physics
//!
//! Core modules:
//! - `sim`: Double-buffered simulation (entities, shapes, integration, reconciliation, roster)
//! - `net`: Wire protocol and transport boundary
//! - `settings`: Data-driven simulation parameters
//! - `error`: Error types shared across the crate

pub mod error;
pub mod net;
pub mod settings;
pub mod sim;

pub use error::{ConfigError, ProtocolError, SimError, TransportError};
pub use settings::{InputParams, Parameters, PhysicsParams};

use glam::Vec2;

/// Simulation constants
pub mod consts {
    /// Spatial dimension of the arena
    pub const DIM: usize = 2;
    /// Half-width of the arena on each axis (arena spans [-1, 1])
    pub const ARENA_HALF_EXTENT: f32 = 1.0;

    /// Default fixed step used by the headless driver (60 Hz)
    pub const DEFAULT_DT: f64 = 1.0 / 60.0;

    /// Pointer joystick radius in screen pixels
    pub const JOYSTICK_RADIUS: f32 = 64.0;
}

/// Boundary for an entity center on one axis, given the shape half-extent on that axis
#[inline]
pub fn axis_bound(half_extent: f32) -> f32 {
    consts::ARENA_HALF_EXTENT - half_extent
}

/// Bounds for both axes of an entity center
#[inline]
pub fn center_bounds(half_extent: Vec2) -> Vec2 {
    Vec2::new(axis_bound(half_extent.x), axis_bound(half_extent.y))
}
