//! Simulation core
//!
//! Everything that decides where entities are lives here:
//! - Double-buffered frames, one per component
//! - Fixed-capacity stores referenced by id
//! - Seeded RNG only, passed in by the tick driver
//! - No rendering or socket dependencies

pub mod buffer;
pub mod collision;
pub mod entities;
pub mod input;
pub mod integrate;
pub mod physics;
pub mod players;
pub mod shapes;
pub mod tick;

pub use buffer::{CopyFrom, DoubleBuffer};
pub use collision::{WallContact, boundary_collision, resolve_axis};
pub use entities::{Entity, EntityStore};
pub use input::{Controller, ControllerKind, Input, InputState, default_joystick_axes, joystick_axes};
pub use integrate::integrate_point;
pub use physics::{Physics, PhysicsInputs, PhysicsState, RemoteUpdate, apply_remote_update};
pub use players::{Player, PlayerFlags, Roster, RosterInputs, RosterState, collision_edge};
pub use shapes::{Aabb, ShapeStore};
pub use tick::{PlayerView, TickInput, World};
