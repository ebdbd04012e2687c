//! Local input controllers
//!
//! Every controller owns a persistent player id drawn at connect time. The
//! ids of connected controllers form the set of locally driven players.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::buffer::{CopyFrom, DoubleBuffer};
use crate::consts::JOYSTICK_RADIUS;
use crate::error::SimError;
use crate::settings::InputParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerKind {
    /// Random walk, picks a new direction about once per second
    Cpu,
    /// Follows the pointer joystick
    Pointer,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Controller {
    pub kind: ControllerKind,
    pub connected: bool,
    pub player_id: u32,
    /// Intent in [-1, 1]²
    pub axes: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputState {
    controllers: Vec<Controller>,
    capacity: usize,
    pub time: f64,
}

impl InputState {
    pub fn new(capacity: usize, time: f64) -> Self {
        Self {
            controllers: Vec::with_capacity(capacity),
            capacity,
            time,
        }
    }

    pub fn controllers(&self) -> &[Controller] {
        &self.controllers
    }

    /// Connected controllers only
    pub fn connected(&self) -> impl Iterator<Item = &Controller> + '_ {
        self.controllers.iter().filter(|c| c.connected)
    }

    /// True if a connected local controller drives this player
    pub fn drives(&self, player_id: u32) -> bool {
        self.connected().any(|c| c.player_id == player_id)
    }

    fn push(&mut self, controller: Controller) -> Result<(), SimError> {
        if self.controllers.len() == self.capacity {
            return Err(SimError::CapacityExhausted {
                store: "controller",
                capacity: self.capacity,
            });
        }
        self.controllers.push(controller);
        Ok(())
    }
}

impl CopyFrom for InputState {
    fn copy_from(&mut self, other: &Self) {
        self.controllers.clone_from(&other.controllers);
        self.capacity = other.capacity;
        self.time = other.time;
    }
}

/// Input component
#[derive(Debug, Clone)]
pub struct Input {
    frames: DoubleBuffer<InputState>,
    /// Latest joystick sample from the external pointer capture
    pointer_axes: Vec2,
}

impl Input {
    /// Connect the configured pointer and CPU controllers
    pub fn new<R: Rng + ?Sized>(params: &InputParams, time: f64, rng: &mut R) -> Result<Self, SimError> {
        let mut input = Self {
            frames: DoubleBuffer::from_fn(|| InputState::new(params.max_controllers, time)),
            pointer_axes: Vec2::ZERO,
        };
        for _ in 0..params.player_controllers {
            input.connect(ControllerKind::Pointer, rng)?;
        }
        for _ in 0..params.cpu_controllers {
            input.connect(ControllerKind::Cpu, rng)?;
        }
        Ok(input)
    }

    pub fn current(&self) -> &InputState {
        self.frames.current()
    }

    /// Add a controller between ticks. Returns its player id.
    pub fn connect<R: Rng + ?Sized>(&mut self, kind: ControllerKind, rng: &mut R) -> Result<u32, SimError> {
        let player_id = rng.random();
        self.frames.current_mut().push(Controller {
            kind,
            connected: true,
            player_id,
            axes: Vec2::ZERO,
        })?;
        log::info!("Connected {kind:?} controller for player {player_id:#010x}");
        Ok(player_id)
    }

    /// Mark a controller disconnected between ticks. Its player stops being locally driven.
    pub fn disconnect(&mut self, player_id: u32) -> bool {
        let state = self.frames.current_mut();
        match state.controllers.iter_mut().find(|c| c.player_id == player_id) {
            Some(controller) => {
                controller.connected = false;
                true
            }
            None => false,
        }
    }

    /// Store the latest pointer joystick axes (clamped to [-1, 1])
    pub fn set_pointer_axes(&mut self, axes: Vec2) {
        self.pointer_axes = axes.clamp(Vec2::NEG_ONE, Vec2::ONE);
    }

    /// Build the next frame from the current one
    pub fn evolve<R: Rng + ?Sized>(&mut self, time: f64, rng: &mut R) {
        let pointer_axes = self.pointer_axes;
        let (current, next) = self.frames.begin();
        let dt = (time - current.time) as f32;
        next.time = time;

        for controller in next.controllers.iter_mut() {
            match controller.kind {
                ControllerKind::Cpu => {
                    if rng.random::<f32>() < dt {
                        controller.axes = Vec2::new(
                            rng.random_range(-1.0..1.0),
                            rng.random_range(-1.0..1.0),
                        );
                    }
                }
                ControllerKind::Pointer => controller.axes = pointer_axes,
            }
        }
    }

    pub fn sync(&mut self) {
        self.frames.swap();
    }
}

/// Map a pointer drag onto joystick axes.
///
/// `origin` is where the drag started and `point` where the pointer is now,
/// both in screen coordinates with y pointing down. Offsets are clamped to
/// `±radius` per axis and normalized, with y flipped so up is positive.
pub fn joystick_axes(origin: Vec2, point: Vec2, radius: f32) -> Vec2 {
    let offset = Vec2::new(point.x - origin.x, origin.y - point.y);
    offset.clamp(Vec2::splat(-radius), Vec2::splat(radius)) / radius
}

/// [`joystick_axes`] with the default radius
pub fn default_joystick_axes(origin: Vec2, point: Vec2) -> Vec2 {
    joystick_axes(origin, point, JOYSTICK_RADIUS)
}
