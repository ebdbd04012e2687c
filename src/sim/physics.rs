//! Physics component: reconciliation and integration
//!
//! Each process is authoritative for the players its own controllers drive
//! and a relay for everyone else's last reported state. Per tick:
//!
//! 1. Spawn entities for roster players and announced players that lack one.
//! 2. For locally driven players, recompute acceleration from the intent and
//!    broadcast an `updatePoint` if it changed.
//! 3. Apply remote `updatePoint`s: own echoes and unknown ids are dropped,
//!    everything else overwrites the entity unconditionally.
//! 4. Integrate locally driven entities and resolve wall contacts.
//!
//! Step 3 is last-message-wins with no version check. Two peers driving the
//! same entity in one tick converge to whichever update each applies last,
//! which may differ between peers.

use glam::Vec2;
use rand::Rng;

use super::buffer::{CopyFrom, DoubleBuffer};
use super::collision::WallContact;
use super::entities::EntityStore;
use super::input::InputState;
use super::integrate::integrate_point;
use super::players::RosterState;
use super::shapes::ShapeStore;
use crate::center_bounds;
use crate::error::SimError;
use crate::net::Message;
use crate::settings::PhysicsParams;

/// One committed physics frame
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsState {
    pub entities: EntityStore,
    pub shapes: ShapeStore,
    /// Wall contacts per entity row, rebuilt every tick
    contacts: Box<[WallContact]>,
    pub time: f64,
    outgoing: Vec<Message>,
}

impl PhysicsState {
    pub fn new(capacity: usize, time: f64) -> Self {
        Self {
            entities: EntityStore::new(capacity),
            shapes: ShapeStore::new(capacity),
            contacts: vec![WallContact::empty(); capacity].into_boxed_slice(),
            time,
            outgoing: Vec::new(),
        }
    }

    /// Walls an entity touched during the tick that built this frame
    pub fn contacts(&self, id: u32) -> Option<WallContact> {
        self.entities.find(id).map(|row| self.contacts[row])
    }

    pub fn outgoing(&self) -> &[Message] {
        &self.outgoing
    }

    /// Add a player entity with its square collision shape
    pub fn spawn_player<R: Rng + ?Sized>(
        &mut self,
        id: u32,
        position: Vec2,
        half_extent: Vec2,
        rng: &mut R,
    ) -> Result<(), SimError> {
        self.entities
            .add_entity(position, Vec2::ZERO, Vec2::ZERO, Some(id), rng)?;
        self.shapes.add(id, half_extent, rng)?;
        Ok(())
    }
}

impl CopyFrom for PhysicsState {
    fn copy_from(&mut self, other: &Self) {
        self.entities.copy_from(&other.entities);
        self.shapes.copy_from(&other.shapes);
        self.contacts.copy_from_slice(&other.contacts);
        self.time = other.time;
        self.outgoing.clear();
    }
}

/// What happened to one incoming `updatePoint`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteUpdate {
    Applied,
    /// Sent by this process and echoed back
    SelfEcho,
    /// Entity not known here yet
    UnknownId,
    /// Not an `updatePoint`
    Ignored,
}

/// Merge one remote message into an entity store
pub fn apply_remote_update(entities: &mut EntityStore, own_system_id: u32, msg: &Message) -> RemoteUpdate {
    let Message::UpdatePoint {
        id,
        system_id,
        position,
        velocity,
        acceleration,
    } = *msg
    else {
        return RemoteUpdate::Ignored;
    };

    if system_id == own_system_id {
        return RemoteUpdate::SelfEcho;
    }
    if entities.set_kinematics(
        id,
        Vec2::from_array(position),
        Vec2::from_array(velocity),
        Vec2::from_array(acceleration),
    ) {
        RemoteUpdate::Applied
    } else {
        log::debug!("Dropping update for unknown entity {id:#010x}");
        RemoteUpdate::UnknownId
    }
}

/// Committed frames physics reads while building its next frame
pub struct PhysicsInputs<'a> {
    pub time: f64,
    pub roster: &'a RosterState,
    pub input: &'a InputState,
    pub incoming: &'a [Message],
}

#[derive(Debug, Clone)]
pub struct Physics {
    frames: DoubleBuffer<PhysicsState>,
    params: PhysicsParams,
    system_id: u32,
}

impl Physics {
    pub fn new(params: PhysicsParams, system_id: u32, time: f64) -> Self {
        let capacity = params.max_points;
        Self {
            frames: DoubleBuffer::from_fn(|| PhysicsState::new(capacity, time)),
            params,
            system_id,
        }
    }

    pub fn current(&self) -> &PhysicsState {
        self.frames.current()
    }

    pub fn params(&self) -> &PhysicsParams {
        &self.params
    }

    /// Random id stamped on every outgoing update
    pub fn system_id(&self) -> u32 {
        self.system_id
    }

    fn player_half_extent(&self) -> Vec2 {
        Vec2::splat(self.params.player_radius)
    }

    /// Place a player entity in the committed frame. Only valid between ticks.
    pub fn insert_player<R: Rng + ?Sized>(&mut self, id: u32, position: Vec2, rng: &mut R) -> Result<(), SimError> {
        let half_extent = self.player_half_extent();
        self.frames
            .current_mut()
            .spawn_player(id, position, half_extent, rng)
    }

    pub fn evolve<R: Rng + ?Sized>(&mut self, inputs: PhysicsInputs<'_>, rng: &mut R) -> Result<(), SimError> {
        let half_extent = self.player_half_extent();
        let bound = center_bounds(half_extent);
        let PhysicsParams {
            gamma,
            acceleration: scale,
            extrapolate_remote,
            ..
        } = self.params;
        let system_id = self.system_id;

        let (current, next) = self.frames.begin();
        let dt = (inputs.time - current.time) as f32;
        next.time = inputs.time;
        next.contacts.fill(WallContact::empty());

        let announced = inputs.incoming.iter().filter_map(|msg| match *msg {
            Message::NewPlayer { id, .. } => Some(id),
            _ => None,
        });
        for id in inputs.roster.iter().map(|p| p.id).chain(announced) {
            if !next.entities.contains(id) {
                let position = Vec2::new(
                    rng.random_range(-1.0..1.0) * bound.x,
                    rng.random_range(-1.0..1.0) * bound.y,
                );
                next.spawn_player(id, position, half_extent, rng)?;
                log::debug!("Spawned entity {id:#010x} at {position}");
            }
        }

        for player in inputs.roster.iter() {
            if !inputs.input.drives(player.id) {
                continue;
            }
            let Some(entity) = next.entities.get(player.id) else {
                continue;
            };
            let acceleration = scale * player.intent;
            if acceleration != entity.acceleration {
                next.entities.set_acceleration(player.id, acceleration);
                next.outgoing.push(Message::update_point(
                    player.id,
                    system_id,
                    entity.position,
                    entity.velocity,
                    acceleration,
                ));
            }
        }

        for msg in inputs.incoming {
            apply_remote_update(&mut next.entities, system_id, msg);
        }

        for row in 0..next.entities.len() {
            let id = next.entities.ids()[row];
            let local = inputs.input.drives(id) && inputs.roster.contains(id);
            let extrapolated = extrapolate_remote && inputs.roster.contains(id);
            if !(local || extrapolated) {
                continue;
            }
            let bounds = next
                .shapes
                .half_extent_of(id)
                .map_or(bound, center_bounds);
            let (position, velocity, acceleration) = next.entities.kinematics_mut(row);
            next.contacts[row] = integrate_point(position, velocity, acceleration, gamma, dt, bounds);
        }
        Ok(())
    }

    pub fn sync(&mut self) {
        self.frames.swap();
    }
}
