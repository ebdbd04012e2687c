//! Point-mass entity store
//!
//! Fixed-capacity structure-of-arrays table. Rows are append-only and are
//! referenced from other stores by id, never by row index.
//!
//! Ids are random 32-bit values with no global allocation authority. Two
//! peers drawing the same id is an accepted risk (about n²/2³³ for n live
//! ids, so roughly 3e-8 for a full 16-player arena).

use std::collections::HashMap;

use glam::Vec2;
use rand::Rng;

use super::buffer::CopyFrom;
use crate::error::SimError;

/// One entity row, copied out of the store
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entity {
    pub id: u32,
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityStore {
    ids: Box<[u32]>,
    positions: Box<[Vec2]>,
    velocities: Box<[Vec2]>,
    accelerations: Box<[Vec2]>,
    count: usize,
    /// id -> row
    index: HashMap<u32, usize>,
}

impl EntityStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            ids: vec![0; capacity].into_boxed_slice(),
            positions: vec![Vec2::ZERO; capacity].into_boxed_slice(),
            velocities: vec![Vec2::ZERO; capacity].into_boxed_slice(),
            accelerations: vec![Vec2::ZERO; capacity].into_boxed_slice(),
            count: 0,
            index: HashMap::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.ids.len()
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Append an entity, generating a random id when none is given
    pub fn add_entity<R: Rng + ?Sized>(
        &mut self,
        position: Vec2,
        velocity: Vec2,
        acceleration: Vec2,
        id: Option<u32>,
        rng: &mut R,
    ) -> Result<u32, SimError> {
        if self.count == self.capacity() {
            return Err(SimError::CapacityExhausted {
                store: "entity",
                capacity: self.capacity(),
            });
        }
        let id = id.unwrap_or_else(|| rng.random());
        if self.index.contains_key(&id) {
            return Err(SimError::DuplicateId { store: "entity", id });
        }

        let row = self.count;
        self.ids[row] = id;
        self.positions[row] = position;
        self.velocities[row] = velocity;
        self.accelerations[row] = acceleration;
        self.index.insert(id, row);
        self.count += 1;
        Ok(id)
    }

    /// Row of an id, if present
    #[inline]
    pub fn find(&self, id: u32) -> Option<usize> {
        self.index.get(&id).copied()
    }

    #[inline]
    pub fn contains(&self, id: u32) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: u32) -> Option<Entity> {
        self.find(id).map(|row| self.row(row))
    }

    pub fn position(&self, id: u32) -> Option<Vec2> {
        self.find(id).map(|row| self.positions[row])
    }

    pub fn velocity(&self, id: u32) -> Option<Vec2> {
        self.find(id).map(|row| self.velocities[row])
    }

    pub fn acceleration(&self, id: u32) -> Option<Vec2> {
        self.find(id).map(|row| self.accelerations[row])
    }

    /// Returns false when the id is unknown
    pub fn set_position(&mut self, id: u32, position: Vec2) -> bool {
        self.find(id)
            .map(|row| self.positions[row] = position)
            .is_some()
    }

    pub fn set_velocity(&mut self, id: u32, velocity: Vec2) -> bool {
        self.find(id)
            .map(|row| self.velocities[row] = velocity)
            .is_some()
    }

    pub fn set_acceleration(&mut self, id: u32, acceleration: Vec2) -> bool {
        self.find(id)
            .map(|row| self.accelerations[row] = acceleration)
            .is_some()
    }

    /// Overwrite the full kinematic state of an entity
    pub fn set_kinematics(&mut self, id: u32, position: Vec2, velocity: Vec2, acceleration: Vec2) -> bool {
        let Some(row) = self.find(id) else {
            return false;
        };
        self.positions[row] = position;
        self.velocities[row] = velocity;
        self.accelerations[row] = acceleration;
        true
    }

    pub fn row(&self, row: usize) -> Entity {
        Entity {
            id: self.ids[row],
            position: self.positions[row],
            velocity: self.velocities[row],
            acceleration: self.accelerations[row],
        }
    }

    /// Live ids in row order
    pub fn ids(&self) -> &[u32] {
        &self.ids[..self.count]
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        (0..self.count).map(|row| self.row(row))
    }

    /// Mutable position, velocity and acceleration of one row
    pub(crate) fn kinematics_mut(&mut self, row: usize) -> (&mut Vec2, &mut Vec2, Vec2) {
        (
            &mut self.positions[row],
            &mut self.velocities[row],
            self.accelerations[row],
        )
    }
}

impl CopyFrom for EntityStore {
    fn copy_from(&mut self, other: &Self) {
        debug_assert_eq!(self.capacity(), other.capacity());
        let n = other.count;
        self.ids[..n].copy_from_slice(&other.ids[..n]);
        self.positions[..n].copy_from_slice(&other.positions[..n]);
        self.velocities[..n].copy_from_slice(&other.velocities[..n]);
        self.accelerations[..n].copy_from_slice(&other.accelerations[..n]);
        self.index.clone_from(&other.index);
        self.count = n;
    }
}
