//! Player roster
//!
//! One record per player ever seen, local or remote. Records are
//! append-only. The roster turns controller samples into acceleration
//! intents, announces new local players, and derives the one-tick
//! "just collided" edge from the physics contact flags.

use std::collections::HashMap;

use bitflags::bitflags;
use glam::Vec2;
use rand::Rng;

use super::buffer::{CopyFrom, DoubleBuffer};
use super::input::InputState;
use super::physics::PhysicsState;
use crate::error::SimError;
use crate::net::Message;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PlayerFlags: u8 {
        /// Touching a wall this tick
        const COLLIDING = 1;
        /// First tick of a contact
        const JUST_COLLIDED = 1 << 1;
    }
}

/// Flags for this tick given last tick's flags and the current contact state
pub fn collision_edge(previous: PlayerFlags, colliding: bool) -> PlayerFlags {
    if !colliding {
        return PlayerFlags::empty();
    }
    if previous.contains(PlayerFlags::COLLIDING) {
        PlayerFlags::COLLIDING
    } else {
        PlayerFlags::COLLIDING | PlayerFlags::JUST_COLLIDED
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Player {
    pub id: u32,
    pub skin: u32,
    pub intent: Vec2,
    pub flags: PlayerFlags,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RosterState {
    ids: Box<[u32]>,
    skins: Box<[u32]>,
    intents: Box<[Vec2]>,
    flags: Box<[PlayerFlags]>,
    count: usize,
    index: HashMap<u32, usize>,
    pub time: f64,
    outgoing: Vec<Message>,
}

impl RosterState {
    pub fn new(capacity: usize, time: f64) -> Self {
        Self {
            ids: vec![0; capacity].into_boxed_slice(),
            skins: vec![0; capacity].into_boxed_slice(),
            intents: vec![Vec2::ZERO; capacity].into_boxed_slice(),
            flags: vec![PlayerFlags::empty(); capacity].into_boxed_slice(),
            count: 0,
            index: HashMap::with_capacity(capacity),
            time,
            outgoing: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn contains(&self, id: u32) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: u32) -> Option<Player> {
        self.index.get(&id).map(|&row| self.row(row))
    }

    pub fn skin(&self, id: u32) -> Option<u32> {
        self.index.get(&id).map(|&row| self.skins[row])
    }

    pub fn flags(&self, id: u32) -> Option<PlayerFlags> {
        self.index.get(&id).map(|&row| self.flags[row])
    }

    pub fn iter(&self) -> impl Iterator<Item = Player> + '_ {
        (0..self.count).map(|row| self.row(row))
    }

    /// Messages produced by the tick that built this frame
    pub fn outgoing(&self) -> &[Message] {
        &self.outgoing
    }

    fn row(&self, row: usize) -> Player {
        Player {
            id: self.ids[row],
            skin: self.skins[row],
            intent: self.intents[row],
            flags: self.flags[row],
        }
    }

    fn add_player(&mut self, id: u32, skin: u32) -> Result<usize, SimError> {
        if self.count == self.ids.len() {
            return Err(SimError::CapacityExhausted {
                store: "player",
                capacity: self.ids.len(),
            });
        }
        let row = self.count;
        self.ids[row] = id;
        self.skins[row] = skin;
        self.intents[row] = Vec2::ZERO;
        self.flags[row] = PlayerFlags::empty();
        self.index.insert(id, row);
        self.count += 1;
        Ok(row)
    }

    /// Record a controller sample as the player's intent. A player seen for
    /// the first time gets a random skin and is announced to peers.
    /// Returns true when the player is new.
    pub fn on_input_sample<R: Rng + ?Sized>(
        &mut self,
        controller_id: u32,
        x: f32,
        y: f32,
        rng: &mut R,
    ) -> Result<bool, SimError> {
        let (row, created) = match self.index.get(&controller_id).copied() {
            Some(row) => (row, false),
            None => {
                let skin = rng.random();
                let row = self.add_player(controller_id, skin)?;
                self.outgoing.push(Message::new_player(controller_id, skin));
                log::info!("New local player {controller_id:#010x} (skin {skin})");
                (row, true)
            }
        };
        self.intents[row] = Vec2::new(x, y);
        Ok(created)
    }

    /// Add a player announced by a peer. Never re-announced from here.
    /// Returns true when the player is new.
    pub fn on_remote_new_player(&mut self, id: u32, skin: u32) -> Result<bool, SimError> {
        if self.contains(id) {
            return Ok(false);
        }
        self.add_player(id, skin)?;
        log::info!("New remote player {id:#010x} (skin {skin})");
        Ok(true)
    }

    /// Queue a `newPlayer` for a known player unless one is already queued
    fn announce(&mut self, id: u32) {
        let Some(skin) = self.skin(id) else {
            return;
        };
        let queued = self
            .outgoing
            .iter()
            .any(|m| matches!(m, Message::NewPlayer { id: queued, .. } if *queued == id));
        if !queued {
            self.outgoing.push(Message::new_player(id, skin));
        }
    }
}

impl CopyFrom for RosterState {
    fn copy_from(&mut self, other: &Self) {
        let n = other.count;
        self.ids[..n].copy_from_slice(&other.ids[..n]);
        self.skins[..n].copy_from_slice(&other.skins[..n]);
        self.intents[..n].copy_from_slice(&other.intents[..n]);
        self.flags[..n].copy_from_slice(&other.flags[..n]);
        self.index.clone_from(&other.index);
        self.count = n;
        self.time = other.time;
        self.outgoing.clear();
    }
}

/// Committed frames the roster reads while building its next frame
pub struct RosterInputs<'a> {
    pub time: f64,
    pub input: &'a InputState,
    pub incoming: &'a [Message],
    pub physics: &'a PhysicsState,
}

#[derive(Debug, Clone)]
pub struct Roster {
    frames: DoubleBuffer<RosterState>,
}

impl Roster {
    pub fn new(capacity: usize, time: f64) -> Self {
        Self {
            frames: DoubleBuffer::from_fn(|| RosterState::new(capacity, time)),
        }
    }

    pub fn current(&self) -> &RosterState {
        self.frames.current()
    }

    pub fn evolve<R: Rng + ?Sized>(&mut self, inputs: RosterInputs<'_>, rng: &mut R) -> Result<(), SimError> {
        let (current, next) = self.frames.begin();
        next.time = inputs.time;

        for controller in inputs.input.connected() {
            next.on_input_sample(controller.player_id, controller.axes.x, controller.axes.y, rng)?;
        }

        let mut discovered = false;
        for msg in inputs.incoming {
            if let Message::NewPlayer { id, skin } = *msg {
                discovered |= next.on_remote_new_player(id, skin)?;
            }
        }
        // Let newcomers learn about our players
        if discovered {
            for controller in inputs.input.connected() {
                next.announce(controller.player_id);
            }
        }

        for row in 0..next.count {
            let id = next.ids[row];
            let colliding = inputs
                .physics
                .contacts(id)
                .is_some_and(|contacts| !contacts.is_empty());
            let previous = current.flags(id).unwrap_or_default();
            next.flags[row] = collision_edge(previous, colliding);
        }
        Ok(())
    }

    pub fn sync(&mut self) {
        self.frames.swap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_collision_edge_fires_once() {
        // Contact on ticks 5..=9 only
        let mut flags = PlayerFlags::empty();
        let mut edges = Vec::new();
        for tick in 0..15 {
            flags = collision_edge(flags, (5..=9).contains(&tick));
            if flags.contains(PlayerFlags::JUST_COLLIDED) {
                edges.push(tick);
            }
            assert_eq!(flags.contains(PlayerFlags::COLLIDING), (5..=9).contains(&tick));
        }
        assert_eq!(edges, vec![5]);
    }

    #[test]
    fn test_input_sample_creates_and_announces_once() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut roster = RosterState::new(4, 0.0);

        assert!(roster.on_input_sample(77, 0.5, -0.5, &mut rng).unwrap());
        assert!(!roster.on_input_sample(77, 1.0, 0.0, &mut rng).unwrap());

        let player = roster.get(77).unwrap();
        assert_eq!(player.intent, Vec2::new(1.0, 0.0));
        assert_eq!(roster.outgoing(), &[Message::new_player(77, player.skin)]);
    }

    #[test]
    fn test_remote_new_player_is_silent() {
        let mut roster = RosterState::new(4, 0.0);
        assert!(roster.on_remote_new_player(5, 42).unwrap());
        assert!(!roster.on_remote_new_player(5, 43).unwrap());
        assert_eq!(roster.skin(5), Some(42));
        assert!(roster.outgoing().is_empty());
    }

    #[test]
    fn test_roster_capacity() {
        let mut roster = RosterState::new(1, 0.0);
        roster.on_remote_new_player(1, 0).unwrap();
        assert!(matches!(
            roster.on_remote_new_player(2, 0),
            Err(SimError::CapacityExhausted { store: "player", .. })
        ));
    }

    #[test]
    fn test_copy_from_clears_outgoing() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut a = RosterState::new(2, 0.0);
        let mut b = RosterState::new(2, 0.0);
        a.on_input_sample(1, 0.0, 0.0, &mut rng).unwrap();
        b.copy_from(&a);
        assert!(b.contains(1));
        assert!(b.outgoing().is_empty());
        assert_eq!(b.skin(1), a.skin(1));
    }
}
