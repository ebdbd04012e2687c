//! Tick driver
//!
//! Runs the components in a fixed order. Every component builds its next
//! frame from committed frames only, then all of them swap together, and
//! only then does the network broadcast what the tick produced and collect
//! what arrived for the next tick.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::input::Input;
use super::physics::{Physics, PhysicsInputs};
use super::players::{PlayerFlags, Roster, RosterInputs};
use crate::error::SimError;
use crate::net::{Network, Transport};
use crate::settings::Parameters;

/// External input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Latest pointer joystick sample, if the pointer moved
    pub pointer_axes: Option<Vec2>,
}

/// Committed state of one player, for rendering and audio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerView {
    pub id: u32,
    pub skin: u32,
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub just_collided: bool,
    /// Driven by a controller on this process
    pub local: bool,
}

pub struct World<T> {
    rng: Pcg32,
    input: Input,
    roster: Roster,
    physics: Physics,
    network: Network<T>,
    time: f64,
    ticks: u64,
}

impl<T: Transport> World<T> {
    /// Build a world at `time` (seconds) and connect the configured controllers
    pub fn new(params: &Parameters, seed: u64, transport: T, time: f64) -> Result<Self, SimError> {
        let mut rng = Pcg32::seed_from_u64(seed);
        let system_id = rng.random();
        let input = Input::new(&params.input, time, &mut rng)?;
        log::info!("World {system_id:#010x} created (seed {seed})");
        Ok(Self {
            rng,
            input,
            roster: Roster::new(params.max_players, time),
            physics: Physics::new(params.physics.clone(), system_id, time),
            network: Network::new(transport),
            time,
            ticks: 0,
        })
    }

    /// Advance to `time`. An error leaves the committed frames untouched and
    /// the world should be considered faulted.
    pub fn tick(&mut self, input: &TickInput, time: f64) -> Result<(), SimError> {
        if let Some(axes) = input.pointer_axes {
            self.input.set_pointer_axes(axes);
        }

        let incoming = self.network.incoming();
        self.input.evolve(time, &mut self.rng);
        self.roster.evolve(
            RosterInputs {
                time,
                input: self.input.current(),
                incoming,
                physics: self.physics.current(),
            },
            &mut self.rng,
        )?;
        self.physics.evolve(
            PhysicsInputs {
                time,
                roster: self.roster.current(),
                input: self.input.current(),
                incoming,
            },
            &mut self.rng,
        )?;

        self.input.sync();
        self.roster.sync();
        self.physics.sync();

        let outgoing = self
            .roster
            .current()
            .outgoing()
            .iter()
            .chain(self.physics.current().outgoing());
        self.network.send_all(outgoing);
        self.network.receive();

        self.time = time;
        self.ticks += 1;
        Ok(())
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn system_id(&self) -> u32 {
        self.physics.system_id()
    }

    pub fn input(&self) -> &Input {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut Input {
        &mut self.input
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn physics(&self) -> &Physics {
        &self.physics
    }

    pub fn network(&self) -> &Network<T> {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut Network<T> {
        &mut self.network
    }

    /// Place a player entity at a fixed position before it would be spawned randomly
    pub fn insert_player(&mut self, id: u32, position: Vec2) -> Result<(), SimError> {
        self.physics.insert_player(id, position, &mut self.rng)
    }

    /// Players that have an entity in the committed frame
    pub fn player_views(&self) -> Vec<PlayerView> {
        let entities = &self.physics.current().entities;
        let input = self.input.current();
        self.roster
            .current()
            .iter()
            .filter_map(|player| {
                let entity = entities.get(player.id)?;
                Some(PlayerView {
                    id: player.id,
                    skin: player.skin,
                    position: entity.position,
                    velocity: entity.velocity,
                    acceleration: entity.acceleration,
                    just_collided: player.flags.contains(PlayerFlags::JUST_COLLIDED),
                    local: input.drives(player.id),
                })
            })
            .collect()
    }

    /// Players whose collision started this tick
    pub fn collision_events(&self) -> Vec<u32> {
        self.roster
            .current()
            .iter()
            .filter(|p| p.flags.contains(PlayerFlags::JUST_COLLIDED))
            .map(|p| p.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{LoopbackHub, Message, Offline};
    use crate::settings::{InputParams, PhysicsParams};
    use crate::sim::WallContact;

    fn params(pointer: usize, cpu: usize) -> Parameters {
        Parameters {
            physics: PhysicsParams::default(),
            input: InputParams {
                max_controllers: 4,
                cpu_controllers: cpu,
                player_controllers: pointer,
            },
            max_players: 8,
        }
    }

    fn count_updates(msgs: &[Message]) -> usize {
        msgs.iter().filter(|m| m.is_update_point()).count()
    }

    #[test]
    fn test_local_player_spawns_after_roster() {
        let mut world = World::new(&params(1, 0), 1, Offline, 0.0).unwrap();
        let id = world.input().current().controllers()[0].player_id;

        world.tick(&TickInput::default(), 0.1).unwrap();
        assert!(world.roster().current().contains(id));
        assert!(!world.physics().current().entities.contains(id));

        world.tick(&TickInput::default(), 0.2).unwrap();
        let views = world.player_views();
        assert_eq!(views.len(), 1);
        assert!(views[0].local);
        let bound = 1.0 - world.physics().params().player_radius;
        assert!(views[0].position.x.abs() <= bound && views[0].position.y.abs() <= bound);
    }

    #[test]
    fn test_end_to_end_single_player() {
        let mut p = params(1, 0);
        p.physics = PhysicsParams {
            max_points: 4,
            gamma: 0.5,
            acceleration: 1.0,
            player_radius: 0.2,
            extrapolate_remote: false,
        };
        let mut world = World::new(&p, 2, Offline, 0.0).unwrap();
        let id = world.input().current().controllers()[0].player_id;
        let push_right = TickInput {
            pointer_axes: Some(Vec2::X),
        };

        // Let the roster register the player, then pin the spawn at the origin
        world.tick(&push_right, 0.1).unwrap();
        world.insert_player(id, Vec2::ZERO).unwrap();

        let mut updates = 0;
        let mut reflected = false;
        let mut edges = 0;
        for n in 0..50 {
            world.tick(&push_right, 0.2 + 0.1 * n as f64).unwrap();
            let physics = world.physics().current();
            updates += count_updates(physics.outgoing());

            let entity = physics.entities.get(id).unwrap();
            if physics.contacts(id) == Some(WallContact::RIGHT) {
                assert_eq!(entity.position.x, 0.8);
                assert!(entity.velocity.x < 0.0);
                reflected = true;
            }
            assert!(entity.position.x <= 0.8);
            edges += world.collision_events().len();
        }

        assert!(reflected);
        assert!(edges >= 1);
        assert_eq!(updates, 1);
        assert_eq!(world.network().stats().dropped, 2);
    }

    #[test]
    fn test_new_player_converges_without_rebroadcast() {
        let hub = LoopbackHub::new();
        let mut a = World::new(&params(1, 0), 10, hub.endpoint(), 0.0).unwrap();
        let mut b = World::new(&params(0, 0), 20, hub.endpoint(), 0.0).unwrap();
        let p = a.input().current().controllers()[0].player_id;

        for n in 1..=5 {
            let t = 0.1 * n as f64;
            a.tick(&TickInput::default(), t).unwrap();
            b.tick(&TickInput::default(), t).unwrap();
            assert!(
                !b.roster()
                    .current()
                    .outgoing()
                    .iter()
                    .any(|m| matches!(m, Message::NewPlayer { id, .. } if *id == p))
            );
        }

        let skin = a.roster().current().skin(p).unwrap();
        assert_eq!(b.roster().current().skin(p), Some(skin));
        assert!(b.physics().current().entities.contains(p));
        assert!(b.player_views().iter().all(|v| !v.local));
    }

    #[test]
    fn test_remote_updates_follow_owner() {
        let hub = LoopbackHub::new();
        let mut a = World::new(&params(1, 0), 30, hub.endpoint(), 0.0).unwrap();
        let mut b = World::new(&params(0, 0), 40, hub.endpoint(), 0.0).unwrap();
        let p = a.input().current().controllers()[0].player_id;
        let input = TickInput {
            pointer_axes: Some(Vec2::new(0.0, 1.0)),
        };

        for n in 1..=6 {
            let t = 0.05 * n as f64;
            a.tick(&input, t).unwrap();
            b.tick(&input, t).unwrap();
        }

        // B only moves P through A's updates, so its acceleration matches A's
        let a_acc = a.physics().current().entities.acceleration(p).unwrap();
        let b_acc = b.physics().current().entities.acceleration(p).unwrap();
        assert_eq!(a_acc, Vec2::new(0.0, 10.0));
        assert_eq!(b_acc, a_acc);
        // No self-echo was ever applied on A: it only sent, never changed from outside
        assert!(a.network().stats().received > 0);
    }

    #[test]
    fn test_disconnected_peer_keeps_running() {
        let hub = LoopbackHub::new();
        let endpoint = hub.endpoint();
        endpoint.set_online(false);
        let mut world = World::new(&params(0, 1), 50, endpoint, 0.0).unwrap();
        for n in 1..=120 {
            world.tick(&TickInput::default(), n as f64 / 60.0).unwrap();
        }
        assert_eq!(world.ticks(), 120);
        assert_eq!(world.player_views().len(), 1);
        assert_eq!(world.network().stats().sent, 0);
        assert!(world.network().stats().dropped >= 1);
    }

    #[test]
    fn test_capacity_exhaustion_is_fatal() {
        let mut p = params(0, 0);
        p.max_players = 1;
        let hub = LoopbackHub::new();
        let mut raw = hub.endpoint();
        let mut world = World::new(&p, 60, hub.endpoint(), 0.0).unwrap();

        raw.send(Message::new_player(1, 0).encode().unwrap()).unwrap();
        raw.send(Message::new_player(2, 0).encode().unwrap()).unwrap();
        world.tick(&TickInput::default(), 0.1).unwrap();

        let err = world.tick(&TickInput::default(), 0.2).unwrap_err();
        assert!(matches!(err, SimError::CapacityExhausted { store: "player", .. }));
        // Nothing from the failed tick was committed
        assert_eq!(world.ticks(), 1);
        assert!(world.roster().current().is_empty());
    }

    #[test]
    fn test_determinism() {
        // Two worlds with the same seed produce identical results
        let mut w1 = World::new(&params(0, 2), 99999, Offline, 0.0).unwrap();
        let mut w2 = World::new(&params(0, 2), 99999, Offline, 0.0).unwrap();

        for n in 1..=240 {
            let t = n as f64 / 60.0;
            w1.tick(&TickInput::default(), t).unwrap();
            w2.tick(&TickInput::default(), t).unwrap();
        }

        assert_eq!(w1.system_id(), w2.system_id());
        assert_eq!(w1.player_views(), w2.player_views());
        assert_eq!(w1.physics().current(), w2.physics().current());
    }
}
