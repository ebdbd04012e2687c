//! Arena Sync headless driver
//!
//! Runs two peers joined by an in-process relay, each with one CPU
//! controller, at a fixed 60 Hz step. Usage:
//!
//! ```text
//! arena-sync [parameters.json] [seconds]
//! ```

use std::process::ExitCode;

use arena_sync::Parameters;
use arena_sync::consts::DEFAULT_DT;
use arena_sync::net::{HubEndpoint, LoopbackHub};
use arena_sync::sim::{TickInput, World};

const DEFAULT_SECONDS: f64 = 10.0;

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Arena Sync (headless) starting...");

    let mut args = std::env::args().skip(1);
    let mut params = match args.next() {
        Some(path) => match Parameters::load(&path) {
            Ok(params) => params,
            Err(err) => {
                log::error!("{err}");
                return ExitCode::FAILURE;
            }
        },
        None => Parameters::default(),
    };
    let seconds = args
        .next()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(DEFAULT_SECONDS);

    // The headless driver has no pointer, so every local player is CPU driven
    params.input.player_controllers = 0;
    params.input.cpu_controllers = params.input.cpu_controllers.max(1);

    match run(&params, seconds) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("Simulation faulted: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(params: &Parameters, seconds: f64) -> Result<(), arena_sync::SimError> {
    let hub = LoopbackHub::new();
    let mut peers: Vec<World<HubEndpoint>> = (0..2)
        .map(|_| World::new(params, rand::random(), hub.endpoint(), 0.0))
        .collect::<Result<_, _>>()?;

    let steps = (seconds / DEFAULT_DT).round() as u64;
    let input = TickInput::default();
    for step in 1..=steps {
        let time = step as f64 * DEFAULT_DT;
        for world in &mut peers {
            world.tick(&input, time)?;
            for id in world.collision_events() {
                log::debug!("[{:#010x}] player {id:#010x} hit a wall", world.system_id());
            }
        }

        if step % 60 == 0 {
            for world in &peers {
                for view in world.player_views() {
                    log::info!(
                        "t={time:5.2} [{:#010x}] {} {:#010x} pos=({:+.3}, {:+.3})",
                        world.system_id(),
                        if view.local { "local " } else { "remote" },
                        view.id,
                        view.position.x,
                        view.position.y,
                    );
                }
            }
        }
    }

    for world in &peers {
        let stats = world.network().stats();
        log::info!(
            "[{:#010x}] {} ticks, {} players, sent={} received={} dropped={} malformed={}",
            world.system_id(),
            world.ticks(),
            world.roster().current().len(),
            stats.sent,
            stats.received,
            stats.dropped,
            stats.malformed,
        );
    }
    Ok(())
}
