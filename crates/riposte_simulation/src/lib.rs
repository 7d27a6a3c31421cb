//! Riposte Simulation Core
//!
//! Combat resolution for a 2D action game on Bevy 0.16, headless:
//! - scheduler: named-lane timers with data payloads
//! - combat: defense state machine (parry/block/hit), HP/SP meter, spark pool
//! - config: TOML tuning with validated defaults
//!
//! Physics, rendering, audio and scene flow live outside; they talk to the
//! core through components and events (see [`combat::events`]).

use std::time::Duration;

use bevy::ecs::event::event_update_system;
use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub mod combat;
pub mod components;
pub mod config;
pub mod logger;
pub mod scheduler;

pub use combat::{defender_bundle, spawn_duel, CombatPlugin};
pub use components::*;
pub use config::{CombatConfig, ConfigError, WindowPolicy};
pub use logger::init_logger;
pub use scheduler::{Scheduler, TimerHandle};

/// Default seed of [`DeterministicRng`].
pub const DEFAULT_SEED: u64 = 42;

/// Fixed simulation rate; tuning durations snap to whole ticks of it.
pub const SIMULATION_HZ: f64 = 60.0;

/// Main simulation plugin (all combat subsystems).
///
/// Resources already present (seed, config, session) are kept.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // 60Hz simulation tick (frame-based timings divide evenly)
            .insert_resource(Time::<Fixed>::from_hz(SIMULATION_HZ))
            .init_resource::<DeterministicRng>()
            .init_resource::<CombatConfig>()
            .init_resource::<Session>()
            .add_plugins(CombatPlugin);
    }
}

/// Seeded RNG resource (hit vocalization choice).
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

/// Minimal Bevy App for headless simulation.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(SIMULATION_HZ));

    app
}

/// Run one simulation tick of `delta` without touching the wall clock.
///
/// Advances the generic `Time` clock the combat systems read, runs
/// `FixedUpdate` then `FixedPostUpdate` once, and rotates the event buffers
/// the way `App::update` does: an event stays readable for two steps.
/// Deterministic regardless of host speed.
pub fn step_fixed(app: &mut App, delta: Duration) {
    let world = app.world_mut();
    world.resource_mut::<Time>().advance_by(delta);
    world.run_schedule(FixedUpdate);
    // Absent when nothing records events
    let _ = world.try_run_schedule(FixedPostUpdate);

    if let Err(err) = world.run_system_cached(event_update_system) {
        logger::log_error(&format!("Event buffer update failed: {}", err));
    }
}

/// One fixed tick at [`SIMULATION_HZ`].
pub fn fixed_tick() -> Duration {
    Duration::from_secs_f64(1.0 / SIMULATION_HZ)
}

/// Full history of `E`, oldest first (see [`record_events`]).
#[derive(Resource, Debug)]
pub struct EventLog<E: Event>(pub Vec<E>);

impl<E: Event> Default for EventLog<E> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<E: Event> EventLog<E> {
    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Keep every `E` in an [`EventLog<E>`] resource.
///
/// `Events<E>` only holds the last two steps. Replays and tests that need the
/// whole exchange record it here; the copy runs in `FixedPostUpdate`, after
/// the combat chain.
pub fn record_events<E: Event + Clone>(app: &mut App) -> &mut App {
    app.init_resource::<EventLog<E>>()
        .add_systems(FixedPostUpdate, copy_to_log::<E>)
}

fn copy_to_log<E: Event + Clone>(mut events: EventReader<E>, mut log: ResMut<EventLog<E>>) {
    log.0.extend(events.read().cloned());
}

/// World snapshot for determinism comparisons
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Sorted by entity index for a stable byte order
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
