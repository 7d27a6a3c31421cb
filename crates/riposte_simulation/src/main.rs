//! Headless Riposte duel
//!
//! Runs a scripted exchange (parries, blocks, clean hits, a super) without a
//! renderer and prints how each contact resolved.
//!
//! Usage: `riposte_simulation [combat.toml]`

use bevy::ecs::event::Events;
use bevy::prelude::*;
use riposte_simulation::combat::{
    AdjustMeter, ContactBegan, ContactKind, ContactResolved, MeterChange, ResourceMeter,
    SessionDefeated,
};
use riposte_simulation::logger::{log_info, log_warning};
use riposte_simulation::*;

const SEED: u64 = 42;
const TICKS: u32 = 900;
/// Enemy swings every this many ticks
const ATTACK_PERIOD: u32 = 60;

fn load_config() -> CombatConfig {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "combat.toml".to_string());

    match CombatConfig::load(&path) {
        Ok(config) => {
            log_info(&format!("Loaded combat config from {}", path));
            config
        }
        Err(err) => {
            log_warning(&format!("{}, using default tuning", err));
            CombatConfig::default()
        }
    }
}

/// What the player does against the n-th enemy swing.
#[derive(Debug, Clone, Copy)]
enum Reaction {
    Parry,
    Block,
    Nothing,
}

fn reaction_for(swing: u32) -> Reaction {
    match swing % 3 {
        0 => Reaction::Parry,
        1 => Reaction::Block,
        _ => Reaction::Nothing,
    }
}

fn main() {
    let mut app = create_headless_app(SEED);
    // Practice session: the player starts with a few super bars
    app.insert_resource(load_config())
        .insert_resource(Session::practice())
        .add_plugins(SimulationPlugin);

    let config = app.world().resource::<CombatConfig>().clone();
    let (player, enemy) = spawn_duel(
        app.world_mut(),
        &config,
        Vec2::new(0.0, 0.0),
        Vec2::new(1.5, 0.0),
    );

    println!("Starting Riposte headless duel (seed: {})", SEED);

    let mut resolved_cursor = app
        .world()
        .resource::<Events<ContactResolved>>()
        .get_cursor();
    let mut defeat_cursor = app
        .world()
        .resource::<Events<SessionDefeated>>()
        .get_cursor();

    for tick in 0..TICKS {
        let swing = tick / ATTACK_PERIOD;
        let phase = tick % ATTACK_PERIOD;

        if phase == 0 {
            app.world_mut().send_event(ContactBegan {
                defender: player,
                source_x: 1.5,
                kind: ContactKind::MeleeCollisionEnter,
            });
        }

        if let Some(mut guard) = app.world_mut().get_mut::<GuardInput>(player) {
            let current = reaction_for(swing);
            let next = reaction_for(swing + 1);
            match phase {
                // Tap inside the reaction window
                1 if matches!(current, Reaction::Parry) => guard.press(),
                2 if matches!(current, Reaction::Parry) => guard.release(),
                20 if matches!(current, Reaction::Block) => guard.release(),
                // Raise the guard well before the swing lands (a tap on contact would parry)
                50 if matches!(next, Reaction::Block) => guard.press(),
                _ => {}
            }
        }

        // Cash in a super once the player has a full bar
        let player_sp = app
            .world()
            .get::<ResourceMeter>(player)
            .map(|meter| meter.sp())
            .unwrap_or(0);
        if phase == 30 && player_sp >= config.meter.tier_size {
            app.world_mut().send_event(AdjustMeter {
                target: player,
                change: MeterChange::Spend(config.meter.tier_size),
            });
            app.world_mut().send_event(ContactBegan {
                defender: enemy,
                source_x: 0.0,
                kind: ContactKind::Super,
            });
        }

        step_fixed(&mut app, fixed_tick());

        let world = app.world();
        for resolved in resolved_cursor.read(world.resource::<Events<ContactResolved>>()) {
            println!("Tick {}: {:?} → {:?}", tick, resolved.defender, resolved.outcome);
        }
        let defeated: Vec<Entity> = defeat_cursor
            .read(world.resource::<Events<SessionDefeated>>())
            .map(|event| event.loser)
            .collect();
        if !defeated.is_empty() {
            for loser in defeated {
                println!("Tick {}: {:?} knocked out", tick, loser);
            }
            app.world_mut().resource_mut::<Session>().active = false;
        }
    }

    for (name, entity) in [("player", player), ("enemy", enemy)] {
        if let Some(meter) = app.world().get::<ResourceMeter>(entity) {
            println!(
                "{}: HP {}/{} SP {}/{} (tier {})",
                name,
                meter.hp(),
                meter.limits().max_hp,
                meter.sp(),
                meter.limits().max_sp,
                meter.super_tier()
            );
        }
    }

    println!("Simulation complete!");
}
