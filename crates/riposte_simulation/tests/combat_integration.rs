//! Combat integration test
//!
//! Two defenders headless with the full SimulationPlugin:
//! - worked examples (hit, invincible hit, parry, knockout)
//! - meter invariants over a long scripted exchange
//! - no panics

use bevy::prelude::*;
use riposte_simulation::combat::*;
use riposte_simulation::*;

/// Helper: full combat App with a duel spawned
fn create_combat_app(seed: u64) -> (App, Entity, Entity) {
    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin);
    record_events::<SessionDefeated>(&mut app);
    record_events::<MovementDisabled>(&mut app);
    record_events::<SuperTierChanged>(&mut app);

    let config = CombatConfig::default();
    let (player, enemy) = spawn_duel(
        app.world_mut(),
        &config,
        Vec2::new(0.0, 0.0),
        Vec2::new(1.5, 0.0),
    );
    (app, player, enemy)
}

fn run_ticks(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        step_fixed(app, fixed_tick());
    }
}

fn hit(app: &mut App, defender: Entity, source_x: f32) {
    app.world_mut().send_event(ContactBegan {
        defender,
        source_x,
        kind: ContactKind::MeleeCollisionEnter,
    });
}

fn hp(app: &App, entity: Entity) -> i32 {
    app.world().get::<ResourceMeter>(entity).unwrap().hp()
}

fn sp(app: &App, entity: Entity) -> i32 {
    app.world().get::<ResourceMeter>(entity).unwrap().sp()
}

fn count<E: Event>(app: &App) -> usize {
    app.world().resource::<EventLog<E>>().len()
}

/// Example: 24 HP, one unblocked hit → 22; a hit while invincible leaves 22.
#[test]
fn test_hit_then_invincible_hit() {
    let (mut app, player, enemy) = create_combat_app(42);

    hit(&mut app, player, 1.5);
    run_ticks(&mut app, 6);
    assert_eq!(hp(&app, player), 22);
    assert_eq!(sp(&app, enemy), 4);

    hit(&mut app, player, 1.5);
    run_ticks(&mut app, 6);
    assert_eq!(hp(&app, player), 22);
    assert_eq!(sp(&app, enemy), 4);

    // Past the damage invincibility the next hit lands again
    run_ticks(&mut app, 40);
    hit(&mut app, player, 1.5);
    run_ticks(&mut app, 6);
    assert_eq!(hp(&app, player), 20);
    assert_eq!(sp(&app, enemy), 8);
}

/// Parry during the window: no damage, exactly 4 SP, guard held or not.
#[test]
fn test_parry_while_holding_guard() {
    let (mut app, player, enemy) = create_combat_app(42);

    // Block raised first...
    app.world_mut().get_mut::<GuardInput>(player).unwrap().press();
    run_ticks(&mut app, 2);

    // ...then a fresh tap inside the window
    hit(&mut app, player, 1.5);
    run_ticks(&mut app, 1);
    {
        let mut guard = app.world_mut().get_mut::<GuardInput>(player).unwrap();
        guard.release();
        guard.press();
    }
    run_ticks(&mut app, 10);

    assert_eq!(hp(&app, player), 24);
    assert_eq!(sp(&app, player), 4);
    assert_eq!(sp(&app, enemy), 0);
}

/// Unguarded hits until knockout: one defeat, opponent banks the rewards.
#[test]
fn test_duel_until_knockout() {
    let (mut app, player, enemy) = create_combat_app(7);

    for _ in 0..12 {
        hit(&mut app, player, 1.5);
        run_ticks(&mut app, 50);
    }

    assert_eq!(hp(&app, player), 0);
    assert_eq!(sp(&app, enemy), 48);
    assert_eq!(
        app.world().get::<ResourceMeter>(enemy).unwrap().displayed_tier(),
        2
    );
    assert!(app.world().get::<AnimationFlags>(player).unwrap().knocked_out);
    assert_eq!(count::<SessionDefeated>(&app), 1);
    assert_eq!(count::<MovementDisabled>(&app), 1);
    assert_eq!(count::<SuperTierChanged>(&app), 2);
}

/// Meter invariants hold every tick of a long scripted exchange.
#[test]
fn test_meter_invariants_1000_ticks() {
    let (mut app, player, enemy) = create_combat_app(123);
    let limits = CombatConfig::default().meter;

    for tick in 0..1000usize {
        if tick % 37 == 0 {
            hit(&mut app, player, 1.5);
        }
        if tick % 53 == 0 {
            hit(&mut app, enemy, 0.0);
        }
        if let Some(mut guard) = app.world_mut().get_mut::<GuardInput>(player) {
            match tick % 37 {
                2 => guard.press(),
                3 => guard.release(),
                _ => {}
            }
        }

        run_ticks(&mut app, 1);

        for entity in [player, enemy] {
            let meter = app.world().get::<ResourceMeter>(entity).unwrap();
            assert!(
                meter.hp() <= limits.max_hp,
                "Tick {}: {:?} hp {} > max {}",
                tick,
                entity,
                meter.hp(),
                limits.max_hp
            );
            assert!(
                meter.sp() >= 0 && meter.sp() <= limits.max_sp,
                "Tick {}: {:?} sp {} out of [0, {}]",
                tick,
                entity,
                meter.sp(),
                limits.max_sp
            );
            assert_eq!(meter.super_tier() as i32, meter.sp() / limits.tier_size);

            let defense = app.world().get::<Defense>(entity).unwrap();
            assert!(!(defense.is_blocking() && defense.is_parrying()));
        }
    }

    riposte_simulation::logger::log("✓ Meter invariants: 1000 ticks, all checks passed");
}
