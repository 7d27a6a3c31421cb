//! Combat resolution core
//!
//! ECS responsibility:
//! - Defense state machine: reaction window, parry, block, hit, super hit
//! - Resource meter: HP/SP, super tiers, knockout detection
//! - Hit-spark pool
//!
//! Outside responsibility (physics / render / audio / scene layers):
//! - Contact detection → `ContactBegan`
//! - Acting on outgoing events (knockback, sounds, movement locks, defeat)
//! - Playing sparks and returning them with `SparkExpired`

use bevy::prelude::*;

pub mod components;
pub mod events;
pub mod systems;

pub use components::{
    lanes, CombatCue, Defense, DefenseContext, DefenseTimer, EffectPool, EffectSlot,
    HealthSignal, KnockbackDir, KnockoutState, ResourceMeter, Stance, TierReached,
};
pub use events::*;

use crate::components::{
    AnimationFlags, Appearance, Defender, GuardInput, Mobility, Offense, Opponent, Player,
};
use crate::config::CombatConfig;

/// Combat Plugin
///
/// Registers events and the combat systems in FixedUpdate.
///
/// Execution order (one chain):
/// 1. intake_contacts: contacts open reaction windows / resolve supers
/// 2. evaluate_guard: parry tap / block hold
/// 3. advance_defense_timers: windows, cooldowns, flashes
/// 4. apply_meter_adjustments: opponent rewards, heals, spending
/// 5. advance_meter_drains: gauge animation
/// 6. release_expired_sparks: pool bookkeeping
/// 7. grant_practice_meter: practice session start
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ContactBegan>()
            .add_event::<AdjustMeter>()
            .add_event::<SparkExpired>()
            .add_event::<ContactResolved>()
            .add_event::<SoundRequested>()
            .add_event::<KnockbackApplied>()
            .add_event::<AttackCancelRequested>()
            .add_event::<MovementRestricted>()
            .add_event::<MovementDisabled>()
            .add_event::<HitboxChanged>()
            .add_event::<SessionDefeated>()
            .add_event::<SuperTierChanged>();

        app.register_type::<Defender>()
            .register_type::<Player>()
            .register_type::<Opponent>()
            .register_type::<GuardInput>()
            .register_type::<Mobility>()
            .register_type::<Offense>()
            .register_type::<AnimationFlags>()
            .register_type::<Appearance>()
            .register_type::<EffectPool>();

        app.add_systems(
            FixedUpdate,
            (
                // Phase 1: contacts, then the guard for this tick
                systems::intake_contacts,
                systems::evaluate_guard,
                // Phase 2: elapsed timers in scheduling order
                systems::advance_defense_timers,
                // Phase 3: meters (rewards written above are read here)
                systems::apply_meter_adjustments,
                systems::advance_meter_drains,
                // Phase 4: bookkeeping
                systems::release_expired_sparks,
                systems::grant_practice_meter,
            )
                .chain(),
        );
    }
}

/// Components of a fresh defender: full HP, empty SP, idle defense.
pub fn defender_bundle(config: &CombatConfig, position: Vec2) -> impl Bundle {
    (
        Defender,
        Defense::new(),
        ResourceMeter::new(&config.meter),
        EffectPool::new(config.effects.spark_pool_size),
        Transform::from_translation(position.extend(0.0)),
    )
}

/// Spawn a player and an enemy wired as each other's opponent.
///
/// Returns `(player, enemy)`.
pub fn spawn_duel(
    world: &mut World,
    config: &CombatConfig,
    player_position: Vec2,
    enemy_position: Vec2,
) -> (Entity, Entity) {
    let player = world
        .spawn((defender_bundle(config, player_position), Player))
        .id();
    let enemy = world.spawn(defender_bundle(config, enemy_position)).id();

    world.entity_mut(player).insert(Opponent(enemy));
    world.entity_mut(enemy).insert(Opponent(player));

    crate::logger::log_info(&format!(
        "🥊 Duel spawned (player: {:?} at {}, enemy: {:?} at {})",
        player, player_position, enemy, enemy_position
    ));

    (player, enemy)
}
