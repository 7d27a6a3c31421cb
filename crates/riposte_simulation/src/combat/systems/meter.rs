//! Meter systems: external adjustments, gauge drain, practice grant.

use bevy::prelude::*;

use crate::combat::components::{Defense, ResourceMeter, TierReached};
use crate::combat::events::{AdjustMeter, MeterChange, SoundCue, SoundRequested, SuperTierChanged};
use crate::components::{Appearance, Player, Session};
use crate::config::CombatConfig;

fn announce_tier(
    entity: Entity,
    reached: Option<TierReached>,
    tiers: &mut EventWriter<SuperTierChanged>,
    sounds: &mut EventWriter<SoundRequested>,
) {
    if let Some(TierReached(tier)) = reached {
        crate::logger::log(&format!("⭐ {:?} reached super tier {}", entity, tier));
        tiers.write(SuperTierChanged { entity, tier });
        sounds.write(SoundRequested {
            source: entity,
            sound: SoundCue::SuperTier(tier),
        });
    }
}

/// System: apply `AdjustMeter` requests (opponent rewards, heals, supers)
///
/// HP changes also update the target's low-health flash when it has a defense.
pub fn apply_meter_adjustments(
    mut requests: EventReader<AdjustMeter>,
    config: Res<CombatConfig>,
    session: Res<Session>,
    mut actors: Query<(&mut ResourceMeter, Option<&mut Defense>, Option<&mut Appearance>)>,
    mut tiers: EventWriter<SuperTierChanged>,
    mut sounds: EventWriter<SoundRequested>,
) {
    for request in requests.read() {
        let Ok((mut meter, defense, appearance)) = actors.get_mut(request.target) else {
            crate::logger::log_warning(&format!(
                "AdjustMeter: {:?} has no ResourceMeter",
                request.target
            ));
            continue;
        };

        match request.change {
            MeterChange::Hp(delta) => {
                let signal = meter.adjust_hp(delta, &session);
                if let (Some(mut defense), Some(mut appearance)) = (defense, appearance) {
                    defense.on_health_signal(signal, &config.defense, &mut appearance);
                }
            }
            MeterChange::Sp(delta) => {
                let reached = meter.adjust_sp(delta, &session);
                announce_tier(request.target, reached, &mut tiers, &mut sounds);
            }
            MeterChange::Spend(cost) => {
                if meter.spend_sp(cost, &session) {
                    crate::logger::log(&format!(
                        "⚡ {:?} spent {} SP (left: {})",
                        request.target,
                        cost,
                        meter.sp()
                    ));
                } else {
                    crate::logger::log(&format!(
                        "⚡ {:?} can't spend {} SP (has {})",
                        request.target,
                        cost,
                        meter.sp()
                    ));
                }
            }
        }
    }
}

/// System: displayed-SP drain after spending meter
pub fn advance_meter_drains(time: Res<Time>, mut meters: Query<&mut ResourceMeter>) {
    let delta = time.delta();

    for mut meter in meters.iter_mut() {
        if meter.is_draining() {
            meter.advance(delta);
        }
    }
}

/// System: practice sessions start the player with a few super bars
///
/// Runs once per app, on the first active tick a player exists (an intro
/// with the session inactive only delays it).
pub fn grant_practice_meter(
    mut granted: Local<bool>,
    config: Res<CombatConfig>,
    session: Res<Session>,
    mut players: Query<(Entity, &mut ResourceMeter), With<Player>>,
    mut tiers: EventWriter<SuperTierChanged>,
    mut sounds: EventWriter<SoundRequested>,
) {
    if *granted || !session.practice || !session.is_active() {
        return;
    }

    let grant = config.meter.practice_tiers * config.meter.tier_size;
    for (entity, mut meter) in players.iter_mut() {
        let reached = meter.adjust_sp(grant, &session);
        announce_tier(entity, reached, &mut tiers, &mut sounds);
        *granted = true;

        crate::logger::log_info(&format!(
            "🎓 Practice grant: {:?} starts with {} SP",
            entity,
            meter.sp()
        ));
    }
}
