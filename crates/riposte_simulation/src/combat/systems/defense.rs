//! Defense systems: contact intake, guard evaluation, timer dispatch.
//!
//! Each system builds a [`DefenseContext`] per defender, runs the state
//! machine, then flushes the collected [`CombatCue`]s into events.

use bevy::ecs::query::QueryData;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::combat::components::{CombatCue, Defense, DefenseContext, EffectPool, ResourceMeter};
use crate::combat::events::*;
use crate::components::{
    AnimationFlags, Appearance, Defender, GuardInput, Mobility, Offense, Opponent, Session,
};
use crate::config::{CombatConfig, DefenseTuning};
use crate::DeterministicRng;

/// Everything a defender carries that the state machine touches.
#[derive(QueryData)]
#[query_data(mutable)]
pub struct DefenderQuery {
    entity: Entity,
    defense: &'static mut Defense,
    meter: &'static mut ResourceMeter,
    sparks: &'static mut EffectPool,
    animation: &'static mut AnimationFlags,
    appearance: &'static mut Appearance,
    guard: &'static mut GuardInput,
    mobility: &'static Mobility,
    offense: &'static Offense,
    transform: &'static Transform,
    opponent: Option<&'static Opponent>,
}

/// Shared, non-per-actor inputs of a defense pass.
struct Shared<'a> {
    tuning: &'a DefenseTuning,
    session: &'a Session,
    rng: &'a mut ChaCha8Rng,
    cues: &'a mut Vec<CombatCue>,
}

fn with_context<R>(
    item: &mut DefenderQueryItem<'_>,
    shared: &mut Shared<'_>,
    run: impl FnOnce(&mut Defense, &mut DefenseContext) -> R,
) -> R {
    let eligible = item.mobility.is_eligible_to_act() && item.offense.is_eligible_to_act();
    let mut ctx = DefenseContext {
        actor: item.entity,
        tuning: shared.tuning,
        session: shared.session,
        meter: &mut *item.meter,
        animation: &mut *item.animation,
        appearance: &mut *item.appearance,
        sparks: &mut *item.sparks,
        rng: &mut *shared.rng,
        position: item.transform.translation.truncate(),
        eligible,
        cues: &mut *shared.cues,
    };
    run(&mut *item.defense, &mut ctx)
}

/// Event writers for every cue the state machine can emit.
#[derive(SystemParam)]
pub struct CueWriters<'w> {
    resolved: EventWriter<'w, ContactResolved>,
    sounds: EventWriter<'w, SoundRequested>,
    knockback: EventWriter<'w, KnockbackApplied>,
    cancel: EventWriter<'w, AttackCancelRequested>,
    restricted: EventWriter<'w, MovementRestricted>,
    disabled: EventWriter<'w, MovementDisabled>,
    hitbox: EventWriter<'w, HitboxChanged>,
    defeated: EventWriter<'w, SessionDefeated>,
    tiers: EventWriter<'w, SuperTierChanged>,
    meter: EventWriter<'w, AdjustMeter>,
}

impl CueWriters<'_> {
    /// Turn `actor`'s cues into events (drains `cues`).
    pub fn flush(&mut self, actor: Entity, opponent: Option<Entity>, cues: &mut Vec<CombatCue>) {
        for cue in cues.drain(..) {
            match cue {
                CombatCue::Sound(sound) => {
                    self.sounds.write(SoundRequested { source: actor, sound });
                }
                CombatCue::CancelAttack => {
                    self.cancel.write(AttackCancelRequested { entity: actor });
                }
                CombatCue::RestrictMovement => {
                    self.restricted.write(MovementRestricted { entity: actor });
                }
                CombatCue::DisableMovement => {
                    self.disabled.write(MovementDisabled { entity: actor });
                }
                CombatCue::Hitbox(profile) => {
                    self.hitbox.write(HitboxChanged { entity: actor, profile });
                }
                CombatCue::Knockback(velocity) => {
                    self.knockback.write(KnockbackApplied { entity: actor, velocity });
                }
                CombatCue::RewardOpponent(amount) => match opponent {
                    Some(target) => {
                        self.meter.write(AdjustMeter {
                            target,
                            change: MeterChange::Sp(amount),
                        });
                    }
                    None => crate::logger::log(&format!(
                        "⚠️ {:?} has no opponent, reward of {} SP dropped",
                        actor, amount
                    )),
                },
                CombatCue::Defeat => {
                    self.defeated.write(SessionDefeated { loser: actor });
                }
                CombatCue::TierReached(tier) => {
                    crate::logger::log(&format!("⭐ {:?} reached super tier {}", actor, tier));
                    self.tiers.write(SuperTierChanged { entity: actor, tier });
                    self.sounds.write(SoundRequested {
                        source: actor,
                        sound: SoundCue::SuperTier(tier),
                    });
                }
                CombatCue::Resolved(outcome) => {
                    self.resolved.write(ContactResolved {
                        defender: actor,
                        outcome,
                    });
                }
            }
        }
    }
}

/// System: enemy contacts → reaction windows / super hits
pub fn intake_contacts(
    mut contacts: EventReader<ContactBegan>,
    config: Res<CombatConfig>,
    session: Res<Session>,
    mut rng: ResMut<DeterministicRng>,
    mut defenders: Query<DefenderQuery, With<Defender>>,
    mut writers: CueWriters,
) {
    let mut cues = Vec::new();
    let mut shared = Shared {
        tuning: &config.defense,
        session: &session,
        rng: &mut rng.rng,
        cues: &mut cues,
    };

    for contact in contacts.read() {
        let Ok(mut item) = defenders.get_mut(contact.defender) else {
            crate::logger::log_warning(&format!(
                "ContactBegan: {:?} is not a defender",
                contact.defender
            ));
            continue;
        };

        with_context(&mut item, &mut shared, |defense, ctx| {
            defense.begin_contact(contact.kind, contact.source_x, ctx)
        });
        writers.flush(item.entity, item.opponent.map(|o| o.0), &mut *shared.cues);
    }
}

/// System: per-tick guard evaluation (parry tap / block hold)
pub fn evaluate_guard(
    config: Res<CombatConfig>,
    session: Res<Session>,
    mut rng: ResMut<DeterministicRng>,
    mut defenders: Query<DefenderQuery, With<Defender>>,
    mut writers: CueWriters,
) {
    let mut cues = Vec::new();
    let mut shared = Shared {
        tuning: &config.defense,
        session: &session,
        rng: &mut rng.rng,
        cues: &mut cues,
    };

    for mut item in defenders.iter_mut() {
        let tapped = item.guard.consume_press();
        let held = item.guard.held;

        with_context(&mut item, &mut shared, |defense, ctx| {
            defense.evaluate_guard(tapped, held, ctx)
        });
        writers.flush(item.entity, item.opponent.map(|o| o.0), &mut *shared.cues);
    }
}

/// System: tick defense timers and run elapsed callbacks
pub fn advance_defense_timers(
    time: Res<Time>,
    config: Res<CombatConfig>,
    session: Res<Session>,
    mut rng: ResMut<DeterministicRng>,
    mut defenders: Query<DefenderQuery, With<Defender>>,
    mut writers: CueWriters,
) {
    let delta = time.delta();
    let mut cues = Vec::new();
    let mut shared = Shared {
        tuning: &config.defense,
        session: &session,
        rng: &mut rng.rng,
        cues: &mut cues,
    };

    for mut item in defenders.iter_mut() {
        with_context(&mut item, &mut shared, |defense, ctx| defense.advance(delta, ctx));
        writers.flush(item.entity, item.opponent.map(|o| o.0), &mut *shared.cues);
    }
}
