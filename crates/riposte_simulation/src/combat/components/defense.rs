//! Defense state machine: parry, block, hit resolution for one actor.
//!
//! # Contact lifecycle
//!
//! ```text
//! Idle ──contact──▶ ReactionWindow ──tap guard──▶ Parried ─┐
//!                        │                                  ├─▶ Recovering ──▶ Idle
//!                        └──window elapses──▶ Blocked/Hit ─┘   (invincible)
//! ```
//!
//! Super contacts skip the window and resolve immediately.
//!
//! # Stance
//!
//! `Stance` is evaluated every tick independently of the lifecycle. It is a
//! single value, so "blocking" and "parrying" can never both be true: a tap
//! that parries wins its tick, and holding the guard afterwards turns the
//! stance into `Blocking` even while the parry cooldown is still running.
//!
//! # Timers
//!
//! Every time-based flag is a named lane in the actor's scheduler:
//! the window is open while its lane runs, parry is ready while the cooldown
//! lane is idle, the actor is vulnerable while the invincibility lane is idle.
//! Restarting a lane replaces the previous timer, never stacks.
//!
//! All collaborators are passed in through [`DefenseContext`]; requests for
//! other systems (sounds, knockback, movement locks) are pushed as
//! [`CombatCue`]s and turned into events by the calling system.

use std::time::Duration;

use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::combat::components::effects::EffectPool;
use crate::combat::components::meter::{HealthSignal, KnockoutState, ResourceMeter, TierReached};
use crate::combat::events::{ContactKind, ContactOutcome, SoundCue};
use crate::components::{AnimationFlags, Appearance, CollisionLayer, HitboxProfile, Session, Tint};
use crate::config::{DefenseTuning, WindowPolicy};
use crate::scheduler::Scheduler;

/// Timer lane names.
pub mod lanes {
    pub const REACTION_WINDOW: &str = "reaction_window";
    pub const PARRY_COOLDOWN: &str = "parry_cooldown";
    pub const INVINCIBILITY: &str = "invincibility";
    pub const IFRAMES: &str = "iframes";
    /// One-shot tinted flash (parry / hit)
    pub const FLASH: &str = "flash";
    /// Slow red/white loop while HP is low
    pub const LOW_HEALTH_FLASH: &str = "low_health_flash";
    /// Fast red/white loop during i-frames
    pub const FAST_FLASH: &str = "fast_flash";
}

/// Payloads of the defense timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefenseTimer {
    ReactionWindowElapsed,
    ParryCooldownElapsed,
    InvincibilityElapsed,
    IFramesElapsed,
    FlashHalfway,
    FlashEnded,
    LowHealthBlink,
    FastBlink,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub enum Stance {
    #[default]
    Neutral,
    /// Guard held: next resolved contact is a reduced-damage block
    Blocking,
    /// Parried; lasts until the parry cooldown ends or the guard is held
    Parrying,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub enum KnockbackDir {
    Left,
    #[default]
    Right,
}

impl KnockbackDir {
    /// Pushed away from the source: left if it is to our right, else right.
    pub fn away_from(own_x: f32, source_x: f32) -> Self {
        if own_x < source_x {
            KnockbackDir::Left
        } else {
            KnockbackDir::Right
        }
    }

    pub fn sign(&self) -> f32 {
        match self {
            KnockbackDir::Left => -1.0,
            KnockbackDir::Right => 1.0,
        }
    }
}

/// Requests for systems outside the defense (drained into events by the caller).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CombatCue {
    Sound(SoundCue),
    /// Offense collaborator: drop the attack in progress
    CancelAttack,
    /// Movement collaborator: short hit-stun lock
    RestrictMovement,
    /// Movement collaborator: locked for the rest of the session (KO)
    DisableMovement,
    Hitbox(HitboxProfile),
    /// Velocity impulse
    Knockback(Vec2),
    /// SP for whoever hit us
    RewardOpponent(i32),
    /// Session collaborator: the actor was knocked out
    Defeat,
    /// Own meter reached a higher super tier
    TierReached(u8),
    Resolved(ContactOutcome),
}

/// Everything the state machine touches besides its own state.
pub struct DefenseContext<'a> {
    pub actor: Entity,
    pub tuning: &'a DefenseTuning,
    pub session: &'a Session,
    pub meter: &'a mut ResourceMeter,
    pub animation: &'a mut AnimationFlags,
    pub appearance: &'a mut Appearance,
    pub sparks: &'a mut EffectPool,
    pub rng: &'a mut ChaCha8Rng,
    pub position: Vec2,
    /// Movement and offense both allow acting this tick
    pub eligible: bool,
    pub cues: &'a mut Vec<CombatCue>,
}

#[derive(Component, Debug, Default)]
pub struct Defense {
    stance: Stance,
    knockback: KnockbackDir,
    /// Current phase of the slow flash (true = red)
    low_health_lit: bool,
    /// Current phase of the fast flash (true = red)
    fast_flash_lit: bool,
    timers: Scheduler<DefenseTimer>,
}

impl Defense {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stance(&self) -> Stance {
        self.stance
    }

    pub fn is_blocking(&self) -> bool {
        self.stance == Stance::Blocking
    }

    pub fn is_parrying(&self) -> bool {
        self.stance == Stance::Parrying
    }

    pub fn is_window_open(&self) -> bool {
        self.timers.is_running(lanes::REACTION_WINDOW)
    }

    pub fn parry_ready(&self) -> bool {
        !self.timers.is_running(lanes::PARRY_COOLDOWN)
    }

    pub fn is_vulnerable(&self) -> bool {
        !self.timers.is_running(lanes::INVINCIBILITY)
    }

    pub fn in_iframes(&self) -> bool {
        self.timers.is_running(lanes::IFRAMES)
    }

    pub fn knockback_direction(&self) -> KnockbackDir {
        self.knockback
    }

    pub fn is_low_health_flashing(&self) -> bool {
        self.timers.is_running(lanes::LOW_HEALTH_FLASH)
    }

    pub fn is_fast_flashing(&self) -> bool {
        self.timers.is_running(lanes::FAST_FLASH)
    }

    pub fn is_flashing(&self) -> bool {
        self.timers.is_running(lanes::FLASH)
    }

    pub fn timers(&self) -> &Scheduler<DefenseTimer> {
        &self.timers
    }

    // ------------------------------------------------------------------
    // Per-tick guard evaluation
    // ------------------------------------------------------------------

    /// Read the guard button for this tick: parry, block, or neither.
    pub fn evaluate_guard(&mut self, tapped: bool, held: bool, ctx: &mut DefenseContext) {
        let knocked_out = ctx.animation.knocked_out;

        if tapped && self.is_window_open() && self.parry_ready() && !knocked_out && ctx.eligible {
            self.parry(ctx);
        } else if held && !knocked_out && ctx.eligible {
            self.stance = Stance::Blocking;
        } else if self.stance == Stance::Blocking {
            self.stance = Stance::Neutral;
        }

        ctx.animation.blocking = self.is_blocking();
    }

    fn parry(&mut self, ctx: &mut DefenseContext) {
        let tuning = ctx.tuning;

        self.timers.stop(lanes::REACTION_WINDOW);
        self.start_flash(Tint::Cyan, ctx);
        self.timers.start(
            lanes::INVINCIBILITY,
            tuning.parry_invincibility(),
            DefenseTimer::InvincibilityElapsed,
        );
        ctx.appearance.counter_spark = true;

        if let Some(TierReached(tier)) = ctx.meter.adjust_sp(tuning.parry_sp_reward, ctx.session) {
            ctx.cues.push(CombatCue::TierReached(tier));
        }
        ctx.cues.push(CombatCue::Sound(SoundCue::Parry));

        // Anti-mash: no second parry until this runs out (blocking still works)
        self.timers.start(
            lanes::PARRY_COOLDOWN,
            tuning.parry_cooldown(),
            DefenseTimer::ParryCooldownElapsed,
        );
        self.stance = Stance::Parrying;
        ctx.cues.push(CombatCue::Resolved(ContactOutcome::Parried));

        crate::logger::log(&format!(
            "🛡️ PARRY (actor: {:?}, SP: {})",
            ctx.actor,
            ctx.meter.sp()
        ));
    }

    // ------------------------------------------------------------------
    // Contacts
    // ------------------------------------------------------------------

    /// An enemy volume touched us at horizontal position `source_x`.
    pub fn begin_contact(&mut self, kind: ContactKind, source_x: f32, ctx: &mut DefenseContext) {
        self.knockback = KnockbackDir::away_from(ctx.position.x, source_x);

        if kind == ContactKind::Super {
            self.take_super_hit(ctx);
            return;
        }

        if self.is_window_open() && ctx.tuning.window_policy == WindowPolicy::KeepFirst {
            return;
        }

        // Drop the attack in progress so a parry is possible this window
        ctx.cues.push(CombatCue::CancelAttack);
        self.timers.start(
            lanes::REACTION_WINDOW,
            ctx.tuning.reaction_window(),
            DefenseTimer::ReactionWindowElapsed,
        );

        crate::logger::log(&format!(
            "⚔️ Reaction window opened (actor: {:?}, contact: {:?}, knockback: {:?})",
            ctx.actor, kind, self.knockback
        ));
    }

    fn resolve_window(&mut self, ctx: &mut DefenseContext) {
        ctx.cues.push(CombatCue::CancelAttack);

        let outcome = if self.is_blocking() && self.is_vulnerable() {
            self.take_blocked_hit(ctx);
            ContactOutcome::Blocked
        } else if self.is_vulnerable() {
            self.take_hit(ctx);
            ContactOutcome::Hit
        } else {
            ContactOutcome::Ignored
        };
        ctx.cues.push(CombatCue::Resolved(outcome));

        crate::logger::log(&format!(
            "💥 Reaction window closed (actor: {:?}, outcome: {:?}, HP: {})",
            ctx.actor,
            outcome,
            ctx.meter.hp()
        ));
    }

    fn take_blocked_hit(&mut self, ctx: &mut DefenseContext) {
        let tuning = ctx.tuning;

        self.start_flash(Tint::Red, ctx);
        ctx.cues.push(CombatCue::RewardOpponent(tuning.block_opponent_reward));
        self.apply_hp(-tuning.block_damage, ctx);
        self.start_damage_invincibility(ctx);
        ctx.cues.push(CombatCue::Knockback(Vec2::new(
            self.knockback.sign() * tuning.knockback_horizontal,
            0.0,
        )));
        ctx.cues.push(CombatCue::Sound(SoundCue::Block));
    }

    fn take_hit(&mut self, ctx: &mut DefenseContext) {
        let tuning = ctx.tuning;

        self.start_flash(Tint::Red, ctx);
        ctx.sparks.acquire(ctx.position);
        if !ctx.animation.knocked_out {
            ctx.animation.hit_reaction = true;
        }
        ctx.cues.push(CombatCue::RewardOpponent(tuning.hit_opponent_reward));
        self.apply_hp(-tuning.hit_damage, ctx);
        self.start_damage_invincibility(ctx);

        ctx.cues.push(CombatCue::Sound(SoundCue::Damaged));
        let voice = ctx.rng.gen_range(0..SoundCue::HIT_VOICES);
        ctx.cues.push(CombatCue::Sound(SoundCue::HitVoice(voice)));
        ctx.cues.push(CombatCue::Knockback(self.launch_velocity(tuning)));
        ctx.cues.push(CombatCue::RestrictMovement);
    }

    /// Unblockable, unparryable; no meter for the attacker.
    fn take_super_hit(&mut self, ctx: &mut DefenseContext) {
        if !self.is_vulnerable() {
            ctx.cues.push(CombatCue::Resolved(ContactOutcome::Ignored));
            return;
        }
        let tuning = ctx.tuning;

        self.start_flash(Tint::Red, ctx);
        ctx.sparks.acquire(ctx.position);
        if !ctx.animation.knocked_out {
            ctx.animation.hit_reaction = true;
        }
        self.apply_hp(-tuning.super_damage, ctx);
        self.start_damage_invincibility(ctx);

        ctx.cues.push(CombatCue::Sound(SoundCue::Damaged));
        ctx.cues.push(CombatCue::Sound(SoundCue::SuperImpact));
        ctx.cues.push(CombatCue::Knockback(self.launch_velocity(tuning)));
        ctx.cues.push(CombatCue::RestrictMovement);
        ctx.cues.push(CombatCue::Resolved(ContactOutcome::SuperHit));

        crate::logger::log(&format!(
            "💥 SUPER hit (actor: {:?}, HP: {})",
            ctx.actor,
            ctx.meter.hp()
        ));
    }

    fn launch_velocity(&self, tuning: &DefenseTuning) -> Vec2 {
        Vec2::new(
            self.knockback.sign() * tuning.knockback_horizontal,
            tuning.knockback_vertical,
        )
    }

    // ------------------------------------------------------------------
    // Damage, invincibility, knockout
    // ------------------------------------------------------------------

    fn apply_hp(&mut self, delta: i32, ctx: &mut DefenseContext) {
        let signal = ctx.meter.adjust_hp(delta, ctx.session);
        self.on_health_signal(signal, ctx.tuning, ctx.appearance);
    }

    /// React to an HP change (from our own resolution or from outside).
    pub fn on_health_signal(
        &mut self,
        signal: HealthSignal,
        tuning: &DefenseTuning,
        appearance: &mut Appearance,
    ) {
        match signal {
            HealthSignal::LowHealth => self.start_low_health_flash(tuning, appearance),
            HealthSignal::Cleared => self.stop_low_health_flash(appearance),
        }
    }

    fn start_damage_invincibility(&mut self, ctx: &mut DefenseContext) {
        let duration = ctx.tuning.damage_invincibility();
        self.timers.start(
            lanes::INVINCIBILITY,
            duration,
            DefenseTimer::InvincibilityElapsed,
        );

        if ctx.meter.check_knockout(ctx.session) == KnockoutState::JustDowned {
            self.knock_out(ctx);
        }

        ctx.appearance.layer = CollisionLayer::Invincible;
        self.start_fast_flash(ctx.tuning, ctx.appearance);
        self.timers
            .start(lanes::IFRAMES, duration, DefenseTimer::IFramesElapsed);
    }

    fn knock_out(&mut self, ctx: &mut DefenseContext) {
        ctx.cues.push(CombatCue::Defeat);
        self.stop_low_health_flash(ctx.appearance);

        ctx.animation.knocked_out = true;
        ctx.cues.push(CombatCue::DisableMovement);
        ctx.cues.push(CombatCue::Hitbox(HitboxProfile::Knockout));
        ctx.cues.push(CombatCue::Sound(SoundCue::Knockout));
        ctx.cues.push(CombatCue::Sound(SoundCue::KnockoutVoice));

        crate::logger::log_info(&format!("☠️ KNOCKOUT (actor: {:?})", ctx.actor));
    }

    // ------------------------------------------------------------------
    // Flashes
    // ------------------------------------------------------------------

    /// One-shot tint; collider off for the first half.
    fn start_flash(&mut self, tint: Tint, ctx: &mut DefenseContext) {
        ctx.appearance.tint = tint;
        ctx.appearance.collider_enabled = false;
        self.timers.start(
            lanes::FLASH,
            ctx.tuning.half_flash_time(),
            DefenseTimer::FlashHalfway,
        );
    }

    pub fn start_low_health_flash(&mut self, tuning: &DefenseTuning, appearance: &mut Appearance) {
        self.low_health_lit = true;
        appearance.tint = Tint::Red;
        self.timers.start_repeating(
            lanes::LOW_HEALTH_FLASH,
            tuning.flash_time(),
            DefenseTimer::LowHealthBlink,
        );
    }

    pub fn stop_low_health_flash(&mut self, appearance: &mut Appearance) {
        if self.timers.stop(lanes::LOW_HEALTH_FLASH) {
            self.low_health_lit = false;
            appearance.tint = Tint::Neutral;
        }
    }

    /// Always red, despite being the "alternate" indicator.
    fn start_fast_flash(&mut self, tuning: &DefenseTuning, appearance: &mut Appearance) {
        self.fast_flash_lit = true;
        appearance.tint = Tint::Red;
        self.timers.start_repeating(
            lanes::FAST_FLASH,
            tuning.fast_flash_time(),
            DefenseTimer::FastBlink,
        );
    }

    fn stop_fast_flash(&mut self, appearance: &mut Appearance) {
        self.timers.stop(lanes::FAST_FLASH);
        self.fast_flash_lit = false;
        appearance.tint = Tint::Neutral;
    }

    // ------------------------------------------------------------------
    // Timer dispatch
    // ------------------------------------------------------------------

    /// Tick all defense timers and run whatever elapsed, in scheduling order.
    pub fn advance(&mut self, delta: Duration, ctx: &mut DefenseContext) {
        self.timers.advance(delta);
        while let Some(timer) = self.timers.pop_due() {
            self.on_timer(timer, ctx);
        }
    }

    fn on_timer(&mut self, timer: DefenseTimer, ctx: &mut DefenseContext) {
        match timer {
            DefenseTimer::ReactionWindowElapsed => self.resolve_window(ctx),
            DefenseTimer::ParryCooldownElapsed => {
                if self.stance == Stance::Parrying {
                    self.stance = Stance::Neutral;
                }
            }
            DefenseTimer::InvincibilityElapsed => {
                crate::logger::log(&format!("⏱️ Vulnerable again (actor: {:?})", ctx.actor));
            }
            DefenseTimer::IFramesElapsed => {
                self.stop_fast_flash(ctx.appearance);
                ctx.appearance.layer = CollisionLayer::Actor;
            }
            DefenseTimer::FlashHalfway => {
                ctx.appearance.collider_enabled = true;
                self.timers.start(
                    lanes::FLASH,
                    ctx.tuning.half_flash_time(),
                    DefenseTimer::FlashEnded,
                );
            }
            DefenseTimer::FlashEnded => {
                ctx.appearance.tint = Tint::Neutral;
                ctx.animation.hit_reaction = false;
            }
            DefenseTimer::LowHealthBlink => {
                self.low_health_lit = !self.low_health_lit;
                ctx.appearance.tint = if self.low_health_lit { Tint::Red } else { Tint::Neutral };
            }
            DefenseTimer::FastBlink => {
                self.fast_flash_lit = !self.fast_flash_lit;
                ctx.appearance.tint = if self.fast_flash_lit { Tint::Red } else { Tint::Neutral };
            }
        }
    }
}
