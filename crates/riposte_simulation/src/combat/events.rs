//! Combat events
//!
//! Incoming: `ContactBegan` (physics layer), `AdjustMeter` (anyone),
//! `SparkExpired` (presentation).
//! Outgoing: everything else, fire-and-forget for audio, movement, offense,
//! hitbox, session and HUD.

use bevy::prelude::*;

use crate::components::HitboxProfile;

/// Which enemy volume touched the defender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum ContactKind {
    /// Melee body volume, first frame of contact
    MeleeCollisionEnter,
    /// Melee body volume, every frame the contact persists
    MeleeCollisionStay,
    /// Melee trigger volume (entry only)
    MeleeTrigger,
    /// Ranged projectile trigger (entry only)
    ProjectileTrigger,
    /// Super attack: bypasses the reaction window
    Super,
}

/// How a contact ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum ContactOutcome {
    Parried,
    Blocked,
    Hit,
    SuperHit,
    /// Window elapsed while invincible
    Ignored,
}

/// One-shot sounds requested by the combat core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum SoundCue {
    Parry,
    Block,
    Damaged,
    /// One of `HIT_VOICES` vocalizations, picked at random
    HitVoice(u8),
    SuperImpact,
    Knockout,
    KnockoutVoice,
    /// Super tier reached (1-based tier)
    SuperTier(u8),
}

impl SoundCue {
    pub const HIT_VOICES: u8 = 3;
}

// ============================================================================
// Incoming
// ============================================================================

/// Enemy hit volume touched `defender`.
///
/// Melee collision volumes send this on entry and on every tick the contact
/// stays; trigger volumes only on entry.
#[derive(Event, Debug, Clone, Copy)]
pub struct ContactBegan {
    pub defender: Entity,
    /// World x of the enemy volume (knockback direction)
    pub source_x: f32,
    pub kind: ContactKind,
}

/// Meter change requested from outside the defense (opponent rewards,
/// healing, spending a super).
#[derive(Event, Debug, Clone, Copy)]
pub struct AdjustMeter {
    pub target: Entity,
    pub change: MeterChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeterChange {
    Hp(i32),
    Sp(i32),
    /// Spend SP on a super (fails silently if short)
    Spend(i32),
}

/// Presentation finished playing a pooled hit spark.
#[derive(Event, Debug, Clone, Copy)]
pub struct SparkExpired {
    pub owner: Entity,
    pub slot: usize,
}

// ============================================================================
// Outgoing
// ============================================================================

#[derive(Event, Debug, Clone, Copy)]
pub struct ContactResolved {
    pub defender: Entity,
    pub outcome: ContactOutcome,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct SoundRequested {
    pub source: Entity,
    pub sound: SoundCue,
}

/// Velocity impulse for the physics layer.
#[derive(Event, Debug, Clone, Copy)]
pub struct KnockbackApplied {
    pub entity: Entity,
    pub velocity: Vec2,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct AttackCancelRequested {
    pub entity: Entity,
}

/// Brief hit-stun lock.
#[derive(Event, Debug, Clone, Copy)]
pub struct MovementRestricted {
    pub entity: Entity,
}

/// Locked until the session ends.
#[derive(Event, Debug, Clone, Copy)]
pub struct MovementDisabled {
    pub entity: Entity,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct HitboxChanged {
    pub entity: Entity,
    pub profile: HitboxProfile,
}

/// Actor knocked out; the scene layer ends the session.
#[derive(Event, Debug, Clone, Copy)]
pub struct SessionDefeated {
    pub loser: Entity,
}

/// Meter crossed into a higher super tier (HUD sprite + sound).
#[derive(Event, Debug, Clone, Copy)]
pub struct SuperTierChanged {
    pub entity: Entity,
    pub tier: u8,
}
