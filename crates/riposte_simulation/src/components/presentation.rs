//! Presentation-facing state: animation flags, tint, collider, sparks.
//!
//! The combat core writes these; the render/animation layer reads them.

use bevy::prelude::*;

/// Animator parameters driven by the defense state machine.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct AnimationFlags {
    /// Bool: guard held
    pub blocking: bool,
    /// Bool: downed pose, suppresses every other reaction
    pub knocked_out: bool,
    /// Trigger: flinch; reset when the hit flash ends
    pub hit_reaction: bool,
}

/// Sprite tint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub enum Tint {
    #[default]
    Neutral,
    Red,
    Cyan,
}

/// Physics layer of the actor body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub enum CollisionLayer {
    #[default]
    Actor,
    /// Enemy volumes pass through while this is set
    Invincible,
}

/// Hit-detection shape configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub enum HitboxProfile {
    #[default]
    Standing,
    Knockout,
}

impl HitboxProfile {
    pub fn name(&self) -> &'static str {
        match self {
            HitboxProfile::Standing => "standing",
            HitboxProfile::Knockout => "knockout",
        }
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Appearance {
    pub tint: Tint,
    /// Body collider; the one-shot flash switches it off for its first half
    pub collider_enabled: bool,
    pub layer: CollisionLayer,
    /// Red counter spark shown on parry (not pooled); the presentation clears it
    pub counter_spark: bool,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            tint: Tint::Neutral,
            collider_enabled: true,
            layer: CollisionLayer::Actor,
            counter_spark: false,
        }
    }
}
