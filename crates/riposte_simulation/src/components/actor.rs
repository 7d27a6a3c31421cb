//! Actor markers and wiring: Defender, Player, Opponent

use bevy::prelude::*;

/// Actor that runs the defense state machine (parry/block/hit).
///
/// Pulls in the collaborator components the state machine reads and writes.
/// `Defense` and `ResourceMeter` are inserted by [`crate::combat::defender_bundle`]
/// because they are sized from `CombatConfig`.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(
    Transform,
    crate::components::GuardInput,
    crate::components::Mobility,
    crate::components::Offense,
    crate::components::AnimationFlags,
    crate::components::Appearance
)]
pub struct Defender;

/// Marker for the player-controlled actor.
///
/// Practice sessions grant meter only to actors with this marker.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Player;

/// Whose meter gets rewarded when this actor blocks or gets hit.
///
/// Set once at spawn; the defense state machine never looks opponents up.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Opponent(pub Entity);
