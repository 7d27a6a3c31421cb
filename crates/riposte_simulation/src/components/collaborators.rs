//! State owned by systems outside the combat core (input, movement, offense).
//!
//! The core only reads these; requests flowing the other way
//! (restrict movement, cancel attack) go out as events.

use bevy::prelude::*;

/// Guard button state, written by the input layer before `FixedUpdate`.
///
/// Tap = parry attempt, hold = block. `just_pressed` is consumed by the guard
/// evaluation each tick so a single press is one parry attempt.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct GuardInput {
    pub just_pressed: bool,
    pub held: bool,
}

impl GuardInput {
    pub fn press(&mut self) {
        if !self.held {
            self.just_pressed = true;
        }
        self.held = true;
    }

    pub fn release(&mut self) {
        self.held = false;
        self.just_pressed = false;
    }

    /// Clear the edge flag after the tick that saw it.
    pub fn consume_press(&mut self) -> bool {
        std::mem::take(&mut self.just_pressed)
    }
}

/// Movement controller state as seen by the defense.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Mobility {
    /// Actor is in a walk cycle (can't guard mid-step)
    pub walking: bool,
    /// Movement controller allows action (false during restrictions, cutscenes, KO)
    pub can_move: bool,
}

impl Default for Mobility {
    fn default() -> Self {
        Self {
            walking: false,
            can_move: true,
        }
    }
}

impl Mobility {
    pub fn is_eligible_to_act(&self) -> bool {
        !self.walking && self.can_move
    }
}

/// Melee/ranged offense state as seen by the defense.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Offense {
    /// No attack is committed right now
    pub can_attack: bool,
}

impl Default for Offense {
    fn default() -> Self {
        Self { can_attack: true }
    }
}

impl Offense {
    pub fn is_eligible_to_act(&self) -> bool {
        self.can_attack
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_press_is_edge_triggered() {
        let mut input = GuardInput::default();
        input.press();
        assert!(input.just_pressed && input.held);

        assert!(input.consume_press());
        assert!(!input.consume_press());

        // Still holding: pressing again is not a new tap
        input.press();
        assert!(!input.just_pressed);

        input.release();
        input.press();
        assert!(input.just_pressed);
    }

    #[test]
    fn test_mobility_eligibility() {
        assert!(Mobility::default().is_eligible_to_act());
        assert!(!Mobility { walking: true, can_move: true }.is_eligible_to_act());
        assert!(!Mobility { walking: false, can_move: false }.is_eligible_to_act());
    }
}
