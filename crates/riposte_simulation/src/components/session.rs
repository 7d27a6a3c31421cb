//! Session/scene state the combat core consults.

use bevy::prelude::*;

/// Scene-level session flag.
///
/// While `active` is false every meter adjustment is a silent no-op
/// (intro, outro, after defeat). Owned by the scene layer; the core only reads it.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Resource)]
pub struct Session {
    pub active: bool,
    /// Tutorial-style session: the player starts with a few super bars
    pub practice: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            active: true,
            practice: false,
        }
    }
}

impl Session {
    pub fn active() -> Self {
        Self::default()
    }

    pub fn inactive() -> Self {
        Self {
            active: false,
            practice: false,
        }
    }

    pub fn practice() -> Self {
        Self {
            active: true,
            practice: true,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}
