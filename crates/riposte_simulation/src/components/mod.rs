//! ECS components shared with the systems around the combat core
//!
//! Organised by who owns the data:
//! - actor: markers and wiring (Defender, Player, Opponent)
//! - collaborators: read-only input from input/movement/offense (GuardInput, Mobility, Offense)
//! - presentation: written for the animation/render layer (AnimationFlags, Appearance)
//! - session: scene-level Session resource

pub mod actor;
pub mod collaborators;
pub mod presentation;
pub mod session;

pub use actor::*;
pub use collaborators::*;
pub use presentation::*;
pub use session::*;
