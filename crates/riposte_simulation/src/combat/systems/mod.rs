//! Combat systems

pub mod defense;
pub mod effects;
pub mod meter;


// Re-export all systems
pub use defense::*;
pub use effects::*;
pub use meter::*;
