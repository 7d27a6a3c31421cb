//! Combat components

pub mod defense;
pub mod effects;
pub mod meter;


// Re-export all components
pub use defense::*;
pub use effects::*;
pub use meter::*;
