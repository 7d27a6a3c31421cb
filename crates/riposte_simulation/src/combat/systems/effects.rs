//! Effect pool systems.

use bevy::prelude::*;

use crate::combat::components::EffectPool;
use crate::combat::events::SparkExpired;

/// System: hand finished sparks back to their pool
pub fn release_expired_sparks(
    mut expired: EventReader<SparkExpired>,
    mut pools: Query<&mut EffectPool>,
) {
    for event in expired.read() {
        if let Ok(mut pool) = pools.get_mut(event.owner) {
            pool.release(event.slot);
        }
    }
}
