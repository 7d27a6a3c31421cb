//! Hit-spark pool.
//!
//! Fixed number of slots allocated at spawn and never grown, so taking a hit
//! never allocates. `acquire` takes the first inactive slot in index order;
//! the presentation layer plays the spark and hands the slot back with
//! [`SparkExpired`](crate::combat::SparkExpired) when its animation ends.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct EffectSlot {
    pub active: bool,
    pub position: Vec2,
}

impl Default for EffectSlot {
    fn default() -> Self {
        Self {
            active: false,
            position: Vec2::ZERO,
        }
    }
}

#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct EffectPool {
    slots: Vec<EffectSlot>,
}

impl EffectPool {
    pub fn new(size: usize) -> Self {
        Self {
            slots: vec![EffectSlot::default(); size],
        }
    }

    /// Activate the first free slot at `position`.
    ///
    /// Returns the slot index, or `None` (and does nothing) when every slot
    /// is busy.
    pub fn acquire(&mut self, position: Vec2) -> Option<usize> {
        let (index, slot) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| !slot.active)?;

        slot.active = true;
        slot.position = position;
        Some(index)
    }

    /// Free a slot. Out-of-range or already free slots are ignored.
    pub fn release(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.active = false;
        }
    }

    pub fn slots(&self) -> &[EffectSlot] {
        &self.slots
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.active).count()
    }
}

impl Default for EffectPool {
    fn default() -> Self {
        Self::new(6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_in_index_order() {
        let mut pool = EffectPool::new(3);

        assert_eq!(pool.acquire(Vec2::new(1.0, 0.0)), Some(0));
        assert_eq!(pool.acquire(Vec2::new(2.0, 0.0)), Some(1));
        assert_eq!(pool.slots()[1].position, Vec2::new(2.0, 0.0));
        assert_eq!(pool.active_count(), 2);
    }

    #[test]
    fn test_exhausted_pool_is_silent_noop() {
        let mut pool = EffectPool::new(2);
        pool.acquire(Vec2::ZERO);
        pool.acquire(Vec2::ZERO);

        let before = pool.clone();
        assert_eq!(pool.acquire(Vec2::new(9.0, 9.0)), None);
        assert_eq!(pool, before);
        assert_eq!(pool.capacity(), 2);
    }

    #[test]
    fn test_released_slot_is_reused_first() {
        let mut pool = EffectPool::new(3);
        pool.acquire(Vec2::ZERO);
        pool.acquire(Vec2::ZERO);
        pool.acquire(Vec2::ZERO);

        pool.release(1);
        assert_eq!(pool.acquire(Vec2::new(5.0, 5.0)), Some(1));
        assert_eq!(pool.slots()[1].position, Vec2::new(5.0, 5.0));
    }

    #[test]
    fn test_release_out_of_range_ignored() {
        let mut pool = EffectPool::new(1);
        pool.release(7);
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn test_default_pool_size() {
        assert_eq!(EffectPool::default().capacity(), 6);
    }
}
