//! HP/SP resource meter.
//!
//! Bounded integers with a few derived readings:
//! - super tier = `sp / tier_size` (0..=5 with default tuning)
//! - knockout = `hp <= 0`
//! - displayed SP / tier sprite, which lag behind the real values while the
//!   gauge drains after spending meter
//!
//! Every mutation goes through `adjust_hp` / `adjust_sp` / `spend_sp`, all of
//! which are silent no-ops while the session is inactive.

use std::time::Duration;

use bevy::prelude::*;

use crate::components::Session;
use crate::config::MeterTuning;
use crate::scheduler::Scheduler;

/// Timer lane for the displayed-SP drain animation.
pub const DRAIN_LANE: &str = "meter_drain";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MeterTimer {
    DrainStep,
}

/// What the defense should do with its low-health warning after an HP change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthSignal {
    /// `0 < hp <= low_hp_threshold`: (re)start the slow red flash
    LowHealth,
    /// Healthy, knocked out, or session inactive: stop it
    Cleared,
}

/// Result of asking the meter whether the actor is knocked out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnockoutState {
    Standing,
    /// Already reported earlier in this descent
    Downed,
    /// First report since HP dropped to zero: notify defeat exactly now
    JustDowned,
}

impl KnockoutState {
    pub fn is_down(&self) -> bool {
        !matches!(self, KnockoutState::Standing)
    }
}

/// Super tier went up: show the new sprite and play its sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierReached(pub u8);

#[derive(Component, Debug)]
pub struct ResourceMeter {
    hp: i32,
    sp: i32,
    limits: MeterTuning,
    /// Tier sprite currently shown (idempotency of tier feedback)
    displayed_tier: u8,
    /// SP the gauge shows; trails `sp` downward while draining
    displayed_sp: i32,
    knockout_reported: bool,
    timers: Scheduler<MeterTimer>,
}

impl ResourceMeter {
    /// Full HP, empty SP.
    pub fn new(limits: &MeterTuning) -> Self {
        Self {
            hp: limits.max_hp,
            sp: 0,
            limits: limits.clone(),
            displayed_tier: 0,
            displayed_sp: 0,
            knockout_reported: false,
            timers: Scheduler::new(),
        }
    }

    /// Meter starting at the given values (clamped to the limits).
    pub fn starting_at(limits: &MeterTuning, hp: i32, sp: i32) -> Self {
        let mut meter = Self::new(limits);
        meter.hp = hp.min(limits.max_hp);
        meter.sp = sp.clamp(0, limits.max_sp);
        meter.displayed_sp = meter.sp;
        meter.displayed_tier = meter.super_tier();
        meter
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn sp(&self) -> i32 {
        self.sp
    }

    pub fn limits(&self) -> &MeterTuning {
        &self.limits
    }

    pub fn super_tier(&self) -> u8 {
        (self.sp / self.limits.tier_size).min(self.limits.max_tier() as i32) as u8
    }

    /// Tier sprite shown by the HUD.
    pub fn displayed_tier(&self) -> u8 {
        self.displayed_tier
    }

    pub fn displayed_sp(&self) -> i32 {
        self.displayed_sp
    }

    /// Partial bar under the tier sprite (`displayed_sp mod tier_size`).
    pub fn gauge_fill(&self) -> i32 {
        self.displayed_sp % self.limits.tier_size
    }

    pub fn is_knocked_out(&self) -> bool {
        self.hp <= 0
    }

    pub fn is_draining(&self) -> bool {
        self.timers.is_running(DRAIN_LANE)
    }

    /// Add `delta` HP (negative = damage).
    ///
    /// Capped at `max_hp`; there is no floor, knockout is read as `hp <= 0`.
    pub fn adjust_hp(&mut self, delta: i32, session: &Session) -> HealthSignal {
        if self.hp <= self.limits.max_hp && session.is_active() {
            self.hp = self.hp.saturating_add(delta);
        }
        if self.hp > self.limits.max_hp {
            self.hp = self.limits.max_hp;
        }
        if self.hp > 0 {
            // Back on our feet: the next descent reports again
            self.knockout_reported = false;
        }

        if session.is_active() && self.hp > 0 && self.hp <= self.limits.low_hp_threshold {
            HealthSignal::LowHealth
        } else {
            HealthSignal::Cleared
        }
    }

    /// Add `delta` SP, clamped to `[0, max_sp]`.
    ///
    /// Cancels an in-flight drain (the gauge snaps to the new value). Returns
    /// `Some` only when the tier went up on a gain; losing a tier swaps the
    /// sprite silently.
    pub fn adjust_sp(&mut self, delta: i32, session: &Session) -> Option<TierReached> {
        if !session.is_active() {
            return None;
        }

        if self.sp <= self.limits.max_sp {
            self.sp = self.sp.saturating_add(delta);
            self.timers.stop(DRAIN_LANE);
        }
        self.sp = self.sp.clamp(0, self.limits.max_sp);
        self.displayed_sp = self.sp;

        self.refresh_tier(delta)
    }

    /// Spend `cost` SP on a super. Fails without side effects if short.
    ///
    /// The tier sprite drops immediately; the gauge drains towards the new
    /// value over the next few drain intervals.
    pub fn spend_sp(&mut self, cost: i32, session: &Session) -> bool {
        if !session.is_active() || cost < 0 || self.sp < cost {
            return false;
        }

        self.sp -= cost;
        self.refresh_tier(-cost);
        if self.displayed_sp > self.sp {
            self.timers.start_repeating(
                DRAIN_LANE,
                self.limits.drain_interval(),
                MeterTimer::DrainStep,
            );
        }
        true
    }

    /// Knockout check with edge-triggered reporting.
    ///
    /// Reads as down only while the session is active. `JustDowned` is
    /// returned once per descent to zero HP; later calls return `Downed`.
    pub fn check_knockout(&mut self, session: &Session) -> KnockoutState {
        if self.hp > 0 || !session.is_active() {
            return KnockoutState::Standing;
        }
        if self.knockout_reported {
            return KnockoutState::Downed;
        }
        self.knockout_reported = true;
        KnockoutState::JustDowned
    }

    /// Tick the drain animation.
    pub fn advance(&mut self, delta: Duration) {
        self.timers.advance(delta);
        while let Some(timer) = self.timers.pop_due() {
            match timer {
                MeterTimer::DrainStep => {
                    self.displayed_sp = (self.displayed_sp - self.limits.drain_step).max(self.sp);
                    if self.displayed_sp <= self.sp {
                        self.timers.stop(DRAIN_LANE);
                    }
                }
            }
        }
    }

    fn refresh_tier(&mut self, delta: i32) -> Option<TierReached> {
        let tier = self.super_tier();
        if tier == self.displayed_tier {
            return None;
        }

        let raised = tier > self.displayed_tier && delta > 0;
        self.displayed_tier = tier;
        raised.then_some(TierReached(tier))
    }
}

impl Default for ResourceMeter {
    fn default() -> Self {
        Self::new(&MeterTuning::default())
    }
}
