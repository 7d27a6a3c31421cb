//! Cooperative timer table (delayed + periodic callbacks with named lanes).
//!
//! Callbacks are plain payload values (`T`) dispatched by the owner, not
//! closures: the owner calls [`Scheduler::advance`] once per fixed tick and
//! then drains [`Scheduler::pop_due`], handling each payload with full
//! mutable access to its own state.
//!
//! # Ordering
//!
//! - `advance` only marks timers as due; nothing runs inside it.
//! - Due timers come out in the order they were scheduled.
//! - Anything scheduled while draining (including zero-delay timers) is not
//!   due before the next `advance`, so dispatch is never re-entrant.
//! - Cancelling a timer that is already due removes it from the queue.
//!
//! # Named lanes
//!
//! [`Scheduler::start`] keys a timer by lane name. Starting a lane that is
//! already running cancels the previous instance first (restart, never stack).

use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

use bevy::time::{Timer, TimerMode};

/// Opaque handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug)]
struct ScheduledTimer<T> {
    handle: TimerHandle,
    lane: Option<&'static str>,
    timer: Timer,
    payload: T,
}

#[derive(Debug)]
pub struct Scheduler<T> {
    next_id: u64,
    /// Live timers in scheduling order
    timers: Vec<ScheduledTimer<T>>,
    lanes: BTreeMap<&'static str, TimerHandle>,
    due: VecDeque<TimerHandle>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            timers: Vec::new(),
            lanes: BTreeMap::new(),
            due: VecDeque::new(),
        }
    }
}

impl<T: Clone> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `payload` once after `delay`.
    pub fn schedule(&mut self, delay: Duration, payload: T) -> TimerHandle {
        self.push(None, Timer::new(delay, TimerMode::Once), payload)
    }

    /// Run `payload` every `interval` until cancelled.
    pub fn schedule_repeating(&mut self, interval: Duration, payload: T) -> TimerHandle {
        self.push(None, Timer::new(interval, TimerMode::Repeating), payload)
    }

    /// One-shot timer in a named lane (cancels whatever the lane was running).
    pub fn start(&mut self, lane: &'static str, delay: Duration, payload: T) -> TimerHandle {
        self.stop(lane);
        self.push(Some(lane), Timer::new(delay, TimerMode::Once), payload)
    }

    /// Repeating timer in a named lane (cancels whatever the lane was running).
    pub fn start_repeating(
        &mut self,
        lane: &'static str,
        interval: Duration,
        payload: T,
    ) -> TimerHandle {
        self.stop(lane);
        self.push(Some(lane), Timer::new(interval, TimerMode::Repeating), payload)
    }

    /// Cancel a timer. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let Some(index) = self.timers.iter().position(|t| t.handle == handle) else {
            return false;
        };

        let removed = self.timers.remove(index);
        if let Some(lane) = removed.lane {
            if self.lanes.get(lane) == Some(&handle) {
                self.lanes.remove(lane);
            }
        }
        self.due.retain(|h| *h != handle);
        true
    }

    /// Cancel whatever runs in `lane`. Returns `false` if the lane was idle.
    pub fn stop(&mut self, lane: &'static str) -> bool {
        match self.lanes.get(lane).copied() {
            Some(handle) => self.cancel(handle),
            None => false,
        }
    }

    pub fn is_running(&self, lane: &'static str) -> bool {
        self.lanes.contains_key(lane)
    }

    pub fn is_scheduled(&self, handle: TimerHandle) -> bool {
        self.timers.iter().any(|t| t.handle == handle)
    }

    /// Number of live timers (one-shot timers leave the table when popped).
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Tick every live timer by `delta` and queue the ones that elapsed.
    ///
    /// A repeating timer is queued at most once per call even if `delta`
    /// spans several intervals.
    pub fn advance(&mut self, delta: Duration) {
        for scheduled in self.timers.iter_mut() {
            scheduled.timer.tick(delta);
            if scheduled.timer.just_finished() && !self.due.contains(&scheduled.handle) {
                self.due.push_back(scheduled.handle);
            }
        }
    }

    /// Next due payload, in scheduling order.
    ///
    /// One-shot timers are retired here (their lane becomes free *before*
    /// the owner handles the payload, so the handler may restart the lane).
    pub fn pop_due(&mut self) -> Option<T> {
        while let Some(handle) = self.due.pop_front() {
            let Some(index) = self.timers.iter().position(|t| t.handle == handle) else {
                continue;
            };

            if self.timers[index].timer.mode() == TimerMode::Repeating {
                return Some(self.timers[index].payload.clone());
            }

            let fired = self.timers.remove(index);
            if let Some(lane) = fired.lane {
                if self.lanes.get(lane) == Some(&handle) {
                    self.lanes.remove(lane);
                }
            }
            return Some(fired.payload);
        }
        None
    }

    fn push(&mut self, lane: Option<&'static str>, timer: Timer, payload: T) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;

        if let Some(lane) = lane {
            self.lanes.insert(lane, handle);
        }
        self.timers.push(ScheduledTimer {
            handle,
            lane,
            timer,
            payload,
        });
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(10);

    fn drain(scheduler: &mut Scheduler<&'static str>) -> Vec<&'static str> {
        let mut fired = Vec::new();
        while let Some(payload) = scheduler.pop_due() {
            fired.push(payload);
        }
        fired
    }

    #[test]
    fn test_one_shot_fires_once_after_delay() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Duration::from_millis(25), "boom");

        scheduler.advance(TICK);
        assert!(drain(&mut scheduler).is_empty());
        scheduler.advance(TICK);
        assert!(drain(&mut scheduler).is_empty());
        scheduler.advance(TICK);
        assert_eq!(drain(&mut scheduler), vec!["boom"]);

        scheduler.advance(TICK);
        assert!(drain(&mut scheduler).is_empty());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_zero_delay_waits_for_next_advance() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Duration::ZERO, "now");

        // Nothing is due until the next tick boundary
        assert!(scheduler.pop_due().is_none());

        scheduler.advance(Duration::ZERO);
        assert_eq!(drain(&mut scheduler), vec!["now"]);
    }

    #[test]
    fn test_scheduled_during_drain_is_deferred() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(TICK, "first");
        scheduler.advance(TICK);

        let fired = scheduler.pop_due();
        assert_eq!(fired, Some("first"));
        scheduler.schedule(Duration::ZERO, "chained");
        assert!(scheduler.pop_due().is_none());

        scheduler.advance(TICK);
        assert_eq!(drain(&mut scheduler), vec!["chained"]);
    }

    #[test]
    fn test_due_timers_fire_in_scheduling_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Duration::from_millis(10), "a");
        scheduler.schedule(Duration::from_millis(5), "b");
        scheduler.schedule(Duration::from_millis(1), "c");

        scheduler.advance(TICK);
        assert_eq!(drain(&mut scheduler), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_repeating_fires_every_interval_until_cancelled() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule_repeating(Duration::from_millis(20), "blink");

        let mut count = 0;
        for _ in 0..10 {
            scheduler.advance(TICK);
            count += drain(&mut scheduler).len();
        }
        assert_eq!(count, 5);

        assert!(scheduler.cancel(handle));
        scheduler.advance(Duration::from_millis(100));
        assert!(drain(&mut scheduler).is_empty());
    }

    #[test]
    fn test_named_lane_restart_cancels_previous() {
        let mut scheduler = Scheduler::new();
        let first = scheduler.start("flash", Duration::from_millis(10), "old");
        let second = scheduler.start("flash", Duration::from_millis(30), "new");

        assert!(!scheduler.is_scheduled(first));
        assert!(scheduler.is_scheduled(second));
        assert_eq!(scheduler.pending(), 1);

        scheduler.advance(Duration::from_millis(10));
        assert!(drain(&mut scheduler).is_empty());
        scheduler.advance(Duration::from_millis(20));
        assert_eq!(drain(&mut scheduler), vec!["new"]);
        assert!(!scheduler.is_running("flash"));
    }

    #[test]
    fn test_stop_lane_leaves_other_lanes_alone() {
        let mut scheduler = Scheduler::new();
        scheduler.start("slow", Duration::from_millis(10), "slow");
        scheduler.start("fast", Duration::from_millis(10), "fast");

        assert!(scheduler.stop("slow"));
        assert!(!scheduler.stop("slow"));
        assert!(scheduler.is_running("fast"));

        scheduler.advance(TICK);
        assert_eq!(drain(&mut scheduler), vec!["fast"]);
    }

    #[test]
    fn test_cancel_already_due_timer() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(TICK, "keep");
        let dropped = scheduler.schedule(TICK, "drop");
        scheduler.advance(TICK);

        assert_eq!(scheduler.pop_due(), Some("keep"));
        // e.g. the first callback cancels the second
        assert!(scheduler.cancel(dropped));
        assert!(scheduler.pop_due().is_none());
    }

    #[test]
    fn test_lane_freed_before_handler_runs() {
        let mut scheduler = Scheduler::new();
        scheduler.start("flash", TICK, "half");
        scheduler.advance(TICK);

        assert_eq!(scheduler.pop_due(), Some("half"));
        assert!(!scheduler.is_running("flash"));

        scheduler.start("flash", TICK, "end");
        assert!(scheduler.is_running("flash"));
    }
}
