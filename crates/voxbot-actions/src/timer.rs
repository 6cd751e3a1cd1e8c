#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Timing policy for one scheduled action.
///
/// A timer counts down every world tick; when it reaches zero the owning
/// [`ActionPack`](crate::ActionPack) runs one attempt of the action. Whether
/// that attempt consumes a repetition depends on the policy: normally every
/// attempt counts, but a success-required timer only advances on a
/// successful attempt and keeps retrying every tick until one lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ActionTimer {
    /// Total repetitions; `None` runs until explicitly stopped.
    limit: Option<u32>,
    interval: u32,
    offset: u32,
    count: u32,
    countdown: u32,
    continuous: bool,
    needs_success: bool,
    done: bool,
}

impl ActionTimer {
    fn new(
        limit: Option<u32>,
        interval: u32,
        offset: u32,
        continuous: bool,
        needs_success: bool,
    ) -> Self {
        let interval = interval.max(1);
        Self {
            limit,
            interval,
            offset,
            count: 0,
            countdown: interval + offset,
            continuous,
            needs_success,
            done: false,
        }
    }

    /// Exactly one attempt, next tick.
    pub fn once() -> Self {
        Self::new(Some(1), 1, 0, false, false)
    }

    /// One *successful* attempt; retried every tick until it lands.
    pub fn once_until_success() -> Self {
        Self::new(Some(1), 1, 0, false, true)
    }

    /// Every tick until stopped. Restart requests while already running are
    /// ignored to avoid restart jitter.
    pub fn continuous() -> Self {
        Self::new(None, 1, 0, true, false)
    }

    /// Every `interval` ticks until stopped.
    pub fn every(interval: u32) -> Self {
        Self::new(None, interval, 0, false, false)
    }

    /// Every `interval` ticks, first attempt delayed by `offset` extra ticks.
    pub fn every_with_offset(interval: u32, offset: u32) -> Self {
        Self::new(None, interval, offset, false, false)
    }

    /// Attempted every tick; a repetition is consumed (and the `interval`
    /// re-armed) only on success.
    pub fn every_until_success(interval: u32) -> Self {
        Self::new(None, interval, 0, false, true)
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn is_continuous(&self) -> bool {
        self.continuous
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn attempts(&self) -> u32 {
        self.count
    }

    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    /// Count down one tick; true when an attempt is due.
    pub(crate) fn count_down(&mut self) -> bool {
        self.countdown = self.countdown.saturating_sub(1);
        self.countdown == 0
    }

    /// Single-shot per-tick actions need their lingering effect cleared
    /// before re-firing, so the host can process the release in between.
    pub(crate) fn flush_before_fire(&self) -> bool {
        self.interval == 1 && !self.continuous
    }

    /// Record one attempt. `outcome` is `None` when the attempt did not run
    /// (suppressed); those still count unless the timer requires success.
    /// Returns true when the repeat limit is now reached.
    pub(crate) fn register_attempt(&mut self, outcome: Option<bool>) -> bool {
        let counts = !self.needs_success || outcome == Some(true);
        if self.needs_success {
            // Keep evaluating every tick until the action reports success.
            self.countdown = 1;
        } else {
            self.countdown = self.interval;
        }
        if counts {
            self.count += 1;
            if Some(self.count) == self.limit {
                self.done = true;
                return true;
            }
        }
        false
    }

    /// Record an out-of-band retry attempt; always counts.
    pub(crate) fn register_retry(&mut self) -> bool {
        self.count += 1;
        if Some(self.count) == self.limit {
            self.done = true;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn once_fires_on_first_tick_and_finishes() {
        let mut timer = ActionTimer::once();
        assert!(timer.count_down());
        assert!(timer.register_attempt(Some(false)));
        assert!(timer.is_done());
        assert_eq!(timer.attempts(), 1);
    }

    #[test]
    fn interval_timer_fires_every_n_ticks() {
        let mut timer = ActionTimer::every(3);
        let mut fired = Vec::new();
        for tick in 0..9 {
            if timer.count_down() {
                fired.push(tick);
                assert!(!timer.register_attempt(Some(false)));
            }
        }
        assert_eq!(fired, vec![2, 5, 8]);
    }

    #[test]
    fn offset_delays_the_first_attempt_only() {
        let mut timer = ActionTimer::every_with_offset(2, 3);
        let mut fired = Vec::new();
        for tick in 0..10 {
            if timer.count_down() {
                fired.push(tick);
                timer.register_attempt(Some(false));
            }
        }
        assert_eq!(fired, vec![4, 6, 8]);
    }

    #[test]
    fn success_required_timer_retries_every_tick() {
        let mut timer = ActionTimer::once_until_success();
        assert!(timer.count_down());
        assert!(!timer.register_attempt(Some(false)));
        assert!(!timer.is_done());
        // Failure re-arms a one-tick countdown regardless of interval.
        assert!(timer.count_down());
        assert!(!timer.register_attempt(None));
        assert!(timer.count_down());
        assert!(timer.register_attempt(Some(true)));
        assert!(timer.is_done());
        assert_eq!(timer.attempts(), 1);
    }
}
