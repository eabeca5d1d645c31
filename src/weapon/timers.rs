//! Generation-tagged timer queue.
//!
//! Every timer carries the weapon generation that was current when it was
//! scheduled. The controller discards timers whose tag no longer matches,
//! so a late auto-close or sweep step from a superseded window is a no-op.
//! Due timers fire in (due time, schedule order), which keeps replays
//! identical regardless of how ticks slice time.

use super::Hand;
use crate::constants::TIMER_EPSILON;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Windup elapsed: open the hit window if nothing else did
    WindupExpiry(Hand),
    /// Active duration elapsed: close the window
    AutoClose(Hand),
    /// Reveal the next slice of a sweeping crescent
    SweepStep,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledTimer {
    pub kind: TimerKind,
    pub due_at: f64,
    pub generation: u64,
    order: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now: f64,
    timers: Vec<ScheduledTimer>,
    next_order: u64,
}

impl Scheduler {
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn advance(&mut self, dt: f32) {
        if dt.is_finite() && dt > 0.0 {
            self.now += dt as f64;
        }
    }

    /// Schedule `kind` to fire `delay` seconds from now
    pub fn schedule(&mut self, kind: TimerKind, delay: f32, generation: u64) {
        let delay = if delay.is_finite() { delay.max(0.0) } else { 0.0 };
        self.schedule_at(kind, self.now + delay as f64, generation);
    }

    /// Schedule `kind` at an absolute time (chained timers keep their cadence)
    pub fn schedule_at(&mut self, kind: TimerKind, due_at: f64, generation: u64) {
        let order = self.next_order;
        self.next_order += 1;
        self.timers.push(ScheduledTimer {
            kind,
            due_at,
            generation,
            order,
        });
    }

    /// Remove and return the earliest timer that is due
    pub fn pop_due(&mut self) -> Option<ScheduledTimer> {
        let limit = self.now + TIMER_EPSILON as f64;
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_at <= limit)
            .min_by(|(_, a), (_, b)| {
                a.due_at
                    .total_cmp(&b.due_at)
                    .then(a.order.cmp(&b.order))
            })
            .map(|(i, _)| i)?;
        Some(self.timers.remove(index))
    }

    /// Drop every timer not tagged with `generation`; returns how many were dropped
    pub fn purge_stale(&mut self, generation: u64) -> usize {
        let before = self.timers.len();
        self.timers.retain(|t| t.generation == generation);
        before - self.timers.len()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn pending(&self) -> impl Iterator<Item = &ScheduledTimer> {
        self.timers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_due_order() {
        let mut s = Scheduler::default();
        s.schedule(TimerKind::AutoClose(Hand::Light), 0.3, 1);
        s.schedule(TimerKind::WindupExpiry(Hand::Light), 0.1, 1);
        s.advance(0.5);
        assert_eq!(s.pop_due().unwrap().kind, TimerKind::WindupExpiry(Hand::Light));
        assert_eq!(s.pop_due().unwrap().kind, TimerKind::AutoClose(Hand::Light));
        assert!(s.pop_due().is_none());
    }

    #[test]
    fn test_not_due_yet() {
        let mut s = Scheduler::default();
        s.schedule(TimerKind::SweepStep, 0.2, 1);
        s.advance(0.1);
        assert!(s.pop_due().is_none());
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn test_same_due_time_keeps_schedule_order() {
        let mut s = Scheduler::default();
        s.schedule(TimerKind::SweepStep, 0.0, 1);
        s.schedule(TimerKind::AutoClose(Hand::Heavy), 0.0, 1);
        assert_eq!(s.pop_due().unwrap().kind, TimerKind::SweepStep);
        assert_eq!(s.pop_due().unwrap().kind, TimerKind::AutoClose(Hand::Heavy));
    }

    #[test]
    fn test_purge_stale() {
        let mut s = Scheduler::default();
        s.schedule(TimerKind::SweepStep, 0.1, 1);
        s.schedule(TimerKind::AutoClose(Hand::Light), 0.1, 2);
        assert_eq!(s.purge_stale(2), 1);
        assert_eq!(s.pending().next().unwrap().generation, 2);
    }
}
