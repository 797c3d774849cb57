use crate::common::time::Timestamp;
use std::time::Duration;

/// Fixed-period tick deadline on the monotonic clock.
///
/// A tick fires at most once per `poll`. When several periods were missed the
/// deadline skips ahead past `now` instead of queueing one tick per period.
#[derive(Debug, Clone)]
pub struct TickSchedule {
    next_due: Timestamp,
    period: Duration,
    next_tick: u64,
}

impl TickSchedule {
    pub fn new(start: Timestamp, first_delay: Duration, period: Duration) -> Self {
        Self {
            next_due: start + first_delay,
            period,
            next_tick: 1,
        }
    }

    pub fn next_due(&self) -> Timestamp {
        self.next_due
    }

    /// How long the loop may sleep before the next tick is due
    pub fn time_until_due(&self, now: Timestamp) -> Duration {
        now.until(self.next_due)
    }

    /// Returns the tick number to broadcast once `now` has passed the deadline,
    /// and moves the deadline strictly past `now`. `period` must be non-zero.
    pub fn poll(&mut self, now: Timestamp) -> Option<u64> {
        if now <= self.next_due {
            return None;
        }

        let tick = self.next_tick;
        self.next_tick += 1;

        let behind = now - self.next_due;
        let periods = behind.as_nanos() / self.period.as_nanos() + 1;
        let skip = self.period.as_nanos() * periods;
        self.next_due += Duration::new(
            (skip / 1_000_000_000) as u64,
            (skip % 1_000_000_000) as u32,
        );

        Some(tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: u64, millis: u32) -> Timestamp {
        Timestamp::new(secs, millis * 1_000_000)
    }

    #[test]
    fn test_not_due_before_deadline() {
        let mut schedule = TickSchedule::new(at(100, 0), Duration::from_secs(5), Duration::from_secs(5));
        assert_eq!(schedule.poll(at(104, 999)), None);
        assert_eq!(schedule.time_until_due(at(104, 0)), Duration::from_secs(1));
        assert_eq!(schedule.time_until_due(at(106, 0)), Duration::ZERO);
    }

    #[test]
    fn test_consecutive_ticks() {
        let mut schedule = TickSchedule::new(at(100, 0), Duration::from_secs(5), Duration::from_secs(5));
        assert_eq!(schedule.poll(at(105, 100)), Some(1));
        assert_eq!(schedule.next_due(), at(110, 0));
        assert_eq!(schedule.poll(at(105, 200)), None);
        assert_eq!(schedule.poll(at(110, 50)), Some(2));
        assert_eq!(schedule.next_due(), at(115, 0));
    }

    #[test]
    fn test_stall_fires_once_and_skips_ahead() {
        let mut schedule = TickSchedule::new(at(100, 0), Duration::from_secs(5), Duration::from_secs(5));
        // Stalled 12 seconds past the first deadline
        assert_eq!(schedule.poll(at(117, 0)), Some(1));
        assert_eq!(schedule.next_due(), at(120, 0));
        assert_eq!(schedule.poll(at(118, 0)), None);
        assert_eq!(schedule.poll(at(120, 1)), Some(2));
    }

    #[test]
    fn test_period_boundary_moves_into_future() {
        let mut schedule = TickSchedule::new(at(0, 0), Duration::from_millis(200), Duration::from_millis(200));
        let now = at(1, 0);
        assert_eq!(schedule.poll(now), Some(1));
        assert!(schedule.next_due() > now);
        assert_eq!(schedule.next_due(), at(1, 200));
    }

    #[test]
    fn test_first_delay_differs_from_period() {
        let mut schedule = TickSchedule::new(at(10, 0), Duration::from_secs(1), Duration::from_secs(5));
        assert_eq!(schedule.poll(at(11, 1)), Some(1));
        assert_eq!(schedule.next_due(), at(16, 0));
    }

    #[test]
    fn test_deadline_must_be_passed_not_reached() {
        let mut schedule = TickSchedule::new(at(100, 0), Duration::from_secs(5), Duration::from_secs(5));
        assert_eq!(schedule.poll(at(105, 0)), None);
        assert_eq!(schedule.next_due(), at(105, 0));
        assert_eq!(schedule.poll(Timestamp::new(105, 1)), Some(1));
        assert_eq!(schedule.next_due(), at(110, 0));
    }
}
