use crate::common::error::{Result, ServerError};
use std::fmt;
use std::time::Duration;

/// Reads `CLOCK_MONOTONIC`. The clock origin is unspecified (usually boot),
/// so values are only meaningful relative to each other or as log stamps.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    pub fn new() -> Self {
        Self
    }

    pub fn now(&self) -> Result<Timestamp> {
        let mut ts: libc::timespec = unsafe { std::mem::zeroed() };
        let ret = unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts) };
        if ret < 0 {
            return Err(ServerError::ClockError(std::io::Error::last_os_error()));
        }
        Ok(Timestamp::new(ts.tv_sec as u64, ts.tv_nsec as u32))
    }
}

/// A point on the monotonic clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(Duration);

impl Timestamp {
    pub fn new(secs: u64, nanos: u32) -> Self {
        Self(Duration::new(secs, nanos))
    }

    /// Time left until `later`, zero if `later` is not ahead of `self`
    pub fn until(&self, later: Timestamp) -> Duration {
        later.0.saturating_sub(self.0)
    }
}

impl std::ops::Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Timestamp {
        Timestamp(self.0 + rhs)
    }
}

impl std::ops::AddAssign<Duration> for Timestamp {
    fn add_assign(&mut self, rhs: Duration) {
        self.0 += rhs;
    }
}

impl std::ops::Sub for Timestamp {
    type Output = Duration;

    fn sub(self, rhs: Timestamp) -> Duration {
        self.0.saturating_sub(rhs.0)
    }
}

/// Renders as `<seconds>.<nanoseconds>` with nanoseconds zero-padded to nine digits
impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.0.as_secs(), self.0.subsec_nanos())
    }
}

/// Converts a wait duration into whole milliseconds for the poller, rounding up
/// so a wake-up never lands before the deadline.
pub fn duration_to_timeout_ms(timeout: Duration) -> i32 {
    let mut ms = timeout.as_millis();
    if timeout.subsec_nanos() % 1_000_000 != 0 {
        ms += 1;
    }
    ms.min(i32::MAX as u128) as i32
}
