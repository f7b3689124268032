//! Time source used when generating unique names

use time::OffsetDateTime;

/// Source of the current time
pub trait Clock {
    fn now(&self) -> OffsetDateTime;
}

/// Local wall-clock time, falling back to UTC when the local offset is unknown
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
    }
}

/// A clock frozen at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}
