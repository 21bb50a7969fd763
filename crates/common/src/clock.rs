//! Clock abstraction.
//!
//! Export filenames embed a Unix-millisecond timestamp and new compositions
//! are seeded with the current local date and time. Both go through
//! [`Clock`] so tests and reproducible exports can pin the instant.

use chrono::{Local, NaiveDateTime, Utc};

/// Source of "now".
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;

    /// Current wall-clock time in the local timezone.
    fn now_local(&self) -> NaiveDateTime;
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn now_local(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    millis: i64,
    local: NaiveDateTime,
}

impl FixedClock {
    /// Freeze the clock at the given epoch milliseconds and local time.
    pub fn new(millis: i64, local: NaiveDateTime) -> Self {
        Self { millis, local }
    }

    /// Freeze the clock at a local time, deriving the millis as if local were UTC.
    pub fn at(local: NaiveDateTime) -> Self {
        Self {
            millis: local.and_utc().timestamp_millis(),
            local,
        }
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.millis
    }

    fn now_local(&self) -> NaiveDateTime {
        self.local
    }
}
