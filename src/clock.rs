//! Injected wall-clock abstraction.
//!
//! Every timestamp the service records or compares ("this month", the
//! 14-day activity window) flows through a [`Clock`] held in `AppContext`,
//! so tests can pin "today" and get byte-stable reports. The service time
//! zone is UTC.

use chrono::{DateTime, NaiveDate, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Today's calendar date in the service time zone.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Production clock — reads the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Test clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
