//! Time source abstraction.
//!
//! `TaskStore` stamps `created_at` and classifies deadlines through a
//! `Clock` so tests can pin "now" and "today".

use chrono::{DateTime, Local, NaiveDate, Utc};

/// Provides the current instant and calendar day.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar day used for deadline checks.
    fn today(&self) -> NaiveDate;
}

/// Wall clock. `today` follows the device's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock frozen at one instant.
///
/// `today` is the UTC date of `now` unless pinned with `with_today`, which
/// stands in for the local calendar day `SystemClock` reports.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
    today: NaiveDate,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            today: now.date_naive(),
        }
    }

    /// Pins the calendar day independently of `now`.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn today(&self) -> NaiveDate {
        self.today
    }
}
