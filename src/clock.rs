//! Time sources for the engine.

use chrono::{Local, NaiveDate};
use std::time::Instant;

/// Where the engine reads the time from.
pub trait Clock {
    /// Monotonic instant used to measure elapsed countdown time.
    fn now(&self) -> Instant;
    /// Calendar date in the user's local time zone.
    fn today(&self) -> NaiveDate;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}
