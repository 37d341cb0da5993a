//! Wall-clock access.
//!
//! The schedule takes "now" as a plain argument. Callers that need the real
//! time go through [`Clock`] so tests and the `--at` flag can pin it.

use chrono::{Local, NaiveDate, NaiveDateTime};

/// A source of the current local date and time.
pub trait Clock {
    /// The current local date and time.
    fn now(&self) -> NaiveDateTime;

    /// The current local date.
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Reads the system's local time on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Parse a user-supplied instant.
///
/// Accepts `YYYY-MM-DDTHH:MM[:SS]`, `YYYY-MM-DD HH:MM[:SS]`, or a bare
/// `HH:MM` which is taken as that time on `today`.
#[must_use]
pub fn parse_instant(value: &str, today: NaiveDate) -> Option<NaiveDateTime> {
    const FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];

    let value = value.trim();
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            crate::medication::DoseTime::parse(value)
                .map(|time| today.and_time(time.as_naive_time()))
        })
}
