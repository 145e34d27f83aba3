//! Clock and calendar-day provider.
//!
//! All temporal logic in the tracker is calendar-day granular and uses the
//! local wall clock; there is no timezone handling beyond the local day
//! boundary.

use std::cell::Cell;

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::ValidationError;

/// Calendar-day format used in storage and on the command line.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Supplies the current local date-time.
pub trait Clock {
    /// Current local wall-clock time.
    fn now(&self) -> NaiveDateTime;

    /// Current calendar day.
    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    /// Milliseconds on the local wall-clock axis, used for timer deltas.
    fn now_ms(&self) -> u64 {
        self.now().and_utc().timestamp_millis().max(0) as u64
    }
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock that only moves when told to.
///
/// Used by tests and by dry runs that replay a specific day.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<NaiveDateTime>,
}

impl ManualClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    /// Clock fixed at 09:00 on `day`.
    pub fn at_day(day: NaiveDate) -> Self {
        Self::new(day.and_time(NaiveTime::MIN) + Duration::hours(9))
    }

    pub fn set(&self, now: NaiveDateTime) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Jump forward `days` calendar days, keeping the time of day.
    pub fn advance_days(&self, days: i64) {
        self.advance(Duration::days(days));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for std::rc::Rc<C> {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}

/// The day before `day`.
pub fn previous_day(day: NaiveDate) -> NaiveDate {
    day.pred_opt().unwrap_or(day)
}

/// Parse a `YYYY-MM-DD` day, naming `field` in the error.
pub fn parse_day(field: &str, value: &str) -> Result<NaiveDate, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::EmptyField(field.to_string()));
    }
    NaiveDate::parse_from_str(value, DAY_FORMAT).map_err(|e| ValidationError::InvalidValue {
        field: field.to_string(),
        message: format!("'{value}' is not a YYYY-MM-DD date ({e})"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn manual_clock_advances_across_day_boundary() {
        let clock = ManualClock::new(day("2024-03-10").and_hms_opt(23, 59, 0).unwrap());
        assert_eq!(clock.today(), day("2024-03-10"));
        clock.advance(Duration::minutes(2));
        assert_eq!(clock.today(), day("2024-03-11"));
    }

    #[test]
    fn now_ms_tracks_advances() {
        let clock = ManualClock::at_day(day("2024-03-10"));
        let before = clock.now_ms();
        clock.advance(Duration::seconds(90));
        assert_eq!(clock.now_ms() - before, 90_000);
    }

    #[test]
    fn previous_day_crosses_month() {
        assert_eq!(previous_day(day("2024-03-01")), day("2024-02-29"));
    }

    #[test]
    fn parse_day_rejects_garbage() {
        assert_eq!(parse_day("deadline", " 2024-03-10 "), Ok(day("2024-03-10")));
        assert_eq!(
            parse_day("deadline", ""),
            Err(ValidationError::EmptyField("deadline".into()))
        );
        assert!(matches!(
            parse_day("deadline", "next week"),
            Err(ValidationError::InvalidValue { .. })
        ));
    }
}
