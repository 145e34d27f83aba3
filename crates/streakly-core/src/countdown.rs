use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Time left until a goal's deadline. Recomputed on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl Countdown {
    pub fn from_seconds(total: u64) -> Self {
        Self {
            days: total / 86_400,
            hours: total % 86_400 / 3_600,
            minutes: total % 3_600 / 60,
            seconds: total % 60,
        }
    }

    pub fn total_seconds(&self) -> u64 {
        self.days * 86_400 + self.hours * 3_600 + self.minutes * 60 + self.seconds
    }

    pub fn is_expired(&self) -> bool {
        self.total_seconds() == 0
    }
}

/// `DD:HH:MM:SS`; days are never truncated.
impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}:{:02}",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// Countdown to local midnight at the start of `deadline`, clamped at zero.
pub fn format_countdown(deadline: NaiveDate, now: NaiveDateTime) -> Countdown {
    let target = deadline.and_time(NaiveTime::MIN);
    let secs = (target - now).num_seconds().max(0) as u64;
    Countdown::from_seconds(secs)
}
