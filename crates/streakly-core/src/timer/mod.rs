//! Focus/break session timer.
//!
//! [`FocusTimer`] is a wall-clock state machine with no thread of its own;
//! the owner calls `tick()` periodically, usually from a [`Ticker`].

mod engine;
mod ticker;

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub use engine::{FocusTimer, TimerEvent, TimerMode, TimerState};
pub use ticker::Ticker;

/// Accepted focus length in minutes.
pub const FOCUS_RANGE: RangeInclusive<u32> = 1..=60;
/// Accepted break length in minutes.
pub const BREAK_RANGE: RangeInclusive<u32> = 1..=30;

/// Validated focus and break lengths, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerDurations {
    focus_minutes: u32,
    break_minutes: u32,
}

impl TimerDurations {
    pub fn new(focus_minutes: u32, break_minutes: u32) -> Result<Self, ValidationError> {
        check_range("focus_minutes", focus_minutes, &FOCUS_RANGE)?;
        check_range("break_minutes", break_minutes, &BREAK_RANGE)?;
        Ok(Self {
            focus_minutes,
            break_minutes,
        })
    }

    pub fn focus_minutes(&self) -> u32 {
        self.focus_minutes
    }

    pub fn break_minutes(&self) -> u32 {
        self.break_minutes
    }

    pub fn minutes(&self, mode: TimerMode) -> u32 {
        match mode {
            TimerMode::Focus => self.focus_minutes,
            TimerMode::Break => self.break_minutes,
        }
    }

    pub fn ms(&self, mode: TimerMode) -> u64 {
        self.minutes(mode) as u64 * 60 * 1000
    }
}

impl Default for TimerDurations {
    fn default() -> Self {
        Self {
            focus_minutes: 25,
            break_minutes: 5,
        }
    }
}

fn check_range(field: &str, value: u32, range: &RangeInclusive<u32>) -> Result<(), ValidationError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value: value as u64,
            min: *range.start() as u64,
            max: *range.end() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_25_and_5() {
        let d = TimerDurations::default();
        assert_eq!(d.focus_minutes(), 25);
        assert_eq!(d.break_minutes(), 5);
        assert_eq!(d.ms(TimerMode::Focus), 25 * 60 * 1000);
    }

    #[test]
    fn bounds_are_inclusive() {
        assert!(TimerDurations::new(1, 1).is_ok());
        assert!(TimerDurations::new(60, 30).is_ok());
        assert!(matches!(
            TimerDurations::new(0, 5),
            Err(ValidationError::OutOfRange { ref field, .. }) if field == "focus_minutes"
        ));
        assert!(matches!(
            TimerDurations::new(25, 31),
            Err(ValidationError::OutOfRange { ref field, max: 30, .. }) if field == "break_minutes"
        ));
    }
}
