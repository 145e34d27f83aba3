//! Focus timer state machine.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Paused -> Running -> (expiry) -> Idle
//! ```
//!
//! Expiry flips the mode: a finished focus block yields a [`TimerSession`]
//! and arms the break; a finished break yields [`TimerEvent::BreakOver`] and
//! arms the next focus block. Neither auto-starts.

use serde::{Deserialize, Serialize};

use super::TimerDurations;
use crate::clock::Clock;
use crate::model::TimerSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    Focus,
    Break,
}

/// Produced by [`FocusTimer::tick`] when the current block runs out.
#[derive(Debug, Clone, PartialEq)]
pub enum TimerEvent {
    SessionComplete(TimerSession),
    BreakOver,
}

/// Wall-clock focus/break timer bound to one goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusTimer {
    goal_id: String,
    durations: TimerDurations,
    mode: TimerMode,
    state: TimerState,
    remaining_ms: u64,
    /// Wall-clock ms of the last flush while running.
    #[serde(default)]
    last_tick_ms: Option<u64>,
}

impl FocusTimer {
    /// Idle, in focus mode, with the full focus block ahead.
    pub fn new(goal_id: impl Into<String>, durations: TimerDurations) -> Self {
        Self {
            goal_id: goal_id.into(),
            durations,
            mode: TimerMode::Focus,
            state: TimerState::Idle,
            remaining_ms: durations.ms(TimerMode::Focus),
            last_tick_ms: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn goal_id(&self) -> &str {
        &self.goal_id
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn durations(&self) -> TimerDurations {
        self.durations
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn total_ms(&self) -> u64 {
        self.durations.ms(self.mode)
    }

    /// 0.0 .. 1.0 progress within the current block.
    pub fn progress(&self) -> f64 {
        let total = self.total_ms();
        if total == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_ms as f64 / total as f64)
    }

    /// Remaining time as `MM:SS`, rounding partial seconds up.
    pub fn remaining_display(&self) -> String {
        let secs = self.remaining_ms.div_ceil(1000);
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Returns `false` when already running.
    pub fn start(&mut self, clock: &dyn Clock) -> bool {
        match self.state {
            TimerState::Idle | TimerState::Paused => {
                self.state = TimerState::Running;
                self.last_tick_ms = Some(clock.now_ms());
                true
            }
            TimerState::Running => false,
        }
    }

    pub fn pause(&mut self, clock: &dyn Clock) -> bool {
        if self.state != TimerState::Running {
            return false;
        }
        self.flush_elapsed(clock);
        self.state = TimerState::Paused;
        self.last_tick_ms = None;
        true
    }

    pub fn resume(&mut self, clock: &dyn Clock) -> bool {
        if self.state != TimerState::Paused {
            return false;
        }
        self.state = TimerState::Running;
        self.last_tick_ms = Some(clock.now_ms());
        true
    }

    /// Back to idle with the full length of the current mode.
    pub fn reset(&mut self) {
        self.state = TimerState::Idle;
        self.last_tick_ms = None;
        self.remaining_ms = self.total_ms();
    }

    /// Switch mode by hand; the timer stops and is re-armed.
    pub fn set_mode(&mut self, mode: TimerMode) {
        self.mode = mode;
        self.reset();
    }

    /// New lengths apply immediately and re-arm the current mode.
    pub fn set_durations(&mut self, durations: TimerDurations) {
        self.durations = durations;
        self.reset();
    }

    /// Call periodically. Returns an event when the current block expires.
    pub fn tick(&mut self, clock: &dyn Clock) -> Option<TimerEvent> {
        if self.state != TimerState::Running {
            return None;
        }
        self.flush_elapsed(clock);
        if self.remaining_ms > 0 {
            return None;
        }

        let event = match self.mode {
            TimerMode::Focus => TimerEvent::SessionComplete(TimerSession {
                date: clock.today(),
                duration: self.durations.focus_minutes(),
                goal_id: self.goal_id.clone(),
                completed: true,
            }),
            TimerMode::Break => TimerEvent::BreakOver,
        };
        let next = match self.mode {
            TimerMode::Focus => TimerMode::Break,
            TimerMode::Break => TimerMode::Focus,
        };
        tracing::debug!(goal_id = %self.goal_id, from = ?self.mode, to = ?next, "timer block finished");
        self.set_mode(next);
        Some(event)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn flush_elapsed(&mut self, clock: &dyn Clock) {
        if let Some(last) = self.last_tick_ms {
            let now = clock.now_ms();
            let elapsed = now.saturating_sub(last);
            self.remaining_ms = self.remaining_ms.saturating_sub(elapsed);
            self.last_tick_ms = Some(now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{Duration, NaiveDate};

    fn clock() -> ManualClock {
        ManualClock::at_day(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap())
    }

    fn timer(focus: u32, brk: u32) -> FocusTimer {
        FocusTimer::new("goal-1", TimerDurations::new(focus, brk).unwrap())
    }

    #[test]
    fn start_pause_resume() {
        let clock = clock();
        let mut t = timer(25, 5);
        assert_eq!(t.state(), TimerState::Idle);
        assert_eq!(t.remaining_display(), "25:00");

        assert!(t.start(&clock));
        assert!(!t.start(&clock));
        assert_eq!(t.state(), TimerState::Running);

        clock.advance(Duration::seconds(90));
        assert!(t.pause(&clock));
        assert_eq!(t.state(), TimerState::Paused);
        assert_eq!(t.remaining_display(), "23:30");

        // Time spent paused does not count.
        clock.advance(Duration::minutes(10));
        assert!(t.resume(&clock));
        assert_eq!(t.tick(&clock), None);
        assert_eq!(t.remaining_display(), "23:30");
    }

    #[test]
    fn focus_expiry_records_session_and_arms_break() {
        let clock = clock();
        let mut t = timer(20, 5);
        t.start(&clock);
        clock.advance(Duration::minutes(19));
        assert_eq!(t.tick(&clock), None);
        clock.advance(Duration::minutes(2));

        let event = t.tick(&clock).expect("focus block should finish");
        let TimerEvent::SessionComplete(session) = event else {
            panic!("expected a session");
        };
        assert_eq!(session.duration, 20);
        assert_eq!(session.goal_id, "goal-1");
        assert_eq!(session.date, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert!(session.completed);

        assert_eq!(t.mode(), TimerMode::Break);
        assert_eq!(t.state(), TimerState::Idle);
        assert_eq!(t.remaining_display(), "05:00");
    }

    #[test]
    fn break_expiry_returns_to_focus() {
        let clock = clock();
        let mut t = timer(25, 1);
        t.set_mode(TimerMode::Break);
        t.start(&clock);
        clock.advance(Duration::seconds(61));
        assert_eq!(t.tick(&clock), Some(TimerEvent::BreakOver));
        assert_eq!(t.mode(), TimerMode::Focus);
        assert_eq!(t.state(), TimerState::Idle);
        assert_eq!(t.tick(&clock), None);
    }

    #[test]
    fn reset_restores_full_block() {
        let clock = clock();
        let mut t = timer(10, 5);
        t.start(&clock);
        clock.advance(Duration::minutes(4));
        t.tick(&clock);
        assert!(t.progress() > 0.3);
        t.reset();
        assert_eq!(t.state(), TimerState::Idle);
        assert_eq!(t.remaining_ms(), 10 * 60 * 1000);
        assert_eq!(t.progress(), 0.0);
    }

    #[test]
    fn idle_timer_ignores_ticks() {
        let clock = clock();
        let mut t = timer(1, 1);
        clock.advance(Duration::minutes(5));
        assert_eq!(t.tick(&clock), None);
        assert_eq!(t.remaining_display(), "01:00");
        assert!(!t.pause(&clock));
        assert!(!t.resume(&clock));
    }
}
