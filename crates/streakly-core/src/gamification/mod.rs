//! Gamification engine.
//!
//! Pure derivation functions: every result is a function of the explicit
//! inputs (goal, user, session, day). Nothing here reads the clock or the
//! store.

mod award;
pub mod badges;
mod habit;
mod progress;
mod streak;

pub use award::{
    award_milestone_completion, award_task_completion, award_timer_session, Award, AwardSource,
    MILESTONE_XP, TASK_XP,
};
pub use badges::{default_badges, recompute_badges};
pub use habit::{active_days, compute_habit_chain};
pub use progress::{
    activity_heatmap, calculate_completion, daily_progress_pct, xp_for_next_level, DayActivity,
};
pub use streak::apply_reflection_streak;

/// One XP per focused minute; fractional minutes round to the nearest
/// integer.
pub fn xp_for_session(duration_minutes: f64) -> u64 {
    if !duration_minutes.is_finite() || duration_minutes <= 0.0 {
        return 0;
    }
    duration_minutes.round() as u64
}

/// `max(1, floor(sqrt(xp / 10)))`.
pub fn level_for_xp(xp: u64) -> u32 {
    let level = (xp as f64 / 10.0).sqrt().floor() as u32;
    level.max(1)
}

pub fn did_level_up(old_xp: u64, new_xp: u64) -> bool {
    level_for_xp(new_xp) > level_for_xp(old_xp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn level_boundaries() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(39), 1);
        assert_eq!(level_for_xp(40), 2);
        assert_eq!(level_for_xp(90), 3);
        assert_eq!(level_for_xp(100), 3);
        assert_eq!(level_for_xp(400), 6);
        assert_eq!(level_for_xp(1000), 10);
    }

    #[test]
    fn level_up_detection() {
        assert!(!did_level_up(90, 100));
        assert!(!did_level_up(0, 10));
        assert!(did_level_up(0, 40));
        assert!(did_level_up(150, 160));
        assert!(!did_level_up(40, 40));
    }

    #[test]
    fn session_xp_rounds_minutes() {
        assert_eq!(xp_for_session(25.0), 25);
        assert_eq!(xp_for_session(12.4), 12);
        assert_eq!(xp_for_session(12.5), 13);
        assert_eq!(xp_for_session(0.0), 0);
        assert_eq!(xp_for_session(f64::NAN), 0);
    }

    proptest! {
        #[test]
        fn level_is_monotonic(a in 0u64..10_000_000, delta in 0u64..100_000) {
            prop_assert!(level_for_xp(a) <= level_for_xp(a + delta));
        }

        #[test]
        fn level_never_below_one(xp in any::<u32>()) {
            prop_assert!(level_for_xp(xp as u64) >= 1);
        }
    }
}
