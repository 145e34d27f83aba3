//! Read-only projections shown next to goals and the user.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::{Goal, Milestone, Task, User};

/// Share of finished items, 0-100, rounded. Empty goals are at 0.
pub fn calculate_completion(tasks: &[Task], milestones: &[Milestone]) -> u32 {
    let total = tasks.len() + milestones.len();
    if total == 0 {
        return 0;
    }
    let done = tasks.iter().filter(|t| t.completed).count()
        + milestones.iter().filter(|m| m.completed).count();
    (done as f64 / total as f64 * 100.0).round() as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayActivity {
    pub date: NaiveDate,
    pub count: u32,
}

/// Activity counts for the `days` days ending at `today`, oldest first.
pub fn activity_heatmap(goal: &Goal, today: NaiveDate, days: u32) -> Vec<DayActivity> {
    (0..days as i64)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            let tasks = goal
                .tasks
                .iter()
                .filter(|t| t.completed && t.completed_date == Some(date))
                .count();
            let sessions = goal
                .timer_sessions()
                .iter()
                .filter(|s| s.completed && s.date == date)
                .count();
            DayActivity {
                date,
                count: (tasks + sessions) as u32,
            }
        })
        .collect()
}

/// Daily XP target shown against `daily_xp`.
pub fn xp_for_next_level(user: &User) -> u64 {
    user.level() as u64 * 100
}

/// Progress of today's XP toward the daily target, capped at 100.
pub fn daily_progress_pct(user: &User) -> u32 {
    let target = xp_for_next_level(user);
    let pct = (user.daily_xp as f64 / target as f64 * 100.0).round() as u32;
    pct.min(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TimerSession;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn completion_of_empty_goal_is_zero() {
        assert_eq!(calculate_completion(&[], &[]), 0);
    }

    #[test]
    fn completion_rounds() {
        let mut tasks = vec![Task::new("a"), Task::new("b"), Task::new("c")];
        tasks[0].toggle(day("2024-03-10"));
        assert_eq!(calculate_completion(&tasks, &[]), 33);
        tasks[1].toggle(day("2024-03-10"));
        assert_eq!(calculate_completion(&tasks, &[]), 67);
    }

    #[test]
    fn heatmap_counts_last_days() {
        let mut goal = Goal::new("g", day("2025-01-01"), "why", vec![Task::new("t")], vec![]);
        goal.tasks[0].toggle(day("2024-03-10"));
        for d in ["2024-03-10", "2024-03-08", "2024-03-01"] {
            goal.push_session(TimerSession {
                date: day(d),
                duration: 25,
                goal_id: goal.id.clone(),
                completed: true,
            });
        }
        let map = activity_heatmap(&goal, day("2024-03-10"), 7);
        assert_eq!(map.len(), 7);
        assert_eq!(map[0].date, day("2024-03-04"));
        assert_eq!(map[6], DayActivity { date: day("2024-03-10"), count: 2 });
        assert_eq!(map[4].count, 1);
        assert_eq!(map.iter().map(|d| d.count).sum::<u32>(), 3);
    }

    #[test]
    fn daily_progress_caps_at_hundred() {
        let mut user = User::default();
        assert_eq!(daily_progress_pct(&user), 0);
        user.add_xp(25);
        assert_eq!(xp_for_next_level(&user), 100);
        assert_eq!(daily_progress_pct(&user), 25);
        user.add_xp(5000);
        assert_eq!(daily_progress_pct(&user), 100);
    }
}
