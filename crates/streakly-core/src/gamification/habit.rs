use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::model::Goal;

/// Days with qualifying activity: a completed task dated that day, or a
/// completed focus session on that day.
pub fn active_days(goal: &Goal) -> BTreeSet<NaiveDate> {
    let task_days = goal
        .tasks
        .iter()
        .filter(|t| t.completed)
        .filter_map(|t| t.completed_date);
    let session_days = goal
        .timer_sessions()
        .iter()
        .filter(|s| s.completed)
        .map(|s| s.date);
    task_days.chain(session_days).collect()
}

/// Consecutive active days ending today; 0 when today has no activity.
pub fn compute_habit_chain(goal: &Goal, today: NaiveDate) -> u32 {
    let days = active_days(goal);
    if !days.contains(&today) {
        return 0;
    }

    let mut chain = 1;
    let mut cursor = today;
    while let Some(prev) = cursor.pred_opt() {
        if !days.contains(&prev) {
            break;
        }
        chain += 1;
        cursor = prev;
    }
    chain
}
