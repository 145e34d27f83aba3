use chrono::NaiveDate;

use crate::clock::previous_day;
use crate::model::Goal;

/// Update the reflection streak for a reflection saved for `selected`.
///
/// Only a reflection for `today` moves the streak. Back-filled reflections
/// leave both `streak` and `last_reflection_date` untouched. Saving twice
/// on the same day keeps the streak as it is.
pub fn apply_reflection_streak(goal: &mut Goal, selected: NaiveDate, today: NaiveDate) {
    if selected != today {
        return;
    }

    let yesterday = previous_day(today);
    match goal.last_reflection_date {
        None => goal.streak += 1,
        Some(last) if last == yesterday => goal.streak += 1,
        Some(last) if last != today => goal.streak = 1,
        Some(_) => {}
    }
    goal.last_reflection_date = Some(today);
}
