use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::badges::{newly_unlocked, recompute_badges};
use super::{compute_habit_chain, did_level_up, xp_for_session};
use crate::model::{Goal, TimerSession, User};

/// XP for completing a task.
pub const TASK_XP: u64 = 5;
/// XP for completing a milestone.
pub const MILESTONE_XP: u64 = 20;

/// What earned the XP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AwardSource {
    Task,
    Milestone,
    Timer,
}

/// Next goal and user state after an XP-granting event.
#[derive(Debug, Clone, PartialEq)]
pub struct Award {
    pub goal: Goal,
    pub user: User,
    pub source: AwardSource,
    pub xp: u64,
    pub goal_leveled_up: bool,
    pub user_leveled_up: bool,
    /// Badge names unlocked by this event.
    pub unlocked_badges: Vec<String>,
}

impl Award {
    pub fn leveled_up(&self) -> bool {
        self.goal_leveled_up || self.user_leveled_up
    }
}

/// +5 XP. The task itself must already be marked done on `goal`.
pub fn award_task_completion(goal: Goal, user: User, today: NaiveDate) -> Award {
    grant(goal, user, TASK_XP, AwardSource::Task, today)
}

/// +20 XP. The milestone itself must already be marked done on `goal`.
pub fn award_milestone_completion(goal: Goal, user: User, today: NaiveDate) -> Award {
    grant(goal, user, MILESTONE_XP, AwardSource::Milestone, today)
}

/// XP per focused minute; the session is appended to the goal and its
/// duration added to the goal's focus total. The habit chain is measured
/// from `today`, whatever day the session is dated.
pub fn award_timer_session(
    mut goal: Goal,
    user: User,
    session: TimerSession,
    today: NaiveDate,
) -> Award {
    let xp = xp_for_session(session.duration as f64);
    goal.push_session(session);
    grant(goal, user, xp, AwardSource::Timer, today)
}

fn grant(mut goal: Goal, mut user: User, xp: u64, source: AwardSource, today: NaiveDate) -> Award {
    let old_goal_xp = goal.xp();
    let old_user_xp = user.total_xp();

    goal.add_xp(xp);
    user.add_xp(xp);

    goal.habit_chain = compute_habit_chain(&goal, today);
    let before = goal.badges.clone();
    goal.badges = recompute_badges(&goal);
    let unlocked_badges = newly_unlocked(&before, &goal.badges);

    let goal_leveled_up = did_level_up(old_goal_xp, goal.xp());
    let user_leveled_up = did_level_up(old_user_xp, user.total_xp());

    tracing::debug!(
        ?source,
        xp,
        goal_xp = goal.xp(),
        habit_chain = goal.habit_chain,
        "granted xp"
    );

    Award {
        goal,
        user,
        source,
        xp,
        goal_leveled_up,
        user_leveled_up,
        unlocked_badges,
    }
}
