//! The badge catalogue and its unlock rules.

use crate::model::{new_id, Badge, Goal};

pub const FIRST_FOCUS: &str = "First Focus";
pub const CONSISTENT: &str = "Consistent";
pub const MILESTONE_MASTER: &str = "Milestone Master";
pub const TASK_TITAN: &str = "Task Titan";
pub const HOUR_HERO: &str = "Hour Hero";

struct BadgeRule {
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    unlocks: fn(&Goal) -> bool,
}

// Rules are independent; order only fixes the display order.
static RULES: [BadgeRule; 5] = [
    BadgeRule {
        name: FIRST_FOCUS,
        description: "Complete your first focus session",
        icon: "⏱️",
        unlocks: has_focus_session,
    },
    BadgeRule {
        name: CONSISTENT,
        description: "Complete sessions 3 days in a row",
        icon: "📆",
        unlocks: has_three_day_chain,
    },
    BadgeRule {
        name: MILESTONE_MASTER,
        description: "Complete 5 milestones",
        icon: "🏆",
        unlocks: has_five_milestones,
    },
    BadgeRule {
        name: TASK_TITAN,
        description: "Complete 10 tasks",
        icon: "✅",
        unlocks: has_ten_tasks,
    },
    BadgeRule {
        name: HOUR_HERO,
        description: "Focus for a total of 60 minutes",
        icon: "⌛",
        unlocks: has_focused_an_hour,
    },
];

fn has_focus_session(goal: &Goal) -> bool {
    !goal.timer_sessions().is_empty()
}

fn has_three_day_chain(goal: &Goal) -> bool {
    goal.habit_chain >= 3
}

fn has_five_milestones(goal: &Goal) -> bool {
    goal.completed_milestones() >= 5
}

fn has_ten_tasks(goal: &Goal) -> bool {
    goal.completed_tasks() >= 10
}

fn has_focused_an_hour(goal: &Goal) -> bool {
    goal.total_time_spent() >= 60
}

/// The five badges every new goal starts with, all locked.
pub fn default_badges() -> Vec<Badge> {
    RULES
        .iter()
        .map(|rule| Badge {
            id: new_id(),
            name: rule.name.to_string(),
            description: rule.description.to_string(),
            icon: rule.icon.to_string(),
            unlocked: false,
        })
        .collect()
}

/// Unlock every locked badge whose rule now holds.
///
/// Already unlocked badges are left alone and badges with unknown names
/// pass through untouched.
pub fn recompute_badges(goal: &Goal) -> Vec<Badge> {
    goal.badges
        .iter()
        .map(|badge| {
            let mut badge = badge.clone();
            if !badge.unlocked {
                if let Some(rule) = RULES.iter().find(|r| r.name == badge.name) {
                    badge.unlocked = (rule.unlocks)(goal);
                }
            }
            badge
        })
        .collect()
}

/// Names unlocked in `after` that were locked in `before`.
pub fn newly_unlocked(before: &[Badge], after: &[Badge]) -> Vec<String> {
    after
        .iter()
        .filter(|b| b.unlocked)
        .filter(|b| {
            !before
                .iter()
                .any(|old| old.name == b.name && old.unlocked)
        })
        .map(|b| b.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Milestone, Task, TimerSession};
    use chrono::NaiveDate;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn goal() -> Goal {
        Goal::new("Ship it", day("2024-12-31"), "because", vec![], vec![])
    }

    fn unlocked(badges: &[Badge]) -> Vec<&str> {
        badges
            .iter()
            .filter(|b| b.unlocked)
            .map(|b| b.name.as_str())
            .collect()
    }

    #[test]
    fn default_set_is_five_locked_badges() {
        let badges = default_badges();
        let names: Vec<_> = badges.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(
            names,
            vec![FIRST_FOCUS, CONSISTENT, MILESTONE_MASTER, TASK_TITAN, HOUR_HERO]
        );
        assert!(badges.iter().all(|b| !b.unlocked));
        assert_eq!(badges[4].icon, "⌛");
    }

    #[test]
    fn fresh_goal_unlocks_nothing() {
        assert!(unlocked(&recompute_badges(&goal())).is_empty());
    }

    #[test]
    fn first_focus_and_hour_hero_from_sessions() {
        let mut g = goal();
        g.push_session(TimerSession {
            date: day("2024-03-10"),
            duration: 30,
            goal_id: g.id.clone(),
            completed: true,
        });
        assert_eq!(unlocked(&recompute_badges(&g)), vec![FIRST_FOCUS]);

        g.push_session(TimerSession {
            date: day("2024-03-10"),
            duration: 30,
            goal_id: g.id.clone(),
            completed: true,
        });
        assert_eq!(unlocked(&recompute_badges(&g)), vec![FIRST_FOCUS, HOUR_HERO]);
    }

    #[test]
    fn count_thresholds() {
        let mut g = goal();
        g.tasks = (0..10).map(|i| Task::new(format!("t{i}"))).collect();
        g.milestones = (0..5).map(|i| Milestone::new(format!("m{i}"))).collect();
        for t in g.tasks.iter_mut().take(9) {
            t.toggle(day("2024-03-10"));
        }
        for m in g.milestones.iter_mut().take(4) {
            m.toggle();
        }
        assert!(unlocked(&recompute_badges(&g)).is_empty());

        g.tasks[9].toggle(day("2024-03-10"));
        g.milestones[4].toggle();
        assert_eq!(
            unlocked(&recompute_badges(&g)),
            vec![MILESTONE_MASTER, TASK_TITAN]
        );
    }

    #[test]
    fn consistent_needs_chain_of_three() {
        let mut g = goal();
        g.habit_chain = 2;
        assert!(unlocked(&recompute_badges(&g)).is_empty());
        g.habit_chain = 3;
        assert_eq!(unlocked(&recompute_badges(&g)), vec![CONSISTENT]);
    }

    #[test]
    fn recompute_is_idempotent_and_monotonic() {
        let mut g = goal();
        g.habit_chain = 4;
        g.badges = recompute_badges(&g);
        let again = recompute_badges(&g);
        assert_eq!(again, g.badges);

        // Chain breaks; badge stays.
        g.habit_chain = 0;
        g.badges = recompute_badges(&g);
        assert!(g.badge(CONSISTENT).unwrap().unlocked);
    }

    #[test]
    fn newly_unlocked_reports_only_transitions() {
        let mut g = goal();
        let before = g.badges.clone();
        g.habit_chain = 3;
        let after = recompute_badges(&g);
        assert_eq!(newly_unlocked(&before, &after), vec![CONSISTENT.to_string()]);
        assert!(newly_unlocked(&after, &after).is_empty());
    }
}
