//! Persisted entities: goals and their parts, and the singleton user.
//!
//! Every type deserializes leniently. Records written by older versions
//! lack the gamification fields (xp, badges, habit chain, timer sessions);
//! those fall back to their defaults instead of failing the whole load.
//! `level` and `totalTimeSpent` are projections and are recomputed by
//! [`Goal::normalize`] / [`User::normalize`] rather than trusted.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::gamification::{badges, level_for_xp};

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Result of flipping a task or milestone checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    /// pending -> done
    Completed,
    /// done -> pending
    Reopened,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<NaiveDate>,
}

impl Task {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            text: text.into(),
            completed: false,
            completed_date: None,
        }
    }

    /// Flip the task. Completing records `today` unless a date is already
    /// set; reopening clears the date.
    pub fn toggle(&mut self, today: NaiveDate) -> Transition {
        if self.completed {
            self.completed = false;
            self.completed_date = None;
            Transition::Reopened
        } else {
            self.completed = true;
            self.completed_date.get_or_insert(today);
            Transition::Completed
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

impl Milestone {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            text: text.into(),
            completed: false,
        }
    }

    pub fn toggle(&mut self) -> Transition {
        self.completed = !self.completed;
        if self.completed {
            Transition::Completed
        } else {
            Transition::Reopened
        }
    }
}

/// A finished focus session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSession {
    pub date: NaiveDate,
    /// Minutes, at least 1.
    pub duration: u32,
    #[serde(default)]
    pub goal_id: String,
    #[serde(default = "default_true")]
    pub completed: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    #[serde(default = "new_id")]
    pub id: String,
    /// Unique key; badges are matched by name, never by id.
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub unlocked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reflection {
    pub date: NaiveDate,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub what_went_well: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub what_to_improve: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub deadline: NaiveDate,
    pub why: String,
    pub tasks: Vec<Task>,
    pub milestones: Vec<Milestone>,
    /// At most one reflection per day.
    pub reflections: BTreeMap<NaiveDate, Reflection>,
    /// Consecutive days with a reflection saved on the day itself.
    pub streak: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reflection_date: Option<NaiveDate>,
    total_time_spent: u64,
    xp: u64,
    level: u32,
    pub badges: Vec<Badge>,
    /// Consecutive days with a completed task or focus session.
    pub habit_chain: u32,
    timer_sessions: Vec<TimerSession>,
}

impl Default for Goal {
    fn default() -> Self {
        Self {
            id: new_id(),
            name: String::new(),
            deadline: NaiveDate::default(),
            why: String::new(),
            tasks: Vec::new(),
            milestones: Vec::new(),
            reflections: BTreeMap::new(),
            streak: 0,
            last_reflection_date: None,
            total_time_spent: 0,
            xp: 0,
            level: 1,
            badges: badges::default_badges(),
            habit_chain: 0,
            timer_sessions: Vec::new(),
        }
    }
}

impl Goal {
    /// A fresh goal with every derived field zeroed.
    pub fn new(
        name: impl Into<String>,
        deadline: NaiveDate,
        why: impl Into<String>,
        tasks: Vec<Task>,
        milestones: Vec<Milestone>,
    ) -> Self {
        Self {
            name: name.into(),
            deadline,
            why: why.into(),
            tasks,
            milestones,
            ..Self::default()
        }
    }

    pub fn xp(&self) -> u64 {
        self.xp
    }

    /// Always `level_for_xp(xp)`.
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Always the sum of the recorded session durations.
    pub fn total_time_spent(&self) -> u64 {
        self.total_time_spent
    }

    pub fn timer_sessions(&self) -> &[TimerSession] {
        &self.timer_sessions
    }

    pub(crate) fn add_xp(&mut self, amount: u64) {
        self.xp = self.xp.saturating_add(amount);
        self.level = level_for_xp(self.xp);
    }

    pub(crate) fn push_session(&mut self, session: TimerSession) {
        self.total_time_spent = self.total_time_spent.saturating_add(session.duration as u64);
        self.timer_sessions.push(session);
    }

    pub fn completed_tasks(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    pub fn completed_milestones(&self) -> usize {
        self.milestones.iter().filter(|m| m.completed).count()
    }

    pub fn task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == task_id)
    }

    pub fn milestone_mut(&mut self, milestone_id: &str) -> Option<&mut Milestone> {
        self.milestones.iter_mut().find(|m| m.id == milestone_id)
    }

    pub fn badge(&self, name: &str) -> Option<&Badge> {
        self.badges.iter().find(|b| b.name == name)
    }

    pub fn unlocked_badges(&self) -> impl Iterator<Item = &Badge> {
        self.badges.iter().filter(|b| b.unlocked)
    }

    /// Repair a record loaded from storage.
    ///
    /// Recomputes the projections (`level`, `totalTimeSpent`) and merges in
    /// any default badge the record does not carry yet. Returns true when
    /// anything changed.
    pub fn normalize(&mut self) -> bool {
        let mut changed = false;

        let level = level_for_xp(self.xp);
        if level != self.level {
            self.level = level;
            changed = true;
        }

        // Records without session history keep their stored total.
        if !self.timer_sessions.is_empty() {
            let total: u64 = self.timer_sessions.iter().map(|s| s.duration as u64).sum();
            if total != self.total_time_spent {
                self.total_time_spent = total;
                changed = true;
            }
        }

        for badge in badges::default_badges() {
            if self.badge(&badge.name).is_none() {
                self.badges.push(badge);
                changed = true;
            }
        }

        changed
    }
}

/// Cross-goal totals; one per installation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub daily_xp: u64,
    total_xp: u64,
    level: u32,
    pub badges: Vec<Badge>,
}

impl Default for User {
    fn default() -> Self {
        Self {
            daily_xp: 0,
            total_xp: 0,
            level: 1,
            badges: Vec::new(),
        }
    }
}

impl User {
    pub fn total_xp(&self) -> u64 {
        self.total_xp
    }

    /// Always `level_for_xp(total_xp)`.
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Credit XP to both the daily and the all-time counters.
    pub(crate) fn add_xp(&mut self, amount: u64) {
        self.total_xp = self.total_xp.saturating_add(amount);
        self.daily_xp = self.daily_xp.saturating_add(amount);
        self.level = level_for_xp(self.total_xp);
    }

    pub fn normalize(&mut self) -> bool {
        let level = level_for_xp(self.total_xp);
        let changed = level != self.level;
        self.level = level;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn task_completion_date_is_set_and_cleared() {
        let mut task = Task::new("write intro");
        assert_eq!(task.toggle(day("2024-03-10")), Transition::Completed);
        assert_eq!(task.completed_date, Some(day("2024-03-10")));

        assert_eq!(task.toggle(day("2024-03-11")), Transition::Reopened);
        assert!(!task.completed);
        assert_eq!(task.completed_date, None);

        task.toggle(day("2024-03-12"));
        assert_eq!(task.completed_date, Some(day("2024-03-12")));
    }

    #[test]
    fn first_completion_date_is_sticky() {
        let mut task = Task::new("pre-dated");
        task.completed_date = Some(day("2024-03-01"));
        task.toggle(day("2024-03-10"));
        assert_eq!(task.completed_date, Some(day("2024-03-01")));
    }

    #[test]
    fn new_goal_has_zeroed_derived_fields() {
        let goal = Goal::new("Run", day("2024-12-31"), "health", vec![], vec![]);
        assert_eq!(goal.xp(), 0);
        assert_eq!(goal.level(), 1);
        assert_eq!(goal.streak, 0);
        assert_eq!(goal.habit_chain, 0);
        assert_eq!(goal.total_time_spent(), 0);
        assert!(goal.timer_sessions().is_empty());
        assert_eq!(goal.badges.len(), 5);
        assert!(goal.badges.iter().all(|b| !b.unlocked));
    }

    #[test]
    fn legacy_goal_record_gets_defaults() {
        let json = r#"{
            "id": "abc1234",
            "name": "Learn Rust",
            "deadline": "2024-12-31",
            "why": "fun",
            "tasks": [{"id": "t1", "text": "read book", "completed": true}],
            "milestones": [],
            "reflections": {},
            "streak": 2
        }"#;
        let mut goal: Goal = serde_json::from_str(json).unwrap();
        goal.normalize();
        assert_eq!(goal.name, "Learn Rust");
        assert_eq!(goal.streak, 2);
        assert_eq!(goal.xp(), 0);
        assert_eq!(goal.level(), 1);
        assert_eq!(goal.habit_chain, 0);
        assert!(goal.timer_sessions().is_empty());
        assert_eq!(goal.badges.len(), 5);
        assert_eq!(goal.tasks[0].completed_date, None);
    }

    #[test]
    fn normalize_recomputes_projections() {
        let json = r#"{
            "name": "Stale",
            "deadline": "2024-12-31",
            "xp": 400,
            "level": 1,
            "totalTimeSpent": 3,
            "badges": [{"id": "x", "name": "Hour Hero", "description": "", "icon": "", "unlocked": true}],
            "timerSessions": [
                {"date": "2024-03-10", "duration": 20, "goalId": "g", "completed": true},
                {"date": "2024-03-11", "duration": 25, "goalId": "g", "completed": true}
            ]
        }"#;
        let mut goal: Goal = serde_json::from_str(json).unwrap();
        assert!(goal.normalize());
        assert_eq!(goal.level(), 6);
        assert_eq!(goal.total_time_spent(), 45);
        assert_eq!(goal.badges.len(), 5);
        assert!(goal.badge("Hour Hero").unwrap().unlocked);
        assert!(!goal.normalize());
    }

    #[test]
    fn goal_serializes_camel_case() {
        let goal = Goal::new("Run", day("2024-12-31"), "health", vec![], vec![]);
        let json = serde_json::to_value(&goal).unwrap();
        for key in ["totalTimeSpent", "habitChain", "timerSessions", "xp", "level"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["deadline"], "2024-12-31");
    }

    #[test]
    fn reflections_keyed_by_day_string() {
        let mut goal = Goal::new("Run", day("2024-12-31"), "health", vec![], vec![]);
        goal.reflections.insert(
            day("2024-03-10"),
            Reflection {
                date: day("2024-03-10"),
                content: "ok".into(),
                what_went_well: None,
                what_to_improve: None,
            },
        );
        let json = serde_json::to_string(&goal).unwrap();
        assert!(json.contains(r#""2024-03-10":{"date":"2024-03-10""#));
        let back: Goal = serde_json::from_str(&json).unwrap();
        assert_eq!(back.reflections.len(), 1);
    }

    #[test]
    fn user_level_tracks_total_xp() {
        let mut user = User::default();
        user.add_xp(40);
        assert_eq!(user.level(), 2);
        assert_eq!(user.daily_xp, 40);
        assert_eq!(user.total_xp(), 40);
    }
}
