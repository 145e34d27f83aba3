//! Application service tying the aggregates to the gamification engine.
//!
//! Every mutating operation is one synchronous read-modify-write cycle:
//! load the user (which applies the daily reset) and the goals, compute the
//! next state, write both back, then notify. There is a single logical
//! writer; nothing is held between calls except the injected collaborators.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::countdown::{format_countdown, Countdown};
use crate::error::{CoreError, Result, ValidationError};
use crate::events::{Event, LevelScope, Notifier, TracingNotifier};
use crate::gamification::{
    activity_heatmap, apply_reflection_streak, award_milestone_completion, award_task_completion,
    award_timer_session, calculate_completion, compute_habit_chain, daily_progress_pct,
    xp_for_next_level, Award, AwardSource, DayActivity,
};
use crate::goals::{GoalDraft, GoalManager, GoalRef};
use crate::model::{Goal, Reflection, TimerSession, Transition, User};
use crate::rewards::{choose_reward, RandomRewards, Reward, RewardPicker};
use crate::storage::KvStore;
use crate::timer::TimerEvent;
use crate::user::UserManager;

/// Days shown in the activity heatmap.
pub const HEATMAP_DAYS: u32 = 7;

/// Longest session accepted from outside the timer, in minutes.
pub const MAX_SESSION_MINUTES: u32 = 24 * 60;

/// Result of a completion toggle or a recorded session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub transition: Transition,
    pub goal: Goal,
    pub user: User,
    pub xp_gained: u64,
    pub leveled_up: bool,
    pub unlocked_badges: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward: Option<Reward>,
}

/// A reflection as entered by the user.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReflectionDraft {
    pub date: Option<NaiveDate>,
    pub content: String,
    pub what_went_well: Option<String>,
    pub what_to_improve: Option<String>,
}

/// Goal detail with its read projections.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalView {
    pub index: usize,
    pub completion: u32,
    pub countdown: String,
    pub expired: bool,
    pub heatmap: Vec<DayActivity>,
    pub goal: Goal,
}

/// User record with its daily target.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub xp_for_next_level: u64,
    pub daily_progress_pct: u32,
    pub user: User,
}

pub struct Tracker<S, C> {
    store: S,
    clock: C,
    rewards: Box<dyn RewardPicker>,
    notifier: Box<dyn Notifier>,
}

impl<S: KvStore, C: Clock> Tracker<S, C> {
    /// Tracker with entropy-seeded rewards and log notifications.
    pub fn new(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            rewards: Box::new(RandomRewards::default()),
            notifier: Box::new(TracingNotifier),
        }
    }

    pub fn with_rewards(mut self, rewards: impl RewardPicker + 'static) -> Self {
        self.rewards = Box::new(rewards);
        self
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    // ── Session ──────────────────────────────────────────────────────

    /// Apply the daily reset and write back any repaired goal records.
    pub fn start_session(&self) -> Result<User> {
        let users = UserManager::load(&self.store, self.clock.today())?;
        let goals = GoalManager::load(&self.store)?;
        if goals.was_repaired() {
            goals.save(&self.store)?;
        }
        Ok(users.into_user())
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn goals(&self) -> Result<Vec<Goal>> {
        Ok(GoalManager::load(&self.store)?.goals().to_vec())
    }

    pub fn goal(&self, reference: &GoalRef) -> Result<Goal> {
        Ok(GoalManager::load(&self.store)?.get(reference)?.clone())
    }

    pub fn goal_view(&self, reference: &GoalRef) -> Result<GoalView> {
        let goals = GoalManager::load(&self.store)?;
        let index = goals.resolve(reference)?;
        let goal = goals.goals()[index].clone();
        let now = self.clock.now();
        let countdown = format_countdown(goal.deadline, now);
        Ok(GoalView {
            index,
            completion: calculate_completion(&goal.tasks, &goal.milestones),
            countdown: countdown.to_string(),
            expired: countdown.is_expired(),
            heatmap: activity_heatmap(&goal, now.date(), HEATMAP_DAYS),
            goal,
        })
    }

    pub fn countdown(&self, reference: &GoalRef) -> Result<Countdown> {
        let goal = self.goal(reference)?;
        Ok(format_countdown(goal.deadline, self.clock.now()))
    }

    pub fn heatmap(&self, reference: &GoalRef, days: u32) -> Result<Vec<DayActivity>> {
        let goal = self.goal(reference)?;
        Ok(activity_heatmap(&goal, self.clock.today(), days))
    }

    /// The user after the daily reset for today.
    pub fn user(&self) -> Result<UserView> {
        let user = UserManager::load(&self.store, self.clock.today())?.into_user();
        Ok(UserView {
            xp_for_next_level: xp_for_next_level(&user),
            daily_progress_pct: daily_progress_pct(&user),
            user,
        })
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Validate and append a goal; returns its position and record.
    pub fn add_goal(&self, draft: GoalDraft) -> Result<(usize, Goal)> {
        let mut goals = GoalManager::load(&self.store)?;
        let index = goals.add(draft)?;
        goals.save(&self.store)?;
        Ok((index, goals.goals()[index].clone()))
    }

    pub fn update_deadline(&self, reference: &GoalRef, deadline: NaiveDate) -> Result<Goal> {
        let mut goals = GoalManager::load(&self.store)?;
        let goal = goals.get_mut(reference)?;
        goal.deadline = deadline;
        let goal = goal.clone();
        goals.save(&self.store)?;
        tracing::info!(goal_id = %goal.id, %deadline, "deadline updated");
        Ok(goal)
    }

    /// Flip a task between pending and done. Completing awards XP;
    /// reopening clears the date and keeps the XP.
    pub fn toggle_task(&mut self, reference: &GoalRef, task_id: &str) -> Result<Progress> {
        let today = self.clock.today();
        let users = UserManager::load(&self.store, today)?;
        let goals = GoalManager::load(&self.store)?;
        let index = goals.resolve(reference)?;

        let mut goal = goals.goals()[index].clone();
        let goal_id = goal.id.clone();
        let task = goal.task_mut(task_id).ok_or_else(|| CoreError::TaskNotFound {
            goal_id,
            task_id: task_id.to_string(),
        })?;
        let transition = task.toggle(today);

        let cycle = Cycle::new(goals, users, index, today);
        self.settle(cycle, goal, transition, |goal, user| {
            award_task_completion(goal, user, today)
        })
    }

    /// Flip a milestone between pending and done. Completing awards XP.
    pub fn toggle_milestone(&mut self, reference: &GoalRef, milestone_id: &str) -> Result<Progress> {
        let today = self.clock.today();
        let users = UserManager::load(&self.store, today)?;
        let goals = GoalManager::load(&self.store)?;
        let index = goals.resolve(reference)?;

        let mut goal = goals.goals()[index].clone();
        let goal_id = goal.id.clone();
        let milestone = goal
            .milestone_mut(milestone_id)
            .ok_or_else(|| CoreError::MilestoneNotFound {
                goal_id,
                milestone_id: milestone_id.to_string(),
            })?;
        let transition = milestone.toggle();

        let cycle = Cycle::new(goals, users, index, today);
        self.settle(cycle, goal, transition, |goal, user| {
            award_milestone_completion(goal, user, today)
        })
    }

    /// Credit a finished focus session to the goal named by its `goal_id`.
    pub fn on_session_complete(&mut self, session: TimerSession) -> Result<Progress> {
        if !(1..=MAX_SESSION_MINUTES).contains(&session.duration) {
            return Err(ValidationError::OutOfRange {
                field: "duration".to_string(),
                value: session.duration as u64,
                min: 1,
                max: MAX_SESSION_MINUTES as u64,
            }
            .into());
        }

        let today = self.clock.today();
        if session.date > today {
            return Err(ValidationError::InvalidValue {
                field: "date".to_string(),
                message: format!("{} is in the future", session.date),
            }
            .into());
        }

        let users = UserManager::load(&self.store, today)?;
        let goals = GoalManager::load(&self.store)?;
        let index = goals.resolve(&GoalRef::Id(session.goal_id.clone()))?;
        let goal = goals.goals()[index].clone();

        let cycle = Cycle::new(goals, users, index, today);
        self.settle(cycle, goal, Transition::Completed, |goal, user| {
            award_timer_session(goal, user, session, today)
        })
    }

    /// Route a timer expiry: sessions are recorded, break ends are announced.
    pub fn on_timer_event(&mut self, goal_id: &str, event: TimerEvent) -> Result<Option<Progress>> {
        match event {
            TimerEvent::SessionComplete(session) => self.on_session_complete(session).map(Some),
            TimerEvent::BreakOver => {
                self.notifier.notify(&Event::BreakOver {
                    goal_id: goal_id.to_string(),
                    at: self.clock.now(),
                });
                Ok(None)
            }
        }
    }

    /// Store a reflection and advance the streak when it is for today.
    pub fn save_reflection(&mut self, reference: &GoalRef, draft: ReflectionDraft) -> Result<Goal> {
        let today = self.clock.today();
        let content = draft.content.trim();
        if content.is_empty() {
            return Err(ValidationError::EmptyField("content".to_string()).into());
        }
        let date = draft.date.unwrap_or(today);
        if date > today {
            return Err(ValidationError::InvalidValue {
                field: "date".to_string(),
                message: format!("{date} is in the future"),
            }
            .into());
        }

        let mut goals = GoalManager::load(&self.store)?;
        let goal = goals.get_mut(reference)?;
        goal.reflections.insert(
            date,
            Reflection {
                date,
                content: content.to_string(),
                what_went_well: non_empty(draft.what_went_well),
                what_to_improve: non_empty(draft.what_to_improve),
            },
        );
        apply_reflection_streak(goal, date, today);
        let goal = goal.clone();
        goals.save(&self.store)?;

        self.notifier.notify(&Event::ReflectionSaved {
            goal_id: goal.id.clone(),
            date,
            streak: goal.streak,
            at: self.clock.now(),
        });
        Ok(goal)
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Apply the award for a completion (or just refresh the chain for a
    /// reopen), persist both aggregates and announce the result.
    fn settle(
        &mut self,
        cycle: Cycle,
        mut goal: Goal,
        transition: Transition,
        award: impl FnOnce(Goal, User) -> Award,
    ) -> Result<Progress> {
        let Cycle {
            mut goals,
            mut users,
            index,
            today,
        } = cycle;

        if transition == Transition::Reopened {
            goal.habit_chain = compute_habit_chain(&goal, today);
            goals.replace(index, goal.clone());
            goals.save(&self.store)?;
            return Ok(Progress {
                transition,
                goal,
                user: users.into_user(),
                xp_gained: 0,
                leveled_up: false,
                unlocked_badges: Vec::new(),
                reward: None,
            });
        }

        let award = award(goal, users.user().clone());
        goals.replace(index, award.goal.clone());
        goals.save(&self.store)?;
        users.replace(award.user.clone());
        users.save(&self.store)?;

        let reward = choose_reward(self.rewards.as_mut(), award.source, award.xp);
        self.announce(&award, &reward);

        Ok(Progress {
            transition,
            leveled_up: award.leveled_up(),
            xp_gained: award.xp,
            unlocked_badges: award.unlocked_badges,
            reward: Some(reward),
            goal: award.goal,
            user: award.user,
        })
    }

    fn announce(&self, award: &Award, reward: &Reward) {
        let at = self.clock.now();
        self.notifier.notify(&Event::Reward {
            source: award.source,
            xp: award.xp,
            reward: reward.clone(),
            at,
        });
        if award.goal_leveled_up {
            self.notifier.notify(&Event::LevelUp {
                scope: LevelScope::Goal,
                goal_id: Some(award.goal.id.clone()),
                level: award.goal.level(),
                at,
            });
        }
        if award.user_leveled_up {
            self.notifier.notify(&Event::LevelUp {
                scope: LevelScope::User,
                goal_id: None,
                level: award.user.level(),
                at,
            });
        }
        if award.source == AwardSource::Timer {
            tracing::info!(goal_id = %award.goal.id, minutes = award.xp, "focus session recorded");
        }
    }
}

/// State loaded at the start of one read-modify-write cycle.
struct Cycle {
    goals: GoalManager,
    users: UserManager,
    index: usize,
    today: NaiveDate,
}

impl Cycle {
    fn new(goals: GoalManager, users: UserManager, index: usize, today: NaiveDate) -> Self {
        Self {
            goals,
            users,
            index,
            today,
        }
    }
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}
