use std::time::Duration;

use clap::Subcommand;
use serde::Serialize;
use streakly_core::clock::parse_day;
use streakly_core::gamification::calculate_completion;
use streakly_core::{Clock, Config, GoalDraft, GoalRef, Ticker};

use super::{open_tracker, or_goal_list, print_json, CliResult, CliTracker};

#[derive(Subcommand)]
pub enum GoalAction {
    /// Create a goal
    Add {
        /// Goal name
        #[arg(long)]
        name: String,
        /// Deadline (YYYY-MM-DD)
        #[arg(long)]
        deadline: String,
        /// Why the goal matters
        #[arg(long)]
        why: String,
        /// Task text (repeatable, at least one)
        #[arg(long = "task")]
        tasks: Vec<String>,
        /// Milestone text (repeatable)
        #[arg(long = "milestone")]
        milestones: Vec<String>,
    },
    /// List goals with their position
    List,
    /// Show a goal with completion, countdown and recent activity
    Show {
        /// Goal position or id
        goal: GoalRef,
    },
    /// Move the deadline
    Deadline {
        /// Goal position or id
        goal: GoalRef,
        /// New deadline (YYYY-MM-DD)
        date: String,
    },
    /// Print the time left until the deadline (DD:HH:MM:SS)
    Countdown {
        /// Goal position or id
        goal: GoalRef,
        /// Keep printing every second
        #[arg(long)]
        watch: bool,
        /// Stop watching after this many updates
        #[arg(long)]
        limit: Option<u64>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GoalSummary<'a> {
    index: usize,
    id: &'a str,
    name: &'a str,
    deadline: String,
    completion: u32,
    level: u32,
    xp: u64,
    streak: u32,
    habit_chain: u32,
}

/// Print the goal list, the fallback view for every failed lookup.
pub fn print_list(tracker: &CliTracker) -> CliResult {
    let goals = tracker.goals()?;
    let summaries: Vec<GoalSummary<'_>> = goals
        .iter()
        .enumerate()
        .map(|(index, goal)| GoalSummary {
            index,
            id: &goal.id,
            name: &goal.name,
            deadline: goal.deadline.to_string(),
            completion: calculate_completion(&goal.tasks, &goal.milestones),
            level: goal.level(),
            xp: goal.xp(),
            streak: goal.streak,
            habit_chain: goal.habit_chain,
        })
        .collect();
    print_json(&summaries)
}

pub async fn run(action: GoalAction, config: &Config) -> CliResult {
    let tracker = open_tracker(config)?;
    match action {
        GoalAction::Add {
            name,
            deadline,
            why,
            tasks,
            milestones,
        } => {
            let (index, goal) = tracker.add_goal(GoalDraft {
                name,
                deadline,
                why,
                tasks,
                milestones,
            })?;
            eprintln!("Goal created: #{index} {}", goal.name);
            print_json(&goal)?;
        }
        GoalAction::List => print_list(&tracker)?,
        GoalAction::Show { goal } => {
            let view = or_goal_list(&tracker, tracker.goal_view(&goal))?;
            print_json(&view)?;
        }
        GoalAction::Deadline { goal, date } => {
            let deadline = parse_day("deadline", &date)?;
            let updated = or_goal_list(&tracker, tracker.update_deadline(&goal, deadline))?;
            print_json(&updated)?;
        }
        GoalAction::Countdown { goal, watch, limit } => {
            let countdown = or_goal_list(&tracker, tracker.countdown(&goal))?;
            println!("{countdown}");
            if watch && !countdown.is_expired() {
                watch_countdown(&tracker, &goal, limit).await?;
            }
        }
    }
    Ok(())
}

async fn watch_countdown(tracker: &CliTracker, goal: &GoalRef, limit: Option<u64>) -> CliResult {
    let deadline = tracker.goal(goal)?.deadline;
    let mut ticker = Ticker::spawn(Duration::from_secs(1));
    // The first tick fires immediately; the current value is already shown.
    ticker.tick().await;

    let mut printed = 0u64;
    while ticker.tick().await.is_some() {
        let countdown = streakly_core::format_countdown(deadline, tracker.clock().now());
        println!("{countdown}");
        printed += 1;
        if countdown.is_expired() || limit.is_some_and(|max| printed >= max) {
            ticker.cancel();
        }
    }
    Ok(())
}
