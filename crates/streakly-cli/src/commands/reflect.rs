use clap::Args;
use streakly_core::clock::parse_day;
use streakly_core::{Config, GoalRef, ReflectionDraft};

use super::{open_tracker, or_goal_list, print_json, CliResult};

#[derive(Args)]
pub struct ReflectArgs {
    /// Goal position or id
    goal: GoalRef,
    /// What happened today
    #[arg(long)]
    content: String,
    /// Day the reflection is for (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    date: Option<String>,
    /// What went well
    #[arg(long)]
    went_well: Option<String>,
    /// What to improve
    #[arg(long)]
    improve: Option<String>,
}

pub fn run(args: ReflectArgs, config: &Config) -> CliResult {
    let date = args.date.as_deref().map(|d| parse_day("date", d)).transpose()?;
    let mut tracker = open_tracker(config)?;
    let result = tracker.save_reflection(
        &args.goal,
        ReflectionDraft {
            date,
            content: args.content,
            what_went_well: args.went_well,
            what_to_improve: args.improve,
        },
    );
    let goal = or_goal_list(&tracker, result)?;
    eprintln!("Reflection saved! Streak: {}", goal.streak);
    print_json(&goal)
}
