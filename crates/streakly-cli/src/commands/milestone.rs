use clap::Subcommand;
use streakly_core::{Config, GoalRef};

use super::{open_tracker, or_goal_list, print_json, CliResult};

#[derive(Subcommand)]
pub enum MilestoneAction {
    /// Mark a milestone done, or pending again if it is done
    Toggle {
        /// Goal position or id
        goal: GoalRef,
        /// Milestone id
        milestone_id: String,
    },
}

pub fn run(action: MilestoneAction, config: &Config) -> CliResult {
    let mut tracker = open_tracker(config)?;
    match action {
        MilestoneAction::Toggle { goal, milestone_id } => {
            let result = tracker.toggle_milestone(&goal, &milestone_id);
            let progress = or_goal_list(&tracker, result)?;
            print_json(&progress)?;
        }
    }
    Ok(())
}
