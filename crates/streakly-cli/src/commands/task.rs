use clap::Subcommand;
use streakly_core::{Config, GoalRef};

use super::{open_tracker, or_goal_list, print_json, CliResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Mark a task done, or pending again if it is done
    Toggle {
        /// Goal position or id
        goal: GoalRef,
        /// Task id
        task_id: String,
    },
}

pub fn run(action: TaskAction, config: &Config) -> CliResult {
    let mut tracker = open_tracker(config)?;
    match action {
        TaskAction::Toggle { goal, task_id } => {
            let result = tracker.toggle_task(&goal, &task_id);
            let progress = or_goal_list(&tracker, result)?;
            print_json(&progress)?;
        }
    }
    Ok(())
}
