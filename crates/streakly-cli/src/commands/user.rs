use clap::Subcommand;
use streakly_core::Config;

use super::{open_tracker, print_json, CliResult};

#[derive(Subcommand)]
pub enum UserAction {
    /// Show XP, level and today's progress
    Show,
}

pub fn run(action: UserAction, config: &Config) -> CliResult {
    let tracker = open_tracker(config)?;
    match action {
        UserAction::Show => print_json(&tracker.user()?)?,
    }
    Ok(())
}
