use std::time::Duration;

use clap::Subcommand;
use streakly_core::clock::parse_day;
use streakly_core::{
    Clock, Config, FocusTimer, GoalRef, Ticker, TimerDurations, TimerEvent, TimerMode,
    TimerSession,
};

use super::{open_tracker, or_goal_list, print_json, CliResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run a focus block for a goal and record it when it finishes
    Run {
        /// Goal position or id
        goal: GoalRef,
        /// Focus minutes (1-60, defaults to timer.focus_minutes)
        #[arg(long)]
        focus: Option<u32>,
        /// Break minutes (1-30, defaults to timer.break_minutes)
        #[arg(long = "break")]
        break_minutes: Option<u32>,
        /// Run the break after the focus block
        #[arg(long)]
        with_break: bool,
    },
    /// Record a finished focus session without running the timer
    Record {
        /// Goal position or id
        goal: GoalRef,
        /// Session length in minutes
        minutes: u32,
        /// Day of the session (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
}

pub async fn run(action: TimerAction, config: &Config) -> CliResult {
    match action {
        TimerAction::Run {
            goal,
            focus,
            break_minutes,
            with_break,
        } => {
            let defaults = config.timer_durations()?;
            let durations = TimerDurations::new(
                focus.unwrap_or(defaults.focus_minutes()),
                break_minutes.unwrap_or(defaults.break_minutes()),
            )?;
            run_timer(config, &goal, durations, with_break).await
        }
        TimerAction::Record {
            goal,
            minutes,
            date,
        } => {
            let date = date.as_deref().map(|d| parse_day("date", d)).transpose()?;
            let mut tracker = open_tracker(config)?;
            let target = or_goal_list(&tracker, tracker.goal(&goal))?;
            let session = TimerSession {
                date: date.unwrap_or_else(|| tracker.clock().today()),
                duration: minutes,
                goal_id: target.id,
                completed: true,
            };
            let progress = tracker.on_session_complete(session)?;
            print_json(&progress)
        }
    }
}

async fn run_timer(
    config: &Config,
    goal: &GoalRef,
    durations: TimerDurations,
    with_break: bool,
) -> CliResult {
    let mut tracker = open_tracker(config)?;
    let target = or_goal_list(&tracker, tracker.goal(goal))?;
    let mut timer = FocusTimer::new(target.id.clone(), durations);
    timer.start(tracker.clock());
    tracing::info!(goal_id = %target.id, minutes = durations.focus_minutes(), "focus started");

    let mut ticker = Ticker::spawn(Duration::from_secs(1));
    while ticker.tick().await.is_some() {
        let label = match timer.mode() {
            TimerMode::Focus => "focus",
            TimerMode::Break => "break",
        };
        eprint!("\r{label} {}", timer.remaining_display());

        let Some(event) = timer.tick(tracker.clock()) else {
            continue;
        };
        eprintln!();
        let focus_done = matches!(event, TimerEvent::SessionComplete(_));
        if let Some(progress) = tracker.on_timer_event(&target.id, event)? {
            print_json(&progress)?;
        }
        if focus_done && with_break {
            timer.start(tracker.clock());
        } else {
            ticker.cancel();
        }
    }
    Ok(())
}
