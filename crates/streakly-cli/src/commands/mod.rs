pub mod config;
pub mod goal;
pub mod milestone;
pub mod reflect;
pub mod task;
pub mod timer;
pub mod user;

use serde::Serialize;
use streakly_core::storage::Database;
use streakly_core::{
    Config, CoreError, Event, Notifier, RandomRewards, SilentNotifier, SystemClock, Tracker,
};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

pub type CliTracker = Tracker<Database, SystemClock>;

/// Prints every notification as one JSON line on stderr, keeping stdout
/// for command output.
pub struct JsonNotifier;

impl Notifier for JsonNotifier {
    fn notify(&self, event: &Event) {
        match serde_json::to_string(event) {
            Ok(line) => eprintln!("{line}"),
            Err(e) => tracing::warn!("could not encode {} event: {e}", event.kind()),
        }
    }
}

/// Open the store and build a tracker wired to the config, with the daily
/// reset already applied.
pub fn open_tracker(config: &Config) -> Result<CliTracker, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let tracker = Tracker::new(db, SystemClock).with_rewards(RandomRewards::new(config.rewards.seed));
    let tracker = if config.notifications.enabled {
        tracker.with_notifier(JsonNotifier)
    } else {
        tracker.with_notifier(SilentNotifier)
    };
    tracker.start_session()?;
    Ok(tracker)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

/// On a reference to a goal, task or milestone that does not exist, show
/// the goal list before reporting the error.
pub fn or_goal_list<T>(
    tracker: &CliTracker,
    result: Result<T, CoreError>,
) -> Result<T, Box<dyn std::error::Error>> {
    match result {
        Ok(value) => Ok(value),
        Err(e) if e.is_missing_entity() => {
            goal::print_list(tracker)?;
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}
