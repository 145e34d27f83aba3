use std::cell::RefCell;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::gamification::AwardSource;
use crate::rewards::Reward;

/// Whose level changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelScope {
    Goal,
    User,
}

/// Everything the tracker announces to the outside world.
/// Front-ends render them; nothing in the core depends on delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Event {
    LevelUp {
        scope: LevelScope,
        goal_id: Option<String>,
        level: u32,
        at: NaiveDateTime,
    },
    Reward {
        source: AwardSource,
        xp: u64,
        reward: Reward,
        at: NaiveDateTime,
    },
    BreakOver {
        goal_id: String,
        at: NaiveDateTime,
    },
    ReflectionSaved {
        goal_id: String,
        date: NaiveDate,
        streak: u32,
        at: NaiveDateTime,
    },
}

impl Event {
    /// Wire name of the event kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::LevelUp { .. } => "levelUp",
            Event::Reward { .. } => "reward",
            Event::BreakOver { .. } => "breakOver",
            Event::ReflectionSaved { .. } => "reflectionSaved",
        }
    }
}

/// Fire-and-forget notification sink.
pub trait Notifier {
    fn notify(&self, event: &Event);
}

/// Writes events to the `tracing` log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, event: &Event) {
        match event {
            Event::LevelUp { scope, level, .. } => {
                tracing::info!(?scope, level, "level up");
            }
            Event::Reward { source, xp, reward, .. } => {
                tracing::info!(?source, xp, kind = ?reward.kind, "{}", reward.title);
            }
            Event::BreakOver { goal_id, .. } => {
                tracing::info!(goal_id = %goal_id, "break finished");
            }
            Event::ReflectionSaved { goal_id, date, streak, .. } => {
                tracing::info!(goal_id = %goal_id, %date, streak, "reflection saved");
            }
        }
    }
}

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _event: &Event) {}
}

/// Keeps every event in memory, in order.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: RefCell<Vec<Event>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.events.borrow().iter().map(Event::kind).collect()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: &Event) {
        self.events.borrow_mut().push(event.clone());
    }
}

impl<N: Notifier + ?Sized> Notifier for std::rc::Rc<N> {
    fn notify(&self, event: &Event) {
        (**self).notify(event)
    }
}
