//! Goal aggregate: loading, saving, lookup and creation.
//!
//! Goals persist as one ordered JSON array under [`GOALS_KEY`]. Loading is
//! lenient per element: missing fields take their defaults and derived
//! fields are recomputed. Entries that cannot be read as a goal at all are
//! kept verbatim and written back after the readable ones.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::clock::parse_day;
use crate::error::{CoreError, Result, ValidationError};
use crate::model::{Goal, Milestone, Task};
use crate::storage::{KvStore, GOALS_KEY};

/// How callers point at a goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoalRef {
    /// Array position, the legacy external identifier.
    Index(usize),
    /// Stable goal id.
    Id(String),
}

impl FromStr for GoalRef {
    type Err = Infallible;

    /// Numeric references are positions; anything else is an id.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.parse::<usize>() {
            Ok(index) => GoalRef::Index(index),
            Err(_) => GoalRef::Id(s.to_string()),
        })
    }
}

impl fmt::Display for GoalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoalRef::Index(i) => write!(f, "#{i}"),
            GoalRef::Id(id) => f.write_str(id),
        }
    }
}

impl From<usize> for GoalRef {
    fn from(index: usize) -> Self {
        GoalRef::Index(index)
    }
}

/// Raw input for a new goal, as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct GoalDraft {
    pub name: String,
    pub deadline: String,
    pub why: String,
    pub tasks: Vec<String>,
    pub milestones: Vec<String>,
}

impl GoalDraft {
    /// Check the draft and build the goal.
    ///
    /// Name, deadline and why are required; at least one task must have
    /// text. Blank tasks and milestones are dropped.
    pub fn validate(self) -> Result<Goal, ValidationError> {
        let name = required("name", &self.name)?;
        let why = required("why", &self.why)?;
        let deadline = parse_day("deadline", &self.deadline)?;

        let tasks: Vec<Task> = non_blank(&self.tasks).map(Task::new).collect();
        if tasks.is_empty() {
            return Err(ValidationError::EmptyField("tasks".to_string()));
        }
        let milestones = non_blank(&self.milestones).map(Milestone::new).collect();

        Ok(Goal::new(name, deadline, why, tasks, milestones))
    }
}

fn required(field: &str, value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::EmptyField(field.to_string()));
    }
    Ok(value.to_string())
}

fn non_blank(items: &[String]) -> impl Iterator<Item = &str> {
    items.iter().map(|s| s.trim()).filter(|s| !s.is_empty())
}

/// In-memory goal list, read from and written back to a [`KvStore`].
#[derive(Debug, Clone, Default)]
pub struct GoalManager {
    goals: Vec<Goal>,
    /// Entries that could not be read, with their position in the stored
    /// array. They are written back in place, untouched.
    unreadable: Vec<(usize, Value)>,
    repaired: bool,
}

impl GoalManager {
    pub fn new(goals: Vec<Goal>) -> Self {
        Self {
            goals,
            ..Self::default()
        }
    }

    /// Load and repair the persisted goal list. An absent key is an empty
    /// list.
    pub fn load(store: &dyn KvStore) -> Result<Self> {
        let Some(raw) = store.get(GOALS_KEY)? else {
            return Ok(Self::default());
        };

        let entries = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(entries)) => entries,
            Ok(Value::Null) => Vec::new(),
            Ok(other) => {
                tracing::warn!(kind = %json_kind(&other), "stored goals are not a list, keeping as-is");
                return Ok(Self::keeping(other));
            }
            Err(e) => {
                tracing::warn!(error = %e, "stored goals are not valid JSON, keeping the raw text");
                return Ok(Self::keeping(Value::String(raw)));
            }
        };

        let mut manager = Self::default();
        for (position, entry) in entries.into_iter().enumerate() {
            let missing_id = entry.get("id").and_then(Value::as_str).is_none();
            if !entry.is_object() {
                tracing::warn!(position, kind = %json_kind(&entry), "skipping goal entry");
                manager.unreadable.push((position, entry));
                continue;
            }
            match serde_json::from_value::<Goal>(entry.clone()) {
                Ok(mut goal) => {
                    if goal.normalize() || missing_id {
                        tracing::debug!(position, goal_id = %goal.id, "repaired goal record");
                        manager.repaired = true;
                    }
                    manager.goals.push(goal);
                }
                Err(e) => {
                    tracing::warn!(position, error = %e, "goal entry could not be read");
                    manager.unreadable.push((position, entry));
                }
            }
        }
        Ok(manager)
    }

    fn keeping(value: Value) -> Self {
        Self {
            unreadable: vec![(0, value)],
            ..Self::default()
        }
    }

    /// Persist the full list. Unreadable entries keep their stored
    /// positions; readable goals fill the rest in order.
    pub fn save(&self, store: &dyn KvStore) -> Result<()> {
        let total = self.goals.len() + self.unreadable.len();
        let mut entries = Vec::with_capacity(total);
        let mut goals = self.goals.iter();
        let mut kept = self.unreadable.iter().peekable();
        while entries.len() < total {
            let position = entries.len();
            match kept.next_if(|(at, _)| *at <= position) {
                Some((_, value)) => entries.push(value.clone()),
                None => match goals.next() {
                    Some(goal) => entries.push(serde_json::to_value(goal)?),
                    None => entries.extend(kept.by_ref().map(|(_, value)| value.clone())),
                },
            }
        }
        store.set(GOALS_KEY, &serde_json::to_string(&entries)?)?;
        Ok(())
    }

    /// True when loading filled in defaults or recomputed derived fields.
    pub fn was_repaired(&self) -> bool {
        self.repaired
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    /// Position of the referenced goal.
    pub fn resolve(&self, reference: &GoalRef) -> Result<usize> {
        let found = match reference {
            GoalRef::Index(index) => (*index < self.goals.len()).then_some(*index),
            GoalRef::Id(id) => self.goals.iter().position(|g| g.id == *id),
        };
        found.ok_or_else(|| CoreError::GoalNotFound {
            reference: reference.to_string(),
        })
    }

    pub fn get(&self, reference: &GoalRef) -> Result<&Goal> {
        let index = self.resolve(reference)?;
        Ok(&self.goals[index])
    }

    pub fn get_mut(&mut self, reference: &GoalRef) -> Result<&mut Goal> {
        let index = self.resolve(reference)?;
        Ok(&mut self.goals[index])
    }

    /// Validate and append a new goal; returns its position.
    pub fn add(&mut self, draft: GoalDraft) -> Result<usize> {
        let goal = draft.validate()?;
        tracing::info!(goal_id = %goal.id, name = %goal.name, "goal created");
        self.goals.push(goal);
        Ok(self.goals.len() - 1)
    }

    /// Swap in the next state of the goal at `index`.
    pub fn replace(&mut self, index: usize, goal: Goal) -> Goal {
        std::mem::replace(&mut self.goals[index], goal)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn draft() -> GoalDraft {
        GoalDraft {
            name: "  Ship the book ".into(),
            deadline: "2025-06-01".into(),
            why: "Because".into(),
            tasks: vec!["outline".into(), "   ".into(), "draft".into()],
            milestones: vec!["".into(), "first chapter".into()],
        }
    }

    #[test]
    fn parses_references() {
        assert_eq!("3".parse::<GoalRef>().unwrap(), GoalRef::Index(3));
        assert_eq!(
            "a1b2".parse::<GoalRef>().unwrap(),
            GoalRef::Id("a1b2".to_string())
        );
    }

    #[test]
    fn draft_filters_blank_items() {
        let goal = draft().validate().unwrap();
        assert_eq!(goal.name, "Ship the book");
        assert_eq!(goal.tasks.len(), 2);
        assert_eq!(goal.milestones.len(), 1);
        assert_eq!(goal.level(), 1);
        assert_eq!(goal.badges.len(), 5);
    }

    #[test]
    fn draft_requires_a_real_task() {
        let mut d = draft();
        d.tasks = vec!["".into(), "  ".into()];
        assert_eq!(
            d.validate().unwrap_err(),
            ValidationError::EmptyField("tasks".into())
        );

        let mut d = draft();
        d.why = " ".into();
        assert_eq!(
            d.validate().unwrap_err(),
            ValidationError::EmptyField("why".into())
        );

        let mut d = draft();
        d.deadline = "06/01/2025".into();
        assert!(matches!(
            d.validate(),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn resolves_by_index_and_id() {
        let mut manager = GoalManager::default();
        manager.add(draft()).unwrap();
        manager.add(draft()).unwrap();
        let id = manager.goals()[1].id.clone();

        assert_eq!(manager.resolve(&GoalRef::Index(0)).unwrap(), 0);
        assert_eq!(manager.resolve(&GoalRef::Id(id)).unwrap(), 1);
        let err = manager.resolve(&GoalRef::Index(2)).unwrap_err();
        assert!(err.is_missing_entity());
        assert!(manager.resolve(&GoalRef::Id("nope".into())).is_err());
    }

    #[test]
    fn save_then_load_keeps_order() {
        let store = MemoryStore::new();
        let mut manager = GoalManager::default();
        manager.add(draft()).unwrap();
        let mut second = draft();
        second.name = "Run a marathon".into();
        manager.add(second).unwrap();
        manager.save(&store).unwrap();

        let loaded = GoalManager::load(&store).unwrap();
        assert_eq!(loaded.goals(), manager.goals());
        assert!(!loaded.was_repaired());
    }

    #[test]
    fn malformed_records_are_repaired_not_dropped() {
        let store = MemoryStore::new().with_entry(
            GOALS_KEY,
            r#"[
                {"name": "Legacy", "deadline": "2025-01-01", "xp": 400,
                 "timerSessions": [{"date": "2024-03-01", "duration": 45}]},
                42,
                {"name": "Broken", "deadline": "not a date"}
            ]"#,
        );
        let manager = GoalManager::load(&store).unwrap();
        assert!(manager.was_repaired());
        assert_eq!(manager.len(), 1);

        let goal = &manager.goals()[0];
        assert_eq!(goal.level(), 6);
        assert_eq!(goal.total_time_spent(), 45);
        assert_eq!(goal.badges.len(), 5);
        assert!(goal.tasks.is_empty());

        manager.save(&store).unwrap();
        let raw: Value = serde_json::from_str(&store.get(GOALS_KEY).unwrap().unwrap()).unwrap();
        let entries = raw.as_array().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0]["name"], "Legacy");
        assert_eq!(entries[1], Value::from(42));
        assert_eq!(entries[2]["name"], "Broken");
    }

    #[test]
    fn unreadable_entries_keep_their_position() {
        let store = MemoryStore::new().with_entry(
            GOALS_KEY,
            r#"[
                {"name": "Broken", "deadline": "not a date"},
                {"id": "a", "name": "First", "deadline": "2025-01-01"},
                7,
                {"id": "b", "name": "Second", "deadline": "2025-02-01"}
            ]"#,
        );
        let mut manager = GoalManager::load(&store).unwrap();
        assert_eq!(manager.len(), 2);
        manager.add(draft()).unwrap();
        manager.save(&store).unwrap();

        let raw: Value = serde_json::from_str(&store.get(GOALS_KEY).unwrap().unwrap()).unwrap();
        let entries = raw.as_array().unwrap();
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0]["name"], "Broken");
        assert_eq!(entries[1]["id"], "a");
        assert_eq!(entries[2], Value::from(7));
        assert_eq!(entries[3]["id"], "b");
        assert_eq!(entries[4]["name"], "Ship the book");
    }

    #[test]
    fn truncated_blob_is_not_overwritten() {
        let truncated = r#"[{"id": "p", "name": "Precious", "deadline": "2025-01-01"}, {"name": "trunc"#;
        let store = MemoryStore::new().with_entry(GOALS_KEY, truncated);

        let mut manager = GoalManager::load(&store).unwrap();
        assert!(manager.is_empty());
        manager.add(draft()).unwrap();
        manager.save(&store).unwrap();

        let raw: Value = serde_json::from_str(&store.get(GOALS_KEY).unwrap().unwrap()).unwrap();
        let entries = raw.as_array().unwrap();
        assert_eq!(entries[0], Value::String(truncated.to_string()));
        assert_eq!(entries[1]["name"], "Ship the book");

        // The kept text survives further load and save cycles.
        let reloaded = GoalManager::load(&store).unwrap();
        assert_eq!(reloaded.len(), 1);
        reloaded.save(&store).unwrap();
        assert!(store.get(GOALS_KEY).unwrap().unwrap().contains("Precious"));
    }

    #[test]
    fn absent_key_is_empty() {
        let manager = GoalManager::load(&MemoryStore::new()).unwrap();
        assert!(manager.is_empty());
    }
}
