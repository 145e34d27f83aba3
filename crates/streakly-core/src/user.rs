//! User aggregate and the daily XP reset.

use chrono::NaiveDate;

use crate::clock::DAY_FORMAT;
use crate::error::Result;
use crate::model::User;
use crate::storage::{KvStore, LAST_RESET_KEY, UNREADABLE_USER_KEY, USER_KEY};

/// Zero `daily_xp` when the last reset happened on another day.
/// Returns true when a reset took place.
pub fn apply_daily_reset(user: &mut User, last_reset: Option<NaiveDate>, today: NaiveDate) -> bool {
    if last_reset == Some(today) {
        return false;
    }
    user.daily_xp = 0;
    true
}

/// Owns the singleton [`User`] between load and save.
#[derive(Debug, Clone, Default)]
pub struct UserManager {
    user: User,
}

impl UserManager {
    pub fn new(user: User) -> Self {
        Self { user }
    }

    /// Load the user and apply the daily reset for `today`.
    ///
    /// A reset is persisted immediately together with the new marker. An
    /// unreadable record is copied aside before a fresh user replaces it.
    pub fn load(store: &dyn KvStore, today: NaiveDate) -> Result<Self> {
        let mut user = match store.get(USER_KEY)? {
            Some(raw) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => user,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        key = UNREADABLE_USER_KEY,
                        "stored user could not be read, starting fresh"
                    );
                    store.set(UNREADABLE_USER_KEY, &raw)?;
                    User::default()
                }
            },
            None => User::default(),
        };
        user.normalize();

        let last_reset = read_marker(store)?;
        let manager = if apply_daily_reset(&mut user, last_reset, today) {
            tracing::info!(?last_reset, %today, "daily xp reset");
            let manager = Self { user };
            manager.save(store)?;
            let marker = today.format(DAY_FORMAT).to_string();
            store.set(LAST_RESET_KEY, &serde_json::to_string(&marker)?)?;
            manager
        } else {
            Self { user }
        };
        Ok(manager)
    }

    pub fn save(&self, store: &dyn KvStore) -> Result<()> {
        store.set(USER_KEY, &serde_json::to_string(&self.user)?)?;
        Ok(())
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn replace(&mut self, user: User) -> User {
        std::mem::replace(&mut self.user, user)
    }

    pub fn into_user(self) -> User {
        self.user
    }
}

/// The marker is a JSON string; older stores hold the bare day.
fn read_marker(store: &dyn KvStore) -> Result<Option<NaiveDate>> {
    let Some(raw) = store.get(LAST_RESET_KEY)? else {
        return Ok(None);
    };
    let text = serde_json::from_str::<String>(&raw).unwrap_or(raw);
    Ok(NaiveDate::parse_from_str(text.trim(), DAY_FORMAT).ok())
}
