mod config;
pub mod database;
pub mod memory;

pub use config::{Config, NotificationsConfig, RewardsConfig, TimerConfig};
pub use database::Database;
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::error::StoreError;

/// Ordered goal list; a goal's position among the readable entries is its
/// external identifier.
pub const GOALS_KEY: &str = "streakly-goals";
/// The singleton user record.
pub const USER_KEY: &str = "streakly-user";
/// Last user record that could not be read, kept verbatim.
pub const UNREADABLE_USER_KEY: &str = "streakly-user-unreadable";
/// Day on which `dailyXp` was last zeroed.
pub const LAST_RESET_KEY: &str = "streakly-last-reset-date";

/// Synchronous string-keyed blob store.
///
/// Values are serialized JSON. Implementations must survive process
/// restarts unless they are explicitly in-memory.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<S: KvStore + ?Sized> KvStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

impl<S: KvStore + ?Sized> KvStore for std::rc::Rc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// Returns the data directory, creating it if needed.
///
/// `STREAKLY_DATA_DIR` wins when set. Otherwise `~/.config/streakly[-dev]/`
/// based on `STREAKLY_ENV` (set `STREAKLY_ENV=dev` for a development
/// directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StoreError> {
    let dir = match std::env::var_os("STREAKLY_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("STREAKLY_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("streakly-dev")
            } else {
                base_dir.join("streakly")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StoreError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
