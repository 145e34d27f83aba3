//! Core error types for streakly-core.
//!
//! The hierarchy mirrors the failure taxonomy of the tracker: store
//! failures, configuration problems, rejected input and references to
//! entities that do not exist. None of them is fatal; callers recover by
//! falling back to a safe view (usually the goal list).

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for streakly-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Persistent store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Input rejected before any state was touched
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A goal reference resolved to nothing
    #[error("Goal not found: {reference}")]
    GoalNotFound { reference: String },

    /// A task id is not part of the goal
    #[error("Task '{task_id}' not found in goal '{goal_id}'")]
    TaskNotFound { goal_id: String, task_id: String },

    /// A milestone id is not part of the goal
    #[error("Milestone '{milestone_id}' not found in goal '{goal_id}'")]
    MilestoneNotFound {
        goal_id: String,
        milestone_id: String,
    },

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key-value store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked by another writer
    #[error("Store is locked")]
    Locked,

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field was empty or whitespace
    #[error("'{0}' must not be empty")]
    EmptyField(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Numeric value outside its accepted range
    #[error("'{field}' must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: String,
        value: u64,
        min: u64,
        max: u64,
    },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked
                    || e.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    StoreError::Locked
                } else {
                    StoreError::QueryFailed(err.to_string())
                }
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Store(err.into())
    }
}

impl CoreError {
    /// True when the error means "the thing you asked for is not there",
    /// which front-ends answer by falling back to the goal list.
    pub fn is_missing_entity(&self) -> bool {
        matches!(
            self,
            CoreError::GoalNotFound { .. }
                | CoreError::TaskNotFound { .. }
                | CoreError::MilestoneNotFound { .. }
        )
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
