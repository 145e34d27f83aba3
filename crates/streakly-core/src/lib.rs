//! # Streakly Core Library
//!
//! Core business logic for Streakly, a personal goal tracker with a
//! gamification layer. All operations are available through the standalone
//! CLI binary, which is a thin layer over this library.
//!
//! ## Architecture
//!
//! - **Gamification Engine**: pure functions deriving XP, levels, badges,
//!   habit chains and streaks from explicit inputs
//! - **Aggregates**: goals and the singleton user, loaded from and saved to a
//!   key-value store by their managers
//! - **Tracker**: read-modify-write service that applies every user action
//!   and announces level-ups, rewards and reflections
//! - **Focus Timer**: a wall-clock state machine that requires the caller to
//!   periodically invoke `tick()`, plus a tokio ticker to drive it
//! - **Storage**: SQLite key-value persistence and TOML configuration
//!
//! ## Key Components
//!
//! - [`Tracker`]: application service
//! - [`FocusTimer`]: focus/break state machine
//! - [`Database`]: key-value persistence
//! - [`Config`]: application configuration management

pub mod clock;
pub mod countdown;
pub mod error;
pub mod events;
pub mod gamification;
pub mod goals;
pub mod model;
pub mod rewards;
pub mod storage;
pub mod timer;
pub mod tracker;
pub mod user;

pub use clock::{Clock, ManualClock, SystemClock};
pub use countdown::{format_countdown, Countdown};
pub use error::{ConfigError, CoreError, StoreError, ValidationError};
pub use events::{Event, LevelScope, Notifier, RecordingNotifier, SilentNotifier, TracingNotifier};
pub use gamification::{Award, AwardSource, DayActivity};
pub use goals::{GoalDraft, GoalManager, GoalRef};
pub use model::{Badge, Goal, Milestone, Reflection, Task, TimerSession, Transition, User};
pub use rewards::{FixedRewards, RandomRewards, Reward, RewardKind, RewardPicker};
pub use storage::{Config, Database, KvStore, MemoryStore};
pub use timer::{FocusTimer, Ticker, TimerDurations, TimerEvent, TimerMode, TimerState};
pub use tracker::{GoalView, Progress, ReflectionDraft, Tracker, UserView};
pub use user::UserManager;
