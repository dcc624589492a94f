//! Domain layer of procwatch.
//!
//! Three independent components live here:
//!
//! - [`rules`]: resolves an executable path against hot-reloadable allow and
//!   block lists into a [`rules::Decision`].
//! - [`icons`]: a bounded, time-limited icon cache plus user-defined icon
//!   overrides.
//! - [`notifications`]: admission, queueing, layout and lifecycle of the
//!   on-screen notification stack.
//!
//! None of them depends on another. Wiring them to the process feed and the
//! filesystem is left to `procwatch-system`.

pub use procwatch_core as core;

pub mod error;
mod fs_tasks;
pub mod icons;
pub mod notifications;
pub mod rules;
pub mod time;

pub use error::{DomainError, DomainResult};
pub use icons::{Icon, IconCache, IconError, IconRef};
pub use notifications::{
    NotificationContent, NotificationError, NotificationId, NotificationRecord, NotificationScheduler,
    NotificationView, ProcessDetails, SchedulerConfig, SubmitOutcome,
};
pub use rules::{Decision, RuleEngine, RuleError, RuleSnapshot, RuleStatus, SharedRuleStore};
pub use time::{Clock, ManualClock, SystemClock};
