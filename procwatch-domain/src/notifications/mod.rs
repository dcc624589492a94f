//! On-screen notification scheduling.

pub mod errors;
pub mod layout;
pub mod rate_limiter;
pub mod scheduler;
pub mod timers;
pub mod types;
pub mod view;

pub use errors::NotificationError;
pub use layout::{EmptySpace, LayoutParams, Move, MOVE_EPSILON};
pub use rate_limiter::RateLimiter;
pub use scheduler::{NotificationScheduler, SchedulerConfig};
pub use timers::{TimerKind, TimerSet};
pub use types::{
    Geometry, InteractionFlags, LifecycleState, NotificationContent, NotificationId, NotificationRecord,
    ProcessDetails, SchedulerStats, SubmitOutcome,
};
pub use view::NotificationView;
