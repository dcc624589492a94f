//! Notification records and the values that flow through the scheduler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::icons::IconRef;

/// Unique identifier of a notification record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NotificationId(Uuid);

impl NotificationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a record. Hover, pin and menu state are orthogonal flags
/// carried in [`InteractionFlags`], not states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LifecycleState {
    Created,
    Queued,
    Admitted,
    Visible,
    Fading,
    Removed,
}

/// What the process feed reported about a new process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDetails {
    pub pid: u32,
    pub name: String,
    pub path: String,
    pub elevated: bool,
}

impl ProcessDetails {
    /// PID line as shown to the user, e.g. `"4242 (Admin)"`.
    pub fn pid_label(&self) -> String {
        if self.elevated {
            format!("{} (Admin)", self.pid)
        } else {
            self.pid.to_string()
        }
    }
}

/// Everything needed to create a record.
#[derive(Debug, Clone)]
pub struct NotificationContent {
    pub process: ProcessDetails,
    pub icon: Option<IconRef>,
    pub blocked: bool,
    pub allowed: bool,
}

/// Screen-space footprint. `y` is the top edge; the stack grows upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub collapsed_width: i32,
    pub full_width: i32,
    pub height: i32,
}

impl Geometry {
    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InteractionFlags {
    pub hovered: bool,
    pub pinned: bool,
    pub menu_active: bool,
}

#[derive(Debug, Clone)]
pub struct NotificationRecord {
    pub id: NotificationId,
    pub icon: Option<IconRef>,
    pub process: ProcessDetails,
    pub blocked: bool,
    pub allowed: bool,
    pub created_at: DateTime<Utc>,
    pub state: LifecycleState,
    pub geometry: Geometry,
    pub flags: InteractionFlags,
    /// Collapsed/Expanded sub-state of a visible record.
    pub expanded: bool,
    pub fade_started_at: Option<Instant>,
}

impl NotificationRecord {
    /// Hovered, pinned and menu-active records freeze the layout around them.
    pub fn is_obstacle(&self) -> bool {
        self.flags.hovered || self.flags.pinned || self.flags.menu_active
    }

    /// Whether the record currently occupies its full width.
    pub fn shows_full_width(&self) -> bool {
        self.expanded || self.flags.hovered || self.flags.pinned
    }

    pub fn effective_width(&self) -> i32 {
        if self.shows_full_width() {
            self.geometry.full_width
        } else {
            self.geometry.collapsed_width
        }
    }

    pub fn is_on_screen(&self) -> bool {
        matches!(self.state, LifecycleState::Visible | LifecycleState::Fading)
    }

    /// Opacity in `[0, 1]` for a linear fade of length `fade_duration`.
    pub fn opacity_at(&self, now: Instant, fade_duration: Duration) -> f32 {
        match (self.state, self.fade_started_at) {
            (LifecycleState::Fading, Some(started)) if !fade_duration.is_zero() => {
                let progress = now.saturating_duration_since(started).as_secs_f32() / fade_duration.as_secs_f32();
                (1.0 - progress).clamp(0.0, 1.0)
            }
            (LifecycleState::Fading, _) => 0.0,
            _ => 1.0,
        }
    }
}

/// Result of [`super::NotificationScheduler::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Placed on screen immediately.
    Admitted(NotificationId),
    /// No free slot; waiting in the FIFO queue.
    Queued(NotificationId),
    /// Over the rate limit; dropped.
    Rejected,
    /// No free slot and the waiting queue is at its limit; dropped.
    QueueFull,
    /// Admitted but the view failed to render it; the record was discarded.
    Dropped(NotificationId),
}

/// Counters for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SchedulerStats {
    pub admitted: u64,
    pub queued: u64,
    pub rejected: u64,
    pub queue_overflows: u64,
    pub removed: u64,
    pub view_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> NotificationRecord {
        NotificationRecord {
            id: NotificationId::new(),
            icon: None,
            process: ProcessDetails { pid: 7, name: "top".into(), path: "/usr/bin/top".into(), elevated: true },
            blocked: false,
            allowed: false,
            created_at: Utc::now(),
            state: LifecycleState::Visible,
            geometry: Geometry { x: 0, y: 100, collapsed_width: 52, full_width: 300, height: 64 },
            flags: InteractionFlags::default(),
            expanded: false,
            fade_started_at: None,
        }
    }

    #[test]
    fn test_pid_label_marks_elevated() {
        assert_eq!(record().process.pid_label(), "7 (Admin)");
    }

    #[test]
    fn test_effective_width_follows_flags() {
        let mut r = record();
        assert_eq!(r.effective_width(), 52);
        r.flags.pinned = true;
        assert_eq!(r.effective_width(), 300);
        assert!(r.is_obstacle());
        r.flags.pinned = false;
        r.expanded = true;
        assert_eq!(r.effective_width(), 300);
        assert!(!r.is_obstacle());
    }

    #[test]
    fn test_opacity_during_fade() {
        let mut r = record();
        let start = Instant::now();
        assert_eq!(r.opacity_at(start, Duration::from_secs(2)), 1.0);
        r.state = LifecycleState::Fading;
        r.fade_started_at = Some(start);
        let half = r.opacity_at(start + Duration::from_secs(1), Duration::from_secs(2));
        assert!((half - 0.5).abs() < 1e-6);
        assert_eq!(r.opacity_at(start + Duration::from_secs(5), Duration::from_secs(2)), 0.0);
    }
}
