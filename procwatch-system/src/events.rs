//! Messages accepted by the control loop.
//!
//! Everything that wants to change scheduler state, from the process feed to
//! a click on a notification, goes through one [`ControlEvent`] channel.

use std::sync::Arc;

use procwatch_domain::icons::{CustomIconMap, Icon};
use procwatch_domain::notifications::{NotificationId, NotificationRecord, SchedulerStats};
use procwatch_domain::rules::Decision;
use procwatch_domain::ProcessDetails;
use tokio::sync::{mpsc, oneshot};

use crate::error::{SystemError, SystemResult};

/// User actions on a single notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    HoverEnter,
    HoverLeave,
    TogglePin,
    ToggleExpanded,
    MenuOpened,
    MenuClosed,
    Dismiss,
    /// Adds the record's path to the block list, or removes it if present.
    ToggleBlock,
}

/// Outcome of an icon lookup started for a new process.
#[derive(Debug)]
pub struct ResolvedIcon {
    /// Cache generation the lookup started under.
    pub generation: u64,
    pub process: ProcessDetails,
    pub decision: Decision,
    /// `None` when neither a custom mapping nor the provider had an icon.
    pub icon: Option<Icon>,
}

/// Point-in-time view of the control loop, for diagnostics and tests.
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub visible: Vec<NotificationRecord>,
    pub queued: usize,
    pub stats: SchedulerStats,
    pub notifications_enabled: bool,
    pub blocking_enabled: bool,
    pub expanded_view: bool,
    pub rule_version: u64,
}

#[derive(Debug)]
pub enum ControlEvent {
    ProcessAppeared(ProcessDetails),
    IconResolved(ResolvedIcon),
    RulesReloaded { version: u64 },
    IconMappingsReloaded(Arc<CustomIconMap>),
    Interaction { id: NotificationId, action: Interaction },
    SetExpandedView(bool),
    SetNotificationsEnabled(bool),
    SetBlockingEnabled(bool),
    ClearAll,
    Status(oneshot::Sender<StatusReport>),
    Shutdown,
}

/// Cloneable sending side of the control loop.
#[derive(Debug, Clone)]
pub struct ControlHandle {
    sender: mpsc::Sender<ControlEvent>,
}

impl ControlHandle {
    pub fn new(sender: mpsc::Sender<ControlEvent>) -> Self {
        Self { sender }
    }

    pub fn sender(&self) -> mpsc::Sender<ControlEvent> {
        self.sender.clone()
    }

    pub async fn send(&self, event: ControlEvent) -> SystemResult<()> {
        self.sender.send(event).await.map_err(|_| SystemError::ControlLoopClosed)
    }

    pub async fn interact(&self, id: NotificationId, action: Interaction) -> SystemResult<()> {
        self.send(ControlEvent::Interaction { id, action }).await
    }

    pub async fn status(&self) -> SystemResult<StatusReport> {
        let (reply, response) = oneshot::channel();
        self.send(ControlEvent::Status(reply)).await?;
        response.await.map_err(|_| SystemError::ControlLoopClosed)
    }

    pub async fn shutdown(&self) -> SystemResult<()> {
        self.send(ControlEvent::Shutdown).await
    }
}
