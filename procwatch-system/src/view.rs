//! Headless presentation: notifications are written to the log.

use std::collections::HashSet;

use procwatch_core::utils::truncate_string;
use procwatch_domain::notifications::{NotificationError, NotificationId, NotificationRecord, NotificationView};
use tracing::{debug, info};

const DISPLAY_PATH_LEN: usize = 60;

#[derive(Debug, Default)]
pub struct LoggingNotificationView {
    shown: HashSet<NotificationId>,
}

impl LoggingNotificationView {
    pub fn new() -> Self {
        Self::default()
    }
}

fn verdict(record: &NotificationRecord) -> &'static str {
    match (record.blocked, record.allowed) {
        (true, _) => "blocked",
        (_, true) => "allowed",
        _ => "unmatched",
    }
}

impl NotificationView for LoggingNotificationView {
    fn render(&mut self, record: &NotificationRecord) -> Result<(), NotificationError> {
        if self.shown.insert(record.id) {
            info!(
                id = %record.id,
                pid = %record.process.pid_label(),
                verdict = verdict(record),
                "New process {} ({})",
                record.process.name,
                truncate_string(&record.process.path, DISPLAY_PATH_LEN)
            );
        } else {
            debug!(
                id = %record.id,
                x = record.geometry.x,
                y = record.geometry.y,
                state = ?record.state,
                expanded = record.shows_full_width(),
                "Notification updated"
            );
        }
        Ok(())
    }

    fn remove(&mut self, id: NotificationId) -> Result<(), NotificationError> {
        if self.shown.remove(&id) {
            debug!(id = %id, "Notification removed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use procwatch_domain::notifications::{Geometry, InteractionFlags, LifecycleState};
    use procwatch_domain::ProcessDetails;

    fn record() -> NotificationRecord {
        NotificationRecord {
            id: NotificationId::new(),
            icon: None,
            process: ProcessDetails { pid: 7, name: "vim".into(), path: "/usr/bin/vim".into(), elevated: false },
            blocked: false,
            allowed: true,
            created_at: Default::default(),
            state: LifecycleState::Visible,
            geometry: Geometry::default(),
            flags: InteractionFlags::default(),
            expanded: false,
            fade_started_at: None,
        }
    }

    #[test]
    fn test_render_and_remove_are_idempotent() {
        let mut view = LoggingNotificationView::new();
        let record = record();
        assert_eq!(verdict(&record), "allowed");
        view.render(&record).unwrap();
        view.render(&record).unwrap();
        view.remove(record.id).unwrap();
        view.remove(record.id).unwrap();
        assert!(view.shown.is_empty());
    }
}
