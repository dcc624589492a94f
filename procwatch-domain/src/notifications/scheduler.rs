//! Admission, queueing and lifecycle of on-screen notifications.
//!
//! The scheduler is single-threaded: every method runs to completion against
//! its own state, and time only moves when [`NotificationScheduler::process_timers`]
//! is called. The owner drives it from one control task, feeding it new
//! processes, user interaction, a periodic [`NotificationScheduler::drain_queue`]
//! tick and a wake-up at [`NotificationScheduler::next_deadline`].
//!
//! Capacity is never tracked as a counter. It is recomputed from the live
//! visible set, so a record that failed to be withdrawn from the view still
//! frees its slot.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use log::{debug, info, warn};
use procwatch_core::config::NotificationConfig;

use super::errors::NotificationError;
use super::layout::{self, LayoutParams, Move};
use super::rate_limiter::RateLimiter;
use super::timers::{TimerKind, TimerSet};
use super::types::{
    Geometry, InteractionFlags, LifecycleState, NotificationContent, NotificationId, NotificationRecord,
    SchedulerStats, SubmitOutcome,
};
use super::view::NotificationView;
use crate::time::Clock;

#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    pub layout: LayoutParams,
    pub rate_limit: u32,
    pub display_time: Duration,
    pub fade_duration: Duration,
    /// Most records waiting for a slot at once.
    pub queue_limit: usize,
    /// New records start expanded.
    pub expanded_view: bool,
}

impl From<&NotificationConfig> for SchedulerConfig {
    fn from(config: &NotificationConfig) -> Self {
        Self {
            layout: LayoutParams::from(config),
            rate_limit: config.rate_limit,
            display_time: config.display_time(),
            fade_duration: config.fade_duration(),
            queue_limit: config.queue_limit,
            expanded_view: config.expanded_view,
        }
    }
}

type TimerKey = (NotificationId, TimerKind);

pub struct NotificationScheduler<V: NotificationView> {
    config: SchedulerConfig,
    clock: Arc<dyn Clock>,
    view: V,
    /// On-screen records, Visible or Fading, in admission order.
    visible: Vec<NotificationRecord>,
    queue: VecDeque<NotificationRecord>,
    timers: TimerSet<TimerKey>,
    rate_limiter: RateLimiter,
    stats: SchedulerStats,
}

impl<V: NotificationView> NotificationScheduler<V> {
    pub fn new(config: SchedulerConfig, clock: Arc<dyn Clock>, view: V) -> Self {
        let rate_limiter = RateLimiter::per_second(config.rate_limit);
        Self {
            config,
            clock,
            view,
            visible: Vec::new(),
            queue: VecDeque::new(),
            timers: TimerSet::new(),
            rate_limiter,
            stats: SchedulerStats::default(),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn visible(&self) -> &[NotificationRecord] {
        &self.visible
    }

    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    pub fn get(&self, id: NotificationId) -> Option<&NotificationRecord> {
        self.visible.iter().chain(self.queue.iter()).find(|r| r.id == id)
    }

    /// Earliest pending idle or fade deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    pub fn available_slots(&self) -> usize {
        layout::available_slots(&self.visible, &self.config.layout)
    }

    /// Offers a new notification.
    ///
    /// Over the rate limit the content is dropped outright. Otherwise it is
    /// shown if a slot is free and nothing is waiting ahead of it, or queued
    /// while the queue has room.
    pub fn submit(&mut self, content: NotificationContent) -> SubmitOutcome {
        if !self.rate_limiter.try_acquire(self.clock.now()) {
            self.stats.rejected += 1;
            debug!("Rate limit reached, dropping notification for '{}'", content.process.path);
            return SubmitOutcome::Rejected;
        }

        let record = self.create_record(content);
        if !self.queue.is_empty() {
            self.drain_queue();
        }
        if self.queue.is_empty() && self.available_slots() > 0 {
            return self.admit(record);
        }

        if self.queue.len() >= self.config.queue_limit {
            self.stats.queue_overflows += 1;
            debug!(
                "Queue full ({} waiting), dropping notification for '{}'",
                self.queue.len(),
                record.process.path
            );
            return SubmitOutcome::QueueFull;
        }
        let id = record.id;
        self.enqueue(record);
        SubmitOutcome::Queued(id)
    }

    /// Admits queued records one at a time while slots remain. Returns the
    /// number of records that made it on screen.
    pub fn drain_queue(&mut self) -> usize {
        let mut admitted = 0;
        while self.available_slots() > 0 {
            let Some(record) = self.queue.pop_front() else {
                break;
            };
            if let SubmitOutcome::Admitted(_) = self.admit(record) {
                admitted += 1;
            }
        }
        if admitted > 0 {
            debug!("Admitted {} queued notification(s), {} still waiting", admitted, self.queue.len());
        }
        admitted
    }

    /// Fires every timer due at the clock's current time.
    pub fn process_timers(&mut self) {
        let now = self.clock.now();
        for (id, kind) in self.timers.pop_due(now) {
            match kind {
                TimerKind::Idle => self.begin_fade(id),
                TimerKind::FadeComplete => {
                    if self.withdraw(id).is_some() {
                        self.after_removal();
                    }
                }
            }
        }
    }

    pub fn hover_enter(&mut self, id: NotificationId) -> Result<(), NotificationError> {
        self.update_flags(id, |flags| flags.hovered = true)
    }

    pub fn hover_leave(&mut self, id: NotificationId) -> Result<(), NotificationError> {
        self.update_flags(id, |flags| flags.hovered = false)?;
        self.reposition();
        Ok(())
    }

    pub fn set_pinned(&mut self, id: NotificationId, pinned: bool) -> Result<(), NotificationError> {
        self.update_flags(id, |flags| flags.pinned = pinned)?;
        self.reposition();
        Ok(())
    }

    /// Flips the pin and returns the new state.
    pub fn toggle_pinned(&mut self, id: NotificationId) -> Result<bool, NotificationError> {
        let pinned = !self.visible_record(id)?.flags.pinned;
        self.set_pinned(id, pinned)?;
        Ok(pinned)
    }

    pub fn set_menu_active(&mut self, id: NotificationId, active: bool) -> Result<(), NotificationError> {
        self.update_flags(id, |flags| flags.menu_active = active)?;
        if !active {
            self.reposition();
        }
        Ok(())
    }

    pub fn set_expanded(&mut self, id: NotificationId, expanded: bool) -> Result<(), NotificationError> {
        let index = self.index_of(id)?;
        self.visible[index].expanded = expanded;
        self.realign(index);
        self.render_at(index);
        self.reposition();
        Ok(())
    }

    /// Switches every record, visible or queued, and the default for new
    /// records between collapsed and expanded.
    pub fn set_expanded_view(&mut self, expanded: bool) {
        self.config.expanded_view = expanded;
        for record in self.queue.iter_mut() {
            record.expanded = expanded;
        }
        for index in 0..self.visible.len() {
            self.visible[index].expanded = expanded;
            self.realign(index);
            self.render_at(index);
        }
        self.reposition();
    }

    /// Updates the rule verdict shown on a record, e.g. after the user
    /// toggled the block rule for its path.
    pub fn set_decision_flags(
        &mut self,
        id: NotificationId,
        blocked: bool,
        allowed: bool,
    ) -> Result<(), NotificationError> {
        if let Some(record) = self.queue.iter_mut().find(|r| r.id == id) {
            record.blocked = blocked;
            record.allowed = allowed;
            return Ok(());
        }
        let index = self.index_of(id)?;
        self.visible[index].blocked = blocked;
        self.visible[index].allowed = allowed;
        self.render_at(index);
        Ok(())
    }

    /// Removes a record right away, whether on screen or still queued.
    pub fn dismiss(&mut self, id: NotificationId) -> Result<(), NotificationError> {
        if let Some(position) = self.queue.iter().position(|r| r.id == id) {
            if let Some(mut record) = self.queue.remove(position) {
                record.state = LifecycleState::Removed;
                self.stats.removed += 1;
            }
            return Ok(());
        }
        self.withdraw(id).ok_or(NotificationError::UnknownNotification(id))?;
        self.after_removal();
        Ok(())
    }

    pub fn clear_all(&mut self) {
        let ids: Vec<NotificationId> = self.visible.iter().map(|r| r.id).collect();
        for id in ids {
            self.withdraw(id);
        }
        self.stats.removed += self.queue.len() as u64;
        self.queue.clear();
        self.timers.clear();
        info!("Cleared all notifications");
    }

    /// Applies new geometry, limits and timings. Visible records take the new
    /// size and the stack is rebuilt around any obstacles.
    pub fn update_config(&mut self, config: SchedulerConfig) {
        self.rate_limiter.set_limit(config.rate_limit);
        let expanded_changed = config.expanded_view != self.config.expanded_view;
        self.config = config;

        let params = self.config.layout;
        let expanded_view = self.config.expanded_view;
        for record in self.visible.iter_mut().chain(self.queue.iter_mut()) {
            record.geometry.height = params.height;
            record.geometry.collapsed_width = params.collapsed_width;
            record.geometry.full_width = params.full_width_for(&record.process);
            if expanded_changed {
                record.expanded = expanded_view;
            }
        }
        for index in 0..self.visible.len() {
            self.realign(index);
            self.render_at(index);
        }
        self.reposition();
        self.fill_gaps();
        self.drain_queue();
    }

    /// Runs one reposition pass and renders whatever moved.
    pub fn reposition(&mut self) -> usize {
        let moves = layout::reposition(&mut self.visible, &self.config.layout);
        self.render_moves(&moves);
        moves.len()
    }

    /// Slides records down into holes, lowest hole first.
    pub fn fill_gaps(&mut self) -> usize {
        let mut filled = 0;
        for _ in 0..self.visible.len() {
            let spaces = layout::find_empty_spaces(&self.visible, &self.config.layout);
            let Some(space) = spaces.into_iter().max_by_key(|space| space.y) else {
                break;
            };
            match layout::fill_empty_space(&mut self.visible, space, &self.config.layout) {
                Some(moved) => {
                    self.render_moves(&[moved]);
                    filled += 1;
                }
                None => break,
            }
        }
        filled
    }

    fn create_record(&self, content: NotificationContent) -> NotificationRecord {
        let params = &self.config.layout;
        let full_width = params.full_width_for(&content.process);
        NotificationRecord {
            id: NotificationId::new(),
            icon: content.icon,
            process: content.process,
            blocked: content.blocked,
            allowed: content.allowed,
            created_at: Utc::now(),
            state: LifecycleState::Created,
            geometry: Geometry {
                x: 0,
                y: 0,
                collapsed_width: params.collapsed_width,
                full_width,
                height: params.height,
            },
            flags: InteractionFlags::default(),
            expanded: self.config.expanded_view,
            fade_started_at: None,
        }
    }

    fn enqueue(&mut self, mut record: NotificationRecord) {
        record.state = LifecycleState::Queued;
        self.stats.queued += 1;
        debug!("No free slot, queueing notification {} ({} waiting)", record.id, self.queue.len() + 1);
        self.queue.push_back(record);
    }

    fn admit(&mut self, mut record: NotificationRecord) -> SubmitOutcome {
        let id = record.id;
        record.state = LifecycleState::Admitted;
        record.geometry.y = layout::placement_y(&self.visible, record.geometry.height, &self.config.layout);
        record.geometry.x = self.config.layout.right_x(record.effective_width());
        record.state = LifecycleState::Visible;

        if let Err(err) = self.view.render(&record) {
            warn!("Dropping notification {}: {}", id, err);
            self.stats.view_failures += 1;
            record.state = LifecycleState::Removed;
            if let Err(err) = self.view.remove(id) {
                debug!("Cleanup of failed notification {} also failed: {}", id, err);
            }
            return SubmitOutcome::Dropped(id);
        }

        self.stats.admitted += 1;
        if !record.is_obstacle() {
            self.schedule_idle(id);
        }
        self.visible.push(record);
        SubmitOutcome::Admitted(id)
    }

    fn schedule_idle(&mut self, id: NotificationId) {
        let deadline = self.clock.now() + self.config.display_time;
        self.timers.cancel(&(id, TimerKind::FadeComplete));
        self.timers.schedule((id, TimerKind::Idle), deadline);
    }

    fn begin_fade(&mut self, id: NotificationId) {
        let Ok(index) = self.index_of(id) else {
            return;
        };
        let now = self.clock.now();
        let record = &mut self.visible[index];
        if record.is_obstacle() || record.state != LifecycleState::Visible {
            return;
        }
        record.state = LifecycleState::Fading;
        record.fade_started_at = Some(now);
        self.timers.schedule((id, TimerKind::FadeComplete), now + self.config.fade_duration);
        self.render_at(index);
    }

    /// Takes a record off screen. The view is told best-effort; the slot is
    /// freed either way.
    fn withdraw(&mut self, id: NotificationId) -> Option<NotificationRecord> {
        let index = self.visible.iter().position(|r| r.id == id)?;
        let mut record = self.visible.remove(index);
        record.state = LifecycleState::Removed;
        self.timers.cancel_where(|(timer_id, _)| *timer_id == id);
        if let Err(err) = self.view.remove(id) {
            warn!("Failed to remove notification {} from view: {}", id, err);
            self.stats.view_failures += 1;
        }
        self.stats.removed += 1;
        Some(record)
    }

    /// Gap filling slides the record right above the hole into it; the
    /// reposition pass then settles whatever is still out of place (records
    /// under a released obstacle, width changes).
    fn after_removal(&mut self) {
        self.fill_gaps();
        self.reposition();
        self.drain_queue();
    }

    /// Applies a flag change and keeps the idle timer in step with whether
    /// the record is an obstacle.
    fn update_flags<F>(&mut self, id: NotificationId, update: F) -> Result<(), NotificationError>
    where
        F: FnOnce(&mut InteractionFlags),
    {
        let index = self.index_of(id)?;
        let record = &mut self.visible[index];
        let was_obstacle = record.is_obstacle();
        update(&mut record.flags);

        if record.is_obstacle() {
            if record.state == LifecycleState::Fading {
                record.state = LifecycleState::Visible;
            }
            record.fade_started_at = None;
            self.timers.cancel_where(|(timer_id, _)| *timer_id == id);
        } else if was_obstacle {
            self.schedule_idle(id);
        }
        self.realign(index);
        self.render_at(index);
        Ok(())
    }

    fn realign(&mut self, index: usize) {
        let record = &mut self.visible[index];
        record.geometry.x = self.config.layout.right_x(record.effective_width());
    }

    fn render_at(&mut self, index: usize) {
        let record = &self.visible[index];
        if let Err(err) = self.view.render(record) {
            warn!("Failed to render notification {}: {}", record.id, err);
            self.stats.view_failures += 1;
        }
    }

    fn render_moves(&mut self, moves: &[Move]) {
        for moved in moves {
            if let Ok(index) = self.index_of(moved.id) {
                self.render_at(index);
            }
        }
    }

    fn index_of(&self, id: NotificationId) -> Result<usize, NotificationError> {
        self.visible
            .iter()
            .position(|r| r.id == id)
            .ok_or(NotificationError::UnknownNotification(id))
    }

    fn visible_record(&self, id: NotificationId) -> Result<&NotificationRecord, NotificationError> {
        self.index_of(id).map(|index| &self.visible[index])
    }
}
