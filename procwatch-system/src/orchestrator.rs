//! The control loop.
//!
//! One task owns the scheduler and the icon cache and is the only code that
//! touches them. Everything else (process feed, watchers, icon lookups, the
//! user) talks to it through [`ControlEvent`]s, so scheduler state is only
//! ever changed in the order events arrive.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use procwatch_core::config::{ConfigLoader, CoreConfig};
use procwatch_domain::icons::{CustomIconMap, Icon, IconCache, IconMappingFile, IconRef};
use procwatch_domain::notifications::{
    NotificationContent, NotificationError, NotificationId, NotificationScheduler, NotificationView,
    SchedulerConfig, SubmitOutcome,
};
use procwatch_domain::rules::{
    Decision, FilesystemRuleListProvider, ProcessClassifier, RuleEngine, RuleListProvider, RuleStatus, RuleStore,
    SharedRuleStore,
};
use procwatch_domain::time::Clock;
use procwatch_domain::ProcessDetails;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace, warn};

use crate::error::SystemResult;
use crate::events::{ControlEvent, ControlHandle, Interaction, ResolvedIcon, StatusReport};
use crate::icon_provider::{IconLookup, IconProvider};
use crate::watchers::toggle_block;

pub const CONTROL_CHANNEL_CAPACITY: usize = 256;

/// Collaborators the control loop is built from.
pub struct OrchestratorParts<V> {
    pub config: CoreConfig,
    /// Where runtime toggles are saved; `None` keeps them in memory only.
    pub config_path: Option<PathBuf>,
    pub view: V,
    pub icon_provider: Arc<dyn IconProvider>,
    pub rule_store: Arc<SharedRuleStore>,
    /// Defaults to a [`RuleEngine`] over `rule_store`.
    pub classifier: Option<Arc<dyn ProcessClassifier>>,
    pub clock: Arc<dyn Clock>,
}

pub struct Orchestrator<V: NotificationView> {
    config: CoreConfig,
    config_path: Option<PathBuf>,
    classifier: Arc<dyn ProcessClassifier>,
    rule_store: Arc<SharedRuleStore>,
    block_list: Arc<dyn RuleListProvider>,
    icon_lookup: Arc<IconLookup>,
    custom_icons: Arc<CustomIconMap>,
    cache: IconCache,
    scheduler: NotificationScheduler<V>,
    events: mpsc::Receiver<ControlEvent>,
    handle: ControlHandle,
}

enum Step {
    Event(Option<ControlEvent>),
    Drain,
    Timers,
}

impl<V: NotificationView> Orchestrator<V> {
    pub fn new(parts: OrchestratorParts<V>) -> (Self, ControlHandle) {
        let OrchestratorParts { config, config_path, view, icon_provider, rule_store, classifier, clock } = parts;
        let (sender, events) = mpsc::channel(CONTROL_CHANNEL_CAPACITY);
        let handle = ControlHandle::new(sender);

        let classifier: Arc<dyn ProcessClassifier> = match classifier {
            Some(classifier) => classifier,
            None => {
                let store: Arc<dyn RuleStore> = rule_store.clone();
                Arc::new(RuleEngine::new(store))
            }
        };
        let mappings = IconMappingFile::new(&config.paths.custom_icons, &config.paths.custom_icons_dir);
        let icon_lookup = Arc::new(IconLookup::new(icon_provider, mappings, config.icons.resolve_timeout()));
        let cache = IconCache::new(config.icons.icon_cache_max_size, config.icons.icon_cache_timeout(), clock.clone());
        let scheduler = NotificationScheduler::new(SchedulerConfig::from(&config.notifications), clock, view);

        let orchestrator = Self {
            block_list: Arc::new(FilesystemRuleListProvider::block_list(&config.paths.block_list)),
            config,
            config_path,
            classifier,
            rule_store,
            icon_lookup,
            custom_icons: Arc::new(CustomIconMap::default()),
            cache,
            scheduler,
            events,
            handle: handle.clone(),
        };
        (orchestrator, handle)
    }

    /// Runs until a [`ControlEvent::Shutdown`] arrives. Remaining
    /// notifications are withdrawn on the way out.
    pub async fn run(mut self) {
        let mut drain = tokio::time::interval(self.config.notifications.queue_drain_interval());
        drain.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("Control loop started");

        loop {
            let deadline = self.scheduler.next_deadline();
            let step = tokio::select! {
                event = self.events.recv() => Step::Event(event),
                _ = drain.tick() => Step::Drain,
                _ = sleep_until(deadline) => Step::Timers,
            };
            match step {
                Step::Event(Some(ControlEvent::Shutdown)) | Step::Event(None) => break,
                Step::Event(Some(event)) => self.handle_event(event),
                Step::Drain => {
                    self.scheduler.drain_queue();
                }
                Step::Timers => self.scheduler.process_timers(),
            }
        }

        self.scheduler.clear_all();
        let stats = self.scheduler.stats();
        info!(
            admitted = stats.admitted,
            queued = stats.queued,
            rejected = stats.rejected,
            queue_overflows = stats.queue_overflows,
            removed = stats.removed,
            view_failures = stats.view_failures,
            "Control loop stopped"
        );
    }

    fn handle_event(&mut self, event: ControlEvent) {
        match event {
            ControlEvent::ProcessAppeared(process) => self.on_process_appeared(process),
            ControlEvent::IconResolved(resolved) => self.on_icon_resolved(resolved),
            ControlEvent::RulesReloaded { version } => self.refresh_decisions(version),
            ControlEvent::IconMappingsReloaded(map) => {
                self.custom_icons = map;
                self.cache.clear();
                debug!("Icon mappings replaced, icon cache cleared");
            }
            ControlEvent::Interaction { id, action } => {
                if let Err(err) = self.on_interaction(id, action) {
                    debug!("Ignoring {:?} on {}: {}", action, id, err);
                }
            }
            ControlEvent::SetExpandedView(expanded) => {
                self.scheduler.set_expanded_view(expanded);
                self.config.notifications.expanded_view = expanded;
                self.persist_settings();
            }
            ControlEvent::SetNotificationsEnabled(enabled) => {
                self.config.notifications.enabled = enabled;
                info!("Notifications {}", if enabled { "enabled" } else { "disabled" });
                self.persist_settings();
            }
            ControlEvent::SetBlockingEnabled(enabled) => {
                self.config.monitor.blocking_enabled = enabled;
                info!("Blocking {}", if enabled { "enabled" } else { "disabled" });
                self.persist_settings();
            }
            ControlEvent::ClearAll => self.scheduler.clear_all(),
            ControlEvent::Status(reply) => {
                if reply.send(self.status()).is_err() {
                    trace!("Status requester went away");
                }
            }
            // Handled by the loop itself.
            ControlEvent::Shutdown => {}
        }
    }

    fn should_announce(&self, decision: &Decision) -> bool {
        if !self.config.notifications.enabled {
            return false;
        }
        match decision.status {
            RuleStatus::Blocked => !self.config.monitor.blocking_enabled,
            RuleStatus::Allowed => true,
            RuleStatus::Unmatched => self.config.monitor.show_unmatched,
        }
    }

    fn on_process_appeared(&mut self, process: ProcessDetails) {
        let decision = self.classifier.classify(&process.path);
        if !self.should_announce(&decision) {
            trace!("Not announcing '{}' ({:?})", process.path, decision.status);
            return;
        }
        if let Some(icon) = self.cache.get(&process.path) {
            self.submit(process, decision, icon);
            return;
        }

        let generation = self.cache.generation();
        let lookup = self.icon_lookup.clone();
        let custom = self.custom_icons.clone();
        let sender = self.handle.sender();
        tokio::spawn(async move {
            let icon = lookup.lookup(&custom, &process).await;
            let resolved = ResolvedIcon { generation, process, decision, icon };
            if sender.send(ControlEvent::IconResolved(resolved)).await.is_err() {
                debug!("Control loop gone, dropping resolved icon");
            }
        });
    }

    /// Caches what the lookup found; without a result, borrows the icon of a
    /// cached executable with the same file name or generates one.
    fn on_icon_resolved(&mut self, resolved: ResolvedIcon) {
        let ResolvedIcon { generation, process, decision, icon } = resolved;
        if !self.should_announce(&decision) {
            return;
        }
        let icon: IconRef = match icon {
            Some(icon) => {
                let icon = Arc::new(icon);
                self.cache.put_if_current(generation, &process.path, icon.clone());
                icon
            }
            None => self
                .cache
                .find_by_base_name(&process.path)
                .unwrap_or_else(|| Arc::new(Icon::fallback(&process.name))),
        };
        self.submit(process, decision, icon);
    }

    fn submit(&mut self, process: ProcessDetails, decision: Decision, icon: IconRef) {
        let path = process.path.clone();
        let outcome = self.scheduler.submit(NotificationContent {
            process,
            icon: Some(icon),
            blocked: decision.is_blocked(),
            allowed: decision.is_allowed(),
        });
        match outcome {
            SubmitOutcome::Admitted(id) | SubmitOutcome::Queued(id) => {
                debug!(id = %id, path = %path, ?outcome, "Notification submitted");
            }
            SubmitOutcome::Rejected | SubmitOutcome::QueueFull | SubmitOutcome::Dropped(_) => {}
        }
    }

    /// Re-evaluates every visible record against the freshly installed rules.
    fn refresh_decisions(&mut self, version: u64) {
        let targets: Vec<(NotificationId, String)> = self
            .scheduler
            .visible()
            .iter()
            .map(|record| (record.id, record.process.path.clone()))
            .collect();
        for (id, path) in targets {
            let decision = self.classifier.classify(&path);
            if let Err(err) = self.scheduler.set_decision_flags(id, decision.is_blocked(), decision.is_allowed()) {
                debug!("Could not refresh decision for {}: {}", id, err);
            }
        }
        debug!("Applied rule snapshot v{}", version);
    }

    fn on_interaction(&mut self, id: NotificationId, action: Interaction) -> SystemResult<()> {
        match action {
            Interaction::HoverEnter => self.scheduler.hover_enter(id)?,
            Interaction::HoverLeave => self.scheduler.hover_leave(id)?,
            Interaction::TogglePin => {
                self.scheduler.toggle_pinned(id)?;
            }
            Interaction::ToggleExpanded => {
                let expanded = self
                    .scheduler
                    .get(id)
                    .map(|record| record.expanded)
                    .ok_or(NotificationError::UnknownNotification(id))?;
                self.scheduler.set_expanded(id, !expanded)?;
            }
            Interaction::MenuOpened => self.scheduler.set_menu_active(id, true)?,
            Interaction::MenuClosed => self.scheduler.set_menu_active(id, false)?,
            Interaction::Dismiss => self.scheduler.dismiss(id)?,
            Interaction::ToggleBlock => {
                let path = self
                    .scheduler
                    .get(id)
                    .map(|record| record.process.path.clone())
                    .ok_or(NotificationError::UnknownNotification(id))?;
                self.spawn_toggle_block(path);
            }
        }
        Ok(())
    }

    fn spawn_toggle_block(&self, path: String) {
        let provider = self.block_list.clone();
        let store = self.rule_store.clone();
        let sender = self.handle.sender();
        tokio::spawn(async move {
            match toggle_block(provider.as_ref(), &store, &path).await {
                Ok(blocked) => {
                    info!("'{}' {} the block list", path, if blocked { "added to" } else { "removed from" });
                    let version = store.snapshot().version;
                    if sender.send(ControlEvent::RulesReloaded { version }).await.is_err() {
                        debug!("Control loop gone after block toggle");
                    }
                }
                Err(err) => warn!("Failed to toggle block rule for '{}': {}", path, err),
            }
        });
    }

    fn persist_settings(&self) {
        let Some(path) = self.config_path.clone() else {
            return;
        };
        let config = self.config.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(err) = ConfigLoader::save(&config, &path) {
                warn!("Failed to save settings to {:?}: {}", path, err);
            }
        });
    }

    fn status(&self) -> StatusReport {
        StatusReport {
            visible: self.scheduler.visible().to_vec(),
            queued: self.scheduler.queued_len(),
            stats: self.scheduler.stats(),
            notifications_enabled: self.config.notifications.enabled,
            blocking_enabled: self.config.monitor.blocking_enabled,
            expanded_view: self.scheduler.config().expanded_view,
            rule_version: self.rule_store.snapshot().version,
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}
