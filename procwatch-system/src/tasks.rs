//! Producers that feed the control loop.

use std::sync::Arc;

use procwatch_core::config::CoreConfig;
use procwatch_domain::icons::IconMappingFile;
use procwatch_domain::rules::{FilesystemRuleListProvider, SharedRuleStore};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::events::ControlEvent;
use crate::process_feed::ProcFsFeed;
use crate::watchers::{IconMappingWatcher, RuleListWatcher};

/// Process feed plus the rule list and icon mapping watchers, each on its
/// own task.
pub struct BackgroundTasks {
    handles: Vec<JoinHandle<()>>,
}

impl BackgroundTasks {
    pub fn spawn(config: &CoreConfig, rule_store: Arc<SharedRuleStore>, events: mpsc::Sender<ControlEvent>) -> Self {
        let reload_interval = config.monitor.rule_reload_interval();

        let rules = RuleListWatcher::new(
            Arc::new(FilesystemRuleListProvider::block_list(&config.paths.block_list)),
            Arc::new(FilesystemRuleListProvider::allow_list(&config.paths.allow_list)),
            rule_store,
        );
        let mappings = IconMappingWatcher::new(IconMappingFile::new(
            &config.paths.custom_icons,
            &config.paths.custom_icons_dir,
        ));
        let feed = ProcFsFeed::new();

        let handles = vec![
            tokio::spawn(rules.run(reload_interval, events.clone())),
            tokio::spawn(mappings.run(reload_interval, events.clone())),
            tokio::spawn(feed.run(config.monitor.poll_interval(), events)),
        ];
        Self { handles }
    }

    pub fn abort_all(self) {
        for handle in &self.handles {
            handle.abort();
        }
        debug!("Stopped {} background task(s)", self.handles.len());
    }
}
