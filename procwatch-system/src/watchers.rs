//! Hot reloading of the rule lists and the custom icon mapping file.
//!
//! Both watchers compare modification stamps on a fixed cadence and only
//! re-read a file when its stamp changed. A failed reload leaves the
//! previously installed data in place and is retried on the next tick.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use procwatch_domain::icons::{CustomIconMap, IconMappingFile};
use procwatch_domain::rules::{RuleList, RuleListProvider, RuleStore, SharedRuleStore};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::error::SystemResult;
use crate::events::ControlEvent;

/// `None` until the first successful load, then the stamp that load saw.
type SeenStamp = Option<Option<SystemTime>>;

pub struct RuleListWatcher {
    block: Arc<dyn RuleListProvider>,
    allow: Arc<dyn RuleListProvider>,
    store: Arc<SharedRuleStore>,
    seen_block: SeenStamp,
    seen_allow: SeenStamp,
    list_version: u64,
}

impl RuleListWatcher {
    pub fn new(
        block: Arc<dyn RuleListProvider>,
        allow: Arc<dyn RuleListProvider>,
        store: Arc<SharedRuleStore>,
    ) -> Self {
        Self { block, allow, store, seen_block: None, seen_allow: None, list_version: 0 }
    }

    /// Reloads whichever list changed and installs the result as one
    /// snapshot. Returns the new snapshot version, if any.
    ///
    /// If the store moved on while the files were being read (a block toggle
    /// wrote the list meanwhile), nothing is installed and the stamps are left
    /// alone, so the next check reads the files again.
    pub async fn check(&mut self) -> Option<u64> {
        let expected = self.store.snapshot().version;
        let block = reload_if_changed(self.block.as_ref(), &self.seen_block, &mut self.list_version).await;
        let allow = reload_if_changed(self.allow.as_ref(), &self.seen_allow, &mut self.list_version).await;
        if block.is_none() && allow.is_none() {
            return None;
        }

        let (block, block_stamp) = block.unzip();
        let (allow, allow_stamp) = allow.unzip();
        let Some(version) = self.store.replace_if_current(expected, block, allow) else {
            debug!("Rule store changed during reload, retrying on next tick");
            return None;
        };
        if let Some(stamp) = block_stamp {
            self.seen_block = Some(stamp);
        }
        if let Some(stamp) = allow_stamp {
            self.seen_allow = Some(stamp);
        }
        info!("Rule lists reloaded, snapshot v{}", version);
        Some(version)
    }

    pub async fn run(mut self, interval: Duration, events: mpsc::Sender<ControlEvent>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Some(version) = self.check().await {
                if events.send(ControlEvent::RulesReloaded { version }).await.is_err() {
                    debug!("Control loop gone, stopping rule list watcher");
                    return;
                }
            }
        }
    }
}

/// Loads the list if its stamp differs from `seen`. Returns the list with
/// the stamp taken before reading, so a write that lands during the read
/// still counts as a change next time.
async fn reload_if_changed(
    provider: &dyn RuleListProvider,
    seen: &SeenStamp,
    list_version: &mut u64,
) -> Option<(RuleList, Option<SystemTime>)> {
    let stamp = match provider.modified().await {
        Ok(stamp) => stamp,
        Err(err) => {
            warn!("Cannot stat rule list {}: {}", provider.describe(), err);
            return None;
        }
    };
    if seen.as_ref() == Some(&stamp) {
        return None;
    }

    *list_version += 1;
    match provider.load(*list_version).await {
        Ok(list) => {
            // Loading a missing list creates it; that write is ours.
            let stamp = match stamp {
                Some(_) => stamp,
                None => provider.modified().await.unwrap_or(None),
            };
            Some((list, stamp))
        }
        Err(err) => {
            warn!("Keeping previous rules, reload of {} failed: {}", provider.describe(), err);
            None
        }
    }
}

/// Adds `path` to the block list, or removes it if it is already there, and
/// installs the updated list. Returns whether the path is now listed.
pub async fn toggle_block(
    provider: &dyn RuleListProvider,
    store: &SharedRuleStore,
    path: &str,
) -> SystemResult<bool> {
    let blocked = if provider.remove_entry(path).await? {
        false
    } else {
        provider.add_entry(path).await?
    };
    let list = provider.load(store.snapshot().version + 1).await?;
    store.replace_block(list);
    Ok(blocked)
}

pub struct IconMappingWatcher {
    file: IconMappingFile,
    seen: SeenStamp,
}

impl IconMappingWatcher {
    pub fn new(file: IconMappingFile) -> Self {
        Self { file, seen: None }
    }

    /// Returns the freshly parsed mapping if the file changed.
    pub async fn check(&mut self) -> Option<CustomIconMap> {
        let stamp = match self.file.modified().await {
            Ok(stamp) => stamp,
            Err(err) => {
                warn!("Cannot stat icon mappings: {}", err);
                return None;
            }
        };
        if self.seen.as_ref() == Some(&stamp) {
            return None;
        }
        match self.file.load().await {
            Ok(map) => {
                self.seen = Some(self.file.modified().await.unwrap_or(stamp));
                info!("Loaded {} custom icon mapping(s) from {:?}", map.len(), self.file.path());
                Some(map)
            }
            Err(err) => {
                warn!("Keeping previous icon mappings: {}", err);
                None
            }
        }
    }

    pub async fn run(mut self, interval: Duration, events: mpsc::Sender<ControlEvent>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Some(map) = self.check().await {
                if events.send(ControlEvent::IconMappingsReloaded(Arc::new(map))).await.is_err() {
                    debug!("Control loop gone, stopping icon mapping watcher");
                    return;
                }
            }
        }
    }
}
