//! Holder for the current rule snapshot.

use parking_lot::RwLock;
use std::sync::Arc;

use super::types::{RuleList, RuleSnapshot};

/// Source of rule snapshots.
///
/// Implementations must hand out complete snapshots only: a reader gets either
/// the state before a reload or the state after it.
pub trait RuleStore: Send + Sync {
    fn snapshot(&self) -> Arc<RuleSnapshot>;
}

/// Swaps an `Arc<RuleSnapshot>` under a short-lived lock. Readers clone the
/// pointer and evaluate without holding the lock.
#[derive(Debug, Default)]
pub struct SharedRuleStore {
    current: RwLock<Arc<RuleSnapshot>>,
}

impl SharedRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lists(block: RuleList, allow: RuleList) -> Self {
        let store = Self::new();
        store.replace_both(block, allow);
        store
    }

    /// Replaces the block list, keeping the current allow list.
    pub fn replace_block(&self, block: RuleList) -> u64 {
        self.swap(|current| (Arc::new(block), current.allow.clone()))
    }

    /// Replaces the allow list, keeping the current block list.
    pub fn replace_allow(&self, allow: RuleList) -> u64 {
        self.swap(|current| (current.block.clone(), Arc::new(allow)))
    }

    pub fn replace_both(&self, block: RuleList, allow: RuleList) -> u64 {
        self.swap(|_| (Arc::new(block), Arc::new(allow)))
    }

    /// Installs whichever lists are given, but only while the current
    /// snapshot is still at version `expected`. Returns the new version, or
    /// `None` if another writer got there first.
    pub fn replace_if_current(
        &self,
        expected: u64,
        block: Option<RuleList>,
        allow: Option<RuleList>,
    ) -> Option<u64> {
        let mut guard = self.current.write();
        if guard.version != expected {
            log::debug!("Discarding rules loaded at v{}, store is at v{}", expected, guard.version);
            return None;
        }
        let block = block.map(Arc::new).unwrap_or_else(|| guard.block.clone());
        let allow = allow.map(Arc::new).unwrap_or_else(|| guard.allow.clone());
        Some(Self::install(&mut guard, block, allow))
    }

    fn swap<F>(&self, build: F) -> u64
    where
        F: FnOnce(&RuleSnapshot) -> (Arc<RuleList>, Arc<RuleList>),
    {
        let mut guard = self.current.write();
        let (block, allow) = build(&guard);
        Self::install(&mut guard, block, allow)
    }

    fn install(current: &mut Arc<RuleSnapshot>, block: Arc<RuleList>, allow: Arc<RuleList>) -> u64 {
        let version = current.version + 1;
        log::debug!(
            "Rule snapshot v{} installed ({} block, {} allow entries)",
            version,
            block.len(),
            allow.len()
        );
        *current = Arc::new(RuleSnapshot { version, block, allow });
        version
    }
}

impl RuleStore for SharedRuleStore {
    fn snapshot(&self) -> Arc<RuleSnapshot> {
        self.current.read().clone()
    }
}
