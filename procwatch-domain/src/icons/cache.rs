//! Bounded, time-limited icon store.
//!
//! Eviction is by insertion time only: `get` never refreshes an entry, and
//! overwriting a key counts as a fresh insertion. When a `put` pushes the
//! cache over `max_size`, the entries with the newest insertion stamps are
//! kept whether or not the older ones had expired.
//!
//! The cache is not synchronized. The orchestrator owns it on its control
//! task; asynchronous lookups that finish after a [`IconCache::clear`] are
//! turned away through the generation token (see [`IconCache::put_if_current`]).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use procwatch_core::utils::string_utils::{base_name, normalize_path_trimmed};

use super::types::Icon;
use crate::time::Clock;

#[derive(Debug)]
struct CacheEntry<T> {
    icon: Arc<T>,
    inserted_at: Instant,
    /// Tie-breaker for entries inserted at the same instant.
    sequence: u64,
}

#[derive(Debug)]
pub struct IconCache<T = Icon> {
    entries: HashMap<String, CacheEntry<T>>,
    max_size: usize,
    timeout: Duration,
    clock: Arc<dyn Clock>,
    next_sequence: u64,
    generation: u64,
}

/// Case-insensitive, separator-normalized cache key for a path.
pub fn cache_key(path: &str) -> String {
    normalize_path_trimmed(path)
}

impl<T> IconCache<T> {
    pub fn new(max_size: usize, timeout: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            max_size,
            timeout,
            clock,
            next_sequence: 0,
            generation: 0,
        }
    }

    /// Returns the icon if it was inserted less than `timeout` ago.
    pub fn get(&self, key: &str) -> Option<Arc<T>> {
        let now = self.clock.now();
        self.entries
            .get(&cache_key(key))
            .filter(|entry| self.is_fresh(entry, now))
            .map(|entry| entry.icon.clone())
    }

    /// Inserts or overwrites `key`, then trims the cache to `max_size`.
    pub fn put(&mut self, key: &str, icon: impl Into<Arc<T>>) {
        let entry = CacheEntry {
            icon: icon.into(),
            inserted_at: self.clock.now(),
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;
        self.entries.insert(cache_key(key), entry);
        self.evict();
    }

    /// Stores the result of a lookup that began under `generation`.
    ///
    /// Returns `false`, storing nothing, when the cache was cleared since.
    pub fn put_if_current(&mut self, generation: u64, key: &str, icon: impl Into<Arc<T>>) -> bool {
        if generation != self.generation {
            log::debug!(
                "Discarding icon for '{}' resolved under stale generation {} (now {})",
                key,
                generation,
                self.generation
            );
            return false;
        }
        self.put(key, icon);
        true
    }

    /// Empties the cache and invalidates lookups still in flight.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.generation += 1;
    }

    /// Token to pass back into [`Self::put_if_current`].
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Any fresh icon cached under a path with the same file name as `path`.
    ///
    /// Used as a last resort before the generated placeholder; when several
    /// match, the most recently inserted wins.
    pub fn find_by_base_name(&self, path: &str) -> Option<Arc<T>> {
        let key = cache_key(path);
        let wanted = base_name(&key);
        let now = self.clock.now();
        self.entries
            .iter()
            .filter(|(k, entry)| base_name(k) == wanted && self.is_fresh(entry, now))
            .max_by_key(|(_, entry)| (entry.inserted_at, entry.sequence))
            .map(|(_, entry)| entry.icon.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    fn is_fresh(&self, entry: &CacheEntry<T>, now: Instant) -> bool {
        now.saturating_duration_since(entry.inserted_at) < self.timeout
    }

    fn evict(&mut self) {
        if self.entries.len() <= self.max_size {
            return;
        }
        let mut stamps: Vec<(Instant, u64, String)> = self
            .entries
            .iter()
            .map(|(key, entry)| (entry.inserted_at, entry.sequence, key.clone()))
            .collect();
        // Newest first.
        stamps.sort_unstable_by(|a, b| (b.0, b.1).cmp(&(a.0, a.1)));
        let evicted = stamps.len() - self.max_size;
        for (_, _, key) in stamps.into_iter().skip(self.max_size) {
            self.entries.remove(&key);
        }
        log::trace!("Icon cache evicted {} entries", evicted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ManualClock;
    use pretty_assertions::assert_eq;

    fn cache(max_size: usize, timeout_secs: u64) -> (IconCache<String>, Arc<ManualClock>) {
        let clock = ManualClock::new();
        (IconCache::new(max_size, Duration::from_secs(timeout_secs), clock.clone()), clock)
    }

    #[test]
    fn test_put_then_get_returns_value() {
        let (mut cache, _clock) = cache(4, 300);
        cache.put("/usr/bin/top", "top-icon".to_string());
        assert_eq!(cache.get("/usr/bin/top").as_deref(), Some(&"top-icon".to_string()));
    }

    #[test]
    fn test_keys_are_case_and_separator_insensitive() {
        let (mut cache, _clock) = cache(4, 300);
        cache.put(r"C:\Tools\App.exe", "app".to_string());
        assert!(cache.get("c:/tools/app.EXE").is_some());
    }

    #[test]
    fn test_get_expires_at_timeout_without_refreshing() {
        let (mut cache, clock) = cache(4, 10);
        cache.put("k", "v".to_string());
        clock.advance(Duration::from_secs(9));
        assert!(cache.get("k").is_some());
        clock.advance(Duration::from_secs(1));
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_overwrite_resets_insertion_time() {
        let (mut cache, clock) = cache(4, 10);
        cache.put("k", "old".to_string());
        clock.advance(Duration::from_secs(8));
        cache.put("k", "new".to_string());
        clock.advance(Duration::from_secs(8));
        assert_eq!(cache.get("k").as_deref(), Some(&"new".to_string()));
    }

    #[test]
    fn test_eviction_keeps_newest_insertions() {
        let (mut cache, clock) = cache(3, 300);
        for key in ["a", "b", "c", "d"] {
            cache.put(key, key.to_string());
            clock.advance(Duration::from_millis(1));
        }
        assert_eq!(cache.len(), 3);
        assert!(cache.get("a").is_none());
        for key in ["b", "c", "d"] {
            assert!(cache.get(key).is_some(), "{} should survive", key);
        }
    }

    #[test]
    fn test_eviction_ignores_reads() {
        let (mut cache, _clock) = cache(2, 300);
        cache.put("a", "a".to_string());
        cache.put("b", "b".to_string());
        let _ = cache.get("a");
        cache.put("c", "c".to_string());
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
    }

    #[test]
    fn test_clear_empties_and_rejects_stale_puts() {
        let (mut cache, _clock) = cache(4, 300);
        cache.put("a", "a".to_string());
        let generation = cache.generation();
        cache.clear();
        assert!(cache.is_empty());
        assert!(!cache.put_if_current(generation, "b", "b".to_string()));
        assert!(cache.get("b").is_none());
        assert!(cache.put_if_current(cache.generation(), "b", "b".to_string()));
    }

    #[test]
    fn test_find_by_base_name_prefers_newest() {
        let (mut cache, clock) = cache(8, 300);
        cache.put("/opt/one/tool", "one".to_string());
        clock.advance(Duration::from_millis(5));
        cache.put("/opt/two/tool", "two".to_string());
        cache.put("/opt/two/other", "other".to_string());
        assert_eq!(cache.find_by_base_name("/usr/local/bin/TOOL").as_deref(), Some(&"two".to_string()));
        assert!(cache.find_by_base_name("/usr/bin/missing").is_none());
    }

    #[test]
    fn test_zero_capacity_holds_nothing() {
        let (mut cache, _clock) = cache(0, 300);
        cache.put("a", "a".to_string());
        assert!(cache.is_empty());
    }
}
