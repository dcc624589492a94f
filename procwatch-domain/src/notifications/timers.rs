//! Deadline bookkeeping for per-record timers.
//!
//! At most one deadline exists per key: scheduling again replaces the old
//! deadline, so a rescheduled timer can never fire twice.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Display time elapsed; start fading.
    Idle,
    /// Fade finished; remove the record.
    FadeComplete,
}

#[derive(Debug)]
pub struct TimerSet<K> {
    deadlines: HashMap<K, Instant>,
}

impl<K> Default for TimerSet<K> {
    fn default() -> Self {
        Self { deadlines: HashMap::new() }
    }
}

impl<K: Copy + Eq + Hash> TimerSet<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, key: K, deadline: Instant) {
        self.deadlines.insert(key, deadline);
    }

    pub fn cancel(&mut self, key: &K) -> bool {
        self.deadlines.remove(key).is_some()
    }

    pub fn cancel_where<F: Fn(&K) -> bool>(&mut self, predicate: F) {
        self.deadlines.retain(|key, _| !predicate(key));
    }

    pub fn clear(&mut self) {
        self.deadlines.clear();
    }

    pub fn is_scheduled(&self, key: &K) -> bool {
        self.deadlines.contains_key(key)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }

    /// Removes and returns every key due at `now`, earliest first.
    pub fn pop_due(&mut self, now: Instant) -> Vec<K> {
        let mut due: Vec<(Instant, K)> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(key, deadline)| (*deadline, *key))
            .collect();
        due.sort_by_key(|(deadline, _)| *deadline);
        for (_, key) in &due {
            self.deadlines.remove(key);
        }
        due.into_iter().map(|(_, key)| key).collect()
    }

    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_reschedule_replaces_deadline() {
        let start = Instant::now();
        let mut timers = TimerSet::new();
        timers.schedule(1u32, start + Duration::from_secs(1));
        timers.schedule(1u32, start + Duration::from_secs(5));

        assert!(timers.pop_due(start + Duration::from_secs(2)).is_empty());
        assert_eq!(timers.pop_due(start + Duration::from_secs(5)), vec![1]);
        assert!(timers.pop_due(start + Duration::from_secs(10)).is_empty());
    }

    #[test]
    fn test_pop_due_orders_by_deadline() {
        let start = Instant::now();
        let mut timers = TimerSet::new();
        timers.schedule('b', start + Duration::from_millis(20));
        timers.schedule('a', start + Duration::from_millis(10));
        timers.schedule('c', start + Duration::from_millis(99));

        assert_eq!(timers.next_deadline(), Some(start + Duration::from_millis(10)));
        assert_eq!(timers.pop_due(start + Duration::from_millis(50)), vec!['a', 'b']);
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn test_cancel_where() {
        let start = Instant::now();
        let mut timers = TimerSet::new();
        timers.schedule((1, TimerKind::Idle), start);
        timers.schedule((1, TimerKind::FadeComplete), start);
        timers.schedule((2, TimerKind::Idle), start);
        timers.cancel_where(|(id, _)| *id == 1);
        assert!(timers.is_scheduled(&(2, TimerKind::Idle)));
        assert_eq!(timers.len(), 1);
    }
}
