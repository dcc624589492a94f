use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Sliding-window admission limiter.
#[derive(Debug)]
pub struct RateLimiter {
    limit: usize,
    window: Duration,
    stamps: VecDeque<Instant>,
}

impl RateLimiter {
    pub fn per_second(limit: u32) -> Self {
        Self::new(limit, Duration::from_secs(1))
    }

    pub fn new(limit: u32, window: Duration) -> Self {
        Self { limit: limit as usize, window, stamps: VecDeque::new() }
    }

    /// Records an event at `now` if fewer than `limit` events fall inside the
    /// window ending at `now`. Refused events are not recorded.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        while let Some(oldest) = self.stamps.front() {
            if now.saturating_duration_since(*oldest) >= self.window {
                self.stamps.pop_front();
            } else {
                break;
            }
        }
        if self.stamps.len() >= self.limit {
            return false;
        }
        self.stamps.push_back(now);
        true
    }

    pub fn set_limit(&mut self, limit: u32) {
        self.limit = limit as usize;
    }
}
