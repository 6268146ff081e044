use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::interval;
use tracing::debug;

use crate::metrics::RATE_LIMIT_CLIENTS;

// Rate limit entry - tracks requests per client key
#[derive(Debug, Clone, Copy)]
pub struct RateLimitEntry {
    pub count: u32,
    pub window_start: Instant,
}

/// Fixed-window request counter keyed by client key.
///
/// A key gets `limit` requests per `window`. The window starts on the first
/// request and is replaced by a fresh one (counting that request) on the
/// first request after it has fully elapsed. Requests rejected inside a
/// window still bump the counter.
pub struct RateLimiter {
    entries: DashMap<String, RateLimitEntry>,
    limit: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            limit,
            window,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    // true when the request is allowed
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    pub fn check_at(&self, key: &str, now: Instant) -> bool {
        // the entry guard holds the shard lock, so the read and the update
        // below happen as one step for this key
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert(RateLimitEntry {
                count: 0,
                window_start: now,
            });

        // window expired..? Start a new one with this request in it
        if now.saturating_duration_since(entry.window_start) > self.window {
            entry.count = 1;
            entry.window_start = now;
            return true;
        }

        entry.count = entry.count.saturating_add(1);
        entry.count <= self.limit
    }

    pub fn entry(&self, key: &str) -> Option<RateLimitEntry> {
        self.entries.get(key).map(|e| *e)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry whose window ended before `now`. Returns how many went.
    pub fn sweep_at(&self, now: Instant) -> usize {
        let before = self.entries.len();
        let window = self.window;
        self.entries
            .retain(|_, e| now.saturating_duration_since(e.window_start) <= window);
        before.saturating_sub(self.entries.len())
    }
}

// Sweeper - runs every `every` and evicts expired windows
pub async fn sweeper(limiter: Arc<RateLimiter>, every: Duration) {
    let mut interval = interval(every);

    debug!(interval = ?every, "Rate limit sweeper started");

    loop {
        interval.tick().await;

        let removed = limiter.sweep_at(Instant::now());
        RATE_LIMIT_CLIENTS.set(limiter.len() as f64);
        if removed > 0 {
            debug!(removed, remaining = limiter.len(), "Swept expired rate limit entries");
        }
    }
}
