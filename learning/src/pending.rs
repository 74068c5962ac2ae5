//! Pending predictions awaiting a moderator decision.
//!
//! Keyed by content ID with last-write-wins semantics. Bounded two ways so a
//! long-running process does not grow without limit:
//!
//! - **Capacity**: inserting a new key at capacity evicts the oldest entry.
//!   Inserts are serialized on an insertion-order queue, so the bound holds
//!   under concurrent writers and eviction never scans the map
//! - **TTL**: expired entries are invisible to readers and removed by
//!   [`PendingPredictions::purge_expired`] or the sweep task

use dashmap::DashMap;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::PendingConfig;
use crate::types::PendingPrediction;

struct PendingEntry {
    prediction: PendingPrediction,
    inserted_at: Instant,
    /// Insertion order, used to pick the eviction victim
    seq: u64,
}

impl PendingEntry {
    fn is_expired(&self, ttl: Option<Duration>) -> bool {
        ttl.is_some_and(|ttl| self.inserted_at.elapsed() >= ttl)
    }
}

/// Cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingStats {
    pub size: usize,
    pub capacity: usize,
    pub inserted: u64,
    pub overwritten: u64,
    pub evicted: u64,
    pub expired: u64,
}

/// Concurrent map of content ID to pending prediction.
pub struct PendingPredictions {
    entries: DashMap<String, PendingEntry>,
    /// `(seq, content_id)` oldest first; records for removed or superseded
    /// entries are skipped when popped
    order: Mutex<VecDeque<(u64, String)>>,
    capacity: usize,
    ttl: Option<Duration>,
    seq: AtomicU64,
    inserted: AtomicU64,
    overwritten: AtomicU64,
    evicted: AtomicU64,
    expired: AtomicU64,
}

impl PendingPredictions {
    /// Create with the given capacity and no expiry.
    pub fn new(capacity: usize) -> Self {
        Self::with_ttl(capacity, None)
    }

    pub fn with_ttl(capacity: usize, ttl: Option<Duration>) -> Self {
        Self {
            entries: DashMap::new(),
            order: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
            ttl,
            seq: AtomicU64::new(0),
            inserted: AtomicU64::new(0),
            overwritten: AtomicU64::new(0),
            evicted: AtomicU64::new(0),
            expired: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &PendingConfig) -> Self {
        Self::with_ttl(config.capacity, config.ttl())
    }

    /// Store a prediction, replacing any previous one for the same content.
    pub fn insert(&self, prediction: PendingPrediction) {
        let key = prediction.content_id.clone();
        let mut order = self.order.lock().unwrap_or_else(PoisonError::into_inner);

        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let entry = PendingEntry {
            prediction,
            inserted_at: Instant::now(),
            seq,
        };

        if !self.entries.contains_key(&key) {
            while self.entries.len() >= self.capacity {
                if !self.evict_oldest(&mut order) {
                    break;
                }
            }
        }

        order.push_back((seq, key.clone()));
        if self.entries.insert(key.clone(), entry).is_some() {
            self.overwritten.fetch_add(1, Ordering::Relaxed);
            debug!(content_id = %key, "Pending prediction superseded");
        } else {
            self.inserted.fetch_add(1, Ordering::Relaxed);
        }

        if order.len() > self.capacity.saturating_mul(2) {
            order.retain(|(seq, key)| self.entries.get(key).is_some_and(|e| e.seq == *seq));
        }
    }

    /// Remove and return the prediction for `content_id`.
    pub fn take(&self, content_id: &str) -> Option<PendingPrediction> {
        let (_, entry) = self.entries.remove(content_id)?;
        if entry.is_expired(self.ttl) {
            self.expired.fetch_add(1, Ordering::Relaxed);
            return None;
        }
        Some(entry.prediction)
    }

    /// Peek at the prediction for `content_id`.
    pub fn get(&self, content_id: &str) -> Option<PendingPrediction> {
        self.entries
            .get(content_id)
            .filter(|entry| !entry.is_expired(self.ttl))
            .map(|entry| entry.prediction.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every expired prediction. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        if self.ttl.is_none() {
            return 0;
        }

        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(self.ttl));
        let removed = before.saturating_sub(self.entries.len());

        if removed > 0 {
            self.expired.fetch_add(removed as u64, Ordering::Relaxed);
        }
        removed
    }

    pub fn stats(&self) -> PendingStats {
        PendingStats {
            size: self.entries.len(),
            capacity: self.capacity,
            inserted: self.inserted.load(Ordering::Relaxed),
            overwritten: self.overwritten.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
        }
    }

    /// Remove the oldest live entry. Returns false when none is left.
    fn evict_oldest(&self, order: &mut VecDeque<(u64, String)>) -> bool {
        while let Some((seq, key)) = order.pop_front() {
            if self.entries.remove_if(&key, |_, entry| entry.seq == seq).is_some() {
                self.evicted.fetch_add(1, Ordering::Relaxed);
                debug!(content_id = %key, "Evicted oldest pending prediction");
                return true;
            }
        }
        false
    }
}

/// Spawn a background task that purges expired predictions.
pub fn spawn_sweep_task(cache: Arc<PendingPredictions>, interval: Duration) -> JoinHandle<()> {
    info!(
        interval_secs = interval.as_secs(),
        "Pending prediction sweep task started"
    );

    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;
            let purged = cache.purge_expired();
            if purged > 0 {
                debug!(purged, remaining = cache.len(), "Pending predictions swept");
            }
        }
    })
}
