//! Rate-limit buckets
//!
//! One bucket per `(method, route template)`. A bucket is a shared gate:
//! while closed, every request in the bucket waits on the same reopen signal.
//! Only one caller can perform the open-to-closed transition; it schedules
//! the reopen on a detached task so the gate reopens even if that caller is
//! cancelled.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::route::BucketKey;

/// Gate shared by all requests on one route
#[derive(Debug)]
pub struct Bucket {
    gate: watch::Sender<bool>,
    reopen_at: Mutex<Option<Instant>>,
}

impl Bucket {
    /// Create an open bucket
    #[must_use]
    pub fn new() -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            gate,
            reopen_at: Mutex::new(None),
        }
    }

    /// Check if requests may proceed
    #[inline]
    pub fn is_open(&self) -> bool {
        *self.gate.borrow()
    }

    /// When a closed bucket is expected to reopen
    pub fn reopen_at(&self) -> Option<Instant> {
        *self.reopen_at.lock()
    }

    /// Suspend until the gate is open
    pub async fn wait_open(&self) {
        let mut rx = self.gate.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait
        let _ = rx.wait_for(|open| *open).await;
    }

    /// Close the gate for `retry_after`
    ///
    /// Returns true if this call closed it. A false return means another
    /// request is already handling the throttle and the caller should wait.
    pub fn close(&self, retry_after: Duration) -> bool {
        let closed = self.gate.send_if_modified(|open| {
            if *open {
                *open = false;
                true
            } else {
                false
            }
        });
        if closed {
            // None when the deadline is past what `Instant` can represent
            *self.reopen_at.lock() = Instant::now().checked_add(retry_after);
        }
        closed
    }

    /// Reopen the gate, waking every waiter
    pub fn open(&self) {
        *self.reopen_at.lock() = None;
        self.gate.send_replace(true);
    }

    /// Close for `retry_after` and wait for the reopen
    ///
    /// If the gate is already closed, waits for the pending reopen instead.
    /// Must be called from within a tokio runtime.
    pub async fn throttle(self: &Arc<Self>, retry_after: Duration) {
        if self.close(retry_after) {
            let bucket = Arc::clone(self);
            tokio::spawn(async move {
                tokio::time::sleep(retry_after).await;
                bucket.open();
            });
        }
        self.wait_open().await;
    }
}

impl Default for Bucket {
    fn default() -> Self {
        Self::new()
    }
}

/// All buckets known to a client
#[derive(Debug, Default)]
pub struct BucketMap {
    buckets: DashMap<BucketKey, Arc<Bucket>>,
}

impl BucketMap {
    /// Create an empty map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the bucket for a key
    ///
    /// Creation is idempotent: concurrent callers receive the same bucket.
    pub fn get(&self, key: &BucketKey) -> Arc<Bucket> {
        if let Some(bucket) = self.buckets.get(key) {
            return bucket.clone();
        }
        self.buckets
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Bucket::new()))
            .clone()
    }

    /// Number of buckets seen so far
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Check if no bucket was created yet
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
