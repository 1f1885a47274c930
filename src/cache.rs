//! Time-boxed caching of computed manifests.
//!
//! Building a manifest walks a directory tree. Listings change rarely (a
//! deploy or a manual upload), so each listing endpoint keeps its last
//! result for a fixed window instead of rescanning on every request.
//!
//! # Design
//!
//! A [`TtlCache`] maps a key to an `Arc` of the computed value plus an
//! absolute expiry instant. Single-listing endpoints use `K = ()`; the
//! per-collection endpoint keys by folder name.
//!
//! - **Hit**: an entry exists and `now < expires_at`. The stored `Arc` is
//!   returned as-is, so callers within one window share the same object.
//! - **Miss**: no entry, or it expired. The value is recomputed, stored with
//!   `expires_at = now + ttl` and returned. A TTL too large to add to the
//!   clock's instant stores the entry with no expiry.
//!
//! There is no background refresh and no stampede protection. The lock is
//! held only to read or replace a slot, never while computing, so concurrent
//! misses each recompute and the last write wins. Recomputation is
//! idempotent and cheap relative to request volume.
//!
//! ## Clock
//!
//! Time comes from an injected [`Clock`]. Production uses [`SystemClock`];
//! tests use [`ManualClock`] and advance it explicitly instead of sleeping.
//!
//! ## ETags
//!
//! [`etag`] derives a strong validator from a serialized response body so
//! clients can revalidate a cached listing with `If-None-Match`.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(PoisonError::into_inner);
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A cached value with its absolute expiry. `None` never expires.
#[derive(Debug)]
pub struct CacheEntry<V> {
    pub data: Arc<V>,
    pub expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    pub fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

impl<V> Clone for CacheEntry<V> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            expires_at: self.expires_at,
        }
    }
}

/// Keyed cache whose entries expire a fixed duration after being computed.
pub struct TtlCache<K, V> {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The fresh entry for `key`, if any. Expired entries are not returned.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let now = self.clock.now();
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .filter(|entry| entry.is_fresh(now))
            .map(|entry| Arc::clone(&entry.data))
    }

    /// Store `value` under `key`, replacing whatever was there.
    pub fn insert(&self, key: K, value: V) -> Arc<V> {
        let data = Arc::new(value);
        let entry = CacheEntry {
            data: Arc::clone(&data),
            expires_at: self.clock.now().checked_add(self.ttl),
        };
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, entry);
        data
    }

    /// Return the fresh cached value, or compute, store and return a new one.
    pub fn get_or_compute(&self, key: K, compute: impl FnOnce() -> V) -> Arc<V> {
        if let Some(hit) = self.get(&key) {
            return hit;
        }
        self.insert(key, compute())
    }

    /// Async variant of [`get_or_compute`](Self::get_or_compute).
    ///
    /// The lock is not held across the `.await`.
    pub async fn get_or_compute_async<F, Fut>(&self, key: K, compute: F) -> Arc<V>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = V>,
    {
        if let Some(hit) = self.get(&key) {
            return hit;
        }
        let value = compute().await;
        self.insert(key, value)
    }

    /// Drop expired entries. Lookups ignore them anyway; this only frees memory.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(now));
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Strong ETag (quoted SHA-256 hex) for a response body.
pub fn etag(body: &[u8]) -> String {
    format!("\"{:x}\"", Sha256::digest(body))
}
