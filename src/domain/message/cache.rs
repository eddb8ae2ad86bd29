//! Process-local read-through cache in front of the template store.
//!
//! Entries expire a fixed time after insertion. A miss starts one shared
//! load per key; concurrent lookups for that key await the same load and see
//! the same result. Failed loads are not cached.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};

use crate::metrics::CacheMetrics;

use super::store::TemplateStore;
use super::types::{LocalizationError, LocalizationResult};

/// Default entry lifetime
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

type LoadFuture = Shared<BoxFuture<'static, LocalizationResult<String>>>;

/// A cached template value
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: String,
    pub inserted_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(value: String) -> Self {
        Self {
            value,
            inserted_at: Utc::now(),
        }
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        Utc::now()
            .signed_duration_since(self.inserted_at)
            .to_std()
            .map(|age| age > ttl)
            .unwrap_or(false)
    }
}

pub struct TemplateCache {
    store: Arc<dyn TemplateStore>,
    bucket: String,
    ttl: Duration,
    entries: Arc<DashMap<String, CacheEntry>>,
    /// Loads currently running, tagged with a flight id
    in_flight: DashMap<String, (u64, LoadFuture)>,
    next_flight: AtomicU64,
}

impl TemplateCache {
    pub fn new(store: Arc<dyn TemplateStore>, bucket: impl Into<String>) -> Self {
        Self::with_ttl(store, bucket, DEFAULT_TTL)
    }

    pub fn with_ttl(store: Arc<dyn TemplateStore>, bucket: impl Into<String>, ttl: Duration) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            ttl,
            entries: Arc::new(DashMap::new()),
            in_flight: DashMap::new(),
            next_flight: AtomicU64::new(0),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Current value for `key`, loading it from the store on miss or expiry.
    pub async fn get(&self, key: &str) -> LocalizationResult<String> {
        if let Some(value) = self.live_value(key) {
            CacheMetrics::record_hit();
            tracing::debug!(key = %key, "Template cache hit");
            return Ok(value);
        }

        CacheMetrics::record_miss();

        let (flight, load) = match self.in_flight.entry(key.to_string()) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => {
                // A load may have completed between the lookup above and here
                if let Some(value) = self.live_value(key) {
                    return Ok(value);
                }
                let flight = self.next_flight.fetch_add(1, Ordering::Relaxed);
                let load = self.start_load(key).shared();
                entry.insert((flight, load.clone()));
                (flight, load)
            }
        };

        let result = load.await;
        // Only clear our own flight; a newer one may already be running
        self.in_flight
            .remove_if(key, |_, (current, _)| *current == flight);
        result
    }

    /// Seed or replace an entry without going through the store.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries
            .insert(key.into(), CacheEntry::new(value.into()));
    }

    /// Number of stored entries, expired ones included until purged
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop expired entries. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, entry| !entry.is_expired(ttl));
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            tracing::debug!(removed, "Purged expired template cache entries");
        }
        removed
    }

    fn live_value(&self, key: &str) -> Option<String> {
        let entry = self.entries.get(key)?;
        if entry.is_expired(self.ttl) {
            None
        } else {
            Some(entry.value.clone())
        }
    }

    fn start_load(&self, key: &str) -> BoxFuture<'static, LocalizationResult<String>> {
        let store = self.store.clone();
        let entries = self.entries.clone();
        let bucket = self.bucket.clone();
        let key = key.to_string();

        async move {
            let started = Instant::now();
            let result = store.get(&bucket, &key).await;
            let elapsed = started.elapsed().as_secs_f64();

            match result {
                Ok(Some(value)) => {
                    entries.insert(key.clone(), CacheEntry::new(value.clone()));
                    CacheMetrics::record_load("loaded", elapsed);
                    tracing::debug!(key = %key, backend = store.backend_name(), "Template loaded");
                    Ok(value)
                }
                Ok(None) => {
                    CacheMetrics::record_load("not_found", elapsed);
                    Err(LocalizationError::NotFound(key))
                }
                Err(e) => {
                    CacheMetrics::record_load("unavailable", elapsed);
                    tracing::warn!(key = %key, error = %e, "Template load failed");
                    Err(LocalizationError::from(e))
                }
            }
        }
        .boxed()
    }
}
