// src/rates/cache.rs
//! Short-lived memoization of dataset reads, keyed by the resolved filter.
//!
//! Absolute TTL, no sliding refresh. Only non-empty results are stored, so a level
//! that came back empty (or failed) is asked again on the next query.

use anyhow::Result;
use async_trait::async_trait;
use metrics::counter;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

use crate::location::LocationFilter;
use crate::rates::types::{PriceRecord, RateSource};

struct CacheEntry {
    records: Vec<PriceRecord>,
    inserted_at: Instant,
}

pub struct CachedRateSource {
    inner: Arc<dyn RateSource>,
    ttl: Duration,
    entries: Mutex<HashMap<LocationFilter, CacheEntry>>,
}

impl CachedRateSource {
    pub fn new(inner: Arc<dyn RateSource>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<LocationFilter, CacheEntry>> {
        match self.entries.lock() {
            Ok(g) => g,
            Err(poison) => poison.into_inner(),
        }
    }

    fn get_fresh(&self, filter: &LocationFilter) -> Option<Vec<PriceRecord>> {
        let now = Instant::now();
        let mut entries = self.lock();
        entries.retain(|_, e| now.duration_since(e.inserted_at) < self.ttl);
        entries.get(filter).map(|e| e.records.clone())
    }
}

#[async_trait]
impl RateSource for CachedRateSource {
    async fn fetch(&self, filter: &LocationFilter) -> Result<Vec<PriceRecord>> {
        if let Some(hit) = self.get_fresh(filter) {
            counter!("rate_cache_hits_total").increment(1);
            tracing::debug!(target: "rates", provider = self.inner.name(), "rate cache hit");
            return Ok(hit);
        }

        let records = self.inner.fetch(filter).await?;
        if !records.is_empty() {
            self.lock().insert(
                filter.clone(),
                CacheEntry {
                    records: records.clone(),
                    inserted_at: Instant::now(),
                },
            );
        }
        Ok(records)
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
