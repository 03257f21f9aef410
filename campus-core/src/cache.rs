//! Single-slot TTL cache for the upcoming-events result.
//!
//! The slot does not key on source or limit: whichever configuration was
//! fetched last is what a fresh hit returns. Concurrent misses may both
//! fetch; the last one to finish wins the slot.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::error::CampusResult;
use crate::event::EventQueryResult;

struct CacheEntry {
    payload: Arc<EventQueryResult>,
    fetched_at: Instant,
}

pub struct EventCache {
    ttl: Duration,
    slot: Mutex<Option<CacheEntry>>,
}

impl EventCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached payload while it is younger than the TTL, otherwise
    /// run `fetch` and store its result.
    ///
    /// A failed fetch leaves the slot untouched.
    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> CampusResult<Arc<EventQueryResult>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = CampusResult<EventQueryResult>>,
    {
        if let Some(payload) = self.fresh() {
            tracing::debug!(events = payload.len(), "event cache hit");
            return Ok(payload);
        }

        tracing::debug!("event cache miss");
        let payload = Arc::new(fetch().await?);
        self.store(Arc::clone(&payload));

        Ok(payload)
    }

    /// Last stored payload, fresh or not.
    pub fn cached(&self) -> Option<Arc<EventQueryResult>> {
        self.lock().as_ref().map(|entry| Arc::clone(&entry.payload))
    }

    fn fresh(&self) -> Option<Arc<EventQueryResult>> {
        let slot = self.lock();
        let entry = slot.as_ref()?;
        (entry.fetched_at.elapsed() < self.ttl).then(|| Arc::clone(&entry.payload))
    }

    fn store(&self, payload: Arc<EventQueryResult>) {
        *self.lock() = Some(CacheEntry {
            payload,
            fetched_at: Instant::now(),
        });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<CacheEntry>> {
        // Entries are replaced whole, so a poisoned slot is still consistent
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
