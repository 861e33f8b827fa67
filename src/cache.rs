//! Time-limited cache for list views.
//!
//! Each listing is loaded once and served from memory until the TTL runs out
//! or a write invalidates it.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use crate::mailing::Mailing;
use crate::message::Message;
use crate::recipient::Recipient;
use crate::Result;

/// Which listing to invalidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    Mailings,
    Messages,
    Recipients,
}

/// One cached listing.
///
/// `generation` is bumped on every clear. A load only stores its result if
/// no clear happened while it was running.
#[derive(Debug)]
struct Slot<T> {
    entry: RwLock<Option<(Instant, Arc<Vec<T>>)>>,
    generation: AtomicU64,
}

impl<T> Slot<T> {
    fn new() -> Self {
        Self {
            entry: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// Cached items, if younger than `ttl`.
    fn fresh(&self, ttl: Duration) -> Option<Arc<Vec<T>>> {
        let entry = self.entry.read().unwrap_or_else(PoisonError::into_inner);
        entry
            .as_ref()
            .filter(|(stored_at, _)| stored_at.elapsed() < ttl)
            .map(|(_, items)| Arc::clone(items))
    }

    /// Store `items` unless the slot was cleared after `generation` was read.
    fn store(&self, generation: u64, items: Vec<T>) -> Arc<Vec<T>> {
        let items = Arc::new(items);
        let mut entry = self.entry.write().unwrap_or_else(PoisonError::into_inner);
        if self.generation.load(Ordering::Acquire) == generation {
            *entry = Some((Instant::now(), Arc::clone(&items)));
        }
        items
    }

    fn clear(&self) {
        let mut entry = self.entry.write().unwrap_or_else(PoisonError::into_inner);
        *entry = None;
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    async fn get_or_load<F, Fut>(&self, ttl: Duration, load: F) -> Result<Arc<Vec<T>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>>>,
    {
        if ttl.is_zero() {
            return Ok(Arc::new(load().await?));
        }
        if let Some(items) = self.fresh(ttl) {
            return Ok(items);
        }
        let generation = self.generation.load(Ordering::Acquire);
        let items = load().await?;
        Ok(self.store(generation, items))
    }
}

/// Cache of the mailing, message and recipient listings.
///
/// A TTL of zero disables caching; every request loads from the database.
#[derive(Debug)]
pub struct ListingCache {
    ttl: Duration,
    mailings: Slot<Mailing>,
    messages: Slot<Message>,
    recipients: Slot<Recipient>,
}

impl ListingCache {
    /// Create a cache whose entries live for `ttl_secs` seconds.
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            ttl: Duration::from_secs(ttl_secs),
            mailings: Slot::new(),
            messages: Slot::new(),
            recipients: Slot::new(),
        }
    }

    /// Entry lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached mailing listing, loading it on a miss.
    pub async fn mailings<F, Fut>(&self, load: F) -> Result<Arc<Vec<Mailing>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Mailing>>>,
    {
        self.mailings.get_or_load(self.ttl, load).await
    }

    /// Cached message listing, loading it on a miss.
    pub async fn messages<F, Fut>(&self, load: F) -> Result<Arc<Vec<Message>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Message>>>,
    {
        self.messages.get_or_load(self.ttl, load).await
    }

    /// Cached recipient listing, loading it on a miss.
    pub async fn recipients<F, Fut>(&self, load: F) -> Result<Arc<Vec<Recipient>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Recipient>>>,
    {
        self.recipients.get_or_load(self.ttl, load).await
    }

    /// Drop one listing.
    pub fn invalidate(&self, kind: ListingKind) {
        match kind {
            ListingKind::Mailings => self.mailings.clear(),
            ListingKind::Messages => self.messages.clear(),
            ListingKind::Recipients => self.recipients.clear(),
        }
    }

    /// Drop every listing.
    pub fn invalidate_all(&self) {
        self.mailings.clear();
        self.messages.clear();
        self.recipients.clear();
    }
}

impl Default for ListingCache {
    fn default() -> Self {
        Self::new(900)
    }
}
