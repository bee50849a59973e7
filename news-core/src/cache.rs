use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::feed::NewsItem;
use crate::fetcher::FeedFetcher;
use crate::pipeline::aggregate;
use crate::settings::{NewsSettings, SettingsMap};
use crate::storage::SettingsStore;

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub fetched_at: Instant,
    pub items: Arc<Vec<NewsItem>>,
}

impl CacheEntry {
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

/// Last successful aggregation result. Only ever replaced by a non-empty list,
/// so a failed refresh keeps serving the previous entry.
#[derive(Debug, Default)]
pub struct NewsCache {
    entry: RwLock<Option<CacheEntry>>,
}

impl NewsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fresh(&self, ttl: Duration) -> Option<Arc<Vec<NewsItem>>> {
        self.entry
            .read()
            .await
            .as_ref()
            .filter(|entry| entry.is_fresh(ttl))
            .map(|entry| entry.items.clone())
    }

    /// Whatever is cached, regardless of age.
    pub async fn latest(&self) -> Option<Arc<Vec<NewsItem>>> {
        self.entry
            .read()
            .await
            .as_ref()
            .map(|entry| entry.items.clone())
    }

    /// Returns `false` and leaves the cache untouched when `items` is empty.
    pub async fn replace(&self, items: Vec<NewsItem>) -> bool {
        if items.is_empty() {
            return false;
        }
        *self.entry.write().await = Some(CacheEntry {
            fetched_at: Instant::now(),
            items: Arc::new(items),
        });
        true
    }
}

/// Serves the aggregated news list, refreshing lazily on read when the cache
/// has outlived the configured TTL.
pub struct NewsService {
    settings: Arc<dyn SettingsStore>,
    fetcher: Arc<dyn FeedFetcher>,
    cache: NewsCache,
    refresh_lock: Mutex<()>,
    /// Completed refresh attempts, successful or not.
    refreshes: AtomicU64,
}

impl NewsService {
    pub fn new(settings: Arc<dyn SettingsStore>, fetcher: Arc<dyn FeedFetcher>) -> Self {
        Self {
            settings,
            fetcher,
            cache: NewsCache::new(),
            refresh_lock: Mutex::new(()),
            refreshes: AtomicU64::new(0),
        }
    }

    pub fn cache(&self) -> &NewsCache {
        &self.cache
    }

    pub async fn current_settings(&self) -> NewsSettings {
        let map = match self.settings.snapshot().await {
            Ok(map) => map,
            Err(err) => {
                warn!(error = %err, "settings unavailable, using defaults");
                SettingsMap::new()
            }
        };
        NewsSettings::resolve(&map)
    }

    /// At most `max_items` items, newest first. Never fails: an empty list is
    /// returned when nothing has ever been fetched successfully.
    pub async fn latest(&self) -> Vec<NewsItem> {
        let settings = self.current_settings().await;

        if let Some(items) = self.cache.fresh(settings.ttl).await {
            debug!(count = items.len(), "serving cached news");
            return take(&items, settings.max_items);
        }

        // One refresh at a time. Requests queued behind it reuse its outcome,
        // even a failed one, instead of fetching again.
        let seen = self.refreshes.load(Ordering::Acquire);
        let _guard = self.refresh_lock.lock().await;
        if let Some(items) = self.cache.fresh(settings.ttl).await {
            return take(&items, settings.max_items);
        }

        if self.refreshes.load(Ordering::Acquire) == seen {
            let items = aggregate(self.fetcher.as_ref(), &settings).await;
            if !self.cache.replace(items).await {
                warn!("refresh produced no items, serving previous news");
            }
            self.refreshes.fetch_add(1, Ordering::Release);
        } else {
            debug!("refresh finished while waiting, reusing its outcome");
        }
        self.cache
            .latest()
            .await
            .map(|items| take(&items, settings.max_items))
            .unwrap_or_default()
    }
}

fn take(items: &[NewsItem], max_items: usize) -> Vec<NewsItem> {
    items.iter().take(max_items).cloned().collect()
}
