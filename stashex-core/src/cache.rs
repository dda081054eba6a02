//! In-memory TTL cache for translated lookup responses.
//!
//! Keyed by the query filter fingerprint. Expiration is lazy: an entry
//! older than the TTL is evicted by the `get` that observes it; there
//! is no background sweeper. Concurrent writers for one fingerprint are
//! last-write-wins, and concurrent first-time readers may each miss and
//! query the backend independently.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use stashex_model::MediaContainer;
use tracing::debug;

#[derive(Debug, Clone)]
struct CacheEntry {
    created: Instant,
    document: MediaContainer,
}

/// TTL-bounded response cache. A zero TTL disables caching entirely:
/// every `get` misses and every `insert` is dropped.
#[derive(Debug)]
pub struct ResponseCache {
    ttl: Duration,
    entries: DashMap<String, CacheEntry>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
        }
    }

    /// Disabled cache, used when the configured TTL is zero or negative.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    pub fn get(&self, fingerprint: &str) -> Option<MediaContainer> {
        if !self.is_enabled() {
            return None;
        }

        {
            let entry = self.entries.get(fingerprint)?;
            if entry.created.elapsed() <= self.ttl {
                return Some(entry.document.clone());
            }
        }

        // Expired: evict on the way out so the map does not accumulate
        // dead fingerprints between cache-miss queries.
        debug!("evicting expired cache entry for {fingerprint}");
        self.entries.remove(fingerprint);
        None
    }

    pub fn insert(&self, fingerprint: &str, document: MediaContainer) {
        if !self.is_enabled() {
            return;
        }
        self.entries.insert(
            fingerprint.to_string(),
            CacheEntry {
                created: Instant::now(),
                document,
            },
        );
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stashex_model::{MediaContainer, MetadataItem};

    fn document(title: &str) -> MediaContainer {
        MediaContainer::with_items(vec![MetadataItem {
            title: title.to_string(),
            ..Default::default()
        }])
    }

    #[test]
    fn round_trips_within_ttl() {
        let cache = ResponseCache::new(Duration::from_secs(300));
        cache.insert("filter:a", document("Sample"));
        assert_eq!(cache.get("filter:a"), Some(document("Sample")));
    }

    #[test]
    fn misses_unknown_fingerprints() {
        let cache = ResponseCache::new(Duration::from_secs(300));
        assert_eq!(cache.get("filter:missing"), None);
    }

    #[test]
    fn expired_entries_miss_and_are_evicted() {
        let cache = ResponseCache::new(Duration::from_millis(20));
        cache.insert("filter:a", document("Sample"));
        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(cache.get("filter:a"), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn zero_ttl_disables_caching() {
        let cache = ResponseCache::disabled();
        cache.insert("filter:a", document("Sample"));
        assert_eq!(cache.get("filter:a"), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn last_writer_wins() {
        let cache = ResponseCache::new(Duration::from_secs(300));
        cache.insert("filter:a", document("first"));
        cache.insert("filter:a", document("second"));
        assert_eq!(cache.get("filter:a"), Some(document("second")));
    }
}
