//! Compiled-filter cache
//!
//! Dynamic albums are re-evaluated on every sync round; caching the
//! compiled query avoids re-converting the expression each time.
//! Entries expire by TTL and the map is capacity-bounded.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::domain::filters::AlbumFilters;
use crate::search::query::AssetSearchQuery;

struct CacheEntry {
    query: AssetSearchQuery,
    inserted_at: Instant,
}

pub struct FilterQueryCache {
    entries: Mutex<HashMap<(Uuid, AlbumFilters), CacheEntry>>,
    ttl: Duration,
    capacity: usize,
}

impl FilterQueryCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            capacity,
        }
    }

    /// Keyed by owner id and the filters themselves, so albums of the
    /// same owner share compilations and an edited expression never
    /// serves a stale one.
    pub fn get(&self, owner_id: Uuid, filters: &AlbumFilters) -> Option<AssetSearchQuery> {
        let entries = self.entries.lock().ok()?;
        let entry = entries.get(&(owner_id, filters.clone()))?;
        if entry.inserted_at.elapsed() > self.ttl {
            return None;
        }
        Some(entry.query.clone())
    }

    pub fn insert(&self, owner_id: Uuid, filters: AlbumFilters, query: AssetSearchQuery) {
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };
        if entries.len() >= self.capacity {
            entries.retain(|_, e| e.inserted_at.elapsed() <= self.ttl);
        }
        if entries.len() >= self.capacity {
            // Still full after the sweep, evict the oldest entry.
            if let Some(key) = entries
                .iter()
                .min_by_key(|(_, e)| e.inserted_at)
                .map(|(k, _)| k.clone())
            {
                entries.remove(&key);
            }
        }
        entries.insert(
            (owner_id, filters),
            CacheEntry {
                query,
                inserted_at: Instant::now(),
            },
        );
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query_for(owner: Uuid) -> AssetSearchQuery {
        AssetSearchQuery::from_filters(&AlbumFilters::default(), owner)
    }

    #[test]
    fn hit_and_miss() {
        let cache = FilterQueryCache::new(Duration::from_secs(60), 8);
        let owner = Uuid::new_v4();
        let filters = AlbumFilters::default();
        assert!(cache.get(owner, &filters).is_none());

        let query = query_for(owner);
        cache.insert(owner, filters.clone(), query.clone());
        assert_eq!(cache.get(owner, &filters), Some(query));
    }

    #[test]
    fn expired_entries_miss() {
        let cache = FilterQueryCache::new(Duration::ZERO, 8);
        let owner = Uuid::new_v4();
        cache.insert(owner, AlbumFilters::default(), query_for(owner));
        assert!(cache.get(owner, &AlbumFilters::default()).is_none());
    }

    #[test]
    fn capacity_is_bounded() {
        let cache = FilterQueryCache::new(Duration::from_secs(60), 2);
        for _ in 0..5 {
            cache.insert(Uuid::new_v4(), AlbumFilters::default(), query_for(Uuid::new_v4()));
        }
        assert!(cache.len() <= 2);
    }
}
