use crate::application::ports::cache::{QueryData, QueryStore};
use crate::domain::value_objects::{QueryFilter, QueryKey};
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Clone)]
struct CacheEntry {
    data: QueryData,
    updated_at: Instant,
    expires_at: Option<Instant>,
    is_invalidated: bool,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant) -> bool {
        !self.is_invalidated && self.expires_at.map_or(true, |expires_at| expires_at > now)
    }
}

/// メモリ上のクエリキャッシュ
#[derive(Default)]
pub struct MemoryQueryCache {
    cache: HashMap<QueryKey, CacheEntry>,
}

impl MemoryQueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 鮮度に関係なく最後に取得した値を返す
    pub fn peek(&self, key: &QueryKey) -> Option<&QueryData> {
        self.cache.get(key).map(|entry| &entry.data)
    }

    pub fn is_invalidated(&self, key: &QueryKey) -> Option<bool> {
        self.cache.get(key).map(|entry| entry.is_invalidated)
    }
}

impl QueryStore for MemoryQueryCache {
    fn lookup(&self, key: &QueryKey, now: Instant) -> Option<QueryData> {
        self.cache
            .get(key)
            .filter(|entry| entry.is_fresh(now))
            .map(|entry| entry.data.clone())
    }

    fn store(&mut self, key: QueryKey, data: QueryData, stale_time: Option<Duration>, now: Instant) {
        let entry = CacheEntry {
            data,
            updated_at: now,
            // 表現できないほど遠い期限は無期限として扱う
            expires_at: stale_time.and_then(|ttl| now.checked_add(ttl)),
            is_invalidated: false,
        };
        self.cache.insert(key, entry);
    }

    fn invalidate(&mut self, filter: &QueryFilter) -> usize {
        let mut affected = 0;
        for (key, entry) in self.cache.iter_mut() {
            if filter.matches(key) {
                entry.is_invalidated = true;
                affected += 1;
            }
        }
        affected
    }

    fn clear(&mut self) {
        self.cache.clear();
    }

    fn collect_garbage(&mut self, gc_window: Duration, now: Instant) -> usize {
        let before = self.cache.len();
        self.cache.retain(|_, entry| {
            entry.is_fresh(now) || now.saturating_duration_since(entry.updated_at) < gc_window
        });
        before - self.cache.len()
    }

    fn len(&self) -> usize {
        self.cache.len()
    }
}
