use crate::application::ports::cache::{QueryData, QueryStore, QueryValue};
use crate::application::services::invalidation::InvalidationSet;
use crate::domain::value_objects::{QueryFilter, QueryKey, QueryKind};
use crate::shared::config::CacheConfig;
use crate::shared::error::AppError;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, trace, warn};

type SharedFetch = Shared<BoxFuture<'static, Result<QueryData, AppError>>>;

struct InFlight {
    id: u64,
    future: SharedFetch,
}

struct ClientState {
    store: Box<dyn QueryStore>,
    in_flight: HashMap<QueryKey, InFlight>,
    next_fetch_id: u64,
    last_sweep: Instant,
}

impl ClientState {
    // GC 窓ごとに一度、使われていない古いエントリを掃除する
    fn sweep_if_due(&mut self, gc_window: Duration, now: Instant) {
        if now.saturating_duration_since(self.last_sweep) < gc_window {
            return;
        }
        self.last_sweep = now;
        let removed = self.store.collect_garbage(gc_window, now);
        if removed > 0 {
            debug!(removed, "swept unused query entries");
        }
    }
}

/// クエリ結果のキャッシュと無効化を管理するクライアント
///
/// One instance is owned per session. Concurrent fetches of the same key share a
/// single in-flight request. Invalidation and [`QueryClient::clear`] detach
/// in-flight requests, so a response that started before them is handed to its
/// own awaiters but never written back into the cache.
pub struct QueryClient {
    state: Mutex<ClientState>,
    config: CacheConfig,
}

impl QueryClient {
    pub fn new(store: Box<dyn QueryStore>, config: CacheConfig) -> Self {
        Self {
            state: Mutex::new(ClientState {
                store,
                in_flight: HashMap::new(),
                next_fetch_id: 0,
                last_sweep: Instant::now(),
            }),
            config,
        }
    }

    /// リソース種別ごとの鮮度
    pub fn stale_time_for(&self, kind: QueryKind) -> Option<Duration> {
        match kind {
            QueryKind::AllPosts => self.config.feed_stale_time(),
            QueryKind::SearchProfiles => self.config.search_stale_time(),
            _ => self.config.entity_stale_time(),
        }
    }

    /// Returns the cached value while fresh, otherwise runs `fetcher` (or joins
    /// the request already in flight for `key`) and caches the result.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<T, AppError>
    where
        T: QueryValue,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, AppError>> + Send + 'static,
    {
        let (fetch_id, future) = {
            let mut state = self.state.lock().await;
            if let Some(data) = state.store.lookup(&key, Instant::now()) {
                debug!(key = %key, "query cache hit");
                return T::from_data(data);
            }

            match state.in_flight.get(&key) {
                Some(in_flight) => {
                    debug!(key = %key, "joining in-flight query");
                    (in_flight.id, in_flight.future.clone())
                }
                None => {
                    debug!(key = %key, "query cache miss");
                    state.next_fetch_id += 1;
                    let id = state.next_fetch_id;
                    let future = fetcher()
                        .map(|result| result.map(T::into_data))
                        .boxed()
                        .shared();
                    state.in_flight.insert(
                        key.clone(),
                        InFlight {
                            id,
                            future: future.clone(),
                        },
                    );
                    (id, future)
                }
            }
        };

        let result = future.await;
        self.settle(&key, fetch_id, &result).await;
        result.and_then(T::from_data)
    }

    // 最初に完了を観測した待機者だけが結果を書き戻す
    async fn settle(&self, key: &QueryKey, fetch_id: u64, result: &Result<QueryData, AppError>) {
        let mut state = self.state.lock().await;
        let is_current = state
            .in_flight
            .get(key)
            .is_some_and(|in_flight| in_flight.id == fetch_id);
        if !is_current {
            trace!(key = %key, fetch_id, "query result not written back");
            return;
        }
        state.in_flight.remove(key);

        match result {
            Ok(data) => {
                let now = Instant::now();
                state.sweep_if_due(self.config.gc_window(), now);
                let stale_time = self.stale_time_for(key.kind());
                state.store.store(key.clone(), data.clone(), stale_time, now);
            }
            Err(err) => {
                debug!(key = %key, error = %err, "query failed");
            }
        }
    }

    /// Fresh cached value for `key`, without fetching.
    pub async fn cached<T: QueryValue>(&self, key: &QueryKey) -> Option<T> {
        let state = self.state.lock().await;
        state
            .store
            .lookup(key, Instant::now())
            .and_then(|data| T::from_data(data).ok())
    }

    /// Runs a write and, only when it succeeds, invalidates `invalidates`.
    pub async fn mutate<T, Fut>(&self, invalidates: &InvalidationSet, mutation: Fut) -> Result<T, AppError>
    where
        Fut: Future<Output = Result<T, AppError>>,
    {
        match mutation.await {
            Ok(value) => {
                for filter in invalidates.filters() {
                    self.invalidate(filter).await;
                }
                Ok(value)
            }
            Err(err) => {
                warn!(error = %err, "mutation failed; cache left untouched");
                Err(err)
            }
        }
    }

    /// 一致するエントリを stale にし、進行中の取得を切り離す
    pub async fn invalidate(&self, filter: &QueryFilter) -> usize {
        let mut state = self.state.lock().await;
        let affected = state.store.invalidate(filter);
        let in_flight_before = state.in_flight.len();
        state.in_flight.retain(|key, _| !filter.matches(key));
        let detached = in_flight_before - state.in_flight.len();
        debug!(filter = ?filter, affected, detached, "invalidated queries");
        affected
    }

    /// Discards every cached value and detaches every in-flight request.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        let entries = state.store.len();
        state.store.clear();
        state.in_flight.clear();
        info!(entries, "query cache cleared");
    }

    pub async fn collect_garbage(&self) -> usize {
        let mut state = self.state.lock().await;
        let removed = state
            .store
            .collect_garbage(self.config.gc_window(), Instant::now());
        if removed > 0 {
            debug!(removed, "collected unused query entries");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.store.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn in_flight_count(&self) -> usize {
        self.state.lock().await.in_flight.len()
    }
}
