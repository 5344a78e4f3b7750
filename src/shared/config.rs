use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 鮮度・GC 窓の上限（1 年）
pub const MAX_WINDOW_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    pub cache: CacheConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheConfig {
    /// 全投稿フィードの鮮度（秒）
    pub feed_stale_secs: u64,
    /// プロフィール検索結果の鮮度（秒）
    pub search_stale_secs: u64,
    /// 個別エンティティの鮮度。`None` なら明示的な無効化まで鮮度を保つ
    #[serde(default)]
    pub entity_stale_secs: Option<u64>,
    /// 古くなったエントリを破棄するまでの猶予（秒）
    pub gc_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    pub debounce_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            feed_stale_secs: 30,
            search_stale_secs: 10,
            entity_stale_secs: None,
            gc_secs: 300, // 5 minutes
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { debounce_ms: 300 }
    }
}

impl CacheConfig {
    pub fn feed_stale_time(&self) -> Option<Duration> {
        Some(Duration::from_secs(self.feed_stale_secs))
    }

    pub fn search_stale_time(&self) -> Option<Duration> {
        Some(Duration::from_secs(self.search_stale_secs))
    }

    pub fn entity_stale_time(&self) -> Option<Duration> {
        self.entity_stale_secs.map(Duration::from_secs)
    }

    pub fn gc_window(&self) -> Duration {
        Duration::from_secs(self.gc_secs)
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        // 既定値
        let mut cfg = Self::default();

        if let Some(value) = env_u64("PICTURA_FEED_STALE_SECS") {
            cfg.cache.feed_stale_secs = value;
        }
        if let Some(value) = env_u64("PICTURA_SEARCH_STALE_SECS") {
            cfg.cache.search_stale_secs = value;
        }
        if let Ok(v) = std::env::var("PICTURA_ENTITY_STALE_SECS") {
            // 空文字や "none" は無期限扱い
            cfg.cache.entity_stale_secs = match v.trim().to_ascii_lowercase().as_str() {
                "" | "none" | "off" => None,
                other => parse_u64(other).or(cfg.cache.entity_stale_secs),
            };
        }
        if let Some(value) = env_u64("PICTURA_CACHE_GC_SECS") {
            cfg.cache.gc_secs = value;
        }
        if let Some(value) = env_u64("PICTURA_SEARCH_DEBOUNCE_MS") {
            cfg.search.debounce_ms = value;
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        let windows = [
            ("feed_stale_secs", Some(self.cache.feed_stale_secs)),
            ("search_stale_secs", Some(self.cache.search_stale_secs)),
            ("entity_stale_secs", self.cache.entity_stale_secs),
            ("gc_secs", Some(self.cache.gc_secs)),
        ];
        for (name, secs) in windows {
            if secs.is_some_and(|secs| secs > MAX_WINDOW_SECS) {
                return Err(format!(
                    "Cache {name} must not exceed {MAX_WINDOW_SECS} seconds"
                ));
            }
        }
        if self.cache.gc_secs == 0 {
            return Err("Cache gc_secs must be greater than 0".to_string());
        }
        if self.cache.gc_secs < self.cache.feed_stale_secs
            || self.cache.gc_secs < self.cache.search_stale_secs
        {
            return Err("Cache gc_secs must not be shorter than a stale window".to_string());
        }
        Ok(())
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| parse_u64(&v))
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}
