//! Content cache manager.

use super::backend::CacheBackend;
use super::key::{CacheKey, KeyPattern};
use crate::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub max_entries: usize,
    pub max_entry_size: usize,
    pub key_prefix: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 10_000,
            max_entry_size: 1024 * 1024,
            key_prefix: None,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = max;
        self
    }
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Live entries at the time of the snapshot.
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub sets: u64,
    pub errors: u64,
}

struct AtomicStats {
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
    errors: AtomicU64,
}
impl AtomicStats {
    fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            sets: AtomicU64::new(0),
            errors: AtomicU64::new(0),
        }
    }
    fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.sets.store(0, Ordering::Relaxed);
        self.errors.store(0, Ordering::Relaxed);
    }
}

/// Typed cache with hit/miss accounting.
///
/// Constructed once and shared (`Arc<ContentCache>`) by every generator that should see
/// the same entries. Values are serialized with serde_json.
pub struct ContentCache {
    config: CacheConfig,
    backend: Box<dyn CacheBackend>,
    stats: AtomicStats,
}

impl ContentCache {
    pub fn new(config: CacheConfig, backend: Box<dyn CacheBackend>) -> Self {
        Self {
            config,
            backend,
            stats: AtomicStats::new(),
        }
    }

    /// In-memory cache sized from `config.max_entries`.
    pub fn in_memory(config: CacheConfig) -> Self {
        let backend = super::MemoryCache::new(config.max_entries);
        Self::new(config, Box::new(backend))
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Result<Option<T>> {
        if !self.config.enabled {
            return Ok(None);
        }
        let prefixed = self.prefix_key(key);
        match self.backend.get(&prefixed).await {
            Ok(Some(data)) => match serde_json::from_slice(&data) {
                Ok(val) => {
                    self.stats.hits.fetch_add(1, Ordering::Relaxed);
                    Ok(Some(val))
                }
                Err(e) => {
                    debug!(key = %prefixed, error = %e, "discarding undecodable cache entry");
                    self.stats.errors.fetch_add(1, Ordering::Relaxed);
                    self.stats.misses.fetch_add(1, Ordering::Relaxed);
                    let _ = self.backend.delete(&prefixed).await;
                    Ok(None)
                }
            },
            Ok(None) => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
            Err(e) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                Err(e)
            }
        }
    }

    pub async fn set<T: Serialize>(&self, key: &CacheKey, value: &T, ttl: Duration) -> Result<()> {
        if !self.config.enabled {
            return Ok(());
        }
        let data = serde_json::to_vec(value)?;
        if data.len() > self.config.max_entry_size {
            debug!(key = %key, size = data.len(), "cache entry exceeds size limit; not stored");
            return Ok(());
        }
        let prefixed = self.prefix_key(key);
        match self.backend.set(&prefixed, &data, ttl).await {
            Ok(()) => {
                self.stats.sets.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(e) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                Err(e)
            }
        }
    }

    pub async fn delete(&self, key: &CacheKey) -> Result<bool> {
        let prefixed = self.prefix_key(key);
        self.backend.delete(&prefixed).await
    }

    pub async fn clear(&self) -> Result<()> {
        self.backend.clear().await
    }

    /// Remove entries whose (unprefixed) key matches a glob such as `workflow:task-1:*`.
    pub async fn clear_matching(&self, pattern: &str) -> Result<usize> {
        let pattern = match self.config.key_prefix {
            Some(ref p) => KeyPattern::new(&format!("{}:{}", p, pattern))?,
            None => KeyPattern::new(pattern)?,
        };
        let removed = self.backend.clear_matching(&pattern).await?;
        debug!(pattern = pattern.as_str(), removed, "cleared matching cache entries");
        Ok(removed)
    }

    /// Remove every cached variation of one subtask.
    pub async fn clear_subtask(&self, subtask_id: &str) -> Result<usize> {
        let pattern = KeyPattern::for_subtask(subtask_id)?;
        self.clear_matching(pattern.as_str()).await
    }

    pub async fn stats(&self) -> CacheStats {
        let hits = self.stats.hits.load(Ordering::Relaxed);
        let misses = self.stats.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        CacheStats {
            size: self.backend.len().await.unwrap_or(0),
            hits,
            misses,
            hit_rate: if total == 0 {
                0.0
            } else {
                hits as f64 / total as f64
            },
            sets: self.stats.sets.load(Ordering::Relaxed),
            errors: self.stats.errors.load(Ordering::Relaxed),
        }
    }

    pub fn reset_stats(&self) {
        self.stats.reset();
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    fn prefix_key(&self, key: &CacheKey) -> CacheKey {
        if let Some(ref p) = self.config.key_prefix {
            CacheKey::new(format!("{}:{}", p, key.value))
        } else {
            key.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::NullCache;

    fn cache() -> ContentCache {
        ContentCache::in_memory(CacheConfig::new().with_max_entries(100))
    }

    #[tokio::test]
    async fn test_hit_rate_zero_without_lookups() {
        let stats = cache().stats().await;
        assert_eq!(stats.hits + stats.misses, 0);
        assert_eq!(stats.hit_rate, 0.0);
    }

    #[tokio::test]
    async fn test_hits_and_misses_counted() {
        let cache = cache();
        let key = CacheKey::new("workflow:t:en:v0:anon");
        assert!(cache.get::<String>(&key).await.unwrap().is_none());
        cache
            .set(&key, &"blueprint".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(
            cache.get::<String>(&key).await.unwrap().as_deref(),
            Some("blueprint")
        );
        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
        assert!((stats.hit_rate - 0.5).abs() < f64::EPSILON);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_get_counts_as_miss() {
        let cache = cache();
        let key = CacheKey::new("k");
        cache.set(&key, &1u32, Duration::from_millis(100)).await.unwrap();
        tokio::time::advance(Duration::from_millis(150)).await;
        assert!(cache.get::<u32>(&key).await.unwrap().is_none());
        let stats = cache.stats().await;
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.size, 0);
    }

    #[tokio::test]
    async fn test_decode_failure_is_a_miss() {
        let cache = cache();
        let key = CacheKey::new("k");
        cache.set(&key, &"text", Duration::from_secs(60)).await.unwrap();
        assert!(cache.get::<u64>(&key).await.unwrap().is_none());
        let stats = cache.stats().await;
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 0);
    }

    #[tokio::test]
    async fn test_prefix_and_subtask_clear() {
        let cache = ContentCache::in_memory(CacheConfig::new().with_key_prefix("tenant-a"));
        let ttl = Duration::from_secs(60);
        cache.set(&CacheKey::new("workflow:t1:en:v0:anon"), &1, ttl).await.unwrap();
        cache.set(&CacheKey::new("workflow:t1:de:v2:anon"), &2, ttl).await.unwrap();
        cache.set(&CacheKey::new("workflow:t2:en:v0:anon"), &3, ttl).await.unwrap();
        assert_eq!(cache.clear_subtask("t1").await.unwrap(), 2);
        assert_eq!(cache.stats().await.size, 1);
        cache.clear().await.unwrap();
        assert_eq!(cache.stats().await.size, 0);
    }

    #[tokio::test]
    async fn test_disabled_cache_is_inert() {
        let cache = ContentCache::in_memory(CacheConfig::new().with_enabled(false));
        let key = CacheKey::new("k");
        cache.set(&key, &1, Duration::from_secs(60)).await.unwrap();
        assert!(cache.get::<i32>(&key).await.unwrap().is_none());
        let stats = cache.stats().await;
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.sets, 0);
    }

    #[tokio::test]
    async fn test_null_backend_name() {
        let cache = ContentCache::new(CacheConfig::default(), Box::new(NullCache::new()));
        assert_eq!(cache.backend_name(), "null");
    }
}
