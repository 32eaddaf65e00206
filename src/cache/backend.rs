//! Cache backend implementations.

use super::key::{CacheKey, KeyPattern};
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Clone)]
struct CacheEntry {
    data: Vec<u8>,
    created_at: Instant,
    ttl: Duration,
    last_accessed: Instant,
}

impl CacheEntry {
    fn new(data: Vec<u8>, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            data,
            created_at: now,
            ttl,
            last_accessed: now,
        }
    }
    fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.ttl
    }
}

#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>>;
    async fn set(&self, key: &CacheKey, value: &[u8], ttl: Duration) -> Result<()>;
    async fn delete(&self, key: &CacheKey) -> Result<bool>;
    async fn clear(&self) -> Result<()>;
    /// Remove every entry whose key matches `pattern`; returns how many were removed.
    async fn clear_matching(&self, pattern: &KeyPattern) -> Result<usize>;
    /// Number of live (unexpired) entries.
    async fn len(&self) -> Result<usize>;
    fn name(&self) -> &'static str;
}

/// In-memory backend.
///
/// Expiry is lazy: an entry past its TTL is removed by the read that finds it.
/// There is no background sweeper. When `max_entries` is reached, an insert first
/// drops expired entries and then the least recently accessed ones.
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    max_entries: usize,
}

impl MemoryCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            max_entries: max_entries.max(1),
        }
    }

    /// Raw entry count including expired entries not yet purged.
    pub fn stored_len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, CacheEntry>>> {
        self.entries.read().map_err(|_| poisoned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, CacheEntry>>> {
        self.entries.write().map_err(|_| poisoned())
    }

    fn evict_if_needed(&self, entries: &mut HashMap<String, CacheEntry>, incoming: &str) {
        if entries.len() < self.max_entries || entries.contains_key(incoming) {
            return;
        }
        entries.retain(|_, e| !e.is_expired());
        while entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.last_accessed)
                .map(|(k, _)| k.clone());
            if let Some(k) = oldest {
                entries.remove(&k);
            } else {
                break;
            }
        }
    }
}

fn poisoned() -> Error {
    Error::runtime_with_context(
        "cache lock poisoned",
        ErrorContext::new().with_source("memory_cache"),
    )
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>> {
        let mut entries = self.write()?;
        if let Some(entry) = entries.get_mut(key.as_str()) {
            if entry.is_expired() {
                entries.remove(key.as_str());
                return Ok(None);
            }
            entry.last_accessed = Instant::now();
            return Ok(Some(entry.data.clone()));
        }
        Ok(None)
    }
    async fn set(&self, key: &CacheKey, value: &[u8], ttl: Duration) -> Result<()> {
        let mut entries = self.write()?;
        self.evict_if_needed(&mut entries, key.as_str());
        entries.insert(key.value.clone(), CacheEntry::new(value.to_vec(), ttl));
        Ok(())
    }
    async fn delete(&self, key: &CacheKey) -> Result<bool> {
        Ok(self.write()?.remove(key.as_str()).is_some())
    }
    async fn clear(&self) -> Result<()> {
        self.write()?.clear();
        Ok(())
    }
    async fn clear_matching(&self, pattern: &KeyPattern) -> Result<usize> {
        let mut entries = self.write()?;
        let before = entries.len();
        entries.retain(|k, _| !pattern.matches(k));
        Ok(before - entries.len())
    }
    async fn len(&self) -> Result<usize> {
        Ok(self.read()?.values().filter(|e| !e.is_expired()).count())
    }
    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Backend that stores nothing; every lookup misses.
pub struct NullCache;
impl NullCache {
    pub fn new() -> Self {
        Self
    }
}
impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheBackend for NullCache {
    async fn get(&self, _: &CacheKey) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }
    async fn set(&self, _: &CacheKey, _: &[u8], _: Duration) -> Result<()> {
        Ok(())
    }
    async fn delete(&self, _: &CacheKey) -> Result<bool> {
        Ok(false)
    }
    async fn clear(&self) -> Result<()> {
        Ok(())
    }
    async fn clear_matching(&self, _: &KeyPattern) -> Result<usize> {
        Ok(0)
    }
    async fn len(&self) -> Result<usize> {
        Ok(0)
    }
    fn name(&self) -> &'static str {
        "null"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_removed_on_read() {
        let cache = MemoryCache::new(10);
        let key = CacheKey::new("workflow:t:en:v0:anon");
        cache.set(&key, b"payload", Duration::from_secs(5)).await.unwrap();
        assert_eq!(cache.get(&key).await.unwrap().as_deref(), Some(&b"payload"[..]));

        tokio::time::advance(Duration::from_secs(6)).await;
        // Still physically present until something reads it.
        assert_eq!(cache.stored_len().unwrap(), 1);
        assert_eq!(cache.len().await.unwrap(), 0);
        assert!(cache.get(&key).await.unwrap().is_none());
        assert_eq!(cache.stored_len().unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_background_purge() {
        let cache = MemoryCache::new(10);
        for i in 0..3 {
            cache
                .set(&CacheKey::new(format!("k{}", i)), b"v", Duration::from_millis(10))
                .await
                .unwrap();
        }
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(cache.stored_len().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_last_writer_wins() {
        let cache = MemoryCache::new(10);
        let key = CacheKey::new("k");
        cache.set(&key, b"first", Duration::from_secs(60)).await.unwrap();
        cache.set(&key, b"second", Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get(&key).await.unwrap().as_deref(), Some(&b"second"[..]));
        assert_eq!(cache.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_capacity_evicts_least_recently_accessed() {
        let cache = MemoryCache::new(2);
        let ttl = Duration::from_secs(60);
        cache.set(&CacheKey::new("a"), b"1", ttl).await.unwrap();
        cache.set(&CacheKey::new("b"), b"2", ttl).await.unwrap();
        cache.get(&CacheKey::new("a")).await.unwrap();
        cache.set(&CacheKey::new("c"), b"3", ttl).await.unwrap();
        assert!(cache.get(&CacheKey::new("a")).await.unwrap().is_some());
        assert!(cache.get(&CacheKey::new("b")).await.unwrap().is_none());
        assert!(cache.get(&CacheKey::new("c")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_clear_matching() {
        let cache = MemoryCache::new(10);
        let ttl = Duration::from_secs(60);
        for key in [
            "workflow:t1:en:v0:anon",
            "workflow:t1:en:v1:anon",
            "workflow:t2:en:v0:anon",
        ] {
            cache.set(&CacheKey::new(key), b"x", ttl).await.unwrap();
        }
        let removed = cache
            .clear_matching(&KeyPattern::for_subtask("t1").unwrap())
            .await
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(cache.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_null_cache_stores_nothing() {
        let cache = NullCache::new();
        let key = CacheKey::new("k");
        cache.set(&key, b"v", Duration::from_secs(1)).await.unwrap();
        assert!(cache.get(&key).await.unwrap().is_none());
        assert_eq!(cache.len().await.unwrap(), 0);
        assert_eq!(cache.name(), "null");
    }
}
