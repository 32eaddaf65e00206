//! 内容缓存模块：按请求身份缓存生成的工作流，支持惰性过期与命中统计。
//!
//! # Content Cache Module
//!
//! Identical logical generation requests must not pay the remote cost twice. This module
//! stores generated artifacts under a key derived purely from the request identity.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`ContentCache`] | Typed cache with TTL per entry and hit/miss statistics |
//! | [`CacheConfig`] | Enable flag, entry limits and optional key prefix |
//! | [`CacheBackend`] | Trait for storage backends |
//! | [`MemoryCache`] | In-memory backend with lazy expiry |
//! | [`NullCache`] | No-op backend |
//! | [`CacheKeyGenerator`] | Derives [`CacheKey`]s from generation requests |
//! | [`KeyPattern`] | Glob used for scoped invalidation |
//!
//! ## Expiry
//!
//! Entries carry their own TTL and are checked when read: an expired entry counts as a
//! miss and is removed on the spot. No task sweeps the cache in the background.
//!
//! ## Example
//!
//! ```rust
//! use flowsmith::cache::{CacheConfig, CacheKeyGenerator, ContentCache};
//! use flowsmith::types::GenerationRequest;
//! use std::sync::Arc;
//!
//! let cache = Arc::new(ContentCache::in_memory(CacheConfig::default()));
//! let key = CacheKeyGenerator::new().generate(&GenerationRequest::new("task-1", "Payroll"));
//! assert_eq!(key.as_str(), "workflow:task-1:en:v0:anon");
//! # let _ = cache;
//! ```

mod backend;
mod key;
mod manager;

pub use backend::{CacheBackend, MemoryCache, NullCache};
pub use key::{CacheKey, CacheKeyGenerator, KeyPattern};
pub use manager::{CacheConfig, CacheStats, ContentCache};
