//! Generator configuration.
//!
//! Defaults are production-friendly; every option can come from a YAML document, from
//! `FLOWSMITH_*` environment variables, or from `with_*` builder calls.

use crate::cache::CacheConfig;
use crate::resilience::circuit_breaker::CircuitBreakerConfig;
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const HOUR_MS: u64 = 60 * 60 * 1000;

/// Remote generation service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    /// Explicit credential; normally left unset in favour of keyring or environment.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub api_key_env: String,
    pub use_keyring: bool,
    /// Transport-level timeout; the per-call generation deadline is usually much shorter.
    pub http_timeout_secs: u64,
    pub pool_max_idle_per_host: usize,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            api_key: None,
            api_key_env: "FLOWSMITH_API_KEY".to_string(),
            use_keyring: true,
            http_timeout_secs: 60,
            pool_max_idle_per_host: 32,
        }
    }
}

/// Top-level configuration for the generation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Feature toggle; when false every request returns a `disabled` result.
    pub generation_enabled: bool,
    pub per_call_timeout_ms: u64,
    pub batch_size: usize,
    pub inter_batch_delay_ms: u64,
    pub success_ttl_ms: u64,
    pub fallback_ttl_ms: u64,
    pub default_language: String,
    pub remote: RemoteConfig,
    pub cache: CacheConfig,
    pub breaker: CircuitBreakerConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            generation_enabled: true,
            per_call_timeout_ms: 30_000,
            batch_size: 5,
            inter_batch_delay_ms: 1_000,
            success_ttl_ms: 24 * HOUR_MS,
            fallback_ttl_ms: 12 * HOUR_MS,
            default_language: "en".to_string(),
            remote: RemoteConfig::default(),
            cache: CacheConfig::default(),
            breaker: CircuitBreakerConfig::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with `FLOWSMITH_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn with_env_overrides(self) -> Self {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Overlay values from `lookup`; unparsable values are ignored.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parsed<T: std::str::FromStr>(
            lookup: &dyn Fn(&str) -> Option<String>,
            name: &str,
        ) -> Option<T> {
            lookup(name).and_then(|s| s.trim().parse::<T>().ok())
        }
        let lookup: &dyn Fn(&str) -> Option<String> = &lookup;

        if let Some(v) = parsed::<bool>(lookup, "FLOWSMITH_GENERATION_ENABLED") {
            self.generation_enabled = v;
        }
        if let Some(v) = parsed::<u64>(lookup, "FLOWSMITH_TIMEOUT_MS").filter(|v| *v > 0) {
            self.per_call_timeout_ms = v;
        }
        if let Some(v) = parsed::<usize>(lookup, "FLOWSMITH_BATCH_SIZE").filter(|v| *v > 0) {
            self.batch_size = v;
        }
        if let Some(v) = parsed::<u64>(lookup, "FLOWSMITH_INTER_BATCH_DELAY_MS") {
            self.inter_batch_delay_ms = v;
        }
        if let Some(v) = parsed::<u64>(lookup, "FLOWSMITH_SUCCESS_TTL_MS").filter(|v| *v > 0) {
            self.success_ttl_ms = v;
        }
        if let Some(v) = parsed::<u64>(lookup, "FLOWSMITH_FALLBACK_TTL_MS").filter(|v| *v > 0) {
            self.fallback_ttl_ms = v;
        }
        if let Some(v) = lookup("FLOWSMITH_BASE_URL").filter(|v| !v.trim().is_empty()) {
            self.remote.base_url = v;
        }
        if let Some(v) = lookup("FLOWSMITH_MODEL").filter(|v| !v.trim().is_empty()) {
            self.remote.model = v;
        }
        if let Some(v) = parsed::<usize>(lookup, "FLOWSMITH_CACHE_MAX_ENTRIES").filter(|v| *v > 0) {
            self.cache.max_entries = v;
        }
        if let Some(v) = parsed::<u32>(lookup, "FLOWSMITH_BREAKER_FAILURE_THRESHOLD").filter(|v| *v > 0) {
            self.breaker.failure_threshold = v;
        }
        if let Some(v) = parsed::<u64>(lookup, "FLOWSMITH_BREAKER_COOLDOWN_MS") {
            self.breaker.cooldown_ms = v;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        let checks: [(&str, bool); 4] = [
            ("per_call_timeout_ms", self.per_call_timeout_ms > 0),
            ("batch_size", self.batch_size > 0),
            ("success_ttl_ms", self.success_ttl_ms > 0),
            ("fallback_ttl_ms", self.fallback_ttl_ms > 0),
        ];
        for (field, ok) in checks {
            if !ok {
                return Err(Error::configuration_with_context(
                    format!("{} must be greater than zero", field),
                    ErrorContext::new()
                        .with_field_path(field)
                        .with_source("generator_config"),
                ));
            }
        }
        if self.remote.base_url.trim().is_empty() {
            return Err(Error::configuration_with_context(
                "remote base_url must not be empty",
                ErrorContext::new()
                    .with_field_path("remote.base_url")
                    .with_source("generator_config"),
            ));
        }
        Ok(())
    }

    pub fn with_generation_enabled(mut self, enabled: bool) -> Self {
        self.generation_enabled = enabled;
        self
    }

    pub fn with_per_call_timeout(mut self, timeout: Duration) -> Self {
        self.per_call_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn with_inter_batch_delay(mut self, delay: Duration) -> Self {
        self.inter_batch_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_success_ttl(mut self, ttl: Duration) -> Self {
        self.success_ttl_ms = ttl.as_millis() as u64;
        self
    }

    pub fn with_fallback_ttl(mut self, ttl: Duration) -> Self {
        self.fallback_ttl_ms = ttl.as_millis() as u64;
        self
    }

    pub fn with_remote(mut self, remote: RemoteConfig) -> Self {
        self.remote = remote;
        self
    }

    pub fn with_breaker(mut self, breaker: CircuitBreakerConfig) -> Self {
        self.breaker = breaker;
        self
    }

    pub fn per_call_timeout(&self) -> Duration {
        Duration::from_millis(self.per_call_timeout_ms)
    }

    pub fn inter_batch_delay(&self) -> Duration {
        Duration::from_millis(self.inter_batch_delay_ms)
    }

    pub fn success_ttl(&self) -> Duration {
        Duration::from_millis(self.success_ttl_ms)
    }

    pub fn fallback_ttl(&self) -> Duration {
        Duration::from_millis(self.fallback_ttl_ms)
    }
}
