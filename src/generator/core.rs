//! Single-item orchestration: toggle → cache → remote → fallback.

use crate::cache::{CacheKey, CacheKeyGenerator, CacheStats, ContentCache};
use crate::config::GeneratorConfig;
use crate::fallback::FallbackGenerator;
use crate::remote::RemoteClient;
use crate::resilience::circuit_breaker::{CircuitBreaker, CircuitBreakerSnapshot};
use crate::types::{Artifact, GenerationRequest, GenerationResult, GenerationSource, Subtask};
use crate::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Turns generation requests into workflow artifacts.
///
/// This is the error boundary of the pipeline: [`generate`](Self::generate) returns a
/// [`GenerationResult`] on every path. Remote timeouts, transport failures and invalid
/// payloads degrade to the template fallback; only the feature toggle yields an error
/// result.
pub struct WorkflowGenerator {
    pub(crate) config: GeneratorConfig,
    pub(crate) enabled: AtomicBool,
    pub(crate) cache: Arc<ContentCache>,
    pub(crate) keys: CacheKeyGenerator,
    pub(crate) remote: Option<RemoteClient>,
    pub(crate) breaker: CircuitBreaker,
    pub(crate) fallback: FallbackGenerator,
}

impl WorkflowGenerator {
    pub fn builder() -> super::WorkflowGeneratorBuilder {
        super::WorkflowGeneratorBuilder::new()
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Flip the generation feature toggle at runtime.
    pub fn set_generation_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
        info!(enabled, "workflow generation toggled");
    }

    /// Whether a remote client is configured (false in fallback-only mode).
    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    pub fn fallback(&self) -> &FallbackGenerator {
        &self.fallback
    }

    /// Request for variation 0 of `subtask` in the configured default language.
    pub fn request_for(&self, subtask: &Subtask) -> GenerationRequest {
        GenerationRequest::from_subtask(subtask).with_language(self.config.default_language.clone())
    }

    pub async fn generate(&self, request: &GenerationRequest) -> GenerationResult {
        let start = Instant::now();

        if !self.is_enabled() {
            debug!(subtask_id = request.subtask_id(), "generation disabled");
            return GenerationResult::disabled(start.elapsed());
        }

        let key = self.keys.generate(request);
        match self.cache.get::<Artifact>(&key).await {
            Ok(Some(artifact)) => {
                debug!(subtask_id = request.subtask_id(), key = %key, "cache hit");
                return GenerationResult::success(artifact, GenerationSource::Cache, start.elapsed());
            }
            Ok(None) => {}
            Err(e) => warn!(key = %key, error = %e, "cache lookup failed; treating as miss"),
        }

        if let Some(artifact) = self.try_remote(request).await {
            self.store(&key, &artifact, self.config.success_ttl()).await;
            let elapsed = start.elapsed();
            info!(
                subtask_id = request.subtask_id(),
                variation = request.variation_index(),
                source = "remote",
                duration_ms = elapsed.as_millis() as u64,
                "workflow generated"
            );
            return GenerationResult::success(artifact, GenerationSource::Remote, elapsed);
        }

        let artifact = self.fallback.generate(
            &request.to_subtask(),
            request.language(),
            request.variation_index(),
        );
        self.store(&key, &artifact, self.config.fallback_ttl()).await;
        let elapsed = start.elapsed();
        info!(
            subtask_id = request.subtask_id(),
            variation = request.variation_index(),
            source = "fallback",
            duration_ms = elapsed.as_millis() as u64,
            "workflow generated"
        );
        GenerationResult::success(artifact, GenerationSource::Fallback, elapsed)
    }

    /// Generate variation 0 for a subtask.
    pub async fn generate_for_subtask(&self, subtask: &Subtask) -> GenerationResult {
        self.generate(&self.request_for(subtask)).await
    }

    async fn try_remote(&self, request: &GenerationRequest) -> Option<Artifact> {
        let remote = self.remote.as_ref()?;
        if !self.breaker.allow() {
            debug!(
                subtask_id = request.subtask_id(),
                "remote circuit open; skipping remote attempt"
            );
            return None;
        }

        let deadline = request
            .timeout_budget()
            .unwrap_or_else(|| self.config.per_call_timeout());
        match remote.generate(request, deadline).await {
            Ok(artifact) => {
                self.breaker.on_success();
                Some(artifact)
            }
            Err(e) => {
                info!(
                    subtask_id = request.subtask_id(),
                    kind = e.kind(),
                    error = %e,
                    "remote generation failed; using template fallback"
                );
                if e != crate::remote::RemoteError::Cancelled && self.breaker.on_failure() {
                    warn!(
                        cooldown_ms = self.config.breaker.cooldown_ms,
                        "remote circuit opened after consecutive failures"
                    );
                }
                None
            }
        }
    }

    async fn store(&self, key: &CacheKey, artifact: &Artifact, ttl: Duration) {
        if let Err(e) = self.cache.set(key, artifact, ttl).await {
            warn!(key = %key, error = %e, "cache write failed");
        }
    }

    pub fn cache(&self) -> &Arc<ContentCache> {
        &self.cache
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    pub async fn clear_cache(&self) -> Result<()> {
        self.cache.clear().await
    }

    /// Drop every cached variation of one subtask.
    pub async fn clear_subtask_cache(&self, subtask_id: &str) -> Result<usize> {
        self.cache.clear_subtask(subtask_id).await
    }

    pub fn breaker_snapshot(&self) -> CircuitBreakerSnapshot {
        self.breaker.snapshot()
    }

    /// Cancel in-flight remote calls; later requests use the fallback path.
    pub fn shutdown(&self) {
        if let Some(ref remote) = self.remote {
            remote.shutdown();
        }
    }
}
