use super::core::WorkflowGenerator;
use crate::cache::{CacheKeyGenerator, ContentCache};
use crate::config::GeneratorConfig;
use crate::fallback::{FallbackGenerator, TemplateCatalog};
use crate::remote::{GenerationTransport, HttpTransport, PromptBuilder, RemoteClient};
use crate::resilience::circuit_breaker::CircuitBreaker;
use crate::Result;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

/// Builder for [`WorkflowGenerator`].
///
/// Keep this surface small: config, an optional shared cache, and the two seams
/// (transport and template catalog) that tests and embedders replace.
pub struct WorkflowGeneratorBuilder {
    config: GeneratorConfig,
    cache: Option<Arc<ContentCache>>,
    transport: Option<Arc<dyn GenerationTransport>>,
    catalog: Option<Arc<TemplateCatalog>>,
    prompts: Option<PromptBuilder>,
    key_salt: Option<String>,
    fallback_only: bool,
}

impl WorkflowGeneratorBuilder {
    pub fn new() -> Self {
        Self {
            config: GeneratorConfig::default(),
            cache: None,
            transport: None,
            catalog: None,
            prompts: None,
            key_salt: None,
            fallback_only: false,
        }
    }

    pub fn config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Share an existing cache (e.g. one created at service start) instead of creating one.
    pub fn cache(mut self, cache: Arc<ContentCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Use a custom transport instead of the HTTP one; no credential is needed then.
    pub fn transport(mut self, transport: Arc<dyn GenerationTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn catalog(mut self, catalog: Arc<TemplateCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn prompts(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = Some(prompts);
        self
    }

    pub fn cache_key_salt(mut self, salt: impl Into<String>) -> Self {
        self.key_salt = Some(salt.into());
        self
    }

    /// Never call the remote service; every miss is served by the template fallback.
    pub fn fallback_only(mut self, enable: bool) -> Self {
        self.fallback_only = enable;
        self
    }

    /// Build the generator.
    ///
    /// Fails with a configuration error when the config is invalid or when remote
    /// generation is expected but no credential can be found.
    pub fn build(self) -> Result<WorkflowGenerator> {
        let config = self.config;
        config.validate()?;

        let catalog = match self.catalog {
            Some(c) => c,
            None => Arc::new(TemplateCatalog::builtin()?),
        };
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(ContentCache::in_memory(config.cache.clone())));

        let remote = if self.fallback_only {
            None
        } else {
            let transport: Arc<dyn GenerationTransport> = match self.transport {
                Some(t) => t,
                None => Arc::new(HttpTransport::from_config(&config.remote)?),
            };
            let client = RemoteClient::new(transport);
            Some(match self.prompts {
                Some(p) => client.with_prompts(p),
                None => client,
            })
        };

        let keys = match self.key_salt {
            Some(salt) => CacheKeyGenerator::new().with_salt(salt),
            None => CacheKeyGenerator::new(),
        };

        info!(
            enabled = config.generation_enabled,
            remote = remote.as_ref().map(|r| r.transport_name()).unwrap_or("none"),
            cache_backend = cache.backend_name(),
            categories = catalog.categories().len(),
            "workflow generator ready"
        );

        Ok(WorkflowGenerator {
            enabled: AtomicBool::new(config.generation_enabled),
            breaker: CircuitBreaker::new(config.breaker.clone()),
            fallback: FallbackGenerator::new(catalog),
            config,
            cache,
            keys,
            remote,
        })
    }
}

impl Default for WorkflowGeneratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
