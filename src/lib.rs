//! # flowsmith
//!
//! 工作流蓝图生成库：先查缓存，再在截止时间内调用远程生成服务，失败时回退到确定性的模板生成器。
//!
//! Generation-with-fallback pipeline that turns task descriptions ("subtasks") into
//! structured automation workflow blueprints.
//!
//! ## Overview
//!
//! Every request resolves to an artifact through a fixed sequence: a feature toggle, a
//! content cache, at most one deadline-bounded call to a remote generative service, and a
//! template generator that cannot fail. Callers never see the remote service's failures;
//! they see a `fallback`-labeled artifact instead.
//!
//! ## Key Features
//!
//! - **Hard deadlines**: the remote call is raced against a timer and dropped when it loses
//! - **Honest provenance**: fallback output always carries `status = fallback`
//! - **Scoped caching**: keys include subtask, language, variation and a caller fingerprint
//! - **Variations**: several distinct workflows per subtask, de-duplicated by id
//! - **Paced batches**: fixed-size concurrent chunks with a delay between chunks
//! - **Circuit breaker**: repeated remote failures skip the remote call for a cooldown
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flowsmith::{GeneratorConfig, Subtask, WorkflowGenerator};
//!
//! #[tokio::main]
//! async fn main() -> flowsmith::Result<()> {
//!     // Reads FLOWSMITH_* variables; the API key comes from config, keyring or env.
//!     let generator = WorkflowGenerator::builder()
//!         .config(GeneratorConfig::from_env())
//!         .build()?;
//!
//!     let subtask = Subtask::new("task-1", "Email Marketing")
//!         .with_description("Send the monthly newsletter to subscribers");
//!     let result = generator.generate_for_subtask(&subtask).await;
//!     if let Some(artifact) = result.artifact() {
//!         println!("{} ({:?}, via {})", artifact.title, artifact.status, result.source());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`generator`] | Single-item orchestration and variations |
//! | [`batch`] | Paced batch execution |
//! | [`cache`] | Content cache with TTL and pluggable backends |
//! | [`remote`] | Remote generation client, transport and payload validation |
//! | [`fallback`] | Template catalog and deterministic fallback generator |
//! | [`resilience`] | Circuit breaker for the remote service |
//! | [`config`] | Configuration loading (YAML, environment, builders) |
//! | [`types`] | Subtasks, requests, artifacts and results |

pub mod batch;
pub mod cache;
pub mod config;
pub mod fallback;
pub mod generator;
pub mod remote;
pub mod resilience;
pub mod types;

// Re-export main types for convenience
pub use batch::{BatchExecutor, BatchOptions};
pub use cache::{CacheConfig, ContentCache};
pub use config::{GeneratorConfig, RemoteConfig};
pub use fallback::{FallbackGenerator, TemplateCatalog};
pub use generator::{WorkflowGenerator, WorkflowGeneratorBuilder};
pub use types::{
    Artifact, ArtifactStatus, BatchResult, CallerContext, Complexity, GenerationRequest,
    GenerationResult, GenerationSource, Subtask, VariationOutcome, WorkflowStep,
};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
