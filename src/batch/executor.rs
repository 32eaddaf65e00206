//! Batch executor.

use crate::generator::WorkflowGenerator;
use crate::types::{BatchResult, Subtask, VariationOutcome};
use futures::future::join_all;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// Subtasks processed concurrently per chunk; 0 is treated as 1.
    pub batch_size: usize,
    /// Pause between consecutive chunks (none after the last).
    pub inter_batch_delay: Duration,
    /// 1 generates a single artifact per subtask; more runs the variation controller.
    pub variations_per_subtask: u32,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_size: 5,
            inter_batch_delay: Duration::from_millis(1_000),
            variations_per_subtask: 1,
        }
    }
}

impl BatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &crate::config::GeneratorConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            inter_batch_delay: config.inter_batch_delay(),
            variations_per_subtask: 1,
        }
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn with_inter_batch_delay(mut self, delay: Duration) -> Self {
        self.inter_batch_delay = delay;
        self
    }

    pub fn with_variations(mut self, count: u32) -> Self {
        self.variations_per_subtask = count;
        self
    }

    fn effective_batch_size(&self) -> usize {
        self.batch_size.max(1)
    }
}

/// Runs a list of subtasks through a [`WorkflowGenerator`] in paced chunks.
///
/// Items inside a chunk run concurrently; chunks run one after another with
/// `inter_batch_delay` between them. A failing item only lands in `errors`.
pub struct BatchExecutor {
    options: BatchOptions,
}

impl BatchExecutor {
    pub fn new() -> Self {
        Self {
            options: BatchOptions::default(),
        }
    }

    pub fn with_options(options: BatchOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    pub async fn execute(&self, generator: &WorkflowGenerator, subtasks: &[Subtask]) -> BatchResult {
        let start = Instant::now();
        let mut result = BatchResult::new();
        let chunks: Vec<&[Subtask]> = subtasks.chunks(self.options.effective_batch_size()).collect();

        for (i, chunk) in chunks.iter().enumerate() {
            if i > 0 && !self.options.inter_batch_delay.is_zero() {
                sleep(self.options.inter_batch_delay).await;
            }
            debug!(chunk = i, size = chunk.len(), "running batch chunk");

            let outcomes = join_all(chunk.iter().map(|s| self.run_one(generator, s))).await;
            for (subtask, outcome) in chunk.iter().zip(outcomes) {
                for artifact in outcome.artifacts {
                    result.add_success(artifact);
                }
                for error in outcome.errors {
                    result.add_failure(format!("{}: {}", subtask.id, error));
                }
            }
        }

        result.metadata.chunk_count = chunks.len();
        result.metadata.total_processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            subtasks = subtasks.len(),
            chunks = chunks.len(),
            success = result.metadata.success_count,
            errors = result.metadata.error_count,
            duration_ms = result.metadata.total_processing_time_ms,
            "batch generation finished"
        );
        result
    }

    async fn run_one(&self, generator: &WorkflowGenerator, subtask: &Subtask) -> VariationOutcome {
        if self.options.variations_per_subtask > 1 {
            return generator
                .generate_variations(subtask, self.options.variations_per_subtask)
                .await;
        }
        let mut outcome = VariationOutcome::default();
        match generator.generate_for_subtask(subtask).await.into_outcome() {
            Ok(artifact) => outcome.artifacts.push(artifact),
            Err(error) => outcome.errors.push(error),
        }
        outcome
    }
}

impl Default for BatchExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowGenerator {
    /// Generate one workflow per subtask, `batch_size` at a time.
    pub async fn generate_batch(
        &self,
        subtasks: &[Subtask],
        batch_size: usize,
        inter_batch_delay: Duration,
    ) -> BatchResult {
        let options = BatchOptions::new()
            .with_batch_size(batch_size)
            .with_inter_batch_delay(inter_batch_delay);
        BatchExecutor::with_options(options)
            .execute(self, subtasks)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;

    fn generator(enabled: bool) -> WorkflowGenerator {
        WorkflowGenerator::builder()
            .config(GeneratorConfig::default().with_generation_enabled(enabled))
            .fallback_only(true)
            .build()
            .unwrap()
    }

    fn subtasks(n: usize) -> Vec<Subtask> {
        (0..n)
            .map(|i| Subtask::new(format!("task-{}", i), format!("Task number {}", i)))
            .collect()
    }

    #[tokio::test]
    async fn test_empty_input() {
        let result = BatchExecutor::new().execute(&generator(true), &[]).await;
        assert!(result.artifacts.is_empty());
        assert_eq!(result.metadata.chunk_count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_batch_size_is_one() {
        let options = BatchOptions::new()
            .with_batch_size(0)
            .with_inter_batch_delay(Duration::ZERO);
        let result = BatchExecutor::with_options(options)
            .execute(&generator(true), &subtasks(3))
            .await;
        assert_eq!(result.metadata.chunk_count, 3);
        assert_eq!(result.metadata.success_count, 3);
    }

    #[tokio::test]
    async fn test_disabled_items_are_errors() {
        let result = BatchExecutor::with_options(BatchOptions::new().with_inter_batch_delay(Duration::ZERO))
            .execute(&generator(false), &subtasks(2))
            .await;
        assert_eq!(result.metadata.success_count, 0);
        assert_eq!(result.metadata.error_count, 2);
        assert!(result.errors[0].starts_with("task-0: "));
    }

    #[tokio::test(start_paused = true)]
    async fn test_variations_per_subtask() {
        let options = BatchOptions::new()
            .with_variations(3)
            .with_inter_batch_delay(Duration::ZERO);
        let result = BatchExecutor::with_options(options)
            .execute(&generator(true), &subtasks(2))
            .await;
        assert_eq!(result.artifacts.len(), 6);
    }
}
