//! Generation outcomes.

use super::artifact::Artifact;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Which stage of the pipeline produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationSource {
    Cache,
    Remote,
    Fallback,
    Disabled,
}

impl GenerationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Remote => "remote",
            Self::Fallback => "fallback",
            Self::Disabled => "disabled",
        }
    }
}

impl fmt::Display for GenerationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetadata {
    pub source: GenerationSource,
    pub generated_at: DateTime<Utc>,
    pub processing_time_ms: u64,
}

impl GenerationMetadata {
    pub fn new(source: GenerationSource, elapsed: Duration) -> Self {
        Self {
            source,
            generated_at: Utc::now(),
            processing_time_ms: elapsed.as_millis() as u64,
        }
    }
}

/// Result of a single generation. Exactly one of `artifact` / `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    artifact: Option<Artifact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    metadata: GenerationMetadata,
}

impl GenerationResult {
    pub fn success(artifact: Artifact, source: GenerationSource, elapsed: Duration) -> Self {
        Self {
            artifact: Some(artifact),
            error: None,
            metadata: GenerationMetadata::new(source, elapsed),
        }
    }

    pub fn failure(error: impl Into<String>, source: GenerationSource, elapsed: Duration) -> Self {
        Self {
            artifact: None,
            error: Some(error.into()),
            metadata: GenerationMetadata::new(source, elapsed),
        }
    }

    pub fn disabled(elapsed: Duration) -> Self {
        Self::failure(
            "workflow generation is disabled",
            GenerationSource::Disabled,
            elapsed,
        )
    }

    pub fn artifact(&self) -> Option<&Artifact> {
        self.artifact.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn metadata(&self) -> &GenerationMetadata {
        &self.metadata
    }

    pub fn source(&self) -> GenerationSource {
        self.metadata.source
    }

    pub fn is_success(&self) -> bool {
        self.artifact.is_some()
    }

    /// Split into the artifact-or-error pair.
    pub fn into_outcome(self) -> Result<Artifact, String> {
        match (self.artifact, self.error) {
            (Some(artifact), _) => Ok(artifact),
            (None, Some(error)) => Err(error),
            (None, None) => Err("generation produced neither artifact nor error".to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchMetadata {
    pub total_processing_time_ms: u64,
    pub success_count: usize,
    pub error_count: usize,
    pub chunk_count: usize,
}

/// Aggregated outcome of a batch run. Partial failure is data, not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub artifacts: Vec<Artifact>,
    pub errors: Vec<String>,
    pub metadata: BatchMetadata,
}

impl BatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_success(&mut self, artifact: Artifact) {
        self.artifacts.push(artifact);
        self.metadata.success_count += 1;
    }

    pub fn add_failure(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
        self.metadata.error_count += 1;
    }

    pub fn all_succeeded(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.metadata.success_count + self.metadata.error_count;
        if total == 0 {
            0.0
        } else {
            self.metadata.success_count as f64 / total as f64
        }
    }
}

/// Outcome of a multi-variation run for one subtask.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariationOutcome {
    pub artifacts: Vec<Artifact>,
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_result_shape() {
        let result = GenerationResult::disabled(Duration::ZERO);
        assert!(result.artifact().is_none());
        assert!(result.error().is_some());
        assert_eq!(result.source(), GenerationSource::Disabled);
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("artifact").is_none());
        assert_eq!(json["metadata"]["source"], "disabled");
    }

    #[test]
    fn test_batch_result_tallies() {
        let mut batch = BatchResult::new();
        assert_eq!(batch.success_rate(), 0.0);
        batch.add_failure("disabled");
        assert_eq!(batch.metadata.error_count, 1);
        assert!(!batch.all_succeeded());
        assert_eq!(batch.success_rate(), 0.0);
    }
}
