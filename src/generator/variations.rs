//! Multiple distinct workflows for one subtask.

use super::core::WorkflowGenerator;
use crate::types::{GenerationRequest, Subtask, VariationOutcome};
use std::collections::HashSet;
use tracing::warn;

impl WorkflowGenerator {
    /// Generate `count` variations (indices `0..count`) of one subtask.
    ///
    /// Artifacts whose id was already produced in this run are dropped and logged; they
    /// are not errors and are not retried, so the outcome may hold fewer than `count`
    /// artifacts but never more.
    pub async fn generate_variations(&self, subtask: &Subtask, count: u32) -> VariationOutcome {
        self.generate_variations_from(&self.request_for(subtask), count)
            .await
    }

    /// Like [`generate_variations`](Self::generate_variations), starting from a prepared
    /// request whose language, budget and caller context are kept for every variation.
    pub async fn generate_variations_from(
        &self,
        base: &GenerationRequest,
        count: u32,
    ) -> VariationOutcome {
        let mut outcome = VariationOutcome::default();
        let mut seen: HashSet<String> = HashSet::with_capacity(count as usize);

        for index in 0..count {
            let request = base.clone().with_variation_index(index);
            match self.generate(&request).await.into_outcome() {
                Ok(artifact) => {
                    if seen.insert(artifact.id.clone()) {
                        outcome.artifacts.push(artifact);
                    } else {
                        warn!(
                            subtask_id = base.subtask_id(),
                            variation = index,
                            artifact_id = artifact.id.as_str(),
                            "duplicate artifact id across variations; dropped"
                        );
                    }
                }
                Err(error) => outcome.errors.push(error),
            }
        }
        outcome
    }
}
