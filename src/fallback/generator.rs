//! Deterministic template generator used when remote generation is unavailable.

use super::catalog::{TemplateCatalog, TemplateDescriptor};
use super::matcher::select_category;
use crate::types::{Artifact, ArtifactStatus, StepType, Subtask, WorkflowStep};
use crate::Result;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

const UNTITLED: &str = "Untitled Task";

/// Builds a structurally valid [`Artifact`] from a subtask using the template catalog.
///
/// `generate` is total: it cannot fail for any subtask. Everything except the id is a pure
/// function of `(subtask, language, variation_index)`.
#[derive(Debug, Clone)]
pub struct FallbackGenerator {
    catalog: Arc<TemplateCatalog>,
}

impl FallbackGenerator {
    pub fn new(catalog: Arc<TemplateCatalog>) -> Self {
        Self { catalog }
    }

    /// Generator over the built-in catalog.
    pub fn builtin() -> Result<Self> {
        Ok(Self::new(Arc::new(TemplateCatalog::builtin()?)))
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub fn generate(&self, subtask: &Subtask, language: &str, variation_index: u32) -> Artifact {
        let category = select_category(&self.catalog, subtask);
        let template = TemplateCatalog::template_for(category, variation_index);

        let title = match subtask.title.trim() {
            "" => UNTITLED,
            t => t,
        };

        let integrations = rotate(&category.integrations, variation_index as usize);
        let pick = |i: usize| integrations[i % integrations.len()].clone();
        let steps = vec![
            WorkflowStep::new(StepType::Trigger, &template.steps.trigger).with_integration(pick(0)),
            WorkflowStep::new(StepType::Process, &template.steps.process).with_integration(pick(1)),
            WorkflowStep::new(StepType::Output, &template.steps.output).with_integration(pick(2)),
        ];
        let mut used: Vec<String> = Vec::with_capacity(3);
        for step in &steps {
            if let Some(ref i) = step.integration {
                if !used.contains(i) {
                    used.push(i.clone());
                }
            }
        }

        Artifact {
            id: fallback_id(&subtask.id, variation_index),
            subtask_id: subtask.id.clone(),
            title: TemplateDescriptor::render(&template.name, title),
            description: TemplateDescriptor::render(&template.description, title),
            complexity: template.complexity,
            integrations: used,
            steps,
            estimated_time_savings_minutes: template.time_savings_minutes,
            status: ArtifactStatus::Fallback,
            language: language.to_string(),
            variation_index,
            created_at: Utc::now(),
        }
    }
}

fn rotate(items: &[String], by: usize) -> Vec<String> {
    let n = items.len();
    (0..n).map(|i| items[(i + by) % n].clone()).collect()
}

/// `fallback-<subtask>-v<variation>-<epoch ms>-<random>`; unique per call.
fn fallback_id(subtask_id: &str, variation_index: u32) -> String {
    let safe: String = subtask_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "fallback-{}-v{}-{}-{}",
        safe,
        variation_index,
        Utc::now().timestamp_millis(),
        &suffix[..12]
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn generator() -> FallbackGenerator {
        FallbackGenerator::builtin().unwrap()
    }

    #[test]
    fn test_email_marketing_example() {
        let subtask = Subtask::new("task-1", "Email Marketing Automation");
        let artifact = generator().generate(&subtask, "en", 0);
        assert!(artifact.title.contains("Email Marketing"));
        assert_eq!(artifact.status, ArtifactStatus::Fallback);
        assert_eq!(artifact.subtask_id, "task-1");
        assert!(artifact.id.starts_with("fallback-task-1-v0-"));
    }

    #[test]
    fn test_three_step_shape() {
        let artifact = generator().generate(&Subtask::new("t", "Payroll run"), "en", 1);
        let kinds: Vec<StepType> = artifact.steps.iter().map(|s| s.step_type).collect();
        assert_eq!(kinds, vec![StepType::Trigger, StepType::Process, StepType::Output]);
        assert!(artifact.steps.iter().all(|s| s.integration.is_some()));
        assert!(!artifact.integrations.is_empty());
        assert!(artifact.estimated_time_savings_minutes > 0.0);
    }

    #[test]
    fn test_ids_unique_across_calls() {
        let g = generator();
        let subtask = Subtask::new("same", "Same task");
        let ids: HashSet<String> = (0..200).map(|_| g.generate(&subtask, "en", 0).id).collect();
        assert_eq!(ids.len(), 200);
    }

    #[test]
    fn test_variation_beyond_template_count_cycles() {
        let g = generator();
        let subtask = Subtask::new("t", "Water the office plants");
        let n = g.catalog().generic().templates.len() as u32;
        let a = g.generate(&subtask, "en", 1);
        let b = g.generate(&subtask, "en", 1 + n);
        assert_eq!(a.description, b.description);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_blank_title_still_valid() {
        let artifact = generator().generate(&Subtask::new("", "   "), "de", 0);
        assert!(artifact.title.contains(UNTITLED));
        assert_eq!(artifact.language, "de");
        assert!(artifact.id.starts_with("fallback--v0-"));
    }

    #[test]
    fn test_unsafe_id_characters_replaced() {
        let artifact = generator().generate(&Subtask::new("a b/c", "Report"), "en", 2);
        assert!(artifact.id.starts_with("fallback-a_b_c-v2-"));
    }
}
