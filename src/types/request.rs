//! Generation request and caller context.

use super::subtask::Subtask;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Who is asking. Only `identity` participates in cache scoping; attributes are
/// informational and forwarded to logs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallerContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl CallerContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_identity(identity: impl Into<String>) -> Self {
        Self {
            identity: Some(identity.into()),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Request for one workflow variation of one subtask.
///
/// Immutable once built: every `with_*` method consumes the request and returns a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    subtask_id: String,
    title: String,
    description: String,
    tags: Vec<String>,
    systems: Vec<String>,
    estimated_time: Option<String>,
    language: String,
    timeout_budget: Option<Duration>,
    variation_index: u32,
    caller_context: CallerContext,
}

impl GenerationRequest {
    pub const DEFAULT_LANGUAGE: &'static str = "en";

    pub fn new(subtask_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            subtask_id: subtask_id.into(),
            title: title.into(),
            description: String::new(),
            tags: Vec::new(),
            systems: Vec::new(),
            estimated_time: None,
            language: Self::DEFAULT_LANGUAGE.to_string(),
            timeout_budget: None,
            variation_index: 0,
            caller_context: CallerContext::default(),
        }
    }

    pub fn from_subtask(subtask: &Subtask) -> Self {
        let mut request = Self::new(subtask.id.clone(), subtask.title.clone())
            .with_description(subtask.description.clone())
            .with_tags(subtask.tags.iter().cloned())
            .with_systems(subtask.systems.iter().cloned());
        request.estimated_time = subtask.estimated_time.clone();
        request
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Systems the caller already runs; remote prompts favour them as integrations.
    pub fn with_systems<I, S>(mut self, systems: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.systems = systems.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_estimated_time(mut self, estimated_time: impl Into<String>) -> Self {
        self.estimated_time = Some(estimated_time.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Override the configured per-call remote deadline for this request.
    pub fn with_timeout_budget(mut self, budget: Duration) -> Self {
        self.timeout_budget = Some(budget);
        self
    }

    pub fn with_variation_index(mut self, index: u32) -> Self {
        self.variation_index = index;
        self
    }

    pub fn with_caller_context(mut self, context: CallerContext) -> Self {
        self.caller_context = context;
        self
    }

    pub fn subtask_id(&self) -> &str {
        &self.subtask_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn systems(&self) -> &[String] {
        &self.systems
    }

    pub fn estimated_time(&self) -> Option<&str> {
        self.estimated_time.as_deref()
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn timeout_budget(&self) -> Option<Duration> {
        self.timeout_budget
    }

    pub fn variation_index(&self) -> u32 {
        self.variation_index
    }

    pub fn caller_context(&self) -> &CallerContext {
        &self.caller_context
    }

    /// Subtask view of this request, as consumed by the template fallback.
    pub fn to_subtask(&self) -> Subtask {
        let subtask = Subtask::new(self.subtask_id.clone(), self.title.clone())
            .with_description(self.description.clone())
            .with_tags(self.tags.iter().cloned())
            .with_systems(self.systems.iter().cloned());
        match &self.estimated_time {
            Some(estimate) => subtask.with_estimated_time(estimate.clone()),
            None => subtask,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let req = GenerationRequest::new("task-1", "Email Marketing Automation");
        assert_eq!(req.language(), "en");
        assert_eq!(req.variation_index(), 0);
        assert!(req.timeout_budget().is_none());
        assert!(req.caller_context().identity.is_none());
    }

    #[test]
    fn test_from_subtask_carries_description() {
        let subtask = Subtask::new("t", "Payroll").with_description("Monthly payroll run");
        let req = GenerationRequest::from_subtask(&subtask).with_variation_index(3);
        assert_eq!(req.description(), "Monthly payroll run");
        assert_eq!(req.variation_index(), 3);
        assert_eq!(req.to_subtask().description, "Monthly payroll run");
    }

    #[test]
    fn test_subtask_fields_survive_round_trip() {
        let subtask = Subtask::new("t", "Weekly task")
            .with_tags(["grievance", "hr"])
            .with_systems(["Workday"])
            .with_estimated_time("3 hours/week");
        let req = GenerationRequest::from_subtask(&subtask);
        assert_eq!(req.tags(), ["grievance", "hr"]);
        assert_eq!(req.systems(), ["Workday"]);
        assert_eq!(req.estimated_time(), Some("3 hours/week"));
        assert_eq!(req.to_subtask(), subtask);
    }
}
