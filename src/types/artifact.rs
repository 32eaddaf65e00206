//! Workflow blueprint produced by the generation pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Estimated implementation effort of a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl FromStr for Complexity {
    type Err = String;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown complexity '{}'", other)),
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance of an artifact.
///
/// Template output is always `Fallback`; only validated remote output is `Generated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactStatus {
    Generated,
    Fallback,
}

/// Recognized step kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepType {
    Trigger,
    Action,
    Condition,
    Transform,
    Process,
    Output,
}

impl StepType {
    pub const ALL: [StepType; 6] = [
        Self::Trigger,
        Self::Action,
        Self::Condition,
        Self::Transform,
        Self::Process,
        Self::Output,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trigger => "trigger",
            Self::Action => "action",
            Self::Condition => "condition",
            Self::Transform => "transform",
            Self::Process => "process",
            Self::Output => "output",
        }
    }
}

impl FromStr for StepType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == lowered)
            .ok_or_else(|| format!("unknown step type '{}'", s))
    }
}

/// One step of a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStep {
    #[serde(rename = "type")]
    pub step_type: StepType,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration: Option<String>,
}

impl WorkflowStep {
    pub fn new(step_type: StepType, name: impl Into<String>) -> Self {
        Self {
            step_type,
            name: name.into(),
            integration: None,
        }
    }

    pub fn with_integration(mut self, integration: impl Into<String>) -> Self {
        self.integration = Some(integration.into());
        self
    }
}

/// Generated automation blueprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// Globally unique; never shared between two variations.
    pub id: String,
    pub subtask_id: String,
    pub title: String,
    pub description: String,
    pub complexity: Complexity,
    pub integrations: Vec<String>,
    pub steps: Vec<WorkflowStep>,
    pub estimated_time_savings_minutes: f64,
    pub status: ArtifactStatus,
    pub language: String,
    pub variation_index: u32,
    pub created_at: DateTime<Utc>,
}

impl Artifact {
    pub fn is_fallback(&self) -> bool {
        self.status == ArtifactStatus::Fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complexity_parse_is_case_insensitive() {
        assert_eq!("LOW".parse::<Complexity>().unwrap(), Complexity::Low);
        assert_eq!(" Medium ".parse::<Complexity>().unwrap(), Complexity::Medium);
        assert_eq!("high".parse::<Complexity>().unwrap(), Complexity::High);
        assert!("extreme".parse::<Complexity>().is_err());
    }

    #[test]
    fn test_step_type_parse() {
        for t in StepType::ALL {
            assert_eq!(t.as_str().parse::<StepType>().unwrap(), t);
        }
        assert_eq!("Trigger".parse::<StepType>().unwrap(), StepType::Trigger);
        assert!("teleport".parse::<StepType>().is_err());
    }

    #[test]
    fn test_step_serializes_type_field() {
        let step = WorkflowStep::new(StepType::Output, "Send report").with_integration("Slack");
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["type"], "output");
        assert_eq!(json["integration"], "Slack");
    }
}
