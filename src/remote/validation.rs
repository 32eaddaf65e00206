//! Structural validation of remote payloads.
//!
//! Nothing from the remote service is trusted until it has been parsed field by field
//! into a [`RemoteBlueprint`].

use crate::types::{Artifact, ArtifactStatus, Complexity, GenerationRequest, StepType, WorkflowStep};
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use uuid::Uuid;

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*\s*\n?(.*?)\n?\s*```\s*$").expect("static regex")
});

/// Outcome of validating a raw payload.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadValidation {
    Valid(RemoteBlueprint),
    Invalid(String),
}

impl PayloadValidation {
    pub fn is_valid(&self) -> bool {
        matches!(self, PayloadValidation::Valid(_))
    }
}

/// Workflow content accepted from the remote service.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteBlueprint {
    pub title: String,
    pub description: String,
    pub complexity: Complexity,
    pub steps: Vec<WorkflowStep>,
    pub integrations: Vec<String>,
    pub estimated_time_savings_minutes: f64,
}

impl RemoteBlueprint {
    /// Attach identity and provenance; `status` is always `generated`.
    pub fn into_artifact(self, request: &GenerationRequest) -> Artifact {
        Artifact {
            id: format!(
                "remote-{}-v{}-{}",
                request.subtask_id(),
                request.variation_index(),
                Uuid::new_v4().simple()
            ),
            subtask_id: request.subtask_id().to_string(),
            title: self.title,
            description: self.description,
            complexity: self.complexity,
            integrations: self.integrations,
            steps: self.steps,
            estimated_time_savings_minutes: self.estimated_time_savings_minutes,
            status: ArtifactStatus::Generated,
            language: request.language().to_string(),
            variation_index: request.variation_index(),
            created_at: Utc::now(),
        }
    }
}

/// Parse and validate the raw text returned by the transport.
pub fn validate_payload(raw: &str) -> PayloadValidation {
    let body = match CODE_FENCE.captures(raw) {
        Some(caps) => caps.get(1).map(|m| m.as_str()).unwrap_or(raw),
        None => raw,
    };
    let value: Value = match serde_json::from_str(body.trim()) {
        Ok(v) => v,
        Err(e) => return PayloadValidation::Invalid(format!("payload is not JSON: {}", e)),
    };
    match validate_value(&value) {
        Ok(blueprint) => PayloadValidation::Valid(blueprint),
        Err(reason) => PayloadValidation::Invalid(reason),
    }
}

fn validate_value(value: &Value) -> Result<RemoteBlueprint, String> {
    let obj = value
        .as_object()
        .ok_or_else(|| "payload must be a JSON object".to_string())?;

    let title = required_string(obj, &["title", "name"])?;
    let description = required_string(obj, &["description"])?;

    let complexity = obj
        .get("complexity")
        .and_then(Value::as_str)
        .ok_or_else(|| "missing field 'complexity'".to_string())?
        .parse::<Complexity>()?;

    let savings = first_present(obj, &["estimatedTimeSavings", "estimated_time_savings"])
        .ok_or_else(|| "missing field 'estimatedTimeSavings'".to_string())?
        .as_f64()
        .ok_or_else(|| "'estimatedTimeSavings' must be a number".to_string())?;
    if !(savings.is_finite() && savings > 0.0) {
        return Err(format!("'estimatedTimeSavings' must be positive, got {}", savings));
    }

    let raw_steps = obj
        .get("steps")
        .and_then(Value::as_array)
        .ok_or_else(|| "missing array field 'steps'".to_string())?;
    if raw_steps.is_empty() {
        return Err("'steps' must not be empty".to_string());
    }
    let steps = raw_steps
        .iter()
        .enumerate()
        .map(|(i, s)| validate_step(i, s))
        .collect::<Result<Vec<_>, _>>()?;

    let mut integrations: Vec<String> = match obj.get("integrations") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| {
                v.as_str()
                    .map(|s| s.trim().to_string())
                    .ok_or_else(|| "'integrations' must contain only strings".to_string())
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err("'integrations' must be an array".to_string()),
    };
    integrations.retain(|s| !s.is_empty());
    if integrations.is_empty() {
        for step in &steps {
            if let Some(ref i) = step.integration {
                if !integrations.contains(i) {
                    integrations.push(i.clone());
                }
            }
        }
    }

    Ok(RemoteBlueprint {
        title,
        description,
        complexity,
        steps,
        integrations,
        estimated_time_savings_minutes: savings,
    })
}

fn validate_step(index: usize, value: &Value) -> Result<WorkflowStep, String> {
    let obj = value
        .as_object()
        .ok_or_else(|| format!("steps[{}] must be an object", index))?;
    let step_type = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| format!("steps[{}] is missing 'type'", index))?
        .parse::<StepType>()
        .map_err(|e| format!("steps[{}]: {}", index, e))?;
    let name = first_present(obj, &["name", "description"])
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(step_type.as_str())
        .to_string();
    let integration = first_present(obj, &["integration", "app"])
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    Ok(WorkflowStep {
        step_type,
        name,
        integration,
    })
}

fn required_string(obj: &Map<String, Value>, names: &[&str]) -> Result<String, String> {
    let value = first_present(obj, names)
        .ok_or_else(|| format!("missing field '{}'", names[0]))?;
    let s = value
        .as_str()
        .ok_or_else(|| format!("'{}' must be a string", names[0]))?
        .trim();
    if s.is_empty() {
        return Err(format!("'{}' must not be empty", names[0]));
    }
    Ok(s.to_string())
}

fn first_present<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|n| obj.get(*n))
        .find(|v| !v.is_null())
}
