//! Subtask record produced by the upstream keyword-based task analysis.

use serde::{Deserialize, Serialize};

/// An atomic unit of candidate work extracted from a job description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Free-form effort estimate as reported upstream (e.g. "2h/week").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,
    /// Systems the subtask touches today (e.g. "Gmail", "Workday").
    #[serde(default)]
    pub systems: Vec<String>,
}

impl Subtask {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            tags: Vec::new(),
            estimated_time: None,
            systems: Vec::new(),
        }
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

    pub fn with_systems<I, S>(mut self, systems: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.systems = systems.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_estimated_time(mut self, estimate: impl Into<String>) -> Self {
        self.estimated_time = Some(estimate.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_record() {
        let subtask: Subtask =
            serde_json::from_str(r#"{"id":"task-1","title":"Email Marketing Automation"}"#)
                .unwrap();
        assert_eq!(subtask.id, "task-1");
        assert!(subtask.description.is_empty());
        assert!(subtask.tags.is_empty());
        assert!(subtask.estimated_time.is_none());
    }

    #[test]
    fn test_deserialize_full_record() {
        let subtask: Subtask = serde_json::from_str(
            r#"{"id":"t2","title":"Payroll run","description":"Monthly payroll","tags":["finance"],"estimatedTime":"4h","systems":["ADP"]}"#,
        )
        .unwrap();
        assert_eq!(subtask.estimated_time.as_deref(), Some("4h"));
        assert_eq!(subtask.systems, vec!["ADP".to_string()]);
    }
}
