//! Prompt construction for remote workflow generation.

use crate::types::{GenerationRequest, Message, StepType};

const SYSTEM_PROMPT: &str = "You design practical business automation workflows. \
Respond with a single JSON object and nothing else. Required fields: \
\"title\" (string), \"description\" (string), \
\"complexity\" (one of \"low\", \"medium\", \"high\"), \
\"estimatedTimeSavings\" (positive number of minutes saved per week), \
\"integrations\" (array of tool names), \
\"steps\" (non-empty array of objects with \"type\", \"name\" and optional \"integration\"). \
Allowed step types: ";

/// Renders chat messages for a generation request.
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    extra_instructions: Option<String>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.extra_instructions = Some(instructions.into());
        self
    }

    pub fn build(&self, request: &GenerationRequest) -> Vec<Message> {
        let step_types: Vec<&str> = StepType::ALL.iter().map(|t| t.as_str()).collect();
        let mut system = format!("{}{}.", SYSTEM_PROMPT, step_types.join(", "));
        if let Some(ref extra) = self.extra_instructions {
            system.push(' ');
            system.push_str(extra);
        }

        let mut user = format!(
            "Design an automation workflow for this task.\nTitle: {}\n",
            request.title()
        );
        if !request.description().trim().is_empty() {
            user.push_str(&format!("Description: {}\n", request.description()));
        }
        if !request.tags().is_empty() {
            user.push_str(&format!("Tags: {}\n", request.tags().join(", ")));
        }
        if !request.systems().is_empty() {
            user.push_str(&format!(
                "Systems already in use (prefer these as integrations): {}\n",
                request.systems().join(", ")
            ));
        }
        if let Some(estimate) = request.estimated_time() {
            user.push_str(&format!("Current manual effort: {}\n", estimate));
        }
        user.push_str(&format!(
            "Write all human-readable text in language '{}'.\n",
            request.language()
        ));
        if request.variation_index() > 0 {
            user.push_str(&format!(
                "This is alternative #{}: take a clearly different approach from the obvious one.\n",
                request.variation_index() + 1
            ));
        }

        vec![Message::system(system), Message::user(user)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MessageRole;

    #[test]
    fn test_prompt_includes_request_fields() {
        let req = GenerationRequest::new("t", "Email Marketing Automation")
            .with_description("Weekly newsletter")
            .with_language("fr");
        let messages = PromptBuilder::new().build(&req);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::System);
        assert!(messages[0].content.contains("trigger, action"));
        assert!(messages[1].content.contains("Email Marketing Automation"));
        assert!(messages[1].content.contains("Weekly newsletter"));
        assert!(messages[1].content.contains("'fr'"));
        assert!(!messages[1].content.contains("alternative"));
        assert!(!messages[1].content.contains("Tags:"));
        assert!(!messages[1].content.contains("Systems already in use"));
    }

    #[test]
    fn test_prompt_includes_subtask_context() {
        let req = GenerationRequest::new("t", "Weekly task")
            .with_tags(["grievance", "hr"])
            .with_systems(["Workday", "Slack"])
            .with_estimated_time("3h/week");
        let messages = PromptBuilder::new().build(&req);
        let user = &messages[1].content;
        assert!(user.contains("Tags: grievance, hr\n"));
        assert!(user.contains("prefer these as integrations): Workday, Slack\n"));
        assert!(user.contains("Current manual effort: 3h/week\n"));
    }

    #[test]
    fn test_variation_requests_alternative() {
        let req = GenerationRequest::new("t", "Payroll").with_variation_index(2);
        let messages = PromptBuilder::new().with_instructions("Prefer ADP.").build(&req);
        assert!(messages[1].content.contains("alternative #3"));
        assert!(messages[0].content.ends_with("Prefer ADP."));
    }
}
