//! Shared fixtures for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use flowsmith::remote::GenerationTransport;
use flowsmith::types::Message;
use flowsmith::{RemoteConfig, Result};
use mockito::{Mock, Server, ServerGuard};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const VALID_BLUEPRINT: &str = r#"{
    "title": "Automated Onboarding Flow",
    "description": "Provisions accounts and schedules the first week",
    "complexity": "Medium",
    "estimatedTimeSavings": 120,
    "steps": [
        {"type": "trigger", "name": "Offer accepted", "integration": "BambooHR"},
        {"type": "action", "name": "Create accounts", "integration": "Google Workspace"},
        {"type": "output", "name": "Post welcome message", "integration": "Slack"}
    ]
}"#;

/// Returns the same body for every call and counts calls.
pub struct FixedTransport {
    body: String,
    pub calls: AtomicUsize,
}

impl FixedTransport {
    pub fn new(body: &str) -> Arc<Self> {
        Arc::new(Self {
            body: body.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationTransport for FixedTransport {
    async fn complete(&self, _messages: &[Message]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.body.clone())
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Never resolves.
pub struct HangingTransport;

#[async_trait]
impl GenerationTransport for HangingTransport {
    async fn complete(&self, _messages: &[Message]) -> Result<String> {
        std::future::pending::<Result<String>>().await
    }

    fn name(&self) -> &'static str {
        "hanging"
    }
}

/// Valid blueprint unless the user prompt mentions `poison`, which gets a broken payload.
pub struct PoisonTransport {
    pub poison: String,
}

#[async_trait]
impl GenerationTransport for PoisonTransport {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let poisoned = messages.iter().any(|m| m.content.contains(&self.poison));
        if poisoned {
            Ok(r#"{"title": "Broken", "steps": []}"#.to_string())
        } else {
            Ok(VALID_BLUEPRINT.to_string())
        }
    }

    fn name(&self) -> &'static str {
        "poison"
    }
}

/// Test fixture that manages a mock chat-completions server
pub struct MockServerFixture {
    pub server: Arc<Mutex<ServerGuard>>,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self {
            server: Arc::new(Mutex::new(server)),
            base_url,
        }
    }

    /// Remote config pointing at the mock server with an inline credential.
    pub fn remote_config(&self) -> RemoteConfig {
        RemoteConfig {
            base_url: self.base_url.clone(),
            api_key: Some("test-key".to_string()),
            use_keyring: false,
            ..RemoteConfig::default()
        }
    }

    /// Mock a chat-completions response whose message content is `content`.
    pub async fn mock_completion(&self, content: &str) -> Mock {
        let body = serde_json::json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }]
        });
        let mut server = self.server.lock().await;
        server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await
    }

    /// Mock an error response
    pub async fn mock_error(&self, status: usize, body: &str) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }
}
