//! Transport seam between the remote client and the generation service.

use super::RemoteConfig;
use crate::types::Message;
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use keyring::Entry;
use serde_json::json;
use std::env;
use std::time::Duration;
use tracing::debug;

const KEYRING_SERVICE: &str = "flowsmith";
const KEYRING_USER: &str = "remote";

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Transport error: {0}")]
    Other(String),
}

/// A single text-completion call against the generation service.
///
/// Implementations must be cancel-safe: the caller drops the future when its deadline
/// passes, and dropping must abort the underlying work.
#[async_trait]
pub trait GenerationTransport: Send + Sync {
    /// Send the chat messages and return the raw text the service produced.
    async fn complete(&self, messages: &[Message]) -> Result<String>;
    fn name(&self) -> &'static str;
}

/// Resolve the service credential: explicit config, then the OS keyring, then the
/// environment variable named by `api_key_env`.
pub fn resolve_api_key(config: &RemoteConfig) -> Option<String> {
    if let Some(ref key) = config.api_key {
        if !key.trim().is_empty() {
            return Some(key.clone());
        }
    }

    if config.use_keyring {
        if let Ok(entry) = Entry::new(KEYRING_SERVICE, KEYRING_USER) {
            if let Ok(key) = entry.get_password() {
                if !key.trim().is_empty() {
                    return Some(key);
                }
            }
        }
    }

    env::var(&config.api_key_env)
        .ok()
        .filter(|k| !k.trim().is_empty())
}

/// OpenAI-compatible chat-completions transport.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f64,
    api_key: String,
}

impl HttpTransport {
    pub fn new(config: &RemoteConfig, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs.max(1)))
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            api_key,
        })
    }

    /// Build from config, failing with a configuration error when no credential exists.
    pub fn from_config(config: &RemoteConfig) -> Result<Self> {
        let api_key = resolve_api_key(config).ok_or_else(|| {
            Error::configuration_with_context(
                "no credential found for the remote generation service",
                ErrorContext::new()
                    .with_field_path("remote.api_key")
                    .with_details(format!(
                        "set {} or store a key in the '{}' keyring entry",
                        config.api_key_env, KEYRING_SERVICE
                    ))
                    .with_source("http_transport"),
            )
        })?;
        Self::new(config, api_key)
    }
}

#[async_trait]
impl GenerationTransport for HttpTransport {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature,
            "response_format": { "type": "json_object" },
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(TransportError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(http_status = status.as_u16(), "remote generation request rejected");
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let json: serde_json::Value = response.json().await.map_err(TransportError::Http)?;
        json.pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| {
                TransportError::Other("response missing choices[0].message.content".into()).into()
            })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
