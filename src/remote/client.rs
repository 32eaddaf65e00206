//! Deadline-bounded remote generation.

use super::prompt::PromptBuilder;
use super::transport::GenerationTransport;
use super::validation::{validate_payload, PayloadValidation};
use crate::types::{Artifact, GenerationRequest};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Recoverable remote failures. Every variant sends the caller to the template fallback.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("remote generation timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("remote transport failed: {0}")]
    Transport(String),

    #[error("remote payload rejected: {0}")]
    Validation(String),

    #[error("remote generation cancelled")]
    Cancelled,
}

impl RemoteError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "timeout",
            Self::Transport(_) => "transport",
            Self::Validation(_) => "validation",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Wraps one transport call behind a hard deadline and payload validation.
///
/// The transport future is raced against the deadline timer and the client's shutdown
/// token. The losing branch is dropped, which aborts an in-flight HTTP request rather than
/// leaving it running in the background.
pub struct RemoteClient {
    transport: Arc<dyn GenerationTransport>,
    prompts: PromptBuilder,
    shutdown: CancellationToken,
}

impl RemoteClient {
    pub fn new(transport: Arc<dyn GenerationTransport>) -> Self {
        Self {
            transport,
            prompts: PromptBuilder::new(),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_prompts(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    /// Cancel every in-flight and future call on this client.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    pub async fn generate(
        &self,
        request: &GenerationRequest,
        deadline: Duration,
    ) -> Result<Artifact, RemoteError> {
        if self.shutdown.is_cancelled() {
            return Err(RemoteError::Cancelled);
        }
        let messages = self.prompts.build(request);

        let raw = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => return Err(RemoteError::Cancelled),
            res = self.transport.complete(&messages) => {
                res.map_err(|e| RemoteError::Transport(e.to_string()))?
            }
            _ = tokio::time::sleep(deadline) => return Err(RemoteError::Timeout(deadline)),
        };

        match validate_payload(&raw) {
            PayloadValidation::Valid(blueprint) => Ok(blueprint.into_artifact(request)),
            PayloadValidation::Invalid(reason) => {
                debug!(
                    subtask_id = request.subtask_id(),
                    reason = reason.as_str(),
                    "remote payload failed validation"
                );
                Err(RemoteError::Validation(reason))
            }
        }
    }
}
