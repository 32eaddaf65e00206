//! 远程生成模块：在硬性截止时间内调用外部生成服务，并在接受前校验返回结构。
//!
//! # Remote Generation Module
//!
//! Wraps a single call to the external generative text service.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`RemoteClient`] | Races the transport call against a deadline and a shutdown token |
//! | [`RemoteError`] | Timeout / transport / validation / cancelled |
//! | [`GenerationTransport`] | Trait for the actual service call |
//! | [`HttpTransport`] | OpenAI-compatible chat-completions transport (reqwest) |
//! | [`PromptBuilder`] | Renders system and user messages for a request |
//! | [`validate_payload`] | Parses raw text into [`PayloadValidation`] |
//!
//! ## Credentials
//!
//! [`HttpTransport::from_config`] looks for a key in the config, then the OS keyring
//! (`flowsmith` / `remote`), then the environment variable named by
//! `remote.api_key_env` (default `FLOWSMITH_API_KEY`). A missing key is a configuration
//! error, reported once when the transport is built.

mod client;
mod prompt;
mod transport;
mod validation;

pub use crate::config::RemoteConfig;
pub use client::{RemoteClient, RemoteError};
pub use prompt::PromptBuilder;
pub use transport::{resolve_api_key, GenerationTransport, HttpTransport, TransportError};
pub use validation::{validate_payload, PayloadValidation, RemoteBlueprint};
