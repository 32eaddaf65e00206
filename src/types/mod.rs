//! 类型模块：定义子任务、生成请求、工作流产物与生成结果等核心数据类型。
//!
//! # Types Module
//!
//! This module defines the data model shared by every stage of the generation
//! pipeline, from the upstream subtask record to the results handed back to callers.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Subtask`] | Unit of candidate work produced by the upstream task analysis |
//! | [`GenerationRequest`] | Immutable request for one workflow variation |
//! | [`CallerContext`] | Caller identity used to scope cached results |
//! | [`Artifact`] | Generated workflow blueprint |
//! | [`GenerationResult`] | Outcome of a single generation (artifact or error, plus metadata) |
//! | [`BatchResult`] | Aggregated outcome of a paced batch run |
//! | [`Message`] | Chat message sent to the remote generation service |
//!
//! All public types serialize with camelCase field names so that downstream
//! consumers can render or persist them without a mapping layer.

pub mod artifact;
pub mod message;
pub mod request;
pub mod result;
pub mod subtask;

pub use artifact::{Artifact, ArtifactStatus, Complexity, StepType, WorkflowStep};
pub use message::{Message, MessageRole};
pub use request::{CallerContext, GenerationRequest};
pub use result::{
    BatchMetadata, BatchResult, GenerationMetadata, GenerationResult, GenerationSource,
    VariationOutcome,
};
pub use subtask::Subtask;
