//! 工作流生成编排模块：开关检查 → 缓存查找 → 远程生成（带截止时间）→ 模板回退。
//!
//! # Generation Orchestration Module
//!
//! [`WorkflowGenerator`] resolves one request through a fixed sequence of stages:
//!
//! 1. **Toggle check**: when generation is disabled the request ends with an error result
//!    and nothing else is touched (no cache access, no remote call).
//! 2. **Cache lookup**: a hit is returned as-is; a lookup error counts as a miss.
//! 3. **Remote attempt**: at most one call, bounded by the request's timeout budget (or the
//!    configured per-call timeout) and skipped while the circuit breaker is open.
//! 4. **Fallback**: the template generator, which cannot fail.
//!
//! Fresh artifacts are written back to the cache with a long TTL for remote output and a
//! shorter one for fallback output, so fallback results are retried sooner.
//!
//! [`WorkflowGenerator::generate_variations`] runs indices `0..count` for one subtask and
//! drops artifacts whose id repeats.

mod builder;
mod core;
mod variations;

pub use builder::WorkflowGeneratorBuilder;
pub use core::WorkflowGenerator;
