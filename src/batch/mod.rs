//! 批量生成模块：按固定大小分块并发执行，块与块之间按配置延迟节流。
//!
//! # Batch Generation Module
//!
//! Drives many subtasks through a [`WorkflowGenerator`](crate::generator::WorkflowGenerator)
//! while keeping pressure on the remote service bounded.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`BatchExecutor`] | Runs chunks concurrently and aggregates a [`BatchResult`](crate::types::BatchResult) |
//! | [`BatchOptions`] | Chunk size, inter-chunk delay, variations per subtask |
//!
//! ## Example
//!
//! ```rust,no_run
//! use flowsmith::batch::{BatchExecutor, BatchOptions};
//! use flowsmith::{Subtask, WorkflowGenerator};
//! use std::time::Duration;
//!
//! # async fn run() -> flowsmith::Result<()> {
//! let generator = WorkflowGenerator::builder().fallback_only(true).build()?;
//! let subtasks = vec![
//!     Subtask::new("t1", "Onboard new hires"),
//!     Subtask::new("t2", "Send weekly newsletter"),
//! ];
//! let options = BatchOptions::new()
//!     .with_batch_size(5)
//!     .with_inter_batch_delay(Duration::from_secs(1));
//! let result = BatchExecutor::with_options(options)
//!     .execute(&generator, &subtasks)
//!     .await;
//! println!("{} ok, {} failed", result.metadata.success_count, result.metadata.error_count);
//! # Ok(())
//! # }
//! ```
//!
//! ## Pacing
//!
//! `N` subtasks with batch size `B` form `ceil(N / B)` chunks, so a run sleeps
//! `(ceil(N / B) - 1) * inter_batch_delay` in total on top of the generation time.

mod executor;

pub use executor::{BatchExecutor, BatchOptions};
