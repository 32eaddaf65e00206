//! 弹性模块：为远程生成服务提供熔断保护。
//!
//! # Resilience Module
//!
//! A remote service that keeps timing out costs every caller a full deadline before the
//! template fallback kicks in. The circuit breaker notices consecutive remote failures and,
//! for a cooldown period, lets requests go straight to the fallback path.
//!
//! - **Closed**: remote attempts are made
//! - **Open**: failures reached the threshold; remote attempts are skipped
//! - **Half-open**: the cooldown elapsed; one trial attempt is allowed. Success closes the
//!   breaker, failure reopens it for another cooldown
//!
//! ```rust
//! use flowsmith::resilience::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
//! use std::time::Duration;
//!
//! let breaker = CircuitBreaker::new(
//!     CircuitBreakerConfig::new()
//!         .with_failure_threshold(3)
//!         .with_cooldown(Duration::from_secs(30)),
//! );
//! if breaker.allow() {
//!     // call the remote service, then record the outcome
//!     breaker.on_success();
//! }
//! ```

pub mod circuit_breaker;
