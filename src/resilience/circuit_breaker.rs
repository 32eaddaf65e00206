use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitBreakerSnapshot {
    pub failure_threshold: u32,
    pub cooldown_ms: u64,
    pub consecutive_failures: u32,
    /// Remaining open time in ms, if currently open.
    pub open_remaining_ms: Option<u64>,
    /// A single trial call is in flight after the cooldown.
    pub half_open: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    pub enabled: bool,
    pub failure_threshold: u32,
    pub cooldown_ms: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            failure_threshold: 5,
            cooldown_ms: 30_000,
        }
    }
}

impl CircuitBreakerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold.max(1);
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown_ms = cooldown.as_millis() as u64;
        self
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

#[derive(Debug)]
struct State {
    consecutive_failures: u32,
    open_until: Option<Instant>,
    half_open: bool,
}

/// Guards the remote generation service.
///
/// - Counts consecutive remote failures (timeouts, transport errors, invalid payloads)
/// - Opens for a cooldown once the threshold is reached; while open, callers skip the
///   remote call and go straight to the template fallback
/// - After the cooldown exactly one trial call is let through (half-open); every other
///   caller keeps skipping the remote until the trial reports back
/// - A successful trial closes the breaker and resets the count; a failed trial reopens
///   it for another cooldown. A trial that never reports is replaced after one cooldown
pub struct CircuitBreaker {
    cfg: CircuitBreakerConfig,
    state: Mutex<State>,
}

impl CircuitBreaker {
    pub fn new(cfg: CircuitBreakerConfig) -> Self {
        Self {
            cfg,
            state: Mutex::new(State {
                consecutive_failures: 0,
                open_until: None,
                half_open: false,
            }),
        }
    }

    /// Whether a remote attempt may be made now. Always true when disabled.
    pub fn allow(&self) -> bool {
        if !self.cfg.enabled {
            return true;
        }
        let Ok(mut st) = self.state.lock() else {
            return true;
        };
        let Some(until) = st.open_until else {
            return true;
        };
        let now = Instant::now();
        if now < until {
            return false;
        }
        // cooldown expired: hand out the single trial and hold everyone else back
        st.open_until = Some(now + self.cfg.cooldown());
        st.half_open = true;
        true
    }

    pub fn on_success(&self) {
        if let Ok(mut st) = self.state.lock() {
            st.consecutive_failures = 0;
            st.open_until = None;
            st.half_open = false;
        }
    }

    /// Record a failure; returns true when this failure opened the breaker.
    pub fn on_failure(&self) -> bool {
        if !self.cfg.enabled {
            return false;
        }
        if let Ok(mut st) = self.state.lock() {
            st.consecutive_failures = st.consecutive_failures.saturating_add(1);
            if st.half_open {
                st.half_open = false;
                st.open_until = Some(Instant::now() + self.cfg.cooldown());
                return true;
            }
            if st.open_until.is_none() && st.consecutive_failures >= self.cfg.failure_threshold {
                st.open_until = Some(Instant::now() + self.cfg.cooldown());
                return true;
            }
        }
        false
    }

    pub fn snapshot(&self) -> CircuitBreakerSnapshot {
        let now = Instant::now();
        let (consecutive_failures, open_remaining_ms, half_open) = match self.state.lock() {
            Ok(st) => (
                st.consecutive_failures,
                st.open_until
                    .filter(|until| *until > now)
                    .map(|until| (until - now).as_millis() as u64),
                st.half_open,
            ),
            Err(_) => (0, None, false),
        };
        CircuitBreakerSnapshot {
            failure_threshold: self.cfg.failure_threshold,
            cooldown_ms: self.cfg.cooldown_ms,
            consecutive_failures,
            open_remaining_ms,
            half_open,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circuit_breaker_config_defaults() {
        let config = CircuitBreakerConfig::default();
        assert!(config.enabled);
        assert_eq!(config.failure_threshold, 5);
        assert_eq!(config.cooldown(), Duration::from_secs(30));
    }

    #[test]
    fn test_circuit_breaker_success_resets_failures() {
        let cb = CircuitBreaker::new(CircuitBreakerConfig::new().with_failure_threshold(5));
        cb.on_failure();
        cb.on_failure();
        assert_eq!(cb.snapshot().consecutive_failures, 2);
        cb.on_success();
        assert_eq!(cb.snapshot().consecutive_failures, 0);
    }

    #[test]
    fn test_circuit_breaker_opens_at_threshold() {
        let cb = CircuitBreaker::new(
            CircuitBreakerConfig::new()
                .with_failure_threshold(3)
                .with_cooldown(Duration::from_secs(10)),
        );
        assert!(!cb.on_failure());
        assert!(!cb.on_failure());
        assert!(cb.allow());
        assert!(cb.on_failure());
        assert!(!cb.allow());
        assert!(cb.snapshot().open_remaining_ms.is_some());
        assert!(!cb.snapshot().half_open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_circuit_breaker_closes_after_cooldown() {
        let cb = CircuitBreaker::new(
            CircuitBreakerConfig::new()
                .with_failure_threshold(2)
                .with_cooldown(Duration::from_millis(50)),
        );
        cb.on_failure();
        cb.on_failure();
        assert!(!cb.allow());

        tokio::time::advance(Duration::from_millis(60)).await;

        assert!(cb.allow());
        assert!(cb.snapshot().half_open);
        cb.on_success();
        assert_eq!(cb.snapshot().consecutive_failures, 0);
        assert!(cb.snapshot().open_remaining_ms.is_none());
        assert!(cb.allow());
        assert!(cb.allow());
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_one_trial_after_cooldown() {
        let cb = CircuitBreaker::new(
            CircuitBreakerConfig::new()
                .with_failure_threshold(2)
                .with_cooldown(Duration::from_millis(50)),
        );
        cb.on_failure();
        cb.on_failure();

        tokio::time::advance(Duration::from_millis(60)).await;

        assert!(cb.allow());
        for _ in 0..5 {
            assert!(!cb.allow());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_trial_reopens_immediately() {
        let cb = CircuitBreaker::new(
            CircuitBreakerConfig::new()
                .with_failure_threshold(3)
                .with_cooldown(Duration::from_millis(50)),
        );
        for _ in 0..3 {
            cb.on_failure();
        }
        tokio::time::advance(Duration::from_millis(60)).await;
        assert!(cb.allow());

        assert!(cb.on_failure());
        let snapshot = cb.snapshot();
        assert!(!snapshot.half_open);
        assert_eq!(snapshot.open_remaining_ms, Some(50));
        assert!(!cb.allow());

        tokio::time::advance(Duration::from_millis(60)).await;
        assert!(cb.allow());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreported_trial_is_replaced_after_cooldown() {
        let cb = CircuitBreaker::new(
            CircuitBreakerConfig::new()
                .with_failure_threshold(1)
                .with_cooldown(Duration::from_millis(50)),
        );
        cb.on_failure();
        tokio::time::advance(Duration::from_millis(60)).await;
        assert!(cb.allow());
        assert!(!cb.allow());

        tokio::time::advance(Duration::from_millis(60)).await;
        assert!(cb.allow());
    }

    #[test]
    fn test_disabled_breaker_never_opens() {
        let cb = CircuitBreaker::new(
            CircuitBreakerConfig::new()
                .with_enabled(false)
                .with_failure_threshold(1),
        );
        for _ in 0..10 {
            assert!(!cb.on_failure());
        }
        assert!(cb.allow());
    }

    #[test]
    fn test_circuit_breaker_saturating_failures() {
        let cb = CircuitBreaker::new(CircuitBreakerConfig::new().with_failure_threshold(u32::MAX));
        for _ in 0..1000 {
            cb.on_failure();
        }
        assert_eq!(cb.snapshot().consecutive_failures, 1000);
    }
}
