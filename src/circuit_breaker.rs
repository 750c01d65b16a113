//! # Circuit Breaker Module
//!
//! This module implements the circuit breaker pattern for calls to the
//! vision API. It stops sending photos when the API fails repeatedly and
//! lets a single request through again once the reset timeout has elapsed.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::config::RecoveryConfig;

#[derive(Debug, Default)]
struct BreakerState {
    failure_count: u32,
    last_failure_time: Option<Instant>,
}

/// Circuit breaker for meal analysis requests
///
/// # State Machine
///
/// - **Closed**: Normal operation, requests pass through
/// - **Open**: Failure threshold exceeded, requests fail fast
/// - **Half-Open**: Reset timeout elapsed, the next request is a probe
///
/// # Configuration
///
/// Uses `RecoveryConfig` for:
/// - `circuit_breaker_threshold`: Failures before opening (default: 5)
/// - `circuit_breaker_reset_secs`: Time before attempting reset (default: 60s)
#[derive(Debug)]
pub struct CircuitBreaker {
    state: Mutex<BreakerState>,
    config: RecoveryConfig,
}

impl CircuitBreaker {
    /// Create a new circuit breaker with the given configuration
    ///
    /// # Examples
    ///
    /// ```rust
    /// use food_coach::config::RecoveryConfig;
    /// use food_coach::circuit_breaker::CircuitBreaker;
    ///
    /// let circuit_breaker = CircuitBreaker::new(RecoveryConfig::default());
    /// assert!(!circuit_breaker.is_open());
    /// ```
    pub fn new(config: RecoveryConfig) -> Self {
        Self {
            state: Mutex::new(BreakerState::default()),
            config,
        }
    }

    /// Check if circuit breaker is open (blocking requests)
    ///
    /// Resets to closed once the reset timeout has elapsed since the last
    /// failure.
    pub fn is_open(&self) -> bool {
        let mut state = self.lock();

        if state.failure_count < self.config.circuit_breaker_threshold {
            return false;
        }

        match state.last_failure_time {
            Some(last_time)
                if last_time.elapsed() < Duration::from_secs(self.config.circuit_breaker_reset_secs) =>
            {
                true
            }
            _ => {
                *state = BreakerState::default();
                false
            }
        }
    }

    /// Record a failed request
    pub fn record_failure(&self) {
        let mut state = self.lock();
        state.failure_count += 1;
        state.last_failure_time = Some(Instant::now());
    }

    /// Record a successful request, closing the circuit
    pub fn record_success(&self) {
        *self.lock() = BreakerState::default();
    }

    pub fn failure_count(&self) -> u32 {
        self.lock().failure_count
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BreakerState> {
        // A poisoned lock still holds a consistent counter
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
