//! Per-provider circuit breaker
//!
//! ```text
//! Closed   → Open:     consecutive_failures reaches failure_threshold
//! Open     → HalfOpen: reset_timeout elapsed since opened_at (checked on allow)
//! HalfOpen → Closed:   consecutive_successes reaches success_threshold
//! HalfOpen → Open:     any failure
//! ```
//!
//! The breaker only answers "may I call?" and absorbs outcomes. It never
//! calls the provider itself; the orchestrator drives it.

use std::time::Duration;

use chrono::{DateTime, Utc};
use flora_domain::error::{Error, Result};
use flora_domain::events::DomainEvent;
use flora_domain::ports::SharedEventBus;
use flora_domain::value_objects::CircuitStatus;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::constants::{
    CIRCUIT_SUCCESS_THRESHOLD, PRIMARY_FAILURE_THRESHOLD, PRIMARY_RESET_TIMEOUT,
    SECONDARY_FAILURE_THRESHOLD, SECONDARY_RESET_TIMEOUT,
};

/// Circuit breaker configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open a closed circuit
    pub failure_threshold: u32,
    /// Time an open circuit waits before admitting trial calls
    pub reset_timeout: Duration,
    /// Consecutive half-open successes that close the circuit
    pub success_threshold: u32,
    /// Trial calls allowed in flight while half-open
    pub half_open_max_calls: u32,
}

impl CircuitBreakerConfig {
    pub fn new(failure_threshold: u32, reset_timeout: Duration, success_threshold: u32) -> Self {
        Self {
            failure_threshold: failure_threshold.max(1),
            reset_timeout,
            success_threshold: success_threshold.max(1),
            half_open_max_calls: success_threshold.max(1),
        }
    }

    pub fn with_half_open_max_calls(mut self, calls: u32) -> Self {
        self.half_open_max_calls = calls.max(1);
        self
    }

    /// Defaults for the primary provider
    pub fn primary() -> Self {
        Self::new(
            PRIMARY_FAILURE_THRESHOLD,
            PRIMARY_RESET_TIMEOUT,
            CIRCUIT_SUCCESS_THRESHOLD,
        )
    }

    /// Defaults for the secondary provider
    pub fn secondary() -> Self {
        Self::new(
            SECONDARY_FAILURE_THRESHOLD,
            SECONDARY_RESET_TIMEOUT,
            CIRCUIT_SUCCESS_THRESHOLD,
        )
    }
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self::primary()
    }
}

/// Health view of one breaker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CircuitSnapshot {
    pub provider: String,
    pub status: CircuitStatus,
    pub consecutive_failures: u32,
    pub consecutive_successes: u32,
    pub opened_at: Option<DateTime<Utc>>,
    pub total_successes: u64,
    pub total_failures: u64,
    pub rejected_calls: u64,
    pub times_opened: u64,
}

#[derive(Debug, Default)]
struct BreakerState {
    status: CircuitStatus,
    consecutive_failures: u32,
    consecutive_successes: u32,
    opened_at: Option<Instant>,
    opened_at_wall: Option<DateTime<Utc>>,
    half_open_in_flight: u32,
    total_successes: u64,
    total_failures: u64,
    rejected_calls: u64,
    times_opened: u64,
}

impl BreakerState {
    fn open(&mut self) {
        self.status = CircuitStatus::Open;
        self.opened_at = Some(Instant::now());
        self.opened_at_wall = Some(Utc::now());
        self.consecutive_successes = 0;
        self.half_open_in_flight = 0;
        self.times_opened += 1;
    }

    fn close(&mut self) {
        self.status = CircuitStatus::Closed;
        self.consecutive_failures = 0;
        self.consecutive_successes = 0;
        self.opened_at = None;
        self.opened_at_wall = None;
        self.half_open_in_flight = 0;
    }

    fn half_open(&mut self) {
        self.status = CircuitStatus::HalfOpen;
        self.consecutive_successes = 0;
        self.half_open_in_flight = 0;
    }

    fn release_trial(&mut self) {
        if self.status == CircuitStatus::HalfOpen {
            self.half_open_in_flight = self.half_open_in_flight.saturating_sub(1);
        }
    }
}

type Transition = (CircuitStatus, CircuitStatus);

/// Circuit breaker guarding one provider
pub struct CircuitBreaker {
    provider: String,
    config: CircuitBreakerConfig,
    state: Mutex<BreakerState>,
    events: Option<SharedEventBus>,
}

impl CircuitBreaker {
    pub fn new(provider: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            provider: provider.into(),
            config,
            state: Mutex::new(BreakerState::default()),
            events: None,
        }
    }

    /// Publish transitions on `events`
    pub fn with_events(mut self, events: SharedEventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Ask permission to call the provider
    ///
    /// Rejects with [`Error::CircuitOpen`] while open, and while half-open
    /// once every trial slot is taken. An admitted half-open call holds a
    /// trial slot until its outcome is recorded or [`release`](Self::release)d.
    pub fn allow(&self) -> Result<()> {
        let mut transition = None;
        let verdict = {
            let mut state = self.state.lock();

            if state.status == CircuitStatus::Open {
                let elapsed = state.opened_at.map_or(Duration::MAX, |at| at.elapsed());
                if elapsed >= self.config.reset_timeout {
                    state.half_open();
                    transition = Some((CircuitStatus::Open, CircuitStatus::HalfOpen));
                }
            }

            match state.status {
                CircuitStatus::Closed => Ok(()),
                CircuitStatus::Open => {
                    state.rejected_calls += 1;
                    let elapsed = state.opened_at.map_or(Duration::ZERO, |at| at.elapsed());
                    Err(Error::circuit_open(
                        &self.provider,
                        self.config.reset_timeout.saturating_sub(elapsed),
                    ))
                }
                CircuitStatus::HalfOpen => {
                    if state.half_open_in_flight < self.config.half_open_max_calls {
                        state.half_open_in_flight += 1;
                        Ok(())
                    } else {
                        state.rejected_calls += 1;
                        Err(Error::circuit_open(&self.provider, Duration::ZERO))
                    }
                }
            }
        };

        self.emit(transition);
        if verdict.is_err() {
            debug!(provider = %self.provider, "Circuit rejected call");
        }
        verdict
    }

    /// Record a successful call
    pub fn record_success(&self) {
        let transition = {
            let mut state = self.state.lock();
            state.total_successes += 1;
            match state.status {
                CircuitStatus::Closed => {
                    state.consecutive_failures = 0;
                    None
                }
                CircuitStatus::HalfOpen => {
                    state.release_trial();
                    state.consecutive_successes += 1;
                    if state.consecutive_successes >= self.config.success_threshold {
                        state.close();
                        Some((CircuitStatus::HalfOpen, CircuitStatus::Closed))
                    } else {
                        None
                    }
                }
                // late outcome of a call admitted before the circuit opened
                CircuitStatus::Open => None,
            }
        };
        self.emit(transition);
    }

    /// Record a call that failed in a way that says the provider is unhealthy
    pub fn record_failure(&self) {
        let transition = {
            let mut state = self.state.lock();
            state.total_failures += 1;
            match state.status {
                CircuitStatus::Closed => {
                    state.consecutive_failures += 1;
                    if state.consecutive_failures >= self.config.failure_threshold {
                        state.open();
                        Some((CircuitStatus::Closed, CircuitStatus::Open))
                    } else {
                        None
                    }
                }
                CircuitStatus::HalfOpen => {
                    state.consecutive_failures += 1;
                    state.open();
                    Some((CircuitStatus::HalfOpen, CircuitStatus::Open))
                }
                CircuitStatus::Open => None,
            }
        };
        self.emit(transition);
    }

    /// Give back an admitted call without recording an outcome
    pub fn release(&self) {
        self.state.lock().release_trial();
    }

    pub fn status(&self) -> CircuitStatus {
        self.state.lock().status
    }

    pub fn snapshot(&self) -> CircuitSnapshot {
        let state = self.state.lock();
        CircuitSnapshot {
            provider: self.provider.clone(),
            status: state.status,
            consecutive_failures: state.consecutive_failures,
            consecutive_successes: state.consecutive_successes,
            opened_at: state.opened_at_wall,
            total_successes: state.total_successes,
            total_failures: state.total_failures,
            rejected_calls: state.rejected_calls,
            times_opened: state.times_opened,
        }
    }

    fn emit(&self, transition: Option<Transition>) {
        let Some((from, to)) = transition else {
            return;
        };

        if to == CircuitStatus::Open {
            warn!(provider = %self.provider, %from, %to, "Circuit breaker opened");
        } else {
            info!(provider = %self.provider, %from, %to, "Circuit breaker state changed");
        }

        if let Some(events) = &self.events {
            let event = DomainEvent::CircuitStateChanged {
                provider: self.provider.clone(),
                from,
                to,
            };
            if let Err(e) = events.publish_event(event) {
                debug!(provider = %self.provider, error = %e, "Failed to publish circuit event");
            }
        }
    }
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("provider", &self.provider)
            .field("status", &self.status())
            .field("config", &self.config)
            .finish()
    }
}
