use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::{error::GenerativeError, services::providers::GenerativeProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BreakerState {
    Closed { failures: u32 },
    Open { until: Instant },
    /// One trial call is in flight
    HalfOpen,
}

/// Stops calling a failing generative provider for a cooldown period
///
/// After `failure_threshold` consecutive failures the circuit opens and calls
/// fail immediately with [`GenerativeError::CircuitOpen`]. Once the cooldown
/// has elapsed a single trial call goes through; success closes the circuit,
/// failure re-opens it.
pub struct CircuitBreaker {
    inner: Arc<dyn GenerativeProvider>,
    failure_threshold: u32,
    cooldown: Duration,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(inner: Arc<dyn GenerativeProvider>, failure_threshold: u32, cooldown: Duration) -> Self {
        Self {
            inner,
            failure_threshold: failure_threshold.max(1),
            cooldown,
            state: Mutex::new(BreakerState::Closed { failures: 0 }),
        }
    }

    /// Lets a call through or rejects it while open
    fn acquire(&self) -> Result<CallPermit<'_>, GenerativeError> {
        let mut state = self.state.lock();
        match *state {
            BreakerState::Closed { .. } => Ok(CallPermit::new(self)),
            BreakerState::Open { until } if Instant::now() >= until => {
                tracing::info!(provider = self.inner.name(), "Circuit half-open, allowing trial call");
                *state = BreakerState::HalfOpen;
                Ok(CallPermit::new(self))
            }
            BreakerState::Open { .. } | BreakerState::HalfOpen => Err(GenerativeError::CircuitOpen),
        }
    }

    /// A call ended without an outcome, e.g. its future was dropped
    fn abandon(&self) {
        let mut state = self.state.lock();
        if *state == BreakerState::HalfOpen {
            tracing::info!(provider = self.inner.name(), "Trial call abandoned, circuit re-opened");
            *state = BreakerState::Open {
                until: Instant::now() + self.cooldown,
            };
        }
    }

    fn record(&self, outcome: &Result<String, GenerativeError>) {
        let mut state = self.state.lock();
        match outcome {
            Ok(_) => {
                if *state != (BreakerState::Closed { failures: 0 }) {
                    tracing::info!(provider = self.inner.name(), "Circuit closed");
                }
                *state = BreakerState::Closed { failures: 0 };
            }
            // A missing credential says nothing about the service's health
            Err(GenerativeError::Unavailable) => {
                if *state == BreakerState::HalfOpen {
                    *state = BreakerState::Open { until: Instant::now() };
                }
            }
            Err(e) => {
                let failures = match *state {
                    BreakerState::Closed { failures } => failures + 1,
                    _ => self.failure_threshold,
                };
                if failures >= self.failure_threshold {
                    tracing::warn!(
                        provider = self.inner.name(),
                        error = %e,
                        failures = failures,
                        cooldown_secs = self.cooldown.as_secs(),
                        "Circuit opened"
                    );
                    *state = BreakerState::Open {
                        until: Instant::now() + self.cooldown,
                    };
                } else {
                    *state = BreakerState::Closed { failures };
                }
            }
        }
    }

    /// True while calls are being short-circuited
    pub fn is_open(&self) -> bool {
        matches!(*self.state.lock(), BreakerState::Open { until } if Instant::now() < until)
    }
}

/// Admission to one provider call; dropping it unrecorded releases a
/// half-open trial slot
struct CallPermit<'a> {
    breaker: &'a CircuitBreaker,
    recorded: bool,
}

impl<'a> CallPermit<'a> {
    fn new(breaker: &'a CircuitBreaker) -> Self {
        Self {
            breaker,
            recorded: false,
        }
    }

    fn record(mut self, outcome: &Result<String, GenerativeError>) {
        self.recorded = true;
        self.breaker.record(outcome);
    }
}

impl Drop for CallPermit<'_> {
    fn drop(&mut self) {
        if !self.recorded {
            self.breaker.abandon();
        }
    }
}

#[async_trait::async_trait]
impl GenerativeProvider for CircuitBreaker {
    async fn complete(&self, prompt: &str, timeout: Duration) -> Result<String, GenerativeError> {
        let permit = self.acquire()?;
        let outcome = self.inner.complete(prompt, timeout).await;
        permit.record(&outcome);
        outcome
    }

    fn is_configured(&self) -> bool {
        self.inner.is_configured()
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
