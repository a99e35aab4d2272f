use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::listener::{ListenerRegistry, ResilienceEvent};

/// Per-endpoint circuit-breaker configuration (spec §4.1 / §6).
#[derive(Debug, Clone, Copy)]
pub struct BreakerConfig {
    pub failure_threshold: u32,
    pub success_threshold: u32,
    pub open_duration: Duration,
    pub half_open_max_calls: u32,
    pub monitoring_window: Duration,
    pub volume_threshold: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            open_duration: Duration::from_secs(30),
            half_open_max_calls: 1,
            monitoring_window: Duration::from_secs(60),
            volume_threshold: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Success,
    Failure,
}

struct Inner {
    state: BreakerState,
    consecutive_failures: u32,
    consecutive_successes: u32,
    last_failure_time: Option<Instant>,
    opened_at: Option<Instant>,
    window: VecDeque<(Instant, Outcome)>,
    half_open_inflight: u32,
}

/// Rejection returned when a call is not admitted — the circuit is open, or
/// half-open and already saturated with trial calls (spec §4.1, §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitOpen;

impl std::fmt::Display for CircuitOpen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "circuit open")
    }
}
impl std::error::Error for CircuitOpen {}

/// Three-state breaker machine guarding a single source endpoint (spec §4.1).
pub struct CircuitBreaker {
    endpoint: String,
    config: BreakerConfig,
    inner: Mutex<Inner>,
    listeners: Arc<ListenerRegistry>,
}

impl CircuitBreaker {
    pub fn new(endpoint: impl Into<String>, config: BreakerConfig, listeners: Arc<ListenerRegistry>) -> Self {
        Self {
            endpoint: endpoint.into(),
            config,
            inner: Mutex::new(Inner {
                state: BreakerState::Closed,
                consecutive_failures: 0,
                consecutive_successes: 0,
                last_failure_time: None,
                opened_at: None,
                window: VecDeque::new(),
                half_open_inflight: 0,
            }),
            listeners,
        }
    }

    pub fn state(&self) -> BreakerState {
        self.inner.lock().state
    }

    /// Admit (or reject) a trial call, transitioning Open -> HalfOpen once
    /// `open_duration` has elapsed. Returns a guard that must be completed
    /// via [`CallGuard::succeed`]/[`CallGuard::fail`].
    pub fn admit(&self) -> Result<CallGuard<'_>, CircuitOpen> {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        self.prune_window(&mut inner, now);

        match inner.state {
            BreakerState::Closed => {}
            BreakerState::Open => {
                let elapsed = inner.opened_at.map(|t| now.duration_since(t)).unwrap_or(Duration::ZERO);
                if elapsed >= self.config.open_duration {
                    inner.state = BreakerState::HalfOpen;
                    inner.consecutive_successes = 0;
                    inner.half_open_inflight = 0;
                    self.listeners.emit(ResilienceEvent::CircuitHalfOpen { endpoint: self.endpoint.clone() });
                } else {
                    self.listeners.emit(ResilienceEvent::CallRejected { endpoint: self.endpoint.clone() });
                    return Err(CircuitOpen);
                }
            }
            BreakerState::HalfOpen => {
                if inner.half_open_inflight >= self.config.half_open_max_calls {
                    self.listeners.emit(ResilienceEvent::CallRejected { endpoint: self.endpoint.clone() });
                    return Err(CircuitOpen);
                }
            }
        }

        if inner.state == BreakerState::HalfOpen {
            inner.half_open_inflight += 1;
        }
        drop(inner);
        self.listeners.emit(ResilienceEvent::CallAdmitted { endpoint: self.endpoint.clone() });
        Ok(CallGuard { breaker: self, completed: false })
    }

    /// Run `f` through the breaker in one shot: admit, execute, record.
    pub fn call<T, E>(&self, f: impl FnOnce() -> Result<T, E>) -> Result<T, BreakerCallError<E>> {
        let guard = self.admit().map_err(BreakerCallError::Open)?;
        match f() {
            Ok(v) => {
                guard.succeed();
                Ok(v)
            }
            Err(e) => {
                guard.fail();
                Err(BreakerCallError::Upstream(e))
            }
        }
    }

    fn prune_window(&self, inner: &mut Inner, now: Instant) {
        let window = self.config.monitoring_window;
        while let Some((t, _)) = inner.window.front() {
            if now.duration_since(*t) > window {
                inner.window.pop_front();
            } else {
                break;
            }
        }
    }

    fn record_success(&self, now: Instant) {
        let mut inner = self.inner.lock();
        inner.window.push_back((now, Outcome::Success));
        match inner.state {
            BreakerState::HalfOpen => {
                inner.consecutive_successes += 1;
                if inner.half_open_inflight > 0 {
                    inner.half_open_inflight -= 1;
                }
                if inner.consecutive_successes >= self.config.success_threshold {
                    inner.state = BreakerState::Closed;
                    inner.consecutive_failures = 0;
                    inner.consecutive_successes = 0;
                    drop(inner);
                    self.listeners.emit(ResilienceEvent::CircuitClosed { endpoint: self.endpoint.clone() });
                    self.listeners.emit(ResilienceEvent::CallSucceeded { endpoint: self.endpoint.clone() });
                    return;
                }
            }
            BreakerState::Closed => {
                inner.consecutive_failures = 0;
            }
            BreakerState::Open => {}
        }
        drop(inner);
        self.listeners.emit(ResilienceEvent::CallSucceeded { endpoint: self.endpoint.clone() });
    }

    fn record_failure(&self, now: Instant) {
        let mut inner = self.inner.lock();
        inner.window.push_back((now, Outcome::Failure));
        inner.consecutive_failures += 1;
        inner.consecutive_successes = 0;
        inner.last_failure_time = Some(now);

        let should_open = match inner.state {
            BreakerState::HalfOpen => {
                if inner.half_open_inflight > 0 {
                    inner.half_open_inflight -= 1;
                }
                true
            }
            BreakerState::Closed => {
                let recorded = inner.window.len() as u32;
                recorded >= self.config.volume_threshold && inner.consecutive_failures >= self.config.failure_threshold
            }
            BreakerState::Open => false,
        };

        if should_open && inner.state != BreakerState::Open {
            inner.state = BreakerState::Open;
            inner.opened_at = Some(now);
            drop(inner);
            self.listeners.emit(ResilienceEvent::CircuitOpened { endpoint: self.endpoint.clone() });
            self.listeners.emit(ResilienceEvent::CallFailed { endpoint: self.endpoint.clone(), transient: true });
            return;
        }
        drop(inner);
        self.listeners.emit(ResilienceEvent::CallFailed { endpoint: self.endpoint.clone(), transient: true });
    }
}

/// Outcome handle for a call admitted by [`CircuitBreaker::admit`]. Must be
/// resolved via `succeed`/`fail` so the breaker's counters stay accurate.
pub struct CallGuard<'a> {
    breaker: &'a CircuitBreaker,
    completed: bool,
}

impl<'a> CallGuard<'a> {
    pub fn succeed(mut self) {
        self.completed = true;
        self.breaker.record_success(Instant::now());
    }

    pub fn fail(mut self) {
        self.completed = true;
        self.breaker.record_failure(Instant::now());
    }
}

impl<'a> Drop for CallGuard<'a> {
    fn drop(&mut self) {
        // A guard dropped without succeed()/fail() (panic unwind, early
        // return) is treated as a failure so the breaker never under-counts.
        if !self.completed {
            self.breaker.record_failure(Instant::now());
        }
    }
}

#[derive(Debug)]
pub enum BreakerCallError<E> {
    Open(CircuitOpen),
    Upstream(E),
}

impl<E: std::fmt::Display> std::fmt::Display for BreakerCallError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open(e) => write!(f, "{e}"),
            Self::Upstream(e) => write!(f, "{e}"),
        }
    }
}

impl<E: std::fmt::Debug + std::fmt::Display> std::error::Error for BreakerCallError<E> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker(config: BreakerConfig) -> CircuitBreaker {
        CircuitBreaker::new("test-endpoint", config, Arc::new(ListenerRegistry::new()))
    }

    #[test]
    fn opens_after_threshold_failures() {
        let b = breaker(BreakerConfig {
            failure_threshold: 3,
            volume_threshold: 1,
            success_threshold: 2,
            open_duration: Duration::from_millis(50),
            half_open_max_calls: 1,
            monitoring_window: Duration::from_secs(60),
        });

        for _ in 0..3 {
            let _: Result<(), BreakerCallError<&str>> = b.call(|| Err("boom"));
        }
        assert_eq!(b.state(), BreakerState::Open);

        // Rejected immediately while open.
        let rejected: Result<(), BreakerCallError<&str>> = b.call(|| Ok(()));
        assert!(matches!(rejected, Err(BreakerCallError::Open(_))));
    }

    #[test]
    fn half_open_then_closed_on_successes() {
        let b = breaker(BreakerConfig {
            failure_threshold: 3,
            volume_threshold: 1,
            success_threshold: 2,
            open_duration: Duration::from_millis(30),
            half_open_max_calls: 1,
            monitoring_window: Duration::from_secs(60),
        });
        for _ in 0..3 {
            let _: Result<(), BreakerCallError<&str>> = b.call(|| Err("boom"));
        }
        assert_eq!(b.state(), BreakerState::Open);

        std::thread::sleep(Duration::from_millis(40));

        let _: Result<(), BreakerCallError<&str>> = b.call(|| Ok(()));
        assert_eq!(b.state(), BreakerState::HalfOpen);
        let _: Result<(), BreakerCallError<&str>> = b.call(|| Ok(()));
        assert_eq!(b.state(), BreakerState::Closed);
    }

    #[test]
    fn half_open_trial_failure_reopens() {
        let b = breaker(BreakerConfig {
            failure_threshold: 1,
            volume_threshold: 1,
            success_threshold: 2,
            open_duration: Duration::from_millis(20),
            half_open_max_calls: 1,
            monitoring_window: Duration::from_secs(60),
        });
        let _: Result<(), BreakerCallError<&str>> = b.call(|| Err("boom"));
        assert_eq!(b.state(), BreakerState::Open);
        std::thread::sleep(Duration::from_millis(30));
        let _: Result<(), BreakerCallError<&str>> = b.call(|| Err("boom again"));
        assert_eq!(b.state(), BreakerState::Open);
    }

    #[test]
    fn half_open_rejects_beyond_max_calls() {
        let b = breaker(BreakerConfig {
            failure_threshold: 1,
            volume_threshold: 1,
            success_threshold: 5,
            open_duration: Duration::from_millis(10),
            half_open_max_calls: 1,
            monitoring_window: Duration::from_secs(60),
        });
        let _: Result<(), BreakerCallError<&str>> = b.call(|| Err("boom"));
        std::thread::sleep(Duration::from_millis(15));

        // First trial call admitted and left in-flight (not yet resolved).
        let guard = b.admit().expect("first half-open trial admitted");
        assert_eq!(b.state(), BreakerState::HalfOpen);

        // Second concurrent trial is rejected.
        assert!(b.admit().is_err());

        guard.succeed();
    }
}
