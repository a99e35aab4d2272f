use std::time::Duration;

use crate::cancellation::{Cancelled, CancellationToken};
use crate::listener::{ListenerRegistry, ResilienceEvent};

/// Retry policy independent of the circuit breaker (spec §4.1).
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff_multiplier: f64,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(200),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// `delay(n) = initial_delay * backoff_multiplier^(n-1)`, capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self.backoff_multiplier.powi((attempt.saturating_sub(1)) as i32);
        let millis = (self.initial_delay.as_secs_f64() * factor * 1000.0).min(self.max_delay.as_millis() as f64);
        Duration::from_millis(millis.max(0.0) as u64)
    }
}

/// Classifies a failure as retryable ("transient" per spec §4.1/§7) or not.
pub trait FailureKind {
    fn is_transient(&self) -> bool;
}

#[derive(Debug)]
pub enum RetryOutcome<E> {
    /// Retries exhausted; carries the last observed failure.
    Exhausted(E),
    /// A non-transient failure short-circuited retrying.
    NonTransient(E),
    Cancelled,
}

impl<E: std::fmt::Display> std::fmt::Display for RetryOutcome<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exhausted(e) => write!(f, "retries exhausted: {e}"),
            Self::NonTransient(e) => write!(f, "non-retryable failure: {e}"),
            Self::Cancelled => write!(f, "operation cancelled"),
        }
    }
}
impl<E: std::fmt::Debug + std::fmt::Display> std::error::Error for RetryOutcome<E> {}

/// Run `op` under the retry policy, sleeping (cancellably) between attempts
/// and retrying only transient failures (spec §4.1: "Retry only on transient
/// failure kinds... Do not retry on HTTP 4xx (except 429), validation
/// rejection, or CircuitOpen.").
pub fn with_retry<T, E: FailureKind>(
    policy: &RetryPolicy,
    token: &CancellationToken,
    listeners: &ListenerRegistry,
    endpoint: &str,
    mut op: impl FnMut(u32) -> Result<T, E>,
) -> Result<T, RetryOutcome<E>> {
    let mut attempt = 1;
    loop {
        if token.check().is_err() {
            return Err(RetryOutcome::Cancelled);
        }
        match op(attempt) {
            Ok(v) => return Ok(v),
            Err(e) => {
                if !e.is_transient() {
                    return Err(RetryOutcome::NonTransient(e));
                }
                if attempt >= policy.max_attempts {
                    return Err(RetryOutcome::Exhausted(e));
                }
                let delay = policy.delay_for_attempt(attempt);
                listeners.emit(ResilienceEvent::RetryScheduled {
                    endpoint: endpoint.to_string(),
                    attempt,
                    delay,
                });
                match token.sleep_cancelable(delay) {
                    Ok(()) => {}
                    Err(Cancelled) => return Err(RetryOutcome::Cancelled),
                }
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Flaky {
        transient: bool,
    }
    impl FailureKind for Flaky {
        fn is_transient(&self) -> bool {
            self.transient
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 4,
            initial_delay: Duration::from_millis(1),
            backoff_multiplier: 1.0,
            max_delay: Duration::from_millis(5),
        }
    }

    #[test]
    fn succeeds_after_transient_failures() {
        let token = CancellationToken::new();
        let listeners = ListenerRegistry::new();
        let mut calls = 0;
        let result = with_retry(&fast_policy(), &token, &listeners, "ep", |_attempt| {
            calls += 1;
            if calls < 3 {
                Err(Flaky { transient: true })
            } else {
                Ok(42)
            }
        });
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls, 3);
    }

    #[test]
    fn non_transient_never_retries() {
        let token = CancellationToken::new();
        let listeners = ListenerRegistry::new();
        let mut calls = 0;
        let result: Result<(), _> = with_retry(&fast_policy(), &token, &listeners, "ep", |_| {
            calls += 1;
            Err(Flaky { transient: false })
        });
        assert!(matches!(result, Err(RetryOutcome::NonTransient(_))));
        assert_eq!(calls, 1);
    }

    #[test]
    fn exhausts_after_max_attempts() {
        let token = CancellationToken::new();
        let listeners = ListenerRegistry::new();
        let mut calls = 0;
        let result: Result<(), _> = with_retry(&fast_policy(), &token, &listeners, "ep", |_| {
            calls += 1;
            Err(Flaky { transient: true })
        });
        assert!(matches!(result, Err(RetryOutcome::Exhausted(_))));
        assert_eq!(calls, 4);
    }

    #[test]
    fn cancellation_short_circuits() {
        let token = CancellationToken::new();
        let listeners = ListenerRegistry::new();
        token.cancel();
        let result: Result<(), _> = with_retry(&fast_policy(), &token, &listeners, "ep", |_| {
            Err(Flaky { transient: true })
        });
        assert!(matches!(result, Err(RetryOutcome::Cancelled)));
    }

    #[test]
    fn backoff_grows_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 5,
            initial_delay: Duration::from_millis(100),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_millis(350),
        };
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(350)); // capped from 400
    }
}
