use crate::breaker::CircuitBreaker;
use crate::retry::FailureKind;

/// The two ways a guarded call can fail: the breaker rejected it outright,
/// or the wrapped operation itself failed.
#[derive(Debug)]
pub enum GuardedError<E> {
    CircuitOpen,
    Upstream(E),
}

impl<E: std::fmt::Display> std::fmt::Display for GuardedError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CircuitOpen => write!(f, "circuit open"),
            Self::Upstream(e) => write!(f, "{e}"),
        }
    }
}
impl<E: std::fmt::Debug + std::fmt::Display> std::error::Error for GuardedError<E> {}

/// `CircuitOpen` is never transient (spec §4.1/§7: "do not retry on...
/// CircuitOpen"); everything else defers to the wrapped error's own
/// classification.
impl<E: FailureKind> FailureKind for GuardedError<E> {
    fn is_transient(&self) -> bool {
        match self {
            GuardedError::CircuitOpen => false,
            GuardedError::Upstream(e) => e.is_transient(),
        }
    }
}

/// Run `op` through the breaker: admit, execute, record the outcome.
/// Compose with [`crate::with_retry`] to get "every outbound call is
/// wrapped" (spec §4.1) — each retry attempt re-checks breaker admission.
pub fn guarded_call<T, E>(breaker: &CircuitBreaker, op: impl FnOnce() -> Result<T, E>) -> Result<T, GuardedError<E>> {
    let guard = breaker.admit().map_err(|_| GuardedError::CircuitOpen)?;
    match op() {
        Ok(v) => {
            guard.succeed();
            Ok(v)
        }
        Err(e) => {
            guard.fail();
            Err(GuardedError::Upstream(e))
        }
    }
}
