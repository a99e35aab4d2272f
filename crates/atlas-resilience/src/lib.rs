//! Resilience harness: the circuit-breaker state machine and exponential
//! backoff retry policy that wraps every outbound call to a source (spec
//! §4.1). Also hosts the cooperative [`CancellationToken`] used throughout
//! the scheduler and extractors (spec §5).

mod breaker;
mod cancellation;
mod combinator;
mod listener;
mod retry;

pub use breaker::{BreakerCallError, BreakerConfig, BreakerState, CallGuard, CircuitBreaker, CircuitOpen};
pub use cancellation::{Cancelled, CancellationToken};
pub use combinator::{guarded_call, GuardedError};
pub use listener::{ListenerRegistry, ResilienceEvent, ResilienceListener};
pub use retry::{with_retry, FailureKind, RetryOutcome, RetryPolicy};
