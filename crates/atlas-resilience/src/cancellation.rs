use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A cooperative cancellation signal shared across scheduler workers,
/// extractors, and the resilience harness. Checked at every suspension
/// point (HTTP requests, disk I/O, rate-limit waits, breaker half-open
/// waits) per spec §5.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

/// Marker error surfaced when cooperative cancellation is observed.
/// Never retried (spec §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl std::fmt::Display for Cancelled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "operation cancelled")
    }
}
impl std::error::Error for Cancelled {}

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }

    /// Sleep for `dur`, polling the token in small slices so cancellation is
    /// observed promptly instead of only after the full delay elapses.
    pub fn sleep_cancelable(&self, dur: Duration) -> Result<(), Cancelled> {
        const SLICE: Duration = Duration::from_millis(25);
        let mut remaining = dur;
        while remaining > Duration::ZERO {
            self.check()?;
            let step = remaining.min(SLICE);
            std::thread::sleep(step);
            remaining -= step;
        }
        self.check()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_observed() {
        let token = CancellationToken::new();
        assert!(token.check().is_ok());
        token.cancel();
        assert_eq!(token.check(), Err(Cancelled));
    }

    #[test]
    fn clone_shares_state() {
        let token = CancellationToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
