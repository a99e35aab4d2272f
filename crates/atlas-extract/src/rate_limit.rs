use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Per-host leaky-bucket gate (spec §5: "no more than one in-flight request
/// per host tighter than a configurable minimum spacing"). Shared across
/// extractor threads behind an `Arc`.
pub struct HostRateLimiter {
    min_spacing: Duration,
    last_request: Mutex<HashMap<String, Instant>>,
}

impl HostRateLimiter {
    pub fn new(min_spacing: Duration) -> Self {
        Self { min_spacing, last_request: Mutex::new(HashMap::new()) }
    }

    /// Default policy: at least 100ms between requests to the same host.
    pub fn polite() -> Self {
        Self::new(Duration::from_millis(100))
    }

    /// Blocks the calling thread until `host` has gone quiet for at least
    /// `min_spacing`, then reserves the slot. Intentionally blocking — the
    /// extractor pool is thread-per-worker, not async.
    pub fn wait(&self, host: &str) {
        loop {
            let now = Instant::now();
            let wait_for = {
                let mut guard = self.last_request.lock();
                match guard.get(host) {
                    Some(last) if now.duration_since(*last) < self.min_spacing => Some(self.min_spacing - now.duration_since(*last)),
                    _ => {
                        guard.insert(host.to_string(), now);
                        None
                    }
                }
            };
            match wait_for {
                Some(d) => std::thread::sleep(d),
                None => return,
            }
        }
    }
}

pub fn host_of(url: &str) -> String {
    url.split("://").nth(1).and_then(|rest| rest.split('/').next()).unwrap_or(url).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_host() {
        assert_eq!(host_of("https://www2.census.gov/geo/tiger/foo.zip"), "www2.census.gov");
    }

    #[test]
    fn second_call_waits() {
        let limiter = HostRateLimiter::new(Duration::from_millis(20));
        let start = Instant::now();
        limiter.wait("example.com");
        limiter.wait("example.com");
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
