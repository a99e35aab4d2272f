use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

/// Events emitted by the resilience harness: breaker state transitions and
/// individual call outcomes (spec §4.1: "state transitions and each call
/// outcome produce events consumable by a pluggable listener").
#[derive(Debug, Clone)]
pub enum ResilienceEvent {
    CircuitOpened { endpoint: String },
    CircuitHalfOpen { endpoint: String },
    CircuitClosed { endpoint: String },
    CallAdmitted { endpoint: String },
    CallSucceeded { endpoint: String },
    CallFailed { endpoint: String, transient: bool },
    CallRejected { endpoint: String },
    RetryScheduled { endpoint: String, attempt: u32, delay: Duration },
}

pub trait ResilienceListener: Send + Sync {
    fn on_event(&self, event: &ResilienceEvent);
}

/// Registry of listeners that may be added/removed dynamically at runtime.
/// Dispatch happens inline on the calling thread; listeners must return
/// quickly (spec: "must not block the caller") — hand off to a queue or
/// background thread if heavier work is needed.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: parking_lot::Mutex<u64>,
    listeners: RwLock<Vec<(u64, Arc<dyn ResilienceListener>)>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, listener: Arc<dyn ResilienceListener>) -> u64 {
        let mut next_id = self.next_id.lock();
        let id = *next_id;
        *next_id += 1;
        self.listeners.write().push((id, listener));
        id
    }

    pub fn remove(&self, id: u64) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    pub fn emit(&self, event: ResilienceEvent) {
        tracing::debug!(?event, "resilience event");
        for (_, listener) in self.listeners.read().iter() {
            listener.on_event(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter(AtomicUsize);
    impl ResilienceListener for Counter {
        fn on_event(&self, _event: &ResilienceEvent) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn add_remove_dynamic() {
        let registry = ListenerRegistry::new();
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        let id = registry.add(counter.clone());
        registry.emit(ResilienceEvent::CallSucceeded { endpoint: "x".into() });
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);

        assert!(registry.remove(id));
        registry.emit(ResilienceEvent::CallSucceeded { endpoint: "x".into() });
        assert_eq!(counter.0.load(Ordering::SeqCst), 1, "removed listener must not fire");
    }
}
