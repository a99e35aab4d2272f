use std::collections::{HashMap, VecDeque};
use std::sync::mpsc::SyncSender;
use std::sync::Arc;
use std::time::Instant;

use atlas_extract::{extractor_for, Extractor, RawFeature};
use atlas_registry::{PipelineConfig, SourceRegistry};
use atlas_resilience::{
    guarded_call, with_retry, CancellationToken, CircuitBreaker, GuardedError, ListenerRegistry, RetryOutcome, RetryPolicy,
};
use parking_lot::Mutex;

use crate::events::ProgressEvent;
use crate::work_unit::WorkUnit;

/// Why a work unit never produced features (spec §7: transient failures are
/// retried by the harness before ever reaching here; this is what's left
/// once retries are exhausted or the failure is non-transient).
#[derive(Debug, Clone, thiserror::Error)]
pub enum UnitFailure {
    #[error("operation cancelled")]
    Cancelled,
    #[error("unknown source {0}")]
    UnknownSource(String),
    #[error("circuit open for source {0}")]
    CircuitOpen(String),
    #[error("{0}")]
    Exhausted(String),
}

pub struct UnitOutcome {
    pub unit: WorkUnit,
    pub result: Result<Vec<RawFeature>, UnitFailure>,
}

/// Per-source circuit breakers and extractor instances, lazily created and
/// shared across worker threads so a source's rate-limiter and breaker state
/// persist across every state partition it's asked to extract (spec §5:
/// "the circuit-breaker state is per-endpoint and synchronized").
struct SourceHandles {
    breakers: Mutex<HashMap<String, Arc<CircuitBreaker>>>,
    extractors: Mutex<HashMap<String, Arc<dyn Extractor>>>,
    breaker_config: atlas_resilience::BreakerConfig,
    listeners: Arc<ListenerRegistry>,
}

impl SourceHandles {
    fn new(breaker_config: atlas_resilience::BreakerConfig) -> Self {
        Self {
            breakers: Mutex::new(HashMap::new()),
            extractors: Mutex::new(HashMap::new()),
            breaker_config,
            listeners: Arc::new(ListenerRegistry::new()),
        }
    }

    fn breaker_for(&self, source_id: &str) -> Arc<CircuitBreaker> {
        self.breakers
            .lock()
            .entry(source_id.to_string())
            .or_insert_with(|| Arc::new(CircuitBreaker::new(source_id.to_string(), self.breaker_config, self.listeners.clone())))
            .clone()
    }

    fn extractor_for_source(&self, source: &atlas_registry::SourceDescriptor) -> Arc<dyn Extractor> {
        self.extractors
            .lock()
            .entry(source.id.clone())
            .or_insert_with(|| Arc::from(extractor_for(source)))
            .clone()
    }
}

/// Fixed thread pool fanning out work units to their extractors under the
/// resilience harness (spec §2 "Scheduler", §5 "cooperative parallelism: a
/// fixed pool of worker tasks"). Not async: each worker thread blocks on
/// network I/O, matching the extractor pool's synchronous `reqwest` client.
pub struct WorkerPool {
    max_parallel: usize,
    retry_policy: RetryPolicy,
    handles: SourceHandles,
}

impl WorkerPool {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            max_parallel: config.max_parallel.max(1),
            retry_policy: config.retry.to_policy(),
            handles: SourceHandles::new(config.breaker.to_breaker_config()),
        }
    }

    /// Run every unit to completion. Returns once the queue is drained or
    /// cancellation is observed; cancelled units are reported, not silently
    /// dropped (spec §5 "Cancelled units surface a `Cancelled` error").
    pub fn run(
        &self,
        registry: &SourceRegistry,
        units: Vec<WorkUnit>,
        token: &CancellationToken,
        progress: &SyncSender<ProgressEvent>,
    ) -> Vec<UnitOutcome> {
        let queue = Mutex::new(VecDeque::from(units));
        let outcomes = Mutex::new(Vec::new());

        std::thread::scope(|scope| {
            for _ in 0..self.max_parallel {
                let queue = &queue;
                let outcomes = &outcomes;
                let progress = progress.clone();
                scope.spawn(move || loop {
                    if token.check().is_err() {
                        break;
                    }
                    let Some(unit) = queue.lock().pop_front() else { break };

                    let _ = progress.send(ProgressEvent::started(&unit));
                    let started_at = Instant::now();
                    let result = self.run_one(registry, &unit, token);
                    self.report(&progress, &unit, &result, started_at.elapsed());
                    outcomes.lock().push(UnitOutcome { unit, result });
                });
            }
        });

        outcomes.into_inner()
    }

    fn run_one(&self, registry: &SourceRegistry, unit: &WorkUnit, token: &CancellationToken) -> Result<Vec<RawFeature>, UnitFailure> {
        let source = registry.get(&unit.source_id).ok_or_else(|| UnitFailure::UnknownSource(unit.source_id.clone()))?;
        let extractor = self.handles.extractor_for_source(source);
        let breaker = self.handles.breaker_for(&unit.source_id);

        let outcome = with_retry(&self.retry_policy, token, &self.handles.listeners, &unit.source_id, |_attempt| {
            guarded_call(&breaker, || extractor.extract(source, &unit.state_postal, token))
        });

        match outcome {
            Ok(features) => Ok(features),
            Err(RetryOutcome::Cancelled) => Err(UnitFailure::Cancelled),
            Err(RetryOutcome::NonTransient(GuardedError::CircuitOpen)) | Err(RetryOutcome::Exhausted(GuardedError::CircuitOpen)) => {
                Err(UnitFailure::CircuitOpen(unit.source_id.clone()))
            }
            Err(RetryOutcome::NonTransient(GuardedError::Upstream(e))) | Err(RetryOutcome::Exhausted(GuardedError::Upstream(e))) => {
                Err(UnitFailure::Exhausted(e.to_string()))
            }
        }
    }

    fn report(
        &self,
        progress: &SyncSender<ProgressEvent>,
        unit: &WorkUnit,
        result: &Result<Vec<RawFeature>, UnitFailure>,
        elapsed: std::time::Duration,
    ) {
        let event = match result {
            Ok(features) => ProgressEvent::UnitFinished {
                source_id: unit.source_id.clone(),
                state_postal: unit.state_postal.clone(),
                feature_count: features.len(),
                elapsed,
            },
            Err(UnitFailure::Cancelled) => {
                ProgressEvent::UnitCancelled { source_id: unit.source_id.clone(), state_postal: unit.state_postal.clone() }
            }
            Err(other) => ProgressEvent::UnitFailed {
                source_id: unit.source_id.clone(),
                state_postal: unit.state_postal.clone(),
                message: other.to_string(),
                transient: false,
            },
        };
        if progress.send(event).is_err() {
            tracing::debug!(source = %unit.source_id, "progress receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_registry::{AuthorityTier, ExpectedCount, Layer, PortalKind, SourceDescriptor};
    use std::sync::mpsc::sync_channel;

    #[test]
    fn unknown_source_reported_as_failure() {
        let registry = SourceRegistry::builder().build();
        let pool = WorkerPool::new(&PipelineConfig::default());
        let (tx, rx) = sync_channel(16);
        let units = vec![WorkUnit {
            source_id: "missing".into(),
            endpoint: "https://example.test".into(),
            state_postal: "WY".into(),
            state_fips: "56".into(),
        }];
        let token = CancellationToken::new();
        let outcomes = pool.run(&registry, units, &token, &tx);
        drop(tx);
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(outcomes[0].result, Err(UnitFailure::UnknownSource(_))));
        let events: Vec<_> = rx.try_iter().collect();
        assert!(events.iter().any(|e| matches!(e, ProgressEvent::UnitFailed { .. })));
    }

    #[test]
    fn pre_cancelled_token_yields_no_outcomes() {
        let registry = SourceRegistry::builder()
            .register(SourceDescriptor::new(
                "tiger-cd",
                "https://www2.census.gov/geo/tiger/TIGER2020PL/STATE/{state}/cd.zip",
                PortalKind::TigerFtp,
                AuthorityTier::FederalCensus,
                Layer::CongressionalDistrict,
                ExpectedCount::Fixed(435),
                2020,
                "public-domain",
            ))
            .build();
        let pool = WorkerPool::new(&PipelineConfig::default());
        let (tx, _rx) = sync_channel(16);
        let units = vec![WorkUnit {
            source_id: "tiger-cd".into(),
            endpoint: "https://www2.census.gov/geo/tiger/TIGER2020PL/STATE/wy/cd.zip".into(),
            state_postal: "WY".into(),
            state_fips: "56".into(),
        }];
        let token = CancellationToken::new();
        token.cancel();
        let outcomes = pool.run(&registry, units, &token, &tx);
        assert!(outcomes.is_empty(), "worker should break before popping any unit once cancelled");
    }
}
