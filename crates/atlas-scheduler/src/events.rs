use std::time::Duration;

use crate::work_unit::WorkUnit;

/// Progress aggregation stream consumed by the caller (spec §2 "Scheduler:
/// ... progress aggregation"). Emitted on a bounded channel so a slow
/// consumer applies backpressure rather than unbounded memory growth.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    UnitStarted { source_id: String, state_postal: String },
    UnitFinished { source_id: String, state_postal: String, feature_count: usize, elapsed: Duration },
    UnitFailed { source_id: String, state_postal: String, message: String, transient: bool },
    UnitCancelled { source_id: String, state_postal: String },
}

impl ProgressEvent {
    pub fn started(unit: &WorkUnit) -> Self {
        Self::UnitStarted { source_id: unit.source_id.clone(), state_postal: unit.state_postal.clone() }
    }
}
