use std::collections::BTreeMap;

use atlas_cross::CrossReport;
use atlas_registry::Layer;
use atlas_validate::OverlapError;
use serde::Serialize;

/// A work unit that never produced boundaries, carried through to the final
/// report instead of aborting the run (spec §7: non-transient source
/// failures are recorded, not fatal — only a validation halt is fatal).
#[derive(Debug, Clone, Serialize)]
pub struct SourceFailureRecord {
    pub source_id: String,
    pub state_postal: String,
    pub message: String,
}

/// A work unit that was never even scheduled because the source's layer
/// metadata failed the pre-download semantic/edge-case gate (spec §4.3-§4.4:
/// "raw features are pushed through the validation gate in order
/// (semantic -> edge-case -> ...)").
#[derive(Debug, Clone, Serialize)]
pub struct SourceRejection {
    pub source_id: String,
    pub state_postal: String,
    pub reason: String,
}

/// A (layer, state) batch that cleared the validation gate but fell short of
/// the configured quality floor, so it never reached normalization (spec
/// §4.8 invariant: "quality_score >= 70 OR an explicit override bit is set").
#[derive(Debug, Clone, Serialize)]
pub struct DroppedBatch {
    pub layer: Layer,
    pub state_fips: String,
    pub quality_score: f64,
    pub feature_count: usize,
}

/// One pairwise cross-validation run between two sources contributing to the
/// same (layer, state) batch (spec §4.7). Reporting-only: a low `quality`
/// here never halts the run.
#[derive(Debug, Clone, Serialize)]
pub struct CrossValidationRecord {
    pub layer: Layer,
    pub state_fips: String,
    pub source_a: String,
    pub source_b: String,
    pub report: CrossReport,
}

/// Everything about a run beyond the sealed snapshot itself: what failed,
/// what was dropped, and what the cross-validator saw.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineReport {
    pub total_units: usize,
    pub rejected_sources: Vec<SourceRejection>,
    pub failed_units: Vec<SourceFailureRecord>,
    pub dropped_batches: Vec<DroppedBatch>,
    pub cross_validations: Vec<CrossValidationRecord>,
    pub overlap_errors: Vec<OverlapError>,
    pub leaf_count: usize,
    pub layer_counts: BTreeMap<String, usize>,
}
