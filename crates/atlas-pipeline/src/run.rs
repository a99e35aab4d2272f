use std::collections::BTreeMap;
use std::sync::mpsc::sync_channel;

use atlas_cross::{cross_validate, CrossCandidate};
use atlas_extract::RawFeature;
use atlas_merkle::{MerkleLeafRecord, MerkleTree};
use atlas_normalize::{normalize, resolve_geoid, NormalizeSettings, NormalizedBoundary};
use atlas_registry::{AuthorityTier, Layer, PipelineConfig, SourceDescriptor, SourceRegistry};
use atlas_resilience::CancellationToken;
use atlas_scheduler::{work_units_for, ProgressEvent, WorkerPool};
use atlas_snapshot::{BuildResult, Snapshot, SnapshotStore};
use atlas_validate::{classify, current_year, detect_dual_system_overlaps, score_layer, EdgeCaseAction, EdgeCaseInput, GateInput, SemanticVerdict, ValidationGate};

use crate::error::PipelineError;
use crate::report::{CrossValidationRecord, DroppedBatch, PipelineReport, SourceFailureRecord, SourceRejection};

/// Census-tracked territories (spec §4.5: their bounding boxes deliberately
/// fall outside the CONUS envelope the geographic validator otherwise assumes).
const TERRITORY_FIPS: &[&str] = &["72", "78", "66", "60", "69"];

fn is_territory(state_fips: &str) -> bool {
    TERRITORY_FIPS.contains(&state_fips)
}

/// Pre-download validation (spec §2 control flow: "semantic -> edge-case ->
/// ..."), run against a source's own metadata before its extractor ever
/// makes a request, so a mislabeled layer (a parcel layer masquerading as a
/// council district, a voting-precinct layer mistaken for a district) never
/// reaches the network stage. Returns the rejection reason, if any.
fn pre_download_rejection(source: &SourceDescriptor, state_fips: &str) -> Option<String> {
    let semantic = score_layer(&source.id, Some(&source.endpoint_template));
    if semantic.verdict == SemanticVerdict::Rejected {
        return Some(match semantic.matched_negative {
            Some(keyword) => format!("semantic gate rejected \"{}\" (matched negative keyword \"{keyword}\")", source.id),
            None => format!("semantic gate rejected \"{}\" (score {})", source.id, semantic.score),
        });
    }

    let edge_case = classify(&EdgeCaseInput {
        layer_name: &source.id,
        url_path: &source.endpoint_template,
        vintage_year: source.vintage_year,
        current_year: current_year(),
        feature_count: source.expected_feature_count.for_state(state_fips).unwrap_or(0),
    });
    if edge_case.action == EdgeCaseAction::Reject {
        return Some(format!("edge-case gate rejected \"{}\" ({:?})", source.id, edge_case.class));
    }

    None
}

type BatchKey = (Layer, String);

struct TaggedFeature {
    source_id: String,
    authority: AuthorityTier,
    feature: RawFeature,
}

struct NormalizedWithSource {
    source_id: String,
    boundary: NormalizedBoundary,
}

/// Run one full catalog build: fan out acquisition across every registered
/// source, gate each (layer, state) batch through validation, normalize
/// survivors, cross-check overlapping sources best-effort, commit the result
/// into a Merkle tree, and seal it into the snapshot store (spec §2's
/// end-to-end pipeline, §4.1-§4.12).
///
/// A validation halt aborts the whole run: no data downstream of a halted
/// batch may enter any Merkle tree, so partial results from batches that
/// already cleared the gate are discarded along with everything still in
/// flight (spec §7).
pub fn run_pipeline(
    registry: &SourceRegistry,
    config: &PipelineConfig,
    store: &dyn SnapshotStore,
    token: &CancellationToken,
) -> Result<(Snapshot, PipelineReport), PipelineError> {
    config.validate()?;

    let units = work_units_for(registry);
    let total_units = units.len();

    let mut rejected_sources = Vec::new();
    let units: Vec<_> = units
        .into_iter()
        .filter(|unit| {
            let Some(source) = registry.get(&unit.source_id) else { return true };
            match pre_download_rejection(source, &unit.state_fips) {
                Some(reason) => {
                    tracing::warn!(source = %unit.source_id, state = %unit.state_postal, %reason, "source rejected by pre-download gate");
                    rejected_sources.push(SourceRejection {
                        source_id: unit.source_id.clone(),
                        state_postal: unit.state_postal.clone(),
                        reason,
                    });
                    false
                }
                None => true,
            }
        })
        .collect();

    let pool = WorkerPool::new(config);

    let (tx, rx) = sync_channel::<ProgressEvent>(256);
    let collector = std::thread::spawn(move || {
        let mut failed = Vec::new();
        for event in rx {
            match event {
                ProgressEvent::UnitFailed { source_id, state_postal, message, .. } => {
                    tracing::warn!(source = %source_id, state = %state_postal, %message, "work unit failed");
                    failed.push(SourceFailureRecord { source_id, state_postal, message });
                }
                ProgressEvent::UnitCancelled { source_id, state_postal } => {
                    failed.push(SourceFailureRecord { source_id, state_postal, message: "cancelled".to_string() });
                }
                ProgressEvent::UnitFinished { source_id, state_postal, feature_count, elapsed } => {
                    tracing::debug!(source = %source_id, state = %state_postal, feature_count, ?elapsed, "work unit finished");
                }
                ProgressEvent::UnitStarted { .. } => {}
            }
        }
        failed
    });

    let outcomes = pool.run(registry, units, token, &tx);
    drop(tx);
    let failed_units = collector.join().expect("progress collector thread panicked");

    token.check()?;

    let mut batches: BTreeMap<BatchKey, Vec<TaggedFeature>> = BTreeMap::new();
    for outcome in outcomes {
        let Ok(features) = outcome.result else { continue };
        let Some(source) = registry.get(&outcome.unit.source_id) else { continue };
        let key = (source.layer, outcome.unit.state_fips.clone());
        let entry = batches.entry(key).or_default();
        for feature in features {
            entry.push(TaggedFeature { source_id: source.id.clone(), authority: source.authority_tier, feature });
        }
    }

    let gate = ValidationGate::new(config.halt.clone(), 0.0);
    let normalize_settings = NormalizeSettings::default();
    let mut dropped_batches = Vec::new();
    let mut cross_validations = Vec::new();
    let mut normalized: Vec<NormalizedWithSource> = Vec::new();

    for ((layer, state_fips), tagged) in batches {
        let resolved: Vec<(String, &TaggedFeature, u32)> = tagged
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let seq = i as u32;
                let (geoid, _) = resolve_geoid(&t.feature.properties, layer, &state_fips, seq);
                (geoid, t, seq)
            })
            .collect();

        let gate_features: Vec<(String, geo::MultiPolygon<f64>)> =
            resolved.iter().map(|(geoid, t, _)| (geoid.clone(), t.feature.geometry.clone())).collect();

        let gate_input = GateInput { layer, state_fips: &state_fips, is_territory: is_territory(&state_fips), features: &gate_features };
        let gate_result = gate.run(registry.canonical(), &gate_input)?;

        if gate_result.quality_score < config.validation.min_quality_score as f64 {
            tracing::warn!(layer = %layer, state = %state_fips, score = gate_result.quality_score, "batch dropped: below quality floor");
            dropped_batches.push(DroppedBatch {
                layer,
                state_fips: state_fips.clone(),
                quality_score: gate_result.quality_score,
                feature_count: resolved.len(),
            });
            continue;
        }

        for (_, t, seq) in &resolved {
            let boundary = normalize(&t.feature, layer, &state_fips, t.authority, *seq, &normalize_settings);
            normalized.push(NormalizedWithSource { source_id: t.source_id.clone(), boundary });
        }
    }

    token.check()?;

    let mut by_batch: BTreeMap<BatchKey, Vec<&NormalizedWithSource>> = BTreeMap::new();
    for item in &normalized {
        by_batch.entry((item.boundary.layer, item.boundary.state_fips.clone())).or_default().push(item);
    }

    for ((layer, state_fips), items) in &by_batch {
        let mut by_source: BTreeMap<&str, Vec<&NormalizedWithSource>> = BTreeMap::new();
        for item in items {
            by_source.entry(item.source_id.as_str()).or_default().push(*item);
        }
        let source_ids: Vec<&str> = by_source.keys().copied().collect();
        if source_ids.len() < 2 {
            if config.cross.require_both_sources {
                tracing::warn!(layer = %layer, state = %state_fips, "only one source contributed; cross-validation skipped");
            }
            continue;
        }
        for i in 0..source_ids.len() {
            for j in (i + 1)..source_ids.len() {
                let a: Vec<CrossCandidate> = by_source[source_ids[i]]
                    .iter()
                    .map(|n| CrossCandidate { geoid: n.boundary.geoid.clone(), geometry: n.boundary.geometry.clone() })
                    .collect();
                let b: Vec<CrossCandidate> = by_source[source_ids[j]]
                    .iter()
                    .map(|n| CrossCandidate { geoid: n.boundary.geoid.clone(), geometry: n.boundary.geometry.clone() })
                    .collect();
                let report = cross_validate(&a, &b, state_fips, config.cross.min_overlap_percent);
                cross_validations.push(CrossValidationRecord {
                    layer: *layer,
                    state_fips: state_fips.clone(),
                    source_a: source_ids[i].to_string(),
                    source_b: source_ids[j].to_string(),
                    report,
                });
            }
        }
    }

    token.check()?;

    let mut elsd_by_state: BTreeMap<&str, Vec<(String, geo::MultiPolygon<f64>)>> = BTreeMap::new();
    let mut scsd_by_state: BTreeMap<&str, Vec<(String, geo::MultiPolygon<f64>)>> = BTreeMap::new();
    for item in &normalized {
        let entry = match item.boundary.layer {
            Layer::SchoolDistrictElementary => elsd_by_state.entry(item.boundary.state_fips.as_str()).or_default(),
            Layer::SchoolDistrictSecondary => scsd_by_state.entry(item.boundary.state_fips.as_str()).or_default(),
            _ => continue,
        };
        entry.push((item.boundary.geoid.clone(), item.boundary.geometry.clone()));
    }

    let mut overlap_errors = Vec::new();
    for (state_fips, elsd) in &elsd_by_state {
        if let Some(scsd) = scsd_by_state.get(state_fips) {
            let errors = detect_dual_system_overlaps(state_fips, Layer::SchoolDistrictElementary, elsd, Layer::SchoolDistrictSecondary, scsd);
            for error in &errors {
                tracing::warn!(%error, "unsanctioned dual-system overlap detected");
            }
            overlap_errors.extend(errors);
        }
    }

    let leaves: Vec<MerkleLeafRecord> = normalized.iter().map(|n| MerkleLeafRecord::from_normalized(&n.boundary)).collect();
    let leaf_count = leaves.len();
    let tree = MerkleTree::build(leaves, config.merkle.min_depth, config.merkle.sentinel()?)?;

    let mut layer_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut layer_hashes: BTreeMap<String, Vec<atlas_hash::FieldElement>> = BTreeMap::new();
    for leaf in tree.leaves() {
        *layer_counts.entry(leaf.layer.as_str().to_string()).or_insert(0) += 1;
        layer_hashes.entry(leaf.layer.as_str().to_string()).or_default().push(leaf.leaf_hash);
    }
    let mut layer_checksums = BTreeMap::new();
    for (layer_tag, mut hashes) in layer_hashes {
        hashes.sort_by(|a, b| a.as_bytes().cmp(b.as_bytes()));
        let parts: Vec<&[u8]> = hashes.iter().map(|h| h.as_bytes().as_slice()).collect();
        let checksum = atlas_hash::zk_hash("atlas/snapshot/layer-checksum/v1", &parts);
        layer_checksums.insert(layer_tag, checksum.to_hex());
    }

    let mut states_covered: Vec<String> = normalized.iter().map(|n| n.boundary.state_fips.clone()).collect();
    states_covered.sort();
    states_covered.dedup();

    let mut geoid_index = BTreeMap::new();
    for (i, leaf) in tree.leaves().iter().enumerate() {
        geoid_index.insert(format!("{}|{}|{}", leaf.layer.as_str(), leaf.state_fips, leaf.id), i);
    }
    let proofs = atlas_merkle::generate_all_proofs(&tree)
        .into_iter()
        .map(|proof| (format!("{}|{}|{}", proof.layer.as_str(), tree.leaves()[proof.index].state_fips, proof.id), proof))
        .collect();

    let build = BuildResult { merkle_root: tree.root(), merkle_depth: tree.depth(), layer_counts: layer_counts.clone(), layer_checksums, states_covered, proofs, geoid_index };

    let snapshot = store.create(build)?;

    let report = PipelineReport { total_units, rejected_sources, failed_units, dropped_batches, cross_validations, overlap_errors, leaf_count, layer_counts };

    Ok((snapshot, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_snapshot::FileSnapshotStore;

    #[test]
    fn territory_fips_recognized() {
        assert!(is_territory("72"));
        assert!(!is_territory("06"));
    }

    #[test]
    fn empty_registry_yields_no_leaves_and_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::open(dir.path()).unwrap();
        let registry = SourceRegistry::builder().build();
        let config = PipelineConfig::default();
        let token = CancellationToken::new();
        let err = run_pipeline(&registry, &config, &store, &token).unwrap_err();
        assert!(matches!(err, PipelineError::Merkle(_)));
    }

    #[test]
    fn cancelled_before_start_short_circuits() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::open(dir.path()).unwrap();
        let registry = SourceRegistry::builder().build();
        let config = PipelineConfig::default();
        let token = CancellationToken::new();
        token.cancel();
        let err = run_pipeline(&registry, &config, &store, &token).unwrap_err();
        assert!(matches!(err, PipelineError::Cancelled));
    }
}
