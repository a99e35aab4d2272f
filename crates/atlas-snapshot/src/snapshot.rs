use std::collections::BTreeMap;

use atlas_hash::FieldElement;
use atlas_merkle::ProofTemplate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot lifecycle (spec §4.12): only `Sealed`/`Published` snapshots are
/// visible to ordinary queries; `Superseded` ones stay readable by id/version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum SnapshotState {
    Building,
    Sealed,
    Published { cid: String },
    Superseded,
}

/// Everything the commitment engine hands the snapshot store once a build
/// finishes (spec §4.10 `create(build, metadata)`).
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub merkle_root: FieldElement,
    pub merkle_depth: u32,
    /// Per-layer boundary counts, keyed by `Layer::as_str()`.
    pub layer_counts: BTreeMap<String, usize>,
    /// Per-layer content checksum (e.g. a hash over that layer's sorted leaf hashes).
    pub layer_checksums: BTreeMap<String, String>,
    pub states_covered: Vec<String>,
    /// Proof template for every leaf, keyed by `"layer|state_fips|id"` (spec
    /// §6 `proofs.json`, the "template store").
    pub proofs: BTreeMap<String, ProofTemplate>,
    /// `"layer|state_fips|id"` -> leaf index (spec §6 `geoids.json`).
    pub geoid_index: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: String,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub merkle_root: String,
    pub merkle_depth: u32,
    pub layer_counts: BTreeMap<String, usize>,
    pub layer_checksums: BTreeMap<String, String>,
    pub states_covered: Vec<String>,
    pub state: SnapshotState,
}

impl Snapshot {
    pub fn total_boundaries(&self) -> usize {
        self.layer_counts.values().sum()
    }

    pub fn is_queryable(&self) -> bool {
        matches!(self.state, SnapshotState::Sealed | SnapshotState::Published { .. })
    }
}
