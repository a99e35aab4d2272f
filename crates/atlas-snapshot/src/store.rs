use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use atlas_merkle::ProofTemplate;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::snapshot::{BuildResult, Snapshot, SnapshotState};

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("no snapshot at version {0}")]
    UnknownVersion(u64),
    #[error("no snapshot with id {0}")]
    UnknownId(String),
    #[error("no proof for key {1} in snapshot {0}")]
    UnknownProof(String, String),
    #[error("store has no snapshots yet")]
    Empty,
    #[error("snapshot {0} is already published")]
    AlreadyPublished(String),
    #[error("snapshot {0} cannot transition out of state {1:?}")]
    InvalidTransition(String, SnapshotState),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

pub trait SnapshotStore {
    fn create(&self, build: BuildResult) -> Result<Snapshot, SnapshotError>;
    fn publish(&self, id: &str, cid: String) -> Result<Snapshot, SnapshotError>;
    fn get_latest(&self) -> Result<Snapshot, SnapshotError>;
    fn get_by_version(&self, version: u64) -> Result<Snapshot, SnapshotError>;
    fn get_by_id(&self, id: &str) -> Result<Snapshot, SnapshotError>;
    fn list(&self, limit: usize, offset: usize) -> Result<Vec<Snapshot>, SnapshotError>;
    /// Lookup by `(snapshot, boundary id)` -> proof template (spec §6),
    /// keyed the same way [`crate::snapshot::BuildResult::proofs`] is: `"layer|state_fips|id"`.
    fn get_proof(&self, snapshot_id: &str, key: &str) -> Result<ProofTemplate, SnapshotError>;
}

/// Directory-per-snapshot index/manifest layout, the versioned-catalog analogue
/// of a pack manifest: `index.json` tracks the version->id mapping, and each
/// `snapshots/<id>/snapshot.json` holds the full record.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Index {
    latest_version: u64,
    by_version: BTreeMap<u64, String>,
}

pub struct FileSnapshotStore {
    root: PathBuf,
}

impl FileSnapshotStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, SnapshotError> {
        let root = root.into();
        fs::create_dir_all(root.join("snapshots"))?;
        let store = Self { root };
        if !store.index_path().exists() {
            store.write_index(&Index::default())?;
        }
        Ok(store)
    }

    fn index_path(&self) -> PathBuf {
        self.root.join("index.json")
    }

    fn snapshot_dir(&self, id: &str) -> PathBuf {
        self.root.join("snapshots").join(id)
    }

    fn snapshot_path(&self, id: &str) -> PathBuf {
        self.snapshot_dir(id).join("snapshot.json")
    }

    fn proofs_path(&self, id: &str) -> PathBuf {
        self.snapshot_dir(id).join("proofs.json")
    }

    fn geoids_path(&self, id: &str) -> PathBuf {
        self.snapshot_dir(id).join("geoids.json")
    }

    fn read_index(&self) -> Result<Index, SnapshotError> {
        let bytes = fs::read(self.index_path())?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn write_index(&self, index: &Index) -> Result<(), SnapshotError> {
        let bytes = serde_json::to_vec_pretty(index)?;
        fs::write(self.index_path(), bytes)?;
        Ok(())
    }

    fn write_snapshot(&self, snap: &Snapshot) -> Result<(), SnapshotError> {
        let path = self.snapshot_path(&snap.id);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let bytes = serde_json::to_vec_pretty(snap)?;
        fs::write(path, bytes)?;
        Ok(())
    }

    fn read_snapshot(&self, id: &str) -> Result<Snapshot, SnapshotError> {
        let path = self.snapshot_path(id);
        let bytes = fs::read(&path).map_err(|_| SnapshotError::UnknownId(id.to_string()))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn write_proofs(&self, id: &str, proofs: &BTreeMap<String, ProofTemplate>) -> Result<(), SnapshotError> {
        let bytes = serde_json::to_vec_pretty(proofs)?;
        fs::write(self.proofs_path(id), bytes)?;
        Ok(())
    }

    fn write_geoids(&self, id: &str, geoid_index: &BTreeMap<String, usize>) -> Result<(), SnapshotError> {
        let bytes = serde_json::to_vec_pretty(geoid_index)?;
        fs::write(self.geoids_path(id), bytes)?;
        Ok(())
    }

    fn read_proofs(&self, id: &str) -> Result<BTreeMap<String, ProofTemplate>, SnapshotError> {
        let bytes = fs::read(self.proofs_path(id)).map_err(|_| SnapshotError::UnknownId(id.to_string()))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn create(&self, build: BuildResult) -> Result<Snapshot, SnapshotError> {
        let mut index = self.read_index()?;
        let version = index.latest_version + 1;
        let id = Uuid::new_v4().to_string();

        let snapshot = Snapshot {
            id: id.clone(),
            version,
            created_at: Utc::now(),
            merkle_root: build.merkle_root.to_hex(),
            merkle_depth: build.merkle_depth,
            layer_counts: build.layer_counts,
            layer_checksums: build.layer_checksums,
            states_covered: build.states_covered,
            state: SnapshotState::Sealed,
        };
        self.write_snapshot(&snapshot)?;
        self.write_proofs(&id, &build.proofs)?;
        self.write_geoids(&id, &build.geoid_index)?;

        if let Some(prev_id) = index.by_version.get(&index.latest_version).cloned() {
            if let Ok(mut prev) = self.read_snapshot(&prev_id) {
                if matches!(prev.state, SnapshotState::Sealed | SnapshotState::Published { .. }) {
                    prev.state = SnapshotState::Superseded;
                    self.write_snapshot(&prev)?;
                }
            }
        }

        index.latest_version = version;
        index.by_version.insert(version, id);
        self.write_index(&index)?;

        tracing::info!(version, root = %snapshot.merkle_root, "sealed snapshot");
        Ok(snapshot)
    }

    fn publish(&self, id: &str, cid: String) -> Result<Snapshot, SnapshotError> {
        let mut snap = self.read_snapshot(id)?;
        match &snap.state {
            SnapshotState::Published { cid: existing } if *existing == cid => return Ok(snap),
            SnapshotState::Published { .. } => return Err(SnapshotError::AlreadyPublished(id.to_string())),
            SnapshotState::Sealed => {}
            other => return Err(SnapshotError::InvalidTransition(id.to_string(), other.clone())),
        }
        snap.state = SnapshotState::Published { cid };
        self.write_snapshot(&snap)?;
        Ok(snap)
    }

    fn get_latest(&self) -> Result<Snapshot, SnapshotError> {
        let index = self.read_index()?;
        if index.latest_version == 0 {
            return Err(SnapshotError::Empty);
        }
        self.get_by_version(index.latest_version)
    }

    fn get_by_version(&self, version: u64) -> Result<Snapshot, SnapshotError> {
        let index = self.read_index()?;
        let id = index.by_version.get(&version).ok_or(SnapshotError::UnknownVersion(version))?;
        self.read_snapshot(id)
    }

    fn get_by_id(&self, id: &str) -> Result<Snapshot, SnapshotError> {
        self.read_snapshot(id)
    }

    fn list(&self, limit: usize, offset: usize) -> Result<Vec<Snapshot>, SnapshotError> {
        let index = self.read_index()?;
        let mut versions: Vec<u64> = index.by_version.keys().copied().collect();
        versions.sort_unstable_by(|a, b| b.cmp(a));
        versions
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|v| self.get_by_version(v))
            .collect()
    }

    fn get_proof(&self, snapshot_id: &str, key: &str) -> Result<ProofTemplate, SnapshotError> {
        let proofs = self.read_proofs(snapshot_id)?;
        proofs.get(key).cloned().ok_or_else(|| SnapshotError::UnknownProof(snapshot_id.to_string(), key.to_string()))
    }
}

#[allow(dead_code)]
fn snapshots_dir(root: &Path) -> PathBuf {
    root.join("snapshots")
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_hash::FieldElement;
    use atlas_registry::{AuthorityTier, Layer};

    fn sample_proof(root: FieldElement) -> ProofTemplate {
        ProofTemplate {
            root,
            leaf_hash: root,
            siblings: vec![FieldElement::ZERO; 14],
            path_bits: vec![false; 14],
            index: 0,
            id: "5601".to_string(),
            layer: Layer::CongressionalDistrict,
            authority: AuthorityTier::FederalCensus,
        }
    }

    fn build(root: &str, count: usize) -> BuildResult {
        let mut layer_counts = BTreeMap::new();
        layer_counts.insert("congressional_district".to_string(), count);
        let mut layer_checksums = BTreeMap::new();
        layer_checksums.insert("congressional_district".to_string(), format!("chk-{root}"));
        let merkle_root = FieldElement::from_hex(&format!("0x{:0>64}", root)).unwrap_or(FieldElement::ZERO);

        let key = "congressional_district|56|5601".to_string();
        let mut proofs = BTreeMap::new();
        proofs.insert(key.clone(), sample_proof(merkle_root));
        let mut geoid_index = BTreeMap::new();
        geoid_index.insert(key, 0);

        BuildResult {
            merkle_root,
            merkle_depth: 14,
            layer_counts,
            layer_checksums,
            states_covered: vec!["56".to_string()],
            proofs,
            geoid_index,
        }
    }

    #[test]
    fn create_then_fetch_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::open(dir.path()).unwrap();
        let snap = store.create(build("1", 435)).unwrap();
        assert_eq!(snap.version, 1);
        assert_eq!(store.get_latest().unwrap().id, snap.id);
        assert_eq!(store.get_by_version(1).unwrap().id, snap.id);
        assert_eq!(store.get_by_id(&snap.id).unwrap().version, 1);
    }

    #[test]
    fn new_version_supersedes_previous() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::open(dir.path()).unwrap();
        let first = store.create(build("1", 435)).unwrap();
        let second = store.create(build("2", 436)).unwrap();

        let refreshed_first = store.get_by_id(&first.id).unwrap();
        assert_eq!(refreshed_first.state, SnapshotState::Superseded);
        assert!(store.get_latest().unwrap().id == second.id);
    }

    #[test]
    fn publish_attaches_cid_idempotently() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::open(dir.path()).unwrap();
        let snap = store.create(build("1", 435)).unwrap();
        let published = store.publish(&snap.id, "bafy-test".to_string()).unwrap();
        assert!(matches!(published.state, SnapshotState::Published { .. }));

        let republished = store.publish(&snap.id, "bafy-test".to_string()).unwrap();
        assert_eq!(republished.state, published.state);

        assert!(store.publish(&snap.id, "bafy-other".to_string()).is_err());
    }

    #[test]
    fn empty_store_has_no_latest() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::open(dir.path()).unwrap();
        assert!(matches!(store.get_latest(), Err(SnapshotError::Empty)));
    }

    #[test]
    fn proof_and_geoid_index_persisted_alongside_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::open(dir.path()).unwrap();
        let snap = store.create(build("1", 435)).unwrap();

        assert!(store.proofs_path(&snap.id).exists());
        assert!(store.geoids_path(&snap.id).exists());

        let proof = store.get_proof(&snap.id, "congressional_district|56|5601").unwrap();
        assert_eq!(proof.id, "5601");
        assert_eq!(proof.layer, Layer::CongressionalDistrict);

        assert!(matches!(store.get_proof(&snap.id, "unknown|00|0000"), Err(SnapshotError::UnknownProof(_, _))));
    }
}
