use serde::Serialize;

use crate::snapshot::Snapshot;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerDelta {
    pub layer: String,
    pub from_count: usize,
    pub to_count: usize,
    pub delta: i64,
}

/// What changed between two snapshots (spec §4.12 "Diffing versions").
#[derive(Debug, Clone, Serialize)]
pub struct Diff {
    pub from_version: u64,
    pub to_version: u64,
    pub layers_added: Vec<String>,
    pub layers_removed: Vec<String>,
    pub layers_modified: Vec<LayerDelta>,
    pub states_added: Vec<String>,
    pub states_removed: Vec<String>,
    pub merkle_root_changed: bool,
    pub total_boundary_delta: i64,
}

pub fn diff(from: &Snapshot, to: &Snapshot) -> Diff {
    let mut layers_added = Vec::new();
    let mut layers_modified = Vec::new();

    for (layer, &to_count) in &to.layer_counts {
        match from.layer_counts.get(layer) {
            None => layers_added.push(layer.clone()),
            Some(&from_count) if from_count != to_count => layers_modified.push(LayerDelta {
                layer: layer.clone(),
                from_count,
                to_count,
                delta: to_count as i64 - from_count as i64,
            }),
            Some(_) => {}
        }
    }
    let layers_removed: Vec<String> = from
        .layer_counts
        .keys()
        .filter(|layer| !to.layer_counts.contains_key(*layer))
        .cloned()
        .collect();

    let states_added: Vec<String> = to
        .states_covered
        .iter()
        .filter(|s| !from.states_covered.contains(s))
        .cloned()
        .collect();
    let states_removed: Vec<String> = from
        .states_covered
        .iter()
        .filter(|s| !to.states_covered.contains(s))
        .cloned()
        .collect();

    layers_added.sort();
    layers_modified.sort_by(|a, b| a.layer.cmp(&b.layer));

    Diff {
        from_version: from.version,
        to_version: to.version,
        layers_added,
        layers_removed,
        layers_modified,
        states_added,
        states_removed,
        merkle_root_changed: from.merkle_root != to.merkle_root,
        total_boundary_delta: to.total_boundaries() as i64 - from.total_boundaries() as i64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::SnapshotState;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn snap(version: u64, counts: &[(&str, usize)], root: &str) -> Snapshot {
        Snapshot {
            id: format!("id-{version}"),
            version,
            created_at: Utc::now(),
            merkle_root: root.to_string(),
            merkle_depth: 14,
            layer_counts: counts.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            layer_checksums: BTreeMap::new(),
            states_covered: vec!["56".to_string()],
            state: SnapshotState::Sealed,
        }
    }

    #[test]
    fn detects_added_removed_and_modified_layers() {
        let from = snap(1, &[("congressional_district", 435), ("state_senate", 99)], "0xa");
        let to = snap(2, &[("congressional_district", 436), ("school_district", 10)], "0xb");
        let d = diff(&from, &to);
        assert_eq!(d.layers_added, vec!["school_district".to_string()]);
        assert_eq!(d.layers_removed, vec!["state_senate".to_string()]);
        assert_eq!(d.layers_modified.len(), 1);
        assert_eq!(d.layers_modified[0].delta, 1);
        assert!(d.merkle_root_changed);
    }

    #[test]
    fn identical_snapshots_diff_to_nothing() {
        let from = snap(1, &[("congressional_district", 435)], "0xa");
        let to = snap(2, &[("congressional_district", 435)], "0xa");
        let d = diff(&from, &to);
        assert!(d.layers_added.is_empty());
        assert!(d.layers_removed.is_empty());
        assert!(d.layers_modified.is_empty());
        assert!(!d.merkle_root_changed);
        assert_eq!(d.total_boundary_delta, 0);
    }
}
