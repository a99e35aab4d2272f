use std::collections::HashMap;

use atlas_hash::{zk_hash, FieldElement};

use crate::leaf::MerkleLeafRecord;

#[derive(Debug, thiserror::Error)]
pub enum MerkleError {
    #[error("tree has no leaves")]
    Empty,
    #[error("unknown leaf id {0}")]
    UnknownLeaf(String),
}

fn parent_hash(left: FieldElement, right: FieldElement) -> FieldElement {
    zk_hash("atlas/merkle/node/v1", &[left.as_bytes(), right.as_bytes()])
}

/// Depth D = ceil(log2(N)), floored at `min_depth` (spec §4.9 step 3;
/// default minimum 14 per `MerkleSettings::min_depth`).
pub fn depth_for(leaf_count: usize, min_depth: u32) -> u32 {
    if leaf_count <= 1 {
        return min_depth.max(1);
    }
    let needed = (usize::BITS - (leaf_count - 1).leading_zeros()).max(1);
    needed.max(min_depth)
}

/// A sentinel-padded, fixed-depth binary Merkle tree (spec §4.9). Leaves are
/// sorted by `(layer, state_fips, id)` before the tree is built, so the
/// commitment is a pure function of the boundary set, independent of
/// extraction order.
pub struct MerkleTree {
    depth: u32,
    leaves: Vec<MerkleLeafRecord>,
    /// Every level's hashes, level 0 = leaves (after padding), last level = root.
    levels: Vec<Vec<FieldElement>>,
    index_of: HashMap<String, usize>,
}

impl MerkleTree {
    pub fn build(mut leaves: Vec<MerkleLeafRecord>, min_depth: u32, sentinel: FieldElement) -> Result<Self, MerkleError> {
        if leaves.is_empty() {
            return Err(MerkleError::Empty);
        }
        leaves.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        let depth = depth_for(leaves.len(), min_depth);
        let capacity = 1usize << depth;

        let mut index_of = HashMap::with_capacity(leaves.len());
        let mut level0 = Vec::with_capacity(capacity);
        for (i, leaf) in leaves.iter().enumerate() {
            index_of.insert(format!("{}|{}|{}", leaf.layer.as_str(), leaf.state_fips, leaf.id), i);
            level0.push(leaf.leaf_hash);
        }
        level0.resize(capacity, sentinel);

        let mut levels = vec![level0];
        for _ in 0..depth {
            let prev = levels.last().unwrap();
            let next: Vec<FieldElement> = prev.chunks_exact(2).map(|pair| parent_hash(pair[0], pair[1])).collect();
            levels.push(next);
        }

        Ok(Self { depth, leaves, levels, index_of })
    }

    pub fn root(&self) -> FieldElement {
        self.levels.last().unwrap()[0]
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    pub fn index_for(&self, layer_tag: &str, state_fips: &str, id: &str) -> Option<usize> {
        self.index_of.get(&format!("{layer_tag}|{state_fips}|{id}")).copied()
    }

    /// Sibling hashes and left/right path bits from leaf level up to (not
    /// including) the root, ordered leaf-to-root (spec §4.9 "Proof
    /// generation"). `path_bits[k] = true` means the node at level k was the
    /// *right* child.
    pub fn path_for(&self, index: usize) -> (Vec<FieldElement>, Vec<bool>) {
        let mut siblings = Vec::with_capacity(self.depth as usize);
        let mut bits = Vec::with_capacity(self.depth as usize);
        let mut i = index;
        for level in 0..self.depth as usize {
            let is_right = i % 2 == 1;
            let sibling_index = if is_right { i - 1 } else { i + 1 };
            siblings.push(self.levels[level][sibling_index]);
            bits.push(is_right);
            i /= 2;
        }
        (siblings, bits)
    }

    pub fn leaves(&self) -> &[MerkleLeafRecord] {
        &self.leaves
    }
}

/// Fold a leaf hash up through `siblings`/`path_bits` and compare to `root`
/// (spec §4.9 "Verification"). Independent of [`MerkleTree`] so a proof can
/// be checked without rebuilding the whole tree.
pub fn verify_path(leaf_hash: FieldElement, siblings: &[FieldElement], path_bits: &[bool], root: FieldElement) -> bool {
    let mut acc = leaf_hash;
    for (sibling, is_right) in siblings.iter().zip(path_bits) {
        acc = if *is_right { parent_hash(*sibling, acc) } else { parent_hash(acc, *sibling) };
    }
    acc == root
}
