use atlas_hash::FieldElement;
use atlas_registry::{AuthorityTier, Layer};
use serde::{Deserialize, Serialize};

use crate::tree::{verify_path, MerkleTree};

/// Everything needed to independently verify one boundary's membership
/// against a published root (spec §4.9 "Proof generation").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofTemplate {
    pub root: FieldElement,
    pub leaf_hash: FieldElement,
    pub siblings: Vec<FieldElement>,
    pub path_bits: Vec<bool>,
    pub index: usize,
    pub id: String,
    pub layer: Layer,
    pub authority: AuthorityTier,
}

pub fn generate_proof(tree: &MerkleTree, layer_tag: &str, state_fips: &str, id: &str) -> Option<ProofTemplate> {
    let index = tree.index_for(layer_tag, state_fips, id)?;
    let leaf = &tree.leaves()[index];
    let (siblings, path_bits) = tree.path_for(index);
    Some(ProofTemplate { root: tree.root(), leaf_hash: leaf.leaf_hash, siblings, path_bits, index, id: leaf.id.clone(), layer: leaf.layer, authority: leaf.authority })
}

pub fn verify_proof(proof: &ProofTemplate) -> bool {
    verify_path(proof.leaf_hash, &proof.siblings, &proof.path_bits, proof.root)
}

/// A proof template for every leaf in the tree, in leaf order. Persisted
/// wholesale by the snapshot store so a proof can be served without
/// rebuilding the tree from scratch (spec §6 `proofs.json`).
pub fn generate_all_proofs(tree: &MerkleTree) -> Vec<ProofTemplate> {
    (0..tree.leaf_count())
        .map(|index| {
            let leaf = &tree.leaves()[index];
            let (siblings, path_bits) = tree.path_for(index);
            ProofTemplate { root: tree.root(), leaf_hash: leaf.leaf_hash, siblings, path_bits, index, id: leaf.id.clone(), layer: leaf.layer, authority: leaf.authority }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf::MerkleLeafRecord;

    #[test]
    fn generated_proof_verifies() {
        let leaves = vec![MerkleLeafRecord {
            layer: Layer::CongressionalDistrict,
            state_fips: "56".into(),
            id: "5601".into(),
            authority: AuthorityTier::FederalCensus,
            leaf_hash: atlas_hash::hash_bytes("test", b"5601"),
        }];
        let tree = MerkleTree::build(leaves, 4, FieldElement::ZERO).unwrap();
        let proof = generate_proof(&tree, "congressional_district", "56", "5601").unwrap();
        assert!(verify_proof(&proof));
    }

    #[test]
    fn unknown_id_has_no_proof() {
        let leaves = vec![MerkleLeafRecord {
            layer: Layer::CongressionalDistrict,
            state_fips: "56".into(),
            id: "5601".into(),
            authority: AuthorityTier::FederalCensus,
            leaf_hash: atlas_hash::hash_bytes("test", b"5601"),
        }];
        let tree = MerkleTree::build(leaves, 4, FieldElement::ZERO).unwrap();
        assert!(generate_proof(&tree, "congressional_district", "56", "9999").is_none());
    }
}
