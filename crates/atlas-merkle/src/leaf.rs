use atlas_hash::{hash_bytes, zk_hash, FieldElement};
use atlas_normalize::NormalizedBoundary;
use atlas_registry::{AuthorityTier, Layer};

/// The sort key and payload of one Merkle leaf (spec §4.9 step 1/2).
#[derive(Debug, Clone)]
pub struct MerkleLeafRecord {
    pub layer: Layer,
    pub state_fips: String,
    pub id: String,
    pub authority: AuthorityTier,
    pub leaf_hash: FieldElement,
}

/// `H( H(id) ‖ layer_tag ‖ authority ‖ H(geometry) ‖ H(provenance) )`
/// (spec §4.9 step 2). Layer and authority are absorbed as raw tags rather
/// than hashed themselves, which is exactly why "two otherwise-identical
/// boundaries with different layer tags yield different leaves" holds: the
/// outer hash's domain-separated, length-prefixed absorption already makes
/// every part load-bearing.
pub fn leaf_hash(id: &str, layer: Layer, authority: AuthorityTier, geometry_hash: FieldElement, provenance_digest: FieldElement) -> FieldElement {
    let id_hash = hash_bytes("atlas/merkle/id/v1", id.as_bytes());
    zk_hash(
        "atlas/merkle/leaf/v1",
        &[id_hash.as_bytes(), layer.as_str().as_bytes(), &[authority.rank()], geometry_hash.as_bytes(), provenance_digest.as_bytes()],
    )
}

impl MerkleLeafRecord {
    pub fn from_normalized(boundary: &NormalizedBoundary) -> Self {
        let leaf_hash = leaf_hash(&boundary.geoid, boundary.layer, boundary.authority, boundary.geometry_hash, boundary.provenance_digest);
        Self { layer: boundary.layer, state_fips: boundary.state_fips.clone(), id: boundary.geoid.clone(), authority: boundary.authority, leaf_hash }
    }

    /// `(layer, state_fips, id)` lexicographic sort key (spec §4.9 step 1).
    pub fn sort_key(&self) -> (&'static str, &str, &str) {
        (self.layer.as_str(), &self.state_fips, &self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn different_layer_tag_changes_leaf() {
        let geom = FieldElement::ZERO;
        let prov = FieldElement::ZERO;
        let a = leaf_hash("0601", Layer::CongressionalDistrict, AuthorityTier::FederalCensus, geom, prov);
        let b = leaf_hash("0601", Layer::County, AuthorityTier::FederalCensus, geom, prov);
        assert_ne!(a, b);
    }

    #[test]
    fn different_authority_changes_leaf() {
        let geom = FieldElement::ZERO;
        let prov = FieldElement::ZERO;
        let a = leaf_hash("0601", Layer::CongressionalDistrict, AuthorityTier::FederalCensus, geom, prov);
        let b = leaf_hash("0601", Layer::CongressionalDistrict, AuthorityTier::Municipal, geom, prov);
        assert_ne!(a, b);
    }

    #[test]
    fn provenance_is_committed() {
        let geom = FieldElement::ZERO;
        let a = leaf_hash("0601", Layer::CongressionalDistrict, AuthorityTier::FederalCensus, geom, hash_bytes("x", b"one"));
        let b = leaf_hash("0601", Layer::CongressionalDistrict, AuthorityTier::FederalCensus, geom, hash_bytes("x", b"two"));
        assert_ne!(a, b, "changing only provenance must change the leaf");
    }
}
