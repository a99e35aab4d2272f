use atlas_extract::ProvenanceStub;
use atlas_hash::{zk_hash, FieldElement};
use atlas_registry::AuthorityTier;

/// Content-address the (URL, content-hash, Last-Modified, authority) tuple
/// (spec §4.8 "Provenance digest"). Deliberately excludes `fetch_timestamp`
/// — the determinism contract requires identical inputs to produce
/// byte-identical normalized output, and wall-clock fetch time is not an
/// input, it's an artifact of when we happened to run.
pub fn provenance_digest(stub: &ProvenanceStub, authority: AuthorityTier) -> FieldElement {
    zk_hash(
        "atlas/normalize/provenance/v1",
        &[
            stub.source_url.as_bytes(),
            stub.content_hash.as_bytes(),
            stub.last_modified.as_deref().unwrap_or("").as_bytes(),
            authority.rank().to_string().as_bytes(),
        ],
    )
}
