//! Normalizer: simplifies raw geometry, synthesizes canonical IDs, computes
//! inclusive bboxes, and content-addresses provenance (spec §4.8).

mod bbox;
mod canonical_id;
mod geometry_bytes;
mod normalizer;
mod provenance;
mod simplify;

pub use bbox::inclusive_bbox;
pub use canonical_id::resolve_geoid;
pub use geometry_bytes::encode_canonical;
pub use normalizer::{normalize, NormalizeSettings, NormalizedBoundary};
pub use provenance::provenance_digest;
pub use simplify::simplify_preserving_area;
