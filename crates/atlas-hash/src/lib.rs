//! ZK-friendly hashing and canonical field-element encoding.
//!
//! This crate is the leaf-most dependency in the pipeline (spec §2): every
//! other crate that needs a collision-resistant digest — leaf hashes,
//! provenance digests, geometry digests, content-addressed CIDs — goes
//! through [`zk_hash`]/[`FieldElement`] so the whole catalog commits under a
//! single, swappable hash.

mod field;

pub use field::{hash_bytes, sentinel_hash, zk_hash, FieldElement};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("malformed hex digest: {0}")]
    MalformedHex(String),
    #[error("expected a 32-byte digest, got {0} bytes")]
    WrongLength(usize),
}
