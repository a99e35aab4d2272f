use std::fmt;

use serde::{de::Error as DeError, Deserialize, Deserializer, Serialize, Serializer};

use crate::HashError;

/// A 32-byte field-element-shaped digest.
///
/// The concrete hash function backing this type is intentionally left to the
/// integrator (see spec §9 open questions): any collision-resistant function
/// with a canonical field-element encoding satisfies the commitment engine's
/// contract. [`zk_hash`] below is a placeholder domain-separated SHA-256
/// construction; swap it for a real arithmetization-friendly hash (Poseidon,
/// Rescue, …) when wiring this catalog to a concrete ZK circuit.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldElement(pub [u8; 32]);

impl FieldElement {
    pub const ZERO: FieldElement = FieldElement([0u8; 32]);

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn from_hex(s: &str) -> Result<Self, HashError> {
        let trimmed = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(trimmed).map_err(|_| HashError::MalformedHex(s.to_string()))?;
        if bytes.len() != 32 {
            return Err(HashError::WrongLength(bytes.len()));
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        Ok(FieldElement(out))
    }
}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement({})", self.to_hex())
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for FieldElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for FieldElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        FieldElement::from_hex(&s).map_err(DeError::custom)
    }
}

/// Deterministically hash an ordered list of byte strings under a domain tag.
///
/// Each part is length-prefixed before absorption so that
/// `zk_hash("d", &[b"ab", b"c"]) != zk_hash("d", &[b"a", b"bc"])`.
pub fn zk_hash(domain: &str, parts: &[&[u8]]) -> FieldElement {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update((domain.len() as u64).to_le_bytes());
    hasher.update(domain.as_bytes());
    for part in parts {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part);
    }
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    FieldElement(out)
}

/// Hash a single byte string under the given domain; sugar for `zk_hash(domain, &[bytes])`.
pub fn hash_bytes(domain: &str, bytes: &[u8]) -> FieldElement {
    zk_hash(domain, &[bytes])
}

/// The fixed padding value for unused Merkle leaves (spec §4.9).
pub fn sentinel_hash() -> FieldElement {
    zk_hash("atlas/merkle/sentinel/v1", &[])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let h = zk_hash("d", &[b"hello"]);
        let s = h.to_hex();
        assert!(s.starts_with("0x"));
        assert_eq!(FieldElement::from_hex(&s).unwrap(), h);
    }

    #[test]
    fn domain_separation() {
        let a = zk_hash("domain-a", &[b"x"]);
        let b = zk_hash("domain-b", &[b"x"]);
        assert_ne!(a, b);
    }

    #[test]
    fn part_boundary_separation() {
        let a = zk_hash("d", &[b"ab", b"c"]);
        let b = zk_hash("d", &[b"a", b"bc"]);
        assert_ne!(a, b, "length-prefixing must prevent part-boundary collisions");
    }

    #[test]
    fn deterministic() {
        let a = zk_hash("d", &[b"abc", b"def"]);
        let b = zk_hash("d", &[b"abc", b"def"]);
        assert_eq!(a, b);
    }
}
