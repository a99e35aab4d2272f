use geo::MultiPolygon;

/// Canonical little-endian byte encoding of a `MultiPolygon<f64>`, modeled on
/// a minimal WKB-style ring encoding: polygon count, then per polygon the
/// ring count and per ring the vertex count followed by raw x/y f64 pairs.
/// Used only to produce a stable hash input for the commitment engine, never
/// serialized to disk — byte-for-byte determinism across runs is all that
/// matters here.
pub fn encode_canonical(geometry: &MultiPolygon<f64>) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(geometry.0.len() as u32).to_le_bytes());
    for polygon in &geometry.0 {
        let num_rings = 1 + polygon.interiors().len();
        out.extend_from_slice(&(num_rings as u32).to_le_bytes());

        let exterior = polygon.exterior();
        out.extend_from_slice(&(exterior.0.len() as u32).to_le_bytes());
        for coord in &exterior.0 {
            out.extend_from_slice(&coord.x.to_le_bytes());
            out.extend_from_slice(&coord.y.to_le_bytes());
        }
        for interior in polygon.interiors() {
            out.extend_from_slice(&(interior.0.len() as u32).to_le_bytes());
            for coord in &interior.0 {
                out.extend_from_slice(&coord.x.to_le_bytes());
                out.extend_from_slice(&coord.y.to_le_bytes());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    #[test]
    fn encoding_is_deterministic() {
        let poly = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)];
        let mp = MultiPolygon(vec![poly]);
        assert_eq!(encode_canonical(&mp), encode_canonical(&mp));
    }

    #[test]
    fn different_geometry_encodes_differently() {
        let a = MultiPolygon(vec![polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)]]);
        let b = MultiPolygon(vec![polygon![(x: 0.0, y: 0.0), (x: 2.0, y: 0.0), (x: 2.0, y: 2.0), (x: 0.0, y: 2.0)]]);
        assert_ne!(encode_canonical(&a), encode_canonical(&b));
    }
}
