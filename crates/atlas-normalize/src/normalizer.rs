use atlas_extract::RawFeature;
use atlas_hash::{hash_bytes, FieldElement};
use atlas_registry::{AuthorityTier, Layer};
use geo::MultiPolygon;

use crate::bbox::inclusive_bbox;
use crate::canonical_id::resolve_geoid;
use crate::geometry_bytes::encode_canonical;
use crate::provenance::provenance_digest;
use crate::simplify::simplify_preserving_area;

/// A feature once it has crossed the normalization boundary (spec §4.8).
/// Nothing downstream holds a [`RawFeature`] again.
#[derive(Debug, Clone)]
pub struct NormalizedBoundary {
    pub geoid: String,
    pub layer: Layer,
    pub state_fips: String,
    pub authority: AuthorityTier,
    pub geometry: MultiPolygon<f64>,
    pub bbox: Option<(f64, f64, f64, f64)>,
    pub geometry_hash: FieldElement,
    pub provenance_digest: FieldElement,
    pub id_was_synthesized: bool,
}

pub struct NormalizeSettings {
    pub min_area_ratio: f64,
    pub max_vertices: usize,
}

impl Default for NormalizeSettings {
    fn default() -> Self {
        Self { min_area_ratio: 0.999, max_vertices: 2_000 }
    }
}

/// Normalize one [`RawFeature`] into a [`NormalizedBoundary`] (spec §4.8).
/// `sequence` feeds synthetic-ID generation when the source's properties
/// carry no GEOID of their own.
pub fn normalize(
    feature: &RawFeature,
    layer: Layer,
    state_fips: &str,
    authority: AuthorityTier,
    sequence: u32,
    settings: &NormalizeSettings,
) -> NormalizedBoundary {
    let simplified = simplify_preserving_area(&feature.geometry, settings.min_area_ratio, settings.max_vertices);
    let bbox = inclusive_bbox(&simplified);
    let (geoid, id_was_synthesized) = resolve_geoid(&feature.properties, layer, state_fips, sequence);
    if id_was_synthesized {
        tracing::info!(geoid, layer = %layer, state = state_fips, "synthesized canonical id: source provided none");
    }

    let geometry_hash = hash_bytes("atlas/normalize/geometry/v1", &encode_canonical(&simplified));
    let digest = provenance_digest(&feature.provenance, authority);

    NormalizedBoundary {
        geoid,
        layer,
        state_fips: state_fips.to_string(),
        authority,
        geometry: simplified,
        bbox,
        geometry_hash,
        provenance_digest: digest,
        id_was_synthesized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_extract::{PropertyBag, PropertyValue, ProvenanceStub};
    use chrono::Utc;
    use geo::polygon;

    fn raw_feature(geoid: Option<&str>) -> RawFeature {
        let mut properties = PropertyBag::default();
        if let Some(id) = geoid {
            properties.insert("GEOID", PropertyValue::Str(id.into()));
        }
        let poly = polygon![(x: -108.0, y: 42.0), (x: -107.0, y: 42.0), (x: -107.0, y: 43.0), (x: -108.0, y: 43.0)];
        RawFeature {
            geometry: MultiPolygon(vec![poly]),
            properties,
            provenance: ProvenanceStub { source_url: "https://example.test/a.zip".into(), fetch_timestamp: Utc::now(), content_hash: "aaaa".into(), http_status: Some(200), last_modified: None },
        }
    }

    #[test]
    fn normalizes_with_existing_geoid() {
        let feature = raw_feature(Some("5601"));
        let result = normalize(&feature, Layer::CongressionalDistrict, "56", AuthorityTier::FederalCensus, 0, &NormalizeSettings::default());
        assert_eq!(result.geoid, "5601");
        assert!(!result.id_was_synthesized);
        assert!(result.bbox.is_some());
    }

    #[test]
    fn deterministic_geometry_hash() {
        let feature = raw_feature(Some("5601"));
        let a = normalize(&feature, Layer::CongressionalDistrict, "56", AuthorityTier::FederalCensus, 0, &NormalizeSettings::default());
        let b = normalize(&feature, Layer::CongressionalDistrict, "56", AuthorityTier::FederalCensus, 0, &NormalizeSettings::default());
        assert_eq!(a.geometry_hash, b.geometry_hash);
    }

    #[test]
    fn synthesizes_missing_geoid() {
        let feature = raw_feature(None);
        let result = normalize(&feature, Layer::CongressionalDistrict, "56", AuthorityTier::FederalCensus, 1, &NormalizeSettings::default());
        assert_eq!(result.geoid, "5601");
        assert!(result.id_was_synthesized);
    }
}
