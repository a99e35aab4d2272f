use geo::MultiPolygon;
use serde_json::Value;

use crate::error::ExtractError;
use crate::feature::{PropertyBag, ProvenanceStub, RawFeature};

/// Minimal GeoJSON `FeatureCollection` reader shared by every REST-flavored
/// portal (ArcGIS REST/Hub, Socrata, CKAN, Overpass). Only `Polygon` and
/// `MultiPolygon` geometries are kept; everything else is dropped rather than
/// erroring, since a layer mixing points/lines with its boundary polygons is
/// common in the wild.
pub fn parse_feature_collection(body: &[u8], provenance: &ProvenanceStub) -> Result<Vec<RawFeature>, ExtractError> {
    let root: Value = serde_json::from_slice(body).map_err(|e| ExtractError::Parse(e.to_string()))?;
    let features = root
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| ExtractError::Parse("missing `features` array".into()))?;

    let mut out = Vec::with_capacity(features.len());
    for feature in features {
        let Some(geometry_value) = feature.get("geometry") else { continue };
        let Some(geometry) = geometry_to_multipolygon(geometry_value) else { continue };
        if geometry.0.is_empty() {
            continue;
        }
        let properties = feature
            .get("properties")
            .and_then(Value::as_object)
            .map(|obj| {
                let mut bag = PropertyBag::default();
                for (k, v) in obj {
                    bag.insert(k.clone(), v.clone().into());
                }
                bag
            })
            .unwrap_or_default();
        out.push(RawFeature { geometry, properties, provenance: provenance.clone() });
    }
    Ok(out)
}

fn ring_from_coords(ring: &Value) -> Option<geo::LineString<f64>> {
    let arr = ring.as_array()?;
    let mut coords = Vec::with_capacity(arr.len());
    for pt in arr {
        let pair = pt.as_array()?;
        let x = pair.first()?.as_f64()?;
        let y = pair.get(1)?.as_f64()?;
        coords.push(geo::Coord { x, y });
    }
    if coords.len() < 4 {
        return None;
    }
    Some(geo::LineString(coords))
}

fn polygon_from_rings(rings: &Value) -> Option<geo::Polygon<f64>> {
    let arr = rings.as_array()?;
    let mut iter = arr.iter();
    let exterior = ring_from_coords(iter.next()?)?;
    let holes = iter.filter_map(ring_from_coords).collect();
    Some(geo::Polygon::new(exterior, holes))
}

fn geometry_to_multipolygon(geometry: &Value) -> Option<MultiPolygon<f64>> {
    let kind = geometry.get("type")?.as_str()?;
    let coordinates = geometry.get("coordinates")?;
    match kind {
        "Polygon" => polygon_from_rings(coordinates).map(|p| MultiPolygon(vec![p])),
        "MultiPolygon" => {
            let polys = coordinates.as_array()?.iter().filter_map(polygon_from_rings).collect::<Vec<_>>();
            Some(MultiPolygon(polys))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn stub() -> ProvenanceStub {
        ProvenanceStub { source_url: "https://example.test".into(), fetch_timestamp: Utc::now(), content_hash: "deadbeef".into(), http_status: Some(200), last_modified: None }
    }

    #[test]
    fn parses_polygon_feature() {
        let body = br#"{"type":"FeatureCollection","features":[{"type":"Feature","properties":{"GEOID":"0601"},"geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,1],[0,0]]]}}]}"#;
        let features = parse_feature_collection(body, &stub()).unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].properties.get_ci("geoid").and_then(|v| v.as_str()), Some("0601"));
    }

    #[test]
    fn drops_non_polygon_geometry() {
        let body = br#"{"type":"FeatureCollection","features":[{"type":"Feature","properties":{},"geometry":{"type":"Point","coordinates":[0,0]}}]}"#;
        let features = parse_feature_collection(body, &stub()).unwrap();
        assert!(features.is_empty());
    }
}
