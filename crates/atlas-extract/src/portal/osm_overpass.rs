use atlas_registry::SourceDescriptor;
use atlas_resilience::CancellationToken;
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::Value;

use crate::artifact::{build_client, download_artifact};
use crate::error::ExtractError;
use crate::extractor::Extractor;
use crate::feature::{PropertyBag, RawFeature};
use crate::rate_limit::{host_of, HostRateLimiter};

/// Overpass API responses (`out geom;`) carry closed ways as a flat
/// `geometry` array of `{lat, lon}` and boundary relations as a `members`
/// array tagged with `role: "outer" | "inner"`. Only those two shapes are
/// handled; anything else (bare nodes, untagged ways) is skipped.
#[derive(Default)]
pub struct OverpassExtractor {
    limiter: std::sync::OnceLock<HostRateLimiter>,
}

fn ring_from_geometry(points: &[Value]) -> Option<LineString<f64>> {
    let mut coords = Vec::with_capacity(points.len());
    for p in points {
        let lat = p.get("lat")?.as_f64()?;
        let lon = p.get("lon")?.as_f64()?;
        coords.push(Coord { x: lon, y: lat });
    }
    if coords.len() < 4 {
        return None;
    }
    Some(LineString(coords))
}

fn element_to_polygon(element: &Value) -> Option<Polygon<f64>> {
    match element.get("type").and_then(Value::as_str) {
        Some("way") => {
            let geometry = element.get("geometry")?.as_array()?;
            let ring = ring_from_geometry(geometry)?;
            Some(Polygon::new(ring, vec![]))
        }
        Some("relation") => {
            let members = element.get("members")?.as_array()?;
            let mut exterior = None;
            let mut holes = Vec::new();
            for m in members {
                let Some(geometry) = m.get("geometry").and_then(Value::as_array) else { continue };
                let Some(ring) = ring_from_geometry(geometry) else { continue };
                match m.get("role").and_then(Value::as_str) {
                    Some("inner") => holes.push(ring),
                    _ => exterior = exterior.or(Some(ring)),
                }
            }
            exterior.map(|ext| Polygon::new(ext, holes))
        }
        _ => None,
    }
}

fn properties_of(element: &Value) -> PropertyBag {
    let mut bag = PropertyBag::default();
    if let Some(tags) = element.get("tags").and_then(Value::as_object) {
        for (k, v) in tags {
            bag.insert(k.clone(), v.clone().into());
        }
    }
    bag
}

impl Extractor for OverpassExtractor {
    fn extract(&self, source: &SourceDescriptor, state_postal: &str, token: &CancellationToken) -> Result<Vec<RawFeature>, ExtractError> {
        token.check().map_err(|_| ExtractError::Cancelled)?;
        let client = build_client(std::time::Duration::from_secs(120))?;
        let url = source.endpoint_for_state(state_postal);

        self.limiter.get_or_init(HostRateLimiter::polite).wait(&host_of(&url));
        let artifact = download_artifact(&client, &url, false)?;
        let body = artifact.bytes()?;
        let root: Value = serde_json::from_slice(&body).map_err(|e| ExtractError::Parse(e.to_string()))?;
        let elements = root.get("elements").and_then(Value::as_array).ok_or_else(|| ExtractError::Parse("missing `elements`".into()))?;

        let provenance = artifact.provenance_stub();
        let mut out = Vec::new();
        for element in elements {
            let Some(polygon) = element_to_polygon(element) else { continue };
            out.push(RawFeature { geometry: MultiPolygon(vec![polygon]), properties: properties_of(element), provenance: provenance.clone() });
        }
        Ok(out)
    }
}
