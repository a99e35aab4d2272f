use atlas_registry::SourceDescriptor;
use atlas_resilience::CancellationToken;
use serde_json::Value;

use crate::artifact::{build_client, download_artifact};
use crate::error::ExtractError;
use crate::extractor::Extractor;
use crate::feature::RawFeature;
use crate::geojson::parse_feature_collection;
use crate::rate_limit::{host_of, HostRateLimiter};

/// ArcGIS REST FeatureServer/MapServer services describe their sub-layers at
/// `{service_url}/layers`; not every sub-layer carries polygons (some carry
/// labels or points), so we discover the first one that does rather than
/// assuming layer `0`.
#[derive(Default)]
pub struct ArcgisRestExtractor {
    limiter: std::sync::OnceLock<HostRateLimiter>,
}

impl ArcgisRestExtractor {
    fn limiter(&self) -> &HostRateLimiter {
        self.limiter.get_or_init(HostRateLimiter::polite)
    }

    fn discover_polygon_layer(&self, client: &reqwest::blocking::Client, service_url: &str) -> Result<u32, ExtractError> {
        let layers_url = format!("{}/layers?f=json", service_url.trim_end_matches('/'));
        self.limiter().wait(&host_of(&layers_url));
        let artifact = download_artifact(client, &layers_url, false)?;
        let body = artifact.bytes()?;
        let root: Value = serde_json::from_slice(&body).map_err(|e| ExtractError::Parse(e.to_string()))?;
        let layers = root.get("layers").and_then(Value::as_array).ok_or_else(|| ExtractError::Parse("missing `layers`".into()))?;
        layers
            .iter()
            .find(|l| l.get("geometryType").and_then(Value::as_str) == Some("esriGeometryPolygon"))
            .and_then(|l| l.get("id"))
            .and_then(Value::as_u64)
            .map(|id| id as u32)
            .ok_or_else(|| ExtractError::MalformedArtifact("no polygon sub-layer in service".into()))
    }
}

impl Extractor for ArcgisRestExtractor {
    fn extract(&self, source: &SourceDescriptor, state_postal: &str, token: &CancellationToken) -> Result<Vec<RawFeature>, ExtractError> {
        token.check().map_err(|_| ExtractError::Cancelled)?;
        let client = build_client(std::time::Duration::from_secs(60))?;
        let service_url = source.endpoint_for_state(state_postal);
        let layer_id = self.discover_polygon_layer(&client, &service_url)?;

        let query_url = format!(
            "{}/{}/query?where=1%3D1&outFields=*&outSR=4326&f=geojson",
            service_url.trim_end_matches('/'),
            layer_id
        );
        token.check().map_err(|_| ExtractError::Cancelled)?;
        self.limiter().wait(&host_of(&query_url));
        let artifact = download_artifact(&client, &query_url, false)?;
        let body = artifact.bytes()?;
        parse_feature_collection(&body, &artifact.provenance_stub())
    }
}
