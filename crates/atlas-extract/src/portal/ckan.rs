use atlas_registry::SourceDescriptor;
use atlas_resilience::CancellationToken;
use serde_json::Value;

use crate::artifact::{build_client, download_artifact};
use crate::error::ExtractError;
use crate::extractor::Extractor;
use crate::feature::RawFeature;
use crate::geojson::parse_feature_collection;
use crate::rate_limit::{host_of, HostRateLimiter};
use crate::shapefile_io::read_polygons_from_zip;

/// CKAN's `package_show` action returns a package record with a `resources`
/// array; we pick the first resource whose declared format is GeoJSON or a
/// zipped shapefile and download that, rather than the package URL itself.
#[derive(Default)]
pub struct CkanExtractor {
    limiter: std::sync::OnceLock<HostRateLimiter>,
}

impl CkanExtractor {
    fn limiter(&self) -> &HostRateLimiter {
        self.limiter.get_or_init(HostRateLimiter::polite)
    }
}

impl Extractor for CkanExtractor {
    fn extract(&self, source: &SourceDescriptor, state_postal: &str, token: &CancellationToken) -> Result<Vec<RawFeature>, ExtractError> {
        token.check().map_err(|_| ExtractError::Cancelled)?;
        let client = build_client(std::time::Duration::from_secs(60))?;
        let package_url = source.endpoint_for_state(state_postal);

        self.limiter().wait(&host_of(&package_url));
        let package_artifact = download_artifact(&client, &package_url, false)?;
        let body = package_artifact.bytes()?;
        let root: Value = serde_json::from_slice(&body).map_err(|e| ExtractError::Parse(e.to_string()))?;
        let resources = root
            .get("result")
            .and_then(|r| r.get("resources"))
            .and_then(Value::as_array)
            .ok_or_else(|| ExtractError::Parse("missing `result.resources`".into()))?;

        let resource = resources
            .iter()
            .find(|r| matches!(r.get("format").and_then(Value::as_str), Some(f) if f.eq_ignore_ascii_case("geojson") || f.eq_ignore_ascii_case("shp") || f.eq_ignore_ascii_case("zip")))
            .ok_or_else(|| ExtractError::MalformedArtifact("no geojson/shapefile resource in package".into()))?;
        let resource_url = resource.get("url").and_then(Value::as_str).ok_or_else(|| ExtractError::MalformedArtifact("resource missing url".into()))?;
        let is_shapefile = !resource_url.to_ascii_lowercase().ends_with(".geojson") && !resource_url.to_ascii_lowercase().ends_with(".json");

        token.check().map_err(|_| ExtractError::Cancelled)?;
        self.limiter().wait(&host_of(resource_url));
        let artifact = download_artifact(&client, resource_url, is_shapefile)?;

        if is_shapefile {
            let path = artifact.path().ok_or_else(|| ExtractError::MalformedArtifact("shapefile artifact missing disk path".into()))?;
            read_polygons_from_zip(path, artifact.provenance_stub())
        } else {
            parse_feature_collection(&artifact.bytes()?, &artifact.provenance_stub())
        }
    }
}
