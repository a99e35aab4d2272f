use atlas_registry::SourceDescriptor;
use atlas_resilience::CancellationToken;

use crate::artifact::{build_client, download_artifact};
use crate::error::ExtractError;
use crate::extractor::Extractor;
use crate::feature::RawFeature;
use crate::geojson::parse_feature_collection;
use crate::rate_limit::{host_of, HostRateLimiter};

/// ArcGIS Hub dataset pages expose a GeoJSON download at
/// `{dataset_url}.geojson`; no layer discovery needed since a Hub dataset is
/// already a single resource.
#[derive(Default)]
pub struct ArcgisHubExtractor {
    limiter: std::sync::OnceLock<HostRateLimiter>,
}

impl Extractor for ArcgisHubExtractor {
    fn extract(&self, source: &SourceDescriptor, state_postal: &str, token: &CancellationToken) -> Result<Vec<RawFeature>, ExtractError> {
        token.check().map_err(|_| ExtractError::Cancelled)?;
        let client = build_client(std::time::Duration::from_secs(60))?;
        let base = source.endpoint_for_state(state_postal);
        let url = if base.ends_with(".geojson") { base } else { format!("{}.geojson", base.trim_end_matches('/')) };

        self.limiter.get_or_init(HostRateLimiter::polite).wait(&host_of(&url));
        let artifact = download_artifact(&client, &url, false)?;
        let body = artifact.bytes()?;
        parse_feature_collection(&body, &artifact.provenance_stub())
    }
}
