use atlas_registry::SourceDescriptor;
use atlas_resilience::CancellationToken;

use crate::artifact::{build_client, download_artifact};
use crate::error::ExtractError;
use crate::extractor::Extractor;
use crate::feature::RawFeature;
use crate::geojson::parse_feature_collection;
use crate::rate_limit::{host_of, HostRateLimiter};

/// Socrata's Open Data API serves any resource as GeoJSON by appending
/// `.geojson` and `$limit`; large boundary datasets rarely exceed the
/// default page so a single request is enough for now (no `$offset`
/// pagination loop — revisit if a layer's expected feature count exceeds a
/// single Socrata page).
#[derive(Default)]
pub struct SocrataExtractor {
    limiter: std::sync::OnceLock<HostRateLimiter>,
}

impl Extractor for SocrataExtractor {
    fn extract(&self, source: &SourceDescriptor, state_postal: &str, token: &CancellationToken) -> Result<Vec<RawFeature>, ExtractError> {
        token.check().map_err(|_| ExtractError::Cancelled)?;
        let client = build_client(std::time::Duration::from_secs(60))?;
        let base = source.endpoint_for_state(state_postal);
        let url = format!("{}.geojson?$limit=50000", base.trim_end_matches(".json").trim_end_matches(".geojson"));

        self.limiter.get_or_init(HostRateLimiter::polite).wait(&host_of(&url));
        let artifact = download_artifact(&client, &url, false)?;
        let body = artifact.bytes()?;
        parse_feature_collection(&body, &artifact.provenance_stub())
    }
}
