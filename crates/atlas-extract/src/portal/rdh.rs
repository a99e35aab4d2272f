use atlas_registry::SourceDescriptor;
use atlas_resilience::CancellationToken;

use crate::artifact::{build_client, download_artifact};
use crate::error::ExtractError;
use crate::extractor::Extractor;
use crate::feature::RawFeature;
use crate::rate_limit::{host_of, HostRateLimiter};
use crate::shapefile_io::read_polygons_from_zip;

/// Redistricting Data Hub mirrors distribute a single zipped shapefile per
/// state per vintage at a stable direct-download URL; third-party-aggregator
/// tier (spec §3), so its features are cross-validated against
/// higher-authority sources rather than trusted outright.
#[derive(Default)]
pub struct RdhExtractor {
    limiter: std::sync::OnceLock<HostRateLimiter>,
}

impl Extractor for RdhExtractor {
    fn extract(&self, source: &SourceDescriptor, state_postal: &str, token: &CancellationToken) -> Result<Vec<RawFeature>, ExtractError> {
        token.check().map_err(|_| ExtractError::Cancelled)?;
        let client = build_client(std::time::Duration::from_secs(120))?;
        let url = source.endpoint_for_state(state_postal);

        self.limiter.get_or_init(HostRateLimiter::polite).wait(&host_of(&url));
        let artifact = download_artifact(&client, &url, true)?;
        let path = artifact.path().ok_or_else(|| ExtractError::MalformedArtifact("expected disk-backed artifact".into()))?;
        read_polygons_from_zip(path, artifact.provenance_stub())
    }
}
