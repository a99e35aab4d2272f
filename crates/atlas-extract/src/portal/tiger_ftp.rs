use atlas_registry::SourceDescriptor;
use atlas_resilience::CancellationToken;

use crate::artifact::{build_client, download_artifact};
use crate::error::ExtractError;
use crate::extractor::Extractor;
use crate::feature::RawFeature;
use crate::rate_limit::{host_of, HostRateLimiter};
use crate::shapefile_io::read_polygons_from_zip;

/// Census TIGER/Line's HTTPS directory tree
/// (`https://www2.census.gov/geo/tiger/TIGER2020PL/STATE/{fips}_{NAME}/{fips}/tl_2020_{fips}_{layer}.zip`)
/// is a flat per-state zip per layer, no API, no pagination. The source's
/// endpoint template already encodes the fully-formed URL; this extractor
/// just fetches and reads it.
#[derive(Default)]
pub struct TigerFtpExtractor {
    limiter: std::sync::OnceLock<HostRateLimiter>,
}

impl Extractor for TigerFtpExtractor {
    fn extract(&self, source: &SourceDescriptor, state_postal: &str, token: &CancellationToken) -> Result<Vec<RawFeature>, ExtractError> {
        token.check().map_err(|_| ExtractError::Cancelled)?;
        let client = build_client(std::time::Duration::from_secs(180))?;
        let url = source.endpoint_for_state(state_postal);

        self.limiter.get_or_init(HostRateLimiter::polite).wait(&host_of(&url));
        let artifact = download_artifact(&client, &url, true)?;
        let path = artifact.path().ok_or_else(|| ExtractError::MalformedArtifact("expected disk-backed artifact".into()))?;
        read_polygons_from_zip(path, artifact.provenance_stub())
    }
}
