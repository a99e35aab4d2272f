use atlas_registry::{PortalKind, SourceDescriptor};
use atlas_resilience::CancellationToken;

use crate::error::ExtractError;
use crate::feature::RawFeature;

/// Narrow contract every portal-kind extractor implements (spec §3: "download
/// then transform into a provider-neutral feature stream"). Kept deliberately
/// small so the scheduler can treat all portal kinds uniformly.
///
/// `state_postal` fills the `{state}` placeholder in the source's endpoint
/// template; sources that aren't state-partitioned (e.g. a national RDH
/// dataset) ignore it.
pub trait Extractor: Send + Sync {
    fn extract(&self, source: &SourceDescriptor, state_postal: &str, token: &CancellationToken) -> Result<Vec<RawFeature>, ExtractError>;
}

/// Dispatches a [`SourceDescriptor`] to the extractor matching its [`PortalKind`].
pub fn extractor_for(source: &SourceDescriptor) -> Box<dyn Extractor> {
    match source.portal_kind {
        PortalKind::ArcgisRest => Box::new(crate::portal::arcgis_rest::ArcgisRestExtractor::default()),
        PortalKind::ArcgisHub => Box::new(crate::portal::arcgis_hub::ArcgisHubExtractor::default()),
        PortalKind::Socrata => Box::new(crate::portal::socrata::SocrataExtractor::default()),
        PortalKind::Ckan => Box::new(crate::portal::ckan::CkanExtractor::default()),
        PortalKind::OsmOverpass => Box::new(crate::portal::osm_overpass::OverpassExtractor::default()),
        PortalKind::Rdh => Box::new(crate::portal::rdh::RdhExtractor::default()),
        PortalKind::TigerFtp => Box::new(crate::portal::tiger_ftp::TigerFtpExtractor::default()),
        PortalKind::CustomStateGis => Box::new(crate::portal::custom_state_gis::CustomStateGisExtractor::default()),
    }
}
