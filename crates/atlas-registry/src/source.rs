use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::layer::Layer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PortalKind {
    ArcgisRest,
    ArcgisHub,
    Socrata,
    Ckan,
    OsmOverpass,
    Rdh,
    TigerFtp,
    CustomStateGis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthorityTier {
    ThirdPartyAggregator,
    Municipal,
    CountyAgency,
    StateAgency,
    FederalCensus,
}

impl AuthorityTier {
    /// Higher = more authoritative (spec §3, Glossary "Authority tier").
    pub fn rank(&self) -> u8 {
        match self {
            AuthorityTier::ThirdPartyAggregator => 0,
            AuthorityTier::Municipal => 1,
            AuthorityTier::CountyAgency => 2,
            AuthorityTier::StateAgency => 3,
            AuthorityTier::FederalCensus => 4,
        }
    }
}

/// A source's expected feature count may be a single number or a per-state
/// mapping (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExpectedCount {
    Fixed(u32),
    PerState(BTreeMap<String, u32>),
}

impl ExpectedCount {
    pub fn for_state(&self, state_fips: &str) -> Option<u32> {
        match self {
            ExpectedCount::Fixed(n) => Some(*n),
            ExpectedCount::PerState(map) => map.get(state_fips).copied(),
        }
    }
}

/// Immutable once registered (spec §3). Construct via [`SourceDescriptor::new`]
/// and hand to [`crate::SourceRegistry::register`]; there is no mutation API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub id: String,
    pub endpoint_template: String,
    pub portal_kind: PortalKind,
    pub authority_tier: AuthorityTier,
    pub layer: Layer,
    pub expected_feature_count: ExpectedCount,
    pub vintage_year: u16,
    pub licence: String,
}

impl SourceDescriptor {
    pub fn new(
        id: impl Into<String>,
        endpoint_template: impl Into<String>,
        portal_kind: PortalKind,
        authority_tier: AuthorityTier,
        layer: Layer,
        expected_feature_count: ExpectedCount,
        vintage_year: u16,
        licence: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            endpoint_template: endpoint_template.into(),
            portal_kind,
            authority_tier,
            layer,
            expected_feature_count,
            vintage_year,
            licence: licence.into(),
        }
    }

    pub fn endpoint_for_state(&self, state_postal: &str) -> String {
        self.endpoint_template.replace("{state}", &state_postal.to_ascii_lowercase())
    }
}
