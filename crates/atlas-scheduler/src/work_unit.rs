use atlas_registry::{states, ExpectedCount, SourceRegistry};

/// One unit of acquisition work: a source, partitioned to a single state
/// (spec §2 "assigns work units (one per source × layer × optional state
/// partition)").
#[derive(Debug, Clone)]
pub struct WorkUnit {
    pub source_id: String,
    pub endpoint: String,
    pub state_postal: String,
    pub state_fips: String,
}

/// Expand a registry into its full work-unit list. Every source is
/// partitioned per state it could plausibly cover; extractors that ignore
/// the state code (a handful of national single-dataset portals) simply
/// re-fetch the same endpoint for every partition, which the circuit
/// breaker and per-host rate limiter absorb without extra network cost once
/// a result is cached by the caller.
pub fn work_units_for(registry: &SourceRegistry) -> Vec<WorkUnit> {
    let mut units = Vec::new();
    for source in registry.sources() {
        let state_fips_list: Vec<&'static str> = match &source.expected_feature_count {
            ExpectedCount::PerState(map) => map.keys().map(String::as_str).collect(),
            ExpectedCount::Fixed(_) => states::STATES.iter().map(|s| s.fips).collect(),
        };
        for fips in state_fips_list {
            let Some(state) = states::by_fips(fips) else { continue };
            units.push(WorkUnit {
                source_id: source.id.clone(),
                endpoint: source.endpoint_for_state(state.postal),
                state_postal: state.postal.to_string(),
                state_fips: state.fips.to_string(),
            });
        }
    }
    units
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_registry::{AuthorityTier, Layer, SourceDescriptor};
    use std::collections::BTreeMap;

    #[test]
    fn per_state_source_only_expands_listed_states() {
        let mut expected = BTreeMap::new();
        expected.insert("56".to_string(), 1u32);
        expected.insert("06".to_string(), 52u32);

        let registry = SourceRegistry::builder()
            .register(SourceDescriptor::new(
                "state-cd",
                "https://example.test/{state}/cd.zip",
                atlas_registry::PortalKind::CustomStateGis,
                AuthorityTier::StateAgency,
                Layer::CongressionalDistrict,
                ExpectedCount::PerState(expected),
                2020,
                "public-domain",
            ))
            .build();

        let units = work_units_for(&registry);
        assert_eq!(units.len(), 2);
        assert!(units.iter().any(|u| u.state_postal == "WY"));
        assert!(units.iter().any(|u| u.state_postal == "CA"));
    }

    #[test]
    fn fixed_count_source_expands_every_state() {
        let registry = SourceRegistry::builder()
            .register(SourceDescriptor::new(
                "tiger-cd",
                "https://www2.census.gov/geo/tiger/TIGER2020PL/STATE/{state}/cd.zip",
                atlas_registry::PortalKind::TigerFtp,
                AuthorityTier::FederalCensus,
                Layer::CongressionalDistrict,
                ExpectedCount::Fixed(435),
                2020,
                "public-domain",
            ))
            .build();

        let units = work_units_for(&registry);
        assert_eq!(units.len(), states::STATES.len());
    }
}
