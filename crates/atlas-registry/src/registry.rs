use std::collections::BTreeMap;

use crate::canonical::CanonicalGeoidTable;
use crate::layer::Layer;
use crate::source::SourceDescriptor;

/// Read-only after initialization (spec §5: "the source registry is
/// read-only after initialization"). Built once via [`SourceRegistryBuilder`].
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    sources: BTreeMap<String, SourceDescriptor>,
    canonical: CanonicalGeoidTable,
}

impl SourceRegistry {
    pub fn builder() -> SourceRegistryBuilder {
        SourceRegistryBuilder::default()
    }

    pub fn sources(&self) -> impl Iterator<Item = &SourceDescriptor> {
        self.sources.values()
    }

    pub fn sources_for_layer(&self, layer: Layer) -> impl Iterator<Item = &SourceDescriptor> {
        self.sources.values().filter(move |s| s.layer == layer)
    }

    pub fn get(&self, id: &str) -> Option<&SourceDescriptor> {
        self.sources.get(id)
    }

    pub fn canonical(&self) -> &CanonicalGeoidTable {
        &self.canonical
    }
}

#[derive(Debug, Default)]
pub struct SourceRegistryBuilder {
    sources: BTreeMap<String, SourceDescriptor>,
    canonical: Option<CanonicalGeoidTable>,
}

impl SourceRegistryBuilder {
    pub fn register(mut self, source: SourceDescriptor) -> Self {
        self.sources.insert(source.id.clone(), source);
        self
    }

    pub fn with_canonical_table(mut self, table: CanonicalGeoidTable) -> Self {
        self.canonical = Some(table);
        self
    }

    pub fn build(self) -> SourceRegistry {
        SourceRegistry {
            sources: self.sources,
            canonical: self.canonical.unwrap_or_else(CanonicalGeoidTable::new),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{AuthorityTier, ExpectedCount, PortalKind};

    #[test]
    fn register_and_lookup() {
        let registry = SourceRegistry::builder()
            .register(SourceDescriptor::new(
                "tiger-cd",
                "https://www2.census.gov/geo/tiger/TIGER2020PL/STATE/{state}/cd.zip",
                PortalKind::TigerFtp,
                AuthorityTier::FederalCensus,
                Layer::CongressionalDistrict,
                ExpectedCount::Fixed(435),
                2020,
                "public-domain",
            ))
            .build();

        assert!(registry.get("tiger-cd").is_some());
        assert_eq!(registry.sources_for_layer(Layer::CongressionalDistrict).count(), 1);
    }
}
