use std::path::Path;

use atlas_registry::{SourceDescriptor, SourceRegistry};
use serde::Deserialize;

/// An array-of-tables source file: `[[source]]` entries deserialize
/// straight into [`SourceDescriptor`], which already carries serde impls
/// for config round-tripping.
#[derive(Debug, Default, Deserialize)]
struct SourceList {
    #[serde(default)]
    source: Vec<SourceDescriptor>,
}

pub fn load_registry(path: Option<&Path>) -> anyhow::Result<SourceRegistry> {
    let mut builder = SourceRegistry::builder();
    if let Some(path) = path {
        let contents = std::fs::read_to_string(path)?;
        let list: SourceList = toml::from_str(&contents)?;
        for source in list.source {
            builder = builder.register(source);
        }
    }
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_yields_empty_registry() {
        let registry = load_registry(None).unwrap();
        assert_eq!(registry.sources().count(), 0);
    }

    #[test]
    fn loads_sources_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sources.toml");
        std::fs::write(
            &path,
            r#"
            [[source]]
            id = "tiger-cd"
            endpoint_template = "https://www2.census.gov/geo/tiger/TIGER2020PL/STATE/{state}/cd.zip"
            portal_kind = "tiger-ftp"
            authority_tier = "federal-census"
            layer = "congressional_district"
            expected_feature_count = 435
            vintage_year = 2020
            licence = "public-domain"
            "#,
        )
        .unwrap();
        let registry = load_registry(Some(&path)).unwrap();
        assert_eq!(registry.sources().count(), 1);
        assert!(registry.get("tiger-cd").is_some());
    }
}
