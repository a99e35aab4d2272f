use atlas_extract::PropertyBag;
use atlas_registry::Layer;

/// Property keys tried in order, per layer, when hunting for the
/// already-assigned GEOID (spec §4.8: "extract layer-appropriate GEOID from
/// properties"). Portals disagree wildly on casing and suffixing (`GEOID`,
/// `GEOID20`, `GEOID10`), so every candidate is checked case-insensitively.
fn candidate_keys(layer: Layer) -> &'static [&'static str] {
    match layer {
        Layer::CongressionalDistrict => &["GEOID", "GEOID20", "CD116FP", "CDFIPS"],
        Layer::StateLegUpper => &["GEOID", "GEOID20", "SLDUST"],
        Layer::StateLegLower => &["GEOID", "GEOID20", "SLDLST"],
        Layer::County => &["GEOID", "GEOID20", "COUNTYFP"],
        Layer::SchoolDistrictUnified => &["GEOID", "UNSDLEA", "LEAID"],
        Layer::SchoolDistrictElementary => &["GEOID", "ELSDLEA", "LEAID"],
        Layer::SchoolDistrictSecondary => &["GEOID", "SCSDLEA", "LEAID"],
        Layer::VotingTabulationDistrict => &["GEOID", "GEOID20", "VTDST"],
        Layer::Place => &["GEOID", "GEOID20", "PLACEFP"],
        Layer::MunicipalCouncilDistrict => &["GEOID", "DISTRICT", "WARD", "COUNCIL_DISTRICT"],
        Layer::Aiannh => &["GEOID", "GEOID20", "AIANNHCE"],
        Layer::SpecialDistrict => &["GEOID", "DISTRICT_ID"],
    }
}

/// Resolve a canonical GEOID for a raw feature: first from its own
/// properties, falling back to a synthesized `{state_fips}{sequence:04}`ID
/// when the source never assigned one (spec §4.8). The caller is
/// responsible for logging the synthesis, since only it knows the source
/// context worth attaching to the log line.
pub fn resolve_geoid(properties: &PropertyBag, layer: Layer, state_fips: &str, sequence: u32) -> (String, bool) {
    for key in candidate_keys(layer) {
        if let Some(value) = properties.get_ci(key) {
            if let Some(s) = value.as_str() {
                if !s.trim().is_empty() {
                    return (s.trim().to_string(), false);
                }
            } else if let Some(n) = value.as_i64() {
                return (format!("{state_fips}{n:0width$}", width = synthetic_width(layer)), false);
            }
        }
    }
    (format!("{state_fips}{sequence:0width$}", width = synthetic_width(layer)), true)
}

fn synthetic_width(layer: Layer) -> usize {
    match layer {
        Layer::CongressionalDistrict => 2,
        Layer::StateLegUpper | Layer::StateLegLower | Layer::County => 3,
        _ => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_extract::PropertyValue;

    #[test]
    fn prefers_existing_geoid_property() {
        let mut bag = PropertyBag::default();
        bag.insert("GEOID20", PropertyValue::Str("0612".into()));
        let (id, synthesized) = resolve_geoid(&bag, Layer::CongressionalDistrict, "06", 7);
        assert_eq!(id, "0612");
        assert!(!synthesized);
    }

    #[test]
    fn falls_back_to_synthesized_id() {
        let bag = PropertyBag::default();
        let (id, synthesized) = resolve_geoid(&bag, Layer::CongressionalDistrict, "06", 7);
        assert_eq!(id, "0607");
        assert!(synthesized);
    }

    #[test]
    fn case_insensitive_lookup() {
        let mut bag = PropertyBag::default();
        bag.insert("geoid", PropertyValue::Str("06037".into()));
        let (id, _) = resolve_geoid(&bag, Layer::County, "06", 1);
        assert_eq!(id, "06037");
    }
}
