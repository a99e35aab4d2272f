use regex::Regex;
use serde::{de::Error as DeError, Deserialize, Deserializer, Serialize, Serializer};

/// The enumerated set of boundary layers the catalog tracks (spec §3, §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    CongressionalDistrict,
    StateLegUpper,
    StateLegLower,
    County,
    SchoolDistrictUnified,
    SchoolDistrictElementary,
    SchoolDistrictSecondary,
    VotingTabulationDistrict,
    Place,
    MunicipalCouncilDistrict,
    Aiannh,
    SpecialDistrict,
}

impl Layer {
    pub const ALL: [Layer; 12] = [
        Layer::CongressionalDistrict,
        Layer::StateLegUpper,
        Layer::StateLegLower,
        Layer::County,
        Layer::SchoolDistrictUnified,
        Layer::SchoolDistrictElementary,
        Layer::SchoolDistrictSecondary,
        Layer::VotingTabulationDistrict,
        Layer::Place,
        Layer::MunicipalCouncilDistrict,
        Layer::Aiannh,
        Layer::SpecialDistrict,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::CongressionalDistrict => "congressional_district",
            Layer::StateLegUpper => "state_leg_upper",
            Layer::StateLegLower => "state_leg_lower",
            Layer::County => "county",
            Layer::SchoolDistrictUnified => "school_district_unified",
            Layer::SchoolDistrictElementary => "school_district_elementary",
            Layer::SchoolDistrictSecondary => "school_district_secondary",
            Layer::VotingTabulationDistrict => "vtd",
            Layer::Place => "place",
            Layer::MunicipalCouncilDistrict => "municipal_council_district",
            Layer::Aiannh => "aiannh",
            Layer::SpecialDistrict => "special_district",
        }
    }

    /// GEOID regex per the layer-specific format table in spec §4.6.
    /// `SS` = 2-digit state FIPS throughout.
    pub fn geoid_pattern(&self) -> &'static str {
        match self {
            Layer::CongressionalDistrict => r"^\d{2}\d{2}$", // SSDD
            Layer::StateLegUpper | Layer::StateLegLower => r"^\d{2}\d{3}$", // SSDDD
            Layer::County => r"^\d{2}\d{3}$", // SSCCC
            Layer::SchoolDistrictUnified
            | Layer::SchoolDistrictElementary
            | Layer::SchoolDistrictSecondary => r"^\d{2}\d{5}$", // SSGGGGG
            Layer::Place => r"^\d{2}\d{5}$", // SSGGGGG
            Layer::VotingTabulationDistrict => r"^\d{2}\d{3}\d{6,}$", // SSCCCGGGGGG (variable tail)
            Layer::MunicipalCouncilDistrict => r"^\d{2}[A-Za-z0-9\-]{1,12}$",
            Layer::Aiannh | Layer::SpecialDistrict => r"^[A-Za-z0-9]{2,16}$", // variable
        }
    }

    pub fn geoid_regex(&self) -> Regex {
        Regex::new(self.geoid_pattern()).expect("layer geoid patterns are compile-time constants")
    }

    pub fn matches_geoid(&self, id: &str) -> bool {
        self.geoid_regex().is_match(id)
    }

    /// Inverse of [`Layer::as_str`], used by the (de)serialization impls
    /// below and by anything parsing a layer tag out of a config file.
    pub fn from_tag(s: &str) -> Option<Layer> {
        Layer::ALL.into_iter().find(|l| l.as_str() == s)
    }

    /// Whether two layers in the same state are permitted to share
    /// identical geometry without being flagged by the cross-validator
    /// (spec §4.6 dual-system policy is the only sanctioned overlap; this
    /// just identifies the ELSD/SCSD pair the policy applies to).
    pub fn is_dual_system_pair(a: Layer, b: Layer) -> bool {
        matches!(
            (a, b),
            (Layer::SchoolDistrictElementary, Layer::SchoolDistrictSecondary)
                | (Layer::SchoolDistrictSecondary, Layer::SchoolDistrictElementary)
        )
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Layer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Layer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Layer::from_tag(&tag).ok_or_else(|| DeError::custom(format!("unknown layer tag: {tag}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn congressional_district_pattern() {
        assert!(Layer::CongressionalDistrict.matches_geoid("0612"));
        assert!(Layer::CongressionalDistrict.matches_geoid("5601"));
        assert!(!Layer::CongressionalDistrict.matches_geoid("06012"));
    }

    #[test]
    fn county_pattern() {
        assert!(Layer::County.matches_geoid("06037"));
        assert!(!Layer::County.matches_geoid("0603"));
    }

    #[test]
    fn school_district_pattern() {
        assert!(Layer::SchoolDistrictUnified.matches_geoid("0600001"));
    }

    #[test]
    fn serde_round_trips_through_as_str_tag() {
        let json = serde_json::to_string(&Layer::VotingTabulationDistrict).unwrap();
        assert_eq!(json, "\"vtd\"");
        let back: Layer = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Layer::VotingTabulationDistrict);
        assert!(serde_json::from_str::<Layer>("\"not_a_layer\"").is_err());
    }

    #[test]
    fn dual_system_pair_detection() {
        assert!(Layer::is_dual_system_pair(
            Layer::SchoolDistrictElementary,
            Layer::SchoolDistrictSecondary
        ));
        assert!(!Layer::is_dual_system_pair(Layer::County, Layer::Place));
    }
}
