/// Strip separators, uppercase, and prefix the state FIPS if the raw value
/// doesn't already start with it (spec §4.7: "normalized GEOID").
pub fn normalize_geoid(raw: &str, state_fips: &str) -> String {
    let cleaned: String = raw.chars().filter(|c| c.is_ascii_alphanumeric()).collect::<String>().to_ascii_uppercase();
    if cleaned.starts_with(state_fips) {
        cleaned
    } else {
        format!("{state_fips}{cleaned}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_separators_and_uppercases() {
        assert_eq!(normalize_geoid("06-037", "06"), "06037");
        assert_eq!(normalize_geoid("ab12", "06"), "06AB12");
    }

    #[test]
    fn leaves_prefixed_geoid_untouched() {
        assert_eq!(normalize_geoid("06037", "06"), "06037");
    }
}
