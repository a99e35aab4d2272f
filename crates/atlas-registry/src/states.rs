/// A single state/territory's identity plus an approximate bounding box used
/// by the geographic validator (spec §4.5) for coarse sanity checking, not
/// survey-grade geometry. Territory boxes deliberately allow values far
/// outside the CONUS envelope.
#[derive(Debug, Clone, Copy)]
pub struct StateInfo {
    pub fips: &'static str,
    pub postal: &'static str,
    pub name: &'static str,
    /// (min_lon, min_lat, max_lon, max_lat), WGS84.
    pub bbox: (f64, f64, f64, f64),
}

macro_rules! state {
    ($fips:literal, $postal:literal, $name:literal, $bbox:expr) => {
        StateInfo { fips: $fips, postal: $postal, name: $name, bbox: $bbox }
    };
}

/// All 50 states + DC + the five populated territories Census tracks
/// (PR, VI, GU, AS, MP).
pub const STATES: &[StateInfo] = &[
    state!("01", "AL", "Alabama", (-88.5, 30.1, -84.8, 35.1)),
    state!("02", "AK", "Alaska", (-179.2, 51.2, -129.9, 71.6)),
    state!("04", "AZ", "Arizona", (-114.9, 31.3, -109.0, 37.1)),
    state!("05", "AR", "Arkansas", (-94.7, 33.0, -89.6, 36.6)),
    state!("06", "CA", "California", (-124.5, 32.4, -114.0, 42.1)),
    state!("08", "CO", "Colorado", (-109.2, 36.9, -102.0, 41.1)),
    state!("09", "CT", "Connecticut", (-73.8, 40.9, -71.7, 42.1)),
    state!("10", "DE", "Delaware", (-75.9, 38.4, -74.9, 39.9)),
    state!("11", "DC", "District of Columbia", (-77.2, 38.7, -76.8, 39.1)),
    state!("12", "FL", "Florida", (-87.7, 24.4, -79.9, 31.1)),
    state!("13", "GA", "Georgia", (-85.7, 30.3, -80.7, 35.1)),
    state!("15", "HI", "Hawaii", (-178.4, 18.8, -154.6, 28.5)),
    state!("16", "ID", "Idaho", (-117.3, 41.9, -110.9, 49.1)),
    state!("17", "IL", "Illinois", (-91.6, 36.9, -87.0, 42.6)),
    state!("18", "IN", "Indiana", (-88.2, 37.7, -84.7, 41.8)),
    state!("19", "IA", "Iowa", (-96.7, 40.3, -90.0, 43.6)),
    state!("20", "KS", "Kansas", (-102.1, 36.9, -94.5, 40.1)),
    state!("21", "KY", "Kentucky", (-89.6, 36.4, -81.9, 39.2)),
    state!("22", "LA", "Louisiana", (-94.1, 28.8, -88.7, 33.1)),
    state!("23", "ME", "Maine", (-71.2, 42.9, -66.8, 47.5)),
    state!("24", "MD", "Maryland", (-79.5, 37.8, -74.9, 39.8)),
    state!("25", "MA", "Massachusetts", (-73.6, 41.1, -69.8, 42.9)),
    state!("26", "MI", "Michigan", (-90.5, 41.6, -82.1, 48.3)),
    state!("27", "MN", "Minnesota", (-97.3, 43.4, -89.4, 49.4)),
    state!("28", "MS", "Mississippi", (-91.7, 30.1, -88.0, 35.1)),
    state!("29", "MO", "Missouri", (-95.9, 35.9, -89.0, 40.7)),
    state!("30", "MT", "Montana", (-116.2, 44.2, -104.0, 49.1)),
    state!("31", "NE", "Nebraska", (-104.2, 39.9, -95.2, 43.1)),
    state!("32", "NV", "Nevada", (-120.1, 34.9, -114.0, 42.1)),
    state!("33", "NH", "New Hampshire", (-72.6, 42.6, -70.6, 45.4)),
    state!("34", "NJ", "New Jersey", (-75.6, 38.8, -73.8, 41.4)),
    state!("35", "NM", "New Mexico", (-109.1, 31.2, -102.9, 37.1)),
    state!("36", "NY", "New York", (-79.9, 40.4, -71.7, 45.1)),
    state!("37", "NC", "North Carolina", (-84.4, 33.7, -75.3, 36.7)),
    state!("38", "ND", "North Dakota", (-104.2, 45.9, -96.4, 49.1)),
    state!("39", "OH", "Ohio", (-84.9, 38.3, -80.4, 42.4)),
    state!("40", "OK", "Oklahoma", (-103.1, 33.5, -94.3, 37.1)),
    state!("41", "OR", "Oregon", (-124.7, 41.9, -116.3, 46.3)),
    state!("42", "PA", "Pennsylvania", (-80.6, 39.6, -74.6, 42.6)),
    state!("44", "RI", "Rhode Island", (-71.9, 41.1, -71.0, 42.1)),
    state!("45", "SC", "South Carolina", (-83.5, 31.8, -78.4, 35.3)),
    state!("46", "SD", "South Dakota", (-104.2, 42.4, -96.3, 46.1)),
    state!("47", "TN", "Tennessee", (-90.4, 34.9, -81.6, 36.8)),
    state!("48", "TX", "Texas", (-106.7, 25.7, -93.4, 36.6)),
    state!("49", "UT", "Utah", (-114.2, 36.9, -108.9, 42.1)),
    state!("50", "VT", "Vermont", (-73.5, 42.6, -71.4, 45.1)),
    state!("51", "VA", "Virginia", (-83.8, 36.5, -75.1, 39.6)),
    state!("53", "WA", "Washington", (-124.9, 45.5, -116.8, 49.1)),
    state!("54", "WV", "West Virginia", (-82.7, 37.1, -77.6, 40.7)),
    state!("55", "WI", "Wisconsin", (-93.0, 42.4, -86.2, 47.1)),
    state!("56", "WY", "Wyoming", (-111.2, 40.9, -104.0, 45.1)),
    state!("72", "PR", "Puerto Rico", (-67.5, 17.8, -65.2, 18.6)),
    state!("78", "VI", "U.S. Virgin Islands", (-65.1, 17.6, -64.5, 18.5)),
    state!("66", "GU", "Guam", (144.5, 13.2, 145.0, 13.7)),
    state!("60", "AS", "American Samoa", (-171.1, -14.6, -168.1, -11.0)),
    state!("69", "MP", "Northern Mariana Islands", (144.8, 14.0, 146.1, 20.6)),
];

/// The nine states that legally run overlapping elementary and secondary
/// school districts over the same territory (spec §4.6 "dual-system" policy).
pub const DUAL_SYSTEM_STATE_FIPS: &[&str] = &["09", "17", "23", "25", "30", "33", "34", "44", "50"];

pub fn is_dual_system_state(fips: &str) -> bool {
    DUAL_SYSTEM_STATE_FIPS.contains(&fips)
}

pub fn by_fips(fips: &str) -> Option<&'static StateInfo> {
    STATES.iter().find(|s| s.fips == fips)
}

pub fn by_postal(postal: &str) -> Option<&'static StateInfo> {
    let upper = postal.to_ascii_uppercase();
    STATES.iter().find(|s| s.postal == upper)
}

/// Is `(lon, lat)` within `fips`'s bounding box, expanded by `tolerance_deg`
/// on every side (spec §4.5: "0.5° tolerance")?
pub fn within_state_bbox(fips: &str, lon: f64, lat: f64, tolerance_deg: f64) -> Option<bool> {
    let state = by_fips(fips)?;
    let (min_lon, min_lat, max_lon, max_lat) = state.bbox;
    Some(
        lon >= min_lon - tolerance_deg
            && lon <= max_lon + tolerance_deg
            && lat >= min_lat - tolerance_deg
            && lat <= max_lat + tolerance_deg,
    )
}
