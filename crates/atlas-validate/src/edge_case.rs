/// Classification a candidate layer falls into after the rule cascade
/// (spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeCaseClass {
    TruePositive,
    FalsePositiveService,
    FalsePositiveProperty,
    FalsePositiveInfra,
    FalsePositiveCensus,
    FalsePositiveSchool,
    AmbiguousBos,
    AmbiguousWard,
    HistoricalVersion,
    AggregatedData,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeCaseAction {
    Accept,
    Reject,
    NeedsCityContext,
    NeedsManualReview,
}

#[derive(Debug, Clone)]
pub struct EdgeCaseVerdict {
    pub class: EdgeCaseClass,
    pub action: EdgeCaseAction,
}

/// Inputs to the cascade: everything the rules inspect (spec §4.4: "layer
/// name, URL path, vintage year... and feature count").
pub struct EdgeCaseInput<'a> {
    pub layer_name: &'a str,
    pub url_path: &'a str,
    pub vintage_year: u16,
    pub current_year: u16,
    pub feature_count: u32,
}

/// Wall-clock year, for [`EdgeCaseInput::current_year`] callers that don't
/// already have a reference year on hand.
pub fn current_year() -> u16 {
    use chrono::Datelike;
    chrono::Utc::now().year() as u16
}

const HISTORICAL_AGE_YEARS: u16 = 5;
const MUNICIPAL_COUNCIL_REJECT_COUNT: u32 = 100;
const MUNICIPAL_COUNCIL_WARN_COUNT: u32 = 60;

/// Round-number feature counts portals hand back when they mean "we don't
/// actually know", not a real feature count (spec §9 open question). Must
/// never drive a reject, only a flag for manual review.
const PLACEHOLDER_FEATURE_COUNTS: &[u32] = &[1000, 2000];

/// Run the rule cascade in priority order: the first matching rule wins
/// (spec §4.4's "cascade" — later rules never override an earlier
/// classification).
pub fn classify(input: &EdgeCaseInput) -> EdgeCaseVerdict {
    let name_lower = input.layer_name.to_ascii_lowercase();
    let path_lower = input.url_path.to_ascii_lowercase();

    if name_lower.contains("fire") || name_lower.contains("police") || name_lower.contains("ems") || path_lower.contains("/service_area") {
        return EdgeCaseVerdict { class: EdgeCaseClass::FalsePositiveService, action: EdgeCaseAction::Reject };
    }
    if name_lower.contains("parcel") || name_lower.contains("zoning") || path_lower.contains("/cadastral") {
        return EdgeCaseVerdict { class: EdgeCaseClass::FalsePositiveProperty, action: EdgeCaseAction::Reject };
    }
    if name_lower.contains("water") || name_lower.contains("sewer") || name_lower.contains("utility") || name_lower.contains("infrastructure") {
        return EdgeCaseVerdict { class: EdgeCaseClass::FalsePositiveInfra, action: EdgeCaseAction::Reject };
    }
    if name_lower.contains("census tract") || name_lower.contains("block group") || path_lower.contains("/tiger") && name_lower.contains("tract") {
        return EdgeCaseVerdict { class: EdgeCaseClass::FalsePositiveCensus, action: EdgeCaseAction::Reject };
    }
    if name_lower.contains("school") && !name_lower.contains("council") {
        return EdgeCaseVerdict { class: EdgeCaseClass::FalsePositiveSchool, action: EdgeCaseAction::Reject };
    }
    if name_lower.contains("board of supervisors") || name_lower.contains("bos district") {
        return EdgeCaseVerdict { class: EdgeCaseClass::AmbiguousBos, action: EdgeCaseAction::NeedsCityContext };
    }
    if name_lower.contains("ward") && name_lower.contains("precinct") {
        return EdgeCaseVerdict { class: EdgeCaseClass::AmbiguousWard, action: EdgeCaseAction::NeedsManualReview };
    }
    if input.current_year.saturating_sub(input.vintage_year) >= HISTORICAL_AGE_YEARS {
        return EdgeCaseVerdict { class: EdgeCaseClass::HistoricalVersion, action: EdgeCaseAction::NeedsManualReview };
    }
    if name_lower.contains("council") {
        if PLACEHOLDER_FEATURE_COUNTS.contains(&input.feature_count) {
            return EdgeCaseVerdict { class: EdgeCaseClass::Unknown, action: EdgeCaseAction::NeedsManualReview };
        }
        if input.feature_count > MUNICIPAL_COUNCIL_REJECT_COUNT {
            return EdgeCaseVerdict { class: EdgeCaseClass::AggregatedData, action: EdgeCaseAction::Reject };
        }
        if input.feature_count > MUNICIPAL_COUNCIL_WARN_COUNT {
            return EdgeCaseVerdict { class: EdgeCaseClass::AggregatedData, action: EdgeCaseAction::NeedsManualReview };
        }
        return EdgeCaseVerdict { class: EdgeCaseClass::TruePositive, action: EdgeCaseAction::Accept };
    }

    EdgeCaseVerdict { class: EdgeCaseClass::Unknown, action: EdgeCaseAction::NeedsManualReview }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_input() -> EdgeCaseInput<'static> {
        EdgeCaseInput { layer_name: "City Council Districts", url_path: "/arcgis/rest/services/council", vintage_year: 2023, current_year: 2026, feature_count: 9 }
    }

    #[test]
    fn true_positive_council_layer() {
        let verdict = classify(&base_input());
        assert_eq!(verdict.class, EdgeCaseClass::TruePositive);
        assert_eq!(verdict.action, EdgeCaseAction::Accept);
    }

    #[test]
    fn service_area_is_rejected() {
        let input = EdgeCaseInput { layer_name: "Fire Service Area", ..base_input() };
        assert_eq!(classify(&input).class, EdgeCaseClass::FalsePositiveService);
    }

    #[test]
    fn large_feature_count_is_aggregated_reject() {
        let input = EdgeCaseInput { feature_count: 150, ..base_input() };
        let verdict = classify(&input);
        assert_eq!(verdict.class, EdgeCaseClass::AggregatedData);
        assert_eq!(verdict.action, EdgeCaseAction::Reject);
    }

    #[test]
    fn moderate_feature_count_needs_review() {
        let input = EdgeCaseInput { feature_count: 75, ..base_input() };
        assert_eq!(classify(&input).action, EdgeCaseAction::NeedsManualReview);
    }

    #[test]
    fn placeholder_feature_count_is_unknown_not_rejected() {
        let input = EdgeCaseInput { feature_count: 1000, ..base_input() };
        let verdict = classify(&input);
        assert_eq!(verdict.class, EdgeCaseClass::Unknown);
        assert_eq!(verdict.action, EdgeCaseAction::NeedsManualReview);

        let input = EdgeCaseInput { feature_count: 2000, ..base_input() };
        assert_eq!(classify(&input).class, EdgeCaseClass::Unknown);
    }

    #[test]
    fn old_vintage_is_historical() {
        let input = EdgeCaseInput { layer_name: "Downtown Districts", vintage_year: 2015, ..base_input() };
        assert_eq!(classify(&input).class, EdgeCaseClass::HistoricalVersion);
    }
}
