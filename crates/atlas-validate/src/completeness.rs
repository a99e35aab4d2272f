use std::collections::BTreeSet;

use atlas_registry::{CanonicalGeoidTable, Layer};
use geo::{BooleanOps, MultiPolygon};
use serde::Serialize;

/// IoU at or above this is "identical geometry" for dual-system overlap
/// purposes (spec §4.6 scenario #3), not merely similar.
const OVERLAP_IOU_THRESHOLD: f64 = 0.99;

fn overlap_iou(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> f64 {
    use geo::Area;

    let union_area = a.union(b).unsigned_area();
    if union_area <= 0.0 {
        return 0.0;
    }
    (a.intersection(b).unsigned_area() / union_area).clamp(0.0, 1.0)
}

#[derive(Debug, Clone)]
pub struct CompletenessReport {
    pub expected: usize,
    pub actual: usize,
    pub missing: BTreeSet<String>,
    pub extra: BTreeSet<String>,
    pub percentage: f64,
    pub valid: bool,
}

/// Diff the observed GEOID set against the canonical table for
/// `(layer, state_fips)` (spec §4.6). `max_invalid_ratio` mirrors the
/// topology gate's tolerance knob: `0.0` requires a perfect match, matching
/// the default halt-on-completeness behavior.
pub fn check_completeness(table: &CanonicalGeoidTable, layer: Layer, state_fips: &str, actual_geoids: &BTreeSet<String>, max_invalid_ratio: f64) -> CompletenessReport {
    let canonical = table.get(layer, state_fips).map(|ids| (*ids).clone()).unwrap_or_default();
    let missing: BTreeSet<String> = canonical.difference(actual_geoids).cloned().collect();
    let extra: BTreeSet<String> = actual_geoids.difference(&canonical).cloned().collect();

    let expected = canonical.len();
    let actual = actual_geoids.len();
    let percentage = if expected == 0 { 100.0 } else { 100.0 * (expected - missing.len().min(expected)) as f64 / expected as f64 };

    let invalid = missing.len() + extra.len();
    let denom = expected.max(1);
    let invalid_ratio = invalid as f64 / denom as f64;
    let valid = invalid_ratio <= max_invalid_ratio;

    CompletenessReport { expected, actual, missing, extra, percentage, valid }
}

/// Is an identical-geometry overlap between `a` and `b` sanctioned by the
/// dual-system policy (spec §4.6)?
pub fn overlap_is_sanctioned(a_layer: Layer, b_layer: Layer, state_fips: &str) -> bool {
    atlas_registry::states::is_dual_system_state(state_fips) && Layer::is_dual_system_pair(a_layer, b_layer)
}

/// An unsanctioned same-state, same-geometry overlap between two boundaries
/// of different layers (spec §4.6 "all other type-pair overlaps are
/// errors", testable property #9).
#[derive(Debug, Clone, Serialize)]
pub struct OverlapError {
    pub state_fips: String,
    pub a_layer: Layer,
    pub b_layer: Layer,
    pub a_geoid: String,
    pub b_geoid: String,
    pub iou: f64,
}

impl std::fmt::Display for OverlapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unsanctioned overlap in state {}: {} ({}) overlaps {} ({}) at iou={:.3}",
            self.state_fips, self.a_layer, self.a_geoid, self.b_layer, self.b_geoid, self.iou
        )
    }
}

/// Compare every boundary in `a` against every boundary in `b` (same state,
/// different layers) and report any pair whose geometry is close enough to
/// count as an identical-geometry overlap, unless the dual-system policy
/// sanctions that layer pair in this state (spec §4.6, §8.3 scenario #3:
/// identical ELSD+SCSD geometry in IL produces no error, the same input in
/// TX produces an overlap error).
pub fn detect_dual_system_overlaps(
    state_fips: &str,
    a_layer: Layer,
    a_boundaries: &[(String, MultiPolygon<f64>)],
    b_layer: Layer,
    b_boundaries: &[(String, MultiPolygon<f64>)],
) -> Vec<OverlapError> {
    if overlap_is_sanctioned(a_layer, b_layer, state_fips) {
        return Vec::new();
    }

    let mut errors = Vec::new();
    for (a_geoid, a_geometry) in a_boundaries {
        for (b_geoid, b_geometry) in b_boundaries {
            let iou = overlap_iou(a_geometry, b_geometry);
            if iou >= OVERLAP_IOU_THRESHOLD {
                errors.push(OverlapError {
                    state_fips: state_fips.to_string(),
                    a_layer,
                    b_layer,
                    a_geoid: a_geoid.clone(),
                    b_geoid: b_geoid.clone(),
                    iou,
                });
            }
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn unit_square() -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)]])
    }

    #[test]
    fn identical_geometry_in_dual_system_state_is_not_an_overlap_error() {
        let elsd = vec![("1700001".to_string(), unit_square())];
        let scsd = vec![("1700002".to_string(), unit_square())];
        let errors = detect_dual_system_overlaps(
            "17",
            Layer::SchoolDistrictElementary,
            &elsd,
            Layer::SchoolDistrictSecondary,
            &scsd,
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn identical_geometry_outside_dual_system_state_is_an_overlap_error() {
        let elsd = vec![("4800001".to_string(), unit_square())];
        let scsd = vec![("4800002".to_string(), unit_square())];
        let errors = detect_dual_system_overlaps(
            "48",
            Layer::SchoolDistrictElementary,
            &elsd,
            Layer::SchoolDistrictSecondary,
            &scsd,
        );
        assert_eq!(errors.len(), 1);
        assert!(errors[0].iou >= OVERLAP_IOU_THRESHOLD);
    }

    #[test]
    fn disjoint_geometry_never_reports_overlap() {
        let far_away = MultiPolygon(vec![polygon![(x: 50.0, y: 50.0), (x: 51.0, y: 50.0), (x: 51.0, y: 51.0), (x: 50.0, y: 51.0)]]);
        let elsd = vec![("4800001".to_string(), unit_square())];
        let scsd = vec![("4800002".to_string(), far_away)];
        let errors = detect_dual_system_overlaps(
            "48",
            Layer::SchoolDistrictElementary,
            &elsd,
            Layer::SchoolDistrictSecondary,
            &scsd,
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn perfect_match_is_valid() {
        let table = CanonicalGeoidTable::new();
        let wy: BTreeSet<String> = ["5601".to_string()].into_iter().collect();
        let report = check_completeness(&table, Layer::CongressionalDistrict, "56", &wy, 0.0);
        assert!(report.valid);
        assert!(report.missing.is_empty());
        assert!(report.extra.is_empty());
        assert_eq!(report.percentage, 100.0);
    }

    #[test]
    fn missing_geoid_drops_percentage_and_invalidates() {
        let table = CanonicalGeoidTable::new();
        let actual: BTreeSet<String> = BTreeSet::new();
        let report = check_completeness(&table, Layer::CongressionalDistrict, "56", &actual, 0.0);
        assert!(!report.valid);
        assert_eq!(report.missing.len(), 1);
        assert_eq!(report.percentage, 0.0);
    }

    #[test]
    fn extra_geoid_flagged() {
        let table = CanonicalGeoidTable::new();
        let actual: BTreeSet<String> = ["5601".to_string(), "5699".to_string()].into_iter().collect();
        let report = check_completeness(&table, Layer::CongressionalDistrict, "56", &actual, 0.0);
        assert!(report.extra.contains("5699"));
    }

    #[test]
    fn dual_system_overlap_sanctioned_in_listed_states() {
        assert!(overlap_is_sanctioned(Layer::SchoolDistrictElementary, Layer::SchoolDistrictSecondary, "09"));
        assert!(!overlap_is_sanctioned(Layer::SchoolDistrictElementary, Layer::SchoolDistrictSecondary, "48"));
        assert!(!overlap_is_sanctioned(Layer::County, Layer::Place, "09"));
    }
}
