use geo::{Centroid, MultiPolygon};

const STATE_BBOX_TOLERANCE_DEG: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeographicVerdict {
    WithinState,
    LikelyWrongState,
    EmptyGeometry,
}

/// Centroid-in-bbox sanity check (spec §4.5 "Geographic"). Not survey-grade;
/// its only job is catching a feature that landed in the wrong state's set
/// entirely.
pub fn check_within_state(geometry: &MultiPolygon<f64>, state_fips: &str) -> GeographicVerdict {
    let Some(centroid) = geometry.centroid() else {
        return GeographicVerdict::EmptyGeometry;
    };
    match atlas_registry::states::within_state_bbox(state_fips, centroid.x(), centroid.y(), STATE_BBOX_TOLERANCE_DEG) {
        Some(true) => GeographicVerdict::WithinState,
        Some(false) => GeographicVerdict::LikelyWrongState,
        None => GeographicVerdict::LikelyWrongState,
    }
}
