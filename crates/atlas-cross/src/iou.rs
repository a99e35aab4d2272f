use geo::{BooleanOps, MultiPolygon};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

pub fn severity_for(iou: f64) -> Severity {
    if iou >= 0.99 {
        Severity::Low
    } else if iou >= 0.95 {
        Severity::Medium
    } else if iou >= 0.90 {
        Severity::High
    } else {
        Severity::Critical
    }
}

/// Intersection-over-Union between two boundary geometries (spec §4.7
/// step 3). Uses `geo`'s polygon-clipping boolean ops rather than a
/// grid-sampling approximation, since survey-grade boundaries can have
/// enough thin slivers that sampling misses real disagreement.
pub fn intersection_over_union(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> f64 {
    use geo::Area;

    let intersection = a.intersection(b);
    let union = a.union(b);
    let union_area = union.unsigned_area();
    if union_area <= 0.0 {
        return 0.0;
    }
    (intersection.unsigned_area() / union_area).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    #[test]
    fn identical_polygons_have_iou_1() {
        let poly = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)];
        let mp = MultiPolygon(vec![poly]);
        let iou = intersection_over_union(&mp, &mp);
        assert!((iou - 1.0).abs() < 1e-9);
        assert_eq!(severity_for(iou), Severity::Low);
    }

    #[test]
    fn disjoint_polygons_have_iou_0() {
        let a = MultiPolygon(vec![polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)]]);
        let b = MultiPolygon(vec![polygon![(x: 10.0, y: 10.0), (x: 11.0, y: 10.0), (x: 11.0, y: 11.0), (x: 10.0, y: 11.0)]]);
        assert_eq!(intersection_over_union(&a, &b), 0.0);
        assert_eq!(severity_for(0.0), Severity::Critical);
    }

    #[test]
    fn severity_thresholds() {
        assert_eq!(severity_for(0.995), Severity::Low);
        assert_eq!(severity_for(0.96), Severity::Medium);
        assert_eq!(severity_for(0.91), Severity::High);
        assert_eq!(severity_for(0.5), Severity::Critical);
    }
}
