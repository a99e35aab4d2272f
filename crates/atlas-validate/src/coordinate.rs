use geo::MultiPolygon;

/// Continental US envelope, expanded 0.5° (spec §4.5 "Coordinates"). Anything
/// outside this band is flagged suspicious but not rejected outright —
/// territories (PR, GU, VI, AS, MP) legitimately fall outside it.
const CONUS_BBOX: (f64, f64, f64, f64) = (-125.0, 24.0, -66.0, 49.5);
const CONUS_TOLERANCE_DEG: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateIssue {
    NonFinite,
    OutOfWgs84Range,
    OutsideConusSuspicious,
}

#[derive(Debug, Clone, Default)]
pub struct CoordinateReport {
    pub issues: Vec<CoordinateIssue>,
}

impl CoordinateReport {
    pub fn is_valid(&self) -> bool {
        !self.issues.iter().any(|i| matches!(i, CoordinateIssue::NonFinite | CoordinateIssue::OutOfWgs84Range))
    }
}

/// `allow_outside_conus` should be set for territory states; the flag is
/// otherwise only advisory, never a hard failure (spec §4.5: "flagged
/// suspicious").
pub fn check_coordinates(geometry: &MultiPolygon<f64>, allow_outside_conus: bool) -> CoordinateReport {
    let mut report = CoordinateReport::default();
    let (min_lon, min_lat, max_lon, max_lat) = CONUS_BBOX;

    for polygon in &geometry.0 {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
            for coord in &ring.0 {
                if !coord.x.is_finite() || !coord.y.is_finite() {
                    report.issues.push(CoordinateIssue::NonFinite);
                    continue;
                }
                if !(-180.0..=180.0).contains(&coord.x) || !(-90.0..=90.0).contains(&coord.y) {
                    report.issues.push(CoordinateIssue::OutOfWgs84Range);
                    continue;
                }
                if !allow_outside_conus
                    && (coord.x < min_lon - CONUS_TOLERANCE_DEG
                        || coord.x > max_lon + CONUS_TOLERANCE_DEG
                        || coord.y < min_lat - CONUS_TOLERANCE_DEG
                        || coord.y > max_lat + CONUS_TOLERANCE_DEG)
                {
                    report.issues.push(CoordinateIssue::OutsideConusSuspicious);
                }
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    #[test]
    fn valid_conus_coordinates() {
        let poly = polygon![(x: -100.0, y: 40.0), (x: -99.0, y: 40.0), (x: -99.0, y: 41.0), (x: -100.0, y: 41.0)];
        let report = check_coordinates(&MultiPolygon(vec![poly]), false);
        assert!(report.is_valid());
        assert!(report.issues.is_empty());
    }

    #[test]
    fn out_of_range_latitude_rejected() {
        let poly = polygon![(x: -100.0, y: 95.0), (x: -99.0, y: 40.0), (x: -99.0, y: 41.0)];
        let report = check_coordinates(&MultiPolygon(vec![poly]), false);
        assert!(!report.is_valid());
        assert!(report.issues.contains(&CoordinateIssue::OutOfWgs84Range));
    }

    #[test]
    fn territory_allows_outside_conus() {
        let poly = polygon![(x: -66.5, y: 18.2), (x: -66.4, y: 18.2), (x: -66.4, y: 18.3)]; // Puerto Rico
        let report = check_coordinates(&MultiPolygon(vec![poly]), true);
        assert!(report.is_valid());
        assert!(!report.issues.contains(&CoordinateIssue::OutsideConusSuspicious));
    }
}
