use geo::{LineString, MultiPolygon};

const MIN_RING_VERTICES: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyIssue {
    EmptyGeometry,
    UnclosedRing,
    TooFewVertices,
    SelfIntersecting,
}

#[derive(Debug, Clone, Default)]
pub struct TopologyReport {
    pub issues: Vec<TopologyIssue>,
}

impl TopologyReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

fn ring_closed(ring: &LineString<f64>) -> bool {
    match (ring.0.first(), ring.0.last()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Brute-force O(n^2) segment-intersection check on a single ring,
/// ignoring intersections with adjacent segments (which always share an
/// endpoint). Rings in real boundary data rarely exceed a few thousand
/// vertices after normalization, so this is acceptable as a validation-time
/// cost rather than a hot-path one.
fn ring_self_intersects(ring: &LineString<f64>) -> bool {
    let coords = &ring.0;
    let n = coords.len();
    if n < 4 {
        return false;
    }
    for i in 0..n - 1 {
        let (a1, a2) = (coords[i], coords[i + 1]);
        for j in i + 1..n - 1 {
            if j == i || (j == i + 1) || (i == 0 && j == n - 2) {
                continue;
            }
            let (b1, b2) = (coords[j], coords[j + 1]);
            if segments_intersect(a1, a2, b1, b2) {
                return true;
            }
        }
    }
    false
}

fn orientation(p: geo::Coord<f64>, q: geo::Coord<f64>, r: geo::Coord<f64>) -> f64 {
    (q.y - p.y) * (r.x - q.x) - (q.x - p.x) * (r.y - q.y)
}

fn on_segment(p: geo::Coord<f64>, q: geo::Coord<f64>, r: geo::Coord<f64>) -> bool {
    q.x <= p.x.max(r.x) && q.x >= p.x.min(r.x) && q.y <= p.y.max(r.y) && q.y >= p.y.min(r.y)
}

fn segments_intersect(p1: geo::Coord<f64>, q1: geo::Coord<f64>, p2: geo::Coord<f64>, q2: geo::Coord<f64>) -> bool {
    let o1 = orientation(p1, q1, p2);
    let o2 = orientation(p1, q1, q2);
    let o3 = orientation(p2, q2, p1);
    let o4 = orientation(p2, q2, q1);

    if (o1 > 0.0) != (o2 > 0.0) && (o3 > 0.0) != (o4 > 0.0) {
        return true;
    }
    if o1 == 0.0 && on_segment(p1, p2, q1) {
        return true;
    }
    if o2 == 0.0 && on_segment(p1, q2, q1) {
        return true;
    }
    if o3 == 0.0 && on_segment(p2, p1, q2) {
        return true;
    }
    if o4 == 0.0 && on_segment(p2, q1, q2) {
        return true;
    }
    false
}

/// Ring closure, minimum-vertex, and self-intersection checks (spec §4.5
/// "Topology"). Non-null/non-empty is checked first since every other rule
/// assumes at least one ring exists.
pub fn check_topology(geometry: &MultiPolygon<f64>) -> TopologyReport {
    let mut report = TopologyReport::default();
    if geometry.0.is_empty() {
        report.issues.push(TopologyIssue::EmptyGeometry);
        return report;
    }

    for polygon in &geometry.0 {
        let rings = std::iter::once(polygon.exterior()).chain(polygon.interiors());
        for ring in rings {
            if !ring_closed(ring) {
                report.issues.push(TopologyIssue::UnclosedRing);
            }
            if ring.0.len() < MIN_RING_VERTICES {
                report.issues.push(TopologyIssue::TooFewVertices);
            }
            if ring_self_intersects(ring) {
                report.issues.push(TopologyIssue::SelfIntersecting);
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    #[test]
    fn well_formed_polygon_is_valid() {
        let poly = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)];
        let report = check_topology(&MultiPolygon(vec![poly]));
        assert!(report.is_valid());
    }

    #[test]
    fn empty_multipolygon_flagged() {
        let report = check_topology(&MultiPolygon(vec![]));
        assert!(report.issues.contains(&TopologyIssue::EmptyGeometry));
    }

    #[test]
    fn too_few_vertices_flagged() {
        let ring = LineString(vec![geo::Coord { x: 0.0, y: 0.0 }, geo::Coord { x: 1.0, y: 1.0 }, geo::Coord { x: 0.0, y: 0.0 }]);
        let poly = geo::Polygon::new(ring, vec![]);
        let report = check_topology(&MultiPolygon(vec![poly]));
        assert!(report.issues.contains(&TopologyIssue::TooFewVertices));
    }

    #[test]
    fn bowtie_ring_flagged_self_intersecting() {
        let ring = LineString(vec![
            geo::Coord { x: 0.0, y: 0.0 },
            geo::Coord { x: 1.0, y: 1.0 },
            geo::Coord { x: 1.0, y: 0.0 },
            geo::Coord { x: 0.0, y: 1.0 },
            geo::Coord { x: 0.0, y: 0.0 },
        ]);
        let poly = geo::Polygon::new(ring, vec![]);
        let report = check_topology(&MultiPolygon(vec![poly]));
        assert!(report.issues.contains(&TopologyIssue::SelfIntersecting));
    }
}
