use rstar::{PointDistance, RTree, RTreeObject, AABB};

const EARTH_RADIUS_M: f64 = 6_371_008.8;
const MAX_MATCH_DISTANCE_M: f64 = 5_000.0;
/// Degree-space search radius loose enough to never miss a true 5km match
/// (1° of latitude is ~111km everywhere; longitude shrinks toward the
/// poles, so this over-includes rather than under-includes candidates).
const SEARCH_RADIUS_DEG: f64 = 0.06;

/// Great-circle distance between two WGS84 points in meters.
pub fn haversine_m(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lon1, lat1) = (a.0.to_radians(), a.1.to_radians());
    let (lon2, lat2) = (b.0.to_radians(), b.1.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

struct IndexedPoint {
    index: usize,
    lon: f64,
    lat: f64,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.lon, self.lat])
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        (self.lon - point[0]).powi(2) + (self.lat - point[1]).powi(2)
    }
}

/// Greedy nearest-first one-to-one matching of residual (unmatched-by-GEOID)
/// features between two sides, capped at 5km (spec §4.7 step 2). Each index
/// is consumed at most once; ties broken by input order. Candidate pairs are
/// pruned with an r-tree over side `b` before the exact haversine check, so
/// a state with thousands of VTDs doesn't pay an O(n*m) cost.
pub fn match_by_centroid(a: &[(usize, (f64, f64))], b: &[(usize, (f64, f64))]) -> Vec<(usize, usize, f64)> {
    let tree = RTree::bulk_load(b.iter().map(|&(index, (lon, lat))| IndexedPoint { index, lon, lat }).collect());

    let mut candidates: Vec<(f64, usize, usize)> = Vec::new();
    for &(ai, a_pt) in a {
        for near in tree.locate_within_distance([a_pt.0, a_pt.1], SEARCH_RADIUS_DEG * SEARCH_RADIUS_DEG) {
            let d = haversine_m(a_pt, (near.lon, near.lat));
            if d <= MAX_MATCH_DISTANCE_M {
                candidates.push((d, ai, near.index));
            }
        }
    }
    candidates.sort_by(|x, y| x.0.partial_cmp(&y.0).unwrap());

    let mut used_a = std::collections::HashSet::new();
    let mut used_b = std::collections::HashSet::new();
    let mut matches = Vec::new();
    for (d, ai, bi) in candidates {
        if used_a.contains(&ai) || used_b.contains(&bi) {
            continue;
        }
        used_a.insert(ai);
        used_b.insert(bi);
        matches.push((ai, bi, d));
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_close_points() {
        let a = vec![(0usize, (-121.5, 38.5))];
        let b = vec![(0usize, (-121.501, 38.501))];
        let matches = match_by_centroid(&a, &b);
        assert_eq!(matches.len(), 1);
        assert!(matches[0].2 < 5_000.0);
    }

    #[test]
    fn no_match_beyond_5km() {
        let a = vec![(0usize, (-121.5, 38.5))];
        let b = vec![(0usize, (-122.0, 39.0))];
        assert!(match_by_centroid(&a, &b).is_empty());
    }

    #[test]
    fn greedy_assignment_is_one_to_one() {
        let a = vec![(0usize, (-121.5, 38.5)), (1usize, (-121.5001, 38.5001))];
        let b = vec![(0usize, (-121.5, 38.5))];
        let matches = match_by_centroid(&a, &b);
        assert_eq!(matches.len(), 1);
    }
}
