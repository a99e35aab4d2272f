use geo::MultiPolygon;

/// Inclusive (min_lon, min_lat, max_lon, max_lat) bbox of the simplified
/// geometry (spec §4.8 "Bbox"). Returns `None` for an empty multipolygon.
pub fn inclusive_bbox(geometry: &MultiPolygon<f64>) -> Option<(f64, f64, f64, f64)> {
    let mut bounds: Option<(f64, f64, f64, f64)> = None;
    for polygon in &geometry.0 {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
            for coord in &ring.0 {
                bounds = Some(match bounds {
                    None => (coord.x, coord.y, coord.x, coord.y),
                    Some((minx, miny, maxx, maxy)) => (minx.min(coord.x), miny.min(coord.y), maxx.max(coord.x), maxy.max(coord.y)),
                });
            }
        }
    }
    bounds
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    #[test]
    fn computes_bbox() {
        let poly = polygon![(x: -1.0, y: 2.0), (x: 3.0, y: 2.0), (x: 3.0, y: 5.0), (x: -1.0, y: 5.0)];
        let bbox = inclusive_bbox(&MultiPolygon(vec![poly])).unwrap();
        assert_eq!(bbox, (-1.0, 2.0, 3.0, 5.0));
    }

    #[test]
    fn empty_geometry_has_no_bbox() {
        assert_eq!(inclusive_bbox(&MultiPolygon(vec![])), None);
    }
}
