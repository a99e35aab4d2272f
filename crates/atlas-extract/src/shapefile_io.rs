use std::io::{Cursor, Read};

use shapefile as shp;

use crate::error::ExtractError;
use crate::feature::{PropertyBag, PropertyValue, RawFeature};

/// Convert a `shapefile::Polygon` into `geo::MultiPolygon<f64>`, grouping
/// rings by winding order (shapefile exteriors are clockwise, holes
/// counter-clockwise, and holes always follow their exterior in file order).
pub fn shp_to_geo(p: &shp::Polygon) -> geo::MultiPolygon<f64> {
    fn ensure_closed(coords: &mut Vec<geo::Coord<f64>>) {
        if !coords.is_empty() && coords[0] != coords[coords.len() - 1] {
            coords.push(coords[0]);
        }
    }
    fn signed_area(pts: &[geo::Coord<f64>]) -> f64 {
        let mut a = 0.0;
        for w in pts.windows(2) {
            a += w[0].x * w[1].y - w[1].x * w[0].y;
        }
        a / 2.0
    }

    let mut ls_rings: Vec<(geo::LineString<f64>, bool)> = Vec::with_capacity(p.rings().len());
    for ring in p.rings().iter() {
        let mut coords: Vec<geo::Coord<f64>> = ring.points().iter().map(|pt| geo::Coord { x: pt.x, y: pt.y }).collect();
        ensure_closed(&mut coords);
        let is_exterior = signed_area(&coords) < 0.0;
        ls_rings.push((geo::LineString(coords), is_exterior));
    }

    let mut polys = Vec::new();
    let mut current_exterior: Option<geo::LineString<f64>> = None;
    let mut current_holes = Vec::new();
    for (ls, is_exterior) in ls_rings {
        if is_exterior {
            if let Some(ext) = current_exterior.take() {
                polys.push(geo::Polygon::new(ext, std::mem::take(&mut current_holes)));
            }
            current_exterior = Some(ls);
        } else {
            current_holes.push(ls);
        }
    }
    if let Some(ext) = current_exterior {
        polys.push(geo::Polygon::new(ext, current_holes));
    }
    geo::MultiPolygon(polys)
}

fn dbf_value(record: &shp::dbase::Record, key: &str) -> PropertyValue {
    use shp::dbase::FieldValue::*;
    match record.get(key) {
        Some(Character(Some(s))) => PropertyValue::Str(s.clone()),
        Some(Character(None)) => PropertyValue::Null,
        Some(Numeric(Some(n))) => PropertyValue::Float(*n),
        Some(Numeric(None)) => PropertyValue::Null,
        Some(Integer(n)) => PropertyValue::Int(*n as i64),
        Some(Logical(Some(b))) => PropertyValue::Bool(*b),
        Some(Float(Some(f))) => PropertyValue::Float(*f as f64),
        _ => PropertyValue::Null,
    }
}

/// Read every polygon feature out of a `.shp`/`.dbf` pair found inside a zip
/// archive at `zip_path`, attaching `provenance` to each. Mirrors the
/// teacher's zip-then-shapefile pipeline but reads the shapefile/dbf pair
/// straight out of the archive instead of extracting to a scratch directory
/// first.
pub fn read_polygons_from_zip(zip_path: &std::path::Path, provenance: crate::feature::ProvenanceStub) -> Result<Vec<RawFeature>, ExtractError> {
    let file = std::fs::File::open(zip_path).map_err(|e| ExtractError::MalformedArtifact(e.to_string()))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| ExtractError::MalformedArtifact(e.to_string()))?;

    let shp_name = (0..archive.len())
        .map(|i| archive.by_index(i).map(|f| f.name().to_string()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ExtractError::MalformedArtifact(e.to_string()))?
        .into_iter()
        .find(|n| n.to_ascii_lowercase().ends_with(".shp"))
        .ok_or_else(|| ExtractError::MalformedArtifact("no .shp member in archive".into()))?;
    let dbf_name = shp_name.trim_end_matches(".shp").trim_end_matches(".SHP").to_string() + ".dbf";

    let mut shp_bytes = Vec::new();
    archive
        .by_name(&shp_name)
        .map_err(|e| ExtractError::MalformedArtifact(e.to_string()))?
        .read_to_end(&mut shp_bytes)
        .map_err(|e| ExtractError::MalformedArtifact(e.to_string()))?;
    let mut dbf_bytes = Vec::new();
    archive
        .by_name(&dbf_name)
        .map_err(|e| ExtractError::MalformedArtifact(e.to_string()))?
        .read_to_end(&mut dbf_bytes)
        .map_err(|e| ExtractError::MalformedArtifact(e.to_string()))?;

    let reader = shp::ShapeReader::new(Cursor::new(shp_bytes)).map_err(|e| ExtractError::MalformedArtifact(e.to_string()))?;
    let dbf_reader = shp::dbase::Reader::new(Cursor::new(dbf_bytes)).map_err(|e| ExtractError::MalformedArtifact(e.to_string()))?;
    let mut combined = shp::Reader::new(reader, dbf_reader);

    let mut out = Vec::new();
    for result in combined.iter_shapes_and_records() {
        let (shape, record) = result.map_err(|e| ExtractError::MalformedArtifact(e.to_string()))?;
        let polygon = match shape {
            shp::Shape::Polygon(p) => p,
            _ => continue,
        };
        let geometry = shp_to_geo(&polygon);
        if geometry.0.is_empty() {
            continue;
        }
        let mut properties = PropertyBag::default();
        for (key, _) in record.clone().into_iter() {
            properties.insert(key.clone(), dbf_value(&record, &key));
        }
        out.push(RawFeature { geometry, properties, provenance: provenance.clone() });
    }
    Ok(out)
}
