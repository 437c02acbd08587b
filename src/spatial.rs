//! GeoJSON → `locn:geometry` text

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::CatalogueError;
use crate::model::SpatialGeometry;

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Geometry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Value,
}

/// Load the geometry of the first feature of a GeoJSON file.
///
/// An empty path means the dataset has no spatial coverage.
pub fn load_geometry(path: &str) -> Result<Option<SpatialGeometry>, CatalogueError> {
    if path.trim().is_empty() {
        return Ok(None);
    }
    if !Path::new(path).is_file() {
        return Err(CatalogueError::WrongFormat {
            field: "dataset.spatial".to_string(),
            value: path.to_string(),
        });
    }

    let raw = fs::read_to_string(path)?;
    parse_geometry(&raw, path).map(Some)
}

/// `origin` only names the source in warnings and errors
pub fn parse_geometry(raw: &str, origin: &str) -> Result<SpatialGeometry, CatalogueError> {
    let invalid = |reason: String| CatalogueError::InvalidGeoJson {
        path: origin.to_string(),
        reason,
    };

    let collection: FeatureCollection =
        serde_json::from_str(raw).map_err(|e| invalid(e.to_string()))?;
    if collection.features.len() > 1 {
        warn!(
            path = %origin,
            count = collection.features.len(),
            "GeoJSON has more than one feature, only the first one is used"
        );
    }
    let geometry = collection
        .features
        .into_iter()
        .next()
        .map(|f| f.geometry)
        .ok_or_else(|| invalid("no features".to_string()))?;

    let wkt = to_wkt(&geometry).map_err(invalid)?;
    let geojson = serde_json::to_string(&geometry)?;
    Ok(SpatialGeometry { wkt, geojson })
}

/// `TYPE(lon lat,...)` with one parenthesized group per nesting level
pub fn to_wkt(geometry: &Geometry) -> Result<String, String> {
    Ok(format!(
        "{}({})",
        geometry.kind.to_uppercase(),
        render(&geometry.coordinates)?
    ))
}

fn render(value: &Value) -> Result<String, String> {
    let items = value
        .as_array()
        .ok_or_else(|| format!("coordinates must be arrays, found {}", value))?;

    if is_position(value) {
        let numbers: Vec<String> = items.iter().map(|n| n.to_string()).collect();
        return Ok(numbers.join(" "));
    }

    let mut parts = Vec::with_capacity(items.len());
    for item in items {
        if is_position(item) {
            parts.push(render(item)?);
        } else {
            parts.push(format!("({})", render(item)?));
        }
    }
    Ok(parts.join(","))
}

fn is_position(value: &Value) -> bool {
    value
        .as_array()
        .map(|a| !a.is_empty() && a.iter().all(Value::is_number))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn collection(geometries: &[&str]) -> String {
        let features: Vec<String> = geometries
            .iter()
            .map(|g| format!(r#"{{"type":"Feature","properties":{{}},"geometry":{}}}"#, g))
            .collect();
        format!(r#"{{"type":"FeatureCollection","features":[{}]}}"#, features.join(","))
    }

    #[test]
    fn test_point() {
        let raw = collection(&[r#"{"type":"Point","coordinates":[-3.7038,40.4168]}"#]);
        let geometry = parse_geometry(&raw, "point.geojson").unwrap();
        assert_eq!(geometry.wkt, "POINT(-3.7038 40.4168)");
        assert_eq!(
            geometry.geojson,
            r#"{"type":"Point","coordinates":[-3.7038,40.4168]}"#
        );
    }

    #[test]
    fn test_polygon_rings_are_parenthesized() {
        let raw = collection(&[
            r#"{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]}"#,
            r#"{"type":"Point","coordinates":[5,5]}"#,
        ]);
        let geometry = parse_geometry(&raw, "area.geojson").unwrap();
        assert_eq!(geometry.wkt, "POLYGON((0 0,1 0,1 1,0 0))");
    }

    #[test]
    fn test_multipolygon() {
        let g = Geometry {
            kind: "MultiPolygon".to_string(),
            coordinates: serde_json::json!([[[[0, 0], [1, 1], [0, 0]]], [[[2, 2], [3, 3], [2, 2]]]]),
        };
        assert_eq!(
            to_wkt(&g).unwrap(),
            "MULTIPOLYGON(((0 0,1 1,0 0)),((2 2,3 3,2 2)))"
        );
    }

    #[test]
    fn test_invalid_input() {
        assert!(matches!(
            parse_geometry("not json", "x"),
            Err(CatalogueError::InvalidGeoJson { .. })
        ));
        assert!(matches!(
            parse_geometry(r#"{"features":[]}"#, "x"),
            Err(CatalogueError::InvalidGeoJson { .. })
        ));
        let raw = collection(&[r#"{"type":"Point","coordinates":"here"}"#]);
        assert!(matches!(
            parse_geometry(&raw, "x"),
            Err(CatalogueError::InvalidGeoJson { .. })
        ));
    }

    #[test]
    fn test_load_geometry_paths() {
        assert!(load_geometry("").unwrap().is_none());

        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.geojson");
        assert!(matches!(
            load_geometry(missing.to_str().unwrap()),
            Err(CatalogueError::WrongFormat { .. })
        ));

        let path = dir.path().join("city.geojson");
        fs::write(&path, collection(&[r#"{"type":"Point","coordinates":[1.5,2]}"#])).unwrap();
        let geometry = load_geometry(path.to_str().unwrap()).unwrap().unwrap();
        assert_eq!(geometry.wkt, "POINT(1.5 2)");
    }
}
