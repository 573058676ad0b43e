//! `serde` helpers that serialize `geo` geometries as `GeoJSON` geometry
//! objects.

use geo::{MultiPoint, MultiPolygon, Point};
use serde::{Serialize, Serializer};

/// Serializes a [`MultiPolygon`] as a `GeoJSON` `MultiPolygon`.
///
/// # Errors
///
/// Propagates serializer errors.
pub fn multi_polygon<S: Serializer>(
    geometry: &MultiPolygon<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    geojson::Geometry::new(geojson::Value::from(geometry)).serialize(serializer)
}

/// Serializes a list of points as a `GeoJSON` `MultiPoint`.
///
/// # Errors
///
/// Propagates serializer errors.
pub fn points<S: Serializer>(points: &[Point<f64>], serializer: S) -> Result<S::Ok, S::Error> {
    let multi = MultiPoint::new(points.to_vec());
    geojson::Geometry::new(geojson::Value::from(&multi)).serialize(serializer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    #[derive(Serialize)]
    struct Wrapper {
        #[serde(serialize_with = "multi_polygon")]
        area: MultiPolygon<f64>,
        #[serde(serialize_with = "points")]
        sites: Vec<Point<f64>>,
    }

    #[test]
    fn writes_geojson_geometry_objects() {
        let wrapper = Wrapper {
            area: MultiPolygon(vec![polygon![
                (x: 0.0, y: 0.0),
                (x: 1.0, y: 0.0),
                (x: 1.0, y: 1.0),
            ]]),
            sites: vec![Point::new(2.0, 3.0)],
        };
        let json: serde_json::Value = serde_json::to_value(&wrapper).unwrap();
        assert_eq!(json["area"]["type"], "MultiPolygon");
        assert_eq!(json["sites"]["type"], "MultiPoint");
        assert_eq!(json["sites"]["coordinates"][0][0], 2.0);
    }
}
