#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Spatial primitives for block-level valuation analysis.
//!
//! Provides the EPSG:3116 planar projection used for every metric
//! computation, proximity rings (planar buffers reprojected for display),
//! and R-tree indexes for point-in-polygon and polygon-intersects lookups.

pub mod index;
pub mod projection;

use geo::{Buffer, Centroid, MultiPolygon, Point};

pub use index::{BoundaryIndex, FootprintIndex};
pub use projection::{MAGNA_BOGOTA, TransverseMercator};

/// A proximity ring around a planar geometry.
///
/// `planar` is used for intersection queries; `geographic` is the same
/// ring projected back to longitude/latitude for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    pub radius_m: f64,
    pub planar: MultiPolygon<f64>,
    pub geographic: MultiPolygon<f64>,
}

impl Ring {
    /// Buffers an already-projected geometry by `radius_m` metres.
    #[must_use]
    pub fn around(
        planar: &MultiPolygon<f64>,
        radius_m: f64,
        projection: &TransverseMercator,
    ) -> Self {
        let ring = planar.buffer(radius_m);
        log::debug!("Built {radius_m}m ring with {} polygon(s)", ring.0.len());
        let geographic = projection.to_geographic(&ring);
        Self {
            radius_m,
            planar: ring,
            geographic,
        }
    }
}

/// Centroid of a geographic geometry, computed on the plane and projected
/// back to longitude/latitude.
///
/// Returns `None` for empty geometries.
#[must_use]
pub fn planar_centroid(
    geographic: &MultiPolygon<f64>,
    projection: &TransverseMercator,
) -> Option<Point<f64>> {
    projection
        .to_planar(geographic)
        .centroid()
        .map(|c| projection.to_geographic(&c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Area, Contains, polygon};

    fn planar_square(x: f64, y: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: x, y: y),
            (x: x + size, y: y),
            (x: x + size, y: y + size),
            (x: x, y: y + size),
        ]])
    }

    #[test]
    fn ring_contains_source_and_grows_by_radius() {
        let block = planar_square(1_000_000.0, 1_000_000.0, 100.0);
        let ring = Ring::around(&block, 300.0, &MAGNA_BOGOTA);

        assert!(ring.planar.contains(&block));
        // A 100m square buffered by 300m: 100^2 + 4*100*300 + pi*300^2.
        let expected = 10_000.0 + 120_000.0 + std::f64::consts::PI * 90_000.0;
        let area = ring.planar.unsigned_area();
        assert!((area - expected).abs() / expected < 0.05, "{area} vs {expected}");
    }

    #[test]
    fn ring_geographic_is_near_origin() {
        let block = planar_square(1_000_000.0, 1_000_000.0, 50.0);
        let ring = Ring::around(&block, 800.0, &MAGNA_BOGOTA);
        let centroid = ring.geographic.centroid().expect("non-empty ring");
        assert!((centroid.x() - MAGNA_BOGOTA.central_meridian).abs() < 0.01);
        assert!((centroid.y() - MAGNA_BOGOTA.origin_lat).abs() < 0.01);
    }

    #[test]
    fn centroid_of_empty_geometry_is_none() {
        assert!(planar_centroid(&MultiPolygon(vec![]), &MAGNA_BOGOTA).is_none());
    }

    #[test]
    fn centroid_round_trips_to_geographic() {
        let block = MultiPolygon(vec![polygon![
            (x: -74.081, y: 4.601),
            (x: -74.079, y: 4.601),
            (x: -74.079, y: 4.603),
            (x: -74.081, y: 4.603),
        ]]);
        let c = planar_centroid(&block, &MAGNA_BOGOTA).expect("centroid");
        assert!((c.x() - -74.080).abs() < 1e-6);
        assert!((c.y() - 4.602).abs() < 1e-6);
    }
}
