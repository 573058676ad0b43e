#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Cadastral reference data types.
//!
//! These types mirror the five feature collections the valuation wizard
//! works from: localities, POT zoning areas, cadastral blocks
//! ("manzanas"), transit station groups and school groups. All
//! geometries are stored in WGS84 longitude/latitude.

use geo::{MultiPoint, MultiPolygon, Point};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One of the five feature collections the dataset store is built from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DatasetKind {
    /// Locality boundaries with security statistics (`dim_localidad`).
    Localities,
    /// POT zoning areas (`dim_area`).
    ZoningAreas,
    /// Cadastral blocks with valuation attributes (`tabla_hechos`).
    Blocks,
    /// Transit station groups keyed by `id_combi_acceso` (`dim_transporte`).
    Transit,
    /// School groups keyed by `id_com_colegios` (`dim_colegios`).
    Schools,
}

impl DatasetKind {
    /// Returns all variants in load order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Localities,
            Self::ZoningAreas,
            Self::Blocks,
            Self::Transit,
            Self::Schools,
        ]
    }
}

/// A dataset source definition, deserialized from the embedded TOML
/// registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSource {
    /// Which collection this source provides.
    pub kind: DatasetKind,
    /// Human-readable name (e.g., "Localidades").
    pub name: String,
    /// Remote URL returning a `GeoJSON` `FeatureCollection`.
    pub url: String,
    /// File name used when loading from a local directory.
    pub file_name: String,
}

/// A Bogotá locality ("localidad").
#[derive(Debug, Clone, PartialEq)]
pub struct Locality {
    /// `num_localidad`.
    pub id: String,
    /// `nombre_localidad`.
    pub name: String,
    pub boundary: MultiPolygon<f64>,
    /// `cantidad_delitos`: reported crimes in the locality.
    pub crime_count: u64,
    /// `nivel_riesgo_delictivo`: risk level label (e.g. "Alto").
    pub risk_level: String,
}

/// A POT zoning area.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoningArea {
    /// `id_area`.
    pub id: String,
    /// Owning locality (`num_localidad`).
    pub locality_id: String,
    pub boundary: MultiPolygon<f64>,
    /// `uso_pot_simplificado`: simplified land-use category.
    pub land_use: Option<String>,
    /// `area_pot`: POT designation label.
    pub pot_area: Option<String>,
}

/// A half-year period of the valuation series.
///
/// [`Self::Current`] is the observed `valor_m2` (second half of 2024);
/// the remaining periods are model projections.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum ProjectionPeriod {
    #[serde(rename = "2024-S2")]
    #[strum(serialize = "2024-S2")]
    Current,
    #[serde(rename = "2025-S1")]
    #[strum(serialize = "2025-S1")]
    H1_2025,
    #[serde(rename = "2025-S2")]
    #[strum(serialize = "2025-S2")]
    H2_2025,
    #[serde(rename = "2026-S1")]
    #[strum(serialize = "2026-S1")]
    H1_2026,
    #[serde(rename = "2026-S2")]
    #[strum(serialize = "2026-S2")]
    H2_2026,
}

impl ProjectionPeriod {
    /// Returns all periods in chronological order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Current,
            Self::H1_2025,
            Self::H2_2025,
            Self::H1_2026,
            Self::H2_2026,
        ]
    }

    /// Returns the block property holding this period's value.
    #[must_use]
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Current => "valor_m2",
            Self::H1_2025 => "valor_2025_s1",
            Self::H2_2025 => "valor_2025_s2",
            Self::H1_2026 => "valor_2026_s1",
            Self::H2_2026 => "valor_2026_s2",
        }
    }
}

/// A cadastral block ("manzana").
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// `id_manzana_unif`.
    pub id: String,
    /// Owning locality (`num_localidad`).
    pub locality_id: String,
    /// Owning zoning area (`id_area`), if any.
    pub area_id: Option<String>,
    pub geometry: MultiPolygon<f64>,
    /// `estrato`: socioeconomic stratum (1-6).
    pub stratum: Option<u8>,
    /// `valor_m2`: current value per square metre.
    pub value_m2: Option<f64>,
    /// Projected values for 2025-S1 through 2026-S2, in period order.
    pub projected: [Option<f64>; 4],
    /// `id_combi_acceso`: transit access group.
    pub transit_access_id: Option<String>,
    /// `id_com_colegios`: school access group.
    pub school_access_id: Option<String>,
    /// `colegio_cerca`: schools within 1 km.
    pub nearby_schools: u32,
    /// `estaciones_cerca`: stations within 500 m.
    pub nearby_stations: u32,
    /// `rentabilidad`: profitability label.
    pub profitability: Option<String>,
}

impl Block {
    /// Returns the value recorded for `period`.
    #[must_use]
    pub const fn value_at(&self, period: ProjectionPeriod) -> Option<f64> {
        match period {
            ProjectionPeriod::Current => self.value_m2,
            ProjectionPeriod::H1_2025 => self.projected[0],
            ProjectionPeriod::H2_2025 => self.projected[1],
            ProjectionPeriod::H1_2026 => self.projected[2],
            ProjectionPeriod::H2_2026 => self.projected[3],
        }
    }
}

/// Point geometry of an access group row.
///
/// Transit rows carry a multi-point of stations; school rows arrive as
/// either a single point or a multi-point cluster.
#[derive(Debug, Clone, PartialEq)]
pub enum PointSet {
    Single(Point<f64>),
    Cluster(MultiPoint<f64>),
}

impl PointSet {
    /// Iterates over every point in the set.
    pub fn points(&self) -> impl Iterator<Item = Point<f64>> + '_ {
        let (single, cluster) = match self {
            Self::Single(p) => (Some(*p), None),
            Self::Cluster(mp) => (None, Some(mp.iter().copied())),
        };
        single.into_iter().chain(cluster.into_iter().flatten())
    }

    /// Number of points in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Cluster(mp) => mp.0.len(),
        }
    }

    /// Returns `true` if the set holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A transit or school group row: an access id plus its point geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSite {
    /// `id_combi_acceso` or `id_com_colegios`.
    pub access_id: String,
    pub points: PointSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_periods_map_to_fields_in_order() {
        let fields: Vec<&str> = ProjectionPeriod::all()
            .iter()
            .map(|p| p.field_name())
            .collect();
        assert_eq!(
            fields,
            [
                "valor_m2",
                "valor_2025_s1",
                "valor_2025_s2",
                "valor_2026_s1",
                "valor_2026_s2"
            ]
        );
        let labels: Vec<String> = ProjectionPeriod::all()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            labels,
            ["2024-S2", "2025-S1", "2025-S2", "2026-S1", "2026-S2"]
        );
    }

    #[test]
    fn point_set_flattens_clusters() {
        let single = PointSet::Single(Point::new(-74.1, 4.6));
        assert_eq!(single.points().count(), 1);

        let cluster = PointSet::Cluster(MultiPoint::from(vec![(-74.1, 4.6), (-74.2, 4.7)]));
        let points: Vec<Point<f64>> = cluster.points().collect();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1], Point::new(-74.2, 4.7));

        let empty = PointSet::Cluster(MultiPoint::new(vec![]));
        assert!(empty.is_empty());
    }

    #[test]
    fn dataset_kind_parses_from_snake_case() {
        assert_eq!(
            "zoning_areas".parse::<DatasetKind>().ok(),
            Some(DatasetKind::ZoningAreas)
        );
        assert_eq!(DatasetKind::all().len(), 5);
    }
}
