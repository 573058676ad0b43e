//! The aggregation result bundle and its sections.

use avm_catastro_models::ProjectionPeriod;
use geo::{MultiPolygon, Point};
use serde::Serialize;

use crate::charts::ChartKind;
use crate::{LandUse, Observation, geometry};

/// Longitude/latitude pair for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl From<Point<f64>> for LonLat {
    fn from(p: Point<f64>) -> Self {
        Self {
            lon: p.x(),
            lat: p.y(),
        }
    }
}

/// How an access-group id resolved against its point collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GroupLookup {
    /// The block has no access-group id.
    NoAccessId,
    /// The id exists on the block but no group row carries it.
    Unmatched { access_id: String },
    /// The id matched `sites` group rows.
    Matched { access_id: String, sites: usize },
}

/// Points of interest around a block within a proximity ring.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProximityContext {
    pub radius_m: f64,
    /// The ring in longitude/latitude.
    #[serde(serialize_with = "geometry::multi_polygon")]
    pub ring: MultiPolygon<f64>,
    pub lookup: GroupLookup,
    #[serde(serialize_with = "geometry::points")]
    pub points: Vec<Point<f64>>,
}

impl ProximityContext {
    #[must_use]
    pub fn has_points(&self) -> bool {
        !self.points.is_empty()
    }
}

/// Which blocks the area average was computed over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum AreaScope {
    /// Blocks sharing the selected block's zoning area.
    ZoningArea { area_id: String },
    /// Blocks that, like the selected block, have no zoning area.
    Unzoned,
}

impl AreaScope {
    /// Chart label for the area-average bar.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::ZoningArea { .. } => "Promedio área POT",
            Self::Unzoned => "Promedio sin área",
        }
    }
}

/// Value per square metre of the block against its surroundings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceComparison {
    pub own_value: Observation<f64>,
    pub area_scope: AreaScope,
    pub area_average: Observation<f64>,
    pub area_block_count: usize,
    pub ring_radius_m: f64,
    pub ring_average: Observation<f64>,
    pub ring_block_count: usize,
}

impl PriceComparison {
    /// Ratio of the block's value to the ring average, when both exist.
    #[must_use]
    pub fn ring_ratio(&self) -> Option<f64> {
        let own = *self.own_value.as_option()?;
        let ring = *self.ring_average.as_option()?;
        (ring != 0.0).then(|| own / ring)
    }

    /// Ratio of the block's value to the area average, when both exist.
    #[must_use]
    pub fn area_ratio(&self) -> Option<f64> {
        let own = *self.own_value.as_option()?;
        let area = *self.area_average.as_option()?;
        (area != 0.0).then(|| own / area)
    }
}

/// Number of intersecting blocks with a given land use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub land_use: LandUse,
    pub count: usize,
}

/// Land-use distribution of the blocks around the selected block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMix {
    pub radius_m: f64,
    /// Sorted by count descending; ties keep first-encountered order.
    pub counts: Vec<CategoryCount>,
    pub majority: Observation<LandUse>,
}

impl UsageMix {
    /// Total number of intersecting blocks.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().map(|c| c.count).sum()
    }

    /// Majority category label, or the unclassified label when the ring
    /// held no blocks.
    #[must_use]
    pub fn majority_label(&self) -> &str {
        self.majority
            .as_option()
            .map_or(crate::UNCLASSIFIED_LABEL, LandUse::label)
    }
}

/// One point of the valuation series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectionPoint {
    pub period: ProjectionPeriod,
    pub value: f64,
}

/// Current and projected value per square metre.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Projection {
    /// All five periods present, in chronological order.
    Complete { points: Vec<ProjectionPoint> },
    /// At least one period is missing; no series is produced.
    Incomplete { missing: Vec<ProjectionPeriod> },
}

impl Projection {
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Complete { .. })
    }

    /// Value for `period`, if the series is complete.
    #[must_use]
    pub fn value_at(&self, period: ProjectionPeriod) -> Option<f64> {
        match self {
            Self::Complete { points } => points
                .iter()
                .find(|p| p.period == period)
                .map(|p| p.value),
            Self::Incomplete { .. } => None,
        }
    }
}

/// Security statistics of the block's locality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecuritySnapshot {
    pub locality_id: String,
    pub locality_name: String,
    pub crime_count: u64,
    pub risk_level: String,
}

/// One row of the cross-locality crime ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityRankRow {
    pub locality_name: String,
    pub crime_count: u64,
    pub is_current: bool,
    /// Risk level label, only set on the current locality's row.
    pub annotation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityContext {
    pub snapshot: Observation<SecuritySnapshot>,
    /// Every locality, ascending by crime count.
    pub ranking: Vec<SecurityRankRow>,
}

/// Facility counts precomputed on the block record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityCounts {
    pub schools_within_1km: u32,
    pub stations_within_500m: u32,
}

/// The block's POT designation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoningDesignation {
    pub area_id: Option<String>,
    pub land_use: LandUse,
    pub pot_area: Option<String>,
}

/// Everything the pipeline derives for one selected block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationResult {
    pub block_id: String,
    pub locality_id: String,
    pub locality_name: String,
    pub stratum: Option<u8>,
    pub profitability: Option<String>,
    pub zoning: ZoningDesignation,
    pub centroid: Option<LonLat>,
    pub transit: ProximityContext,
    pub schools: ProximityContext,
    pub comparison: PriceComparison,
    pub usage_mix: UsageMix,
    pub projection: Projection,
    pub security: SecurityContext,
    pub facilities: FacilityCounts,
}

impl AggregationResult {
    /// Charts that must be rendered before the report can be assembled.
    ///
    /// The projection chart is only expected for a complete series and the
    /// usage-mix chart only when the ring held blocks.
    #[must_use]
    pub fn expected_charts(&self) -> Vec<ChartKind> {
        ChartKind::all()
            .iter()
            .copied()
            .filter(|kind| match kind {
                ChartKind::Projection => self.projection.is_complete(),
                ChartKind::UsageMix => !self.usage_mix.counts.is_empty(),
                _ => true,
            })
            .collect()
    }
}
