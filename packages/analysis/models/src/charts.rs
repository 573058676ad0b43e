//! Chart specifications and the store of rendered charts.
//!
//! The pipeline only describes what each chart shows; turning a
//! [`ChartSpec`] into an image or document is left to a renderer.

use std::collections::BTreeMap;

use geo::{MultiPolygon, Point};
use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::{SecurityRankRow, geometry};

/// Every chart the wizard can produce.
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
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChartKind {
    /// Blocks of the locality colored by land use.
    LocalityMap,
    /// The locality map with the selected block highlighted.
    BlockMap,
    TransitContext,
    SchoolContext,
    ValueComparison,
    UsageMix,
    Projection,
    Security,
}

impl ChartKind {
    /// All chart kinds in report order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::LocalityMap,
            Self::BlockMap,
            Self::TransitContext,
            Self::SchoolContext,
            Self::ValueComparison,
            Self::UsageMix,
            Self::Projection,
            Self::Security,
        ]
    }
}

/// One colored polygon on a map chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapFeature {
    pub id: String,
    pub label: String,
    pub color: String,
    pub highlighted: bool,
    #[serde(serialize_with = "geometry::multi_polygon")]
    pub geometry: MultiPolygon<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub label: String,
    pub count: usize,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinePoint {
    pub label: String,
    pub value: f64,
}

/// What a chart draws.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartBody {
    /// Choropleth of block footprints.
    Map {
        features: Vec<MapFeature>,
        /// Legend entries in order of first appearance.
        legend: Vec<(String, String)>,
    },
    /// A block, its buffer ring and nearby points.
    Proximity {
        #[serde(serialize_with = "geometry::multi_polygon")]
        block: MultiPolygon<f64>,
        #[serde(serialize_with = "geometry::multi_polygon")]
        ring: MultiPolygon<f64>,
        #[serde(serialize_with = "geometry::points")]
        points: Vec<Point<f64>>,
        radius_m: f64,
    },
    Bars {
        bars: Vec<Bar>,
    },
    Pie {
        slices: Vec<Slice>,
    },
    Line {
        points: Vec<LinePoint>,
    },
    Ranking {
        rows: Vec<SecurityRankRow>,
    },
}

/// A chart description ready to hand to a renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub body: ChartBody,
}

/// Output of a renderer for one chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedChart {
    pub media_type: String,
    /// Where the rendered chart was written, if it lives outside memory.
    pub location: Option<String>,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// Rendered charts of the current selection, keyed by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChartStore {
    charts: BTreeMap<ChartKind, RenderedChart>,
}

impl ChartStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `chart`, replacing any earlier rendering of the same kind.
    pub fn insert(&mut self, kind: ChartKind, chart: RenderedChart) {
        self.charts.insert(kind, chart);
    }

    #[must_use]
    pub fn get(&self, kind: ChartKind) -> Option<&RenderedChart> {
        self.charts.get(&kind)
    }

    #[must_use]
    pub fn contains(&self, kind: ChartKind) -> bool {
        self.charts.contains_key(&kind)
    }

    pub fn remove(&mut self, kind: ChartKind) -> Option<RenderedChart> {
        self.charts.remove(&kind)
    }

    /// Moves every chart of `other` into this store, replacing earlier
    /// renderings of the same kinds.
    pub fn merge(&mut self, other: Self) {
        self.charts.extend(other.charts);
    }

    /// Drops every stored chart. Used when the selection changes.
    pub fn clear(&mut self) {
        self.charts.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.charts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ChartKind, &RenderedChart)> {
        self.charts.iter().map(|(kind, chart)| (*kind, chart))
    }
}
