//! Typed session context carried between wizard steps.

use avm_analysis_models::{
    AggregationResult, ChartKind, ChartStore, LonLat, PriceComparison, Projection,
    ProximityContext, SecurityContext, UsageMix,
};
use avm_report::Report;
use serde::Serialize;

/// The locality chosen in the selection step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalitySelection {
    pub id: String,
    pub name: String,
}

/// Outputs of the spatial context step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpatialOutputs {
    pub centroid: Option<LonLat>,
    pub transit: ProximityContext,
    pub schools: ProximityContext,
}

/// Outputs of the comparison step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonOutputs {
    pub comparison: PriceComparison,
    pub usage_mix: UsageMix,
    pub projection: Projection,
}

/// Everything the wizard knows about the current selection.
///
/// Step outputs are overwritten each time their step is entered and are
/// dropped whenever the selection they depend on changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Session {
    pub locality: Option<LocalitySelection>,
    pub block_id: Option<String>,
    pub spatial: Option<SpatialOutputs>,
    pub comparison: Option<ComparisonOutputs>,
    pub security: Option<SecurityContext>,
    pub result: Option<AggregationResult>,
    pub report: Option<Report>,
    pub charts: ChartStore,
}

impl Session {
    /// Drops every output derived from the selected block. The locality
    /// map survives since it only depends on the locality.
    pub(crate) fn clear_block_outputs(&mut self) {
        self.spatial = None;
        self.comparison = None;
        self.security = None;
        self.result = None;
        self.report = None;
        for kind in ChartKind::all() {
            if *kind != ChartKind::LocalityMap {
                self.charts.remove(*kind);
            }
        }
    }

    /// Drops the block selection and everything derived from the locality.
    pub(crate) fn clear_locality_outputs(&mut self) {
        self.block_id = None;
        self.clear_block_outputs();
        self.charts.clear();
    }
}
