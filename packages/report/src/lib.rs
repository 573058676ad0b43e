#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Report value assembly.
//!
//! Collects the pipeline's [`AggregationResult`] and the rendered charts
//! into a [`Report`]: a summary sheet, narrative value sections and the
//! ordered chart references. Nothing here recomputes pipeline outputs;
//! empty aggregations are shown as zero.

pub mod format;
pub mod narrative;

use avm_analysis_models::{AggregationResult, ChartKind, ChartStore};
use serde::Serialize;

pub use format::format_currency;
pub use narrative::{NarrativeSection, ReportValue, SectionKind};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Chart {0} has not been rendered")]
    MissingChart(ChartKind),
}

/// The one-row summary table of the selected block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarySheet {
    pub block_id: String,
    pub locality: String,
    pub stratum: Option<u8>,
    pub value_m2: f64,
    pub area_average: f64,
    pub ring_average: f64,
    pub profitability: Option<String>,
}

impl SummarySheet {
    #[must_use]
    pub fn from_result(result: &AggregationResult) -> Self {
        Self {
            block_id: result.block_id.clone(),
            locality: result.locality_name.clone(),
            stratum: result.stratum,
            value_m2: result.comparison.own_value.value_or_zero(),
            area_average: result.comparison.area_average.value_or_zero(),
            ring_average: result.comparison.ring_average.value_or_zero(),
            profitability: result.profitability.clone(),
        }
    }

    /// Column labels and display values, in table order.
    #[must_use]
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ID Manzana", self.block_id.clone()),
            ("Localidad", self.locality.clone()),
            (
                "Estrato",
                self.stratum.map_or_else(|| "N/D".to_string(), |s| s.to_string()),
            ),
            ("Valor m²", format_currency(self.value_m2)),
            ("Prom. Área POT", format_currency(self.area_average)),
            ("Prom. 300m", format_currency(self.ring_average)),
            (
                "Rentabilidad",
                format::or_unavailable(self.profitability.as_deref()),
            ),
        ]
    }
}

/// A rendered chart cited by the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartReference {
    pub kind: ChartKind,
    pub media_type: String,
    pub location: Option<String>,
}

/// Everything the report template needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub summary: SummarySheet,
    pub sections: Vec<NarrativeSection>,
    pub charts: Vec<ChartReference>,
}

/// Assembles the report for `result` from already-rendered charts.
///
/// # Errors
///
/// Returns [`ReportError::MissingChart`] for the first chart listed by
/// [`AggregationResult::expected_charts`] that `charts` does not hold.
pub fn assemble(result: &AggregationResult, charts: &ChartStore) -> Result<Report, ReportError> {
    let expected = result.expected_charts();

    let references = expected
        .iter()
        .map(|&kind| {
            charts
                .get(kind)
                .map(|chart| ChartReference {
                    kind,
                    media_type: chart.media_type.clone(),
                    location: chart.location.clone(),
                })
                .ok_or(ReportError::MissingChart(kind))
        })
        .collect::<Result<Vec<_>, _>>()?;

    log::info!(
        "Assembled report for block {} with {} charts",
        result.block_id,
        references.len()
    );

    Ok(Report {
        summary: SummarySheet::from_result(result),
        sections: narrative::sections(result, &expected),
        charts: references,
    })
}
