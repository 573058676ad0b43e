//! Narrative value sections of the report.

use avm_analysis_models::{AggregationResult, ChartKind, Observation, Projection};
use avm_catastro_models::ProjectionPeriod;
use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::format::{format_currency, or_unavailable};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SectionKind {
    Location,
    Facilities,
    Zoning,
    Valuation,
    Security,
    Projection,
}

/// A labelled value shown alongside a section's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportValue {
    pub label: String,
    pub value: String,
}

impl ReportValue {
    fn new(label: &str, value: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
        }
    }
}

/// One narrative section: prose plus the values and charts it cites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NarrativeSection {
    pub kind: SectionKind,
    pub title: String,
    pub text: String,
    pub values: Vec<ReportValue>,
    pub charts: Vec<ChartKind>,
}

/// Builds every section from the pipeline result, in reading order.
///
/// `available` lists the charts the report carries; a section only cites
/// charts from that list.
#[must_use]
pub fn sections(result: &AggregationResult, available: &[ChartKind]) -> Vec<NarrativeSection> {
    let cite = |kinds: &[ChartKind]| -> Vec<ChartKind> {
        kinds
            .iter()
            .copied()
            .filter(|k| available.contains(k))
            .collect()
    };

    vec![
        location(result, cite(&[ChartKind::LocalityMap, ChartKind::BlockMap])),
        facilities(
            result,
            cite(&[ChartKind::TransitContext, ChartKind::SchoolContext]),
        ),
        zoning(result, cite(&[ChartKind::UsageMix])),
        valuation(result, cite(&[ChartKind::ValueComparison])),
        security(result, cite(&[ChartKind::Security])),
        projection(result, cite(&[ChartKind::Projection])),
    ]
}

fn stratum_label(stratum: Option<u8>) -> String {
    stratum.map_or_else(|| "N/D".to_string(), |s| s.to_string())
}

fn location(result: &AggregationResult, charts: Vec<ChartKind>) -> NarrativeSection {
    let stratum = stratum_label(result.stratum);
    let mut values = vec![
        ReportValue::new("ID Manzana", result.block_id.clone()),
        ReportValue::new("Localidad", result.locality_name.clone()),
        ReportValue::new("Estrato", stratum.clone()),
    ];
    if let Some(c) = result.centroid {
        values.push(ReportValue::new(
            "Centroide",
            format!("{:.6}, {:.6}", c.lat, c.lon),
        ));
    }

    NarrativeSection {
        kind: SectionKind::Location,
        title: "Ubicación".to_string(),
        text: format!(
            "De acuerdo con su selección, la manzana identificada con el código {}, \
             ubicada en la localidad {}, correspondiente al estrato {stratum}, presenta \
             condiciones clave para evaluar su potencial de valorización en el contexto \
             urbano de Bogotá.",
            result.block_id, result.locality_name
        ),
        values,
        charts,
    }
}

fn facilities(result: &AggregationResult, charts: Vec<ChartKind>) -> NarrativeSection {
    let schools = result.facilities.schools_within_1km;
    let stations = result.facilities.stations_within_500m;

    NarrativeSection {
        kind: SectionKind::Facilities,
        title: "Equipamientos".to_string(),
        text: format!(
            "Cuenta con {schools} colegios ubicados a menos de 1.000 metros y {stations} \
             estaciones de TransMilenio a menos de 500 metros."
        ),
        values: vec![
            ReportValue::new("Colegios (1.000 m)", schools.to_string()),
            ReportValue::new("Estaciones (500 m)", stations.to_string()),
            ReportValue::new("Puntos de transporte", result.transit.points.len().to_string()),
            ReportValue::new("Colegios del grupo", result.schools.points.len().to_string()),
        ],
        charts,
    }
}

fn zoning(result: &AggregationResult, charts: Vec<ChartKind>) -> NarrativeSection {
    let pot_area = or_unavailable(result.zoning.pot_area.as_deref());
    let land_use = result.zoning.land_use.label().to_string();
    let majority = result.usage_mix.majority_label().to_string();
    let area_average = format_currency(result.comparison.area_average.value_or_zero());
    let radius = result.usage_mix.radius_m;

    NarrativeSection {
        kind: SectionKind::Zoning,
        title: "Norma urbana".to_string(),
        text: format!(
            "Desde el punto de vista normativo, la manzana se encuentra asignada al área \
             denominada {pot_area} dentro del marco del Plan de Ordenamiento Territorial (POT). \
             Su uso principal es {land_use}. En un radio de {radius} metros, el uso predominante \
             es {majority}. El valor promedio del metro cuadrado en el área POT es de {area_average}."
        ),
        values: vec![
            ReportValue::new("Área POT", pot_area),
            ReportValue::new("Uso POT", land_use),
            ReportValue::new("Uso predominante", majority),
            ReportValue::new(
                "Manzanas en el radio",
                result.usage_mix.total().to_string(),
            ),
        ],
        charts,
    }
}

fn valuation(result: &AggregationResult, charts: Vec<ChartKind>) -> NarrativeSection {
    let c = &result.comparison;
    let own = format_currency(c.own_value.value_or_zero());
    let ring = format_currency(c.ring_average.value_or_zero());
    let area = format_currency(c.area_average.value_or_zero());
    let profitability = or_unavailable(result.profitability.as_deref());

    NarrativeSection {
        kind: SectionKind::Valuation,
        title: "Valoración".to_string(),
        text: format!(
            "El valor actual del metro cuadrado es de {own}. El promedio en un radio de {} \
             metros es de {ring}. El valor promedio en el área POT es {area}. La rentabilidad \
             estimada es de {profitability}.",
            c.ring_radius_m
        ),
        values: vec![
            ReportValue::new("Valor m²", own),
            ReportValue::new(c.area_scope.label(), area),
            ReportValue::new(&format!("Prom. {}m", c.ring_radius_m), ring),
            ReportValue::new("Rentabilidad", profitability),
        ],
        charts,
    }
}

fn security(result: &AggregationResult, charts: Vec<ChartKind>) -> NarrativeSection {
    let (text, values) = match &result.security.snapshot {
        Observation::Observed(s) => (
            format!(
                "La localidad {} presenta un nivel de riesgo {} con un total de {} delitos \
                 reportados.",
                s.locality_name, s.risk_level, s.crime_count
            ),
            vec![
                ReportValue::new("Nivel de riesgo", s.risk_level.clone()),
                ReportValue::new("Delitos reportados", s.crime_count.to_string()),
            ],
        ),
        Observation::NoData => (
            format!(
                "No hay datos de seguridad para la localidad {}.",
                result.locality_name
            ),
            vec![ReportValue::new("Nivel de riesgo", "N/D")],
        ),
    };

    NarrativeSection {
        kind: SectionKind::Security,
        title: "Seguridad".to_string(),
        text,
        values,
        charts,
    }
}

fn projection(result: &AggregationResult, charts: Vec<ChartKind>) -> NarrativeSection {
    let (text, values) = match &result.projection {
        Projection::Complete { points } => {
            let values: Vec<ReportValue> = points
                .iter()
                .filter(|p| p.period != ProjectionPeriod::Current)
                .map(|p| ReportValue::new(p.period.as_ref(), format_currency(p.value)))
                .collect();
            let listing = values
                .iter()
                .map(|v| format!("{}: {}", v.label, v.value))
                .collect::<Vec<_>>()
                .join("; ");
            (
                format!("Según las proyecciones, el valor del metro cuadrado podría ser: {listing}."),
                values,
            )
        }
        Projection::Incomplete { missing } => {
            let missing = missing
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<String>>()
                .join(", ");
            (
                "No hay una proyección completa del valor del metro cuadrado para esta manzana."
                    .to_string(),
                vec![ReportValue::new("Periodos sin dato", missing)],
            )
        }
    };

    NarrativeSection {
        kind: SectionKind::Projection,
        title: "Proyección".to_string(),
        text,
        values,
        charts,
    }
}
