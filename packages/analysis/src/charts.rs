//! Chart specifications for each wizard step.
//!
//! Builders only describe the data a chart shows. Every map and pie uses
//! the frame's [`avm_analysis_models::ColorMap`] so a land use keeps its
//! color across the whole session.

use avm_analysis_models::{
    AggregationResult, Bar, ChartBody, ChartKind, ChartSpec, LinePoint, MapFeature,
    PriceComparison, Projection, ProximityContext, SecurityContext, Slice, UsageMix,
};

use crate::LocalityFrame;

fn legend(frame: &LocalityFrame) -> Vec<(String, String)> {
    frame
        .colors()
        .entries()
        .iter()
        .map(|(land_use, color)| (land_use.label().to_string(), color.clone()))
        .collect()
}

fn map_features(frame: &LocalityFrame, highlight: Option<usize>) -> Vec<MapFeature> {
    frame
        .blocks()
        .iter()
        .zip(frame.land_uses())
        .enumerate()
        .map(|(slot, (block, land_use))| MapFeature {
            id: block.id.clone(),
            label: land_use.label().to_string(),
            color: frame.colors().color_for(land_use).to_string(),
            highlighted: highlight == Some(slot),
            geometry: block.geometry.clone(),
        })
        .collect()
}

/// Every block of the locality colored by land use.
#[must_use]
pub fn locality_map(frame: &LocalityFrame) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::LocalityMap,
        title: format!("Manzanas de {} por uso POT", frame.locality().name),
        body: ChartBody::Map {
            features: map_features(frame, None),
            legend: legend(frame),
        },
    }
}

/// The locality map with the selected block highlighted.
#[must_use]
pub fn block_map(frame: &LocalityFrame, slot: usize) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::BlockMap,
        title: format!("Manzana {}", frame.blocks()[slot].id),
        body: ChartBody::Map {
            features: map_features(frame, Some(slot)),
            legend: legend(frame),
        },
    }
}

fn proximity(
    frame: &LocalityFrame,
    slot: usize,
    kind: ChartKind,
    title: &str,
    context: &ProximityContext,
) -> ChartSpec {
    ChartSpec {
        kind,
        title: title.to_string(),
        body: ChartBody::Proximity {
            block: frame.blocks()[slot].geometry.clone(),
            ring: context.ring.clone(),
            points: context.points.clone(),
            radius_m: context.radius_m,
        },
    }
}

#[must_use]
pub fn transit_chart(frame: &LocalityFrame, slot: usize, context: &ProximityContext) -> ChartSpec {
    proximity(
        frame,
        slot,
        ChartKind::TransitContext,
        "Contexto de Transporte",
        context,
    )
}

#[must_use]
pub fn school_chart(frame: &LocalityFrame, slot: usize, context: &ProximityContext) -> ChartSpec {
    proximity(
        frame,
        slot,
        ChartKind::SchoolContext,
        "Contexto Educativo",
        context,
    )
}

/// Block value against the area and ring averages. Missing values are
/// drawn as zero-height bars.
#[must_use]
pub fn value_comparison_chart(comparison: &PriceComparison) -> ChartSpec {
    let bars = vec![
        Bar {
            label: "Manzana seleccionada".to_string(),
            value: comparison.own_value.value_or_zero(),
        },
        Bar {
            label: comparison.area_scope.label().to_string(),
            value: comparison.area_average.value_or_zero(),
        },
        Bar {
            label: format!("Promedio {}m", comparison.ring_radius_m),
            value: comparison.ring_average.value_or_zero(),
        },
    ];

    ChartSpec {
        kind: ChartKind::ValueComparison,
        title: format!(
            "Comparativo de valor m² respecto al área POT y {}m a la redonda",
            comparison.ring_radius_m
        ),
        body: ChartBody::Bars { bars },
    }
}

/// Land-use pie for the usage ring; `None` when the ring held no blocks.
#[must_use]
pub fn usage_mix_chart(frame: &LocalityFrame, block_id: &str, mix: &UsageMix) -> Option<ChartSpec> {
    if mix.counts.is_empty() {
        return None;
    }

    let slices = mix
        .counts
        .iter()
        .map(|c| Slice {
            label: c.land_use.label().to_string(),
            count: c.count,
            color: frame.colors().color_for(&c.land_use).to_string(),
        })
        .collect();

    Some(ChartSpec {
        kind: ChartKind::UsageMix,
        title: format!(
            "Distribución de usos POT en buffer de {}m - Manzana {block_id}",
            mix.radius_m
        ),
        body: ChartBody::Pie { slices },
    })
}

/// Valuation line; `None` unless every period has a value.
#[must_use]
pub fn projection_chart(block_id: &str, projection: &Projection) -> Option<ChartSpec> {
    let Projection::Complete { points } = projection else {
        return None;
    };

    Some(ChartSpec {
        kind: ChartKind::Projection,
        title: format!("Evolución Proyectada del Valor m² - Manzana {block_id}"),
        body: ChartBody::Line {
            points: points
                .iter()
                .map(|p| LinePoint {
                    label: p.period.to_string(),
                    value: p.value,
                })
                .collect(),
        },
    })
}

#[must_use]
pub fn security_chart(security: &SecurityContext) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::Security,
        title: "Contexto de seguridad por localidad".to_string(),
        body: ChartBody::Ranking {
            rows: security.ranking.clone(),
        },
    }
}

/// Every chart the report expects for `result`, in report order.
#[must_use]
pub fn all_charts(frame: &LocalityFrame, result: &AggregationResult) -> Vec<ChartSpec> {
    let Some(slot) = frame.slot(&result.block_id) else {
        log::warn!("Block {} is not part of the current frame", result.block_id);
        return Vec::new();
    };

    let mut charts = vec![
        locality_map(frame),
        block_map(frame, slot),
        transit_chart(frame, slot, &result.transit),
        school_chart(frame, slot, &result.schools),
        value_comparison_chart(&result.comparison),
    ];
    charts.extend(usage_mix_chart(frame, &result.block_id, &result.usage_mix));
    charts.extend(projection_chart(&result.block_id, &result.projection));
    charts.push(security_chart(&result.security));
    charts
}
