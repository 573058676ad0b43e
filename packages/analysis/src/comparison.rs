//! Value per square metre against the zoning area and the price ring.

use avm_analysis_models::{AreaScope, Observation, PriceComparison};
use avm_spatial::Ring;

use crate::LocalityFrame;

/// Compares the block at `slot` with its zoning area and with the blocks
/// intersecting a `radius_m` ring around it.
///
/// Both averages are taken over same-locality blocks only and include the
/// selected block itself. Blocks without `valor_m2` are skipped; the
/// counts report how many values went into each mean.
#[must_use]
pub fn price_comparison(frame: &LocalityFrame, slot: usize, radius_m: f64) -> PriceComparison {
    let selected = &frame.blocks()[slot];

    let area_scope = selected
        .area_id
        .as_ref()
        .map_or(AreaScope::Unzoned, |id| AreaScope::ZoningArea {
            area_id: id.clone(),
        });
    let (area_average, area_block_count) = mean(
        frame
            .blocks()
            .iter()
            .filter(|b| b.area_id == selected.area_id)
            .filter_map(|b| b.value_m2),
    );

    let ring = Ring::around(frame.planar(slot), radius_m, frame.projection());
    let (ring_average, ring_block_count) = mean(
        frame
            .intersecting(&ring.planar)
            .into_iter()
            .filter_map(|i| frame.blocks()[i].value_m2),
    );

    log::debug!(
        "Block {}: area average over {area_block_count} blocks, {radius_m}m ring average over {ring_block_count} blocks",
        selected.id
    );

    PriceComparison {
        own_value: selected.value_m2.into(),
        area_scope,
        area_average,
        area_block_count,
        ring_radius_m: radius_m,
        ring_average,
        ring_block_count,
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: impl Iterator<Item = f64>) -> (Observation<f64>, usize) {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if count == 0 {
        (Observation::NoData, 0)
    } else {
        (Observation::Observed(sum / count as f64), count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AnalysisConfig;
    use crate::classify::tests::{area, block, store};

    fn frame(blocks: Vec<avm_catastro_models::Block>) -> LocalityFrame {
        let store = store(blocks, vec![area("7", "1", Some("Residencial"))]);
        LocalityFrame::build(&store, "1", &AnalysisConfig::default()).unwrap()
    }

    fn observed(value: &Observation<f64>) -> f64 {
        *value.as_option().unwrap()
    }

    #[test]
    fn area_average_over_shared_zoning_area() {
        // Spread roughly 1 km apart so the rings stay disjoint.
        let frame = frame(vec![
            block("a", -74.10, 4.60, Some("7"), Some(400.0)),
            block("b", -74.09, 4.60, Some("7"), Some(100.0)),
            block("c", -74.08, 4.60, Some("7"), Some(200.0)),
            block("d", -74.07, 4.60, Some("7"), Some(300.0)),
            block("e", -74.06, 4.60, None, Some(9_999.0)),
        ]);
        let c = price_comparison(&frame, 0, 300.0);

        assert_eq!(
            c.area_scope,
            AreaScope::ZoningArea {
                area_id: "7".to_string()
            }
        );
        assert!((observed(&c.area_average) - 250.0).abs() < 1e-9);
        assert_eq!(c.area_block_count, 4);
    }

    #[test]
    fn unzoned_block_averages_all_unzoned_blocks() {
        let frame = frame(vec![
            block("a", -74.10, 4.60, None, Some(100.0)),
            block("b", -74.09, 4.60, None, Some(300.0)),
            block("c", -74.08, 4.60, None, None),
            block("d", -74.07, 4.60, Some("7"), Some(5_000.0)),
        ]);
        let c = price_comparison(&frame, 0, 300.0);

        assert_eq!(c.area_scope, AreaScope::Unzoned);
        assert!((observed(&c.area_average) - 200.0).abs() < 1e-9);
        assert_eq!(c.area_block_count, 2);
    }

    #[test]
    fn isolated_block_ring_average_is_own_value() {
        let frame = frame(vec![
            block("a", -74.10, 4.60, None, Some(123.0)),
            block("b", -74.05, 4.60, None, Some(1.0)),
        ]);
        let c = price_comparison(&frame, 0, 300.0);

        assert!((observed(&c.ring_average) - 123.0).abs() < 1e-9);
        assert_eq!(c.ring_block_count, 1);
        assert!((c.own_value.value_or_zero() - 123.0).abs() < 1e-9);
    }

    #[test]
    fn ring_average_includes_neighbours() {
        // Roughly 110 m apart.
        let frame = frame(vec![
            block("a", -74.100, 4.60, None, Some(100.0)),
            block("b", -74.099, 4.60, None, Some(200.0)),
            block("c", -74.080, 4.60, None, Some(5_000.0)),
        ]);
        let c = price_comparison(&frame, 0, 300.0);

        assert!((observed(&c.ring_average) - 150.0).abs() < 1e-9);
        assert_eq!(c.ring_block_count, 2);
    }

    #[test]
    fn blocks_without_values_resolve_to_no_data() {
        let frame = frame(vec![block("a", -74.10, 4.60, None, None)]);
        let c = price_comparison(&frame, 0, 300.0);

        assert!(c.own_value.is_no_data());
        assert!(c.area_average.is_no_data());
        assert!(c.ring_average.is_no_data());
        assert!((c.ring_average.value_or_zero()).abs() < f64::EPSILON);
    }
}
