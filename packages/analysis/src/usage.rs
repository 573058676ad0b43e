//! Land-use mix of the blocks around the selected block.

use avm_analysis_models::{CategoryCount, Observation, UsageMix};
use avm_spatial::Ring;

use crate::LocalityFrame;

/// Counts the land use of every same-locality block intersecting a
/// `radius_m` ring around the block at `slot`.
///
/// Categories are ordered by count, highest first; ties keep the order in
/// which the categories were first encountered. The majority is the first
/// entry, or [`Observation::NoData`] when nothing intersected.
#[must_use]
pub fn usage_mix(frame: &LocalityFrame, slot: usize, radius_m: f64) -> UsageMix {
    let ring = Ring::around(frame.planar(slot), radius_m, frame.projection());

    let mut counts: Vec<CategoryCount> = Vec::new();
    for i in frame.intersecting(&ring.planar) {
        let land_use = frame.land_use(i);
        match counts.iter_mut().find(|c| &c.land_use == land_use) {
            Some(entry) => entry.count += 1,
            None => counts.push(CategoryCount {
                land_use: land_use.clone(),
                count: 1,
            }),
        }
    }
    // Stable sort keeps first-encounter order among equal counts.
    counts.sort_by(|a, b| b.count.cmp(&a.count));

    let majority: Observation<_> = counts.first().map(|c| c.land_use.clone()).into();

    UsageMix {
        radius_m,
        counts,
        majority,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AnalysisConfig;
    use crate::classify::tests::{area, block, store};
    use avm_analysis_models::LandUse;

    fn classified(label: &str) -> LandUse {
        LandUse::Classified(label.to_string())
    }

    #[test]
    fn counts_sum_to_intersecting_blocks() {
        let store = store(
            vec![
                block("a", -74.1000, 4.6, Some("r"), None),
                block("b", -74.0995, 4.6, Some("c"), None),
                block("c", -74.0990, 4.6, Some("c"), None),
                block("d", -74.0985, 4.6, Some("r"), None),
                block("e", -74.0980, 4.6, None, None),
                block("far", -74.0500, 4.6, Some("c"), None),
            ],
            vec![
                area("r", "1", Some("Residencial")),
                area("c", "1", Some("Comercial")),
            ],
        );
        let frame = LocalityFrame::build(&store, "1", &AnalysisConfig::default()).unwrap();
        let mix = usage_mix(&frame, 0, 500.0);

        assert_eq!(mix.total(), 5);
        // Residencial and Comercial tie at two; Residencial was seen first.
        assert_eq!(mix.counts[0].land_use, classified("Residencial"));
        assert_eq!(mix.counts[1].land_use, classified("Comercial"));
        assert_eq!(mix.counts[2].land_use, LandUse::Unclassified);
        assert_eq!(mix.majority, Observation::Observed(classified("Residencial")));
    }

    #[test]
    fn majority_is_highest_count() {
        let store = store(
            vec![
                block("a", -74.1000, 4.6, Some("r"), None),
                block("b", -74.0995, 4.6, Some("c"), None),
                block("c", -74.0990, 4.6, Some("c"), None),
            ],
            vec![
                area("r", "1", Some("Residencial")),
                area("c", "1", Some("Comercial")),
            ],
        );
        let frame = LocalityFrame::build(&store, "1", &AnalysisConfig::default()).unwrap();
        let mix = usage_mix(&frame, 0, 500.0);

        assert_eq!(mix.majority_label(), "Comercial");
        assert_eq!(mix.counts[0].count, 2);
    }
}
