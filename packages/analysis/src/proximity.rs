//! Block centroid and transit/school proximity contexts.

use avm_analysis_models::{GroupLookup, LonLat, ProximityContext};
use avm_catastro::DatasetStore;
use avm_catastro_models::PointSite;
use avm_spatial::{Ring, planar_centroid};
use geo::Point;

use crate::LocalityFrame;

/// Centroid of the block at `slot`, in longitude/latitude.
#[must_use]
pub fn centroid(frame: &LocalityFrame, slot: usize) -> Option<LonLat> {
    planar_centroid(&frame.blocks()[slot].geometry, frame.projection()).map(LonLat::from)
}

/// Transit stations sharing the block's `id_combi_acceso`, with the
/// transit ring around the block.
#[must_use]
pub fn transit_context(
    store: &DatasetStore,
    frame: &LocalityFrame,
    slot: usize,
    radius_m: f64,
) -> ProximityContext {
    let access_id = frame.blocks()[slot].transit_access_id.as_deref();
    let sites: Vec<&PointSite> = access_id
        .map(|id| store.transit_sites(id).collect())
        .unwrap_or_default();
    build_context(frame, slot, radius_m, access_id, &sites)
}

/// Schools sharing the block's `id_com_colegios`, with the school ring
/// around the block. Single points and clusters are flattened together.
#[must_use]
pub fn school_context(
    store: &DatasetStore,
    frame: &LocalityFrame,
    slot: usize,
    radius_m: f64,
) -> ProximityContext {
    let access_id = frame.blocks()[slot].school_access_id.as_deref();
    let sites: Vec<&PointSite> = access_id
        .map(|id| store.school_sites(id).collect())
        .unwrap_or_default();
    build_context(frame, slot, radius_m, access_id, &sites)
}

fn build_context(
    frame: &LocalityFrame,
    slot: usize,
    radius_m: f64,
    access_id: Option<&str>,
    sites: &[&PointSite],
) -> ProximityContext {
    let ring = Ring::around(frame.planar(slot), radius_m, frame.projection());

    let (lookup, points) = match access_id {
        None => (GroupLookup::NoAccessId, Vec::new()),
        Some(id) => {
            if sites.is_empty() {
                log::debug!("Access group {id} has no matching rows");
                (
                    GroupLookup::Unmatched {
                        access_id: id.to_string(),
                    },
                    Vec::new(),
                )
            } else {
                let points: Vec<Point<f64>> =
                    sites.iter().flat_map(|site| site.points.points()).collect();
                (
                    GroupLookup::Matched {
                        access_id: id.to_string(),
                        sites: sites.len(),
                    },
                    points,
                )
            }
        }
    };

    ProximityContext {
        radius_m,
        ring: ring.geographic,
        lookup,
        points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AnalysisConfig;
    use crate::classify::tests::{block, locality};
    use avm_catastro::Collections;
    use avm_catastro_models::PointSet;
    use geo::{Contains, MultiPoint};

    fn store_with_sites() -> DatasetStore {
        let mut linked = block("a", -74.1, 4.6, None, Some(100.0));
        linked.transit_access_id = Some("T1".to_string());
        linked.school_access_id = Some("S1".to_string());
        let mut dangling = block("b", -74.1, 4.61, None, Some(100.0));
        dangling.transit_access_id = Some("T404".to_string());

        DatasetStore::new(Collections {
            localities: vec![locality("1", "CHAPINERO", 10, "Bajo")],
            zoning_areas: vec![],
            blocks: vec![linked, dangling, block("c", -74.1, 4.62, None, None)],
            transit: vec![PointSite {
                access_id: "T1".to_string(),
                points: PointSet::Cluster(MultiPoint::new(vec![
                    Point::new(-74.101, 4.6),
                    Point::new(-74.099, 4.6),
                ])),
            }],
            schools: vec![
                PointSite {
                    access_id: "S1".to_string(),
                    points: PointSet::Single(Point::new(-74.1, 4.605)),
                },
                PointSite {
                    access_id: "S1".to_string(),
                    points: PointSet::Cluster(MultiPoint::new(vec![
                        Point::new(-74.102, 4.6),
                        Point::new(-74.103, 4.6),
                    ])),
                },
            ],
        })
        .unwrap()
    }

    #[test]
    fn centroid_sits_inside_block() {
        let store = store_with_sites();
        let frame = LocalityFrame::build(&store, "1", &AnalysisConfig::default()).unwrap();
        let c = centroid(&frame, 0).unwrap();
        assert!(frame.blocks()[0].geometry.contains(&Point::new(c.lon, c.lat)));
    }

    #[test]
    fn matched_groups_collect_every_point() {
        let store = store_with_sites();
        let frame = LocalityFrame::build(&store, "1", &AnalysisConfig::default()).unwrap();

        let transit = transit_context(&store, &frame, 0, 800.0);
        assert_eq!(
            transit.lookup,
            GroupLookup::Matched {
                access_id: "T1".to_string(),
                sites: 1
            }
        );
        assert_eq!(transit.points.len(), 2);

        let schools = school_context(&store, &frame, 0, 1000.0);
        assert_eq!(schools.points.len(), 3);
        assert!((schools.radius_m - 1000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_or_dangling_ids_yield_no_points_but_a_ring() {
        let store = store_with_sites();
        let frame = LocalityFrame::build(&store, "1", &AnalysisConfig::default()).unwrap();

        let dangling = transit_context(&store, &frame, 1, 800.0);
        assert_eq!(
            dangling.lookup,
            GroupLookup::Unmatched {
                access_id: "T404".to_string()
            }
        );
        assert!(dangling.points.is_empty());

        let none = transit_context(&store, &frame, 2, 800.0);
        assert_eq!(none.lookup, GroupLookup::NoAccessId);
        assert!(none.points.is_empty());
        assert!(!none.ring.0.is_empty());
        assert!(none.ring.contains(&Point::new(-74.09995, 4.62005)));
    }
}
