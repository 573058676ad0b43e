//! The read-only dataset store and its keyed lookups.

use std::collections::BTreeMap;

use avm_catastro_models::{Block, DatasetKind, Locality, PointSite, ZoningArea};
use avm_spatial::BoundaryIndex;

use crate::CatastroError;

/// Parsed records for all five collections, before indexing.
#[derive(Debug, Clone, Default)]
pub struct Collections {
    pub localities: Vec<Locality>,
    pub zoning_areas: Vec<ZoningArea>,
    pub blocks: Vec<Block>,
    pub transit: Vec<PointSite>,
    pub schools: Vec<PointSite>,
}

/// Immutable store of the cadastral reference data.
///
/// Built once per session by the loader; every later component only reads
/// from it.
pub struct DatasetStore {
    localities: Vec<Locality>,
    zoning_areas: Vec<ZoningArea>,
    blocks: Vec<Block>,
    transit: Vec<PointSite>,
    schools: Vec<PointSite>,
    locality_by_id: BTreeMap<String, usize>,
    area_by_id: BTreeMap<String, usize>,
    block_by_id: BTreeMap<String, usize>,
    locality_index: BoundaryIndex,
}

impl DatasetStore {
    /// Indexes the parsed collections.
    ///
    /// Duplicate identifiers keep their first occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`CatastroError::MissingDataset`] if there are no localities
    /// or no blocks, since nothing downstream can run without them.
    pub fn new(collections: Collections) -> Result<Self, CatastroError> {
        let Collections {
            localities,
            zoning_areas,
            blocks,
            transit,
            schools,
        } = collections;

        if localities.is_empty() {
            return Err(CatastroError::MissingDataset(DatasetKind::Localities));
        }
        if blocks.is_empty() {
            return Err(CatastroError::MissingDataset(DatasetKind::Blocks));
        }

        let locality_by_id = index_by(DatasetKind::Localities, &localities, |l| &l.id);
        let area_by_id = index_by(DatasetKind::ZoningAreas, &zoning_areas, |a| &a.id);
        let block_by_id = index_by(DatasetKind::Blocks, &blocks, |b| &b.id);

        let locality_index = BoundaryIndex::build(
            localities
                .iter()
                .map(|l| (l.id.clone(), l.boundary.clone())),
        );

        log::info!(
            "Dataset store ready: {} localities, {} zoning areas, {} blocks, \
             {} transit groups, {} school groups",
            localities.len(),
            zoning_areas.len(),
            blocks.len(),
            transit.len(),
            schools.len(),
        );

        Ok(Self {
            localities,
            zoning_areas,
            blocks,
            transit,
            schools,
            locality_by_id,
            area_by_id,
            block_by_id,
            locality_index,
        })
    }

    /// All localities in source order.
    #[must_use]
    pub fn localities(&self) -> &[Locality] {
        &self.localities
    }

    /// All blocks in source order.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    #[must_use]
    pub fn locality(&self, id: &str) -> Option<&Locality> {
        self.locality_by_id.get(id).map(|&i| &self.localities[i])
    }

    /// Finds a locality by display name, ignoring case and surrounding
    /// whitespace.
    #[must_use]
    pub fn locality_by_name(&self, name: &str) -> Option<&Locality> {
        let wanted = name.trim();
        self.localities
            .iter()
            .find(|l| l.name.trim().eq_ignore_ascii_case(wanted))
    }

    /// Finds the locality containing a clicked coordinate.
    #[must_use]
    pub fn locality_at(&self, lng: f64, lat: f64) -> Option<&Locality> {
        self.locality_index
            .lookup(lng, lat)
            .and_then(|id| self.locality(id))
    }

    #[must_use]
    pub fn zoning_area(&self, id: &str) -> Option<&ZoningArea> {
        self.area_by_id.get(id).map(|&i| &self.zoning_areas[i])
    }

    /// Zoning areas owned by a locality, in source order.
    pub fn zoning_areas_in<'a>(
        &'a self,
        locality_id: &'a str,
    ) -> impl Iterator<Item = &'a ZoningArea> + 'a {
        self.zoning_areas
            .iter()
            .filter(move |a| a.locality_id == locality_id)
    }

    #[must_use]
    pub fn block(&self, id: &str) -> Option<&Block> {
        self.block_by_id.get(id.trim()).map(|&i| &self.blocks[i])
    }

    /// Blocks owned by a locality, in source order.
    pub fn blocks_in<'a>(&'a self, locality_id: &'a str) -> impl Iterator<Item = &'a Block> + 'a {
        self.blocks
            .iter()
            .filter(move |b| b.locality_id == locality_id)
    }

    /// Transit station groups sharing `access_id`.
    pub fn transit_sites<'a>(
        &'a self,
        access_id: &'a str,
    ) -> impl Iterator<Item = &'a PointSite> + 'a {
        self.transit.iter().filter(move |s| s.access_id == access_id)
    }

    /// School groups sharing `access_id`.
    pub fn school_sites<'a>(
        &'a self,
        access_id: &'a str,
    ) -> impl Iterator<Item = &'a PointSite> + 'a {
        self.schools.iter().filter(move |s| s.access_id == access_id)
    }
}

fn index_by<T>(
    kind: DatasetKind,
    records: &[T],
    key: impl Fn(&T) -> &String,
) -> BTreeMap<String, usize> {
    let mut map = BTreeMap::new();
    for (i, record) in records.iter().enumerate() {
        let id = key(record);
        if map.contains_key(id) {
            log::warn!("Duplicate {kind} id {id}; keeping first occurrence");
            continue;
        }
        map.insert(id.clone(), i);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use avm_catastro_models::PointSet;
    use geo::{MultiPolygon, Point, polygon};

    fn square(x: f64, y: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: x, y: y),
            (x: x + size, y: y),
            (x: x + size, y: y + size),
            (x: x, y: y + size),
        ]])
    }

    fn locality(id: &str, name: &str, x: f64) -> Locality {
        Locality {
            id: id.to_string(),
            name: name.to_string(),
            boundary: square(x, 4.5, 0.1),
            crime_count: 10,
            risk_level: "Medio".to_string(),
        }
    }

    fn block(id: &str, locality_id: &str) -> Block {
        Block {
            id: id.to_string(),
            locality_id: locality_id.to_string(),
            area_id: None,
            geometry: square(-74.1, 4.55, 0.001),
            stratum: Some(3),
            value_m2: Some(100.0),
            projected: [None; 4],
            transit_access_id: None,
            school_access_id: None,
            nearby_schools: 0,
            nearby_stations: 0,
            profitability: None,
        }
    }

    fn store() -> DatasetStore {
        DatasetStore::new(Collections {
            localities: vec![
                locality("1", "USAQUEN", -74.2),
                locality("2", "CHAPINERO", -74.1),
            ],
            zoning_areas: vec![],
            blocks: vec![block("a", "1"), block("b", "2"), block("c", "1"), block("a", "2")],
            transit: vec![PointSite {
                access_id: "9".to_string(),
                points: PointSet::Single(Point::new(-74.1, 4.55)),
            }],
            schools: vec![],
        })
        .unwrap()
    }

    #[test]
    fn requires_localities_and_blocks() {
        assert!(matches!(
            DatasetStore::new(Collections::default()),
            Err(CatastroError::MissingDataset(DatasetKind::Localities))
        ));
        assert!(matches!(
            DatasetStore::new(Collections {
                localities: vec![locality("1", "USAQUEN", -74.2)],
                ..Collections::default()
            }),
            Err(CatastroError::MissingDataset(DatasetKind::Blocks))
        ));
    }

    #[test]
    fn looks_up_localities_by_id_name_and_point() {
        let store = store();
        assert_eq!(store.locality("2").map(|l| l.name.as_str()), Some("CHAPINERO"));
        assert_eq!(
            store.locality_by_name(" chapinero ").map(|l| l.id.as_str()),
            Some("2")
        );
        assert_eq!(store.locality_at(-74.15, 4.55).map(|l| l.id.as_str()), Some("1"));
        assert!(store.locality_at(0.0, 0.0).is_none());
    }

    #[test]
    fn duplicate_block_ids_keep_first() {
        let store = store();
        assert_eq!(store.block("a").map(|b| b.locality_id.as_str()), Some("1"));
        let ids: Vec<&str> = store.blocks_in("1").map(|b| b.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
    }

    #[test]
    fn filters_point_sites_by_access_id() {
        let store = store();
        assert_eq!(store.transit_sites("9").count(), 1);
        assert_eq!(store.transit_sites("10").count(), 0);
        assert_eq!(store.school_sites("9").count(), 0);
    }
}
