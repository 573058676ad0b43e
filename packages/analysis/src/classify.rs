//! Zoning classification join and the per-locality working frame.

use std::collections::BTreeMap;

use avm_analysis_models::{ColorMap, LandUse};
use avm_catastro::DatasetStore;
use avm_catastro_models::{Block, Locality, ZoningArea};
use avm_spatial::{FootprintIndex, MAGNA_BOGOTA, TransverseMercator};
use geo::MultiPolygon;

use crate::{AnalysisConfig, AnalysisError};

/// Left-joins each block to its zoning area's simplified land use.
///
/// Blocks without an area id, with an id no area carries, or whose area
/// has a blank land use are [`LandUse::Unclassified`]. Duplicate area ids
/// keep their first occurrence.
#[must_use]
pub fn classify_blocks(blocks: &[Block], areas: &[&ZoningArea]) -> Vec<LandUse> {
    let mut land_use_by_area: BTreeMap<&str, Option<&str>> = BTreeMap::new();
    for area in areas {
        land_use_by_area
            .entry(area.id.as_str())
            .or_insert(area.land_use.as_deref());
    }

    blocks
        .iter()
        .map(|block| {
            let label = block
                .area_id
                .as_deref()
                .and_then(|id| land_use_by_area.get(id).copied())
                .flatten();
            LandUse::from_label(label)
        })
        .collect()
}

/// Everything derived once per locality selection.
///
/// Holds the locality's blocks in source order alongside their land use,
/// planar footprint and the R-tree over those footprints. The color map is
/// built here and shared by every chart for as long as the locality stays
/// selected.
pub struct LocalityFrame {
    locality: Locality,
    areas: Vec<ZoningArea>,
    blocks: Vec<Block>,
    land_uses: Vec<LandUse>,
    planar: Vec<MultiPolygon<f64>>,
    slot_by_id: BTreeMap<String, usize>,
    footprints: FootprintIndex,
    colors: ColorMap,
    projection: TransverseMercator,
}

impl LocalityFrame {
    /// Builds the frame for `locality_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::UnknownLocality`] if the store has no such
    /// locality and [`AnalysisError::EmptyLocality`] if it owns no blocks.
    pub fn build(
        store: &DatasetStore,
        locality_id: &str,
        config: &AnalysisConfig,
    ) -> Result<Self, AnalysisError> {
        let locality = store
            .locality(locality_id)
            .ok_or_else(|| AnalysisError::UnknownLocality(locality_id.to_string()))?
            .clone();

        let blocks: Vec<Block> = store.blocks_in(&locality.id).cloned().collect();
        if blocks.is_empty() {
            return Err(AnalysisError::EmptyLocality(locality.name));
        }

        let area_refs: Vec<&ZoningArea> = store.zoning_areas_in(&locality.id).collect();
        if area_refs.is_empty() {
            log::warn!(
                "Locality {} has no zoning areas; every block is unclassified",
                locality.name
            );
        }
        let land_uses = classify_blocks(&blocks, &area_refs);
        let areas: Vec<ZoningArea> = area_refs.into_iter().cloned().collect();

        let colors = ColorMap::from_categories(
            &land_uses,
            &config.palette,
            &config.unclassified_color,
        );

        let projection = MAGNA_BOGOTA;
        let planar: Vec<MultiPolygon<f64>> = blocks
            .iter()
            .map(|b| projection.to_planar(&b.geometry))
            .collect();
        let footprints = FootprintIndex::build(planar.iter().cloned());

        let mut slot_by_id = BTreeMap::new();
        for (slot, block) in blocks.iter().enumerate() {
            slot_by_id.entry(block.id.clone()).or_insert(slot);
        }

        log::info!(
            "Locality frame for {}: {} blocks, {} zoning areas, {} land-use categories",
            locality.name,
            blocks.len(),
            areas.len(),
            colors.entries().len()
        );

        Ok(Self {
            locality,
            areas,
            blocks,
            land_uses,
            planar,
            slot_by_id,
            footprints,
            colors,
            projection,
        })
    }

    #[must_use]
    pub const fn locality(&self) -> &Locality {
        &self.locality
    }

    /// The locality's blocks in source order.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Land use of each block, parallel to [`Self::blocks`].
    #[must_use]
    pub fn land_uses(&self) -> &[LandUse] {
        &self.land_uses
    }

    #[must_use]
    pub const fn colors(&self) -> &ColorMap {
        &self.colors
    }

    #[must_use]
    pub const fn projection(&self) -> &TransverseMercator {
        &self.projection
    }

    /// Position of a block within the frame.
    #[must_use]
    pub fn slot(&self, block_id: &str) -> Option<usize> {
        self.slot_by_id.get(block_id.trim()).copied()
    }

    #[must_use]
    pub fn block(&self, block_id: &str) -> Option<&Block> {
        self.slot(block_id).map(|slot| &self.blocks[slot])
    }

    #[must_use]
    pub fn contains_block(&self, block_id: &str) -> bool {
        self.slot(block_id).is_some()
    }

    #[must_use]
    pub fn land_use(&self, slot: usize) -> &LandUse {
        &self.land_uses[slot]
    }

    #[must_use]
    pub fn planar(&self, slot: usize) -> &MultiPolygon<f64> {
        &self.planar[slot]
    }

    /// Slots of the blocks whose planar footprint intersects `ring`.
    #[must_use]
    pub fn intersecting(&self, ring: &MultiPolygon<f64>) -> Vec<usize> {
        self.footprints.intersecting(ring)
    }

    /// The zoning area a block belongs to, if it is known in this locality.
    #[must_use]
    pub fn zoning_area(&self, area_id: &str) -> Option<&ZoningArea> {
        self.areas.iter().find(|a| a.id == area_id)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use avm_catastro::Collections;
    use avm_analysis_models::{DEFAULT_PALETTE, UNCLASSIFIED_COLOR};
    use geo::polygon;

    /// A square of `size` degrees with its lower-left corner at `(x, y)`.
    pub fn square(x: f64, y: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: x, y: y),
            (x: x + size, y: y),
            (x: x + size, y: y + size),
            (x: x, y: y + size),
        ]])
    }

    pub fn locality(id: &str, name: &str, crime_count: u64, risk: &str) -> Locality {
        Locality {
            id: id.to_string(),
            name: name.to_string(),
            boundary: square(-74.2, 4.5, 0.2),
            crime_count,
            risk_level: risk.to_string(),
        }
    }

    pub fn area(id: &str, locality_id: &str, land_use: Option<&str>) -> ZoningArea {
        ZoningArea {
            id: id.to_string(),
            locality_id: locality_id.to_string(),
            boundary: square(-74.2, 4.5, 0.2),
            land_use: land_use.map(ToString::to_string),
            pot_area: Some("Área de actividad".to_string()),
        }
    }

    /// A roughly 11 m block at `(x, y)` in locality `"1"`.
    pub fn block(id: &str, x: f64, y: f64, area_id: Option<&str>, value: Option<f64>) -> Block {
        Block {
            id: id.to_string(),
            locality_id: "1".to_string(),
            area_id: area_id.map(ToString::to_string),
            geometry: square(x, y, 0.0001),
            stratum: Some(3),
            value_m2: value,
            projected: [None; 4],
            transit_access_id: None,
            school_access_id: None,
            nearby_schools: 0,
            nearby_stations: 0,
            profitability: None,
        }
    }

    pub fn store(blocks: Vec<Block>, zoning_areas: Vec<ZoningArea>) -> DatasetStore {
        DatasetStore::new(Collections {
            localities: vec![
                locality("1", "CHAPINERO", 120, "Medio"),
                locality("2", "USME", 80, "Bajo"),
            ],
            zoning_areas,
            blocks,
            transit: vec![],
            schools: vec![],
        })
        .unwrap()
    }

    #[test]
    fn joins_land_use_by_area_id() {
        let areas = [
            area("7", "1", Some("Residencial")),
            area("8", "1", Some("  ")),
            area("7", "1", Some("Comercial")),
        ];
        let area_refs: Vec<&ZoningArea> = areas.iter().collect();
        let blocks = [
            block("a", -74.1, 4.6, Some("7"), None),
            block("b", -74.1, 4.6, Some("8"), None),
            block("c", -74.1, 4.6, Some("99"), None),
            block("d", -74.1, 4.6, None, None),
        ];

        let uses = classify_blocks(&blocks, &area_refs);
        assert_eq!(
            uses,
            [
                LandUse::Classified("Residencial".to_string()),
                LandUse::Unclassified,
                LandUse::Unclassified,
                LandUse::Unclassified,
            ]
        );
    }

    #[test]
    fn locality_without_areas_is_all_unclassified() {
        let store = store(
            vec![
                block("a", -74.1, 4.6, Some("7"), Some(100.0)),
                block("b", -74.1, 4.601, None, Some(200.0)),
            ],
            vec![],
        );
        let frame = LocalityFrame::build(&store, "1", &AnalysisConfig::default()).unwrap();

        assert!(frame.land_uses().iter().all(|u| *u == LandUse::Unclassified));
        assert_eq!(frame.colors().entries().len(), 1);
        assert_eq!(
            frame.colors().color_for(&LandUse::Unclassified),
            UNCLASSIFIED_COLOR
        );
    }

    #[test]
    fn frame_colors_follow_block_order() {
        let store = store(
            vec![
                block("a", -74.1, 4.6, None, None),
                block("b", -74.1, 4.601, Some("2"), None),
                block("c", -74.1, 4.602, Some("1"), None),
            ],
            vec![
                area("1", "1", Some("Comercial")),
                area("2", "1", Some("Residencial")),
            ],
        );
        let frame = LocalityFrame::build(&store, "1", &AnalysisConfig::default()).unwrap();

        let residential = LandUse::Classified("Residencial".to_string());
        let commercial = LandUse::Classified("Comercial".to_string());
        assert_eq!(frame.colors().color_for(&residential), DEFAULT_PALETTE[0]);
        assert_eq!(frame.colors().color_for(&commercial), DEFAULT_PALETTE[1]);
        assert_eq!(frame.slot("c"), Some(2));
        assert_eq!(frame.land_use(2), &commercial);
    }

    #[test]
    fn build_rejects_unknown_and_empty_localities() {
        let store = store(vec![block("a", -74.1, 4.6, None, None)], vec![]);
        let config = AnalysisConfig::default();

        assert!(matches!(
            LocalityFrame::build(&store, "99", &config),
            Err(AnalysisError::UnknownLocality(_))
        ));
        assert!(matches!(
            LocalityFrame::build(&store, "2", &config),
            Err(AnalysisError::EmptyLocality(_))
        ));
    }
}
