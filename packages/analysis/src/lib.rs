#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Spatial aggregation pipeline.
//!
//! Turns one selected block into comparison statistics: the zoning
//! classification join, proximity rings for transit and schools, the area
//! and ring price averages, the land-use mix, the valuation series and the
//! security context of its locality.
//!
//! All distance work happens in EPSG:3116 through the
//! [`LocalityFrame`], which is built once per locality selection. Each
//! stage is independent: an empty candidate set in one stage resolves to
//! [`avm_analysis_models::Observation::NoData`] without affecting the
//! others.

pub mod charts;
pub mod classify;
pub mod comparison;
pub mod config;
pub mod projection;
pub mod proximity;
pub mod security;
pub mod usage;

use avm_analysis_models::{AggregationResult, FacilityCounts, LandUse, ZoningDesignation};
use avm_catastro::DatasetStore;

pub use classify::{LocalityFrame, classify_blocks};
pub use comparison::price_comparison;
pub use config::AnalysisConfig;
pub use projection::projection_series;
pub use proximity::{centroid, school_context, transit_context};
pub use security::security_context;
pub use usage::usage_mix;

/// Errors from building a locality frame or analysing a block.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Unknown locality: {0}")]
    UnknownLocality(String),

    #[error("Locality {0} has no blocks")]
    EmptyLocality(String),

    #[error("Block {0} is not part of the selected locality")]
    UnknownBlock(String),

    #[error("Invalid analysis config: {0}")]
    Config(String),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Zoning designation of the block at `slot`.
#[must_use]
pub fn zoning_designation(frame: &LocalityFrame, slot: usize) -> ZoningDesignation {
    let block = &frame.blocks()[slot];
    let pot_area = block
        .area_id
        .as_deref()
        .and_then(|id| frame.zoning_area(id))
        .and_then(|area| area.pot_area.clone());

    ZoningDesignation {
        area_id: block.area_id.clone(),
        land_use: frame.land_use(slot).clone(),
        pot_area,
    }
}

/// Runs every pipeline stage for `block_id`.
///
/// # Errors
///
/// Returns [`AnalysisError::UnknownBlock`] if the block is not in `frame`.
/// Empty candidate sets never fail; they surface as `NoData` or
/// incomplete sections of the result.
pub fn analyze(
    store: &DatasetStore,
    frame: &LocalityFrame,
    block_id: &str,
    config: &AnalysisConfig,
) -> Result<AggregationResult, AnalysisError> {
    let slot = frame
        .slot(block_id)
        .ok_or_else(|| AnalysisError::UnknownBlock(block_id.to_string()))?;
    let block = &frame.blocks()[slot];
    let locality = frame.locality();

    log::info!("Analysing block {} in {}", block.id, locality.name);

    let zoning = zoning_designation(frame, slot);
    if zoning.land_use == LandUse::Unclassified {
        log::debug!("Block {} has no POT land use", block.id);
    }

    Ok(AggregationResult {
        block_id: block.id.clone(),
        locality_id: locality.id.clone(),
        locality_name: locality.name.clone(),
        stratum: block.stratum,
        profitability: block.profitability.clone(),
        zoning,
        centroid: centroid(frame, slot),
        transit: transit_context(store, frame, slot, config.transit_radius_m),
        schools: school_context(store, frame, slot, config.school_radius_m),
        comparison: price_comparison(frame, slot, config.price_radius_m),
        usage_mix: usage_mix(frame, slot, config.usage_radius_m),
        projection: projection_series(block),
        security: security_context(store, &block.locality_id),
        facilities: FacilityCounts {
            schools_within_1km: block.nearby_schools,
            stations_within_500m: block.nearby_stations,
        },
    })
}
