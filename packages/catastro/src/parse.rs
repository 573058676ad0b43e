//! Parses `GeoJSON` feature collections into typed cadastral records.
//!
//! Individual features with a missing identifier or an unusable geometry
//! are skipped with a warning. A document that is not a
//! `FeatureCollection` at all is fatal for that dataset.

use avm_catastro_models::{
    Block, DatasetKind, Locality, PointSet, PointSite, ProjectionPeriod, ZoningArea,
};
use geo::MultiPolygon;
use geojson::{Feature, GeoJson};
use serde_json::Value;

use crate::CatastroError;

/// Parses a `GeoJSON` document and returns its features.
///
/// # Errors
///
/// Returns [`CatastroError::GeoJson`] if the text is not valid `GeoJSON`,
/// or [`CatastroError::Malformed`] if it is not a `FeatureCollection`.
pub fn feature_collection(kind: DatasetKind, text: &str) -> Result<Vec<Feature>, CatastroError> {
    match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(fc) => Ok(fc.features),
        GeoJson::Feature(_) | GeoJson::Geometry(_) => Err(CatastroError::Malformed {
            dataset: kind,
            message: "expected a FeatureCollection".to_string(),
        }),
    }
}

/// Parses locality features.
#[must_use]
pub fn localities(features: &[Feature]) -> Vec<Locality> {
    features
        .iter()
        .filter_map(|feature| {
            let id = prop_id(feature, "num_localidad")?;
            let Some(boundary) = polygon_geometry(feature) else {
                log::warn!("Skipping locality {id}: missing polygon geometry");
                return None;
            };
            let name = prop_str(feature, "nombre_localidad").unwrap_or_else(|| id.clone());
            let crime_count = prop_u64(feature, "cantidad_delitos").unwrap_or_default();
            let risk_level = prop_str(feature, "nivel_riesgo_delictivo").unwrap_or_default();

            Some(Locality {
                id,
                name,
                boundary,
                crime_count,
                risk_level,
            })
        })
        .collect()
}

/// Parses zoning area features.
#[must_use]
pub fn zoning_areas(features: &[Feature]) -> Vec<ZoningArea> {
    features
        .iter()
        .filter_map(|feature| {
            let id = prop_id(feature, "id_area")?;
            let Some(locality_id) = prop_id(feature, "num_localidad") else {
                log::warn!("Skipping zoning area {id}: missing num_localidad");
                return None;
            };
            let boundary = polygon_geometry(feature).unwrap_or_else(|| MultiPolygon(vec![]));

            Some(ZoningArea {
                id,
                locality_id,
                boundary,
                land_use: prop_str(feature, "uso_pot_simplificado"),
                pot_area: prop_str(feature, "area_pot"),
            })
        })
        .collect()
}

/// Parses block features.
#[must_use]
pub fn blocks(features: &[Feature]) -> Vec<Block> {
    features
        .iter()
        .filter_map(|feature| {
            let id = prop_id(feature, "id_manzana_unif")?;
            let Some(locality_id) = prop_id(feature, "num_localidad") else {
                log::warn!("Skipping block {id}: missing num_localidad");
                return None;
            };
            let Some(geometry) = polygon_geometry(feature) else {
                log::warn!("Skipping block {id}: missing polygon geometry");
                return None;
            };

            let projected = [
                ProjectionPeriod::H1_2025,
                ProjectionPeriod::H2_2025,
                ProjectionPeriod::H1_2026,
                ProjectionPeriod::H2_2026,
            ]
            .map(|period| prop_f64(feature, period.field_name()));

            Some(Block {
                id,
                locality_id,
                area_id: prop_id(feature, "id_area"),
                geometry,
                stratum: prop_u64(feature, "estrato").and_then(|v| u8::try_from(v).ok()),
                value_m2: prop_f64(feature, ProjectionPeriod::Current.field_name()),
                projected,
                transit_access_id: prop_id(feature, "id_combi_acceso"),
                school_access_id: prop_id(feature, "id_com_colegios"),
                nearby_schools: count(feature, "colegio_cerca"),
                nearby_stations: count(feature, "estaciones_cerca"),
                profitability: prop_str(feature, "rentabilidad"),
            })
        })
        .collect()
}

/// Parses transit or school group features keyed by `access_key`.
#[must_use]
pub fn point_sites(features: &[Feature], access_key: &str) -> Vec<PointSite> {
    features
        .iter()
        .filter_map(|feature| {
            let access_id = prop_id(feature, access_key)?;
            let Some(points) = point_geometry(feature) else {
                log::warn!("Skipping {access_key}={access_id}: missing point geometry");
                return None;
            };
            Some(PointSite { access_id, points })
        })
        .collect()
}

fn geometry(feature: &Feature) -> Option<geo::Geometry<f64>> {
    let geom = feature.geometry.clone()?;
    geom.try_into().ok()
}

/// Extracts a `Polygon` or `MultiPolygon` geometry.
fn polygon_geometry(feature: &Feature) -> Option<MultiPolygon<f64>> {
    match geometry(feature)? {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}

/// Extracts a `Point` or `MultiPoint` geometry.
fn point_geometry(feature: &Feature) -> Option<PointSet> {
    match geometry(feature)? {
        geo::Geometry::Point(p) => Some(PointSet::Single(p)),
        geo::Geometry::MultiPoint(mp) => Some(PointSet::Cluster(mp)),
        _ => None,
    }
}

/// Reads an identifier property.
///
/// Numeric identifiers with no fractional part are rendered as integers,
/// so a float-typed foreign key (`7.0`) joins with an integer key (`7`).
fn prop_id(feature: &Feature, key: &str) -> Option<String> {
    match feature.property(key)? {
        Value::String(s) => non_empty(s),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else {
                n.as_f64().filter(|f| f.is_finite()).map(format_float_id)
            }
        }
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn format_float_id(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        (value as i64).to_string()
    } else {
        value.to_string()
    }
}

fn prop_str(feature: &Feature, key: &str) -> Option<String> {
    match feature.property(key)? {
        Value::String(s) => non_empty(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn prop_f64(feature: &Feature, key: &str) -> Option<f64> {
    let value: f64 = match feature.property(key)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn prop_u64(feature: &Feature, key: &str) -> Option<u64> {
    prop_f64(feature, key)
        .filter(|v| *v >= 0.0)
        .map(|v| v.round() as u64)
}

fn count(feature: &Feature, key: &str) -> u32 {
    prop_u64(feature, key)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or_default()
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
