#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Output types of the spatial aggregation pipeline.
//!
//! Defines the land-use classification and its session-wide color
//! assignment, the [`Observation`] wrapper that distinguishes a measured
//! value from an empty candidate set, the [`AggregationResult`] bundle
//! consumed by report assembly, and the chart specifications handed to an
//! external renderer.

pub mod charts;
pub mod geometry;
pub mod result;

use serde::{Serialize, Serializer};

pub use charts::{
    Bar, ChartBody, ChartKind, ChartSpec, ChartStore, LinePoint, MapFeature, RenderedChart, Slice,
};
pub use result::{
    AggregationResult, AreaScope, CategoryCount, FacilityCounts, GroupLookup, LonLat,
    PriceComparison, Projection, ProjectionPoint, ProximityContext, SecurityContext,
    SecurityRankRow, SecuritySnapshot, UsageMix, ZoningDesignation,
};

/// Display label of the fallback land-use category.
pub const UNCLASSIFIED_LABEL: &str = "Sin clasificación";

/// Dedicated color of the fallback land-use category.
pub const UNCLASSIFIED_COLOR: &str = "#2b2b2b";

/// Default qualitative palette (Plotly's ten-color sequence).
pub const DEFAULT_PALETTE: &[&str] = &[
    "#636EFA", "#EF553B", "#00CC96", "#AB63FA", "#FFA15A", "#19D3F3", "#FF6692", "#B6E880",
    "#FF97FF", "#FECB52",
];

/// Simplified POT land-use category of a block.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LandUse {
    /// A category joined from the block's zoning area.
    Classified(String),
    /// No zoning area, no join match, or a blank category.
    Unclassified,
}

impl LandUse {
    /// Builds a category from an optional joined label. Blank labels are
    /// unclassified.
    #[must_use]
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(str::trim) {
            Some(l) if !l.is_empty() => Self::Classified(l.to_string()),
            _ => Self::Unclassified,
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Classified(label) => label,
            Self::Unclassified => UNCLASSIFIED_LABEL,
        }
    }

    #[must_use]
    pub const fn is_classified(&self) -> bool {
        matches!(self, Self::Classified(_))
    }
}

impl std::fmt::Display for LandUse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for LandUse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Outcome of an aggregation over a candidate set.
///
/// An empty candidate set is not an error: it resolves to
/// [`Observation::NoData`], which callers flatten to a zero or placeholder
/// value while still being able to tell it apart from a real measurement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Observation<T> {
    Observed(T),
    NoData,
}

impl<T> Observation<T> {
    #[must_use]
    pub const fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData)
    }

    #[must_use]
    pub const fn as_option(&self) -> Option<&T> {
        match self {
            Self::Observed(v) => Some(v),
            Self::NoData => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Observation<U> {
        match self {
            Self::Observed(v) => Observation::Observed(f(v)),
            Self::NoData => Observation::NoData,
        }
    }
}

impl Observation<f64> {
    /// The measured value, or `0.0` when there was no data.
    #[must_use]
    pub const fn value_or_zero(&self) -> f64 {
        match self {
            Self::Observed(v) => *v,
            Self::NoData => 0.0,
        }
    }
}

impl<T> From<Option<T>> for Observation<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::NoData, Self::Observed)
    }
}

/// Session-wide color assignment for land-use categories.
///
/// Built once per locality selection and reused by every chart so the
/// same category always renders in the same color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorMap {
    entries: Vec<(LandUse, String)>,
    unclassified: String,
}

impl ColorMap {
    /// Assigns colors to categories in order of first appearance.
    ///
    /// Each distinct classified category takes the next palette color,
    /// cycling when the palette is exhausted. [`LandUse::Unclassified`]
    /// always gets `unclassified_color` and does not consume a palette
    /// slot.
    pub fn from_categories<'a, I, P>(categories: I, palette: &[P], unclassified_color: &str) -> Self
    where
        I: IntoIterator<Item = &'a LandUse>,
        P: AsRef<str>,
    {
        let mut entries: Vec<(LandUse, String)> = Vec::new();
        let mut next_slot = 0usize;

        for category in categories {
            if entries.iter().any(|(seen, _)| seen == category) {
                continue;
            }
            let color = match category {
                LandUse::Unclassified => unclassified_color.to_string(),
                LandUse::Classified(_) if palette.is_empty() => unclassified_color.to_string(),
                LandUse::Classified(_) => {
                    let color = palette[next_slot % palette.len()].as_ref().to_string();
                    next_slot += 1;
                    color
                }
            };
            entries.push((category.clone(), color));
        }

        Self {
            entries,
            unclassified: unclassified_color.to_string(),
        }
    }

    /// Color for `land_use`. Categories never seen during construction
    /// fall back to the unclassified color.
    #[must_use]
    pub fn color_for(&self, land_use: &LandUse) -> &str {
        self.entries
            .iter()
            .find(|(category, _)| category == land_use)
            .map_or(self.unclassified.as_str(), |(_, color)| color.as_str())
    }

    /// Categories and colors in order of first appearance.
    #[must_use]
    pub fn entries(&self) -> &[(LandUse, String)] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classified(label: &str) -> LandUse {
        LandUse::Classified(label.to_string())
    }

    #[test]
    fn blank_labels_are_unclassified() {
        assert_eq!(LandUse::from_label(None), LandUse::Unclassified);
        assert_eq!(LandUse::from_label(Some("   ")), LandUse::Unclassified);
        assert_eq!(LandUse::from_label(Some(" Residencial ")), classified("Residencial"));
        assert_eq!(LandUse::Unclassified.to_string(), UNCLASSIFIED_LABEL);
    }

    #[test]
    fn colors_follow_first_appearance() {
        let categories = [
            classified("Comercial"),
            classified("Residencial"),
            classified("Comercial"),
            classified("Dotacional"),
        ];
        let map = ColorMap::from_categories(&categories, DEFAULT_PALETTE, UNCLASSIFIED_COLOR);

        assert_eq!(map.entries().len(), 3);
        assert_eq!(map.color_for(&classified("Comercial")), DEFAULT_PALETTE[0]);
        assert_eq!(map.color_for(&classified("Residencial")), DEFAULT_PALETTE[1]);
        assert_eq!(map.color_for(&classified("Dotacional")), DEFAULT_PALETTE[2]);
    }

    #[test]
    fn unclassified_gets_fixed_color_without_consuming_a_slot() {
        let categories = [
            LandUse::Unclassified,
            classified("Industrial"),
            LandUse::Unclassified,
        ];
        let map = ColorMap::from_categories(&categories, DEFAULT_PALETTE, UNCLASSIFIED_COLOR);

        assert_eq!(map.color_for(&LandUse::Unclassified), UNCLASSIFIED_COLOR);
        assert_eq!(map.color_for(&classified("Industrial")), DEFAULT_PALETTE[0]);
    }

    #[test]
    fn palette_cycles_when_exhausted() {
        let palette = ["#111111", "#222222"];
        let categories = [classified("a"), classified("b"), classified("c")];
        let map = ColorMap::from_categories(&categories, &palette, UNCLASSIFIED_COLOR);
        assert_eq!(map.color_for(&classified("c")), "#111111");
    }

    #[test]
    fn unknown_category_falls_back_to_unclassified_color() {
        let map = ColorMap::from_categories(&[classified("a")], DEFAULT_PALETTE, UNCLASSIFIED_COLOR);
        assert_eq!(map.color_for(&classified("zzz")), UNCLASSIFIED_COLOR);
    }

    #[test]
    fn observation_flattens_to_zero() {
        let none: Observation<f64> = None.into();
        assert!(none.is_no_data());
        assert!((none.value_or_zero() - 0.0).abs() < f64::EPSILON);
        assert!((Observation::Observed(12.5).value_or_zero() - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn security_context_compares_snapshots() {
        fn assert_eq_impl<T: Eq>(_: &T) {}

        let snapshot = SecuritySnapshot {
            locality_id: "2".to_string(),
            locality_name: "CHAPINERO".to_string(),
            crime_count: 120,
            risk_level: "Medio".to_string(),
        };
        let context = SecurityContext {
            snapshot: Observation::Observed(snapshot),
            ranking: vec![],
        };
        assert_eq_impl(&context);
        assert_ne!(
            context,
            SecurityContext {
                snapshot: Observation::NoData,
                ranking: vec![],
            }
        );
    }

    #[test]
    fn observation_serializes_with_status_tag() {
        let json = serde_json::to_string(&Observation::Observed(3.0)).unwrap();
        assert_eq!(json, r#"{"status":"observed","value":3.0}"#);
        let json = serde_json::to_string(&Observation::<f64>::NoData).unwrap();
        assert_eq!(json, r#"{"status":"no_data"}"#);
    }
}
