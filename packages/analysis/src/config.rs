//! Pipeline configuration: buffer radii and land-use colors.

use std::path::Path;

use avm_analysis_models::{DEFAULT_PALETTE, UNCLASSIFIED_COLOR};
use serde::{Deserialize, Serialize};

use crate::AnalysisError;

/// Tunable parameters of the aggregation pipeline.
///
/// Every field has a default, so a TOML file only needs to list what it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Ring used for the neighbourhood price average.
    pub price_radius_m: f64,
    /// Ring used for the land-use mix.
    pub usage_radius_m: f64,
    /// Ring drawn around the block on the transit map.
    pub transit_radius_m: f64,
    /// Ring drawn around the block on the school map.
    pub school_radius_m: f64,
    /// Colors assigned to classified land uses in order of first
    /// appearance.
    pub palette: Vec<String>,
    pub unclassified_color: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            price_radius_m: 300.0,
            usage_radius_m: 500.0,
            transit_radius_m: 800.0,
            school_radius_m: 1000.0,
            palette: DEFAULT_PALETTE.iter().map(ToString::to_string).collect(),
            unclassified_color: UNCLASSIFIED_COLOR.to_string(),
        }
    }
}

impl AnalysisConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Toml`] on invalid TOML and
    /// [`AnalysisError::Config`] if a radius is not a positive finite
    /// number or a color is missing.
    pub fn from_toml(text: &str) -> Result<Self, AnalysisError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Io`] if the file cannot be read, otherwise
    /// the same errors as [`Self::from_toml`].
    pub fn load(path: &Path) -> Result<Self, AnalysisError> {
        log::info!("Loading analysis config from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    fn validate(&self) -> Result<(), AnalysisError> {
        for (name, radius) in [
            ("price_radius_m", self.price_radius_m),
            ("usage_radius_m", self.usage_radius_m),
            ("transit_radius_m", self.transit_radius_m),
            ("school_radius_m", self.school_radius_m),
        ] {
            if !radius.is_finite() || radius <= 0.0 {
                return Err(AnalysisError::Config(format!(
                    "{name} must be a positive number of metres, got {radius}"
                )));
            }
        }
        if self.palette.is_empty() {
            return Err(AnalysisError::Config(
                "palette must list at least one color".to_string(),
            ));
        }
        if let Some(index) = self.palette.iter().position(|c| c.trim().is_empty()) {
            return Err(AnalysisError::Config(format!(
                "palette color {index} is blank"
            )));
        }
        if self.unclassified_color.trim().is_empty() {
            return Err(AnalysisError::Config(
                "unclassified_color must not be blank".to_string(),
            ));
        }
        Ok(())
    }
}
