//! Current and projected value per square metre of a block.

use avm_analysis_models::{Projection, ProjectionPoint};
use avm_catastro_models::{Block, ProjectionPeriod};

/// Builds the five-period valuation series for `block`.
///
/// A single missing period makes the whole series
/// [`Projection::Incomplete`]; partial series are never charted.
#[must_use]
pub fn projection_series(block: &Block) -> Projection {
    let mut points = Vec::with_capacity(ProjectionPeriod::all().len());
    let mut missing = Vec::new();

    for &period in ProjectionPeriod::all() {
        match block.value_at(period) {
            Some(value) => points.push(ProjectionPoint { period, value }),
            None => missing.push(period),
        }
    }

    if missing.is_empty() {
        Projection::Complete { points }
    } else {
        log::debug!(
            "Block {} is missing {} projection period(s)",
            block.id,
            missing.len()
        );
        Projection::Incomplete { missing }
    }
}
