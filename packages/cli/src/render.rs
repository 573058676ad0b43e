//! Chart renderer that writes each specification as a JSON document.

use std::path::PathBuf;

use avm_analysis_models::{ChartSpec, RenderedChart};
use avm_wizard::ChartRenderer;

/// Writes `<dir>/<chart_kind>.json` for every rendered chart. A later
/// rendering of the same kind overwrites the file.
pub struct JsonRenderer {
    dir: PathBuf,
}

impl JsonRenderer {
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl ChartRenderer for JsonRenderer {
    type Error = std::io::Error;

    fn render(&self, spec: &ChartSpec) -> Result<RenderedChart, Self::Error> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("{}.json", spec.kind));
        let bytes = serde_json::to_vec_pretty(spec)?;
        std::fs::write(&path, &bytes)?;

        Ok(RenderedChart {
            media_type: "application/json".to_string(),
            location: Some(path.display().to_string()),
            bytes,
        })
    }
}
