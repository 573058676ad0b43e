//! Compile-time registry of dataset sources.
//!
//! The five collections are listed in `sources/datasets.toml`, embedded via
//! `include_str!`.

use avm_catastro_models::{DatasetKind, DatasetSource};
use serde::Deserialize;

use crate::CatastroError;

const DATASETS_TOML: &str = include_str!("../sources/datasets.toml");

#[derive(Deserialize)]
struct Registry {
    datasets: Vec<DatasetSource>,
}

/// Parses a registry document.
///
/// # Errors
///
/// Returns [`CatastroError::Toml`] if the document is not valid, or
/// [`CatastroError::MissingDataset`] if any collection kind is absent.
pub fn parse_sources(toml_str: &str) -> Result<Vec<DatasetSource>, CatastroError> {
    let registry: Registry = toml::de::from_str(toml_str)?;

    for kind in DatasetKind::all() {
        if !registry.datasets.iter().any(|s| s.kind == *kind) {
            return Err(CatastroError::MissingDataset(*kind));
        }
    }

    Ok(registry.datasets)
}

/// Returns the embedded dataset sources.
///
/// # Panics
///
/// Panics if the embedded TOML fails to parse. Since it is a compile-time
/// constant, a failure indicates a development error and is caught by the
/// tests below.
#[must_use]
pub fn all_sources() -> Vec<DatasetSource> {
    parse_sources(DATASETS_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse embedded dataset registry: {e}"))
}

/// Returns the embedded source for `kind`.
#[must_use]
pub fn source_for(kind: DatasetKind) -> Option<DatasetSource> {
    all_sources().into_iter().find(|s| s.kind == kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn loads_one_source_per_kind() {
        let sources = all_sources();
        assert_eq!(sources.len(), DatasetKind::all().len());

        let kinds: BTreeSet<DatasetKind> = sources.iter().map(|s| s.kind).collect();
        assert_eq!(kinds.len(), sources.len(), "Duplicate dataset kind");
    }

    #[test]
    fn all_sources_have_required_fields() {
        for source in &all_sources() {
            assert!(!source.name.is_empty(), "{} has empty name", source.kind);
            assert!(
                source.url.starts_with("https://"),
                "{} has invalid url: {}",
                source.kind,
                source.url
            );
            assert!(
                source.file_name.ends_with(".geojson"),
                "{} has invalid file name: {}",
                source.kind,
                source.file_name
            );
        }
    }

    #[test]
    fn rejects_registry_missing_a_kind() {
        let toml_str = r#"
            [[datasets]]
            kind = "localities"
            name = "Localidades"
            url = "https://example.com/l.geojson"
            file_name = "l.geojson"
        "#;
        assert!(matches!(
            parse_sources(toml_str),
            Err(CatastroError::MissingDataset(DatasetKind::ZoningAreas))
        ));
    }

    #[test]
    fn finds_source_by_kind() {
        let blocks = source_for(DatasetKind::Blocks).expect("blocks source");
        assert_eq!(blocks.file_name, "tabla_hechos.geojson");
    }
}
